use shared::protocol::Tone;

use crate::ToneSink;

#[cfg(feature = "sound")]
pub use self::rodio_backend::RodioTone;

#[cfg(feature = "sound")]
mod rodio_backend {
    use std::{thread, time::Duration};

    use rodio::{
        source::{SineWave, Source},
        OutputStream, Sink,
    };
    use shared::protocol::Tone;
    use tracing::debug;

    use crate::ToneSink;

    const TONE_VOLUME: f32 = 0.2;

    /// Plays sine beeps on the default output device, one detached thread per tone.
    #[derive(Debug, Clone, Copy, Default)]
    pub struct RodioTone;

    impl ToneSink for RodioTone {
        fn play(&self, tone: Tone) {
            let spawned = thread::Builder::new()
                .name("tone".to_string())
                .spawn(move || {
                    let Ok((_stream, handle)) = OutputStream::try_default() else {
                        debug!("no audio output device; tone skipped");
                        return;
                    };
                    let Ok(sink) = Sink::try_new(&handle) else {
                        debug!("audio sink unavailable; tone skipped");
                        return;
                    };
                    sink.append(
                        SineWave::new(tone.frequency_hz as f32)
                            .take_duration(Duration::from_millis(tone.duration_ms as u64))
                            .amplify(TONE_VOLUME),
                    );
                    sink.sleep_until_end();
                });
            if let Err(err) = spawned {
                debug!("failed to spawn tone thread: {err}");
            }
        }
    }
}

/// Used when sound support is compiled out or no device is wanted.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentTone;

impl ToneSink for SilentTone {
    fn play(&self, tone: Tone) {
        tracing::trace!(?tone, "tone suppressed");
    }
}
