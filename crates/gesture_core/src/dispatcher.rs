//! Turns per-frame gestures into input actions, log lines and feedback tones.
//!
//! The dispatcher performs no I/O. It owns the session state (smoothed pointer,
//! drag flag, cooldown timestamps) and returns a [`DispatchOutcome`] that the
//! frame loop applies. Only one action category fires per frame.

use std::time::{Duration, Instant};

use shared::protocol::{InputAction, MouseButton, NavKey, Tone};

use crate::{
    classifier::{Gesture, PageZone},
    settings::GestureSettings,
    smoothing::PointerSmoother,
};

pub const RIGHT_CLICK_COOLDOWN: Duration = Duration::from_millis(600);
pub const PAGE_TURN_COOLDOWN: Duration = Duration::from_millis(1200);

pub const LOG_PRESS: &str = "left button down / drag";
pub const LOG_RELEASE: &str = "left button released";
pub const LOG_RIGHT_CLICK: &str = "triggered: right click";
pub const LOG_PREVIOUS_PAGE: &str = "triggered: previous page";
pub const LOG_NEXT_PAGE: &str = "triggered: next page";
pub const LOG_HAND_LOST: &str = "hand lost - button released automatically";
pub const LOG_STOPPED_WHILE_DRAGGING: &str = "loop stopped - button released";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DispatchOutcome {
    pub actions: Vec<InputAction>,
    pub log: Option<&'static str>,
    pub tone: Option<Tone>,
}

impl DispatchOutcome {
    fn release(log: &'static str) -> Self {
        Self {
            actions: vec![InputAction::ButtonUp(MouseButton::Left)],
            log: Some(log),
            tone: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty() && self.log.is_none() && self.tone.is_none()
    }
}

/// Per-run state. Created zeroed when a loop starts and dropped when it ends.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    pub smoother: PointerSmoother,
    pub dragging: bool,
    pub last_right_click: Option<Instant>,
    pub last_page_turn: Option<Instant>,
}

#[derive(Debug, Default)]
pub struct Dispatcher {
    session: SessionState,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn is_dragging(&self) -> bool {
        self.session.dragging
    }

    pub fn dispatch(
        &mut self,
        gesture: &Gesture,
        settings: &GestureSettings,
        now: Instant,
    ) -> DispatchOutcome {
        let session = &mut self.session;

        // A held button must never outlive the pointing pose.
        if session.dragging && !matches!(gesture, Gesture::Point { .. }) {
            session.dragging = false;
            return DispatchOutcome::release(if gesture.hand_visible() {
                LOG_RELEASE
            } else {
                LOG_HAND_LOST
            });
        }

        let threshold = settings.click_threshold as f32;
        let mut outcome = DispatchOutcome::default();

        match *gesture {
            Gesture::NoHand | Gesture::Idle => {}
            Gesture::Point {
                target,
                pinch_distance,
                ..
            } => {
                let position = session.smoother.step(target, settings.smoothing);
                outcome.actions.push(InputAction::MoveTo(position));

                if pinch_distance < threshold {
                    if !session.dragging {
                        session.dragging = true;
                        outcome
                            .actions
                            .push(InputAction::ButtonDown(MouseButton::Left));
                        outcome.log = Some(LOG_PRESS);
                        outcome.tone = Some(Tone::PRESS);
                    }
                } else if session.dragging {
                    session.dragging = false;
                    outcome.actions.push(InputAction::ButtonUp(MouseButton::Left));
                    outcome.log = Some(LOG_RELEASE);
                }
            }
            Gesture::TwoFinger { pinch_distance, .. } => {
                if pinch_distance < threshold
                    && cooldown_elapsed(session.last_right_click, now, RIGHT_CLICK_COOLDOWN)
                {
                    session.last_right_click = Some(now);
                    outcome.actions.push(InputAction::Click(MouseButton::Right));
                    outcome.log = Some(LOG_RIGHT_CLICK);
                    outcome.tone = Some(Tone::RIGHT_CLICK);
                }
            }
            Gesture::ThreeFinger { zone, .. } => {
                if cooldown_elapsed(session.last_page_turn, now, PAGE_TURN_COOLDOWN) {
                    let page = match zone {
                        PageZone::Previous => Some((NavKey::LeftArrow, LOG_PREVIOUS_PAGE)),
                        PageZone::Next => Some((NavKey::RightArrow, LOG_NEXT_PAGE)),
                        PageZone::Neutral => None,
                    };
                    if let Some((key, log)) = page {
                        session.last_page_turn = Some(now);
                        outcome.actions.push(InputAction::KeyPress(key));
                        outcome.log = Some(log);
                        outcome.tone = Some(Tone::PAGE_TURN);
                    }
                }
            }
        }

        if !settings.sound_enabled {
            outcome.tone = None;
        }
        outcome
    }

    /// Releases a held button when the loop is shutting down.
    pub fn release_on_stop(&mut self) -> DispatchOutcome {
        if !self.session.dragging {
            return DispatchOutcome::default();
        }
        self.session.dragging = false;
        DispatchOutcome::release(LOG_STOPPED_WHILE_DRAGGING)
    }
}

fn cooldown_elapsed(last: Option<Instant>, now: Instant, cooldown: Duration) -> bool {
    last.map_or(true, |at| now.saturating_duration_since(at) >= cooldown)
}

#[cfg(test)]
#[path = "tests/dispatcher_tests.rs"]
mod tests;
