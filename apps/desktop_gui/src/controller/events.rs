//! Folds engine events into the state the console page renders.

use std::collections::VecDeque;

use gesture_core::EngineEvent;
use shared::{error::StopReason, protocol::LogLine};

const MAX_LOG_LINES: usize = 500;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineStatus {
    Idle,
    Running,
    Stopped(StopReason),
}

impl EngineStatus {
    pub fn label(&self) -> String {
        match self {
            Self::Idle => "idle".to_string(),
            Self::Running => "running".to_string(),
            Self::Stopped(reason) => reason.describe(),
        }
    }
}

#[derive(Debug)]
pub struct ConsoleState {
    lines: VecDeque<String>,
    pub status: EngineStatus,
}

impl Default for ConsoleState {
    fn default() -> Self {
        Self {
            lines: VecDeque::with_capacity(MAX_LOG_LINES),
            status: EngineStatus::Idle,
        }
    }
}

impl ConsoleState {
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(String::as_str)
    }

    pub fn push_line(&mut self, line: &LogLine) {
        if self.lines.len() == MAX_LOG_LINES {
            self.lines.pop_front();
        }
        self.lines.push_back(line.to_string());
    }

    pub fn apply(&mut self, event: EngineEvent) {
        match event {
            EngineEvent::Log(line) => self.push_line(&line),
            EngineEvent::Stopped(reason) => {
                if reason.is_failure() {
                    tracing::warn!(reason = ?reason, "gesture engine ended");
                }
                self.status = EngineStatus::Stopped(reason);
            }
        }
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_only_the_most_recent_lines() {
        let mut console = ConsoleState::default();
        for idx in 0..MAX_LOG_LINES + 5 {
            console.apply(EngineEvent::Log(LogLine::now(format!("line {idx}"))));
        }

        let lines: Vec<_> = console.lines().collect();
        assert_eq!(lines.len(), MAX_LOG_LINES);
        assert!(lines[0].ends_with("line 5"));
        assert!(lines[MAX_LOG_LINES - 1].ends_with(&format!("line {}", MAX_LOG_LINES + 4)));
    }

    #[test]
    fn stop_event_updates_status() {
        let mut console = ConsoleState {
            status: EngineStatus::Running,
            ..ConsoleState::default()
        };
        let reason = StopReason::FrameReadFailed("unplugged".to_string());
        console.apply(EngineEvent::Stopped(reason.clone()));

        assert_eq!(console.status, EngineStatus::Stopped(reason));
        assert!(console.status.label().contains("unplugged"));
    }

    #[test]
    fn lines_carry_a_clock_prefix() {
        let mut console = ConsoleState::default();
        console.push_line(&LogLine::now("hello"));
        let line = console.lines().next().expect("line");
        assert!(line.starts_with('['));
        assert_eq!(&line[9..], "] hello");
    }
}
