//! Bridge between the UI thread and the gesture engine thread.

pub mod commands;
pub mod runtime;
