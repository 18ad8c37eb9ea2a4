//! Controller layer: engine event folding and command routing.

pub mod events;
pub mod orchestration;
