//! UI layer for the desktop GUI: welcome page and live console.

pub mod app;

pub use app::GestureApp;
