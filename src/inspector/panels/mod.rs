//! UI panels for the inspector.

pub mod form_panel;

pub use form_panel::*;
