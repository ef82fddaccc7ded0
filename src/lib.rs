//! A property inspector for behavior tree editors.
//!
//! The form logic (loading, validation, completion and the actions sent to
//! the editor) is independent of any UI; the [`inspector`] module renders it
//! in a Bevy window built with bevy_feathers.

pub mod error;
pub mod form;
pub mod forms;
pub mod inspector;
pub mod markdown;
pub mod model;
pub mod options;
pub mod validation;
pub mod workspace;

// Re-export the main plugin for convenience
pub use inspector::{ActionDispatched, InspectedWorkspace, InspectorConfig, InspectorWindowPlugin};
pub use workspace::{EditAction, InMemoryWorkspace, Workspace};
