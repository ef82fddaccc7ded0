//! Inspector UI module.
//!
//! Provides a separate window that shows the form of the selected tree,
//! node or node definition using bevy_ui and bevy_experimental_feathers.

pub mod config;
pub mod panels;
pub mod plugin;
pub mod state;
pub mod widgets;

pub use config::InspectorConfig;
pub use panels::ActionDispatched;
pub use plugin::{InspectorSet, InspectorWindow, InspectorWindowPlugin};
pub use state::{InspectedWorkspace, InspectorCache, InspectorState, InspectorWindowState};
pub use widgets::{ChoiceButton, FieldCommitted, TextField, TextFieldKind, TextFieldPlugin};
