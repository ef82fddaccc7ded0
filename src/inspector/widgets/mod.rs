//! Inspector UI widgets.
//!
//! Provides the editable controls of a form:
//! - TextField: click-to-edit text, multiline and numeric input
//!   - Enter or Tab commits, Escape reverts
//!   - Losing focus commits
//! - ChoiceButton: commits a fixed value (switches, enum options, suggestions)

pub mod choice;
pub mod text_field;

pub use choice::{ChoiceButton, on_choice_activate};
pub use text_field::{
    FieldCommitted, PendingFieldCommits, TextField, TextFieldBufferChanged, TextFieldEditState,
    TextFieldKind, TextFieldPlugin,
};
