//! Error types for the inspector.

use thiserror::Error;

/// Errors raised while interpreting node-definition data.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("unknown argument type '{0}'")]
    UnknownArgType(String),
}

/// An inline validation message attached to a single form field.
///
/// These never abort anything: the panel shows them under the field and
/// refuses to submit the form while any are present.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    #[error("{field} is required")]
    Required { field: String },

    #[error("invalid value")]
    InvalidValue,

    #[error("either input '{input}' or argument '{arg}' ({desc}) must be set, but not both")]
    OneofMismatch {
        input: String,
        arg: String,
        desc: String,
    },

    #[error("oneof input '{input}' not found")]
    OneofInputNotFound { input: String },

    #[error("unknown node '{name}'{}", did_you_mean(.suggestion))]
    UnknownNode {
        name: String,
        suggestion: Option<String>,
    },
}

fn did_you_mean(suggestion: &Option<String>) -> String {
    match suggestion {
        Some(name) => format!(", did you mean '{name}'?"),
        None => String::new(),
    }
}
