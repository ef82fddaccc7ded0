//! Field-level form state shared by every inspector view.

use core::fmt;
use serde_json::Value;
use std::collections::BTreeMap;

use crate::error::FieldError;

/// Identifies one field of an inspector form.
///
/// Displays as the dotted name the editor uses, e.g. `args.time` or `input.0`.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FieldKey {
    Id,
    Name,
    Type,
    Desc,
    Doc,
    Children,
    Debug,
    Disabled,
    Path,
    Export,
    /// Argument, by argument name.
    Arg(String),
    /// Input variable, by slot index.
    Input(usize),
    /// Output variable, by slot index.
    Output(usize),
}

impl fmt::Display for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldKey::Id => f.write_str("id"),
            FieldKey::Name => f.write_str("name"),
            FieldKey::Type => f.write_str("type"),
            FieldKey::Desc => f.write_str("desc"),
            FieldKey::Doc => f.write_str("doc"),
            FieldKey::Children => f.write_str("children"),
            FieldKey::Debug => f.write_str("debug"),
            FieldKey::Disabled => f.write_str("disabled"),
            FieldKey::Path => f.write_str("path"),
            FieldKey::Export => f.write_str("export"),
            FieldKey::Arg(name) => write!(f, "args.{name}"),
            FieldKey::Input(i) => write!(f, "input.{i}"),
            FieldKey::Output(i) => write!(f, "output.{i}"),
        }
    }
}

/// Current value of a form field.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum FieldValue {
    #[default]
    Empty,
    Text(String),
    Bool(bool),
    Int(i64),
    Float(f64),
    /// Value picked from an enum argument's options.
    Choice(Value),
}

impl FieldValue {
    pub fn text(s: impl Into<String>) -> Self {
        FieldValue::Text(s.into())
    }

    /// Whether a required-field check should reject this value.
    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::Empty => true,
            FieldValue::Text(s) => s.is_empty(),
            FieldValue::Choice(v) => v.is_null(),
            _ => false,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> bool {
        matches!(self, FieldValue::Bool(true))
    }

    /// Non-empty text, otherwise `None`.
    pub fn non_empty_text(&self) -> Option<&str> {
        self.as_str().filter(|s| !s.is_empty())
    }

    /// Text shown in a widget for this value.
    pub fn display(&self) -> String {
        match self {
            FieldValue::Empty => String::new(),
            FieldValue::Text(s) => s.clone(),
            FieldValue::Bool(b) => b.to_string(),
            FieldValue::Int(n) => n.to_string(),
            FieldValue::Float(x) => x.to_string(),
            FieldValue::Choice(Value::String(s)) => s.clone(),
            FieldValue::Choice(v) => v.to_string(),
        }
    }

    /// Converts to a JSON value, `None` for empty values.
    pub fn to_json(&self) -> Option<Value> {
        if self.is_empty() {
            return None;
        }
        match self {
            FieldValue::Empty => None,
            FieldValue::Text(s) => Some(Value::String(s.clone())),
            FieldValue::Bool(b) => Some(Value::Bool(*b)),
            FieldValue::Int(n) => Some(Value::from(*n)),
            FieldValue::Float(x) => serde_json::Number::from_f64(*x).map(Value::Number),
            FieldValue::Choice(v) => Some(v.clone()),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Bool(b)
    }
}

impl From<Option<String>> for FieldValue {
    fn from(s: Option<String>) -> Self {
        s.map_or(FieldValue::Empty, FieldValue::Text)
    }
}

static EMPTY: FieldValue = FieldValue::Empty;

/// Values and validation errors of one form.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FormState {
    values: BTreeMap<FieldKey, FieldValue>,
    errors: BTreeMap<FieldKey, Vec<FieldError>>,
}

impl FormState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.values.clear();
        self.errors.clear();
    }

    /// Value of a field, [`FieldValue::Empty`] when never set.
    pub fn get(&self, key: &FieldKey) -> &FieldValue {
        self.values.get(key).unwrap_or(&EMPTY)
    }

    pub fn set(&mut self, key: FieldKey, value: impl Into<FieldValue>) {
        self.values.insert(key, value.into());
    }

    pub fn values(&self) -> impl Iterator<Item = (&FieldKey, &FieldValue)> {
        self.values.iter()
    }

    pub fn errors(&self, key: &FieldKey) -> &[FieldError] {
        self.errors.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn set_errors(&mut self, errors: BTreeMap<FieldKey, Vec<FieldError>>) {
        self.errors = errors;
    }

    pub fn has_errors(&self) -> bool {
        self.errors.values().any(|e| !e.is_empty())
    }

    pub fn all_errors(&self) -> impl Iterator<Item = (&FieldKey, &FieldError)> {
        self.errors
            .iter()
            .flat_map(|(key, errors)| errors.iter().map(move |e| (key, e)))
    }
}
