//! Toolkit-independent description of an inspector form.

use crate::form::FieldKey;
use crate::model::ArgOption;

/// Where an auto-complete field takes its options from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OptionSource {
    NodeDefs,
    Variables,
    Subtrees,
}

/// Control used to edit a field.
#[derive(Clone, Debug, PartialEq)]
pub enum Widget {
    ReadOnly,
    Text,
    TextArea,
    Int,
    Float,
    Switch,
    Select(Vec<ArgOption>),
    AutoComplete(OptionSource),
}

#[derive(Clone, Debug, PartialEq)]
pub struct FieldSpec {
    pub key: FieldKey,
    pub label: String,
    pub widget: Widget,
    pub required: bool,
    pub disabled: bool,
    /// Draw the field with the error colour, independently of validation.
    pub highlight: bool,
}

impl FieldSpec {
    pub fn new(key: FieldKey, label: impl Into<String>, widget: Widget) -> Self {
        Self {
            key,
            label: label.into(),
            widget,
            required: false,
            disabled: false,
            highlight: false,
        }
    }

    pub fn read_only(key: FieldKey, label: impl Into<String>) -> Self {
        Self::new(key, label, Widget::ReadOnly)
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    pub fn highlight(mut self, highlight: bool) -> Self {
        self.highlight = highlight;
        self
    }

    /// Whether commits to this field are accepted.
    pub fn is_editable(&self) -> bool {
        !self.disabled && self.widget != Widget::ReadOnly
    }
}

/// A titled group of fields, optionally preceded by documentation text.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FormSection {
    pub heading: Option<String>,
    /// Markdown text shown before the fields.
    pub doc: Option<String>,
    pub fields: Vec<FieldSpec>,
}

impl FormSection {
    pub fn titled(heading: impl Into<String>, fields: Vec<FieldSpec>) -> Self {
        Self {
            heading: Some(heading.into()),
            doc: None,
            fields,
        }
    }
}

/// Everything a panel needs to draw one form.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FormLayout {
    pub title: String,
    pub sections: Vec<FormSection>,
    /// Offer the "Edit Subtree" action.
    pub edit_subtree: bool,
}

impl FormLayout {
    pub fn fields(&self) -> impl Iterator<Item = &FieldSpec> {
        self.sections.iter().flat_map(|section| section.fields.iter())
    }

    pub fn field(&self, key: &FieldKey) -> Option<&FieldSpec> {
        self.fields().find(|field| &field.key == key)
    }
}
