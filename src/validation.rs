//! Inline validation rules for node forms.

use serde_json::Value;
use std::collections::BTreeMap;

use crate::error::FieldError;
use crate::form::{FieldKey, FieldValue, FormState};
use crate::model::{ArgType, NodeArg, NodeDef, NodeDefs, is_required_slot, slot_name};
use crate::options::closest_match;

/// Errors found in a form, keyed by field. Fields without errors are absent.
pub type FieldErrors = BTreeMap<FieldKey, Vec<FieldError>>;

/// An argument and its paired input variable agree when exactly one is set.
pub fn check_oneof(arg: &FieldValue, input: &FieldValue) -> bool {
    arg.is_empty() != input.is_empty()
}

/// Whether `text` is acceptable for a `json` argument.
pub fn is_valid_json_text(text: &str) -> bool {
    text == "null" || serde_json::from_str::<Value>(text).is_ok()
}

/// Argument paired with an input slot through its `oneof` prefix.
fn oneof_arg_for_slot<'a>(def: &'a NodeDef, slot: &str) -> Option<&'a NodeArg> {
    def.args
        .iter()
        .find(|arg| arg.oneof.as_deref().is_some_and(|p| slot.starts_with(p)))
}

/// Validates every field of a node form against its definition.
pub fn validate_node(form: &FormState, def: &NodeDef) -> FieldErrors {
    let mut errors = FieldErrors::new();

    for (i, slot) in def.input.iter().enumerate() {
        let key = FieldKey::Input(i);
        let value = form.get(&key);
        let mut field_errors = Vec::new();
        if is_required_slot(slot) && value.is_empty() {
            field_errors.push(FieldError::Required {
                field: slot_name(slot),
            });
        }
        if let Some(arg) = oneof_arg_for_slot(def, slot) {
            let arg_value = form.get(&FieldKey::Arg(arg.name.clone()));
            if !check_oneof(arg_value, value) {
                field_errors.push(FieldError::OneofMismatch {
                    input: slot.clone(),
                    arg: arg.name.clone(),
                    desc: arg.desc.clone(),
                });
            }
        }
        push_errors(&mut errors, key, field_errors);
    }

    for arg in &def.args {
        let key = FieldKey::Arg(arg.name.clone());
        let field_errors = validate_arg(form, def, arg);
        push_errors(&mut errors, key, field_errors);
    }

    for (i, slot) in def.output.iter().enumerate() {
        let key = FieldKey::Output(i);
        if is_required_slot(slot) && form.get(&key).is_empty() {
            push_errors(
                &mut errors,
                key,
                vec![FieldError::Required {
                    field: slot_name(slot),
                }],
            );
        }
    }

    errors
}

fn validate_arg(form: &FormState, def: &NodeDef, arg: &NodeArg) -> Vec<FieldError> {
    let value = form.get(&FieldKey::Arg(arg.name.clone()));
    let mut errors = Vec::new();

    if arg.is_required() && value.is_empty() {
        errors.push(FieldError::Required {
            field: arg.desc.clone(),
        });
    }

    if arg.kind.ty == ArgType::Json {
        if let Some(text) = value.non_empty_text()
            && !is_valid_json_text(text)
        {
            errors.push(FieldError::InvalidValue);
            return errors;
        }
    } else if !value.is_empty() && value.to_json().is_none() {
        // e.g. a non-finite float, which JSON cannot carry
        errors.push(FieldError::InvalidValue);
        return errors;
    }

    let Some(prefix) = arg.oneof.as_deref() else {
        return errors;
    };
    let Some(idx) = def.input.iter().position(|slot| slot.starts_with(prefix)) else {
        errors.push(FieldError::OneofInputNotFound {
            input: prefix.to_string(),
        });
        return errors;
    };
    if !check_oneof(value, form.get(&FieldKey::Input(idx))) {
        errors.push(FieldError::OneofMismatch {
            input: def.input[idx].clone(),
            arg: arg.name.clone(),
            desc: arg.desc.clone(),
        });
    }
    errors
}

/// Reports a node whose definition name is not registered.
pub fn validate_node_name(name: &str, defs: &NodeDefs) -> Vec<FieldError> {
    if defs.contains(name) {
        return Vec::new();
    }
    let suggestion = closest_match(defs.iter().map(|def| def.name.as_str()), name);
    vec![FieldError::UnknownNode {
        name: name.to_string(),
        suggestion: suggestion.map(str::to_string),
    }]
}

fn push_errors(errors: &mut FieldErrors, key: FieldKey, field_errors: Vec<FieldError>) {
    if !field_errors.is_empty() {
        errors.insert(key, field_errors);
    }
}
