//! Buttons that commit a fixed value: switches, enum options and
//! auto-complete suggestions.

use bevy::ecs::observer::On;
use bevy::input_focus::InputFocus;
use bevy::prelude::*;
use bevy::ui_widgets::Activate;

use super::text_field::{FieldCommitted, TextFieldBufferChanged, TextFieldEditState};
use crate::form::{FieldKey, FieldValue};

/// A button that commits `value` to `key` when activated.
#[derive(Component, Clone, Debug)]
pub struct ChoiceButton {
    pub key: FieldKey,
    pub value: FieldValue,
    /// Text field this choice completes; its edit is ended without a commit.
    pub field: Option<Entity>,
}

/// Observer for choice button activation.
pub fn on_choice_activate(
    activate: On<Activate>,
    choices: Query<&ChoiceButton>,
    mut fields: Query<&mut TextFieldEditState>,
    mut input_focus: ResMut<InputFocus>,
    mut commands: Commands,
) {
    let Ok(choice) = choices.get(activate.entity) else {
        return;
    };

    if let Some(field) = choice.field
        && let Ok(mut state) = fields.get_mut(field)
    {
        state.editing = false;
        state.edit_buffer.clear();
        state.original = choice.value.display();
        if input_focus.get() == Some(field) {
            input_focus.clear();
        }
        commands.trigger(TextFieldBufferChanged {
            entity: field,
            editing: false,
        });
    }

    commands.trigger(FieldCommitted {
        source: activate.entity,
        key: choice.key.clone(),
        value: choice.value.clone(),
    });
}
