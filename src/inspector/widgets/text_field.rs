//! Text field widget - a click-to-edit input for text and numbers.
//!
//! This widget edits a form field by:
//! 1. Clicking to enter edit mode and take input focus
//! 2. Typing, with Backspace to delete and Escape to revert
//! 3. Committing on Enter, Tab, or when focus moves elsewhere

use bevy::ecs::entity::Entity;
use bevy::ecs::event::Event;
use bevy::ecs::observer::On;
use bevy::input::ButtonState;
use bevy::input::keyboard::{Key, KeyboardInput};
use bevy::input_focus::{FocusedInput, InputFocus};
use bevy::picking::events::{Click, Pointer};
use bevy::prelude::*;

use crate::form::{FieldKey, FieldValue};
use crate::forms::OptionSource;

/// What a text field accepts and how its buffer becomes a value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextFieldKind {
    Text,
    Multiline,
    Int,
    Float,
}

impl TextFieldKind {
    /// Whether `ch` may be typed into this kind of field.
    pub fn accepts(self, ch: char) -> bool {
        match self {
            TextFieldKind::Text | TextFieldKind::Multiline => !ch.is_control(),
            TextFieldKind::Int => ch.is_ascii_digit() || ch == '-',
            TextFieldKind::Float => {
                ch.is_ascii_digit() || matches!(ch, '.' | '-' | 'e' | 'E' | '+')
            }
        }
    }

    /// Converts an edit buffer to a field value.
    ///
    /// Returns `None` when a numeric buffer does not parse; the edit is then
    /// reverted instead of committed.
    pub fn parse(self, buffer: &str) -> Option<FieldValue> {
        match self {
            TextFieldKind::Text | TextFieldKind::Multiline => {
                Some(FieldValue::Text(buffer.to_string()))
            }
            TextFieldKind::Int | TextFieldKind::Float if buffer.trim().is_empty() => {
                Some(FieldValue::Empty)
            }
            TextFieldKind::Int => buffer.trim().parse().ok().map(FieldValue::Int),
            TextFieldKind::Float => buffer
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|x| x.is_finite())
                .map(FieldValue::Float),
        }
    }
}

/// Marker component for a text field widget.
/// Contains the form field it edits and its input rules.
#[derive(Component, Clone)]
#[require(TextFieldEditState)]
pub struct TextField {
    /// The form field this widget edits.
    pub key: FieldKey,
    pub kind: TextFieldKind,
    /// Options offered while editing, if this is an auto-complete field.
    pub completion: Option<OptionSource>,
}

/// Tracks the edit state of a TextField widget.
#[derive(Component, Default)]
pub struct TextFieldEditState {
    /// Whether in text editing mode.
    pub editing: bool,
    /// Text buffer for editing mode.
    pub edit_buffer: String,
    /// The committed text (restored on Escape).
    pub original: String,
}

impl TextFieldEditState {
    pub fn new(original: impl Into<String>) -> Self {
        Self {
            original: original.into(),
            ..default()
        }
    }
}

/// Event emitted when a widget commits a value to a form field.
#[derive(Event, Clone, Debug)]
pub struct FieldCommitted {
    /// The UI entity that triggered this commit.
    pub source: Entity,
    pub key: FieldKey,
    pub value: FieldValue,
}

/// Event emitted when a text field's edit buffer changes or edit mode toggles.
#[derive(Event, Clone, Debug)]
pub struct TextFieldBufferChanged {
    pub entity: Entity,
    pub editing: bool,
}

/// Resource to queue commits for the form write-back system.
#[derive(Resource, Default)]
pub struct PendingFieldCommits {
    pub commits: Vec<FieldCommitted>,
}

// Observer: click enters edit mode
fn text_field_on_click(
    mut click: On<Pointer<Click>>,
    mut q_field: Query<&mut TextFieldEditState, With<TextField>>,
    mut input_focus: ResMut<InputFocus>,
    mut commands: Commands,
) {
    let Ok(mut state) = q_field.get_mut(click.entity) else {
        return;
    };
    click.propagate(false);
    if state.editing {
        return;
    }

    state.editing = true;
    state.edit_buffer = state.original.clone();
    input_focus.set(click.entity);
    commands.trigger(TextFieldBufferChanged {
        entity: click.entity,
        editing: true,
    });
}

/// What a key press did to a field in edit mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum KeyOutcome {
    Commit,
    Revert,
    Edited,
    Ignored,
}

/// Applies one key press to the edit buffer.
fn apply_key(kind: TextFieldKind, state: &mut TextFieldEditState, key: &Key) -> KeyOutcome {
    match key {
        Key::Enter | Key::Tab => KeyOutcome::Commit,
        Key::Escape => {
            state.editing = false;
            state.edit_buffer.clear();
            KeyOutcome::Revert
        }
        Key::Backspace => {
            state.edit_buffer.pop();
            KeyOutcome::Edited
        }
        Key::Space if kind.accepts(' ') => {
            state.edit_buffer.push(' ');
            KeyOutcome::Edited
        }
        Key::Character(c) if c.chars().all(|ch| kind.accepts(ch)) => {
            state.edit_buffer.push_str(c);
            KeyOutcome::Edited
        }
        _ => KeyOutcome::Ignored,
    }
}

/// Observer: handle keyboard input during edit mode
fn text_field_on_keyboard_input(
    trigger: On<FocusedInput<KeyboardInput>>,
    mut q_field: Query<(&TextField, &mut TextFieldEditState)>,
    mut input_focus: ResMut<InputFocus>,
    mut commands: Commands,
) {
    if trigger.input.state != ButtonState::Pressed {
        return;
    }

    let entity = trigger.focused_entity;
    let Ok((field, mut state)) = q_field.get_mut(entity) else {
        return;
    };
    if !state.editing {
        return;
    }

    match apply_key(field.kind, &mut state, &trigger.input.logical_key) {
        KeyOutcome::Commit => {
            commit_edit(entity, field, &mut state, &mut commands);
            input_focus.clear();
        }
        KeyOutcome::Revert => {
            input_focus.clear();
            commands.trigger(TextFieldBufferChanged {
                entity,
                editing: false,
            });
        }
        KeyOutcome::Edited => {
            commands.trigger(TextFieldBufferChanged {
                entity,
                editing: true,
            });
        }
        KeyOutcome::Ignored => {}
    }
}

/// Leaves edit mode and emits the parsed buffer, or reverts it.
fn commit_edit(
    entity: Entity,
    field: &TextField,
    state: &mut TextFieldEditState,
    commands: &mut Commands,
) {
    state.editing = false;
    let buffer = std::mem::take(&mut state.edit_buffer);
    match field.kind.parse(&buffer) {
        Some(value) => {
            state.original = buffer;
            commands.trigger(FieldCommitted {
                source: entity,
                key: field.key.clone(),
                value,
            });
        }
        None => debug!("discarding unparsable input for {}", field.key),
    }
    commands.trigger(TextFieldBufferChanged {
        entity,
        editing: false,
    });
}

/// System: commit fields that lost input focus while editing.
fn commit_on_focus_loss(
    input_focus: Res<InputFocus>,
    mut q_field: Query<(Entity, &TextField, &mut TextFieldEditState)>,
    mut commands: Commands,
) {
    if !input_focus.is_changed() {
        return;
    }
    for (entity, field, mut state) in q_field.iter_mut() {
        if state.editing && input_focus.get() != Some(entity) {
            commit_edit(entity, field, &mut state, &mut commands);
        }
    }
}

/// Observer: redraw the field text when the buffer or mode changes
fn update_text_field_display(
    trigger: On<TextFieldBufferChanged>,
    q_field: Query<(&TextFieldEditState, &Children)>,
    mut q_text: Query<&mut Text>,
) {
    let Ok((state, children)) = q_field.get(trigger.entity) else {
        return;
    };
    let shown = if state.editing {
        format!("{}|", state.edit_buffer)
    } else {
        state.original.clone()
    };
    for child in children.iter() {
        if let Ok(mut text) = q_text.get_mut(child) {
            text.0 = shown.clone();
        }
    }
}

/// Observer that queues commits for later processing
fn queue_field_commit(trigger: On<FieldCommitted>, mut pending: ResMut<PendingFieldCommits>) {
    pending.commits.push(trigger.event().clone());
}

/// Plugin that adds the TextField widget observers.
pub struct TextFieldPlugin;

impl Plugin for TextFieldPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PendingFieldCommits>()
            // Editing
            .add_observer(text_field_on_click)
            .add_observer(text_field_on_keyboard_input)
            // Display updates
            .add_observer(update_text_field_display)
            // Commit processing
            .add_observer(queue_field_commit)
            .add_systems(Update, commit_on_focus_loss);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_kinds_filter_characters() {
        assert!(TextFieldKind::Int.accepts('7'));
        assert!(!TextFieldKind::Int.accepts('.'));
        assert!(TextFieldKind::Float.accepts('e'));
        assert!(!TextFieldKind::Float.accepts('x'));
        assert!(TextFieldKind::Text.accepts('x'));
    }

    #[test]
    fn buffers_parse_by_kind() {
        assert_eq!(TextFieldKind::Int.parse("42"), Some(FieldValue::Int(42)));
        assert_eq!(TextFieldKind::Int.parse(" "), Some(FieldValue::Empty));
        assert_eq!(TextFieldKind::Int.parse("4-2"), None);
        assert_eq!(TextFieldKind::Float.parse("1e3"), Some(FieldValue::Float(1000.0)));
        assert_eq!(TextFieldKind::Float.parse("1e999"), None);
        assert_eq!(TextFieldKind::Float.parse("-1e999"), None);
        assert_eq!(
            TextFieldKind::Multiline.parse(""),
            Some(FieldValue::Text(String::new()))
        );
    }

    fn editing(buffer: &str) -> TextFieldEditState {
        TextFieldEditState {
            editing: true,
            edit_buffer: buffer.to_string(),
            original: "old".to_string(),
        }
    }

    #[test]
    fn escape_reverts_to_the_committed_text() {
        let mut state = editing("typed");
        let outcome = apply_key(TextFieldKind::Text, &mut state, &Key::Escape);
        assert_eq!(outcome, KeyOutcome::Revert);
        assert!(!state.editing);
        assert!(state.edit_buffer.is_empty());
        assert_eq!(state.original, "old");
    }

    #[test]
    fn keys_edit_the_buffer_by_kind() {
        let mut state = editing("4");
        let digit = Key::Character("2".into());
        let letter = Key::Character("x".into());
        assert_eq!(apply_key(TextFieldKind::Int, &mut state, &digit), KeyOutcome::Edited);
        assert_eq!(apply_key(TextFieldKind::Int, &mut state, &letter), KeyOutcome::Ignored);
        assert_eq!(apply_key(TextFieldKind::Int, &mut state, &Key::Space), KeyOutcome::Ignored);
        assert_eq!(state.edit_buffer, "42");

        assert_eq!(apply_key(TextFieldKind::Int, &mut state, &Key::Backspace), KeyOutcome::Edited);
        assert_eq!(apply_key(TextFieldKind::Int, &mut state, &Key::Tab), KeyOutcome::Commit);
        assert_eq!(state.edit_buffer, "4");
        assert!(state.editing);
    }

    #[test]
    fn leaving_a_field_commits_its_buffer() {
        let mut app = App::new();
        app.init_resource::<InputFocus>().add_plugins(TextFieldPlugin);
        let field = app
            .world_mut()
            .spawn((
                TextField {
                    key: FieldKey::Desc,
                    kind: TextFieldKind::Multiline,
                    completion: None,
                },
                editing("typed"),
            ))
            .id();
        app.world_mut().resource_mut::<InputFocus>().set(field);
        app.update();
        assert!(app.world().resource::<PendingFieldCommits>().commits.is_empty());

        app.world_mut().resource_mut::<InputFocus>().clear();
        app.update();

        let commits = &app.world().resource::<PendingFieldCommits>().commits;
        assert_eq!(commits.len(), 1);
        assert_eq!(commits[0].key, FieldKey::Desc);
        assert_eq!(commits[0].value, FieldValue::text("typed"));
        let state = app.world().get::<TextFieldEditState>(field).unwrap();
        assert!(!state.editing);
        assert_eq!(state.original, "typed");
    }

    #[test]
    fn unparsable_numbers_revert_on_focus_loss() {
        let mut app = App::new();
        app.init_resource::<InputFocus>().add_plugins(TextFieldPlugin);
        let field = app
            .world_mut()
            .spawn((
                TextField {
                    key: FieldKey::Arg("count".into()),
                    kind: TextFieldKind::Int,
                    completion: None,
                },
                editing("4-2"),
            ))
            .id();
        app.world_mut().resource_mut::<InputFocus>().set(field);
        app.update();
        app.world_mut().resource_mut::<InputFocus>().clear();
        app.update();

        assert!(app.world().resource::<PendingFieldCommits>().commits.is_empty());
        let state = app.world().get::<TextFieldEditState>(field).unwrap();
        assert!(!state.editing);
        assert_eq!(state.original, "old");
    }
}
