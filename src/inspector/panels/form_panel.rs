//! The inspector panel: renders the active form and writes commits back
//! through the workspace.

use bevy::ecs::hierarchy::{ChildSpawner, ChildSpawnerCommands};
use bevy::ecs::observer::On;
use bevy::feathers::controls::{ButtonProps, ButtonVariant, button};
use bevy::input_focus::InputFocus;
use bevy::picking::events::{Click, Pointer};
use bevy::prelude::*;
use bevy::ui::Val::*;
use bevy::ui_widgets::{Activate, ControlOrientation, CoreScrollbarThumb, Scrollbar, observe};
use serde_json::Value;
use std::path::{Path, PathBuf};

use crate::error::FieldError;
use crate::form::{FieldKey, FieldValue, FormState};
use crate::forms::{ActiveForm, FieldSpec, FormLayout, InspectorTarget, OptionSource, Widget};
use crate::inspector::config::InspectorConfig;
use crate::inspector::state::{InspectedWorkspace, InspectorCache, InspectorState};
use crate::inspector::widgets::{
    ChoiceButton, PendingFieldCommits, TextField, TextFieldBufferChanged, TextFieldEditState,
    TextFieldKind, on_choice_activate,
};
use crate::model::{
    EditingNode, EditingNodeDef, EditingTree, NodeDef, NodeDefs, TreeGraphData,
};
use crate::markdown::{self, SpanStyle};
use crate::options::filter_options;
use crate::workspace::{EditAction, Workspace};

/// Marker component for the inspector panel container.
#[derive(Component)]
pub struct InspectorPanel;

/// Marker for the scrollable form content area.
#[derive(Component)]
pub struct InspectorContent;

/// Marker for the "Edit Subtree" button.
#[derive(Component)]
pub struct EditSubtreeButton;

/// Container for the auto-complete suggestions of a text field.
#[derive(Component, Clone, Copy)]
pub struct SuggestionList {
    pub field: Entity,
    pub source: OptionSource,
}

/// Event emitted for every action the inspector sends to the workspace.
#[derive(Event, Clone, Debug)]
pub struct ActionDispatched {
    pub action: EditAction,
}

/// Passes everything through to the wrapped workspace, keeping a copy of
/// each dispatched action.
struct Recorder<'a> {
    inner: &'a mut dyn Workspace,
    actions: Vec<EditAction>,
}

impl<'a> Recorder<'a> {
    fn new(inner: &'a mut dyn Workspace) -> Self {
        Self {
            inner,
            actions: Vec::new(),
        }
    }

    fn announce(self, commands: &mut Commands) {
        for action in self.actions {
            commands.trigger(ActionDispatched { action });
        }
    }
}

impl Workspace for Recorder<'_> {
    fn editing_tree(&self) -> Option<&EditingTree> {
        self.inner.editing_tree()
    }

    fn editing_node(&self) -> Option<&EditingNode> {
        self.inner.editing_node()
    }

    fn editing_node_def(&self) -> Option<&EditingNodeDef> {
        self.inner.editing_node_def()
    }

    fn editing_graph(&self) -> Option<&TreeGraphData> {
        self.inner.editing_graph()
    }

    fn node_defs(&self) -> &NodeDefs {
        self.inner.node_defs()
    }

    fn node_def(&self, name: &str) -> NodeDef {
        self.inner.node_def(name)
    }

    fn all_files(&self) -> &[PathBuf] {
        self.inner.all_files()
    }

    fn relative(&self, path: &Path) -> String {
        self.inner.relative(path)
    }

    fn on_editing_node(&mut self, node: EditingNode) {
        self.inner.on_editing_node(node);
    }

    fn dispatch(&mut self, action: EditAction) {
        self.actions.push(action.clone());
        self.inner.dispatch(action);
    }
}

/// Re-selects what to inspect and reloads the form when it changed.
pub fn refresh_inspector_target(
    workspace: Res<InspectedWorkspace>,
    mut state: ResMut<InspectorState>,
    mut cache: ResMut<InspectorCache>,
) {
    let target = InspectorTarget::select(workspace.get());
    if target == state.target {
        return;
    }

    debug!("inspector target changed");
    state.keep_focus &= state.target.same_subject(&target);
    state.form = ActiveForm::for_target(&target, workspace.get());
    state.target = target;
    state.needs_rebuild = true;
    cache.refresh(workspace.get());
}

/// Applies queued widget commits to the active form.
pub fn apply_pending_field_commits(
    mut pending: ResMut<PendingFieldCommits>,
    mut workspace: ResMut<InspectedWorkspace>,
    mut state: ResMut<InspectorState>,
    mut commands: Commands,
) {
    if pending.commits.is_empty() {
        return;
    }

    let commits = std::mem::take(&mut pending.commits);
    let Some(form) = state.form.as_mut() else {
        warn!("dropping {} commits, nothing is inspected", commits.len());
        return;
    };

    let mut recorder = Recorder::new(workspace.get_mut());
    for commit in commits {
        form.commit(commit.key, commit.value, &mut recorder);
    }
    recorder.announce(&mut commands);
    state.needs_rebuild = true;
    state.keep_focus = true;
}

/// Observer for the "Edit Subtree" button.
fn on_edit_subtree(
    activate: On<Activate>,
    buttons: Query<(), With<EditSubtreeButton>>,
    state: Res<InspectorState>,
    mut workspace: ResMut<InspectedWorkspace>,
    mut commands: Commands,
) {
    if !buttons.contains(activate.entity) {
        return;
    }
    let Some(form) = state.form.as_ref() else {
        return;
    };

    let mut recorder = Recorder::new(workspace.get_mut());
    form.edit_subtree(&mut recorder);
    recorder.announce(&mut commands);
}

/// Observer: clicks that reach the panel background end text editing.
fn clear_focus_on_background_click(
    _click: On<Pointer<Click>>,
    mut input_focus: ResMut<InputFocus>,
) {
    if input_focus.get().is_some() {
        input_focus.clear();
    }
}

/// Observer: rebuild the suggestion list of a text field from its buffer.
pub fn refresh_suggestions(
    trigger: On<TextFieldBufferChanged>,
    lists: Query<(Entity, &SuggestionList)>,
    fields: Query<(&TextField, &TextFieldEditState)>,
    cache: Res<InspectorCache>,
    config: Res<InspectorConfig>,
    mut commands: Commands,
) {
    let Some((list, suggestions)) = lists
        .iter()
        .find(|(_, suggestions)| suggestions.field == trigger.entity)
    else {
        return;
    };
    let Ok((field, state)) = fields.get(trigger.entity) else {
        return;
    };

    commands.entity(list).despawn_related::<Children>();
    if !state.editing {
        return;
    }

    let matches = filter_options(cache.options(suggestions.source), &state.edit_buffer);
    let font_size = config.small_font_size;
    commands.entity(list).with_children(|p| {
        for option in matches.into_iter().take(config.max_suggestions) {
            p.spawn((
                button(
                    ButtonProps::default(),
                    ChoiceButton {
                        key: field.key.clone(),
                        value: FieldValue::Text(option.value.clone()),
                        field: Some(suggestions.field),
                    },
                    Spawn(label_text(option.label.clone(), font_size, Color::WHITE)),
                ),
                observe(on_choice_activate),
            ));
        }
    });
}

/// The text field that had input focus when the panel was rebuilt.
struct FocusedEdit {
    key: FieldKey,
    buffer: String,
}

fn focused_edit(world: &World) -> Option<FocusedEdit> {
    let focused = world.get_resource::<InputFocus>()?.get()?;
    let field = world.get::<TextField>(focused)?;
    let state = world.get::<TextFieldEditState>(focused)?;
    state.editing.then(|| FocusedEdit {
        key: field.key.clone(),
        buffer: state.edit_buffer.clone(),
    })
}

/// Puts an interrupted edit back on the rebuilt field with the same key.
fn restore_focused_edit(world: &mut World, mut edit: FocusedEdit) {
    let mut fields = world.query::<(Entity, &TextField, &mut TextFieldEditState)>();
    let mut restored = None;
    for (entity, field, mut state) in fields.iter_mut(world) {
        if field.key == edit.key {
            state.editing = true;
            state.edit_buffer = std::mem::take(&mut edit.buffer);
            restored = Some(entity);
            break;
        }
    }

    let Some(entity) = restored else {
        debug!("{} is gone after the rebuild, dropping its edit", edit.key);
        if let Some(mut input_focus) = world.get_resource_mut::<InputFocus>() {
            input_focus.clear();
        }
        return;
    };
    if let Some(mut input_focus) = world.get_resource_mut::<InputFocus>() {
        input_focus.set(entity);
    }
    world.trigger(TextFieldBufferChanged {
        entity,
        editing: true,
    });
}

/// Exclusive system that redraws the form when the inspector state asks for it.
pub fn sync_inspector_panel(world: &mut World) {
    let (layout, form, keep_focus) = {
        let mut state = world.resource_mut::<InspectorState>();
        if !state.needs_rebuild {
            return;
        }
        state.needs_rebuild = false;
        let keep_focus = std::mem::take(&mut state.keep_focus);
        match state.form.as_ref() {
            Some(active) => (Some(active.layout()), Some(active.form().clone()), keep_focus),
            None => (None, None, keep_focus),
        }
    };
    let edit = focused_edit(world);

    let mut query = world.query_filtered::<Entity, With<InspectorContent>>();
    let Some(content) = query.iter(world).next() else {
        return;
    };

    let children: Vec<Entity> = world
        .get::<Children>(content)
        .map(|c| c.iter().collect())
        .unwrap_or_default();
    for child in children {
        if world.entities().contains(child) {
            world.entity_mut(child).despawn();
        }
    }

    let config = world.resource::<InspectorConfig>().clone();
    match (layout, form) {
        (Some(layout), Some(form)) => {
            world
                .entity_mut(content)
                .with_children(|p| spawn_form(p, &layout, &form, &config));
        }
        _ => {
            world.entity_mut(content).with_children(|p| {
                p.spawn((
                    label_text(
                        "Select a tree or a node to inspect",
                        config.body_font_size,
                        config.muted_text_color,
                    ),
                    Node {
                        padding: UiRect::all(Px(16.0)),
                        ..default()
                    },
                ));
            });
        }
    }

    // The focused field was despawned with the old rows
    match edit {
        Some(edit) if keep_focus => restore_focused_edit(world, edit),
        Some(_) => {
            if let Some(mut input_focus) = world.get_resource_mut::<InputFocus>() {
                input_focus.clear();
            }
        }
        None => {}
    }
}

fn label_text(text: impl Into<String>, font_size: f32, color: Color) -> (Text, TextFont, TextColor) {
    (
        Text::new(text),
        TextFont {
            font_size,
            ..default()
        },
        TextColor(color),
    )
}

fn spawn_form(p: &mut ChildSpawner, layout: &FormLayout, form: &FormState, config: &InspectorConfig) {
    p.spawn((
        label_text(layout.title.clone(), config.title_font_size, Color::WHITE),
        Node {
            margin: UiRect::bottom(Px(8.0)),
            ..default()
        },
    ));

    for section in &layout.sections {
        if let Some(heading) = &section.heading {
            p.spawn((
                label_text(heading.clone(), config.body_font_size, Color::WHITE),
                Node {
                    margin: UiRect::top(config.section_gap),
                    padding: UiRect::bottom(Px(2.0)),
                    border: UiRect::bottom(Px(1.0)),
                    ..default()
                },
                BorderColor::all(config.border_color),
            ));
        }

        if let Some(doc) = &section.doc {
            spawn_doc(p, doc, config);
        }

        for field in &section.fields {
            spawn_field_row(p, field, form, config);
        }
    }

    if layout.edit_subtree {
        p.spawn(Node {
            margin: UiRect::top(config.section_gap),
            ..default()
        })
        .with_children(|wrapper| {
            wrapper.spawn((
                button(
                    ButtonProps {
                        variant: ButtonVariant::Primary,
                        ..default()
                    },
                    EditSubtreeButton,
                    Spawn(label_text("Edit Subtree", config.body_font_size, Color::WHITE)),
                ),
                observe(on_edit_subtree),
            ));
        });
    }
}

/// Node documentation: one text block with a styled span per markdown run.
fn spawn_doc(p: &mut ChildSpawner, doc: &str, config: &InspectorConfig) {
    p.spawn((
        label_text("", config.small_font_size, config.muted_text_color),
        Node {
            margin: UiRect::vertical(Px(4.0)),
            ..default()
        },
    ))
    .with_children(|text| {
        for span in markdown::to_spans(doc) {
            let (font_size, color) = match span.style {
                SpanStyle::Plain => (config.small_font_size, config.muted_text_color),
                SpanStyle::Emphasis => (config.small_font_size, Color::srgba(0.8, 0.8, 0.8, 1.0)),
                SpanStyle::Strong => (config.small_font_size, Color::WHITE),
                SpanStyle::Code => (config.small_font_size, config.doc_code_color),
                SpanStyle::Heading => (config.body_font_size, Color::WHITE),
            };
            text.spawn((
                TextSpan::new(span.text),
                TextFont {
                    font_size,
                    ..default()
                },
                TextColor(color),
            ));
        }
    });
}

fn spawn_field_row(p: &mut ChildSpawner, field: &FieldSpec, form: &FormState, config: &InspectorConfig) {
    let value = form.get(&field.key);
    let errors = form.errors(&field.key);
    let label = if field.required {
        format!("{} *", field.label)
    } else {
        field.label.clone()
    };
    let label_color = if field.required {
        config.required_color
    } else {
        config.muted_text_color
    };
    let outline = if field.highlight || !errors.is_empty() {
        config.error_text_color
    } else {
        config.border_color
    };

    p.spawn(Node {
        display: Display::Flex,
        flex_direction: FlexDirection::Row,
        column_gap: config.column_gap,
        margin: UiRect::bottom(config.item_gap),
        align_items: AlignItems::FlexStart,
        ..default()
    })
    .with_children(|row| {
        row.spawn((
            label_text(label, config.small_font_size, label_color),
            Node {
                width: config.label_width,
                flex_shrink: 0.0,
                ..default()
            },
        ));

        row.spawn(Node {
            flex_grow: 1.0,
            display: Display::Flex,
            flex_direction: FlexDirection::Column,
            row_gap: Px(2.0),
            ..default()
        })
        .with_children(|column| {
            spawn_control(column, field, value, outline, config);
            spawn_errors(column, errors, config);
        });
    });
}

fn spawn_control(
    p: &mut ChildSpawner,
    field: &FieldSpec,
    value: &FieldValue,
    outline: Color,
    config: &InspectorConfig,
) {
    let kind = match &field.widget {
        Widget::Text | Widget::AutoComplete(_) => Some(TextFieldKind::Text),
        Widget::TextArea => Some(TextFieldKind::Multiline),
        Widget::Int => Some(TextFieldKind::Int),
        Widget::Float => Some(TextFieldKind::Float),
        _ => None,
    };

    if !field.is_editable() {
        p.spawn((
            label_text(value.display(), config.small_font_size, Color::srgba(0.9, 0.9, 0.9, 1.0)),
            Node {
                padding: UiRect::horizontal(Px(4.0)),
                border: UiRect::all(Px(if field.highlight { 1.0 } else { 0.0 })),
                ..default()
            },
            BorderColor::all(outline),
        ));
        return;
    }

    if let Some(kind) = kind {
        let completion = match &field.widget {
            Widget::AutoComplete(source) => Some(*source),
            _ => None,
        };
        let min_height = if kind == TextFieldKind::Multiline {
            config.text_area_min_height
        } else {
            Auto
        };
        let shown = value.display();
        let field_entity = p
            .spawn((
                Node {
                    min_height,
                    padding: UiRect::horizontal(Px(4.0)),
                    border: UiRect::all(Px(1.0)),
                    ..default()
                },
                BorderColor::all(outline),
                BackgroundColor(config.field_background),
                TextField {
                    key: field.key.clone(),
                    kind,
                    completion,
                },
                TextFieldEditState::new(shown.clone()),
                Interaction::default(),
            ))
            .with_child(label_text(shown, config.small_font_size, Color::WHITE))
            .id();

        if let Some(source) = completion {
            p.spawn((
                Node {
                    display: Display::Flex,
                    flex_direction: FlexDirection::Column,
                    row_gap: Px(2.0),
                    ..default()
                },
                SuggestionList {
                    field: field_entity,
                    source,
                },
            ));
        }
        return;
    }

    match &field.widget {
        Widget::Switch => {
            let on = value.as_bool();
            spawn_choice(
                p,
                field.key.clone(),
                FieldValue::Bool(!on),
                if on { "On" } else { "Off" },
                on,
                config,
            );
        }
        Widget::Select(options) => {
            p.spawn(Node {
                display: Display::Flex,
                flex_direction: FlexDirection::Row,
                flex_wrap: FlexWrap::Wrap,
                column_gap: Px(4.0),
                row_gap: Px(4.0),
                ..default()
            })
            .with_children(|choices| {
                for option in options {
                    let choice = FieldValue::Choice(option.value.clone());
                    let selected = *value == choice;
                    spawn_choice(choices, field.key.clone(), choice, &option.name, selected, config);
                }
                if !field.required {
                    let selected = value.is_empty();
                    spawn_choice(
                        choices,
                        field.key.clone(),
                        FieldValue::Choice(Value::Null),
                        "(none)",
                        selected,
                        config,
                    );
                }
            });
        }
        _ => {}
    }
}

fn spawn_choice(
    p: &mut ChildSpawner,
    key: FieldKey,
    value: FieldValue,
    label: &str,
    selected: bool,
    config: &InspectorConfig,
) {
    let variant = if selected {
        ButtonVariant::Primary
    } else {
        ButtonVariant::Normal
    };
    p.spawn((
        button(
            ButtonProps {
                variant,
                ..default()
            },
            ChoiceButton {
                key,
                value,
                field: None,
            },
            Spawn(label_text(label, config.small_font_size, Color::WHITE)),
        ),
        observe(on_choice_activate),
    ));
}

fn spawn_errors(p: &mut ChildSpawner, errors: &[FieldError], config: &InspectorConfig) {
    for error in errors {
        p.spawn(label_text(
            error.to_string(),
            config.small_font_size,
            config.error_text_color,
        ));
    }
}

/// Spawns the inspector panel structure.
pub fn spawn_inspector_panel(parent: &mut ChildSpawnerCommands<'_>, config: &InspectorConfig) {
    parent
        .spawn((
            Node {
                flex_grow: 1.0,
                width: Percent(100.0),
                display: Display::Flex,
                flex_direction: FlexDirection::Column,
                ..default()
            },
            InspectorPanel,
        ))
        .with_children(|panel| {
            // Scrollable area with scrollbar - use Grid layout
            let scrollbar_width = 8.0;
            panel
                .spawn(Node {
                    width: Percent(100.0),
                    flex_grow: 1.0,
                    display: Display::Grid,
                    grid_template_columns: vec![GridTrack::fr(1.0), GridTrack::px(scrollbar_width)],
                    ..default()
                })
                .with_children(|scroll_area| {
                    let content_id = scroll_area
                        .spawn((
                            Node {
                                display: Display::Flex,
                                flex_direction: FlexDirection::Column,
                                padding: config.panel_padding,
                                overflow: Overflow::scroll_y(),
                                ..default()
                            },
                            ScrollPosition::default(),
                            InspectorContent,
                            observe(clear_focus_on_background_click),
                        ))
                        .id();

                    scroll_area
                        .spawn((
                            Scrollbar {
                                target: content_id,
                                orientation: ControlOrientation::Vertical,
                                min_thumb_length: 20.0,
                            },
                            Node {
                                width: Px(scrollbar_width),
                                height: Percent(100.0),
                                ..default()
                            },
                            BackgroundColor(Color::srgba(0.15, 0.15, 0.15, 0.5)),
                        ))
                        .with_children(|sb| {
                            sb.spawn((
                                CoreScrollbarThumb,
                                Node {
                                    width: Percent(100.0),
                                    ..default()
                                },
                                BackgroundColor(Color::srgba(0.5, 0.5, 0.5, 0.8)),
                            ));
                        });
                });
        });
}
