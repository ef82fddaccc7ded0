//! Inspector window plugin and UI scaffold.

use bevy::camera::RenderTarget;
use bevy::ecs::hierarchy::ChildSpawnerCommands;
use bevy::feathers::FeathersPlugins;
use bevy::feathers::dark_theme::create_dark_theme;
use bevy::feathers::theme::{ThemeBackgroundColor, UiTheme};
use bevy::feathers::tokens;
use bevy::input::mouse::{MouseScrollUnit, MouseWheel};
use bevy::picking::hover::HoverMap;
use bevy::prelude::*;
use bevy::ui::Val::*;
use bevy::window::{WindowRef, WindowResolution};

use super::config::InspectorConfig;
use super::panels::{
    apply_pending_field_commits, refresh_inspector_target, refresh_suggestions,
    spawn_inspector_panel, sync_inspector_panel,
};
use super::state::{
    InspectedWorkspace, InspectorCache, InspectorInternal, InspectorState, InspectorWindowState,
};
use super::widgets::TextFieldPlugin;

/// Pixels scrolled per wheel line.
const LINE_HEIGHT: f32 = 20.0;

/// Marker component for the inspector window.
#[derive(Component)]
pub struct InspectorWindow;

/// Marker to indicate UI has been initialized.
#[derive(Component)]
struct InspectorUiInitialized;

/// System sets for organizing inspector systems.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum InspectorSet {
    /// Handle input and apply widget commits.
    Input,
    /// Re-select the inspected target.
    Refresh,
    /// Sync UI with state.
    SyncUI,
}

/// Plugin that opens the inspector window and keeps it in sync with the
/// [`InspectedWorkspace`].
pub struct InspectorWindowPlugin;

impl Plugin for InspectorWindowPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(FeathersPlugins)
            .add_plugins(TextFieldPlugin)
            .insert_resource(UiTheme(create_dark_theme()))
            // State resources
            .init_resource::<InspectorState>()
            .init_resource::<InspectorCache>()
            .init_resource::<InspectorConfig>()
            .init_resource::<InspectorWindowState>()
            .init_resource::<InspectedWorkspace>()
            .add_observer(refresh_suggestions)
            // System ordering
            .configure_sets(
                Update,
                (InspectorSet::Input, InspectorSet::Refresh, InspectorSet::SyncUI).chain(),
            )
            // Startup
            .add_systems(Startup, setup_inspector_window)
            // Update systems
            .add_systems(
                Update,
                (
                    (handle_mouse_wheel_scroll, apply_pending_field_commits)
                        .in_set(InspectorSet::Input),
                    refresh_inspector_target.in_set(InspectorSet::Refresh),
                    (setup_inspector_ui, sync_inspector_panel)
                        .chain()
                        .in_set(InspectorSet::SyncUI),
                    handle_window_close,
                ),
            );
    }
}

/// Spawns the inspector window on startup.
fn setup_inspector_window(
    mut commands: Commands,
    config: Res<InspectorConfig>,
    mut window_state: ResMut<InspectorWindowState>,
) {
    let window_entity = commands
        .spawn((
            Window {
                title: "Behavior Tree Inspector".to_string(),
                resolution: WindowResolution::new(config.window_size.x, config.window_size.y),
                ..default()
            },
            InspectorWindow,
            Visibility::Visible,
            InheritedVisibility::default(),
            ViewVisibility::default(),
        ))
        .id();

    window_state.window_entity = Some(window_entity);
    window_state.is_open = true;

    info!("Inspector window created: {:?}", window_entity);
}

/// Sets up the UI scaffold once the window exists.
fn setup_inspector_ui(
    mut commands: Commands,
    config: Res<InspectorConfig>,
    mut window_state: ResMut<InspectorWindowState>,
    mut state: ResMut<InspectorState>,
    inspector_windows: Query<Entity, (With<InspectorWindow>, Without<InspectorUiInitialized>)>,
) {
    let Some(window_entity) = window_state.window_entity else {
        return;
    };

    if inspector_windows.get(window_entity).is_err() {
        return;
    }

    commands.entity(window_entity).insert(InspectorUiInitialized);

    let camera_entity = commands
        .spawn((
            Camera2d,
            Camera {
                target: RenderTarget::Window(WindowRef::Entity(window_entity)),
                ..default()
            },
            InspectorInternal,
        ))
        .id();
    window_state.camera_entity = Some(camera_entity);

    commands
        .spawn((
            Node {
                width: Percent(100.0),
                height: Percent(100.0),
                display: Display::Flex,
                flex_direction: FlexDirection::Column,
                ..default()
            },
            ThemeBackgroundColor(tokens::WINDOW_BG),
            UiTargetCamera(camera_entity),
            InspectorInternal,
        ))
        .with_children(|root| {
            spawn_title_bar(root, &config);
            spawn_inspector_panel(root, &config);
        });

    // The panel is empty until the next sync
    state.needs_rebuild = true;

    info!("Inspector UI initialized");
}

fn spawn_title_bar(parent: &mut ChildSpawnerCommands<'_>, config: &InspectorConfig) {
    parent
        .spawn((
            Node {
                width: Percent(100.0),
                height: config.title_bar_height,
                display: Display::Flex,
                align_items: AlignItems::Center,
                padding: config.panel_padding,
                border: UiRect::bottom(Px(1.0)),
                ..default()
            },
            BorderColor::all(config.border_color),
        ))
        .with_children(|bar| {
            bar.spawn((
                Text::new("Inspector"),
                TextFont {
                    font_size: config.title_font_size + 2.0,
                    ..default()
                },
                TextColor(Color::WHITE),
            ));
        });
}

/// Handles cleanup when the inspector window is closed.
fn handle_window_close(
    mut window_state: ResMut<InspectorWindowState>,
    mut removed_windows: RemovedComponents<Window>,
) {
    for entity in removed_windows.read() {
        if window_state.window_entity == Some(entity) {
            window_state.window_entity = None;
            window_state.camera_entity = None;
            window_state.is_open = false;
            info!("Inspector window closed");
        }
    }
}

/// Scrolls the nearest vertically scrollable ancestor of each hovered entity.
fn handle_mouse_wheel_scroll(
    mut mouse_wheel_reader: MessageReader<MouseWheel>,
    hover_map: Res<HoverMap>,
    parents: Query<&ChildOf>,
    mut scrollables: Query<(&mut ScrollPosition, &Node, &ComputedNode)>,
) {
    for event in mouse_wheel_reader.read() {
        let mut dy = -event.y;
        if event.unit == MouseScrollUnit::Line {
            dy *= LINE_HEIGHT;
        }
        if dy == 0.0 {
            continue;
        }

        let hovered = hover_map.values().flat_map(|pointer_map| pointer_map.keys());
        for &entity in hovered {
            let target = std::iter::once(entity)
                .chain(parents.iter_ancestors(entity))
                .find(|ancestor| scrollables.contains(*ancestor));
            let Some(target) = target else {
                continue;
            };
            let Ok((mut scroll_pos, node, computed)) = scrollables.get_mut(target) else {
                continue;
            };
            if node.overflow.y == OverflowAxis::Scroll {
                let max_y = (computed.content_size().y - computed.size().y).max(0.0)
                    * computed.inverse_scale_factor();
                scroll_pos.y = (scroll_pos.y + dy).clamp(0.0, max_y);
            }
            break;
        }
    }
}
