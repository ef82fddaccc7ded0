//! Demonstrates the inspector window on a small behavior tree.
//!
//! Press 1, 2 or 3 in the main window to select a different node; edits
//! made in the inspector are logged as they are dispatched.

use bevy::prelude::*;
use b3_inspector::model::{EditingNode, NodeDefs, NodeModel, TreeGraphData};
use b3_inspector::{
    ActionDispatched, InMemoryWorkspace, InspectedWorkspace, InspectorWindowPlugin, Workspace,
};
use serde_json::json;

const NODE_DEFS: &str = r#"[
    { "name": "Sequence", "type": "Composite", "desc": "run children in order", "children": -1 },
    {
        "name": "Log",
        "type": "Action",
        "desc": "print a message",
        "doc": "Prints `message` at the given level.",
        "args": [
            { "name": "message", "type": "string", "desc": "message" },
            { "name": "level", "type": "enum?", "desc": "level",
              "options": [{ "name": "info", "value": "info" }, { "name": "warn", "value": "warn" }] }
        ]
    },
    {
        "name": "MoveTo",
        "type": "Action",
        "desc": "walk to a target",
        "input": ["target?"],
        "output": ["arrived?"],
        "args": [
            { "name": "target", "type": "json?", "desc": "fixed target", "oneof": "target" },
            { "name": "speed", "type": "float?", "desc": "speed", "default": 1.5 }
        ]
    }
]"#;

/// Dispatched actions are logged; the workspace only keeps the latest few.
const ACTION_HISTORY: usize = 64;

fn main() {
    App::new()
        .add_plugins(DefaultPlugins)
        .insert_resource(InspectedWorkspace::new(sample_workspace()))
        .add_plugins(InspectorWindowPlugin)
        .add_observer(log_dispatched_action)
        .add_systems(Startup, setup)
        .add_systems(Update, select_node_from_keyboard)
        .run();
}

fn sample_workspace() -> InMemoryWorkspace {
    let defs: NodeDefs = match serde_json::from_str(NODE_DEFS) {
        Ok(defs) => defs,
        Err(err) => {
            error!("invalid node definitions: {err}");
            NodeDefs::new()
        }
    };

    let node = |id: &str, name: &str, input: &[&str], output: &[&str]| TreeGraphData {
        id: id.to_string(),
        name: name.to_string(),
        input: input.iter().map(|s| s.to_string()).collect(),
        output: output.iter().map(|s| s.to_string()).collect(),
        children: Vec::new(),
        def: defs.get(name).cloned().unwrap_or_default(),
    };
    let mut root = node("1", "Sequence", &[], &[]);
    root.children = vec![
        node("2", "Log", &[], &[]),
        node("3", "MoveTo", &["enemy"], &["reached"]),
    ];

    let mut workspace = InMemoryWorkspace::new("/project", defs)
        .with_files(vec![
            "/project/trees/main.json".into(),
            "/project/trees/patrol.json".into(),
        ])
        .with_graph(root)
        .with_history_limit(ACTION_HISTORY);
    workspace.on_editing_node(editing(sample_node("2")));
    workspace
}

fn sample_node(id: &str) -> NodeModel {
    match id {
        "1" => NodeModel {
            id: "1".to_string(),
            name: "Sequence".to_string(),
            ..default()
        },
        "2" => NodeModel {
            id: "2".to_string(),
            name: "Log".to_string(),
            args: [("message".to_string(), json!("hello"))].into(),
            ..default()
        },
        _ => NodeModel {
            id: "3".to_string(),
            name: "MoveTo".to_string(),
            input: vec!["enemy".to_string()],
            output: vec!["reached".to_string()],
            ..default()
        },
    }
}

fn editing(data: NodeModel) -> EditingNode {
    EditingNode {
        data,
        editable: true,
        limit_error: false,
    }
}

fn setup(mut commands: Commands) {
    commands.spawn(Camera2d);
    commands.spawn((
        Text::new("Press 1, 2 or 3 to inspect a node.\nEdits appear in the log."),
        Node {
            position_type: PositionType::Absolute,
            top: Val::Px(12.0),
            left: Val::Px(12.0),
            ..default()
        },
    ));
}

fn select_node_from_keyboard(
    keys: Res<ButtonInput<KeyCode>>,
    mut workspace: ResMut<InspectedWorkspace>,
) {
    let id = if keys.just_pressed(KeyCode::Digit1) {
        "1"
    } else if keys.just_pressed(KeyCode::Digit2) {
        "2"
    } else if keys.just_pressed(KeyCode::Digit3) {
        "3"
    } else {
        return;
    };
    workspace.get_mut().on_editing_node(editing(sample_node(id)));
}

fn log_dispatched_action(trigger: On<ActionDispatched>) {
    let action = &trigger.event().action;
    match serde_json::to_string_pretty(action) {
        Ok(payload) => info!("{payload}"),
        Err(err) => warn!("could not serialize {}: {err}", action.name()),
    }
}
