//! Common test utilities for building node definitions and workspaces.
use b3_inspector::InMemoryWorkspace;
use b3_inspector::model::{
    ArgKind, ArgOption, ArgType, EditingNode, EditingTree, NodeArg, NodeDef, NodeDefs, NodeModel,
    NodeType, TreeGraphData, TreeModel,
};
use serde_json::json;

/// `MoveTo`: the `target` argument and the `target?` input are alternatives.
#[allow(dead_code)]
pub fn move_to_def() -> NodeDef {
    NodeDef {
        name: "MoveTo".to_string(),
        node_type: NodeType::Action,
        desc: "walk to a target".to_string(),
        input: vec!["target?".to_string()],
        output: vec!["arrived".to_string()],
        args: vec![
            NodeArg::new("target", ArgKind::optional(ArgType::Json), "fixed target")
                .with_oneof("target"),
            NodeArg::new("speed", ArgKind::optional(ArgType::Float), "speed")
                .with_default(json!(1.5)),
            NodeArg::new("gait", ArgKind::optional(ArgType::Enum), "gait").with_options(vec![
                ArgOption {
                    name: "walk".to_string(),
                    value: json!("walk"),
                },
                ArgOption {
                    name: "run".to_string(),
                    value: json!("run"),
                },
            ]),
        ],
        ..Default::default()
    }
}

#[allow(dead_code)]
pub fn log_def() -> NodeDef {
    NodeDef {
        name: "Log".to_string(),
        desc: "print a message".to_string(),
        children: Some(0),
        args: vec![NodeArg::new(
            "message",
            ArgKind::required(ArgType::String),
            "message",
        )],
        ..Default::default()
    }
}

#[allow(dead_code)]
pub fn sequence_def() -> NodeDef {
    NodeDef {
        name: "Sequence".to_string(),
        node_type: NodeType::Composite,
        desc: "run children in order".to_string(),
        children: Some(-1),
        ..Default::default()
    }
}

#[allow(dead_code)]
pub fn defs() -> NodeDefs {
    [sequence_def(), log_def(), move_to_def()].into_iter().collect()
}

/// Sequence(1) -> [Log(2), MoveTo(3) reading `enemy` and writing `reached`].
#[allow(dead_code)]
pub fn graph() -> TreeGraphData {
    let leaf = |id: &str, def: NodeDef, input: &[&str], output: &[&str]| TreeGraphData {
        id: id.to_string(),
        name: def.name.clone(),
        input: input.iter().map(|s| s.to_string()).collect(),
        output: output.iter().map(|s| s.to_string()).collect(),
        children: Vec::new(),
        def,
    };
    let mut root = leaf("1", sequence_def(), &[], &[]);
    root.children = vec![
        leaf("2", log_def(), &[], &[]),
        leaf("3", move_to_def(), &["enemy"], &["reached"]),
    ];
    root
}

#[allow(dead_code)]
pub fn workspace() -> InMemoryWorkspace {
    InMemoryWorkspace::new("/project", defs())
        .with_files(vec![
            "/project/trees/patrol.json".into(),
            "/project/trees/main.json".into(),
        ])
        .with_graph(graph())
}

#[allow(dead_code)]
pub fn move_to_node() -> EditingNode {
    EditingNode {
        data: NodeModel {
            id: "3".to_string(),
            name: "MoveTo".to_string(),
            input: vec!["enemy".to_string()],
            output: vec!["reached".to_string()],
            ..Default::default()
        },
        editable: true,
        limit_error: false,
    }
}

#[allow(dead_code)]
pub fn main_tree() -> EditingTree {
    EditingTree {
        data: TreeModel {
            name: "main".to_string(),
            desc: Some("entry point".to_string()),
            export: None,
        },
    }
}
