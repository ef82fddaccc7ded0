//! The inspector's boundary to the editor workspace.
//!
//! The workspace owns every entity; the inspector reads snapshots through
//! [`Workspace`] and sends every change through [`Workspace::dispatch`].

use bevy::log::debug;
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::model::{
    EditingNode, EditingNodeDef, EditingTree, NodeDef, NodeDefs, NodeModel, TreeGraphData,
};

/// Payload of an `updateTree` action.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TreeUpdate {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
    pub export: bool,
}

/// A change request sent to the workspace.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "action", content = "data", rename_all = "camelCase")]
pub enum EditAction {
    UpdateTree(TreeUpdate),
    UpdateNode(NodeModel),
    /// Open the subtree of the selected node for editing.
    EditSubtree,
}

impl EditAction {
    pub fn name(&self) -> &'static str {
        match self {
            EditAction::UpdateTree(_) => "updateTree",
            EditAction::UpdateNode(_) => "updateNode",
            EditAction::EditSubtree => "editSubtree",
        }
    }
}

/// Read accessors and the single mutation entry point the inspector needs.
pub trait Workspace {
    fn editing_tree(&self) -> Option<&EditingTree>;

    fn editing_node(&self) -> Option<&EditingNode>;

    fn editing_node_def(&self) -> Option<&EditingNodeDef>;

    /// Root of the tree open in the editor.
    fn editing_graph(&self) -> Option<&TreeGraphData>;

    fn node_defs(&self) -> &NodeDefs;

    /// Definition for `name`, or a placeholder when it is not registered.
    fn node_def(&self, name: &str) -> NodeDef {
        self.node_defs()
            .get(name)
            .cloned()
            .unwrap_or_else(|| NodeDef::unknown(name))
    }

    /// Every tree file in the workspace.
    fn all_files(&self) -> &[PathBuf];

    /// `path` relative to the workspace root, with `/` separators.
    fn relative(&self, path: &Path) -> String;

    /// Replaces the node being edited.
    fn on_editing_node(&mut self, node: EditingNode);

    fn dispatch(&mut self, action: EditAction);
}

/// A self-contained workspace that applies updates to its own editing targets
/// and remembers dispatched actions, optionally only the most recent ones.
#[derive(Clone, Debug, Default)]
pub struct InMemoryWorkspace {
    pub root: PathBuf,
    pub files: Vec<PathBuf>,
    pub node_defs: NodeDefs,
    pub graph: Option<TreeGraphData>,
    pub editing_tree: Option<EditingTree>,
    pub editing_node: Option<EditingNode>,
    pub editing_node_def: Option<EditingNodeDef>,
    dispatched: Vec<EditAction>,
    history_limit: Option<usize>,
}

impl InMemoryWorkspace {
    pub fn new(root: impl Into<PathBuf>, node_defs: NodeDefs) -> Self {
        Self {
            root: root.into(),
            node_defs,
            ..Default::default()
        }
    }

    pub fn with_files(mut self, files: Vec<PathBuf>) -> Self {
        self.files = files;
        self
    }

    pub fn with_graph(mut self, graph: TreeGraphData) -> Self {
        self.graph = Some(graph);
        self
    }

    /// Keeps only the `limit` most recent dispatched actions.
    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = Some(limit);
        self.trim_history();
        self
    }

    /// Selects the tree, clearing any other selection.
    pub fn edit_tree(&mut self, tree: EditingTree) {
        self.editing_tree = Some(tree);
        self.editing_node = None;
        self.editing_node_def = None;
    }

    /// Selects a node definition, clearing any other selection.
    pub fn edit_node_def(&mut self, def: NodeDef) {
        self.editing_node_def = Some(EditingNodeDef { data: def });
        self.editing_tree = None;
        self.editing_node = None;
    }

    /// Actions dispatched so far.
    pub fn dispatched(&self) -> &[EditAction] {
        &self.dispatched
    }

    pub fn take_dispatched(&mut self) -> Vec<EditAction> {
        std::mem::take(&mut self.dispatched)
    }

    fn trim_history(&mut self) {
        if let Some(limit) = self.history_limit
            && self.dispatched.len() > limit
        {
            let excess = self.dispatched.len() - limit;
            self.dispatched.drain(..excess);
        }
    }

    fn apply_node_update(&mut self, node: &NodeModel) {
        if let Some(editing) = self.editing_node.as_mut()
            && editing.data.id == node.id
        {
            editing.data = node.clone();
        }

        let def = self.node_def(&node.name);
        if let Some(graph) = self.graph.as_mut().and_then(|g| g.find_mut(&node.id)) {
            graph.name = node.name.clone();
            graph.input = node.input.clone();
            graph.output = node.output.clone();
            graph.def = def;
        }
    }
}

impl Workspace for InMemoryWorkspace {
    fn editing_tree(&self) -> Option<&EditingTree> {
        self.editing_tree.as_ref()
    }

    fn editing_node(&self) -> Option<&EditingNode> {
        self.editing_node.as_ref()
    }

    fn editing_node_def(&self) -> Option<&EditingNodeDef> {
        self.editing_node_def.as_ref()
    }

    fn editing_graph(&self) -> Option<&TreeGraphData> {
        self.graph.as_ref()
    }

    fn node_defs(&self) -> &NodeDefs {
        &self.node_defs
    }

    fn all_files(&self) -> &[PathBuf] {
        &self.files
    }

    fn relative(&self, path: &Path) -> String {
        path.strip_prefix(&self.root)
            .unwrap_or(path)
            .to_string_lossy()
            .replace('\\', "/")
    }

    fn on_editing_node(&mut self, node: EditingNode) {
        self.editing_node = Some(node);
        self.editing_tree = None;
        self.editing_node_def = None;
    }

    fn dispatch(&mut self, action: EditAction) {
        debug!("workspace received {}", action.name());
        match &action {
            EditAction::UpdateTree(update) => {
                if let Some(tree) = self.editing_tree.as_mut() {
                    tree.data.name = update.name.clone();
                    tree.data.desc = update.desc.clone();
                    tree.data.export = Some(update.export);
                }
            }
            EditAction::UpdateNode(node) => self.apply_node_update(node),
            EditAction::EditSubtree => {}
        }
        self.dispatched.push(action);
        self.trim_history();
    }
}
