//! Form controllers for the three inspector views and the container that
//! picks one of them.

pub mod layout;
pub mod node;
pub mod node_def;
pub mod tree;

use bevy::log::{debug, warn};

pub use layout::{FieldSpec, FormLayout, FormSection, OptionSource, Widget};
pub use node::NodeForm;
pub use node_def::NodeDefView;
pub use tree::TreeForm;

use crate::form::{FieldKey, FieldValue, FormState};
use crate::model::{EditingNode, NodeDef, TreeModel};
use crate::workspace::Workspace;

/// What the inspector is currently showing.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum InspectorTarget {
    #[default]
    None,
    NodeDef(NodeDef),
    Tree(TreeModel),
    Node(EditingNode),
}

impl InspectorTarget {
    /// A node definition wins over the tree, which wins over a node.
    pub fn select(workspace: &dyn Workspace) -> Self {
        if let Some(def) = workspace.editing_node_def() {
            InspectorTarget::NodeDef(def.data.clone())
        } else if let Some(tree) = workspace.editing_tree() {
            InspectorTarget::Tree(tree.data.clone())
        } else if let Some(node) = workspace.editing_node() {
            InspectorTarget::Node(node.clone())
        } else {
            InspectorTarget::None
        }
    }

    /// Whether both targets show the same tree, node or definition, possibly
    /// with different values.
    pub fn same_subject(&self, other: &InspectorTarget) -> bool {
        match (self, other) {
            (InspectorTarget::None, InspectorTarget::None) => true,
            (InspectorTarget::Tree(_), InspectorTarget::Tree(_)) => true,
            (InspectorTarget::NodeDef(a), InspectorTarget::NodeDef(b)) => a.name == b.name,
            (InspectorTarget::Node(a), InspectorTarget::Node(b)) => a.data.id == b.data.id,
            _ => false,
        }
    }
}

/// The form of whichever view is active.
#[derive(Clone, Debug, PartialEq)]
pub enum ActiveForm {
    Tree(TreeForm),
    Node(NodeForm),
    NodeDef(NodeDefView),
}

impl ActiveForm {
    pub fn for_target(target: &InspectorTarget, workspace: &dyn Workspace) -> Option<Self> {
        match target {
            InspectorTarget::None => None,
            InspectorTarget::NodeDef(def) => Some(ActiveForm::NodeDef(NodeDefView::load(def.clone()))),
            InspectorTarget::Tree(tree) => Some(ActiveForm::Tree(TreeForm::load(tree))),
            InspectorTarget::Node(node) => {
                let def = workspace.node_def(&node.data.name);
                Some(ActiveForm::Node(NodeForm::load(
                    node.clone(),
                    def,
                    workspace.node_defs(),
                )))
            }
        }
    }

    pub fn form(&self) -> &FormState {
        match self {
            ActiveForm::Tree(tree) => tree.form(),
            ActiveForm::Node(node) => node.form(),
            ActiveForm::NodeDef(view) => view.form(),
        }
    }

    pub fn layout(&self) -> FormLayout {
        match self {
            ActiveForm::Tree(tree) => tree.layout(),
            ActiveForm::Node(node) => node.layout(),
            ActiveForm::NodeDef(view) => view.layout(),
        }
    }

    /// Applies a value committed by a widget.
    ///
    /// Commits to fields that are read-only or disabled in the current
    /// layout are dropped.
    pub fn commit(&mut self, key: FieldKey, value: FieldValue, workspace: &mut dyn Workspace) {
        let layout = self.layout();
        let Some(field) = layout.field(&key) else {
            warn!("ignoring commit to unknown field {key}");
            return;
        };
        if !field.is_editable() {
            warn!("ignoring commit to read-only field {key}");
            return;
        }

        debug!("commit {key} = {value:?}");
        match self {
            ActiveForm::Tree(tree) => tree.commit(key, value, workspace),
            ActiveForm::Node(node) => node.commit(key, value, workspace),
            ActiveForm::NodeDef(_) => {}
        }
    }

    /// Requests the subtree of the inspected node to be opened.
    pub fn edit_subtree(&self, workspace: &mut dyn Workspace) {
        if let ActiveForm::Node(node) = self
            && !node.is_editable()
        {
            node.edit_subtree(workspace);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{EditingTree, NodeDefs, NodeModel};
    use crate::workspace::{EditAction, InMemoryWorkspace};

    fn node(editable: bool) -> EditingNode {
        EditingNode {
            data: NodeModel {
                id: "1".to_string(),
                name: "Log".to_string(),
                ..Default::default()
            },
            editable,
            limit_error: false,
        }
    }

    #[test]
    fn definition_takes_precedence_over_tree_and_node() {
        let mut ws = InMemoryWorkspace::new("/", NodeDefs::new());
        assert_eq!(InspectorTarget::select(&ws), InspectorTarget::None);

        ws.editing_node = Some(node(true));
        assert!(matches!(InspectorTarget::select(&ws), InspectorTarget::Node(_)));

        ws.editing_tree = Some(EditingTree::default());
        assert!(matches!(InspectorTarget::select(&ws), InspectorTarget::Tree(_)));

        ws.editing_node_def = Some(Default::default());
        assert!(matches!(InspectorTarget::select(&ws), InspectorTarget::NodeDef(_)));
    }

    #[test]
    fn read_only_fields_ignore_commits() {
        let mut ws = InMemoryWorkspace::default();
        let target = InspectorTarget::Node(node(true));
        let mut form = ActiveForm::for_target(&target, &ws).unwrap();

        form.commit(FieldKey::Id, FieldValue::text("99"), &mut ws);
        form.commit(FieldKey::Arg("nope".into()), FieldValue::text("x"), &mut ws);
        assert!(ws.dispatched().is_empty());
        assert_eq!(form.form().get(&FieldKey::Id).as_str(), Some("1"));

        form.commit(FieldKey::Debug, FieldValue::Bool(true), &mut ws);
        assert_eq!(ws.dispatched().len(), 1);
    }

    #[test]
    fn locked_node_ignores_edits_but_opens_subtree() {
        let mut ws = InMemoryWorkspace::default();
        let target = InspectorTarget::Node(node(false));
        let mut form = ActiveForm::for_target(&target, &ws).unwrap();

        form.commit(FieldKey::Desc, FieldValue::text("x"), &mut ws);
        assert!(ws.dispatched().is_empty());

        form.edit_subtree(&mut ws);
        assert_eq!(ws.dispatched(), &[EditAction::EditSubtree]);
    }

    #[test]
    fn node_definition_view_never_dispatches() {
        let mut ws = InMemoryWorkspace::default();
        let target = InspectorTarget::NodeDef(NodeDef::unknown("Wait"));
        let mut form = ActiveForm::for_target(&target, &ws).unwrap();
        form.commit(FieldKey::Desc, FieldValue::text("x"), &mut ws);
        form.edit_subtree(&mut ws);
        assert!(ws.dispatched().is_empty());
    }

    #[test]
    fn same_subject_ignores_edited_values() {
        let before = InspectorTarget::Node(node(true));
        let mut edited = node(true);
        edited.data.desc = Some("changed".to_string());
        let after = InspectorTarget::Node(edited);
        assert_ne!(before, after);
        assert!(before.same_subject(&after));

        let mut other = node(true);
        other.data.id = "2".to_string();
        assert!(!before.same_subject(&InspectorTarget::Node(other)));
        assert!(!before.same_subject(&InspectorTarget::Tree(Default::default())));
        assert!(
            InspectorTarget::NodeDef(NodeDef::unknown("Wait"))
                .same_subject(&InspectorTarget::NodeDef(NodeDef::unknown("Wait")))
        );
    }
}
