//! Tree properties form.

use bevy::log::debug;

use super::layout::{FieldSpec, FormLayout, FormSection, Widget};
use crate::form::{FieldKey, FieldValue, FormState};
use crate::model::TreeModel;
use crate::workspace::{EditAction, TreeUpdate, Workspace};

#[derive(Clone, Debug, PartialEq)]
pub struct TreeForm {
    form: FormState,
}

impl TreeForm {
    pub fn load(tree: &TreeModel) -> Self {
        let mut form = FormState::new();
        form.set(FieldKey::Name, tree.name.clone());
        form.set(FieldKey::Desc, tree.desc.clone());
        form.set(FieldKey::Export, tree.is_exported());
        Self { form }
    }

    pub fn form(&self) -> &FormState {
        &self.form
    }

    pub fn layout(&self) -> FormLayout {
        FormLayout {
            title: "Tree Overview".to_string(),
            sections: vec![FormSection {
                fields: vec![
                    FieldSpec::read_only(FieldKey::Name, "Name"),
                    FieldSpec::new(FieldKey::Desc, "Description", Widget::TextArea),
                    FieldSpec::new(FieldKey::Export, "Export", Widget::Switch),
                ],
                ..Default::default()
            }],
            edit_subtree: false,
        }
    }

    pub fn finish(&self) -> TreeUpdate {
        TreeUpdate {
            name: self
                .form
                .get(&FieldKey::Name)
                .as_str()
                .unwrap_or_default()
                .to_string(),
            desc: self
                .form
                .get(&FieldKey::Desc)
                .non_empty_text()
                .map(str::to_string),
            export: self.form.get(&FieldKey::Export).as_bool(),
        }
    }

    pub fn submit(&mut self, workspace: &mut dyn Workspace) {
        let update = self.finish();
        debug!("submitting tree '{}'", update.name);
        workspace.dispatch(EditAction::UpdateTree(update));
    }

    /// Applies an edited value and submits the form.
    pub fn commit(&mut self, key: FieldKey, value: FieldValue, workspace: &mut dyn Workspace) {
        self.form.set(key, value);
        self.submit(workspace);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workspace::InMemoryWorkspace;

    fn tree(desc: Option<&str>, export: Option<bool>) -> TreeModel {
        TreeModel {
            name: "patrol".to_string(),
            desc: desc.map(str::to_string),
            export,
        }
    }

    #[test]
    fn load_defaults_export_to_true() {
        let form = TreeForm::load(&tree(None, None));
        assert_eq!(form.form().get(&FieldKey::Export), &FieldValue::Bool(true));
        assert_eq!(form.form().get(&FieldKey::Desc), &FieldValue::Empty);

        let form = TreeForm::load(&tree(Some("x"), Some(false)));
        assert_eq!(form.form().get(&FieldKey::Export), &FieldValue::Bool(false));
    }

    #[test]
    fn cleared_description_is_dropped() {
        let mut ws = InMemoryWorkspace::default();
        let mut form = TreeForm::load(&tree(Some("old"), None));
        form.commit(FieldKey::Desc, FieldValue::text(""), &mut ws);

        assert_eq!(
            ws.dispatched(),
            &[EditAction::UpdateTree(TreeUpdate {
                name: "patrol".to_string(),
                desc: None,
                export: true,
            })]
        );
    }

    #[test]
    fn toggling_export_dispatches_update() {
        let mut ws = InMemoryWorkspace::default();
        let mut form = TreeForm::load(&tree(Some("d"), None));
        form.commit(FieldKey::Export, FieldValue::Bool(false), &mut ws);

        let [EditAction::UpdateTree(update)] = ws.dispatched() else {
            panic!("expected one tree update, got {:?}", ws.dispatched());
        };
        assert!(!update.export);
        assert_eq!(update.desc.as_deref(), Some("d"));
    }

    #[test]
    fn name_is_read_only() {
        let layout = TreeForm::load(&tree(None, None)).layout();
        assert!(!layout.field(&FieldKey::Name).unwrap().is_editable());
        assert!(layout.field(&FieldKey::Desc).unwrap().is_editable());
    }
}
