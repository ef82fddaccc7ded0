//! Node properties form.
//!
//! Loads a node instance against its definition, validates the values the
//! user types, and turns the form back into a [`NodeModel`] for the
//! workspace.

use bevy::log::{debug, warn};
use serde_json::Value;

use super::layout::{FieldSpec, FormLayout, FormSection, OptionSource, Widget};
use crate::form::{FieldKey, FieldValue, FormState};
use crate::model::{
    ArgType, EditingNode, NodeArg, NodeDef, NodeDefs, NodeModel, is_required_slot, slot_name,
};
use crate::validation::{validate_node, validate_node_name};
use crate::workspace::{EditAction, Workspace};

#[derive(Clone, Debug, PartialEq)]
pub struct NodeForm {
    node: EditingNode,
    def: NodeDef,
    form: FormState,
}

impl NodeForm {
    /// Fills the form from `node` and validates it.
    pub fn load(node: EditingNode, def: NodeDef, defs: &NodeDefs) -> Self {
        let mut form = FormState::new();
        let data = &node.data;

        form.set(FieldKey::Id, data.id.clone());
        form.set(FieldKey::Name, data.name.clone());
        // Placeholder definitions have no type
        let node_type = if defs.contains(&def.name) {
            def.node_type.to_string()
        } else {
            String::new()
        };
        form.set(FieldKey::Type, node_type);
        let desc = data
            .desc
            .clone()
            .filter(|d| !d.is_empty())
            .unwrap_or_else(|| def.desc.clone());
        form.set(FieldKey::Desc, desc);
        form.set(FieldKey::Debug, data.debug);
        form.set(FieldKey::Disabled, data.disabled);
        form.set(FieldKey::Path, data.path.clone());
        form.set(FieldKey::Children, def.children_label());

        for arg in &def.args {
            let value = load_arg_value(arg, data.args.get(&arg.name));
            form.set(FieldKey::Arg(arg.name.clone()), value);
        }
        for i in 0..def.input.len() {
            form.set(FieldKey::Input(i), data.input.get(i).cloned());
        }
        for i in 0..def.output.len() {
            form.set(FieldKey::Output(i), data.output.get(i).cloned());
        }

        let mut this = Self { node, def, form };
        this.validate(defs);
        this
    }

    pub fn form(&self) -> &FormState {
        &self.form
    }

    pub fn def(&self) -> &NodeDef {
        &self.def
    }

    pub fn node(&self) -> &EditingNode {
        &self.node
    }

    pub fn is_editable(&self) -> bool {
        self.node.editable
    }

    /// Re-runs validation; returns whether the form may be submitted.
    ///
    /// An unknown definition name is reported on the name field but does not
    /// block submission.
    pub fn validate(&mut self, defs: &NodeDefs) -> bool {
        let mut errors = validate_node(&self.form, &self.def);
        let submittable = errors.is_empty();
        let name = self.form.get(&FieldKey::Name).as_str().unwrap_or_default();
        let name_errors = validate_node_name(name, defs);
        if !name_errors.is_empty() {
            errors.insert(FieldKey::Name, name_errors);
        }
        self.form.set_errors(errors);
        submittable
    }

    pub fn layout(&self) -> FormLayout {
        let disabled = !self.node.editable;
        let subtree_locked = disabled && self.node.data.path.is_none();

        let mut sections = vec![FormSection {
            fields: vec![
                FieldSpec::read_only(FieldKey::Id, "ID"),
                FieldSpec::read_only(FieldKey::Type, "Type"),
                FieldSpec::read_only(FieldKey::Children, "Children")
                    .highlight(self.node.limit_error),
                FieldSpec::new(
                    FieldKey::Name,
                    "Name",
                    Widget::AutoComplete(OptionSource::NodeDefs),
                )
                .disabled(disabled),
                FieldSpec::new(FieldKey::Desc, "Description", Widget::TextArea).disabled(disabled),
                FieldSpec::new(FieldKey::Debug, "Debug", Widget::Switch).disabled(subtree_locked),
                FieldSpec::new(FieldKey::Disabled, "Disabled", Widget::Switch)
                    .disabled(subtree_locked),
                FieldSpec::new(
                    FieldKey::Path,
                    "Subtree",
                    Widget::AutoComplete(OptionSource::Subtrees),
                )
                .disabled(subtree_locked),
            ],
            ..Default::default()
        }];

        if let Some(doc) = self.def.doc.as_ref().filter(|d| !d.is_empty()) {
            sections.push(FormSection {
                doc: Some(doc.clone()),
                ..Default::default()
            });
        }

        if !self.def.input.is_empty() {
            let fields = self
                .def
                .input
                .iter()
                .enumerate()
                .map(|(i, slot)| variable_field(FieldKey::Input(i), slot, disabled))
                .collect();
            sections.push(FormSection::titled("Input Variables", fields));
        }

        if !self.def.args.is_empty() {
            let fields = self
                .def
                .args
                .iter()
                .map(|arg| {
                    FieldSpec::new(FieldKey::Arg(arg.name.clone()), &arg.desc, arg_widget(arg))
                        .required(arg.is_required())
                        .disabled(disabled)
                })
                .collect();
            sections.push(FormSection::titled("Arguments", fields));
        }

        if !self.def.output.is_empty() {
            let fields = self
                .def
                .output
                .iter()
                .enumerate()
                .map(|(i, slot)| variable_field(FieldKey::Output(i), slot, disabled))
                .collect();
            sections.push(FormSection::titled("Output Variables", fields));
        }

        FormLayout {
            title: self.def.desc.clone(),
            sections,
            edit_subtree: disabled,
        }
    }

    /// Builds the node the workspace should store from the current values.
    pub fn finish(&self) -> NodeModel {
        let form = &self.form;
        let desc = form
            .get(&FieldKey::Desc)
            .non_empty_text()
            .filter(|d| *d != self.def.desc)
            .map(str::to_string);

        let mut node = NodeModel {
            id: self.node.data.id.clone(),
            name: form
                .get(&FieldKey::Name)
                .as_str()
                .unwrap_or_default()
                .to_string(),
            desc,
            debug: form.get(&FieldKey::Debug).as_bool(),
            disabled: form.get(&FieldKey::Disabled).as_bool(),
            path: form
                .get(&FieldKey::Path)
                .non_empty_text()
                .map(str::to_string),
            ..Default::default()
        };

        for arg in &self.def.args {
            let value = form.get(&FieldKey::Arg(arg.name.clone()));
            if value.is_empty() {
                continue;
            }
            let json = if arg.kind.ty == ArgType::Json {
                parse_json_arg(arg, value)
            } else {
                value.to_json()
            };
            if let Some(json) = json {
                node.args.insert(arg.name.clone(), json);
            }
        }

        node.input = slot_values(form, self.def.input.len(), FieldKey::Input);
        node.output = slot_values(form, self.def.output.len(), FieldKey::Output);
        node
    }

    /// Validates and, when the form is clean, dispatches `updateNode`.
    pub fn submit(&mut self, workspace: &mut dyn Workspace) -> bool {
        if !self.validate(workspace.node_defs()) {
            debug!(
                "node {} not submitted: {} field error(s)",
                self.node.data.id,
                self.form.all_errors().count()
            );
            return false;
        }
        self.dispatch_update(workspace);
        true
    }

    /// Routes an edited value the way the editor does: a new definition name
    /// or subtree path is forwarded immediately, anything else submits.
    pub fn commit(&mut self, key: FieldKey, value: FieldValue, workspace: &mut dyn Workspace) {
        match key {
            FieldKey::Name => {
                let name = value.as_str().unwrap_or_default().to_string();
                self.form.set(FieldKey::Name, value);
                self.change_node_def(&name, workspace);
            }
            FieldKey::Path => {
                self.form.set(FieldKey::Path, value);
                self.change_subtree(workspace);
            }
            key => {
                self.form.set(key, value);
                self.submit(workspace);
            }
        }
    }

    /// Switches the node to another definition.
    ///
    /// The workspace is told to edit the stripped-down node first, then the
    /// form contents are dispatched without validation.
    pub fn change_node_def(&mut self, new_name: &str, workspace: &mut dyn Workspace) {
        if self.node.data.name == new_name {
            self.submit(workspace);
            return;
        }

        let resolved = workspace
            .node_defs()
            .get(new_name)
            .map(|def| def.name.clone())
            .unwrap_or_else(|| new_name.to_string());
        debug!(
            "node {} changes definition {} -> {}",
            self.node.data.id, self.node.data.name, resolved
        );
        let data = &self.node.data;
        workspace.on_editing_node(EditingNode {
            data: NodeModel {
                id: data.id.clone(),
                name: resolved,
                desc: data.desc.clone(),
                debug: data.debug,
                disabled: data.disabled,
                ..Default::default()
            },
            editable: self.node.editable,
            limit_error: false,
        });
        self.dispatch_update(workspace);
    }

    /// Forwards a changed subtree path without validation, otherwise submits.
    pub fn change_subtree(&mut self, workspace: &mut dyn Workspace) {
        let path = self.form.get(&FieldKey::Path).non_empty_text();
        if path != self.node.data.path.as_deref() {
            self.dispatch_update(workspace);
        } else {
            self.submit(workspace);
        }
    }

    pub fn edit_subtree(&self, workspace: &mut dyn Workspace) {
        debug!("editing subtree of node {}", self.node.data.id);
        workspace.dispatch(EditAction::EditSubtree);
    }

    fn dispatch_update(&self, workspace: &mut dyn Workspace) {
        workspace.dispatch(EditAction::UpdateNode(self.finish()));
    }
}

fn variable_field(key: FieldKey, slot: &str, disabled: bool) -> FieldSpec {
    FieldSpec::new(
        key,
        slot_name(slot),
        Widget::AutoComplete(OptionSource::Variables),
    )
    .required(is_required_slot(slot))
    .disabled(disabled)
}

fn arg_widget(arg: &NodeArg) -> Widget {
    match arg.kind.ty {
        ArgType::String | ArgType::Json => Widget::TextArea,
        ArgType::Int => Widget::Int,
        ArgType::Float => Widget::Float,
        ArgType::Boolean => Widget::Switch,
        ArgType::Code => Widget::Text,
        ArgType::Enum => Widget::Select(arg.options.clone()),
    }
}

fn slot_values(form: &FormState, len: usize, key: fn(usize) -> FieldKey) -> Vec<String> {
    (0..len)
        .map(|i| form.get(&key(i)).as_str().unwrap_or_default().to_string())
        .collect()
}

/// Form value for an argument from the stored value or the definition's default.
fn load_arg_value(arg: &NodeArg, stored: Option<&Value>) -> FieldValue {
    if arg.kind.ty == ArgType::Json {
        return match stored {
            Some(Value::Null) => FieldValue::text("null"),
            Some(value) => pretty_json(value),
            None => arg.default.as_ref().map_or(FieldValue::Empty, pretty_json),
        };
    }

    let value = stored.filter(|v| !v.is_null()).or(arg.default.as_ref());
    match (arg.kind.ty, value) {
        (ArgType::Boolean, value) => {
            FieldValue::Bool(value.and_then(Value::as_bool).unwrap_or(false))
        }
        (_, None) => FieldValue::Empty,
        // Values of the wrong shape are passed through untouched
        (ArgType::Int, Some(v)) => v
            .as_i64()
            .map_or_else(|| FieldValue::Choice(v.clone()), FieldValue::Int),
        (ArgType::Float, Some(v)) => v
            .as_f64()
            .map_or_else(|| FieldValue::Choice(v.clone()), FieldValue::Float),
        (ArgType::Enum, Some(v)) => FieldValue::Choice(v.clone()),
        (_, Some(Value::String(s))) => FieldValue::text(s.clone()),
        (_, Some(v)) => FieldValue::text(v.to_string()),
    }
}

fn pretty_json(value: &Value) -> FieldValue {
    serde_json::to_string_pretty(value).map_or(FieldValue::Empty, FieldValue::Text)
}

fn parse_json_arg(arg: &NodeArg, value: &FieldValue) -> Option<Value> {
    let text = value.as_str()?;
    if text == "null" {
        return Some(Value::Null);
    }
    match serde_json::from_str(text) {
        Ok(json) => Some(json),
        Err(err) => {
            warn!("skipping argument '{}': {err}", arg.name);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FieldError;
    use crate::model::{ArgKind, ArgOption, NodeType};
    use crate::workspace::InMemoryWorkspace;
    use serde_json::json;

    fn log_def() -> NodeDef {
        NodeDef {
            name: "Log".to_string(),
            node_type: NodeType::Action,
            desc: "print a message".to_string(),
            doc: Some("Prints **message**.".to_string()),
            children: Some(0),
            input: vec!["target?".to_string()],
            output: vec!["result?".to_string()],
            args: vec![
                NodeArg::new("message", ArgKind::required(ArgType::String), "message"),
                NodeArg::new("extra", ArgKind::optional(ArgType::Json), "extra data")
                    .with_default(json!({ "a": 1 })),
                NodeArg::new("level", ArgKind::optional(ArgType::Enum), "level").with_options(vec![
                    ArgOption {
                        name: "Info".to_string(),
                        value: json!("info"),
                    },
                    ArgOption {
                        name: "Warn".to_string(),
                        value: json!("warn"),
                    },
                ]),
                NodeArg::new("flush", ArgKind::optional(ArgType::Boolean), "flush"),
                NodeArg::new("count", ArgKind::optional(ArgType::Int), "count")
                    .with_default(json!(3)),
            ],
        }
    }

    fn defs() -> NodeDefs {
        vec![log_def(), NodeDef::unknown("Wait")].into()
    }

    fn log_node(args: serde_json::Value) -> EditingNode {
        EditingNode {
            data: NodeModel {
                id: "7".to_string(),
                name: "Log".to_string(),
                args: serde_json::from_value(args).unwrap(),
                ..Default::default()
            },
            editable: true,
            limit_error: false,
        }
    }

    fn workspace() -> InMemoryWorkspace {
        InMemoryWorkspace::new("/ws", defs())
    }

    #[test]
    fn load_fills_header_and_defaults() {
        let form = NodeForm::load(log_node(json!({ "message": "hi" })), log_def(), &defs());
        let values = form.form();
        assert_eq!(values.get(&FieldKey::Type).as_str(), Some("Action"));
        assert_eq!(values.get(&FieldKey::Desc).as_str(), Some("print a message"));
        assert_eq!(values.get(&FieldKey::Children).as_str(), Some("0"));
        assert_eq!(
            values.get(&FieldKey::Arg("extra".into())).as_str(),
            Some("{\n  \"a\": 1\n}")
        );
        assert_eq!(values.get(&FieldKey::Arg("flush".into())), &FieldValue::Bool(false));
        assert_eq!(values.get(&FieldKey::Arg("count".into())), &FieldValue::Int(3));
        assert_eq!(values.get(&FieldKey::Arg("level".into())), &FieldValue::Empty);
        assert!(!values.has_errors());
    }

    #[test]
    fn unknown_definition_has_no_type() {
        let node = EditingNode {
            data: NodeModel {
                id: "8".to_string(),
                name: "Missing".to_string(),
                ..Default::default()
            },
            editable: true,
            limit_error: false,
        };
        let form = NodeForm::load(node, NodeDef::unknown("Missing"), &defs());
        assert_eq!(form.form().get(&FieldKey::Type).as_str(), Some(""));
    }

    #[test]
    fn stored_values_of_another_shape_survive_a_submit() {
        let mut ws = workspace();
        let mut form = NodeForm::load(
            log_node(json!({ "message": "hi", "count": 2.7 })),
            log_def(),
            &defs(),
        );
        assert_eq!(
            form.form().get(&FieldKey::Arg("count".into())),
            &FieldValue::Choice(json!(2.7))
        );
        form.commit(FieldKey::Desc, FieldValue::text("custom"), &mut ws);
        let [EditAction::UpdateNode(node)] = ws.dispatched() else {
            panic!("expected one node update, got {:?}", ws.dispatched());
        };
        assert_eq!(node.args.get("count"), Some(&json!(2.7)));

        let form = NodeForm::load(
            log_node(json!({ "message": "hi", "count": "3" })),
            log_def(),
            &defs(),
        );
        assert_eq!(form.finish().args.get("count"), Some(&json!("3")));
    }

    #[test]
    fn stored_json_null_loads_as_null_literal() {
        let form = NodeForm::load(
            log_node(json!({ "message": "hi", "extra": null })),
            log_def(),
            &defs(),
        );
        assert_eq!(
            form.form().get(&FieldKey::Arg("extra".into())).as_str(),
            Some("null")
        );
    }

    #[test]
    fn load_reports_missing_required_argument() {
        let form = NodeForm::load(log_node(json!({})), log_def(), &defs());
        assert_eq!(
            form.form().errors(&FieldKey::Arg("message".into())),
            &[FieldError::Required {
                field: "message".to_string()
            }]
        );
    }

    #[test]
    fn finish_omits_default_description_and_empty_values() {
        let form = NodeForm::load(
            log_node(json!({ "message": "hi", "extra": null })),
            log_def(),
            &defs(),
        );
        let node = form.finish();
        assert_eq!(node.desc, None);
        assert_eq!(node.path, None);
        assert_eq!(node.args.get("message"), Some(&json!("hi")));
        assert_eq!(node.args.get("extra"), Some(&Value::Null));
        assert_eq!(node.args.get("flush"), Some(&json!(false)));
        assert_eq!(node.args.get("count"), Some(&json!(3)));
        assert!(!node.args.contains_key("level"));
        assert_eq!(node.input, vec![String::new()]);
        assert_eq!(node.output, vec![String::new()]);
    }

    #[test]
    fn commit_submits_valid_changes() {
        let mut ws = workspace();
        let mut form = NodeForm::load(log_node(json!({ "message": "hi" })), log_def(), &defs());
        form.commit(
            FieldKey::Arg("level".into()),
            FieldValue::Choice(json!("warn")),
            &mut ws,
        );
        form.commit(FieldKey::Desc, FieldValue::text("custom"), &mut ws);

        let [EditAction::UpdateNode(first), EditAction::UpdateNode(second)] = ws.dispatched()
        else {
            panic!("expected two node updates, got {:?}", ws.dispatched());
        };
        assert_eq!(first.args.get("level"), Some(&json!("warn")));
        assert_eq!(second.desc.as_deref(), Some("custom"));
    }

    #[test]
    fn invalid_json_blocks_submit() {
        let mut ws = workspace();
        let mut form = NodeForm::load(log_node(json!({ "message": "hi" })), log_def(), &defs());
        form.commit(
            FieldKey::Arg("extra".into()),
            FieldValue::text("{broken"),
            &mut ws,
        );

        assert!(ws.dispatched().is_empty());
        assert_eq!(
            form.form().errors(&FieldKey::Arg("extra".into())),
            &[FieldError::InvalidValue]
        );
    }

    #[test]
    fn changing_definition_resets_editing_node_and_dispatches() {
        let mut ws = workspace();
        let mut node = log_node(json!({ "message": "hi" }));
        node.data.debug = true;
        let mut form = NodeForm::load(node, log_def(), &defs());

        form.commit(FieldKey::Name, FieldValue::text("Wait"), &mut ws);

        let editing = ws.editing_node().unwrap();
        assert_eq!(editing.data.name, "Wait");
        assert!(editing.data.debug);
        assert!(editing.editable);
        let [EditAction::UpdateNode(update)] = ws.dispatched() else {
            panic!("expected one node update, got {:?}", ws.dispatched());
        };
        assert_eq!(update.name, "Wait");
    }

    #[test]
    fn unchanged_name_submits_normally() {
        let mut ws = workspace();
        let mut form = NodeForm::load(log_node(json!({})), log_def(), &defs());
        form.commit(FieldKey::Name, FieldValue::text("Log"), &mut ws);
        // still missing the required message
        assert!(ws.dispatched().is_empty());
        assert!(ws.editing_node().is_none());
    }

    #[test]
    fn new_subtree_path_bypasses_validation() {
        let mut ws = workspace();
        let mut form = NodeForm::load(log_node(json!({})), log_def(), &defs());
        form.commit(FieldKey::Path, FieldValue::text("sub/patrol.json"), &mut ws);

        let [EditAction::UpdateNode(update)] = ws.dispatched() else {
            panic!("expected one node update, got {:?}", ws.dispatched());
        };
        assert_eq!(update.path.as_deref(), Some("sub/patrol.json"));
    }

    #[test]
    fn unknown_name_is_reported_but_does_not_block() {
        let mut ws = workspace();
        let mut node = log_node(json!({}));
        node.data.name = "Logg".to_string();
        let mut form = NodeForm::load(node, NodeDef::unknown("Logg"), &defs());

        assert_eq!(
            form.form().errors(&FieldKey::Name),
            &[FieldError::UnknownNode {
                name: "Logg".to_string(),
                suggestion: Some("Log".to_string()),
            }]
        );
        form.commit(FieldKey::Desc, FieldValue::text("note"), &mut ws);
        assert_eq!(ws.dispatched().len(), 1);
    }

    #[test]
    fn layout_follows_definition() {
        let form = NodeForm::load(log_node(json!({})), log_def(), &defs());
        let layout = form.layout();
        assert_eq!(layout.title, "print a message");
        assert!(!layout.edit_subtree);

        let headings: Vec<_> = layout
            .sections
            .iter()
            .filter_map(|s| s.heading.as_deref())
            .collect();
        assert_eq!(headings, ["Input Variables", "Arguments", "Output Variables"]);
        assert_eq!(layout.sections[1].doc.as_deref(), Some("Prints **message**."));

        let extra = layout.field(&FieldKey::Arg("extra".into())).unwrap();
        assert_eq!(extra.widget, Widget::TextArea);
        assert!(!extra.required);
        let message = layout.field(&FieldKey::Arg("message".into())).unwrap();
        assert!(message.required);
        let target = layout.field(&FieldKey::Input(0)).unwrap();
        assert_eq!(target.label, "target");
        assert_eq!(target.widget, Widget::AutoComplete(OptionSource::Variables));
    }

    #[test]
    fn locked_node_keeps_subtree_controls_when_it_has_a_path() {
        let mut node = log_node(json!({}));
        node.editable = false;
        node.data.path = Some("sub.json".to_string());
        let layout = NodeForm::load(node.clone(), log_def(), &defs()).layout();
        assert!(layout.edit_subtree);
        assert!(layout.field(&FieldKey::Desc).unwrap().disabled);
        assert!(!layout.field(&FieldKey::Debug).unwrap().disabled);
        assert!(!layout.field(&FieldKey::Path).unwrap().disabled);

        node.data.path = None;
        let layout = NodeForm::load(node, log_def(), &defs()).layout();
        assert!(layout.field(&FieldKey::Path).unwrap().disabled);
    }

    #[test]
    fn edit_subtree_dispatches_action() {
        let mut ws = workspace();
        let form = NodeForm::load(log_node(json!({})), log_def(), &defs());
        form.edit_subtree(&mut ws);
        assert_eq!(ws.dispatched(), &[EditAction::EditSubtree]);
    }
}
