//! Read-only view of a node definition.

use super::layout::{FieldSpec, FormLayout, FormSection};
use crate::form::{FieldKey, FormState};
use crate::model::{NodeDef, is_required_slot, slot_name};

#[derive(Clone, Debug, PartialEq)]
pub struct NodeDefView {
    def: NodeDef,
    form: FormState,
}

impl NodeDefView {
    pub fn load(def: NodeDef) -> Self {
        let mut form = FormState::new();
        form.set(FieldKey::Name, def.name.clone());
        form.set(FieldKey::Type, def.node_type.to_string());
        form.set(FieldKey::Desc, def.desc.clone());
        form.set(FieldKey::Doc, def.doc.clone());
        form.set(FieldKey::Children, def.children_label());
        for (i, slot) in def.input.iter().enumerate() {
            form.set(FieldKey::Input(i), slot_name(slot));
        }
        for (i, slot) in def.output.iter().enumerate() {
            form.set(FieldKey::Output(i), slot_name(slot));
        }
        for arg in &def.args {
            form.set(FieldKey::Arg(arg.name.clone()), arg.kind.ty.to_string());
        }
        Self { def, form }
    }

    pub fn form(&self) -> &FormState {
        &self.form
    }

    pub fn def(&self) -> &NodeDef {
        &self.def
    }

    pub fn layout(&self) -> FormLayout {
        let mut sections = vec![FormSection {
            fields: vec![
                FieldSpec::read_only(FieldKey::Name, "Name"),
                FieldSpec::read_only(FieldKey::Type, "Type"),
                FieldSpec::read_only(FieldKey::Children, "Children"),
                FieldSpec::read_only(FieldKey::Desc, "Description"),
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
            sections.push(FormSection::titled(
                "Input Variables",
                slot_fields(&self.def.input, FieldKey::Input),
            ));
        }

        if !self.def.args.is_empty() {
            let fields = self
                .def
                .args
                .iter()
                .map(|arg| {
                    FieldSpec::read_only(FieldKey::Arg(arg.name.clone()), &arg.desc)
                        .required(arg.is_required())
                })
                .collect();
            sections.push(FormSection::titled("Arguments", fields));
        }

        if !self.def.output.is_empty() {
            sections.push(FormSection::titled(
                "Output Variables",
                slot_fields(&self.def.output, FieldKey::Output),
            ));
        }

        FormLayout {
            title: "Node Definition".to_string(),
            sections,
            edit_subtree: false,
        }
    }
}

fn slot_fields(slots: &[String], key: fn(usize) -> FieldKey) -> Vec<FieldSpec> {
    slots
        .iter()
        .enumerate()
        .map(|(i, slot)| {
            FieldSpec::read_only(key(i), format!("[{i}]")).required(is_required_slot(slot))
        })
        .collect()
}
