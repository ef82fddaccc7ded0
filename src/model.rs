//! Behavior-tree entities the inspector reads and edits.
//!
//! These mirror the editor's document model. The inspector never owns them:
//! it receives snapshots from the [`Workspace`](crate::workspace::Workspace)
//! and sends partial updates back.

use bevy::platform::collections::HashMap;
use core::fmt;
use core::str::FromStr;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::error::ModelError;

/// Display text for a definition without a child-count limit.
pub const UNLIMITED_CHILDREN: &str = "unlimited";

/// Metadata of a behavior tree file.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TreeModel {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
    /// Absent means the tree is exported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub export: Option<bool>,
}

impl TreeModel {
    pub fn is_exported(&self) -> bool {
        self.export != Some(false)
    }
}

/// A node placed in a tree.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeModel {
    pub id: String,
    /// Name of the node definition this node instantiates.
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub debug: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub disabled: bool,
    /// Subtree file this node expands to, relative to the workspace.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub args: BTreeMap<String, Value>,
    #[serde(default)]
    pub input: Vec<String>,
    #[serde(default)]
    pub output: Vec<String>,
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// Category of a node definition.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeType {
    #[default]
    Action,
    Composite,
    Decorator,
    Condition,
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NodeType::Action => "Action",
            NodeType::Composite => "Composite",
            NodeType::Decorator => "Decorator",
            NodeType::Condition => "Condition",
        };
        f.write_str(name)
    }
}

/// Base type of a node argument.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ArgType {
    Int,
    Float,
    String,
    Code,
    Enum,
    Boolean,
    Json,
}

impl ArgType {
    pub fn as_str(self) -> &'static str {
        match self {
            ArgType::Int => "int",
            ArgType::Float => "float",
            ArgType::String => "string",
            ArgType::Code => "code",
            ArgType::Enum => "enum",
            ArgType::Boolean => "boolean",
            ArgType::Json => "json",
        }
    }
}

impl fmt::Display for ArgType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Argument type as written in a definition, e.g. `"int"` or `"json?"`.
///
/// A `?` marks the argument optional.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ArgKind {
    pub ty: ArgType,
    pub optional: bool,
}

impl ArgKind {
    pub const fn required(ty: ArgType) -> Self {
        Self {
            ty,
            optional: false,
        }
    }

    pub const fn optional(ty: ArgType) -> Self {
        Self { ty, optional: true }
    }
}

impl FromStr for ArgKind {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let optional = s.contains('?');
        let base = s.replace('?', "");
        let ty = match base.trim() {
            "int" => ArgType::Int,
            "float" => ArgType::Float,
            "string" => ArgType::String,
            "code" => ArgType::Code,
            "enum" => ArgType::Enum,
            "boolean" | "bool" => ArgType::Boolean,
            "json" => ArgType::Json,
            _ => return Err(ModelError::UnknownArgType(s.to_string())),
        };
        Ok(Self { ty, optional })
    }
}

impl TryFrom<String> for ArgKind {
    type Error = ModelError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ArgKind> for String {
    fn from(kind: ArgKind) -> Self {
        kind.to_string()
    }
}

impl fmt::Display for ArgKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.ty.as_str())?;
        if self.optional {
            f.write_str("?")?;
        }
        Ok(())
    }
}

/// One choice of an `enum` argument.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ArgOption {
    pub name: String,
    pub value: Value,
}

/// Schema of one argument of a node definition.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NodeArg {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ArgKind,
    #[serde(default)]
    pub desc: String,
    /// Prefix of the input slot this argument is paired with.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oneof: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<ArgOption>,
}

impl NodeArg {
    pub fn new(name: impl Into<String>, kind: ArgKind, desc: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            desc: desc.into(),
            oneof: None,
            default: None,
            options: Vec::new(),
        }
    }

    pub fn with_oneof(mut self, input: impl Into<String>) -> Self {
        self.oneof = Some(input.into());
        self
    }

    pub fn with_default(mut self, value: Value) -> Self {
        self.default = Some(value);
        self
    }

    pub fn with_options(mut self, options: Vec<ArgOption>) -> Self {
        self.options = options;
        self
    }

    pub fn is_required(&self) -> bool {
        !self.kind.optional
    }
}

/// Schema of a node type.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeDef {
    pub name: String,
    #[serde(rename = "type", default)]
    pub node_type: NodeType,
    #[serde(default)]
    pub desc: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,
    /// Maximum number of children, `None` or `-1` when unlimited.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<i32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<NodeArg>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub input: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub output: Vec<String>,
}

impl NodeDef {
    /// Placeholder for a node naming a definition nobody registered.
    pub fn unknown(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            desc: "<unknown>".to_string(),
            ..Default::default()
        }
    }

    /// Child-count limit, or `None` when unlimited.
    pub fn child_limit(&self) -> Option<i32> {
        self.children.filter(|&n| n != -1)
    }

    pub fn children_label(&self) -> String {
        match self.child_limit() {
            Some(n) => n.to_string(),
            None => UNLIMITED_CHILDREN.to_string(),
        }
    }

    pub fn arg(&self, name: &str) -> Option<&NodeArg> {
        self.args.iter().find(|arg| arg.name == name)
    }
}

/// Whether an input/output slot descriptor must be bound.
pub fn is_required_slot(slot: &str) -> bool {
    !slot.contains('?')
}

/// Display name of an input/output slot descriptor.
pub fn slot_name(slot: &str) -> String {
    slot.replace('?', "")
}

/// Known node definitions, in registration order.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<NodeDef>", into = "Vec<NodeDef>")]
pub struct NodeDefs {
    defs: Vec<NodeDef>,
    index: HashMap<String, usize>,
}

impl NodeDefs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a definition, replacing any previous one with the same name.
    pub fn insert(&mut self, def: NodeDef) {
        match self.index.get(&def.name) {
            Some(&i) => self.defs[i] = def,
            None => {
                self.index.insert(def.name.clone(), self.defs.len());
                self.defs.push(def);
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&NodeDef> {
        self.index.get(name).map(|&i| &self.defs[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &NodeDef> {
        self.defs.iter()
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }
}

impl FromIterator<NodeDef> for NodeDefs {
    fn from_iter<I: IntoIterator<Item = NodeDef>>(iter: I) -> Self {
        let mut defs = NodeDefs::new();
        for def in iter {
            defs.insert(def);
        }
        defs
    }
}

impl From<Vec<NodeDef>> for NodeDefs {
    fn from(defs: Vec<NodeDef>) -> Self {
        defs.into_iter().collect()
    }
}

impl From<NodeDefs> for Vec<NodeDef> {
    fn from(defs: NodeDefs) -> Self {
        defs.defs
    }
}

/// A node of the currently open tree, resolved against its definition.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TreeGraphData {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub input: Vec<String>,
    #[serde(default)]
    pub output: Vec<String>,
    #[serde(default)]
    pub children: Vec<TreeGraphData>,
    pub def: NodeDef,
}

impl TreeGraphData {
    /// Depth-first, parent before children.
    pub fn walk(&self, visit: &mut impl FnMut(&TreeGraphData)) {
        visit(self);
        for child in &self.children {
            child.walk(visit);
        }
    }

    pub fn find_mut(&mut self, id: &str) -> Option<&mut TreeGraphData> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter_mut().find_map(|child| child.find_mut(id))
    }
}

/// The tree whose properties are being edited.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EditingTree {
    pub data: TreeModel,
}

/// The node whose properties are being edited.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EditingNode {
    pub data: NodeModel,
    /// False for nodes inside an expanded subtree.
    pub editable: bool,
    /// Set when the node has more children than its definition allows.
    pub limit_error: bool,
}

/// The node definition being viewed.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EditingNodeDef {
    pub data: NodeDef,
}
