//! Central UI state for the inspector.

use bevy::prelude::*;

use crate::forms::{ActiveForm, InspectorTarget, OptionSource};
use crate::options::{CompletionOption, node_options, subtree_options, variable_options};
use crate::workspace::{InMemoryWorkspace, Workspace};

/// Marker component for inspector-internal entities (cameras, panels).
#[derive(Component)]
pub struct InspectorInternal;

/// The workspace the inspector reads from and dispatches to.
///
/// Insert your own implementation to connect the inspector to an editor;
/// the default is an empty [`InMemoryWorkspace`].
#[derive(Resource)]
pub struct InspectedWorkspace(pub Box<dyn Workspace + Send + Sync>);

impl InspectedWorkspace {
    pub fn new(workspace: impl Workspace + Send + Sync + 'static) -> Self {
        Self(Box::new(workspace))
    }

    pub fn get(&self) -> &dyn Workspace {
        self.0.as_ref()
    }

    pub fn get_mut(&mut self) -> &mut dyn Workspace {
        self.0.as_mut()
    }
}

impl Default for InspectedWorkspace {
    fn default() -> Self {
        Self::new(InMemoryWorkspace::default())
    }
}

/// Central UI state for the inspector.
/// All form-related state flows through this resource.
#[derive(Resource, Default)]
pub struct InspectorState {
    /// Snapshot of what is being inspected, used for change detection.
    pub target: InspectorTarget,
    /// Form of the active view, `None` when nothing is selected.
    pub form: Option<ActiveForm>,
    /// Whether the panel must be rebuilt from the form.
    pub needs_rebuild: bool,
    /// Whether the text field being edited survives the next rebuild.
    /// Set after commits; cleared when the target switches to another subject.
    pub keep_focus: bool,
}

/// Cached completion options to avoid recomputation on every keystroke.
#[derive(Resource, Default)]
pub struct InspectorCache {
    pub node_defs: Vec<CompletionOption>,
    pub variables: Vec<CompletionOption>,
    pub subtrees: Vec<CompletionOption>,
}

impl InspectorCache {
    pub fn refresh(&mut self, workspace: &dyn Workspace) {
        self.node_defs = node_options(workspace.node_defs());
        self.variables = variable_options(workspace.editing_graph());
        self.subtrees = subtree_options(workspace.all_files(), |path| workspace.relative(path));
    }

    pub fn options(&self, source: OptionSource) -> &[CompletionOption] {
        match source {
            OptionSource::NodeDefs => &self.node_defs,
            OptionSource::Variables => &self.variables,
            OptionSource::Subtrees => &self.subtrees,
        }
    }
}

/// Tracks the state of the inspector window.
#[derive(Resource, Default)]
pub struct InspectorWindowState {
    /// Entity ID of the inspector window, if it exists.
    pub window_entity: Option<Entity>,
    /// Entity ID of the camera rendering to the inspector window.
    pub camera_entity: Option<Entity>,
    /// Whether the inspector window is currently open.
    pub is_open: bool,
}
