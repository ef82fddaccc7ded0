//! Auto-complete option lists for the node form.

use std::path::PathBuf;

use crate::model::{NodeDefs, TreeGraphData};

/// Minimum Jaro-Winkler similarity for a "did you mean" suggestion.
const SUGGESTION_THRESHOLD: f64 = 0.8;

/// One entry of an auto-complete list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompletionOption {
    /// Text shown in the list and matched against the input.
    pub label: String,
    /// Text written into the field when picked.
    pub value: String,
}

impl CompletionOption {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

/// Every known node definition, labelled `name(desc)`.
pub fn node_options(defs: &NodeDefs) -> Vec<CompletionOption> {
    defs.iter()
        .map(|def| CompletionOption::new(format!("{}({})", def.name, def.desc), def.name.clone()))
        .collect()
}

/// Variable names bound anywhere in the open tree.
///
/// Walks the tree parent-first; the first occurrence of a variable decides
/// its label.
pub fn variable_options(root: Option<&TreeGraphData>) -> Vec<CompletionOption> {
    let mut options: Vec<CompletionOption> = Vec::new();
    let Some(root) = root else {
        return options;
    };

    root.walk(&mut |node| {
        let slots = [(&node.input, &node.def.input), (&node.output, &node.def.output)];
        for (vars, descs) in slots {
            for (i, var) in vars.iter().enumerate() {
                if var.is_empty() || options.iter().any(|o| &o.value == var) {
                    continue;
                }
                let desc = descs.get(i).map(String::as_str).unwrap_or("<unknown>");
                options.push(CompletionOption::new(format!("{var}({desc})"), var.clone()));
            }
        }
    });
    options
}

/// Subtree files, relativised and sorted.
pub fn subtree_options(
    files: &[PathBuf],
    relative: impl Fn(&PathBuf) -> String,
) -> Vec<CompletionOption> {
    let mut options: Vec<CompletionOption> = files
        .iter()
        .map(|file| {
            let value = relative(file);
            CompletionOption::new(value.clone(), value)
        })
        .collect();
    options.sort_by(|a, b| {
        a.value
            .to_lowercase()
            .cmp(&b.value.to_lowercase())
            .then_with(|| a.value.cmp(&b.value))
    });
    options
}

/// Options whose label contains `input`, ignoring case.
pub fn filter_options<'a>(
    options: &'a [CompletionOption],
    input: &str,
) -> impl Iterator<Item = &'a CompletionOption> {
    let needle = input.to_uppercase();
    options
        .iter()
        .filter(move |option| option.label.to_uppercase().contains(&needle))
}

/// The candidate most similar to `input`, if any is similar enough.
pub fn closest_match<'a>(candidates: impl Iterator<Item = &'a str>, input: &str) -> Option<&'a str> {
    candidates
        .map(|candidate| (candidate, strsim::jaro_winkler(candidate, input)))
        .filter(|(_, score)| *score >= SUGGESTION_THRESHOLD)
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(candidate, _)| candidate)
}
