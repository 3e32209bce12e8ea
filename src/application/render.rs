//! Text rendering of the visible chart via termtree.

use std::fmt::Write;

use itertools::Itertools;
use termtree::Tree;
use tracing::instrument;

use crate::config::RenderSettings;
use crate::domain::{NodeRef, OrgTree, ViewState};

/// Marker appended to collapsed nodes that hide subordinates.
pub const COLLAPSED_MARKER: &str = "[+]";

/// Marker for nodes whose subordinates lie beyond [`MAX_RENDER_DEPTH`].
pub const TRUNCATED_MARKER: &str = "[...]";

/// Deepest level drawn; the root is level 1.
pub const MAX_RENDER_DEPTH: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    /// Append the direct-subordinate count, e.g. `DIRETOR 1 [6]`
    pub show_counts: bool,
    /// Append `(id)` when the id differs from the name
    pub show_ids: bool,
    /// Attribute keys to show after the name, in order
    pub attributes: Vec<String>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self::from(&RenderSettings::default())
    }
}

impl From<&RenderSettings> for RenderOptions {
    fn from(settings: &RenderSettings) -> Self {
        Self {
            show_counts: settings.show_counts,
            show_ids: settings.show_ids,
            attributes: settings.attributes.clone(),
        }
    }
}

/// Single-line label for a chart node.
pub fn node_label(node: NodeRef<'_>, view: &ViewState, options: &RenderOptions) -> String {
    let mut label = node.name().to_string();

    let id = node.id().to_string();
    if options.show_ids && id != label {
        let _ = write!(label, " ({})", id);
    }
    if options.show_counts {
        let _ = write!(label, " [{}]", node.child_count());
    }

    let attributes = options
        .attributes
        .iter()
        .filter_map(|key| node.attribute(key))
        .filter(|value| !value.is_empty())
        .join(" · ");
    if !attributes.is_empty() {
        label.push_str(" · ");
        label.push_str(&attributes);
    }

    if node.child_count() > 0 && view.is_collapsed(node.id()) {
        label.push(' ');
        label.push_str(COLLAPSED_MARKER);
    }
    label
}

pub trait TreeRender {
    fn render(&self, view: &ViewState, options: &RenderOptions) -> Tree<String>;
}

impl TreeRender for OrgTree {
    #[instrument(level = "debug", skip_all)]
    fn render(&self, view: &ViewState, options: &RenderOptions) -> Tree<String> {
        let mut stack = vec![RenderFrame::new(self.root(), 1, view, options)];
        let mut rendered = Tree::new(String::new());
        while let Some(mut frame) = stack.pop() {
            match frame.pending.next() {
                Some(child) => {
                    let level = stack.len() + 2;
                    stack.push(frame);
                    stack.push(RenderFrame::new(child, level, view, options));
                }
                None => match stack.last_mut() {
                    Some(parent) => {
                        parent.tree.push(frame.tree);
                    }
                    None => rendered = frame.tree,
                },
            }
        }
        rendered
    }
}

/// A node whose termtree is being assembled, with the subordinates still to render.
struct RenderFrame<'a> {
    tree: Tree<String>,
    pending: std::vec::IntoIter<NodeRef<'a>>,
}

impl<'a> RenderFrame<'a> {
    fn new(node: NodeRef<'a>, level: usize, view: &ViewState, options: &RenderOptions) -> Self {
        let mut label = node_label(node, view, options);
        let expanded = !view.is_collapsed(node.id());
        let truncated = expanded && node.child_count() > 0 && level >= MAX_RENDER_DEPTH;
        if truncated {
            label.push(' ');
            label.push_str(TRUNCATED_MARKER);
        }
        let pending: Vec<NodeRef<'a>> = if expanded && !truncated {
            node.children().collect()
        } else {
            Vec::new()
        };
        Self {
            tree: Tree::new(label),
            pending: pending.into_iter(),
        }
    }
}
