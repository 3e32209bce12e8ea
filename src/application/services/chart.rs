//! Chart service
//!
//! Owns the authoritative tree and the collapse flags, and turns drop events
//! into moves. Each move is one state replacement: the new tree is computed on
//! a copy and swapped in only when the move is valid.

use termtree::Tree;
use tracing::{debug, instrument, warn};

use crate::application::{ApplicationResult, RenderOptions, TreeRender};
use crate::domain::{NodeId, OrgTree, ViewState};

#[derive(Debug, Clone)]
pub struct ChartService {
    tree: OrgTree,
    view: ViewState,
    options: RenderOptions,
}

impl ChartService {
    pub fn new(tree: OrgTree) -> Self {
        Self {
            tree,
            view: ViewState::new(),
            options: RenderOptions::default(),
        }
    }

    /// Use `view` as initial collapse state; flags for unknown ids are dropped.
    pub fn with_view(mut self, mut view: ViewState) -> Self {
        view.retain_known(&self.tree);
        self.view = view;
        self
    }

    pub fn with_render_options(mut self, options: RenderOptions) -> Self {
        self.options = options;
        self
    }

    pub fn tree(&self) -> &OrgTree {
        &self.tree
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn into_tree(self) -> OrgTree {
        self.tree
    }

    /// Apply a drop of `moved` onto `target`.
    ///
    /// On rejection the current tree is untouched and stays usable.
    #[instrument(level = "debug", skip(self))]
    pub fn move_node(&mut self, moved: &NodeId, target: &NodeId) -> ApplicationResult<&OrgTree> {
        match self.tree.reparented(moved, target) {
            Ok(next) => {
                self.tree = next;
                debug!("chart updated: {} now under {}", moved, target);
                Ok(&self.tree)
            }
            Err(e) => {
                warn!("rejected move {} -> {}: {}", moved, target, e);
                Err(e.into())
            }
        }
    }

    /// Apply moves in order, stopping at the first rejection.
    ///
    /// Moves before the rejected one stay applied. Returns the number applied.
    pub fn move_nodes<I>(&mut self, moves: I) -> ApplicationResult<usize>
    where
        I: IntoIterator<Item = (NodeId, NodeId)>,
    {
        let mut applied = 0;
        for (moved, target) in moves {
            self.move_node(&moved, &target)?;
            applied += 1;
        }
        Ok(applied)
    }

    pub fn toggle_collapse(&mut self, id: &NodeId) -> bool {
        self.view.toggle_collapse(id)
    }

    pub fn collapse(&mut self, id: &NodeId) {
        self.view.collapse(id);
    }

    pub fn render(&self) -> Tree<String> {
        self.tree.render(&self.view, &self.options)
    }
}
