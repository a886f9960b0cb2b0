#![forbid(unsafe_code)]

//! Layout collaborators for canopy model graphs.
//!
//! [`LayoutEngine`] computes geometry for the visible part of a graph; [`ExpansionEngine`]
//! changes expansion state and re-lays out. [`LayeredLayout`] and [`Relayouter`] are the
//! default implementations.

pub mod config;
pub mod error;
pub mod layered;
pub mod rank;
pub mod relayout;

pub use config::LayoutConfig;
pub use error::{Error, Result};
pub use layered::LayeredLayout;
pub use relayout::Relayouter;

use canopy_model::ModelGraph;

pub trait LayoutEngine {
    /// Computes sizes, offsets and scope edges for `scope` (`None` is the root scope) and every
    /// expanded group inside it.
    fn layout(&self, graph: &mut ModelGraph, scope: Option<&str>) -> Result<()>;
}

impl<T: LayoutEngine + ?Sized> LayoutEngine for Box<T> {
    fn layout(&self, graph: &mut ModelGraph, scope: Option<&str>) -> Result<()> {
        (**self).layout(graph, scope)
    }
}

/// Expansion-state changes followed by a re-layout. Each operation returns the deepest
/// expanded group ids afterwards.
pub trait ExpansionEngine {
    /// `None` expands every group.
    fn expand_group(
        &self,
        graph: &mut ModelGraph,
        group_id: Option<&str>,
        all: bool,
    ) -> Result<Vec<String>>;

    /// `None` collapses every group.
    fn collapse_group(
        &self,
        graph: &mut ModelGraph,
        group_id: Option<&str>,
        all: bool,
    ) -> Result<Vec<String>>;

    fn relayout(&self, graph: &mut ModelGraph, options: &RelayoutOptions) -> Result<Vec<String>>;
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelayoutOptions {
    pub target_deepest_group_ids_to_expand: Vec<String>,
    /// Collapse everything before expanding the targets.
    pub clear_all_expand_states: bool,
}
