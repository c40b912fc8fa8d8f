//! Weighted caller/callee graph built from backtraces.
//!
//! # Counting
//!
//! - **Node samples**: number of backtraces in which the function appears
//!   anywhere on the stack. A function recurring in one backtrace still
//!   counts once, so `samples / total` is the share of time spent in the
//!   function or anything it called.
//! - **Edge count**: number of adjacent frame pairs `(caller, callee)`,
//!   i.e. frame `i + 1` calling frame `i`. Non-adjacent recursion adds
//!   nothing beyond its adjacent pairs.
//!
//! ```text
//! backtrace (innermost first)     nodes           edges
//! ───────────────────────────     ─────────────   ─────────────
//! f1  ← sampled here              f1: 1           f2 → f1: 1
//! f2                              f2: 1           f3 → f2: 1
//! f3                              f3: 1
//! ```
//!
//! # Storage
//!
//! Nodes live in an arena indexed by [`NodeId`]; edges are a map keyed by
//! `(caller, callee)` ids, so there are no references between nodes.

// Fractions are computed from sample counts
#![allow(clippy::cast_precision_loss)]

use log::{debug, info};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};

use crate::domain::{AddressSpace, Backtrace, ProfileError, Rip};
use crate::symbolization::{resolve_sorted, SymbolTable};

/// Name of the single node standing in for all user-space frames.
pub const USER_NODE: &str = "USER";

/// Callers at or below this fraction of backtraces are left out of the
/// top-caller ranking.
pub const TOP_CALLER_THRESHOLD: f64 = 0.01;

/// Index of a node in the graph arena.
pub type NodeId = usize;

/// One function in the call graph.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphNode {
    pub name: String,
    /// Backtraces containing this function at least once.
    pub samples: usize,
    /// `samples / total backtraces`.
    pub fraction: f64,
}

/// A callee as seen from one caller.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalleeShare {
    pub name: String,
    /// Share of the callee's time reached through this caller.
    pub attributed_fraction: f64,
    /// Direct calls from the caller observed in backtraces.
    pub calls: usize,
}

/// A top caller with its ranked callees.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CallerSummary {
    pub name: String,
    pub fraction: f64,
    pub samples: usize,
    pub callees: Vec<CalleeShare>,
}

/// Call graph accumulated over all backtraces of a run.
#[derive(Debug, Clone, Default)]
pub struct CallGraph {
    nodes: Vec<GraphNode>,
    index: HashMap<String, NodeId>,
    edges: BTreeMap<(NodeId, NodeId), usize>,
    total_backtraces: usize,
    max_fraction: f64,
}

/// Resolve every kernel frame of `backtraces` against `table`.
///
/// User frames are not looked up; they collapse into [`USER_NODE`].
///
/// # Errors
/// Returns `AddressNotFound` if a kernel frame has no owning symbol
pub fn kernel_symbol_map(
    backtraces: &[Backtrace],
    table: &SymbolTable,
) -> Result<HashMap<u64, String>, ProfileError> {
    let mut addrs: Vec<u64> = backtraces
        .iter()
        .flat_map(|bt| bt.frames.iter())
        .filter(|rip| rip.space == AddressSpace::Kernel)
        .map(|rip| rip.value)
        .collect();
    addrs.sort_unstable();
    addrs.dedup();

    let resolution = resolve_sorted(&addrs, table)?;
    Ok(resolution.address_map())
}

impl CallGraph {
    /// Build the graph from backtraces and a kernel address → function map.
    ///
    /// # Errors
    /// Returns `AddressNotFound` if a kernel frame is missing from `symbols`
    pub fn build(
        backtraces: &[Backtrace],
        symbols: &HashMap<u64, String>,
    ) -> Result<Self, ProfileError> {
        let mut graph = Self { total_backtraces: backtraces.len(), ..Self::default() };

        for bt in backtraces {
            graph.add_backtrace(bt, symbols)?;
        }
        graph.compute_fractions();

        info!(
            "Call graph: {} nodes, {} edges from {} backtraces",
            graph.nodes.len(),
            graph.edges.len(),
            graph.total_backtraces
        );
        Ok(graph)
    }

    fn add_backtrace(
        &mut self,
        bt: &Backtrace,
        symbols: &HashMap<u64, String>,
    ) -> Result<(), ProfileError> {
        let ids = bt
            .frames
            .iter()
            .map(|&rip| self.node_for(rip, symbols))
            .collect::<Result<Vec<NodeId>, ProfileError>>()?;

        let touched: HashSet<NodeId> = ids.iter().copied().collect();
        for id in touched {
            self.nodes[id].samples += 1;
        }

        for pair in ids.windows(2) {
            let (callee, caller) = (pair[0], pair[1]);
            *self.edges.entry((caller, callee)).or_insert(0) += 1;
        }
        Ok(())
    }

    fn node_for(&mut self, rip: Rip, symbols: &HashMap<u64, String>) -> Result<NodeId, ProfileError> {
        if rip.is_user() {
            return Ok(self.ensure_node(USER_NODE));
        }
        let name = symbols.get(&rip.value).ok_or(ProfileError::AddressNotFound(rip.value))?;
        Ok(self.ensure_node(name))
    }

    fn ensure_node(&mut self, name: &str) -> NodeId {
        if let Some(&id) = self.index.get(name) {
            return id;
        }
        let id = self.nodes.len();
        self.nodes.push(GraphNode { name: name.to_string(), samples: 0, fraction: 0.0 });
        self.index.insert(name.to_string(), id);
        id
    }

    fn compute_fractions(&mut self) {
        if self.total_backtraces == 0 {
            return;
        }
        let total = self.total_backtraces as f64;
        for node in &mut self.nodes {
            node.fraction = node.samples as f64 / total;
            self.max_fraction = self.max_fraction.max(node.fraction);
        }
    }

    /// Nodes in first-seen order.
    #[must_use]
    pub fn nodes(&self) -> &[GraphNode] {
        &self.nodes
    }

    #[must_use]
    pub fn node(&self, name: &str) -> Option<&GraphNode> {
        self.index.get(name).map(|&id| &self.nodes[id])
    }

    /// Every `(caller, callee, calls)` edge, ordered by caller then callee id.
    pub fn edges(&self) -> impl Iterator<Item = (&GraphNode, &GraphNode, usize)> + '_ {
        self.edges
            .iter()
            .map(|(&(caller, callee), &calls)| (&self.nodes[caller], &self.nodes[callee], calls))
    }

    /// Direct calls from `caller` to `callee`, 0 if never observed.
    #[must_use]
    pub fn edge_count(&self, caller: &str, callee: &str) -> usize {
        match (self.index.get(caller), self.index.get(callee)) {
            (Some(&a), Some(&b)) => self.edges.get(&(a, b)).copied().unwrap_or(0),
            _ => 0,
        }
    }

    #[must_use]
    pub fn total_backtraces(&self) -> usize {
        self.total_backtraces
    }

    /// Largest node fraction, used to scale exported node sizes.
    #[must_use]
    pub fn max_fraction(&self) -> f64 {
        self.max_fraction
    }

    /// Callers above [`TOP_CALLER_THRESHOLD`], most samples first, each with
    /// its callees ranked by attributed fraction.
    #[must_use]
    pub fn top_callers(&self) -> Vec<CallerSummary> {
        let mut ids: Vec<NodeId> = (0..self.nodes.len())
            .filter(|&id| self.nodes[id].fraction > TOP_CALLER_THRESHOLD)
            .collect();
        ids.sort_unstable_by(|&a, &b| {
            let (na, nb) = (&self.nodes[a], &self.nodes[b]);
            nb.samples.cmp(&na.samples).then_with(|| na.name.cmp(&nb.name))
        });

        ids.into_iter()
            .map(|id| {
                let node = &self.nodes[id];
                CallerSummary {
                    name: node.name.clone(),
                    fraction: node.fraction,
                    samples: node.samples,
                    callees: self.ranked_callees(id),
                }
            })
            .collect()
    }

    /// Callees of `caller` by how much of their time flows through it.
    ///
    /// `callee.fraction * calls / callee.samples`: the callee's share of all
    /// backtraces, scaled by the part of its samples reached from `caller`.
    fn ranked_callees(&self, caller: NodeId) -> Vec<CalleeShare> {
        let mut callees: Vec<CalleeShare> = self
            .edges
            .range((caller, 0)..=(caller, NodeId::MAX))
            .map(|(&(_, callee), &calls)| {
                let node = &self.nodes[callee];
                let from_caller = calls as f64 / node.samples as f64;
                CalleeShare {
                    name: node.name.clone(),
                    attributed_fraction: node.fraction * from_caller,
                    calls,
                }
            })
            .collect();

        callees.sort_by(|a, b| {
            b.attributed_fraction
                .total_cmp(&a.attributed_fraction)
                .then_with(|| a.name.cmp(&b.name))
        });
        debug!("{} callees for {}", callees.len(), self.nodes[caller].name);
        callees
    }
}
