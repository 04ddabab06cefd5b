/*
 * SPDX-FileCopyrightText: 2025 The fwbw-scc developers
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Strongly connected components by forward/backward label propagation.
//!
//! Each round of the algorithm is made of two phases, both run by a host
//! [engine](crate::traits::Engine):
//!
//! - a [forward](Forward) phase trims vertices that cannot lie on a cycle
//!   and labels every other vertex with the minimum id of the vertices
//!   reaching it;
//! - a [backward](Backward) phase starts from the _leaders_, that is, the
//!   vertices labelled with their own id, and confirms the vertices that
//!   reach a leader with the same label: they form the component of the
//!   leader.
//!
//! Confirmed vertices tombstone their edges, so every round works on the
//! residual graph. The [driver](scc) stops after a forward phase in which
//! every vertex with edges is confirmed or trimmed.
//!
//! # Examples
//!
//! ```
//! use dsi_progress_logger::no_logging;
//! use fwbw_scc::prelude::*;
//!
//! let topology = Topology::from_arcs(4, [(0, 1), (1, 2), (2, 0), (1, 3)])?;
//! let mut engine = InMemoryEngine::new(topology, EngineConfig::default())?;
//! let mut outcome = scc(&mut engine, &SccConfig::default(), no_logging![])?;
//!
//! assert_eq!(outcome.convergence, Convergence::Converged);
//! assert_eq!(&*outcome.colors, &[0, 0, 0, 3]);
//! assert_eq!(outcome.sccs.sort_by_size(), vec![3, 1].into_boxed_slice());
//! # Ok::<(), anyhow::Error>(())
//! ```

mod backward;
pub use backward::Backward;

mod context;
pub use context::{Phase, RunContext};

mod forward;
pub use forward::Forward;

use crate::codec::{Field, Record};
use crate::record::UNSET;
use crate::sccs::Sccs;
use crate::traits::{EdgeHandle, Engine, IterationContext, VertexHandle};
use anyhow::{ensure, Context, Result};
use dsi_progress_logger::ProgressLog;
use log::info;

/// Configuration of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SccConfig {
    /// The maximum number of iterations, over all phases and rounds.
    pub max_iterations: usize,
}

impl Default for SccConfig {
    fn default() -> Self {
        Self {
            max_iterations: 1000,
        }
    }
}

impl SccConfig {
    pub fn max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }
}

/// Whether a run reached its fixed point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Convergence {
    Converged,
    /// The iteration cap was hit: the decomposition is partial, and
    /// unconfirmed vertices are colored by their own id.
    DidNotConverge,
}

/// The result of [`scc`].
#[derive(Debug)]
pub struct SccOutcome {
    /// The final color of each vertex: the id of the leader of its
    /// component.
    pub colors: Box<[i32]>,
    /// The components induced by the colors.
    pub sccs: Sccs,
    /// The number of rounds started.
    pub rounds: usize,
    /// The number of iterations performed.
    pub iterations: usize,
    pub convergence: Convergence,
    /// The number of unconfirmed vertices, including vertices without edges,
    /// which are never confirmed.
    pub unconfirmed: usize,
}

/// The result of [`forward_labels`].
#[derive(Debug)]
pub struct ForwardOutcome {
    /// The forward label of each vertex.
    pub labels: Box<[i32]>,
    pub iterations: usize,
    pub convergence: Convergence,
}

/// Computes the strongly connected components of the graph stored in an
/// engine.
///
/// The engine is [reset](Engine::reset) first, so a run never sees the
/// tombstones of a previous one. The edge layout of the engine must store
/// backward labels.
pub fn scc<E: Engine>(
    engine: &mut E,
    config: &SccConfig,
    pl: &mut impl ProgressLog,
) -> Result<SccOutcome> {
    ensure!(
        engine.edge_codec().contains(Field::MinB),
        "The edge layout {:?} does not store backward labels",
        engine.edge_codec().fields()
    );
    engine.reset().context("Could not reset the engine")?;

    pl.item_name("update");
    pl.start("Computing strongly connected components...");

    let mut run = RunContext::new();
    let mut convergence = Convergence::DidNotConverge;

    loop {
        run.begin_phase(Phase::Forward);
        let budget = config.max_iterations.saturating_sub(run.global_iteration());
        let forward = engine
            .run_phase(&Forward, &mut run, budget, pl)
            .with_context(|| format!("Forward phase of round {} failed", run.round()))?;
        info!(
            "Round {}: forward phase {} after {} iterations and {} updates",
            run.round(),
            if forward.converged { "converged" } else { "stopped" },
            forward.iterations,
            forward.updates
        );
        if !forward.converged {
            break;
        }
        if !run.has_remaining_work() {
            convergence = Convergence::Converged;
            break;
        }

        run.begin_phase(Phase::Backward);
        let budget = config.max_iterations.saturating_sub(run.global_iteration());
        let backward = engine
            .run_phase(&Backward, &mut run, budget, pl)
            .with_context(|| format!("Backward phase of round {} failed", run.round()))?;
        info!(
            "Round {}: backward phase {} after {} iterations and {} updates",
            run.round(),
            if backward.converged { "converged" } else { "stopped" },
            backward.iterations,
            backward.updates
        );
        if !backward.converged {
            break;
        }
    }

    pl.done();

    let num_nodes = engine.num_nodes();
    let mut colors = Vec::with_capacity(num_nodes);
    let mut unconfirmed = 0;
    for node in 0..num_nodes {
        let value = engine
            .vertex_value(node)
            .with_context(|| format!("Could not load vertex {}", node))?;
        colors.push(value.color);
        unconfirmed += !value.confirmed as usize;
    }

    if convergence == Convergence::DidNotConverge {
        log::warn!(
            "No fixed point within {} iterations; {} vertices are unconfirmed",
            config.max_iterations,
            unconfirmed
        );
    }

    let sccs = Sccs::from_colors(&colors);
    info!(
        "Found {} components in {} rounds and {} iterations",
        sccs.num_components(),
        run.round() + 1,
        run.global_iteration()
    );

    Ok(SccOutcome {
        colors: colors.into_boxed_slice(),
        sccs,
        rounds: run.round() + 1,
        iterations: run.global_iteration(),
        convergence,
        unconfirmed,
    })
}

/// Runs a single forward phase and returns the forward labels.
///
/// At the fixed point every vertex surviving trimming is labelled with the
/// minimum id of the vertices reaching it, whereas trimmed vertices keep
/// their own id. This is the only computation that can be performed with
/// the [reduced edge layout](crate::codec::REDUCED_EDGE_LAYOUT). As [`scc`],
/// it [resets](Engine::reset) the engine first.
pub fn forward_labels<E: Engine>(
    engine: &mut E,
    config: &SccConfig,
    pl: &mut impl ProgressLog,
) -> Result<ForwardOutcome> {
    engine.reset().context("Could not reset the engine")?;
    pl.item_name("update");
    pl.start("Propagating forward labels...");

    let mut run = RunContext::new();
    run.begin_phase(Phase::Forward);
    let outcome = engine
        .run_phase(&Forward, &mut run, config.max_iterations, pl)
        .context("Forward phase failed")?;
    pl.done();

    let labels = (0..engine.num_nodes())
        .map(|node| engine.vertex_value(node).map(|value| value.min_f))
        .collect::<Result<Vec<_>>>()?;

    Ok(ForwardOutcome {
        labels: labels.into_boxed_slice(),
        iterations: outcome.iterations,
        convergence: if outcome.converged {
            Convergence::Converged
        } else {
            Convergence::DidNotConverge
        },
    })
}

/// Returns the label of a node.
///
/// Engines guarantee that node ids are smaller than [`UNSET`].
#[inline(always)]
pub(crate) fn label(node: usize) -> i32 {
    debug_assert!(node < UNSET as usize);
    node as i32
}

/// Returns the number of live in-edges and live out-edges of a vertex.
pub(crate) fn live_degrees<V: VertexHandle>(vertex: &mut V) -> (usize, usize) {
    let mut live_in = 0;
    for i in 0..vertex.num_in_edges() {
        live_in += vertex.in_edge(i).value().is_live() as usize;
    }
    let mut live_out = 0;
    for i in 0..vertex.num_out_edges() {
        live_out += vertex.out_edge(i).value().is_live() as usize;
    }
    (live_in, live_out)
}

/// Tombstones all live edges of a vertex, scheduling their other endpoints
/// so that they can notice.
pub(crate) fn tombstone_all<V: VertexHandle, C: IterationContext>(vertex: &mut V, ctx: &C) {
    for i in 0..vertex.num_in_edges() {
        let mut in_edge = vertex.in_edge(i);
        let mut edge = in_edge.value();
        if edge.is_live() {
            edge.tombstone();
            in_edge.set_value(edge);
            ctx.schedule(in_edge.neighbor_id());
        }
    }
    for i in 0..vertex.num_out_edges() {
        let mut out_edge = vertex.out_edge(i);
        let mut edge = out_edge.value();
        if edge.is_live() {
            edge.tombstone();
            out_edge.set_value(edge);
            ctx.schedule(out_edge.neighbor_id());
        }
    }
}
