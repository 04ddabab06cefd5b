/*
 * SPDX-FileCopyrightText: 2025 The fwbw-scc developers
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! The contract between the propagation programs and the host engine.
//!
//! A host engine stores the [records](crate::record) of a graph and
//! repeatedly invokes the [update](VertexProgram::update) method of a
//! [program](VertexProgram) on the vertices that are scheduled for the
//! current iteration, giving it access to the vertex through a
//! [`VertexHandle`] and to the iteration through an [`IterationContext`].
//!
//! Engines must guarantee that:
//! - every vertex is visited at the first iteration of a phase; later
//!   iterations visit only the vertices scheduled during the previous one;
//! - the update of a vertex is never concurrent with another update of the
//!   same vertex;
//! - writes to the records of a vertex and of its edges become visible to
//!   the other endpoint of an edge only from its next visit;
//! - scheduling is idempotent;
//! - a phase ends when an iteration schedules no vertex.
//!
//! Updates of different vertices in the same iteration may happen in any
//! order, possibly in parallel.

use crate::algo::RunContext;
use crate::codec::Codec;
use crate::record::{EdgeRecord, VertexRecord};
use anyhow::Result;
use dsi_progress_logger::ProgressLog;

/// Access to an edge from one of its endpoints.
pub trait EdgeHandle {
    /// Returns the other endpoint of the edge.
    fn neighbor_id(&self) -> usize;
    /// Returns the record of the edge, as persisted at the end of the
    /// previous iteration (or as modified by this update).
    fn value(&self) -> EdgeRecord;
    fn set_value(&mut self, value: EdgeRecord);
}

/// Access to a scheduled vertex and to its incident edges.
///
/// Edge counts include tombstoned edges.
pub trait VertexHandle {
    type Edge<'a>: EdgeHandle
    where
        Self: 'a;

    fn id(&self) -> usize;
    fn value(&self) -> VertexRecord;
    fn set_value(&mut self, value: VertexRecord);
    fn num_in_edges(&self) -> usize;
    fn num_out_edges(&self) -> usize;
    fn num_edges(&self) -> usize {
        self.num_in_edges() + self.num_out_edges()
    }
    fn in_edge(&mut self, i: usize) -> Self::Edge<'_>;
    fn out_edge(&mut self, i: usize) -> Self::Edge<'_>;
}

/// The iteration in which an update takes place.
pub trait IterationContext {
    /// Returns the index of the current iteration within the current phase.
    fn current_iteration(&self) -> usize;
    /// Schedules a vertex for the next iteration.
    fn schedule(&self, node: usize);
    /// Returns the context of the whole run.
    fn run(&self) -> &RunContext;
}

/// A vertex-centric program.
pub trait VertexProgram: Sync {
    /// Updates a scheduled vertex.
    fn update<V: VertexHandle, C: IterationContext>(&self, vertex: &mut V, ctx: &C);
}

/// The result of running a phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseOutcome {
    /// The number of iterations performed.
    pub iterations: usize,
    /// The number of vertex updates performed.
    pub updates: usize,
    /// Whether the phase reached a fixed point.
    pub converged: bool,
}

/// A host engine.
pub trait Engine {
    /// Returns the number of vertices.
    fn num_nodes(&self) -> usize;

    /// Restores every vertex and edge record to its initial state: vertices
    /// colored and labelled by their id, edges live and unlabelled.
    fn reset(&mut self) -> Result<()>;

    /// Returns the codec used to persist edge records.
    fn edge_codec(&self) -> &Codec<EdgeRecord>;

    /// Runs a phase of a program until no vertex is scheduled, or until
    /// `max_iterations` iterations have been performed.
    ///
    /// The engine [advances](RunContext::advance) the run context after each
    /// iteration, and updates the progress logger with the number of vertex
    /// updates of each iteration.
    fn run_phase<P: VertexProgram>(
        &mut self,
        program: &P,
        run: &mut RunContext,
        max_iterations: usize,
        pl: &mut impl ProgressLog,
    ) -> Result<PhaseOutcome>;

    /// Loads the persisted record of a vertex.
    fn vertex_value(&self, node: usize) -> Result<VertexRecord>;
}
