/*
 * SPDX-FileCopyrightText: 2025 The fwbw-scc developers
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! An in-memory, bulk-synchronous host engine.
//!
//! [`InMemoryEngine`] keeps the records of all vertices and edges as raw
//! bytes in two contiguous stores, and moves them in and out of the stores
//! only through [codecs](crate::codec::Codec). Identity fields that are not
//! part of a layout (the vertex id, the endpoints of an edge) are restored
//! from the [topology](Topology) when a record is loaded.
//!
//! The updates of an iteration run in parallel on a dedicated thread pool.
//! They all read the stores as persisted at the end of the previous
//! iteration, and their writes are persisted only after all of them have
//! completed, so a write to an edge is seen by its other endpoint at its
//! next visit. If both endpoints write the same edge in the same iteration
//! the writes are [merged](crate::record::EdgeRecord::merge).

mod topology;
pub use topology::Topology;

use crate::algo::RunContext;
use crate::codec::{Codec, CodecError, Field, Record, EDGE_LAYOUT, VERTEX_LAYOUT};
use crate::record::{EdgeRecord, VertexRecord};
use crate::traits::{
    EdgeHandle, Engine, IterationContext, PhaseOutcome, VertexHandle, VertexProgram,
};
use anyhow::{ensure, Context, Result};
use dsi_progress_logger::ProgressLog;
use log::debug;
use rayon::prelude::*;
use std::sync::atomic::{AtomicBool, Ordering};

/// Configuration of an [`InMemoryEngine`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// The layout of vertex records.
    pub vertex_fields: Vec<Field>,
    /// The layout of edge records.
    pub edge_fields: Vec<Field>,
    /// The number of threads; if `None`, [`num_cpus::get`].
    pub num_threads: Option<usize>,
    /// The minimum number of vertex updates assigned to a parallel task.
    pub granularity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            vertex_fields: VERTEX_LAYOUT.to_vec(),
            edge_fields: EDGE_LAYOUT.to_vec(),
            num_threads: None,
            granularity: 1024,
        }
    }
}

impl EngineConfig {
    pub fn vertex_layout(mut self, fields: &[Field]) -> Self {
        self.vertex_fields = fields.to_vec();
        self
    }

    pub fn edge_layout(mut self, fields: &[Field]) -> Self {
        self.edge_fields = fields.to_vec();
        self
    }

    pub fn num_threads(mut self, num_threads: Option<usize>) -> Self {
        self.num_threads = num_threads;
        self
    }

    pub fn granularity(mut self, granularity: usize) -> Self {
        self.granularity = granularity;
        self
    }
}

/// An in-memory host engine.
///
/// # Examples
///
/// ```
/// use fwbw_scc::prelude::*;
///
/// let topology = Topology::from_arcs(3, [(0, 1), (1, 0), (1, 2)])?;
/// let engine = InMemoryEngine::new(topology, EngineConfig::default().num_threads(Some(2)))?;
/// assert_eq!(engine.num_nodes(), 3);
/// assert_eq!(engine.vertex_value(2)?, VertexRecord::new(2));
/// assert!(engine.edge_value(2)?.is_live());
/// # Ok::<(), anyhow::Error>(())
/// ```
pub struct InMemoryEngine {
    topology: Topology,
    vertex_codec: Codec<VertexRecord>,
    edge_codec: Codec<EdgeRecord>,
    vertices: Box<[u8]>,
    edges: Box<[u8]>,
    thread_pool: rayon::ThreadPool,
    granularity: usize,
}

impl std::fmt::Debug for InMemoryEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryEngine")
            .field("num_nodes", &self.topology.num_nodes())
            .field("num_arcs", &self.topology.num_arcs())
            .field("vertex_layout", &self.vertex_codec.fields())
            .field("edge_layout", &self.edge_codec.fields())
            .field("num_threads", &self.thread_pool.current_num_threads())
            .finish()
    }
}

impl InMemoryEngine {
    /// Creates an engine storing the given topology.
    ///
    /// The stores are initialized as by [`reset`](Engine::reset).
    pub fn new(topology: Topology, config: EngineConfig) -> Result<Self> {
        let vertex_codec = Codec::<VertexRecord>::new(&config.vertex_fields)
            .context("Invalid vertex layout")?;
        let edge_codec =
            Codec::<EdgeRecord>::new(&config.edge_fields).context("Invalid edge layout")?;
        for field in [Field::Color, Field::Confirmed, Field::MinF] {
            ensure!(
                vertex_codec.contains(field),
                "The vertex layout must store field '{}'",
                field
            );
        }
        ensure!(
            edge_codec.contains(Field::MinF),
            "The edge layout must store field '{}'",
            Field::MinF
        );

        let num_threads = config.num_threads.unwrap_or_else(num_cpus::get);
        let thread_pool = rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .build()
            .context("Could not create thread pool")?;

        let vertices = vec![0; topology.num_nodes() * vertex_codec.record_size()];
        let edges = vec![0; topology.num_arcs() * edge_codec.record_size()];
        let mut engine = Self {
            topology,
            vertex_codec,
            edge_codec,
            vertices: vertices.into_boxed_slice(),
            edges: edges.into_boxed_slice(),
            thread_pool,
            granularity: config.granularity.max(1),
        };
        engine.reset()?;

        debug!(
            "Stored {} vertex records of {} bytes and {} edge records of {} bytes",
            engine.topology.num_nodes(),
            engine.vertex_codec.record_size(),
            engine.topology.num_arcs(),
            engine.edge_codec.record_size()
        );
        Ok(engine)
    }

    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    /// Loads the persisted record of an arc.
    pub fn edge_value(&self, arc: usize) -> Result<EdgeRecord> {
        ensure!(
            arc < self.topology.num_arcs(),
            "Arc {} out of range for {} arcs",
            arc,
            self.topology.num_arcs()
        );
        let (from, to) = self.topology.arc(arc);
        Ok(self.load_edge(arc, from, to)?)
    }

    fn load_vertex(&self, node: usize) -> Result<VertexRecord, CodecError> {
        let size = self.vertex_codec.record_size();
        let mut value = self
            .vertex_codec
            .decode(&self.vertices[node * size..(node + 1) * size])?;
        value.id = node as i32;
        Ok(value)
    }

    fn load_edge(&self, arc: usize, from: usize, to: usize) -> Result<EdgeRecord, CodecError> {
        let size = self.edge_codec.record_size();
        let mut value = self
            .edge_codec
            .decode(&self.edges[arc * size..(arc + 1) * size])?;
        value.from = from as i32;
        value.to = to as i32;
        Ok(value)
    }

    /// Loads a vertex and its edges, runs the update, and returns the
    /// writes it performed.
    fn visit<P: VertexProgram>(
        &self,
        node: usize,
        program: &P,
        ctx: &Iteration<'_>,
    ) -> Result<Writes, CodecError> {
        let base = self.load_vertex(node)?;
        let mut in_edges = Vec::with_capacity(self.topology.indegree(node));
        for (arc, source) in self.topology.in_arcs(node) {
            in_edges.push(EdgeSlot::new(arc, source, self.load_edge(arc, source, node)?));
        }
        let mut out_edges = Vec::with_capacity(self.topology.outdegree(node));
        for (arc, target) in self.topology.out_arcs(node) {
            out_edges.push(EdgeSlot::new(arc, target, self.load_edge(arc, node, target)?));
        }

        let mut vertex = LocalVertex {
            id: node,
            base,
            value: base,
            in_edges,
            out_edges,
        };
        program.update(&mut vertex, ctx);

        Ok(Writes {
            node,
            vertex: (vertex.value != vertex.base).then_some(vertex.value),
            edges: vertex
                .in_edges
                .into_iter()
                .chain(vertex.out_edges)
                .filter(|slot| slot.value != slot.base)
                .collect(),
        })
    }

    /// Persists the writes of an iteration.
    fn persist(&mut self, writes: Vec<Writes>) -> Result<(), CodecError> {
        let vertex_size = self.vertex_codec.record_size();
        let edge_size = self.edge_codec.record_size();
        for write in writes {
            if let Some(value) = write.vertex {
                let node = write.node;
                self.vertex_codec.encode(
                    &mut self.vertices[node * vertex_size..(node + 1) * vertex_size],
                    &value,
                )?;
            }
            for slot in write.edges {
                let buffer = &mut self.edges[slot.arc * edge_size..(slot.arc + 1) * edge_size];
                let mut curr = self.edge_codec.decode(buffer)?;
                curr.from = slot.base.from;
                curr.to = slot.base.to;
                curr.merge(&slot.base, &slot.value);
                self.edge_codec.encode(buffer, &curr)?;
            }
        }
        Ok(())
    }
}

impl Engine for InMemoryEngine {
    fn num_nodes(&self) -> usize {
        self.topology.num_nodes()
    }

    fn reset(&mut self) -> Result<()> {
        let vertex_size = self.vertex_codec.record_size();
        for (node, buffer) in self.vertices.chunks_exact_mut(vertex_size).enumerate() {
            self.vertex_codec.encode(buffer, &VertexRecord::new(node as i32))?;
        }

        let edge_size = self.edge_codec.record_size();
        for node in 0..self.topology.num_nodes() {
            for (arc, target) in self.topology.out_arcs(node) {
                self.edge_codec.encode(
                    &mut self.edges[arc * edge_size..(arc + 1) * edge_size],
                    &EdgeRecord::new(node as i32, target as i32),
                )?;
            }
        }
        Ok(())
    }

    fn edge_codec(&self) -> &Codec<EdgeRecord> {
        &self.edge_codec
    }

    fn run_phase<P: VertexProgram>(
        &mut self,
        program: &P,
        run: &mut RunContext,
        max_iterations: usize,
        pl: &mut impl ProgressLog,
    ) -> Result<PhaseOutcome> {
        let num_nodes = self.num_nodes();
        let mut scheduled = Vec::with_capacity(num_nodes);
        scheduled.extend((0..num_nodes).map(|_| AtomicBool::new(false)));

        // Every vertex is visited at the first iteration
        let mut frontier = (0..num_nodes).collect::<Vec<_>>();
        let mut iterations = 0;
        let mut updates = 0;

        while !frontier.is_empty() {
            if iterations == max_iterations {
                debug!(
                    "{} phase stopped at iteration {} with {} scheduled vertices",
                    run.phase(),
                    run.iteration(),
                    frontier.len()
                );
                return Ok(PhaseOutcome {
                    iterations,
                    updates,
                    converged: false,
                });
            }
            debug!(
                "{} phase, iteration {}: {} scheduled vertices",
                run.phase(),
                run.iteration(),
                frontier.len()
            );

            let ctx = Iteration {
                run,
                scheduled: &scheduled,
            };
            let granularity = self.granularity;
            let writes = self
                .thread_pool
                .install(|| {
                    frontier
                        .par_iter()
                        .with_min_len(granularity)
                        .map(|&node| self.visit(node, program, &ctx))
                        .collect::<Result<Vec<_>, _>>()
                })
                .with_context(|| {
                    format!("Could not load records at iteration {}", run.iteration())
                })?;
            self.persist(writes).with_context(|| {
                format!("Could not persist records at iteration {}", run.iteration())
            })?;

            updates += frontier.len();
            pl.update_with_count(frontier.len());

            frontier = self.thread_pool.install(|| {
                (0..num_nodes)
                    .into_par_iter()
                    .with_min_len(granularity)
                    .filter(|&node| scheduled[node].swap(false, Ordering::Relaxed))
                    .collect()
            });
            iterations += 1;
            run.advance();
        }

        Ok(PhaseOutcome {
            iterations,
            updates,
            converged: true,
        })
    }

    fn vertex_value(&self, node: usize) -> Result<VertexRecord> {
        ensure!(
            node < self.num_nodes(),
            "Node {} out of range for {} nodes",
            node,
            self.num_nodes()
        );
        Ok(self.load_vertex(node)?)
    }
}

/// The writes of an update.
struct Writes {
    node: usize,
    vertex: Option<VertexRecord>,
    edges: Vec<EdgeSlot>,
}

/// The snapshot and the current value of an edge, as seen by one endpoint.
struct EdgeSlot {
    arc: usize,
    neighbor: usize,
    base: EdgeRecord,
    value: EdgeRecord,
}

impl EdgeSlot {
    fn new(arc: usize, neighbor: usize, base: EdgeRecord) -> Self {
        Self {
            arc,
            neighbor,
            base,
            value: base,
        }
    }
}

struct LocalEdge<'a>(&'a mut EdgeSlot);

impl EdgeHandle for LocalEdge<'_> {
    #[inline(always)]
    fn neighbor_id(&self) -> usize {
        self.0.neighbor
    }

    #[inline(always)]
    fn value(&self) -> EdgeRecord {
        self.0.value
    }

    #[inline(always)]
    fn set_value(&mut self, value: EdgeRecord) {
        debug_assert!(
            self.0.value.is_live() || value.is_tombstoned(),
            "Tombstoned arc {} cannot be revived",
            self.0.arc
        );
        self.0.value = value;
    }
}

struct LocalVertex {
    id: usize,
    base: VertexRecord,
    value: VertexRecord,
    in_edges: Vec<EdgeSlot>,
    out_edges: Vec<EdgeSlot>,
}

impl VertexHandle for LocalVertex {
    type Edge<'a>
        = LocalEdge<'a>
    where
        Self: 'a;

    #[inline(always)]
    fn id(&self) -> usize {
        self.id
    }

    #[inline(always)]
    fn value(&self) -> VertexRecord {
        self.value
    }

    #[inline(always)]
    fn set_value(&mut self, value: VertexRecord) {
        debug_assert!(
            !self.base.confirmed || value == self.base,
            "Confirmed vertex {} cannot be mutated",
            self.id
        );
        self.value = value;
    }

    #[inline(always)]
    fn num_in_edges(&self) -> usize {
        self.in_edges.len()
    }

    #[inline(always)]
    fn num_out_edges(&self) -> usize {
        self.out_edges.len()
    }

    #[inline(always)]
    fn in_edge(&mut self, i: usize) -> LocalEdge<'_> {
        LocalEdge(&mut self.in_edges[i])
    }

    #[inline(always)]
    fn out_edge(&mut self, i: usize) -> LocalEdge<'_> {
        LocalEdge(&mut self.out_edges[i])
    }
}

struct Iteration<'a> {
    run: &'a RunContext,
    scheduled: &'a [AtomicBool],
}

impl IterationContext for Iteration<'_> {
    #[inline(always)]
    fn current_iteration(&self) -> usize {
        self.run.iteration()
    }

    #[inline(always)]
    fn schedule(&self, node: usize) {
        self.scheduled[node].store(true, Ordering::Relaxed);
    }

    #[inline(always)]
    fn run(&self) -> &RunContext {
        self.run
    }
}
