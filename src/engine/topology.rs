/*
 * SPDX-FileCopyrightText: 2025 The fwbw-scc developers
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use crate::record::UNSET;
use anyhow::{ensure, Result};

/// The immutable structure of a graph: out-adjacency and in-adjacency in
/// compressed sparse row form.
///
/// Arcs are numbered by their position in the list of arcs sorted by source
/// (and by target, for equal sources); the in-adjacency refers to the same
/// numbering, so both endpoints of an arc share its record.
/// Parallel arcs and loops are kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topology {
    out_offsets: Box<[usize]>,
    out_targets: Box<[usize]>,
    in_offsets: Box<[usize]>,
    in_sources: Box<[usize]>,
    in_arcs: Box<[usize]>,
}

impl Topology {
    /// Builds a topology from a list of arcs.
    ///
    /// Nodes must be smaller than `num_nodes`, and `num_nodes` must not
    /// exceed the number of ids representable as labels.
    pub fn from_arcs(
        num_nodes: usize,
        arcs: impl IntoIterator<Item = (usize, usize)>,
    ) -> Result<Self> {
        ensure!(
            num_nodes <= UNSET as usize,
            "{} nodes cannot be labelled with 32-bit ids",
            num_nodes
        );
        let mut arcs = arcs.into_iter().collect::<Vec<_>>();
        for &(x, y) in &arcs {
            ensure!(
                x < num_nodes && y < num_nodes,
                "Arc ({}, {}) out of range for {} nodes",
                x,
                y,
                num_nodes
            );
        }
        arcs.sort_unstable();

        let num_arcs = arcs.len();
        let mut out_offsets = vec![0; num_nodes + 1];
        let mut in_offsets = vec![0; num_nodes + 1];
        for &(x, y) in &arcs {
            out_offsets[x + 1] += 1;
            in_offsets[y + 1] += 1;
        }
        for node in 0..num_nodes {
            out_offsets[node + 1] += out_offsets[node];
            in_offsets[node + 1] += in_offsets[node];
        }

        let out_targets = arcs.iter().map(|&(_, y)| y).collect::<Vec<_>>();
        let mut in_sources = vec![0; num_arcs];
        let mut in_arcs = vec![0; num_arcs];
        let mut next = in_offsets.clone();
        for (arc, &(x, y)) in arcs.iter().enumerate() {
            in_sources[next[y]] = x;
            in_arcs[next[y]] = arc;
            next[y] += 1;
        }

        Ok(Self {
            out_offsets: out_offsets.into_boxed_slice(),
            out_targets: out_targets.into_boxed_slice(),
            in_offsets: in_offsets.into_boxed_slice(),
            in_sources: in_sources.into_boxed_slice(),
            in_arcs: in_arcs.into_boxed_slice(),
        })
    }

    #[inline(always)]
    pub fn num_nodes(&self) -> usize {
        self.out_offsets.len() - 1
    }

    #[inline(always)]
    pub fn num_arcs(&self) -> usize {
        self.out_targets.len()
    }

    #[inline(always)]
    pub fn outdegree(&self, node: usize) -> usize {
        self.out_offsets[node + 1] - self.out_offsets[node]
    }

    #[inline(always)]
    pub fn indegree(&self, node: usize) -> usize {
        self.in_offsets[node + 1] - self.in_offsets[node]
    }

    /// Returns the successors of a node.
    pub fn successors(&self, node: usize) -> &[usize] {
        &self.out_targets[self.out_offsets[node]..self.out_offsets[node + 1]]
    }

    /// Returns the predecessors of a node.
    pub fn predecessors(&self, node: usize) -> &[usize] {
        &self.in_sources[self.in_offsets[node]..self.in_offsets[node + 1]]
    }

    /// Returns the arcs leaving a node, as pairs of arc number and target.
    pub fn out_arcs(&self, node: usize) -> impl Iterator<Item = (usize, usize)> + '_ {
        (self.out_offsets[node]..self.out_offsets[node + 1])
            .zip(self.successors(node).iter().copied())
    }

    /// Returns the arcs entering a node, as pairs of arc number and source.
    pub fn in_arcs(&self, node: usize) -> impl Iterator<Item = (usize, usize)> + '_ {
        let range = self.in_offsets[node]..self.in_offsets[node + 1];
        self.in_arcs[range.clone()]
            .iter()
            .copied()
            .zip(self.in_sources[range].iter().copied())
    }

    /// Returns the source and target of an arc.
    pub fn arc(&self, arc: usize) -> (usize, usize) {
        // The source is the node whose out-range contains the arc
        let source = self.out_offsets.partition_point(|&offset| offset <= arc) - 1;
        (source, self.out_targets[arc])
    }
}
