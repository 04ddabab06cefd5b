/*
 * SPDX-FileCopyrightText: 2025 The fwbw-scc developers
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use crate::engine::Topology;
use anyhow::Result;
use rand::{rngs::SmallRng, Rng, SeedableRng};

/// Erdös-Rényi random graphs.
///
/// The Erdös-Rényi random graph model is parameterized by the number of
/// nodes `n` and the probability `p` of an arc between any two distinct
/// nodes. Loops are never included.
///
/// Generation takes time quadratic in `n`; the arcs are the same for the
/// same seed.
#[derive(Debug, Clone)]
pub struct ErdosRenyi {
    n: usize,
    p: f64,
    seed: u64,
}

impl ErdosRenyi {
    /// Creates a new Erdös-Rényi random graph, given the number of nodes,
    /// the probability of an arc between any two nodes, and a seed for the
    /// [pseudorandom number generator](SmallRng).
    pub fn new(n: usize, p: f64, seed: u64) -> Self {
        assert!((0.0..=1.0).contains(&p), "p must be in [0..1]");
        Self { n, p, seed }
    }

    pub fn num_nodes(&self) -> usize {
        self.n
    }

    /// Returns an iterator over the arcs of the graph, sorted by source and
    /// then by target.
    pub fn arcs(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let mut rng = SmallRng::seed_from_u64(self.seed);
        (0..self.n).flat_map(move |x| {
            (0..self.n)
                .filter(|&y| y != x && rng.random_bool(self.p))
                .map(|y| (x, y))
                .collect::<Vec<_>>()
        })
    }

    /// Builds the [topology](Topology) of the graph.
    pub fn topology(&self) -> Result<Topology> {
        Topology::from_arcs(self.n, self.arcs())
    }
}
