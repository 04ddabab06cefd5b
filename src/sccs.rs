/*
 * SPDX-FileCopyrightText: 2025 The fwbw-scc developers
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use rayon::{
    iter::{IntoParallelRefMutIterator, ParallelIterator},
    slice::ParallelSliceMut,
};
use std::collections::HashMap;

/// Strongly connected components.
///
/// An instance of this structure stores the [index of the
/// component](Sccs::components) of each node. Components are numbered from 0 to
/// [`num_components`](Sccs::num_components).
///
/// Moreover, this structure makes it possible to [sort the components by
/// size](Sccs::sort_by_size), possibly using [parallel
/// methods](Sccs::par_sort_by_size).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Sccs {
    num_components: usize,
    components: Box<[usize]>,
}

impl Sccs {
    pub fn new(num_components: usize, components: Box<[usize]>) -> Self {
        Sccs {
            num_components,
            components,
        }
    }

    /// Builds components from per-node colors.
    ///
    /// Nodes with the same color end up in the same component; components
    /// are numbered in order of first appearance of their color.
    pub fn from_colors(colors: &[i32]) -> Self {
        let mut index = HashMap::new();
        let components = colors
            .iter()
            .map(|color| {
                let next = index.len();
                *index.entry(*color).or_insert(next)
            })
            .collect::<Vec<_>>();
        Sccs::new(index.len(), components.into_boxed_slice())
    }

    /// Returns the number of strongly connected components.
    pub fn num_components(&self) -> usize {
        self.num_components
    }

    /// Returns a slice containing, for each node, the index of the component
    /// it belongs to.
    #[inline(always)]
    pub fn components(&self) -> &[usize] {
        &self.components
    }

    /// Returns the sizes of all components.
    pub fn compute_sizes(&self) -> Box<[usize]> {
        let mut sizes = vec![0; self.num_components()];
        for &node_component in self.components() {
            sizes[node_component] += 1;
        }
        sizes.into_boxed_slice()
    }

    /// Renumbers the components by decreasing size.
    ///
    /// After a call to this method, the sizes of strongly connected components
    /// will decreasing in the component index. The method returns the sizes of
    /// the components after the renumbering.
    pub fn sort_by_size(&mut self) -> Box<[usize]> {
        let mut sizes = self.compute_sizes();
        let mut sort_perm = Vec::from_iter(0..sizes.len());
        sort_perm.sort_by(|&x, &y| sizes[y].cmp(&sizes[x]));
        self.renumber(&sort_perm);
        sizes.sort_by(|&x, &y| y.cmp(&x));
        sizes
    }

    /// Renumbers the components by decreasing size using parallel methods.
    ///
    /// Ties are broken by component index, so the result is the same as that
    /// of [`sort_by_size`](Sccs::sort_by_size).
    pub fn par_sort_by_size(&mut self) -> Box<[usize]> {
        let mut sizes = self.compute_sizes();
        let mut sort_perm = Vec::from_iter(0..sizes.len());
        sort_perm.par_sort_by(|&x, &y| sizes[y].cmp(&sizes[x]));
        let mut inv_perm = vec![0; sizes.len()];
        sort_perm
            .iter()
            .enumerate()
            .for_each(|(i, &x)| inv_perm[x] = i);
        self.components
            .par_iter_mut()
            .for_each(|node_component| *node_component = inv_perm[*node_component]);
        sizes.par_sort_by(|&x, &y| y.cmp(&x));
        sizes
    }

    fn renumber(&mut self, sort_perm: &[usize]) {
        let mut inv_perm = vec![0; sort_perm.len()];
        sort_perm
            .iter()
            .enumerate()
            .for_each(|(i, &x)| inv_perm[x] = i);
        self.components
            .iter_mut()
            .for_each(|node_component| *node_component = inv_perm[*node_component]);
    }
}
