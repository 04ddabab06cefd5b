/*
 * SPDX-FileCopyrightText: 2025 The fwbw-scc developers
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

#![allow(dead_code)]

use fwbw_scc::prelude::*;
use std::cell::RefCell;
use std::collections::BTreeSet;

/// A vertex detached from any engine, for testing single updates.
#[derive(Debug, Clone)]
pub struct MockVertex {
    pub id: usize,
    pub value: VertexRecord,
    /// Pairs of source and record.
    pub in_edges: Vec<(usize, EdgeRecord)>,
    /// Pairs of target and record.
    pub out_edges: Vec<(usize, EdgeRecord)>,
    pub set_value_calls: usize,
}

impl MockVertex {
    pub fn new(id: usize, sources: &[usize], targets: &[usize]) -> Self {
        Self {
            id,
            value: VertexRecord::new(id as i32),
            in_edges: sources
                .iter()
                .map(|&s| (s, EdgeRecord::new(s as i32, id as i32)))
                .collect(),
            out_edges: targets
                .iter()
                .map(|&t| (t, EdgeRecord::new(id as i32, t as i32)))
                .collect(),
            set_value_calls: 0,
        }
    }

    pub fn edges(&self) -> impl Iterator<Item = &EdgeRecord> {
        self.in_edges
            .iter()
            .chain(self.out_edges.iter())
            .map(|(_, edge)| edge)
    }
}

pub struct MockEdge<'a> {
    neighbor: usize,
    value: &'a mut EdgeRecord,
}

impl EdgeHandle for MockEdge<'_> {
    fn neighbor_id(&self) -> usize {
        self.neighbor
    }

    fn value(&self) -> EdgeRecord {
        *self.value
    }

    fn set_value(&mut self, value: EdgeRecord) {
        *self.value = value;
    }
}

impl VertexHandle for MockVertex {
    type Edge<'a>
        = MockEdge<'a>
    where
        Self: 'a;

    fn id(&self) -> usize {
        self.id
    }

    fn value(&self) -> VertexRecord {
        self.value
    }

    fn set_value(&mut self, value: VertexRecord) {
        self.set_value_calls += 1;
        self.value = value;
    }

    fn num_in_edges(&self) -> usize {
        self.in_edges.len()
    }

    fn num_out_edges(&self) -> usize {
        self.out_edges.len()
    }

    fn in_edge(&mut self, i: usize) -> MockEdge<'_> {
        let (neighbor, value) = &mut self.in_edges[i];
        MockEdge {
            neighbor: *neighbor,
            value,
        }
    }

    fn out_edge(&mut self, i: usize) -> MockEdge<'_> {
        let (neighbor, value) = &mut self.out_edges[i];
        MockEdge {
            neighbor: *neighbor,
            value,
        }
    }
}

/// An iteration context recording scheduled vertices.
pub struct MockContext {
    pub run: RunContext,
    pub scheduled: RefCell<BTreeSet<usize>>,
}

impl MockContext {
    /// Returns the context of the first iteration of a run.
    pub fn first() -> Self {
        let mut run = RunContext::new();
        run.begin_phase(Phase::Forward);
        Self {
            run,
            scheduled: RefCell::new(BTreeSet::new()),
        }
    }

    /// Returns the context of the given iteration of a phase, in a round
    /// after the first.
    pub fn new(phase: Phase, iteration: usize) -> Self {
        let mut run = RunContext::new();
        run.begin_phase(Phase::Forward);
        run.advance();
        run.begin_phase(Phase::Backward);
        run.advance();
        run.begin_phase(phase);
        for _ in 0..iteration {
            run.advance();
        }
        Self {
            run,
            scheduled: RefCell::new(BTreeSet::new()),
        }
    }

    pub fn scheduled(&self) -> Vec<usize> {
        self.scheduled.borrow().iter().copied().collect()
    }
}

impl IterationContext for MockContext {
    fn current_iteration(&self) -> usize {
        self.run.iteration()
    }

    fn schedule(&self, node: usize) {
        self.scheduled.borrow_mut().insert(node);
    }

    fn run(&self) -> &RunContext {
        &self.run
    }
}

/// Sequential Tarjan's algorithm.
///
/// Returns the component of each node, as an `i32` color.
pub fn tarjan(topology: &Topology) -> Vec<i32> {
    struct State<'a> {
        topology: &'a Topology,
        index: Vec<Option<usize>>,
        low_link: Vec<usize>,
        on_stack: Vec<bool>,
        stack: Vec<usize>,
        next_index: usize,
        components: Vec<i32>,
        num_components: i32,
    }

    fn visit(state: &mut State, node: usize) {
        state.index[node] = Some(state.next_index);
        state.low_link[node] = state.next_index;
        state.next_index += 1;
        state.stack.push(node);
        state.on_stack[node] = true;

        for &succ in state.topology.successors(node) {
            match state.index[succ] {
                None => {
                    visit(state, succ);
                    state.low_link[node] = state.low_link[node].min(state.low_link[succ]);
                }
                Some(index) if state.on_stack[succ] => {
                    state.low_link[node] = state.low_link[node].min(index);
                }
                _ => {}
            }
        }

        if Some(state.low_link[node]) == state.index[node] {
            while let Some(member) = state.stack.pop() {
                state.on_stack[member] = false;
                state.components[member] = state.num_components;
                if member == node {
                    break;
                }
            }
            state.num_components += 1;
        }
    }

    let n = topology.num_nodes();
    let mut state = State {
        topology,
        index: vec![None; n],
        low_link: vec![0; n],
        on_stack: vec![false; n],
        stack: vec![],
        next_index: 0,
        components: vec![0; n],
        num_components: 0,
    };
    for node in 0..n {
        if state.index[node].is_none() {
            visit(&mut state, node);
        }
    }
    state.components
}
