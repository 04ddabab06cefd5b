/*
 * SPDX-FileCopyrightText: 2025 The fwbw-scc developers
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

mod common;

use anyhow::Result;
use common::{MockContext, MockVertex};
use dsi_progress_logger::prelude::*;
use fwbw_scc::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};

#[test]
fn test_leader_seeds() {
    let mut vertex = MockVertex::new(2, &[0, 1], &[3]);
    let ctx = MockContext::new(Phase::Backward, 0);
    Backward.update(&mut vertex, &ctx);
    assert_eq!(
        vertex.value,
        VertexRecord {
            id: 2,
            color: 2,
            confirmed: true,
            min_f: 2,
            min_b: 2,
        }
    );
    assert!(vertex.out_edges[0].1.is_tombstoned());
    assert!(vertex
        .in_edges
        .iter()
        .all(|(_, edge)| edge.is_live() && edge.min_b == 2));
    assert_eq!(ctx.scheduled(), vec![0, 1]);
}

#[test]
fn test_leader_seeds_only_once() {
    let mut vertex = MockVertex::new(2, &[0], &[3]);
    let ctx = MockContext::new(Phase::Backward, 1);
    Backward.update(&mut vertex, &ctx);
    assert!(!vertex.value.confirmed);
    assert_eq!(vertex.set_value_calls, 0);
    assert!(ctx.scheduled().is_empty());
}

#[test]
fn test_member_confirmed() {
    let mut vertex = MockVertex::new(5, &[4, 9], &[6, 7, 8]);
    vertex.value.min_f = 1;
    vertex.value.color = 5;
    vertex.out_edges[0].1.min_b = 3;
    vertex.out_edges[1].1.min_b = 1;
    // A tombstoned in-edge does not receive the leader
    vertex.in_edges[1].1.tombstone();

    let ctx = MockContext::new(Phase::Backward, 2);
    Backward.update(&mut vertex, &ctx);
    assert!(vertex.value.confirmed);
    assert_eq!(vertex.value.color, 1);
    assert_eq!(vertex.value.min_b, 1);
    assert!(vertex.out_edges.iter().all(|(_, edge)| edge.is_tombstoned()));
    assert_eq!(vertex.in_edges[0].1.min_b, 1);
    assert_eq!(vertex.in_edges[1].1.min_b, UNSET);
    assert_eq!(ctx.scheduled(), vec![4]);
}

#[test]
fn test_several_matches_confirm_once() {
    let mut vertex = MockVertex::new(5, &[4], &[6, 7, 8]);
    vertex.value.min_f = 1;
    vertex.out_edges[0].1.min_b = 1;
    vertex.out_edges[1].1.min_b = 3;
    vertex.out_edges[2].1.min_b = 1;

    let ctx = MockContext::new(Phase::Backward, 2);
    Backward.update(&mut vertex, &ctx);
    assert_eq!(vertex.set_value_calls, 1);
    assert!(vertex.value.confirmed);
    assert_eq!(vertex.value.color, 1);
    assert!(vertex.out_edges.iter().all(|(_, edge)| edge.is_tombstoned()));
    assert_eq!(vertex.in_edges[0].1.min_b, 1);
    assert_eq!(ctx.scheduled(), vec![4]);

    // Confirmed now: a later visit writes nothing
    let ctx = MockContext::new(Phase::Backward, 3);
    Backward.update(&mut vertex, &ctx);
    assert_eq!(vertex.set_value_calls, 1);
    assert!(ctx.scheduled().is_empty());
}

#[test]
fn test_tombstoned_match_is_ignored() {
    let mut vertex = MockVertex::new(5, &[4], &[6]);
    vertex.value.min_f = 1;
    vertex.out_edges[0].1.min_b = 1;
    vertex.out_edges[0].1.state = EdgeState::Tombstoned;

    let ctx = MockContext::new(Phase::Backward, 1);
    Backward.update(&mut vertex, &ctx);
    assert!(!vertex.value.confirmed);
    assert!(vertex.in_edges[0].1.is_live());
    assert!(ctx.scheduled().is_empty());
}

#[test]
fn test_rejected_resets_color() {
    let mut vertex = MockVertex::new(5, &[4], &[6, 7]);
    vertex.value.min_f = 1;
    vertex.value.color = 1;
    vertex.out_edges[0].1.min_b = 0;
    let edges = (vertex.in_edges.clone(), vertex.out_edges.clone());

    let ctx = MockContext::new(Phase::Backward, 1);
    Backward.update(&mut vertex, &ctx);
    assert!(!vertex.value.confirmed);
    assert_eq!(vertex.value.color, 5);
    assert_eq!(vertex.value.min_f, 1);
    assert_eq!((vertex.in_edges.clone(), vertex.out_edges.clone()), edges);
    assert!(ctx.scheduled().is_empty());

    // Already reset: no write
    let calls = vertex.set_value_calls;
    Backward.update(&mut vertex, &ctx);
    assert_eq!(vertex.set_value_calls, calls);
}

#[test]
fn test_confirmed_is_skipped() {
    let mut vertex = MockVertex::new(3, &[1], &[2]);
    vertex.value = VertexRecord {
        id: 3,
        color: 3,
        confirmed: true,
        min_f: 3,
        min_b: UNSET,
    };
    let before = vertex.clone();
    let ctx = MockContext::new(Phase::Backward, 0);
    Backward.update(&mut vertex, &ctx);
    assert_eq!(vertex.value, before.value);
    assert_eq!(vertex.in_edges, before.in_edges);
    assert_eq!(vertex.out_edges, before.out_edges);
    assert!(ctx.scheduled().is_empty());
}

#[test]
fn test_isolated_leader_is_skipped() {
    let mut vertex = MockVertex::new(7, &[], &[]);
    let ctx = MockContext::new(Phase::Backward, 0);
    Backward.update(&mut vertex, &ctx);
    assert!(!vertex.value.confirmed);
    assert_eq!(vertex.value.color, 7);
}

/// Counts updates that increase the backward label of a vertex.
struct Monotone<P> {
    program: P,
    violations: AtomicUsize,
}

impl<P: VertexProgram> VertexProgram for Monotone<P> {
    fn update<V: VertexHandle, C: IterationContext>(&self, vertex: &mut V, ctx: &C) {
        let before = vertex.value();
        self.program.update(vertex, ctx);
        if vertex.value().min_b > before.min_b {
            self.violations.fetch_add(1, Ordering::Relaxed);
        }
    }
}

#[test]
fn test_monotone_backward_labels() -> Result<()> {
    for seed in 0..5 {
        let topology = ErdosRenyi::new(60, 0.04, seed).topology()?;
        let mut engine = InMemoryEngine::new(topology, EngineConfig::default().granularity(8))?;
        let program = Monotone {
            program: Backward,
            violations: AtomicUsize::new(0),
        };
        let mut run = RunContext::new();
        // A few rounds, driven by hand
        for _ in 0..3 {
            run.begin_phase(Phase::Forward);
            assert!(engine.run_phase(&Forward, &mut run, 1000, no_logging![])?.converged);
            run.begin_phase(Phase::Backward);
            assert!(engine.run_phase(&program, &mut run, 1000, no_logging![])?.converged);
        }
        assert_eq!(program.violations.load(Ordering::Relaxed), 0);
        assert_eq!(run.round(), 2);
    }
    Ok(())
}

#[test]
fn test_backward_confirms_cycle() -> Result<()> {
    // 0 -> 1 -> 2 -> 0, 2 -> 3 -> 4 -> 3
    let topology = Topology::from_arcs(5, [(0, 1), (1, 2), (2, 0), (2, 3), (3, 4), (4, 3)])?;
    let mut engine = InMemoryEngine::new(topology, EngineConfig::default())?;
    let mut run = RunContext::new();
    run.begin_phase(Phase::Forward);
    engine.run_phase(&Forward, &mut run, 100, no_logging![])?;
    for node in 0..5 {
        assert_eq!(engine.vertex_value(node)?.min_f, 0);
    }

    run.begin_phase(Phase::Backward);
    let outcome = engine.run_phase(&Backward, &mut run, 100, no_logging![])?;
    assert!(outcome.converged);
    for node in 0..3 {
        let value = engine.vertex_value(node)?;
        assert!(value.confirmed);
        assert_eq!(value.color, 0);
    }
    // 3 and 4 reach no leader with their label
    for node in 3..5 {
        let value = engine.vertex_value(node)?;
        assert!(!value.confirmed);
        assert_eq!(value.color, node as i32);
    }
    // The cross arc is gone, the residual cycle is alive
    assert!(engine.edge_value(3)?.is_tombstoned());
    assert!(engine.edge_value(4)?.is_live());
    assert!(engine.edge_value(5)?.is_live());
    Ok(())
}
