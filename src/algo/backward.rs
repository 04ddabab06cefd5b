/*
 * SPDX-FileCopyrightText: 2025 The fwbw-scc developers
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use super::label;
use crate::codec::Record;
use crate::record::VertexRecord;
use crate::traits::{EdgeHandle, IterationContext, VertexHandle, VertexProgram};

/// Backward propagation from the leaders of the forward phase.
///
/// A leader is a vertex whose forward label is its own id. At the first
/// iteration of the phase every unconfirmed leader confirms itself and
/// writes its id on its live in-edges. A vertex whose forward label is `L`
/// and that finds `L` on one of its live out-edges reaches the leader `L`
/// and is reached from it: it is confirmed as a member of the component
/// of `L` and keeps propagating `L` backwards.
///
/// On confirmation, all live out-edges are tombstoned. Vertices that find
/// no match keep their own id as color and are left for the next round.
/// Vertices without edges are ignored.
#[derive(Debug, Clone, Copy, Default)]
pub struct Backward;

impl VertexProgram for Backward {
    fn update<V: VertexHandle, C: IterationContext>(&self, vertex: &mut V, ctx: &C) {
        let mut value = vertex.value();
        // Vertices without edges are never confirmed
        if value.confirmed || vertex.num_edges() == 0 {
            return;
        }
        let id = label(vertex.id());

        if value.min_f == id {
            if ctx.current_iteration() == 0 {
                confirm(vertex, ctx, &mut value, id);
            }
            return;
        }

        // First match wins
        let mut matched = None;
        for i in 0..vertex.num_out_edges() {
            let edge = vertex.out_edge(i).value();
            if edge.is_live() && edge.min_b == value.min_f {
                matched = Some(edge.min_b);
                break;
            }
        }

        match matched {
            Some(leader) => confirm(vertex, ctx, &mut value, leader),
            None => {
                if value.color != id {
                    value.color = id;
                    vertex.set_value(value);
                }
            }
        }
    }
}

/// Confirms a vertex as a member of the component of `leader`, tombstones
/// its out-edges and propagates the leader on its in-edges.
fn confirm<V: VertexHandle, C: IterationContext>(
    vertex: &mut V,
    ctx: &C,
    value: &mut VertexRecord,
    leader: i32,
) {
    debug_assert!(leader <= value.min_b);
    value.min_b = leader;
    value.color = leader;
    value.confirmed = true;
    vertex.set_value(*value);

    for i in 0..vertex.num_out_edges() {
        let mut out_edge = vertex.out_edge(i);
        let mut edge = out_edge.value();
        if edge.is_live() {
            edge.tombstone();
            out_edge.set_value(edge);
        }
    }
    for i in 0..vertex.num_in_edges() {
        let mut in_edge = vertex.in_edge(i);
        let mut edge = in_edge.value();
        if edge.is_live() {
            edge.min_b = leader;
            in_edge.set_value(edge);
            ctx.schedule(in_edge.neighbor_id());
        }
    }
}
