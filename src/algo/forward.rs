/*
 * SPDX-FileCopyrightText: 2025 The fwbw-scc developers
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use super::{label, live_degrees, tombstone_all};
use crate::record::{VertexRecord, UNSET};
use crate::traits::{EdgeHandle, IterationContext, VertexHandle, VertexProgram};

/// Forward propagation of minimum labels.
///
/// At the first iteration of the phase every surviving vertex takes its own
/// id as label; at later iterations it takes the minimum between its label
/// and the labels on its live in-edges. Whenever the label of a vertex
/// changes, it is written on its live out-edges and their targets are
/// scheduled. At the fixed point the label of a vertex is the minimum id of
/// the vertices that reach it.
///
/// Vertices whose live in-degree or live out-degree is zero cannot lie on a
/// cycle: they are trimmed, that is, confirmed as singleton components (if
/// they have edges at all), and all their edges are tombstoned.
#[derive(Debug, Clone, Copy, Default)]
pub struct Forward;

impl VertexProgram for Forward {
    fn update<V: VertexHandle, C: IterationContext>(&self, vertex: &mut V, ctx: &C) {
        let id = label(vertex.id());
        let mut value = if ctx.run().is_first_global_iteration() {
            let value = VertexRecord::new(id);
            vertex.set_value(value);
            value
        } else {
            vertex.value()
        };

        if value.confirmed {
            tombstone_all(vertex, ctx);
            return;
        }

        let (live_in, live_out) = live_degrees(vertex);
        if live_in == 0 || live_out == 0 {
            if vertex.num_edges() > 0 {
                value.confirmed = true;
                value.color = id;
                vertex.set_value(value);
            }
            tombstone_all(vertex, ctx);
            return;
        }

        ctx.run().mark_remaining_work();

        let propagate = if ctx.current_iteration() == 0 {
            value.color = id;
            value.min_f = id;
            value.min_b = UNSET;
            true
        } else {
            let mut min = value.min_f;
            for i in 0..vertex.num_in_edges() {
                let edge = vertex.in_edge(i).value();
                if edge.is_live() {
                    min = min.min(edge.min_f);
                }
            }
            if min < value.min_f {
                value.min_f = min;
                true
            } else {
                false
            }
        };

        if propagate {
            vertex.set_value(value);
            for i in 0..vertex.num_out_edges() {
                let mut out_edge = vertex.out_edge(i);
                let mut edge = out_edge.value();
                if edge.is_live() {
                    edge.min_f = value.min_f;
                    out_edge.set_value(edge);
                    ctx.schedule(out_edge.neighbor_id());
                }
            }
        }
    }
}
