/*
 * SPDX-FileCopyrightText: 2025 The fwbw-scc developers
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Per-vertex and per-edge algorithm state.

use crate::codec::{Field, Record};

/// The label of a vertex or edge that has not received one yet.
///
/// It is larger than any vertex id, so it is the identity of the minimum.
pub const UNSET: i32 = i32::MAX;

/// The state of a vertex.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VertexRecord {
    /// The vertex id; it is positional in storage.
    pub id: i32,
    /// The current component label.
    pub color: i32,
    /// Whether the component of the vertex is settled.
    pub confirmed: bool,
    /// The minimum label reached by forward propagation.
    pub min_f: i32,
    /// The minimum label reached by backward propagation.
    pub min_b: i32,
}

impl Default for VertexRecord {
    fn default() -> Self {
        Self {
            id: 0,
            color: 0,
            confirmed: false,
            min_f: UNSET,
            min_b: UNSET,
        }
    }
}

impl VertexRecord {
    /// Returns the state of a vertex at its first visit: colored and labelled
    /// by its id, unconfirmed.
    pub fn new(id: i32) -> Self {
        Self {
            id,
            color: id,
            confirmed: false,
            min_f: id,
            min_b: UNSET,
        }
    }

    /// Returns true if the forward label of the vertex is its own id.
    #[inline(always)]
    pub fn is_leader(&self) -> bool {
        self.min_f == self.id
    }
}

impl Record for VertexRecord {
    const NAME: &'static str = "vertex";

    fn supports(field: Field) -> bool {
        matches!(
            field,
            Field::Id | Field::Color | Field::Confirmed | Field::MinF | Field::MinB
        )
    }

    fn get(&self, field: Field) -> i32 {
        match field {
            Field::Id => self.id,
            Field::Color => self.color,
            Field::Confirmed => self.confirmed as i32,
            Field::MinF => self.min_f,
            Field::MinB => self.min_b,
            _ => unreachable!("{field} is not a vertex field"),
        }
    }

    fn set(&mut self, field: Field, value: i32) {
        match field {
            Field::Id => self.id = value,
            Field::Color => self.color = value,
            Field::Confirmed => self.confirmed = value != 0,
            Field::MinF => self.min_f = value,
            Field::MinB => self.min_b = value,
            _ => unreachable!("{field} is not a vertex field"),
        }
    }
}

/// Whether an edge still takes part in propagation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EdgeState {
    #[default]
    Live,
    /// Logically deleted: present in storage, skipped by every traversal.
    Tombstoned,
}

/// The state of an edge.
///
/// The labels of a tombstoned edge are meaningless and kept at [`UNSET`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EdgeRecord {
    /// The source of the edge.
    pub from: i32,
    /// The target of the edge.
    pub to: i32,
    /// The forward label, written by the source.
    pub min_f: i32,
    /// The backward label, written by the target.
    pub min_b: i32,
    /// Whether the edge is live. Use [`tombstone`](EdgeRecord::tombstone)
    /// rather than setting this field: the labels of a tombstoned edge must
    /// be [`UNSET`], and codecs do not store them.
    pub state: EdgeState,
}

impl Default for EdgeRecord {
    fn default() -> Self {
        Self::new(0, 0)
    }
}

impl EdgeRecord {
    /// Returns a live, unlabelled edge.
    pub fn new(from: i32, to: i32) -> Self {
        Self {
            from,
            to,
            min_f: UNSET,
            min_b: UNSET,
            state: EdgeState::Live,
        }
    }

    #[inline(always)]
    pub fn is_live(&self) -> bool {
        self.state == EdgeState::Live
    }

    /// Applies to `self` the write `value` that an endpoint derived from the
    /// snapshot `base`.
    ///
    /// `self` is the current content of the edge, possibly already modified
    /// by the other endpoint in the same iteration. Fields that the write
    /// did not change are left alone; a label changed by both endpoints
    /// takes the minimum of the two writes; a tombstone from either endpoint
    /// wins.
    pub fn merge(&mut self, base: &EdgeRecord, value: &EdgeRecord) {
        if !self.is_live() || !value.is_live() {
            self.tombstone();
            return;
        }
        let merge_label = |curr: &mut i32, base: i32, value: i32| {
            if value != base {
                *curr = if *curr != base {
                    (*curr).min(value)
                } else {
                    value
                };
            }
        };
        merge_label(&mut self.min_f, base.min_f, value.min_f);
        merge_label(&mut self.min_b, base.min_b, value.min_b);
    }
}

impl Record for EdgeRecord {
    const NAME: &'static str = "edge";

    fn supports(field: Field) -> bool {
        matches!(
            field,
            Field::MinF | Field::MinB | Field::From | Field::To | Field::State
        )
    }

    fn get(&self, field: Field) -> i32 {
        match field {
            Field::MinF => self.min_f,
            Field::MinB => self.min_b,
            Field::From => self.from,
            Field::To => self.to,
            Field::State => (self.state == EdgeState::Tombstoned) as i32,
            _ => unreachable!("{field} is not an edge field"),
        }
    }

    fn set(&mut self, field: Field, value: i32) {
        match field {
            Field::MinF => self.min_f = value,
            Field::MinB => self.min_b = value,
            Field::From => self.from = value,
            Field::To => self.to = value,
            Field::State => {
                self.state = if value != 0 {
                    EdgeState::Tombstoned
                } else {
                    EdgeState::Live
                };
            }
            _ => unreachable!("{field} is not an edge field"),
        }
    }

    fn is_tombstoned(&self) -> bool {
        self.state == EdgeState::Tombstoned
    }

    fn tombstone(&mut self) {
        self.state = EdgeState::Tombstoned;
        self.min_f = UNSET;
        self.min_b = UNSET;
    }
}
