/*
 * SPDX-FileCopyrightText: 2025 The fwbw-scc developers
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Fixed-width binary encoding of vertex and edge records.
//!
//! A record crosses the persistence boundary of the host engine only through
//! a [`Codec`]. A codec is parameterized by a list of [fields](Field): each
//! field is packed as a little-endian signed 32-bit word, in the order of the
//! list, so the size of an encoded record is four bytes per field. Booleans
//! and edge states are packed as 0/1 words.
//!
//! The same abstract [`Record`] can be stored using different layouts: the
//! presets [`VERTEX_LAYOUT`], [`EDGE_LAYOUT`], [`FLAGGED_EDGE_LAYOUT`] and
//! [`REDUCED_EDGE_LAYOUT`] are the ones used by this crate, but any list of
//! fields supported by the record type is valid.
//!
//! # Tombstones
//!
//! Edges are never removed physically; they are tombstoned. If the layout
//! contains [`Field::State`] the state is stored explicitly. Otherwise, a
//! tombstoned edge is stored by writing [`TOMBSTONE`] in all its label words,
//! and an edge is decoded as tombstoned if any of its label words is
//! [`TOMBSTONE`]. Since labels are non-negative vertex ids (or
//! [`UNSET`](crate::record::UNSET)), a live edge can never collide with the
//! sentinel; an attempt to encode one that would is reported as
//! [`CodecError::SentinelCollision`].
//!
//! # Examples
//!
//! ```
//! use fwbw_scc::codec::*;
//! use fwbw_scc::record::VertexRecord;
//!
//! let codec = Codec::<VertexRecord>::new(VERTEX_LAYOUT)?;
//! assert_eq!(codec.record_size(), 16);
//!
//! let mut buffer = [0_u8; 16];
//! let record = VertexRecord::new(7);
//! codec.encode(&mut buffer, &record)?;
//! assert_eq!(codec.decode(&buffer)?, VertexRecord { id: 0, ..record });
//! # Ok::<(), CodecError>(())
//! ```

use crate::record::UNSET;
use std::fmt::Display;
use std::marker::PhantomData;
use thiserror::Error;

/// The word written in the label fields of a tombstoned edge when the layout
/// has no explicit state word.
///
/// It is the smallest vertex id minus one.
pub const TOMBSTONE: i32 = -1;

/// The size in bytes of a field.
pub const WORD_SIZE: usize = core::mem::size_of::<i32>();

/// A field of a vertex or edge record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    /// The id of a vertex.
    Id,
    /// The component label of a vertex.
    Color,
    /// Whether the membership of a vertex is settled.
    Confirmed,
    /// The forward minimum label.
    MinF,
    /// The backward minimum label.
    MinB,
    /// The source of an edge.
    From,
    /// The target of an edge.
    To,
    /// The state (live or tombstoned) of an edge.
    State,
}

impl Field {
    /// Returns true if the field holds a propagated label.
    ///
    /// Label fields carry [`TOMBSTONE`] for tombstoned edges in layouts
    /// without [`Field::State`].
    pub fn is_label(self) -> bool {
        matches!(self, Field::Color | Field::MinF | Field::MinB)
    }

    /// Returns true if the field is packed as a 0/1 word.
    pub fn is_flag(self) -> bool {
        matches!(self, Field::Confirmed | Field::State)
    }
}

impl Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Field::Id => "id",
            Field::Color => "color",
            Field::Confirmed => "confirmed",
            Field::MinF => "minF",
            Field::MinB => "minB",
            Field::From => "from",
            Field::To => "to",
            Field::State => "state",
        })
    }
}

/// `[color][confirmed][minF][minB]`: 16 bytes.
pub const VERTEX_LAYOUT: &[Field] = &[Field::Color, Field::Confirmed, Field::MinF, Field::MinB];

/// `[minF][minB][from][to]`: 16 bytes; tombstones are stored as
/// [`TOMBSTONE`] in the label words.
pub const EDGE_LAYOUT: &[Field] = &[Field::MinF, Field::MinB, Field::From, Field::To];

/// `[minF][minB][from][to][state]`: 20 bytes; tombstones are stored
/// explicitly.
pub const FLAGGED_EDGE_LAYOUT: &[Field] = &[
    Field::MinF,
    Field::MinB,
    Field::From,
    Field::To,
    Field::State,
];

/// `[minF]`: 4 bytes; a single minimum value, sufficient for forward
/// propagation only.
pub const REDUCED_EDGE_LAYOUT: &[Field] = &[Field::MinF];

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// The buffer length differs from the record size.
    #[error("Buffer of {actual} bytes, while the record size is {expected} bytes")]
    SizeMismatch { expected: usize, actual: usize },
    /// A flag word is neither 0 nor 1.
    #[error("Invalid value {value} for field '{field}'")]
    InvalidValue { field: Field, value: i32 },
    /// A live record has a label equal to the tombstone sentinel.
    #[error("Field '{field}' of a live record collides with the tombstone sentinel")]
    SentinelCollision { field: Field },
    #[error("A layout must contain at least one field")]
    EmptyLayout,
    #[error("Field '{0}' appears more than once in the layout")]
    DuplicateField(Field),
    #[error("Field '{field}' is not part of {record} records")]
    UnsupportedField { field: Field, record: &'static str },
}

/// A record that can be stored through a [`Codec`].
///
/// Implementations map each supported [`Field`] to a 32-bit word. Flag
/// fields are read and written as 0/1.
pub trait Record: Default {
    /// A name used in error messages.
    const NAME: &'static str;

    /// Returns true if records of this type carry the given field.
    fn supports(field: Field) -> bool;

    /// Returns the word of a supported field.
    fn get(&self, field: Field) -> i32;

    /// Sets a supported field from its word.
    fn set(&mut self, field: Field, value: i32);

    /// Returns true if the record is soft-deleted.
    fn is_tombstoned(&self) -> bool {
        false
    }

    /// Soft-deletes the record.
    fn tombstone(&mut self) {}
}

/// A fixed-size codec for records of type `R`.
#[derive(Debug, Clone)]
pub struct Codec<R> {
    fields: Box<[Field]>,
    /// Tombstones are encoded in the label words.
    sentinel: bool,
    _marker: PhantomData<fn() -> R>,
}

impl<R: Record> Codec<R> {
    /// Creates a codec for the given layout.
    ///
    /// The layout must be nonempty, without repetitions, and contain only
    /// fields supported by `R`.
    pub fn new(fields: &[Field]) -> Result<Self, CodecError> {
        if fields.is_empty() {
            return Err(CodecError::EmptyLayout);
        }
        for (i, &field) in fields.iter().enumerate() {
            if !R::supports(field) {
                return Err(CodecError::UnsupportedField {
                    field,
                    record: R::NAME,
                });
            }
            if fields[..i].contains(&field) {
                return Err(CodecError::DuplicateField(field));
            }
        }
        Ok(Self {
            fields: fields.into(),
            sentinel: R::supports(Field::State) && !fields.contains(&Field::State),
            _marker: PhantomData,
        })
    }

    /// Returns the fields of the layout, in storage order.
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Returns true if the layout stores the given field.
    pub fn contains(&self, field: Field) -> bool {
        self.fields.contains(&field)
    }

    /// Returns the size in bytes of an encoded record.
    #[inline(always)]
    pub fn record_size(&self) -> usize {
        self.fields.len() * WORD_SIZE
    }

    #[inline(always)]
    fn check_size(&self, len: usize) -> Result<(), CodecError> {
        if len != self.record_size() {
            return Err(CodecError::SizeMismatch {
                expected: self.record_size(),
                actual: len,
            });
        }
        Ok(())
    }

    /// Encodes a record into the given buffer, in place.
    ///
    /// The labels of a tombstoned record are not stored: they are written as
    /// [`TOMBSTONE`] in sentinel layouts and as [`UNSET`] otherwise.
    pub fn encode(&self, buffer: &mut [u8], record: &R) -> Result<(), CodecError> {
        self.check_size(buffer.len())?;
        let tombstoned = record.is_tombstoned();
        for (&field, word) in self.fields.iter().zip(buffer.chunks_exact_mut(WORD_SIZE)) {
            let value = if tombstoned && field.is_label() {
                if self.sentinel {
                    TOMBSTONE
                } else {
                    UNSET
                }
            } else {
                let value = record.get(field);
                if self.sentinel && field.is_label() && value == TOMBSTONE {
                    return Err(CodecError::SentinelCollision { field });
                }
                value
            };
            word.copy_from_slice(&value.to_le_bytes());
        }
        Ok(())
    }

    /// Decodes a record from the given buffer.
    ///
    /// Fields that are not part of the layout keep their default value.
    pub fn decode(&self, buffer: &[u8]) -> Result<R, CodecError> {
        self.check_size(buffer.len())?;
        let mut record = R::default();
        let mut tombstoned = false;
        for (&field, word) in self.fields.iter().zip(buffer.chunks_exact(WORD_SIZE)) {
            // chunks_exact guarantees the length
            let value = i32::from_le_bytes([word[0], word[1], word[2], word[3]]);
            if field.is_flag() && !(0..=1).contains(&value) {
                return Err(CodecError::InvalidValue { field, value });
            }
            if self.sentinel && field.is_label() && value == TOMBSTONE {
                tombstoned = true;
            }
            record.set(field, value);
        }
        if tombstoned {
            record.tombstone();
        }
        Ok(record)
    }
}
