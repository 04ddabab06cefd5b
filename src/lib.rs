/*
 * SPDX-FileCopyrightText: 2025 The fwbw-scc developers
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

#![doc = include_str!("../README.md")]
// for now we don't need any new feature but we might remove this in the future
#![deny(unstable_features)]
#![deny(trivial_casts)]
#![deny(unconditional_recursion)]
#![deny(clippy::empty_loop)]
#![deny(unreachable_code)]
#![deny(unreachable_patterns)]
#![deny(unused_macro_rules)]
#![deny(unused_doc_comments)]

pub mod algo;
#[cfg(feature = "cli")]
pub mod cli;
pub mod codec;
pub mod engine;
pub mod graphs;
pub mod record;
pub mod sccs;
pub mod traits;

pub mod prelude {
    pub use crate::algo::{
        forward_labels, scc, Backward, Convergence, Forward, ForwardOutcome, Phase, RunContext,
        SccConfig, SccOutcome,
    };
    pub use crate::codec::*;
    pub use crate::engine::{EngineConfig, InMemoryEngine, Topology};
    pub use crate::graphs::random::ErdosRenyi;
    pub use crate::record::*;
    pub use crate::sccs::Sccs;
    pub use crate::traits::*;
}
