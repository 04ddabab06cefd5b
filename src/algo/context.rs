/*
 * SPDX-FileCopyrightText: 2025 The fwbw-scc developers
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use std::fmt::Display;
use std::sync::atomic::{AtomicBool, Ordering};

/// One of the two passes of a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Forward,
    Backward,
}

impl Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Phase::Forward => "forward",
            Phase::Backward => "backward",
        })
    }
}

/// The state of a run, owned by the driver loop and lent to each phase.
///
/// Updates running in parallel only read the context, except for the
/// remaining-work flag, which is atomic.
#[derive(Debug)]
pub struct RunContext {
    phase: Phase,
    round: usize,
    iteration: usize,
    global_iteration: usize,
    remaining_work: AtomicBool,
}

impl Default for RunContext {
    fn default() -> Self {
        Self::new()
    }
}

impl RunContext {
    pub fn new() -> Self {
        Self {
            phase: Phase::Forward,
            round: 0,
            iteration: 0,
            global_iteration: 0,
            remaining_work: AtomicBool::new(false),
        }
    }

    #[inline(always)]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Returns the current round (a forward and a backward phase).
    #[inline(always)]
    pub fn round(&self) -> usize {
        self.round
    }

    /// Returns the iteration within the current phase.
    #[inline(always)]
    pub fn iteration(&self) -> usize {
        self.iteration
    }

    /// Returns the number of iterations performed since the start of the
    /// run.
    #[inline(always)]
    pub fn global_iteration(&self) -> usize {
        self.global_iteration
    }

    #[inline(always)]
    pub fn is_first_iteration(&self) -> bool {
        self.iteration == 0
    }

    #[inline(always)]
    pub fn is_first_global_iteration(&self) -> bool {
        self.global_iteration == 0
    }

    /// Signals that some vertex still needs work.
    #[inline(always)]
    pub fn mark_remaining_work(&self) {
        self.remaining_work.store(true, Ordering::Relaxed);
    }

    pub fn has_remaining_work(&self) -> bool {
        self.remaining_work.load(Ordering::Relaxed)
    }

    /// Starts a new phase, lowering the remaining-work flag.
    ///
    /// The round is incremented when a forward phase follows a backward one.
    pub fn begin_phase(&mut self, phase: Phase) {
        if phase == Phase::Forward && self.phase == Phase::Backward {
            self.round += 1;
        }
        self.phase = phase;
        self.iteration = 0;
        *self.remaining_work.get_mut() = false;
    }

    /// Moves to the next iteration of the current phase.
    pub fn advance(&mut self) {
        self.iteration += 1;
        self.global_iteration += 1;
    }
}
