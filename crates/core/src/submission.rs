//! Submission lifecycle of one try-on session.
//!
//! ```text
//! idle ──begin──▶ submitting ──complete(ok)──▶ succeeded
//!   ▲                 │
//!   │                 └────complete(err)─▶ failed ──begin──▶ submitting
//!   └──────────── reset (from any phase) ───────────┘
//! ```
//!
//! Every `begin` bumps an epoch carried by the returned ticket. `reset` also
//! bumps it, so a batch that finishes after a reset is recognised as stale
//! and its outcome dropped.

use serde::Serialize;

use crate::error::CoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionPhase {
    #[default]
    Idle,
    Submitting,
    Succeeded,
    Failed,
}

/// Proof that a batch was started; required to record its outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmissionTicket(u64);

#[derive(Debug, Clone, Default)]
pub struct Submission {
    phase: SubmissionPhase,
    epoch: u64,
}

impl Submission {
    pub fn phase(&self) -> SubmissionPhase {
        self.phase
    }

    /// Start a batch. Rejected while one is outstanding or after success.
    pub fn begin(&mut self) -> Result<SubmissionTicket, CoreError> {
        match self.phase {
            SubmissionPhase::Idle | SubmissionPhase::Failed => {
                self.epoch += 1;
                self.phase = SubmissionPhase::Submitting;
                Ok(SubmissionTicket(self.epoch))
            }
            SubmissionPhase::Submitting => Err(CoreError::Conflict(
                "A generation is already in progress".into(),
            )),
            SubmissionPhase::Succeeded => Err(CoreError::Conflict(
                "Results are already available; reset to start a new try-on".into(),
            )),
        }
    }

    /// Record the outcome of the batch identified by `ticket`.
    ///
    /// Returns `false` (and changes nothing) when the ticket is stale.
    pub fn complete(&mut self, ticket: SubmissionTicket, succeeded: bool) -> bool {
        if ticket.0 != self.epoch || self.phase != SubmissionPhase::Submitting {
            return false;
        }
        self.phase = if succeeded {
            SubmissionPhase::Succeeded
        } else {
            SubmissionPhase::Failed
        };
        true
    }

    /// Return to idle unconditionally, orphaning any in-flight batch.
    pub fn reset(&mut self) {
        self.epoch += 1;
        self.phase = SubmissionPhase::Idle;
    }

    /// Inputs may only change while idle or after a failure.
    pub fn ensure_editable(&self) -> Result<(), CoreError> {
        match self.phase {
            SubmissionPhase::Idle | SubmissionPhase::Failed => Ok(()),
            SubmissionPhase::Submitting => Err(CoreError::Conflict(
                "Inputs cannot change while a generation is in progress".into(),
            )),
            SubmissionPhase::Succeeded => Err(CoreError::Conflict(
                "Reset the session before changing inputs".into(),
            )),
        }
    }
}
