// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Envelopes: named, ordered batches of messages sharing one route and
//! direction, the transactional unit for dispatch.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{EdiError, Result};
use crate::message::{Direction, MessageId, MessageState};

/// Store-assigned envelope identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EnvelopeId(pub u64);

impl fmt::Display for EnvelopeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A batch of messages dispatched as one unit.
///
/// Cancellation of an envelope cascades to every contained message; the
/// cascade itself lives in [`crate::store::EdiContext::cancel_envelope`] so
/// there is exactly one implementation of the invariant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub id: EnvelopeId,
    pub name: String,
    pub route_id: String,
    pub direction: Direction,
    pub state: MessageState,
    pub message_ids: Vec<MessageId>,
}

/// Fields supplied when creating an envelope; id and state are store-assigned.
#[derive(Debug, Clone)]
pub struct NewEnvelope {
    pub name: String,
    pub route_id: String,
    pub direction: Direction,
    pub message_ids: Vec<MessageId>,
}

impl Envelope {
    /// Apply a lifecycle transition with the same rules as messages.
    pub fn transition(&mut self, next: MessageState) -> Result<()> {
        let allowed = matches!(
            (self.state, next),
            (MessageState::Draft, MessageState::Sent)
                | (MessageState::Draft, MessageState::Received)
                | (MessageState::Draft, MessageState::Canceled)
                | (MessageState::Sent, MessageState::Received)
                | (MessageState::Sent, MessageState::Canceled)
        );
        if !allowed {
            return Err(EdiError::InvalidStateTransition {
                from: self.state,
                to: next,
            });
        }
        tracing::debug!(envelope = %self.id, from = %self.state, to = %next, "envelope transition");
        self.state = next;
        Ok(())
    }
}
