// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! EDI message records and their lifecycle state machine.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::body::MessageBody;
use crate::error::{EdiError, Result};
use crate::record::RecordRef;

/// Store-assigned message identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MessageId(pub u64);

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle state shared by messages and envelopes.
///
/// `Received` and `Canceled` are terminal.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum MessageState {
    Draft,
    Sent,
    Received,
    Canceled,
}

impl MessageState {
    /// Whether no further transitions are allowed from this state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Received | Self::Canceled)
    }

    fn can_transition_to(&self, next: MessageState) -> bool {
        use MessageState::*;
        matches!(
            (self, next),
            (Draft, Sent) | (Draft, Received) | (Draft, Canceled) | (Sent, Received) | (Sent, Canceled)
        )
    }
}

/// Transport direction, inherited from the owning envelope at creation.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Direction {
    In,
    Out,
}

/// A single unit of EDI payload with a lifecycle state.
///
/// Bound to a message-type key (immutable after creation) and, weakly, to the
/// domain record it concerns. The tracking id is assigned at transport time,
/// one per attempt; the human-readable `name` is never overwritten by it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub name: String,
    pub message_type: String,
    pub body: MessageBody,
    pub state: MessageState,
    pub record: Option<RecordRef>,
    pub tracking_id: Option<String>,
    pub route_id: String,
    pub direction: Direction,
}

/// Fields supplied when creating a message; id and state are store-assigned.
#[derive(Debug, Clone)]
pub struct NewMessage {
    pub name: String,
    pub message_type: String,
    pub body: MessageBody,
    pub record: Option<RecordRef>,
    pub route_id: String,
    pub direction: Direction,
}

impl Message {
    /// Apply a lifecycle transition, rejecting anything the state machine
    /// does not allow (terminal states never regress).
    pub fn transition(&mut self, next: MessageState) -> Result<()> {
        if !self.state.can_transition_to(next) {
            return Err(EdiError::InvalidStateTransition {
                from: self.state,
                to: next,
            });
        }
        tracing::debug!(message = %self.id, from = %self.state, to = %next, "message transition");
        self.state = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::MessageBody;

    fn draft() -> Message {
        Message {
            id: MessageId(1),
            name: "test message".to_string(),
            message_type: "asok_postcode".to_string(),
            body: MessageBody::Url {
                template: "{url}:{port}/x".to_string(),
            },
            state: MessageState::Draft,
            record: None,
            tracking_id: None,
            route_id: "ipf".to_string(),
            direction: Direction::Out,
        }
    }

    #[test]
    fn test_success_path_transitions() {
        let mut msg = draft();
        msg.transition(MessageState::Sent).unwrap();
        msg.transition(MessageState::Received).unwrap();
        assert!(msg.state.is_terminal());
    }

    #[test]
    fn test_direct_ack_from_draft() {
        let mut msg = draft();
        msg.transition(MessageState::Received).unwrap();
        assert_eq!(msg.state, MessageState::Received);
    }

    #[test]
    fn test_cancel_from_draft_and_sent() {
        let mut msg = draft();
        msg.transition(MessageState::Canceled).unwrap();

        let mut msg = draft();
        msg.transition(MessageState::Sent).unwrap();
        msg.transition(MessageState::Canceled).unwrap();
    }

    #[test]
    fn test_terminal_states_never_regress() {
        let mut msg = draft();
        msg.transition(MessageState::Received).unwrap();
        let err = msg.transition(MessageState::Sent).unwrap_err();
        assert!(matches!(err, EdiError::InvalidStateTransition { .. }));

        let mut msg = draft();
        msg.transition(MessageState::Canceled).unwrap();
        assert!(msg.transition(MessageState::Sent).is_err());
        assert!(msg.transition(MessageState::Received).is_err());
    }

    #[test]
    fn test_state_string_forms() {
        assert_eq!(MessageState::Draft.to_string(), "draft");
        assert_eq!(MessageState::Canceled.to_string(), "canceled");
        assert_eq!(Direction::Out.to_string(), "out");
    }
}
