// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Error types for edilink-core.

use thiserror::Error;

use crate::envelope::EnvelopeId;
use crate::message::{MessageId, MessageState};
use crate::record::RecordKind;

/// Result type using EdiError.
pub type Result<T> = std::result::Result<T, EdiError>;

/// Errors raised by the pack/unpack framework, the transport session and the
/// route dispatcher.
#[derive(Debug, Error)]
pub enum EdiError {
    /// A record of the wrong entity kind was handed to `pack`.
    #[error("attached record is not a {expected}, got {actual}")]
    InvalidRecordKind {
        expected: RecordKind,
        actual: RecordKind,
    },

    /// `pack` was called with a key no handler is registered for.
    #[error("no message type registered for key '{0}'")]
    UnknownMessageType(String),

    /// The route's connection descriptor has required fields unset.
    #[error("connection descriptor incomplete, missing: {}", missing.join(", "))]
    MissingConnectionConfig { missing: Vec<&'static str> },

    /// The message body cannot be turned into an outbound request.
    #[error("malformed message body: {0}")]
    MalformedMessageBody(String),

    /// Network or HTTP-level failure during an exchange.
    #[error("transport error: {0}")]
    Transport(String),

    /// A non-empty response arrived for a type with no response hook.
    #[error("unsupported response shape for message type '{message_type}'")]
    UnsupportedResponseShape { message_type: String },

    /// Attempted lifecycle transition that the state machine forbids.
    #[error("invalid state transition {from} -> {to}")]
    InvalidStateTransition {
        from: MessageState,
        to: MessageState,
    },

    /// Body encode/decode failure.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Message not found in the persistence collaborator.
    #[error("message {0} not found")]
    MessageNotFound(MessageId),

    /// Envelope not found in the persistence collaborator.
    #[error("envelope {0} not found")]
    EnvelopeNotFound(EnvelopeId),

    /// Failure reported by a domain-record collaborator.
    #[error("domain store error: {0}")]
    Domain(String),
}
