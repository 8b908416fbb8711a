// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Persistence interfaces for message and envelope records.
//!
//! The core treats create/read/update as durable calls it can rely on but
//! does not implement. [`MemoryStore`] is the in-tree backend used in tests
//! and embedded setups; host applications bring their own.

pub mod memory;

pub use self::memory::{MemoryDomain, MemoryStore};

use crate::envelope::{Envelope, EnvelopeId, NewEnvelope};
use crate::error::Result;
use crate::message::{Message, MessageId, MessageState, NewMessage};
use crate::record::DomainStore;

/// Durable storage for messages and envelopes.
pub trait MessageStore {
    /// Persist a new message in `Draft` state and return it with its id.
    fn create_message(&mut self, message: NewMessage) -> Result<Message>;

    /// Read a message back. What was written must come back byte-exact.
    fn message(&self, id: MessageId) -> Result<Message>;

    /// Persist the current state of a message.
    fn update_message(&mut self, message: &Message) -> Result<()>;

    /// Persist a new envelope in `Draft` state and return it with its id.
    fn create_envelope(&mut self, envelope: NewEnvelope) -> Result<Envelope>;

    /// Read an envelope back.
    fn envelope(&self, id: EnvelopeId) -> Result<Envelope>;

    /// Persist the current state of an envelope.
    fn update_envelope(&mut self, envelope: &Envelope) -> Result<()>;

    /// The envelope containing the given message, if any.
    fn envelope_of(&self, id: MessageId) -> Result<Option<Envelope>>;
}

/// The two collaborator handles every pack/unpack/dispatch call works
/// against.
pub struct EdiContext<'a> {
    pub messages: &'a mut dyn MessageStore,
    pub domain: &'a mut dyn DomainStore,
}

impl<'a> EdiContext<'a> {
    pub fn new(messages: &'a mut dyn MessageStore, domain: &'a mut dyn DomainStore) -> Self {
        Self { messages, domain }
    }

    /// Cancel an envelope and cascade to every contained message.
    ///
    /// Messages already in a terminal state are left untouched; everything
    /// else, including ones marked `Sent` earlier in the same dispatch, is
    /// canceled. This is the single implementation of the cascade invariant.
    pub fn cancel_envelope(&mut self, id: EnvelopeId) -> Result<()> {
        let mut envelope = self.messages.envelope(id)?;
        if !envelope.state.is_terminal() {
            envelope.transition(MessageState::Canceled)?;
            self.messages.update_envelope(&envelope)?;
        }
        for message_id in &envelope.message_ids {
            let mut message = self.messages.message(*message_id)?;
            if message.state.is_terminal() {
                continue;
            }
            message.transition(MessageState::Canceled)?;
            self.messages.update_message(&message)?;
        }
        Ok(())
    }
}
