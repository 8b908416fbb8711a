// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! In-memory persistence backends.
//!
//! `MemoryStore` keeps message bodies in their encoded byte form and decodes
//! them on every read, so the body round-trip contract is exercised on the
//! same path a database-backed store would use.

use std::collections::{BTreeMap, HashMap};

use serde_json::Value;

use crate::body::MessageBody;
use crate::envelope::{Envelope, EnvelopeId, NewEnvelope};
use crate::error::{EdiError, Result};
use crate::message::{Message, MessageId, MessageState, NewMessage};
use crate::record::{DomainStore, RecordRef};
use crate::store::MessageStore;

#[derive(Debug, Clone)]
struct StoredMessage {
    message: Message,
    body_bytes: Vec<u8>,
}

/// In-memory [`MessageStore`] backend.
#[derive(Debug, Default)]
pub struct MemoryStore {
    next_id: u64,
    messages: HashMap<MessageId, StoredMessage>,
    envelopes: HashMap<EnvelopeId, Envelope>,
    envelope_order: Vec<EnvelopeId>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    /// All messages of the given type, in creation order. Test helper.
    pub fn messages_of_type(&self, message_type: &str) -> Vec<Message> {
        let mut ids: Vec<MessageId> = self
            .messages
            .iter()
            .filter(|(_, stored)| stored.message.message_type == message_type)
            .map(|(id, _)| *id)
            .collect();
        ids.sort();
        ids.iter()
            .map(|id| self.messages[id].message.clone())
            .collect()
    }

    /// Number of stored messages. Test helper.
    pub fn message_count(&self) -> usize {
        self.messages.len()
    }
}

impl MessageStore for MemoryStore {
    fn create_message(&mut self, message: NewMessage) -> Result<Message> {
        let id = MessageId(self.next_id());
        let message = Message {
            id,
            name: message.name,
            message_type: message.message_type,
            body: message.body,
            state: MessageState::Draft,
            record: message.record,
            tracking_id: None,
            route_id: message.route_id,
            direction: message.direction,
        };
        let body_bytes = message.body.encode()?;
        self.messages.insert(
            id,
            StoredMessage {
                message: message.clone(),
                body_bytes,
            },
        );
        Ok(message)
    }

    fn message(&self, id: MessageId) -> Result<Message> {
        let stored = self
            .messages
            .get(&id)
            .ok_or(EdiError::MessageNotFound(id))?;
        let mut message = stored.message.clone();
        message.body = MessageBody::decode(&stored.body_bytes)?;
        Ok(message)
    }

    fn update_message(&mut self, message: &Message) -> Result<()> {
        let body_bytes = message.body.encode()?;
        let stored = self
            .messages
            .get_mut(&message.id)
            .ok_or(EdiError::MessageNotFound(message.id))?;
        stored.message = message.clone();
        stored.body_bytes = body_bytes;
        Ok(())
    }

    fn create_envelope(&mut self, envelope: NewEnvelope) -> Result<Envelope> {
        let id = EnvelopeId(self.next_id());
        let envelope = Envelope {
            id,
            name: envelope.name,
            route_id: envelope.route_id,
            direction: envelope.direction,
            state: MessageState::Draft,
            message_ids: envelope.message_ids,
        };
        self.envelopes.insert(id, envelope.clone());
        self.envelope_order.push(id);
        Ok(envelope)
    }

    fn envelope(&self, id: EnvelopeId) -> Result<Envelope> {
        self.envelopes
            .get(&id)
            .cloned()
            .ok_or(EdiError::EnvelopeNotFound(id))
    }

    fn update_envelope(&mut self, envelope: &Envelope) -> Result<()> {
        let slot = self
            .envelopes
            .get_mut(&envelope.id)
            .ok_or(EdiError::EnvelopeNotFound(envelope.id))?;
        *slot = envelope.clone();
        Ok(())
    }

    fn envelope_of(&self, id: MessageId) -> Result<Option<Envelope>> {
        for env_id in &self.envelope_order {
            let envelope = &self.envelopes[env_id];
            if envelope.message_ids.contains(&id) {
                return Ok(Some(envelope.clone()));
            }
        }
        Ok(None)
    }
}

/// In-memory [`DomainStore`] backend recording every write it receives.
#[derive(Debug, Default)]
pub struct MemoryDomain {
    /// competence id -> local appointment type id
    pub appointment_types: HashMap<i64, i64>,
    pub match_areas: HashMap<i64, bool>,
    pub offices: HashMap<i64, (String, String)>,
    pub confirmed_notes: HashMap<i64, String>,
    pub organisation_names: HashMap<i64, String>,
    pub applied_slots: Vec<(i64, BTreeMap<String, Value>)>,
    pub deactivated: Vec<RecordRef>,
    pub completed_workitems: Vec<RecordRef>,
}

impl MemoryDomain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_appointment_type(mut self, competence_id: i64, type_id: i64) -> Self {
        self.appointment_types.insert(competence_id, type_id);
        self
    }
}

impl DomainStore for MemoryDomain {
    fn set_match_area(&mut self, record: &RecordRef, valid: bool) -> Result<()> {
        self.match_areas.insert(record.id, valid);
        Ok(())
    }

    fn set_office(&mut self, record: &RecordRef, code: &str, name: &str) -> Result<()> {
        self.offices
            .insert(record.id, (code.to_string(), name.to_string()));
        Ok(())
    }

    fn confirm_daily_note(&mut self, record: &RecordRef, external_id: &str) -> Result<()> {
        self.confirmed_notes.insert(record.id, external_id.to_string());
        Ok(())
    }

    fn set_organisation_name(&mut self, record: &RecordRef, name: &str) -> Result<()> {
        self.organisation_names.insert(record.id, name.to_string());
        Ok(())
    }

    fn appointment_type_by_competence(&self, competence_id: i64) -> Result<Option<i64>> {
        Ok(self.appointment_types.get(&competence_id).copied())
    }

    fn apply_schedule_slot(
        &mut self,
        appointment_type: i64,
        slot: &BTreeMap<String, Value>,
    ) -> Result<()> {
        self.applied_slots.push((appointment_type, slot.clone()));
        Ok(())
    }

    fn deactivate(&mut self, record: &RecordRef) -> Result<()> {
        self.deactivated.push(*record);
        Ok(())
    }

    fn complete_workitem_appointment(&mut self, workitem: &RecordRef) -> Result<()> {
        self.completed_workitems.push(*workitem);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Direction;
    use std::collections::BTreeMap;

    fn request_message() -> NewMessage {
        let mut data = BTreeMap::new();
        data.insert("senasteKontaktTyp".to_string(), "B".to_string());
        data.insert("nastaKontaktDatum".to_string(), "".to_string());
        NewMessage {
            name: "asok contact update".to_string(),
            message_type: "asok_contact".to_string(),
            body: MessageBody::Request {
                base_url: "{url}:{port}/kontakt".to_string(),
                data,
            },
            record: None,
            route_id: "ipf".to_string(),
            direction: Direction::Out,
        }
    }

    // Read-after-write contract: what create_message persisted must come
    // back identical on the next read, body included.
    #[test]
    fn test_read_after_write_returns_identical_body() {
        let mut store = MemoryStore::new();
        let created = store.create_message(request_message()).unwrap();
        let read = store.message(created.id).unwrap();
        assert_eq!(read, created);
        assert_eq!(read.body, created.body);
    }

    #[test]
    fn test_update_is_visible_on_next_read() {
        let mut store = MemoryStore::new();
        let mut message = store.create_message(request_message()).unwrap();
        message.tracking_id = Some("5f7e9a30-0000-0000-0000-000000000000".to_string());
        message.transition(MessageState::Sent).unwrap();
        store.update_message(&message).unwrap();

        let read = store.message(message.id).unwrap();
        assert_eq!(read.state, MessageState::Sent);
        assert_eq!(read.tracking_id, message.tracking_id);
    }

    #[test]
    fn test_missing_message_is_an_error() {
        let store = MemoryStore::new();
        assert!(matches!(
            store.message(MessageId(99)),
            Err(EdiError::MessageNotFound(MessageId(99)))
        ));
    }

    #[test]
    fn test_envelope_of_finds_owner() {
        let mut store = MemoryStore::new();
        let message = store.create_message(request_message()).unwrap();
        let envelope = store
            .create_envelope(NewEnvelope {
                name: "asok contact update".to_string(),
                route_id: "ipf".to_string(),
                direction: Direction::Out,
                message_ids: vec![message.id],
            })
            .unwrap();

        let found = store.envelope_of(message.id).unwrap().unwrap();
        assert_eq!(found.id, envelope.id);
        assert!(store.envelope_of(MessageId(42)).unwrap().is_none());
    }

    #[test]
    fn test_message_order_within_envelope_is_preserved() {
        let mut store = MemoryStore::new();
        let a = store.create_message(request_message()).unwrap();
        let b = store.create_message(request_message()).unwrap();
        let c = store.create_message(request_message()).unwrap();
        let envelope = store
            .create_envelope(NewEnvelope {
                name: "batch".to_string(),
                route_id: "ipf".to_string(),
                direction: Direction::Out,
                message_ids: vec![a.id, b.id, c.id],
            })
            .unwrap();
        assert_eq!(
            store.envelope(envelope.id).unwrap().message_ids,
            vec![a.id, b.id, c.id]
        );
    }
}
