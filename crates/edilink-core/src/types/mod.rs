// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Message-type strategy table.
//!
//! Every message type is one [`MessageTypeHandler`] entry: pack, unpack, a
//! header hook and a response fan-out hook, looked up by a stable string key.
//! The table is built once at startup ([`MessageTypeRegistry::builtin`]);
//! there are no per-call type-identity chains and no delegation hierarchy.
//! A message whose key has no registered handler still unpacks through the
//! generic default, which never fails.

mod contact;
mod daily_note;
mod office;
mod organisation;
mod postcode;
mod schedules;
mod workitem;

pub use self::contact::ContactHandler;
pub use self::daily_note::DailyNoteHandler;
pub use self::office::OfficeHandler;
pub use self::organisation::OrganisationHandler;
pub use self::postcode::PostcodeHandler;
pub use self::schedules::SchedulesHandler;
pub use self::workitem::WorkItemHandler;

use std::collections::{BTreeMap, HashMap};

use serde_json::Value;

use crate::body::MessageBody;
use crate::envelope::{Envelope, NewEnvelope};
use crate::error::{EdiError, Result};
use crate::message::{Direction, Message, NewMessage};
use crate::record::DomainRecord;
use crate::store::{EdiContext, MessageStore};

/// Stable keys for the built-in message types.
pub mod keys {
    pub const POSTCODE: &str = "asok_postcode";
    pub const CONTACT: &str = "asok_contact";
    pub const SCHEDULES: &str = "appointment_schedules";
    pub const ACE_WORKITEM: &str = "appointment_ace_wi";
    pub const OFFICE: &str = "asok_office";
    pub const DAILY_NOTE: &str = "asok_daily_note";
    pub const ORGANISATION: &str = "ag_organisation";
}

/// Connection-derived values a header hook may draw from.
#[derive(Debug, Clone, Copy)]
pub struct HeaderContext<'a> {
    pub tracking_id: &'a str,
    /// Pass-through assertion token from the connection descriptor, if
    /// configured. Issuance is out of scope.
    pub assertion_token: Option<&'a str>,
}

/// Per-type behavior: one entry in the strategy table.
pub trait MessageTypeHandler: Send + Sync {
    /// The stable key this handler serves.
    fn key(&self) -> &'static str;

    /// Human label for messages created at pack time.
    fn message_name(&self) -> &'static str;

    /// Human label for the wrapping envelope created at pack time.
    fn envelope_name(&self) -> &'static str;

    /// Build a wire-ready body from a domain record.
    ///
    /// Validates the record's entity kind; a mismatch is
    /// [`EdiError::InvalidRecordKind`] and is never retried.
    fn pack(&self, record: &DomainRecord) -> Result<MessageBody>;

    /// Apply a received body to the domain. The default decodes and does
    /// nothing, which is also the fallback for unregistered keys.
    fn unpack(&self, ctx: &mut EdiContext<'_>, message: &Message) -> Result<()> {
        let _ = ctx;
        default_unpack(message)
    }

    /// Message-type-specific request headers, merged after the base set.
    fn extra_headers(&self, headers: &HeaderContext<'_>) -> Vec<(String, String)> {
        let _ = headers;
        Vec::new()
    }

    /// Turn a parsed response into side effects: zero or more new messages,
    /// domain writes, or state transitions. The default accepts only an
    /// empty response.
    fn fan_out(
        &self,
        registry: &MessageTypeRegistry,
        ctx: &mut EdiContext<'_>,
        message: &mut Message,
        res: &Value,
    ) -> Result<()> {
        let _ = (registry, ctx, message);
        default_fan_out(self.key(), res)
    }
}

/// Whether a parsed response carries no content.
pub fn response_is_empty(res: &Value) -> bool {
    match res {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

/// Default response handling: empty is a no-op, anything else is surfaced.
pub fn default_fan_out(key: &str, res: &Value) -> Result<()> {
    if response_is_empty(res) {
        tracing::debug!(message_type = key, "empty response, nothing to do");
        return Ok(());
    }
    Err(EdiError::UnsupportedResponseShape {
        message_type: key.to_string(),
    })
}

/// Generic unpack: prove the body decodes, change nothing.
pub fn default_unpack(message: &Message) -> Result<()> {
    let bytes = message.body.encode()?;
    MessageBody::decode(&bytes)?;
    tracing::debug!(message = %message.id, message_type = %message.message_type, "generic unpack");
    Ok(())
}

/// Reply data of a message, if its body is a reply.
pub(crate) fn reply_data(message: &Message) -> Option<&BTreeMap<String, Value>> {
    match &message.body {
        MessageBody::Reply { data } => Some(data),
        _ => None,
    }
}

/// Wrap a full response object as one reply message bound to the original
/// message's record, then unpack it immediately.
pub(crate) fn wrap_response_and_unpack(
    registry: &MessageTypeRegistry,
    ctx: &mut EdiContext<'_>,
    message: &Message,
    reply_name: &str,
    res: &Value,
) -> Result<()> {
    let data: BTreeMap<String, Value> = match res {
        Value::Object(map) => map.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
        _ => {
            return Err(EdiError::UnsupportedResponseShape {
                message_type: message.message_type.clone(),
            });
        }
    };
    let reply = ctx.messages.create_message(NewMessage {
        name: reply_name.to_string(),
        message_type: message.message_type.clone(),
        body: MessageBody::Reply { data },
        record: message.record,
        route_id: message.route_id.clone(),
        direction: message.direction,
    })?;
    registry.unpack(ctx, &reply)
}

/// The strategy table, resolved once at startup.
pub struct MessageTypeRegistry {
    handlers: HashMap<&'static str, Box<dyn MessageTypeHandler>>,
}

impl MessageTypeRegistry {
    /// Registry with every built-in message type.
    pub fn builtin() -> Self {
        let mut registry = Self {
            handlers: HashMap::new(),
        };
        registry.register(Box::new(PostcodeHandler));
        registry.register(Box::new(ContactHandler));
        registry.register(Box::new(SchedulesHandler));
        registry.register(Box::new(WorkItemHandler));
        registry.register(Box::new(OfficeHandler));
        registry.register(Box::new(DailyNoteHandler));
        registry.register(Box::new(OrganisationHandler));
        registry
    }

    /// Add or replace a handler. Extension point for host applications.
    pub fn register(&mut self, handler: Box<dyn MessageTypeHandler>) {
        self.handlers.insert(handler.key(), handler);
    }

    pub fn handler(&self, key: &str) -> Option<&dyn MessageTypeHandler> {
        self.handlers.get(key).map(|h| h.as_ref())
    }

    /// Pack a domain record into a new message wrapped in a new envelope on
    /// the given route, outbound direction.
    pub fn pack(
        &self,
        ctx: &mut EdiContext<'_>,
        record: &DomainRecord,
        key: &str,
        route_id: &str,
    ) -> Result<(Envelope, Message)> {
        let handler = self
            .handler(key)
            .ok_or_else(|| EdiError::UnknownMessageType(key.to_string()))?;
        let body = handler.pack(record)?;
        let message = ctx.messages.create_message(NewMessage {
            name: handler.message_name().to_string(),
            message_type: key.to_string(),
            body,
            record: Some(record.reference()),
            route_id: route_id.to_string(),
            direction: Direction::Out,
        })?;
        let envelope = ctx.messages.create_envelope(NewEnvelope {
            name: handler.envelope_name().to_string(),
            route_id: route_id.to_string(),
            direction: Direction::Out,
            message_ids: vec![message.id],
        })?;
        tracing::debug!(
            message_type = key,
            message = %message.id,
            envelope = %envelope.id,
            "packed outbound message"
        );
        Ok((envelope, message))
    }

    /// Unpack a message through its handler, or through the generic default
    /// when the key is unregistered.
    pub fn unpack(&self, ctx: &mut EdiContext<'_>, message: &Message) -> Result<()> {
        match self.handler(&message.message_type) {
            Some(handler) => handler.unpack(ctx, message),
            None => default_unpack(message),
        }
    }

    /// Fan a parsed response out through the message's handler. Unregistered
    /// keys get the default handling: empty responses pass, anything else is
    /// an unsupported shape.
    pub fn fan_out(
        &self,
        ctx: &mut EdiContext<'_>,
        message: &mut Message,
        res: &Value,
    ) -> Result<()> {
        match self.handler(&message.message_type) {
            Some(handler) => handler.fan_out(self, ctx, message, res),
            None => default_fan_out(&message.message_type, res),
        }
    }

    /// Per-type extra headers for an outbound request.
    pub fn extra_headers(&self, key: &str, headers: &HeaderContext<'_>) -> Vec<(String, String)> {
        match self.handler(key) {
            Some(handler) => handler.extra_headers(headers),
            None => Vec::new(),
        }
    }
}
