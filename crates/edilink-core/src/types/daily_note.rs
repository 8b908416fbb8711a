// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Daily-note registration.
//!
//! The one built-in type with a header hook: the platform wants an
//! assertion header alongside the usual set. The token is a pass-through
//! value from the connection descriptor; issuing it is somebody else's job.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::body::MessageBody;
use crate::error::{EdiError, Result};
use crate::message::Message;
use crate::record::{DomainRecord, DomainStore, RecordKind};
use crate::store::EdiContext;
use crate::types::{
    keys, reply_data, response_is_empty, wrap_response_and_unpack, HeaderContext,
    MessageTypeHandler, MessageTypeRegistry,
};

const PATH: &str = "anteckningar-sok/v1/anteckningar";
const URL_TEMPLATE: &str = "{url}:{port}/{path}?client_id={client}&client_secret={secret}";

const DATE_FORMAT: &str = "%Y-%m-%d";

pub const ASSERTION_HEADER: &str = "X-JWT-Assertion";
pub const NOTE_ID_KEY: &str = "anteckningsId";

pub struct DailyNoteHandler;

impl MessageTypeHandler for DailyNoteHandler {
    fn key(&self) -> &'static str {
        keys::DAILY_NOTE
    }

    fn message_name(&self) -> &'static str {
        "AS daily note"
    }

    fn envelope_name(&self) -> &'static str {
        "AS daily note post"
    }

    fn pack(&self, record: &DomainRecord) -> Result<MessageBody> {
        let note = match record {
            DomainRecord::DailyNote(r) => r,
            other => {
                return Err(EdiError::InvalidRecordKind {
                    expected: RecordKind::DailyNote,
                    actual: other.kind(),
                });
            }
        };
        let mut data = BTreeMap::new();
        data.insert(
            "ansvarigSignatur".to_string(),
            note.author_signature.clone(),
        );
        data.insert("anteckningstext".to_string(), note.text.clone());
        data.insert(
            "datum".to_string(),
            note.note_date.format(DATE_FORMAT).to_string(),
        );
        data.insert("sokandeId".to_string(), note.customer_id.clone());
        Ok(MessageBody::Request {
            base_url: URL_TEMPLATE.replace("{path}", PATH),
            data,
        })
    }

    fn unpack(&self, ctx: &mut EdiContext<'_>, message: &Message) -> Result<()> {
        let Some(data) = reply_data(message) else {
            return Ok(());
        };
        let Some(record) = &message.record else {
            return Ok(());
        };
        let external_id = match data.get(NOTE_ID_KEY) {
            Some(Value::String(s)) => Some(s.clone()),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        };
        if let Some(external_id) = external_id {
            ctx.domain.confirm_daily_note(record, &external_id)?;
        }
        Ok(())
    }

    fn extra_headers(&self, headers: &HeaderContext<'_>) -> Vec<(String, String)> {
        match headers.assertion_token {
            Some(token) => vec![(ASSERTION_HEADER.to_string(), token.to_string())],
            None => {
                tracing::warn!("daily note post without assertion token configured");
                Vec::new()
            }
        }
    }

    fn fan_out(
        &self,
        registry: &MessageTypeRegistry,
        ctx: &mut EdiContext<'_>,
        message: &mut Message,
        res: &Value,
    ) -> Result<()> {
        if response_is_empty(res) {
            return Ok(());
        }
        wrap_response_and_unpack(registry, ctx, message, "AS note reply", res)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::DailyNoteRecord;
    use crate::store::{MemoryDomain, MemoryStore};
    use chrono::NaiveDate;
    use serde_json::json;

    fn note() -> DomainRecord {
        DomainRecord::DailyNote(DailyNoteRecord {
            id: 41,
            customer_id: "19900230-1111".to_string(),
            note_date: NaiveDate::from_ymd_opt(2020, 5, 14).unwrap(),
            text: "Telefonsamtal om planering".to_string(),
            author_signature: "SYS".to_string(),
        })
    }

    #[test]
    fn test_pack_builds_note_payload() {
        let MessageBody::Request { base_url, data } = DailyNoteHandler.pack(&note()).unwrap()
        else {
            panic!("expected request body");
        };
        assert!(base_url.contains("anteckningar-sok/v1/anteckningar"));
        assert_eq!(data.get("anteckningstext").unwrap(), "Telefonsamtal om planering");
        assert_eq!(data.get("datum").unwrap(), "2020-05-14");
        assert_eq!(data.get("sokandeId").unwrap(), "19900230-1111");
        assert_eq!(data.get("ansvarigSignatur").unwrap(), "SYS");
    }

    #[test]
    fn test_assertion_header_comes_from_descriptor() {
        let headers = HeaderContext {
            tracking_id: "t-1",
            assertion_token: Some("jwt-token"),
        };
        let extra = DailyNoteHandler.extra_headers(&headers);
        assert_eq!(
            extra,
            vec![(ASSERTION_HEADER.to_string(), "jwt-token".to_string())]
        );

        let headers = HeaderContext {
            tracking_id: "t-1",
            assertion_token: None,
        };
        assert!(DailyNoteHandler.extra_headers(&headers).is_empty());
    }

    #[test]
    fn test_reply_confirms_note() {
        let registry = MessageTypeRegistry::builtin();
        let mut store = MemoryStore::new();
        let mut domain = MemoryDomain::new();
        let mut ctx = EdiContext::new(&mut store, &mut domain);
        let (_, mut message) = registry
            .pack(&mut ctx, &note(), keys::DAILY_NOTE, "ipf")
            .unwrap();

        registry
            .fan_out(&mut ctx, &mut message, &json!({NOTE_ID_KEY: 77812}))
            .unwrap();
        drop(ctx);

        assert_eq!(domain.confirmed_notes.get(&41), Some(&"77812".to_string()));
    }
}
