// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! KROM postcode validity check.
//!
//! Outbound: a parameterized lookup URL, no payload. The reply is a single
//! flag telling whether the jobseeker's postcode lies in a match area.

use serde_json::Value;

use crate::body::MessageBody;
use crate::error::{EdiError, Result};
use crate::message::Message;
use crate::record::{DomainRecord, DomainStore};
use crate::store::EdiContext;
use crate::types::{
    keys, reply_data, wrap_response_and_unpack, MessageTypeHandler, MessageTypeRegistry,
};

const PATH: &str = "ais-bos-regelverk/api/Krom/ArPostnummerGiltigForKrom";
const URL_TEMPLATE: &str =
    "{url}:{port}/{path}?postnummer={postnummer}&client_id={client}&client_secret={secret}";

/// Wire key carrying the validity flag in the reply.
pub const MATCH_AREA_KEY: &str = "ArPostnummerGiltigForKrom";

pub struct PostcodeHandler;

impl MessageTypeHandler for PostcodeHandler {
    fn key(&self) -> &'static str {
        keys::POSTCODE
    }

    fn message_name(&self) -> &'static str {
        "KROM postcode check"
    }

    fn envelope_name(&self) -> &'static str {
        "KROM postcode request"
    }

    fn pack(&self, record: &DomainRecord) -> Result<MessageBody> {
        let jobseeker = match record {
            DomainRecord::Jobseeker(r) => r,
            other => {
                return Err(EdiError::InvalidRecordKind {
                    expected: crate::record::RecordKind::Jobseeker,
                    actual: other.kind(),
                });
            }
        };
        let template = URL_TEMPLATE
            .replace("{path}", PATH)
            .replace(
                "{postnummer}",
                &urlencoding::encode(&jobseeker.postal_code),
            );
        Ok(MessageBody::Url { template })
    }

    fn unpack(&self, ctx: &mut EdiContext<'_>, message: &Message) -> Result<()> {
        let Some(data) = reply_data(message) else {
            return Ok(());
        };
        // Only a true flag is written back; absent or false is a no-op.
        if let Some(record) = &message.record
            && data.get(MATCH_AREA_KEY).and_then(Value::as_bool) == Some(true)
        {
            ctx.domain.set_match_area(record, true)?;
        }
        Ok(())
    }

    fn fan_out(
        &self,
        registry: &MessageTypeRegistry,
        ctx: &mut EdiContext<'_>,
        message: &mut Message,
        res: &Value,
    ) -> Result<()> {
        if crate::types::response_is_empty(res) {
            return Ok(());
        }
        wrap_response_and_unpack(registry, ctx, message, "KROM postcode reply", res)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{JobseekerRecord, WorkItemRecord};
    use crate::store::{MemoryDomain, MemoryStore};
    use serde_json::json;

    fn jobseeker() -> DomainRecord {
        DomainRecord::Jobseeker(JobseekerRecord {
            id: 11,
            customer_id: "19790101-1234".to_string(),
            postal_code: "223 50".to_string(),
            ..Default::default()
        })
    }

    #[test]
    fn test_pack_builds_lookup_url() {
        let body = PostcodeHandler.pack(&jobseeker()).unwrap();
        match body {
            MessageBody::Url { template } => {
                assert!(template.contains("ais-bos-regelverk/api/Krom/ArPostnummerGiltigForKrom"));
                assert!(template.contains("postnummer=223%2050"));
                // transport placeholders stay for the session to fill in
                assert!(template.starts_with("{url}:{port}/"));
                assert!(template.contains("client_id={client}"));
            }
            other => panic!("unexpected body: {:?}", other),
        }
    }

    #[test]
    fn test_pack_rejects_wrong_record_kind() {
        let record = DomainRecord::WorkItem(WorkItemRecord {
            id: 1,
            external_id: "wi-1".to_string(),
        });
        let err = PostcodeHandler.pack(&record).unwrap_err();
        assert!(matches!(err, EdiError::InvalidRecordKind { .. }));
    }

    #[test]
    fn test_reply_sets_match_area_flag() {
        let registry = MessageTypeRegistry::builtin();
        let mut store = MemoryStore::new();
        let mut domain = MemoryDomain::new();
        let mut ctx = EdiContext::new(&mut store, &mut domain);
        let (_, mut message) = registry
            .pack(&mut ctx, &jobseeker(), keys::POSTCODE, "ipf")
            .unwrap();

        registry
            .fan_out(&mut ctx, &mut message, &json!({MATCH_AREA_KEY: true}))
            .unwrap();
        drop(ctx);

        assert_eq!(domain.match_areas.get(&11), Some(&true));
        // reply message was created alongside the request
        assert_eq!(store.messages_of_type(keys::POSTCODE).len(), 2);
    }

    #[test]
    fn test_false_or_absent_flag_is_noop() {
        let registry = MessageTypeRegistry::builtin();
        let mut store = MemoryStore::new();
        let mut domain = MemoryDomain::new();
        let mut ctx = EdiContext::new(&mut store, &mut domain);
        let (_, mut message) = registry
            .pack(&mut ctx, &jobseeker(), keys::POSTCODE, "ipf")
            .unwrap();

        registry
            .fan_out(&mut ctx, &mut message, &json!({MATCH_AREA_KEY: false}))
            .unwrap();
        registry
            .fan_out(&mut ctx, &mut message, &json!({"somethingElse": 1}))
            .unwrap();
        drop(ctx);

        assert!(domain.match_areas.is_empty());
    }
}
