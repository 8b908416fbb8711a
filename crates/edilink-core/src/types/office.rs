// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Responsible-office lookup for a jobseeker.

use serde_json::Value;

use crate::body::MessageBody;
use crate::error::{EdiError, Result};
use crate::message::Message;
use crate::record::{DomainRecord, DomainStore, RecordKind};
use crate::store::EdiContext;
use crate::types::{
    keys, reply_data, response_is_empty, wrap_response_and_unpack, MessageTypeHandler,
    MessageTypeRegistry,
};

const PATH_TEMPLATE: &str = "ais-f-arbetssokande/v1/arbetssokande/{sokande_id}/kontor";
const URL_TEMPLATE: &str = "{url}:{port}/{path}?client_id={client}&client_secret={secret}";

pub const OFFICE_CODE_KEY: &str = "kontorsKod";
pub const OFFICE_NAME_KEY: &str = "kontorsNamn";

pub struct OfficeHandler;

impl MessageTypeHandler for OfficeHandler {
    fn key(&self) -> &'static str {
        keys::OFFICE
    }

    fn message_name(&self) -> &'static str {
        "AS kontor lookup"
    }

    fn envelope_name(&self) -> &'static str {
        "AS kontor request"
    }

    fn pack(&self, record: &DomainRecord) -> Result<MessageBody> {
        let jobseeker = match record {
            DomainRecord::Jobseeker(r) => r,
            other => {
                return Err(EdiError::InvalidRecordKind {
                    expected: RecordKind::Jobseeker,
                    actual: other.kind(),
                });
            }
        };
        let path = PATH_TEMPLATE.replace(
            "{sokande_id}",
            &urlencoding::encode(&jobseeker.customer_id),
        );
        Ok(MessageBody::Url {
            template: URL_TEMPLATE.replace("{path}", &path),
        })
    }

    fn unpack(&self, ctx: &mut EdiContext<'_>, message: &Message) -> Result<()> {
        let Some(data) = reply_data(message) else {
            return Ok(());
        };
        let Some(record) = &message.record else {
            return Ok(());
        };
        if let Some(code) = data.get(OFFICE_CODE_KEY).and_then(Value::as_str) {
            let name = data
                .get(OFFICE_NAME_KEY)
                .and_then(Value::as_str)
                .unwrap_or_default();
            ctx.domain.set_office(record, code, name)?;
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
        if response_is_empty(res) {
            return Ok(());
        }
        wrap_response_and_unpack(registry, ctx, message, "AS kontor reply", res)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::JobseekerRecord;
    use crate::store::{MemoryDomain, MemoryStore};
    use serde_json::json;

    fn jobseeker() -> DomainRecord {
        DomainRecord::Jobseeker(JobseekerRecord {
            id: 8,
            customer_id: "19750505-0000".to_string(),
            ..Default::default()
        })
    }

    #[test]
    fn test_pack_builds_office_url() {
        let MessageBody::Url { template } = OfficeHandler.pack(&jobseeker()).unwrap() else {
            panic!("expected url body");
        };
        assert!(template.contains("ais-f-arbetssokande/v1/arbetssokande/19750505-0000/kontor"));
    }

    #[test]
    fn test_reply_assigns_office() {
        let registry = MessageTypeRegistry::builtin();
        let mut store = MemoryStore::new();
        let mut domain = MemoryDomain::new();
        let mut ctx = EdiContext::new(&mut store, &mut domain);
        let (_, mut message) = registry
            .pack(&mut ctx, &jobseeker(), keys::OFFICE, "ipf")
            .unwrap();

        registry
            .fan_out(
                &mut ctx,
                &mut message,
                &json!({OFFICE_CODE_KEY: "0248", OFFICE_NAME_KEY: "Lund"}),
            )
            .unwrap();
        drop(ctx);

        assert_eq!(
            domain.offices.get(&8),
            Some(&("0248".to_string(), "Lund".to_string()))
        );
    }

    #[test]
    fn test_reply_without_office_code_is_noop() {
        let registry = MessageTypeRegistry::builtin();
        let mut store = MemoryStore::new();
        let mut domain = MemoryDomain::new();
        let mut ctx = EdiContext::new(&mut store, &mut domain);
        let (_, mut message) = registry
            .pack(&mut ctx, &jobseeker(), keys::OFFICE, "ipf")
            .unwrap();

        registry
            .fan_out(&mut ctx, &mut message, &json!({"annat": 1}))
            .unwrap();
        drop(ctx);

        assert!(domain.offices.is_empty());
    }
}
