// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Employer organisation lookup.

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

const PATH_TEMPLATE: &str = "ag-profil/v1/organisationer/{orgnummer}";
const URL_TEMPLATE: &str = "{url}:{port}/{path}?client_id={client}&client_secret={secret}";

pub const ORG_NAME_KEY: &str = "namn";

pub struct OrganisationHandler;

impl MessageTypeHandler for OrganisationHandler {
    fn key(&self) -> &'static str {
        keys::ORGANISATION
    }

    fn message_name(&self) -> &'static str {
        "AG organisation lookup"
    }

    fn envelope_name(&self) -> &'static str {
        "AG organisation request"
    }

    fn pack(&self, record: &DomainRecord) -> Result<MessageBody> {
        let employer = match record {
            DomainRecord::Employer(r) => r,
            other => {
                return Err(EdiError::InvalidRecordKind {
                    expected: RecordKind::Employer,
                    actual: other.kind(),
                });
            }
        };
        let path = PATH_TEMPLATE.replace(
            "{orgnummer}",
            &urlencoding::encode(&employer.org_number),
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
        if let Some(name) = data.get(ORG_NAME_KEY).and_then(Value::as_str) {
            ctx.domain.set_organisation_name(record, name)?;
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
        wrap_response_and_unpack(registry, ctx, message, "AG org reply", res)
    }
}
