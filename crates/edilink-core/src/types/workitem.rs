// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! ACE work-item acknowledgement.
//!
//! The direct state-mutation variant: a successful exchange moves the
//! message and its owning envelope straight to `Received` and marks the
//! linked appointment done. No reply messages are created.

use serde_json::Value;

use crate::body::MessageBody;
use crate::error::{EdiError, Result};
use crate::message::{Message, MessageState};
use crate::record::{DomainRecord, DomainStore, RecordKind};
use crate::store::{EdiContext, MessageStore};
use crate::types::{keys, MessageTypeHandler, MessageTypeRegistry};

const PATH_TEMPLATE: &str = "ais-ace/v1/arenden/{arende_id}";
const URL_TEMPLATE: &str = "{url}:{port}/{path}?client_id={client}&client_secret={secret}";

pub struct WorkItemHandler;

impl MessageTypeHandler for WorkItemHandler {
    fn key(&self) -> &'static str {
        keys::ACE_WORKITEM
    }

    fn message_name(&self) -> &'static str {
        "ACE work item"
    }

    fn envelope_name(&self) -> &'static str {
        "ACE work item"
    }

    fn pack(&self, record: &DomainRecord) -> Result<MessageBody> {
        let workitem = match record {
            DomainRecord::WorkItem(r) => r,
            other => {
                return Err(EdiError::InvalidRecordKind {
                    expected: RecordKind::WorkItem,
                    actual: other.kind(),
                });
            }
        };
        let path = PATH_TEMPLATE.replace(
            "{arende_id}",
            &urlencoding::encode(&workitem.external_id),
        );
        Ok(MessageBody::Url {
            template: URL_TEMPLATE.replace("{path}", &path),
        })
    }

    fn fan_out(
        &self,
        _registry: &MessageTypeRegistry,
        ctx: &mut EdiContext<'_>,
        message: &mut Message,
        _res: &Value,
    ) -> Result<()> {
        message.transition(MessageState::Received)?;
        ctx.messages.update_message(message)?;

        if let Some(mut envelope) = ctx.messages.envelope_of(message.id)? {
            envelope.transition(MessageState::Received)?;
            ctx.messages.update_envelope(&envelope)?;
        }

        if let Some(record) = &message.record {
            ctx.domain.complete_workitem_appointment(record)?;
        }
        Ok(())
    }
}
