// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Appointment schedule retrieval.
//!
//! Outbound: a lookup URL for bookable slots of one competence over a date
//! range. The reply is a list of competence/day groupings, each holding a
//! list of slots; fan-out turns every slot into its own reply message and
//! unpacks it, then deactivates the originating request record.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::body::MessageBody;
use crate::error::{EdiError, Result};
use crate::message::{Message, NewMessage};
use crate::record::{DomainRecord, DomainStore, RecordKind};
use crate::store::{EdiContext, MessageStore};
use crate::types::{
    keys, reply_data, response_is_empty, MessageTypeHandler, MessageTypeRegistry,
};

const PATH_TEMPLATE: &str = "af-schedule/v1/schedules/competence/{kompetens_id}";
const URL_TEMPLATE: &str =
    "{url}:{port}/{path}?fran={fran}&till={till}&client_id={client}&client_secret={secret}";

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Wire key carrying the resolved local appointment type in a slot reply.
pub const TYPE_ID_KEY: &str = "type_id";

pub struct SchedulesHandler;

impl SchedulesHandler {
    fn competence_id(grouping: &Value) -> Option<i64> {
        let id = grouping.get("competence")?.get("id")?;
        id.as_i64().or_else(|| id.as_str()?.parse().ok())
    }
}

impl MessageTypeHandler for SchedulesHandler {
    fn key(&self) -> &'static str {
        keys::SCHEDULES
    }

    fn message_name(&self) -> &'static str {
        "appointment schedules request"
    }

    fn envelope_name(&self) -> &'static str {
        "appointment schedules request"
    }

    fn pack(&self, record: &DomainRecord) -> Result<MessageBody> {
        let request = match record {
            DomainRecord::ScheduleRequest(r) => r,
            other => {
                return Err(EdiError::InvalidRecordKind {
                    expected: RecordKind::ScheduleRequest,
                    actual: other.kind(),
                });
            }
        };
        let path = PATH_TEMPLATE.replace("{kompetens_id}", &request.competence_id.to_string());
        let template = URL_TEMPLATE
            .replace("{path}", &path)
            .replace("{fran}", &request.from_date.format(DATE_FORMAT).to_string())
            .replace("{till}", &request.to_date.format(DATE_FORMAT).to_string());
        Ok(MessageBody::Url { template })
    }

    /// A slot reply: apply the slot as a new domain fact. The bound record is
    /// never mutated here.
    fn unpack(&self, ctx: &mut EdiContext<'_>, message: &Message) -> Result<()> {
        let Some(data) = reply_data(message) else {
            return Ok(());
        };
        let Some(type_id) = data.get(TYPE_ID_KEY).and_then(Value::as_i64) else {
            return Ok(());
        };
        let mut slot = data.clone();
        slot.remove(TYPE_ID_KEY);
        ctx.domain.apply_schedule_slot(type_id, &slot)
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
        let Value::Array(groupings) = res else {
            return Err(EdiError::UnsupportedResponseShape {
                message_type: self.key().to_string(),
            });
        };

        for grouping in groupings {
            let Some(competence_id) = Self::competence_id(grouping) else {
                tracing::warn!(message = %message.id, "schedule grouping without competence id, skipping");
                continue;
            };
            let Some(type_id) = ctx.domain.appointment_type_by_competence(competence_id)? else {
                tracing::warn!(
                    competence_id,
                    "no local appointment type for competence, skipping grouping"
                );
                continue;
            };
            let slots = grouping
                .get("schedules")
                .and_then(Value::as_array)
                .cloned()
                .unwrap_or_default();
            for slot in slots {
                let Value::Object(fields) = slot else {
                    tracing::warn!(competence_id, "malformed schedule slot, skipping");
                    continue;
                };
                let mut data: BTreeMap<String, Value> = fields.into_iter().collect();
                data.insert(TYPE_ID_KEY.to_string(), Value::from(type_id));
                let reply = ctx.messages.create_message(NewMessage {
                    name: "Appointment schedule reply".to_string(),
                    message_type: self.key().to_string(),
                    body: MessageBody::Reply { data },
                    record: None,
                    route_id: message.route_id.clone(),
                    direction: message.direction,
                })?;
                registry.unpack(ctx, &reply)?;
            }
        }

        // the request record served its purpose, exactly one deactivation
        if let Some(record) = &message.record {
            ctx.domain.deactivate(record)?;
        }
        Ok(())
    }
}
