// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Jobseeker contact update (TRASK).
//!
//! Outbound: a JSON payload with the last/next contact fields. The wire
//! contract requires every key present; unset record fields go out as empty
//! strings. The reply echoes the payload and carries no new facts, so unpack
//! applies nothing.

use std::collections::BTreeMap;

use crate::body::MessageBody;
use crate::error::{EdiError, Result};
use crate::message::Message;
use crate::record::{DomainRecord, JobseekerRecord, RecordKind};
use crate::store::EdiContext;
use crate::types::{keys, MessageTypeHandler};

const URL_TEMPLATE: &str = "{url}:{port}/{path}?client_id={client}&client_secret={secret}";
const PATH_TEMPLATE: &str = "ais-f-arbetssokande/v2/kontakt/{sokande_id}";

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M";

fn contact_data(jobseeker: &JobseekerRecord) -> BTreeMap<String, String> {
    let mut data = BTreeMap::new();
    data.insert(
        "senasteKontaktTyp".to_string(),
        jobseeker.last_contact_type.clone().unwrap_or_default(),
    );
    data.insert(
        "senasteKontaktDatum".to_string(),
        jobseeker
            .last_contact_date
            .map(|d| d.format(DATE_FORMAT).to_string())
            .unwrap_or_default(),
    );
    data.insert(
        "nastaKontaktTyper".to_string(),
        jobseeker
            .next_contact_types
            .as_ref()
            .map(|t| format!("[{t}]"))
            .unwrap_or_default(),
    );
    data.insert(
        "nastaKontaktDatum".to_string(),
        jobseeker
            .next_contact_date
            .map(|d| d.format(DATE_FORMAT).to_string())
            .unwrap_or_default(),
    );
    data.insert(
        "nastaKontaktTid".to_string(),
        jobseeker
            .next_contact_time
            .map(|t| t.format(TIME_FORMAT).to_string())
            .unwrap_or_default(),
    );
    data
}

pub struct ContactHandler;

impl MessageTypeHandler for ContactHandler {
    fn key(&self) -> &'static str {
        keys::CONTACT
    }

    fn message_name(&self) -> &'static str {
        "asok contact update"
    }

    fn envelope_name(&self) -> &'static str {
        "asok contact update"
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
        Ok(MessageBody::Request {
            base_url: URL_TEMPLATE.replace("{path}", &path),
            data: contact_data(jobseeker),
        })
    }

    // The platform echoes the update back; there is nothing to write to the
    // record, only the body decode to prove.
    fn unpack(&self, _ctx: &mut EdiContext<'_>, message: &Message) -> Result<()> {
        crate::types::default_unpack(message)
    }
}
