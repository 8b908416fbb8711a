// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Domain-record collaborator interfaces.
//!
//! The integration layer never owns domain records. Pack reads the fields a
//! message type consumes from a snapshot struct; unpack and fan-out write
//! back through [`DomainStore`]. Everything else about the records (storage,
//! lifecycle, access control) belongs to the host application.

use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;

/// Entity kinds a message can be bound to.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RecordKind {
    Jobseeker,
    ScheduleRequest,
    WorkItem,
    DailyNote,
    Employer,
}

/// Weak reference to a domain record: id plus kind, never ownership.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordRef {
    pub kind: RecordKind,
    pub id: i64,
}

/// Snapshot of a jobseeker (partner) record, the fields the wire contract
/// consumes at pack time.
#[derive(Debug, Clone, Default)]
pub struct JobseekerRecord {
    pub id: i64,
    /// External subject identifier used for path substitution.
    pub customer_id: String,
    pub postal_code: String,
    /// Contact type codes: B, T, E, P or I.
    pub last_contact_type: Option<String>,
    pub last_contact_date: Option<NaiveDate>,
    pub next_contact_types: Option<String>,
    pub next_contact_date: Option<NaiveDate>,
    pub next_contact_time: Option<NaiveTime>,
}

/// Snapshot of an appointment-schedule request record.
#[derive(Debug, Clone)]
pub struct ScheduleRequestRecord {
    pub id: i64,
    /// External competence identifier on the remote platform.
    pub competence_id: i64,
    pub from_date: NaiveDate,
    pub to_date: NaiveDate,
}

/// Snapshot of an ACE work item.
#[derive(Debug, Clone)]
pub struct WorkItemRecord {
    pub id: i64,
    pub external_id: String,
}

/// Snapshot of a daily note awaiting registration.
#[derive(Debug, Clone)]
pub struct DailyNoteRecord {
    pub id: i64,
    pub customer_id: String,
    pub note_date: NaiveDate,
    pub text: String,
    /// Signature of the responsible officer.
    pub author_signature: String,
}

/// Snapshot of an employer organisation record.
#[derive(Debug, Clone)]
pub struct EmployerRecord {
    pub id: i64,
    pub org_number: String,
}

/// A domain record handed to `pack`, one variant per entity kind.
#[derive(Debug, Clone)]
pub enum DomainRecord {
    Jobseeker(JobseekerRecord),
    ScheduleRequest(ScheduleRequestRecord),
    WorkItem(WorkItemRecord),
    DailyNote(DailyNoteRecord),
    Employer(EmployerRecord),
}

impl DomainRecord {
    pub fn kind(&self) -> RecordKind {
        match self {
            Self::Jobseeker(_) => RecordKind::Jobseeker,
            Self::ScheduleRequest(_) => RecordKind::ScheduleRequest,
            Self::WorkItem(_) => RecordKind::WorkItem,
            Self::DailyNote(_) => RecordKind::DailyNote,
            Self::Employer(_) => RecordKind::Employer,
        }
    }

    pub fn reference(&self) -> RecordRef {
        let id = match self {
            Self::Jobseeker(r) => r.id,
            Self::ScheduleRequest(r) => r.id,
            Self::WorkItem(r) => r.id,
            Self::DailyNote(r) => r.id,
            Self::Employer(r) => r.id,
        };
        RecordRef {
            kind: self.kind(),
            id,
        }
    }
}

/// Write-side collaborator for unpack and fan-out effects.
///
/// Implementations are expected to be durable; the core calls them and moves
/// on, it never re-reads to double-check a write.
pub trait DomainStore {
    /// Set the match-area flag on a jobseeker after a postcode check.
    fn set_match_area(&mut self, record: &RecordRef, valid: bool) -> Result<()>;

    /// Assign the responsible office to a jobseeker.
    fn set_office(&mut self, record: &RecordRef, code: &str, name: &str) -> Result<()>;

    /// Record the external id the platform assigned to a registered note.
    fn confirm_daily_note(&mut self, record: &RecordRef, external_id: &str) -> Result<()>;

    /// Update an employer record with the organisation name on file.
    fn set_organisation_name(&mut self, record: &RecordRef, name: &str) -> Result<()>;

    /// Resolve a local appointment type from the platform's competence id.
    fn appointment_type_by_competence(&self, competence_id: i64) -> Result<Option<i64>>;

    /// Apply one received schedule slot as a new domain fact.
    fn apply_schedule_slot(
        &mut self,
        appointment_type: i64,
        slot: &BTreeMap<String, Value>,
    ) -> Result<()>;

    /// Deactivate a record after its request reached terminal success.
    fn deactivate(&mut self, record: &RecordRef) -> Result<()>;

    /// Mark the appointment linked to a work item as done.
    fn complete_workitem_appointment(&mut self, workitem: &RecordRef) -> Result<()>;
}
