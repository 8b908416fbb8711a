// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! edilink-core: EDI message model and pack/unpack framework.
//!
//! The model is two-level: [`message::Message`] is the unit of payload,
//! [`envelope::Envelope`] the transactional unit of dispatch. Per-type
//! behavior (pack, unpack, header hook, response fan-out) lives in the
//! [`types::MessageTypeRegistry`] strategy table. Domain records and
//! persistence are collaborator traits ([`record::DomainStore`],
//! [`store::MessageStore`]); the transport itself lives in `edilink-ipf`.

pub mod body;
pub mod envelope;
pub mod error;
pub mod message;
pub mod record;
pub mod store;
pub mod types;

pub use body::MessageBody;
pub use envelope::{Envelope, EnvelopeId, NewEnvelope};
pub use error::{EdiError, Result};
pub use message::{Direction, Message, MessageId, MessageState, NewMessage};
pub use record::{
    DailyNoteRecord, DomainRecord, DomainStore, EmployerRecord, JobseekerRecord, RecordKind,
    RecordRef, ScheduleRequestRecord, WorkItemRecord,
};
pub use store::{EdiContext, MemoryDomain, MemoryStore, MessageStore};
pub use types::{HeaderContext, MessageTypeHandler, MessageTypeRegistry};
