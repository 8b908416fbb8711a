// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Route dispatcher: drives outbound envelopes through the transport
//! session and owns the envelope-scoped failure contract.

use std::sync::{Mutex, PoisonError};

use tracing::{debug, error, info, instrument};

use edilink_core::{
    EdiContext, EnvelopeId, MessageState, MessageStore, MessageTypeRegistry, Result,
};

use crate::config::IpfConfig;
use crate::session::IpfSession;

/// A configured IPF route: destination, credentials and dispatch entry
/// points.
///
/// The advisory lock serializes dispatch per route; records are only ever
/// mutated by the thread holding it.
pub struct IpfRoute {
    id: String,
    config: IpfConfig,
    lock: Mutex<()>,
}

impl IpfRoute {
    pub fn new(id: impl Into<String>, config: IpfConfig) -> Self {
        Self {
            id: id.into(),
            config,
            lock: Mutex::new(()),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn config(&self) -> &IpfConfig {
        &self.config
    }

    /// Dispatch outbound envelopes in order.
    ///
    /// The connection descriptor is checked once, before any network call;
    /// an incomplete descriptor is returned as an error. Failures inside the
    /// loop are envelope-scoped: the current envelope is canceled with a
    /// cascade to all of its messages, dispatch stops, and envelopes already
    /// sent stay sent. Those failures surface as a logged error plus
    /// terminal states, not as a returned error.
    #[instrument(skip(self, ctx, registry, envelopes), fields(route = %self.id))]
    pub fn run_out(
        &self,
        ctx: &mut EdiContext<'_>,
        registry: &MessageTypeRegistry,
        envelopes: &[EnvelopeId],
    ) -> Result<()> {
        self.config.validate()?;
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let session = IpfSession::new(&self.config);

        for envelope_id in envelopes {
            if let Err(e) = self.send_envelope(ctx, registry, &session, *envelope_id) {
                let envelope_name = ctx
                    .messages
                    .envelope(*envelope_id)
                    .map(|envelope| envelope.name)
                    .unwrap_or_else(|_| envelope_id.to_string());
                error!(envelope = %envelope_name, error = %e, "error when sending envelope");
                if let Err(cancel_error) = ctx.cancel_envelope(*envelope_id) {
                    error!(envelope = %envelope_name, error = %cancel_error, "envelope cancellation failed");
                }
                break;
            }
        }
        Ok(())
    }

    fn send_envelope(
        &self,
        ctx: &mut EdiContext<'_>,
        registry: &MessageTypeRegistry,
        session: &IpfSession<'_>,
        envelope_id: EnvelopeId,
    ) -> Result<()> {
        let envelope = ctx.messages.envelope(envelope_id)?;
        debug!(envelope = %envelope.name, messages = envelope.message_ids.len(), "sending envelope");

        for message_id in &envelope.message_ids {
            let mut message = ctx.messages.message(*message_id)?;
            let outcome = session.get(registry, ctx, &mut message);
            // tracking id and fan-out transitions are persisted either way
            ctx.messages.update_message(&message)?;
            outcome?;
            if message.state == MessageState::Draft {
                message.transition(MessageState::Sent)?;
                ctx.messages.update_message(&message)?;
            }
        }

        // reload: a direct-ack fan-out may have moved the envelope already
        let mut envelope = ctx.messages.envelope(envelope_id)?;
        if envelope.state == MessageState::Draft {
            envelope.transition(MessageState::Sent)?;
            ctx.messages.update_envelope(&envelope)?;
        }
        info!(envelope = %envelope.name, state = %envelope.state, "envelope dispatched");
        Ok(())
    }

    /// Inbound polling entry point.
    ///
    /// The IPF integration has no inbound polling routes today; this is the
    /// extension hook with the same fail-closed contract as `run_out`.
    #[instrument(skip(self, _ctx), fields(route = %self.id))]
    pub fn run_in(&self, _ctx: &mut EdiContext<'_>) -> Result<Vec<EnvelopeId>> {
        self.config.validate()?;
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        debug!("inbound polling is not implemented for IPF routes");
        Ok(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use edilink_core::{MemoryDomain, MemoryStore};

    #[test]
    fn test_run_out_fails_closed_on_incomplete_descriptor() {
        let route = IpfRoute::new("ipf", IpfConfig::new().with_host("https://x"));
        let mut store = MemoryStore::new();
        let mut domain = MemoryDomain::new();
        let mut ctx = EdiContext::new(&mut store, &mut domain);
        let registry = MessageTypeRegistry::builtin();

        let err = route.run_out(&mut ctx, &registry, &[]).unwrap_err();
        assert!(matches!(
            err,
            edilink_core::EdiError::MissingConnectionConfig { .. }
        ));
    }

    #[test]
    fn test_run_in_is_a_placeholder() {
        let config = IpfConfig::new()
            .with_host("https://ipf.example.com")
            .with_port("443")
            .with_credentials("c", "s")
            .with_environment("U1")
            .with_system_id("SYS");
        let route = IpfRoute::new("ipf", config);
        let mut store = MemoryStore::new();
        let mut domain = MemoryDomain::new();
        let mut ctx = EdiContext::new(&mut store, &mut domain);
        assert!(route.run_in(&mut ctx).unwrap().is_empty());
    }
}
