// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Blocking HTTPS session against the IPF platform.
//!
//! One session per dispatch call: it owns the `ureq` agent (timeouts, TLS
//! policy) and turns one message into exactly one request, then fans the
//! parsed response back out through the message-type registry.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, instrument};

use edilink_core::{
    EdiContext, EdiError, HeaderContext, Message, MessageBody, MessageTypeRegistry, Result,
};

use crate::config::IpfConfig;
use crate::headers;
use crate::url;

/// A connected transport adapter for one IPF route.
pub struct IpfSession<'a> {
    agent: ureq::Agent,
    config: &'a IpfConfig,
}

impl<'a> IpfSession<'a> {
    /// Build the agent for a dispatch run.
    pub fn new(config: &'a IpfConfig) -> Self {
        let mut builder = ureq::AgentBuilder::new()
            .timeout_connect(config.connect_timeout)
            .timeout(config.request_timeout);
        if !config.verify_server_certificate {
            let tls = rustls::ClientConfig::builder()
                .dangerous()
                .with_custom_certificate_verifier(Arc::new(SkipServerVerification))
                .with_no_client_auth();
            builder = builder.tls_config(Arc::new(tls));
        }
        Self {
            agent: builder.build(),
            config,
        }
    }

    /// Perform the exchange for one message with GET semantics (the platform
    /// accepts a JSON payload on GET).
    pub fn get(
        &self,
        registry: &MessageTypeRegistry,
        ctx: &mut EdiContext<'_>,
        message: &mut Message,
    ) -> Result<()> {
        self.exchange("GET", registry, ctx, message)
    }

    /// Perform the exchange for one message with POST semantics.
    pub fn post(
        &self,
        registry: &MessageTypeRegistry,
        ctx: &mut EdiContext<'_>,
        message: &mut Message,
    ) -> Result<()> {
        self.exchange("POST", registry, ctx, message)
    }

    #[instrument(skip(self, registry, ctx, message), fields(message = %message.id, message_type = %message.message_type))]
    fn exchange(
        &self,
        method: &str,
        registry: &MessageTypeRegistry,
        ctx: &mut EdiContext<'_>,
        message: &mut Message,
    ) -> Result<()> {
        let tracking_id = headers::generate_tracking_id();
        message.tracking_id = Some(tracking_id.clone());

        let mut request_headers = headers::base_headers(self.config, &tracking_id);
        request_headers.extend(registry.extra_headers(
            &message.message_type,
            &HeaderContext {
                tracking_id: &tracking_id,
                assertion_token: self.config.assertion_token.as_deref(),
            },
        ));

        let (request_url, payload) = match &message.body {
            MessageBody::Request { base_url, data } => (
                url::resolve(base_url, self.config),
                Some(serde_json::to_value(data)?),
            ),
            MessageBody::Url { template } => (url::resolve(template, self.config), None),
            MessageBody::Reply { .. } => {
                return Err(EdiError::MalformedMessageBody(
                    "reply bodies cannot be transported".to_string(),
                ));
            }
        };

        debug!(tracking_id = %tracking_id, "sending IPF request");
        let mut request = self.agent.request(method, &request_url);
        for (name, value) in &request_headers {
            request = request.set(name, value);
        }
        let call_result = match &payload {
            Some(data) => {
                request = request.set("Content-Type", "application/json");
                request.send_json(data)
            }
            None => request.call(),
        };

        let response = call_result.map_err(|error| match error {
            ureq::Error::Status(code, _) => {
                EdiError::Transport(format!("HTTP {code} from {request_url}"))
            }
            ureq::Error::Transport(transport) => EdiError::Transport(transport.to_string()),
        })?;

        let text = response
            .into_string()
            .map_err(|error| EdiError::Transport(format!("reading response body: {error}")))?;
        let res = parse_response(&text, &message.message_type)?;

        registry.fan_out(ctx, message, &res)
    }
}

/// Parse a response body: blank means empty, anything else must be JSON.
fn parse_response(text: &str, message_type: &str) -> Result<Value> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(trimmed).map_err(|_| EdiError::UnsupportedResponseShape {
        message_type: message_type.to_string(),
    })
}

/// Certificate verifier that skips all verification (development only!).
#[derive(Debug)]
struct SkipServerVerification;

impl rustls::client::danger::ServerCertVerifier for SkipServerVerification {
    fn verify_server_cert(
        &self,
        _end_entity: &rustls::pki_types::CertificateDer<'_>,
        _intermediates: &[rustls::pki_types::CertificateDer<'_>],
        _server_name: &rustls::pki_types::ServerName<'_>,
        _ocsp_response: &[u8],
        _now: rustls::pki_types::UnixTime,
    ) -> std::result::Result<rustls::client::danger::ServerCertVerified, rustls::Error> {
        Ok(rustls::client::danger::ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        _message: &[u8],
        _cert: &rustls::pki_types::CertificateDer<'_>,
        _dss: &rustls::DigitallySignedStruct,
    ) -> std::result::Result<rustls::client::danger::HandshakeSignatureValid, rustls::Error> {
        Ok(rustls::client::danger::HandshakeSignatureValid::assertion())
    }

    fn verify_tls13_signature(
        &self,
        _message: &[u8],
        _cert: &rustls::pki_types::CertificateDer<'_>,
        _dss: &rustls::DigitallySignedStruct,
    ) -> std::result::Result<rustls::client::danger::HandshakeSignatureValid, rustls::Error> {
        Ok(rustls::client::danger::HandshakeSignatureValid::assertion())
    }

    fn supported_verify_schemes(&self) -> Vec<rustls::SignatureScheme> {
        vec![
            rustls::SignatureScheme::RSA_PKCS1_SHA256,
            rustls::SignatureScheme::RSA_PKCS1_SHA384,
            rustls::SignatureScheme::RSA_PKCS1_SHA512,
            rustls::SignatureScheme::ECDSA_NISTP256_SHA256,
            rustls::SignatureScheme::ECDSA_NISTP384_SHA384,
            rustls::SignatureScheme::ECDSA_NISTP521_SHA512,
            rustls::SignatureScheme::RSA_PSS_SHA256,
            rustls::SignatureScheme::RSA_PSS_SHA384,
            rustls::SignatureScheme::RSA_PSS_SHA512,
            rustls::SignatureScheme::ED25519,
        ]
    }
}
