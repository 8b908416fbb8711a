// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! URL template substitution.
//!
//! Pack-time placeholders (path segments, query values) are already filled
//! in by the message-type handlers; what remains at transport time are the
//! connection placeholders `{url}`, `{port}`, `{client}` and `{secret}`.

use crate::config::IpfConfig;

/// Fill the connection placeholders of a URL template.
pub fn resolve(template: &str, config: &IpfConfig) -> String {
    template
        .replace("{url}", &config.host)
        .replace("{port}", &config.port)
        .replace("{client}", &config.client_id)
        .replace("{secret}", &config.client_secret)
}
