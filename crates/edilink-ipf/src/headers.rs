// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Request headers and tracking ids.

use uuid::Uuid;

use crate::config::IpfConfig;

pub const HEADER_ENVIRONMENT: &str = "AF-Environment";
pub const HEADER_SYSTEM_ID: &str = "AF-SystemId";
pub const HEADER_TRACKING_ID: &str = "AF-TrackingId";
pub const HEADER_END_USER_ID: &str = "AF-EndUserId";

/// Fixed end-user id the platform expects from this system.
pub const END_USER_ID: &str = "AFCRM";

/// A fresh correlation id, unique per transport attempt.
pub fn generate_tracking_id() -> String {
    Uuid::new_v4().to_string()
}

/// The base header set every request carries. Per-type hook headers are
/// appended after these and never replace them.
pub fn base_headers(config: &IpfConfig, tracking_id: &str) -> Vec<(String, String)> {
    vec![
        (HEADER_ENVIRONMENT.to_string(), config.environment.clone()),
        (HEADER_SYSTEM_ID.to_string(), config.system_id.clone()),
        (HEADER_TRACKING_ID.to_string(), tracking_id.to_string()),
        (HEADER_END_USER_ID.to_string(), END_USER_ID.to_string()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracking_ids_are_unique_uuids() {
        let a = generate_tracking_id();
        let b = generate_tracking_id();
        assert_ne!(a, b);
        assert!(Uuid::parse_str(&a).is_ok());
    }

    #[test]
    fn test_base_headers_carry_descriptor_values() {
        let config = IpfConfig::new()
            .with_environment("U1")
            .with_system_id("AF-SYSTEM");
        let headers = base_headers(&config, "tracking-1");
        assert_eq!(
            headers,
            vec![
                ("AF-Environment".to_string(), "U1".to_string()),
                ("AF-SystemId".to_string(), "AF-SYSTEM".to_string()),
                ("AF-TrackingId".to_string(), "tracking-1".to_string()),
                ("AF-EndUserId".to_string(), "AFCRM".to_string()),
            ]
        );
    }
}
