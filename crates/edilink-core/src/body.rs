// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Message body serialization envelope.
//!
//! Bodies must survive a byte round-trip exactly: what `encode` writes,
//! `decode` reconstructs with identical keys in identical order. `data`
//! mappings are `BTreeMap`s, so serialization order is lexicographic by key
//! and stable across repeated packs of the same record. `serde_json` keeps
//! object keys ordered on the `Reply` side as well (its map type is ordered
//! by key).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;

/// The three wire shapes a message body can take.
///
/// `Url` and `Request` are produced at pack time and consumed by the
/// transport; `Reply` is produced by response fan-out and consumed by
/// `unpack`. A `Reply` reaching the transport is malformed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MessageBody {
    /// A URL template with transport placeholders; the request carries no
    /// JSON payload.
    Url { template: String },

    /// A URL template plus the JSON payload, all wire keys present (missing
    /// optional record fields are packed as empty strings, never omitted).
    Request {
        base_url: String,
        data: BTreeMap<String, String>,
    },

    /// A received response (or one slot of it), keyed by wire field name.
    Reply { data: BTreeMap<String, Value> },
}

impl MessageBody {
    /// Serialize to the byte form handed to the persistence collaborator.
    pub fn encode(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Reconstruct a body from its byte form.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_url_round_trip() {
        let body = MessageBody::Url {
            template: "{url}:{port}/ais-bos-regelverk/api/Krom".to_string(),
        };
        let bytes = body.encode().unwrap();
        assert_eq!(MessageBody::decode(&bytes).unwrap(), body);
    }

    #[test]
    fn test_request_round_trip_is_exact() {
        let mut data = BTreeMap::new();
        data.insert("senasteKontaktTyp".to_string(), "B".to_string());
        data.insert("nastaKontaktDatum".to_string(), "".to_string());
        let body = MessageBody::Request {
            base_url: "{url}:{port}/kontakt".to_string(),
            data,
        };
        let bytes = body.encode().unwrap();
        let decoded = MessageBody::decode(&bytes).unwrap();
        assert_eq!(decoded, body);
        // empty values survive, they are not dropped
        match decoded {
            MessageBody::Request { data, .. } => {
                assert_eq!(data.get("nastaKontaktDatum"), Some(&"".to_string()));
            }
            other => panic!("unexpected body: {:?}", other),
        }
    }

    #[test]
    fn test_encoding_is_byte_stable() {
        let build = || {
            let mut data = BTreeMap::new();
            // inserted out of order on purpose
            data.insert("zzz".to_string(), "1".to_string());
            data.insert("aaa".to_string(), "2".to_string());
            data.insert("mmm".to_string(), "3".to_string());
            MessageBody::Request {
                base_url: "{url}/x".to_string(),
                data,
            }
        };
        assert_eq!(build().encode().unwrap(), build().encode().unwrap());
    }

    #[test]
    fn test_data_keys_are_lexicographic() {
        let mut data = BTreeMap::new();
        data.insert("b".to_string(), "2".to_string());
        data.insert("a".to_string(), "1".to_string());
        let body = MessageBody::Request {
            base_url: "u".to_string(),
            data,
        };
        let text = String::from_utf8(body.encode().unwrap()).unwrap();
        assert!(text.find("\"a\"").unwrap() < text.find("\"b\"").unwrap());
    }

    #[test]
    fn test_reply_round_trip_with_mixed_values() {
        let mut data = BTreeMap::new();
        data.insert("type_id".to_string(), json!(17));
        data.insert("start_time".to_string(), json!("2020-03-02T10:00"));
        data.insert("bookable".to_string(), json!(true));
        let body = MessageBody::Reply { data };
        let bytes = body.encode().unwrap();
        assert_eq!(MessageBody::decode(&bytes).unwrap(), body);
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(MessageBody::decode(b"not a body").is_err());
    }
}
