// Copyright (C) 2021-2025 the DTVM authors. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! The `{"data": <base64>}` envelope handed to `instantiate`, `execute`
//! and `query`. What `data` means is up to the guest.

use crate::error::{validation_error, HostResult};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionMessage {
    #[serde(with = "base64_bytes", default)]
    pub data: Vec<u8>,
}

impl ExecutionMessage {
    pub fn new(data: impl Into<Vec<u8>>) -> Self {
        Self { data: data.into() }
    }

    pub fn to_json_bytes(&self) -> HostResult<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    pub fn from_json_bytes(raw: &[u8]) -> HostResult<Self> {
        serde_json::from_slice(raw)
            .map_err(|e| validation_error(format!("invalid execution message: {}", e)))
    }
}

pub(crate) mod base64_bytes {
    use base64::{engine::general_purpose, Engine as _};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(data: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&general_purpose::STANDARD.encode(data))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        match Option::<String>::deserialize(deserializer)? {
            Some(encoded) => general_purpose::STANDARD
                .decode(encoded)
                .map_err(serde::de::Error::custom),
            None => Ok(Vec::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_format() {
        let msg = ExecutionMessage::new(br#"{"initialBlockIndex":1}"#.to_vec());
        let raw = msg.to_json_bytes().unwrap();
        assert_eq!(
            String::from_utf8(raw.clone()).unwrap(),
            r#"{"data":"eyJpbml0aWFsQmxvY2tJbmRleCI6MX0="}"#
        );
        assert_eq!(ExecutionMessage::from_json_bytes(&raw).unwrap(), msg);
    }

    #[test]
    fn test_empty_and_null_data() {
        let raw = ExecutionMessage::default().to_json_bytes().unwrap();
        assert_eq!(raw, br#"{"data":""}"#);
        assert!(ExecutionMessage::from_json_bytes(br#"{"data":null}"#)
            .unwrap()
            .data
            .is_empty());
        assert!(ExecutionMessage::from_json_bytes(br#"{}"#).unwrap().data.is_empty());
        assert!(ExecutionMessage::from_json_bytes(br#"{"data":"***"}"#).is_err());
    }
}
