// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Hex helpers and the `0x`-prefixed encodings used on the wire.

use crate::config::ADDRESS_LEN;
use crate::error::{KernelError, KernelResult};
use alloy::primitives::{Address, B256, U256};

fn strip_prefix(s: &str) -> &str {
    s.strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s)
}

/// Decodes a hex string with an optional `0x` prefix.
pub fn decode_hex(s: &str) -> KernelResult<Vec<u8>> {
    hex::decode(strip_prefix(s)).map_err(|e| KernelError::InvalidHex(format!("{s:?}: {e}")))
}

/// Decodes the raw 20 bytes of an address given as hex.
pub fn decode_address_bytes(s: &str) -> KernelResult<[u8; ADDRESS_LEN]> {
    let bytes = decode_hex(s)?;
    <[u8; ADDRESS_LEN]>::try_from(bytes.as_slice()).map_err(|_| KernelError::InvalidAddress {
        expected: ADDRESS_LEN,
        found: bytes.len(),
    })
}

pub fn parse_address(s: &str) -> KernelResult<Address> {
    decode_address_bytes(s).map(Address::from)
}

pub fn encode_prefixed(bytes: impl AsRef<[u8]>) -> String {
    format!("0x{}", hex::encode(bytes.as_ref()))
}

/// Left-pads to 32 bytes: `0x` followed by 64 hex characters.
pub fn u256_to_padded_hex(value: &U256) -> String {
    encode_prefixed(value.to_be_bytes::<32>())
}

/// Parses a hex big integer. Padding is optional and `0x` alone is zero.
pub fn parse_u256_hex(s: &str) -> KernelResult<U256> {
    let digits = strip_prefix(s.trim());
    if digits.is_empty() {
        return Ok(U256::ZERO);
    }
    U256::from_str_radix(digits, 16).map_err(|e| KernelError::InvalidHex(format!("{s:?}: {e}")))
}

pub mod u256_padded {
    use super::*;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &U256, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&u256_to_padded_hex(value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<U256, D::Error> {
        let s = String::deserialize(deserializer)?;
        parse_u256_hex(&s).map_err(serde::de::Error::custom)
    }
}

pub mod b256 {
    use super::*;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &B256, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&encode_prefixed(value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<B256, D::Error> {
        let s = String::deserialize(deserializer)?;
        let bytes = decode_hex(&s).map_err(serde::de::Error::custom)?;
        if bytes.len() != 32 {
            return Err(serde::de::Error::custom(format!(
                "expected 32 bytes, found {}",
                bytes.len()
            )));
        }
        Ok(B256::from_slice(&bytes))
    }
}

pub mod address {
    use super::*;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Address, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_checksum(None))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Address, D::Error> {
        let s = String::deserialize(deserializer)?;
        parse_address(&s).map_err(serde::de::Error::custom)
    }
}
