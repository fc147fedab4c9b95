// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! CBOR frames exchanged with the batcher.
//!
//! Every frame is a single-entry map whose key names the message. Frames are
//! decoded once, here, into [`BatcherMessage`]; nothing past this module looks
//! at raw CBOR.

use alloy::primitives::U256;
use ciborium::Value;
use serde::Serialize;
use thiserror::Error;
use zkarcade_kernel::hex_serde::parse_u256_hex;

#[derive(Error, Debug)]
pub enum FrameError {
    #[error("cbor decode failed: {0}")]
    Decode(String),
    #[error("cbor encode failed: {0}")]
    Encode(String),
    #[error("unexpected frame shape: {0}")]
    Shape(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatcherMessage {
    ProtocolVersion(String),
    Nonce(U256),
    /// Also sent as `LastMaxFee` by older batchers.
    MaxFee(U256),
    EthRpcError(String),
    InvalidRequest(String),
    /// Well-formed message this client does not act on.
    Other(String),
}

/// Client to server request. Serializes as `{"GetNonceForAddress": "0x.."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum BatcherRequest {
    GetNonceForAddress(String),
    GetMaxFeeForAddress(String),
}

impl BatcherRequest {
    pub fn encode(&self) -> Result<Vec<u8>, FrameError> {
        let mut buf = Vec::new();
        ciborium::ser::into_writer(self, &mut buf).map_err(|e| FrameError::Encode(e.to_string()))?;
        Ok(buf)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, FrameError> {
        let (key, payload) = single_entry(decode_value(bytes)?)?;
        let address = scalar_to_string(payload);
        match key.as_str() {
            "GetNonceForAddress" => Ok(BatcherRequest::GetNonceForAddress(address)),
            "GetMaxFeeForAddress" => Ok(BatcherRequest::GetMaxFeeForAddress(address)),
            other => Err(FrameError::Shape(format!("unknown request {other:?}"))),
        }
    }
}

impl BatcherMessage {
    pub fn decode(bytes: &[u8]) -> Result<Self, FrameError> {
        let (key, payload) = match decode_value(bytes)? {
            // Unit variants travel as a bare string.
            Value::Text(name) => return Ok(BatcherMessage::Other(name)),
            value => single_entry(value)?,
        };

        match key.as_str() {
            "ProtocolVersion" => Ok(BatcherMessage::ProtocolVersion(scalar_to_string(payload))),
            "Nonce" => Ok(BatcherMessage::Nonce(big_uint(payload)?)),
            "MaxFee" | "LastMaxFee" => Ok(BatcherMessage::MaxFee(big_uint(payload)?)),
            "EthRpcError" => Ok(BatcherMessage::EthRpcError(scalar_to_string(payload))),
            "InvalidRequest" => Ok(BatcherMessage::InvalidRequest(scalar_to_string(payload))),
            _ => Ok(BatcherMessage::Other(key)),
        }
    }

    pub fn encode(&self) -> Result<Vec<u8>, FrameError> {
        let (key, payload) = match self {
            BatcherMessage::ProtocolVersion(v) => ("ProtocolVersion", Value::Text(v.clone())),
            BatcherMessage::Nonce(n) => ("Nonce", Value::Text(format!("{n:#x}"))),
            BatcherMessage::MaxFee(f) => ("MaxFee", Value::Text(format!("{f:#x}"))),
            BatcherMessage::EthRpcError(e) => ("EthRpcError", Value::Text(e.clone())),
            BatcherMessage::InvalidRequest(e) => ("InvalidRequest", Value::Text(e.clone())),
            BatcherMessage::Other(name) => (name.as_str(), Value::Null),
        };
        let value = Value::Map(vec![(Value::Text(key.to_string()), payload)]);
        let mut buf = Vec::new();
        ciborium::ser::into_writer(&value, &mut buf).map_err(|e| FrameError::Encode(e.to_string()))?;
        Ok(buf)
    }
}

fn decode_value(bytes: &[u8]) -> Result<Value, FrameError> {
    ciborium::de::from_reader(bytes).map_err(|e| FrameError::Decode(e.to_string()))
}

fn single_entry(value: Value) -> Result<(String, Value), FrameError> {
    let entries = match value {
        Value::Map(entries) => entries,
        other => return Err(FrameError::Shape(format!("expected a map, found {other:?}"))),
    };
    if entries.len() != 1 {
        return Err(FrameError::Shape(format!(
            "expected exactly one entry, found {}",
            entries.len()
        )));
    }
    let (key, payload) = entries
        .into_iter()
        .next()
        .ok_or_else(|| FrameError::Shape("empty map".into()))?;
    match key {
        Value::Text(k) => Ok((k, payload)),
        other => Err(FrameError::Shape(format!("non-text key {other:?}"))),
    }
}

fn scalar_to_string(v: Value) -> String {
    match v {
        Value::Text(t) => t,
        Value::Integer(i) => i128::from(i).to_string(),
        Value::Null => String::new(),
        other => format!("{other:?}"),
    }
}

fn big_uint(v: Value) -> Result<U256, FrameError> {
    match v {
        Value::Text(t) => parse_u256_hex(&t).map_err(|e| FrameError::Shape(e.to_string())),
        Value::Bytes(b) if b.len() <= 32 => U256::try_from_be_slice(&b)
            .ok_or_else(|| FrameError::Shape("big integer does not fit 256 bits".into())),
        Value::Integer(i) => u128::try_from(i)
            .map(U256::from)
            .map_err(|_| FrameError::Shape("negative big integer".into())),
        other => Err(FrameError::Shape(format!("expected a hex big integer, found {other:?}"))),
    }
}
