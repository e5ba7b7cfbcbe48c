//! Versioned encoding of forwarded header values.
//!
//! ```text
//! value := "v1." base64url_nopad(json(payload))
//! ```
//!
//! Only peers of the same deployment read these values. Unknown versions
//! are rejected rather than guessed at.

use std::net::SocketAddr;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

use crate::context::Identity;

const VERSION_PREFIX: &str = "v1.";

/// Header value decoding failures.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("unsupported header encoding version")]
    UnsupportedVersion,

    #[error("invalid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("invalid payload: {0}")]
    Json(#[from] serde_json::Error),
}

/// Encodes and decodes identities and addresses for transport headers.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityCodec;

impl IdentityCodec {
    pub fn encode_identity(&self, identity: &Identity) -> Result<String, CodecError> {
        encode(identity)
    }

    pub fn decode_identity(&self, value: &str) -> Result<Identity, CodecError> {
        decode(value)
    }

    pub fn encode_address(&self, address: &SocketAddr) -> Result<String, CodecError> {
        encode(address)
    }

    pub fn decode_address(&self, value: &str) -> Result<SocketAddr, CodecError> {
        decode(value)
    }
}

fn encode<T: Serialize>(value: &T) -> Result<String, CodecError> {
    let json = serde_json::to_vec(value)?;
    Ok(format!("{}{}", VERSION_PREFIX, URL_SAFE_NO_PAD.encode(json)))
}

fn decode<T: DeserializeOwned>(value: &str) -> Result<T, CodecError> {
    let body = value
        .strip_prefix(VERSION_PREFIX)
        .ok_or(CodecError::UnsupportedVersion)?;
    let json = URL_SAFE_NO_PAD.decode(body)?;
    Ok(serde_json::from_slice(&json)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_survives_header_transport() {
        let codec = IdentityCodec;
        let identity = Identity::new("kirk")
            .with_backend_roles(["captain", "admin"])
            .with_attribute("ship", "enterprise");

        let value = codec.encode_identity(&identity).unwrap();
        assert!(value.starts_with("v1."));
        assert!(value.is_ascii());
        assert_eq!(codec.decode_identity(&value).unwrap(), identity);
    }

    #[test]
    fn test_address_value() {
        let codec = IdentityCodec;
        let addr: SocketAddr = "10.0.0.7:9300".parse().unwrap();
        let value = codec.encode_address(&addr).unwrap();
        assert_eq!(codec.decode_address(&value).unwrap(), addr);
    }

    #[test]
    fn test_rejects_unknown_version() {
        let err = IdentityCodec.decode_identity("v2.eyJ9").unwrap_err();
        assert!(matches!(err, CodecError::UnsupportedVersion));
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(matches!(
            IdentityCodec.decode_identity("v1.!!!"),
            Err(CodecError::Base64(_))
        ));
        let not_identity = format!("v1.{}", URL_SAFE_NO_PAD.encode(b"[1,2]"));
        assert!(matches!(
            IdentityCodec.decode_identity(&not_identity),
            Err(CodecError::Json(_))
        ));
    }
}
