//! Compact JWS parsing.

use serde_json::{Map, Value};

use crate::algorithms::base64_url_decode;
use crate::error::InvalidReason;

/// Protected header of a token.
#[derive(Debug, Clone, PartialEq)]
pub struct Header(Map<String, Value>);

impl Header {
    /// Declared signing algorithm.
    pub fn alg(&self) -> Option<&str> {
        self.0.get("alg").and_then(Value::as_str)
    }

    /// Signing key identifier. A non-string `kid` counts as absent.
    pub fn kid(&self) -> Option<&str> {
        self.0.get("kid").and_then(Value::as_str)
    }
}

/// Claim set of a token.
#[derive(Debug, Clone, PartialEq)]
pub struct Claims(Map<String, Value>);

impl Claims {
    /// `iss`, when present as a string.
    pub fn issuer(&self) -> Option<&str> {
        self.0.get("iss").and_then(Value::as_str)
    }

    /// `aud` as a list. A single string is a one-element list; non-string
    /// entries are skipped.
    pub fn audience(&self) -> Option<Vec<&str>> {
        match self.0.get("aud")? {
            Value::String(aud) => Some(vec![aud.as_str()]),
            Value::Array(auds) => Some(auds.iter().filter_map(Value::as_str).collect()),
            _ => None,
        }
    }

    /// A string claim by name.
    pub fn string(&self, name: &str) -> Option<&str> {
        self.0.get(name).and_then(Value::as_str)
    }

    /// Any claim by name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }
}

/// A parsed, not yet verified, token.
#[derive(Debug, Clone)]
pub struct Token<'a> {
    /// Protected header
    pub header: Header,
    /// Claim set
    pub claims: Claims,
    signing_input: &'a [u8],
    signature: Vec<u8>,
}

impl<'a> Token<'a> {
    /// Parse `header.payload.signature`.
    ///
    /// # Errors
    /// Returns [`InvalidReason::MalformedToken`] unless there are exactly
    /// three base64url segments, the first two decode to JSON objects, and
    /// the third decodes to bytes.
    pub fn parse(raw: &'a [u8]) -> Result<Self, InvalidReason> {
        let mut segments = raw.split(|b| *b == b'.');
        let (Some(header_b64), Some(payload_b64), Some(signature_b64), None) = (
            segments.next(),
            segments.next(),
            segments.next(),
            segments.next(),
        ) else {
            return Err(InvalidReason::MalformedToken);
        };

        let header = Header(decode_object(header_b64)?);
        let claims = Claims(decode_object(payload_b64)?);
        let signature =
            base64_url_decode(signature_b64).map_err(|_| InvalidReason::MalformedToken)?;
        if signature.is_empty() {
            return Err(InvalidReason::MalformedToken);
        }

        Ok(Self {
            header,
            claims,
            signing_input: &raw[..header_b64.len() + 1 + payload_b64.len()],
            signature,
        })
    }

    /// Bytes covered by the signature: `header.payload` as transmitted.
    pub fn signing_input(&self) -> &[u8] {
        self.signing_input
    }

    /// Decoded signature bytes.
    pub fn signature(&self) -> &[u8] {
        &self.signature
    }
}

fn decode_object(segment: &[u8]) -> Result<Map<String, Value>, InvalidReason> {
    let json = base64_url_decode(segment).map_err(|_| InvalidReason::MalformedToken)?;
    serde_json::from_slice(&json).map_err(|_| InvalidReason::MalformedToken)
}
