//! Webhook signature verification.
//!
//! Signatures arrive in a `Stripe-Signature` header shaped like
//! `t=<unix-seconds>,v1=<hex hmac>`. The HMAC-SHA256 is computed over
//! `"{timestamp}.{payload}"`, compared in constant time, and the timestamp is
//! bounded to reject replays.

use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use thiserror::Error;

use crate::ports::GatewayError;

type HmacSha256 = Hmac<Sha256>;

/// Maximum age for webhook events (5 minutes).
const MAX_TIMESTAMP_AGE_SECS: i64 = 300;

/// Clock skew tolerance for future timestamps (60 seconds).
const MAX_FUTURE_TOLERANCE_SECS: i64 = 60;

#[derive(Debug, Error)]
pub enum SignatureParseError {
    #[error("missing {0} component")]
    MissingComponent(&'static str),

    #[error("invalid timestamp")]
    InvalidTimestamp,

    #[error("invalid hex signature")]
    InvalidHex,
}

/// Parsed `t=...,v1=...` signature header.
#[derive(Debug, Clone)]
pub struct SignatureHeader {
    pub timestamp: i64,
    pub v1_signature: Vec<u8>,
}

impl SignatureHeader {
    pub fn parse(header: &str) -> Result<Self, SignatureParseError> {
        let mut timestamp = None;
        let mut v1 = None;

        for part in header.split(',') {
            match part.trim().split_once('=') {
                Some(("t", value)) => {
                    timestamp = Some(
                        value
                            .parse::<i64>()
                            .map_err(|_| SignatureParseError::InvalidTimestamp)?,
                    );
                }
                Some(("v1", value)) => {
                    v1 = Some(hex_decode(value).ok_or(SignatureParseError::InvalidHex)?);
                }
                _ => {}
            }
        }

        Ok(Self {
            timestamp: timestamp.ok_or(SignatureParseError::MissingComponent("t"))?,
            v1_signature: v1.ok_or(SignatureParseError::MissingComponent("v1"))?,
        })
    }
}

/// Verifies a webhook payload against its signature header.
pub fn verify_signature(
    secret: &SecretString,
    payload: &[u8],
    header: &SignatureHeader,
) -> Result<(), GatewayError> {
    let now = chrono::Utc::now().timestamp();
    let age = now - header.timestamp;

    if age > MAX_TIMESTAMP_AGE_SECS {
        tracing::warn!(
            event_timestamp = header.timestamp,
            age_secs = age,
            "webhook event too old"
        );
        return Err(GatewayError::InvalidWebhook(format!(
            "event too old ({age} seconds)"
        )));
    }
    if age < -MAX_FUTURE_TOLERANCE_SECS {
        tracing::warn!(
            event_timestamp = header.timestamp,
            current_time = now,
            "webhook event timestamp in future"
        );
        return Err(GatewayError::InvalidWebhook(
            "event timestamp in future".to_string(),
        ));
    }

    let signed_payload = format!("{}.{}", header.timestamp, String::from_utf8_lossy(payload));

    let mut mac = HmacSha256::new_from_slice(secret.expose_secret().as_bytes())
        .map_err(|_| GatewayError::InvalidWebhook("bad webhook secret".to_string()))?;
    mac.update(signed_payload.as_bytes());
    let expected = mac.finalize().into_bytes();

    if expected.as_slice().ct_eq(&header.v1_signature).unwrap_u8() != 1 {
        tracing::warn!("invalid webhook signature");
        return Err(GatewayError::InvalidWebhook("invalid signature".to_string()));
    }

    Ok(())
}

pub fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

fn hex_decode(hex: &str) -> Option<Vec<u8>> {
    // Work on bytes: the header is attacker-controlled and may contain
    // multi-byte characters, which string slicing would panic on.
    let bytes = hex.as_bytes();
    if bytes.len() % 2 != 0 {
        return None;
    }
    bytes
        .chunks_exact(2)
        .map(|pair| {
            let pair = std::str::from_utf8(pair).ok()?;
            u8::from_str_radix(pair, 16).ok()
        })
        .collect()
}
