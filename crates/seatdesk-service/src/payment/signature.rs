//! HMAC-SHA256 signatures over payment callbacks.
//!
//! The provider signs `"{order_id}|{payment_id}"` with the merchant's key
//! secret and sends the lowercase hex digest alongside the callback.

use hmac::{Hmac, Mac};
use sha2::Sha256;

use seatdesk_core::error::AppError;

type HmacSha256 = Hmac<Sha256>;

/// Computes and checks callback signatures with a shared secret.
#[derive(Clone)]
pub struct SignatureVerifier {
    secret: Vec<u8>,
}

impl SignatureVerifier {
    /// Create a verifier for the given key secret.
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        Self {
            secret: secret.as_ref().to_vec(),
        }
    }

    fn mac(&self, order_id: &str, payment_id: &str) -> Result<HmacSha256, AppError> {
        let mut mac = HmacSha256::new_from_slice(&self.secret)
            .map_err(|e| AppError::internal(format!("Invalid HMAC key: {e}")))?;
        mac.update(order_id.as_bytes());
        mac.update(b"|");
        mac.update(payment_id.as_bytes());
        Ok(mac)
    }

    /// The expected signature, lowercase hex.
    pub fn sign(&self, order_id: &str, payment_id: &str) -> Result<String, AppError> {
        Ok(hex::encode(
            self.mac(order_id, payment_id)?.finalize().into_bytes(),
        ))
    }

    /// Check `signature` in constant time. Malformed hex, a wrong length,
    /// or an empty payment id are all a mismatch.
    pub fn verify(&self, order_id: &str, payment_id: &str, signature: &str) -> Result<(), AppError> {
        if payment_id.is_empty() {
            return Err(AppError::signature_mismatch("Missing payment id"));
        }
        let provided = hex::decode(signature.trim())
            .map_err(|_| AppError::signature_mismatch("Signature is not valid hex"))?;
        self.mac(order_id, payment_id)?
            .verify_slice(&provided)
            .map_err(|_| AppError::signature_mismatch(format!("Signature mismatch for order {order_id}")))
    }
}

impl std::fmt::Debug for SignatureVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignatureVerifier")
            .field("secret", &"<redacted>")
            .finish()
    }
}
