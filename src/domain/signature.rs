//! Verification of the gateway's payment confirmation signature.
//!
//! The gateway signs `"{order_id}|{payment_id}"` with HMAC-SHA256 keyed by the
//! merchant secret and sends the lower-case hex digest back through the
//! client. Nothing may be enrolled unless [`verify_signature`] returns
//! [`SignatureCheck::Valid`].

use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Length of a hex-encoded SHA-256 digest.
const SIGNATURE_HEX_LEN: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureCheck {
    Valid,
    Invalid,
}

impl SignatureCheck {
    pub fn is_valid(self) -> bool {
        self == Self::Valid
    }
}

/// Gateway callback payload submitted by the client after checkout.
///
/// Fields are optional so that an incomplete payload reaches the verifier and
/// fails closed there instead of being rejected by deserialization.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PaymentConfirmation {
    #[serde(rename = "razorpay_order_id")]
    pub order_id: Option<String>,
    #[serde(rename = "razorpay_payment_id")]
    pub payment_id: Option<String>,
    #[serde(rename = "razorpay_signature")]
    pub signature: Option<String>,
    #[serde(default)]
    pub courses: Vec<crate::domain::ids::CourseId>,
}

/// Computes the hex signature the gateway would produce for this order/payment pair.
pub fn sign(order_id: &str, payment_id: &str, secret: &str) -> Option<String> {
    let mac = keyed_mac(order_id, payment_id, secret)?;
    Some(hex::encode(mac.finalize().into_bytes()))
}

/// Checks a provided signature against the expected one in constant time.
///
/// Never fails: blank inputs, a blank secret, or a signature that is not
/// exactly 64 lower-case hex characters are all `Invalid`.
pub fn verify_signature(
    order_id: &str,
    payment_id: &str,
    signature: &str,
    secret: &str,
) -> SignatureCheck {
    if order_id.is_empty() || payment_id.is_empty() || secret.is_empty() {
        return SignatureCheck::Invalid;
    }
    if signature.len() != SIGNATURE_HEX_LEN
        || !signature
            .bytes()
            .all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
    {
        return SignatureCheck::Invalid;
    }
    let Ok(provided) = hex::decode(signature) else {
        return SignatureCheck::Invalid;
    };
    let Some(mac) = keyed_mac(order_id, payment_id, secret) else {
        return SignatureCheck::Invalid;
    };
    match mac.verify_slice(&provided) {
        Ok(()) => SignatureCheck::Valid,
        Err(_) => SignatureCheck::Invalid,
    }
}

fn keyed_mac(order_id: &str, payment_id: &str, secret: &str) -> Option<HmacSha256> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).ok()?;
    mac.update(order_id.as_bytes());
    mac.update(b"|");
    mac.update(payment_id.as_bytes());
    Some(mac)
}

/// Verifier bound to the merchant secret at startup.
#[derive(Clone)]
pub struct SignatureVerifier {
    secret: String,
}

impl SignatureVerifier {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    pub fn check(&self, confirmation: &PaymentConfirmation) -> SignatureCheck {
        match (
            confirmation.order_id.as_deref(),
            confirmation.payment_id.as_deref(),
            confirmation.signature.as_deref(),
        ) {
            (Some(order_id), Some(payment_id), Some(signature)) => {
                verify_signature(order_id, payment_id, signature, &self.secret)
            }
            _ => SignatureCheck::Invalid,
        }
    }
}

impl std::fmt::Debug for SignatureVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignatureVerifier").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test_secret";

    #[test]
    fn test_known_vector() {
        // HMAC-SHA256("key", "The quick brown fox jumps over the lazy dog")
        let mut mac = HmacSha256::new_from_slice(b"key").unwrap();
        mac.update(b"The quick brown fox jumps over the lazy dog");
        assert_eq!(
            hex::encode(mac.finalize().into_bytes()),
            "f7bc83f430538424b13298e6aa6fb143ef4d59a14946175997479dbc2d1a3cd8"
        );
    }

    #[test]
    fn test_sign_matches_joined_message() {
        let mut mac = HmacSha256::new_from_slice(SECRET.as_bytes()).unwrap();
        mac.update(b"order_1|pay_1");
        let expected = hex::encode(mac.finalize().into_bytes());
        assert_eq!(sign("order_1", "pay_1", SECRET).unwrap(), expected);
    }

    #[test]
    fn test_valid_signature() {
        let signature = sign("order_1", "pay_1", SECRET).unwrap();
        assert_eq!(
            verify_signature("order_1", "pay_1", &signature, SECRET),
            SignatureCheck::Valid
        );
    }

    #[test]
    fn test_wrong_secret_is_invalid() {
        let signature = sign("order_1", "pay_1", SECRET).unwrap();
        assert_eq!(
            verify_signature("order_1", "pay_1", &signature, "other"),
            SignatureCheck::Invalid
        );
    }

    #[test]
    fn test_uppercase_signature_is_invalid() {
        let signature = sign("order_1", "pay_1", SECRET).unwrap().to_uppercase();
        assert_eq!(
            verify_signature("order_1", "pay_1", &signature, SECRET),
            SignatureCheck::Invalid
        );
    }

    #[test]
    fn test_blank_fields_fail_closed() {
        let signature = sign("order_1", "pay_1", SECRET).unwrap();
        assert!(!verify_signature("", "pay_1", &signature, SECRET).is_valid());
        assert!(!verify_signature("order_1", "", &signature, SECRET).is_valid());
        assert!(!verify_signature("order_1", "pay_1", "", SECRET).is_valid());
        assert!(!verify_signature("order_1", "pay_1", &signature, "").is_valid());
    }

    #[test]
    fn test_verifier_rejects_missing_fields() {
        let verifier = SignatureVerifier::new(SECRET);
        let complete = PaymentConfirmation {
            order_id: Some("order_1".into()),
            payment_id: Some("pay_1".into()),
            signature: sign("order_1", "pay_1", SECRET),
            courses: vec![],
        };
        assert!(verifier.check(&complete).is_valid());

        let missing = PaymentConfirmation {
            signature: None,
            ..complete
        };
        assert_eq!(verifier.check(&missing), SignatureCheck::Invalid);
    }

    #[test]
    fn test_swapped_ids_are_invalid() {
        let signature = sign("order_1", "pay_1", SECRET).unwrap();
        assert!(!verify_signature("pay_1", "order_1", &signature, SECRET).is_valid());
    }

    #[test]
    fn test_one_changed_id_character_is_invalid() {
        let signature = sign("order_1", "pay_1", SECRET).unwrap();
        assert!(!verify_signature("order_2", "pay_1", &signature, SECRET).is_valid());
        assert!(!verify_signature("order_1", "pay_2", &signature, SECRET).is_valid());
        assert!(!verify_signature("Order_1", "pay_1", &signature, SECRET).is_valid());
    }
}
