//! Encoding and signature primitives used by token validation.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use rsa::sha2::{Digest, Sha256};
use rsa::Pkcs1v15Sign;

use crate::jwks::VerificationKey;

/// Base64 URL-safe decoding without padding (RFC 7515)
#[inline]
pub(crate) fn base64_url_decode(input: &[u8]) -> Result<Vec<u8>, base64::DecodeError> {
    URL_SAFE_NO_PAD.decode(input)
}

/// Verify an RS256 (RSASSA-PKCS1-v1_5 with SHA-256) signature.
///
/// Only RSA keys can verify; any other key type yields `false`.
pub(crate) fn verify_rs256(key: &VerificationKey, message: &[u8], signature: &[u8]) -> bool {
    let VerificationKey::Rsa(public_key) = key else {
        return false;
    };

    let hashed = Sha256::digest(message);
    public_key
        .verify(Pkcs1v15Sign::new::<Sha256>(), &hashed, signature)
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rsa::pkcs1v15::SigningKey;
    use rsa::pkcs8::DecodePrivateKey;
    use rsa::signature::{SignatureEncoding, Signer};
    use rsa::RsaPrivateKey;

    const ISSUER_KEY_1: &str = include_str!("../tests/fixtures/issuer_key_1.pem");
    const ISSUER_KEY_2: &str = include_str!("../tests/fixtures/issuer_key_2.pem");

    fn sign(pem: &str, message: &[u8]) -> (VerificationKey, Vec<u8>) {
        let private_key = RsaPrivateKey::from_pkcs8_pem(pem).unwrap();
        let public_key = private_key.to_public_key();
        let signature = SigningKey::<Sha256>::new(private_key).sign(message);
        (VerificationKey::Rsa(public_key), signature.to_vec())
    }

    #[test]
    fn test_verify_rs256_accepts_valid_signature() {
        let (key, signature) = sign(ISSUER_KEY_1, b"header.payload");
        assert!(verify_rs256(&key, b"header.payload", &signature));
    }

    #[test]
    fn test_verify_rs256_rejects_other_message() {
        let (key, signature) = sign(ISSUER_KEY_1, b"header.payload");
        assert!(!verify_rs256(&key, b"header.payloae", &signature));
    }

    #[test]
    fn test_verify_rs256_rejects_other_key() {
        let (_, signature) = sign(ISSUER_KEY_1, b"header.payload");
        let (other_key, _) = sign(ISSUER_KEY_2, b"unused");
        assert!(!verify_rs256(&other_key, b"header.payload", &signature));
    }

    #[test]
    fn test_verify_rs256_rejects_truncated_signature() {
        let (key, signature) = sign(ISSUER_KEY_1, b"header.payload");
        assert!(!verify_rs256(&key, b"header.payload", &signature[1..]));
    }

    #[test]
    fn test_base64_url_decode_rejects_padding() {
        assert_eq!(base64_url_decode(b"AQAB").unwrap(), vec![1, 0, 1]);
        assert!(base64_url_decode(b"AQ==").is_err());
    }
}
