//! # Digital Signatures
//!
//! Free-function signing and verification over the key types in
//! [`keys`](super::keys). The compression bridge goes through these so that
//! there is exactly one place to audit what gets signed.

use ed25519_dalek::{Verifier, VerifyingKey};
use thiserror::Error;

use super::keys::{Pubkey, Signature, VmKeypair};

/// Errors during signature verification.
///
/// Intentionally vague: "it didn't verify" is all a caller needs.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SignatureError {
    #[error("signature verification failed")]
    VerificationFailed,

    #[error("invalid public key")]
    InvalidPublicKey,
}

/// Sign `message` with the VM authority keypair.
pub fn sign(keypair: &VmKeypair, message: &[u8]) -> Signature {
    keypair.sign(message)
}

/// Verify `signature` over `message` by `public_key`.
pub fn verify(public_key: &Pubkey, message: &[u8], signature: &Signature) -> bool {
    public_key.verify(message, signature)
}

/// Verify raw bytes straight off the wire, reporting why it failed.
pub fn verify_raw(
    public_key_bytes: &[u8; 32],
    message: &[u8],
    signature_bytes: &[u8; 64],
) -> Result<(), SignatureError> {
    let verifying_key =
        VerifyingKey::from_bytes(public_key_bytes).map_err(|_| SignatureError::InvalidPublicKey)?;
    let signature = ed25519_dalek::Signature::from_bytes(signature_bytes);

    verifying_key
        .verify(message, &signature)
        .map_err(|_| SignatureError::VerificationFailed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_and_verify() {
        let kp = VmKeypair::generate();
        let sig = sign(&kp, b"hello");
        assert!(verify(&kp.public_key(), b"hello", &sig));
    }

    #[test]
    fn test_wrong_key_fails() {
        let kp1 = VmKeypair::generate();
        let kp2 = VmKeypair::generate();
        let sig = sign(&kp1, b"message");
        assert!(!verify(&kp2.public_key(), b"message", &sig));
    }

    #[test]
    fn test_verify_raw() {
        let kp = VmKeypair::generate();
        let sig = sign(&kp, b"raw");
        let pk = kp.public_key().to_bytes();

        assert_eq!(verify_raw(&pk, b"raw", sig.as_bytes()), Ok(()));
        assert_eq!(
            verify_raw(&pk, b"tampered", sig.as_bytes()),
            Err(SignatureError::VerificationFailed)
        );
    }
}
