use crate::crypto::{sign, Hash, Pubkey, Signature, VmKeypair};

/// Whoever signs account hashes on the VM's behalf.
///
/// The local keypair in tests, something remote (HSM, signing service) in
/// production. The bridge only ever asks for signatures over 32-byte
/// hashes, never over arbitrary messages.
pub trait HashSigner {
    fn public_key(&self) -> Pubkey;

    fn sign_hash(&self, hash: &Hash) -> Signature;
}

impl HashSigner for VmKeypair {
    fn public_key(&self) -> Pubkey {
        VmKeypair::public_key(self)
    }

    fn sign_hash(&self, hash: &Hash) -> Signature {
        sign(self, hash.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::sha256;

    #[test]
    fn test_keypair_signs_hash_bytes() {
        let kp = VmKeypair::from_seed(&[1; 32]);
        let hash = sha256(b"account");
        let sig = kp.sign_hash(&hash);

        assert_eq!(sig, kp.sign(hash.as_ref()));
        assert!(HashSigner::public_key(&kp).verify(hash.as_ref(), &sig));
    }
}
