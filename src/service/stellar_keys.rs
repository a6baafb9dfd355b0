// service/stellar_keys.rs
use std::fmt;

use ed25519_dalek::{Signer, SigningKey};
use stellar_xdr::curr::{
    AccountId, DecoratedSignature, MuxedAccount, PublicKey, Signature, SignatureHint, Uint256,
};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum KeyError {
    #[error("Invalid Stellar secret seed")]
    InvalidSecret,

    #[error("Invalid Stellar account address: {0}")]
    InvalidAccount(String),

    #[error("Failed to encode signature: {0}")]
    Encoding(String),
}

/// An ed25519 signing identity addressed by its Stellar strkey.
#[derive(Clone)]
pub struct Keypair {
    signing_key: SigningKey,
}

impl Keypair {
    /// Parses an `S...` secret seed.
    pub fn from_secret(seed: &str) -> Result<Self, KeyError> {
        let secret = stellar_strkey::ed25519::PrivateKey::from_string(seed.trim())
            .map_err(|_| KeyError::InvalidSecret)?;
        Ok(Self {
            signing_key: SigningKey::from_bytes(&secret.0),
        })
    }

    pub fn random() -> Self {
        let seed: [u8; 32] = rand::random();
        Self {
            signing_key: SigningKey::from_bytes(&seed),
        }
    }

    pub fn public_key_bytes(&self) -> [u8; 32] {
        self.signing_key.verifying_key().to_bytes()
    }

    /// The `G...` account address.
    pub fn public_key(&self) -> String {
        stellar_strkey::ed25519::PublicKey(self.public_key_bytes()).to_string()
    }

    pub fn account_id(&self) -> AccountId {
        AccountId(PublicKey::PublicKeyTypeEd25519(Uint256(self.public_key_bytes())))
    }

    pub fn muxed_account(&self) -> MuxedAccount {
        MuxedAccount::Ed25519(Uint256(self.public_key_bytes()))
    }

    /// Last four bytes of the public key, used by validators to match signatures to signers.
    pub fn signature_hint(&self) -> SignatureHint {
        let public = self.public_key_bytes();
        let mut hint = [0u8; 4];
        hint.copy_from_slice(&public[28..]);
        SignatureHint(hint)
    }

    pub fn sign_decorated(&self, tx_hash: &[u8; 32]) -> Result<DecoratedSignature, KeyError> {
        let signature = self.signing_key.sign(tx_hash);
        let bytes = signature
            .to_bytes()
            .to_vec()
            .try_into()
            .map_err(|e: stellar_xdr::curr::Error| KeyError::Encoding(e.to_string()))?;

        Ok(DecoratedSignature {
            hint: self.signature_hint(),
            signature: Signature(bytes),
        })
    }
}

impl fmt::Debug for Keypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Keypair")
            .field("public_key", &self.public_key())
            .finish()
    }
}

pub fn parse_account_id(address: &str) -> Result<AccountId, KeyError> {
    let key = stellar_strkey::ed25519::PublicKey::from_string(address)
        .map_err(|_| KeyError::InvalidAccount(address.to_string()))?;
    Ok(AccountId(PublicKey::PublicKeyTypeEd25519(Uint256(key.0))))
}

#[cfg(test)]
mod tests {
    use ed25519_dalek::{Verifier, VerifyingKey};

    use super::*;

    fn seed(byte: u8) -> String {
        stellar_strkey::ed25519::PrivateKey([byte; 32]).to_string()
    }

    #[test]
    fn test_secret_round_trips_to_same_account() {
        let keypair = Keypair::from_secret(&seed(3)).unwrap();
        let again = Keypair::from_secret(&format!("  {}  ", seed(3))).unwrap();
        assert_eq!(keypair.public_key(), again.public_key());
        assert!(keypair.public_key().starts_with('G'));
        assert_eq!(keypair.public_key().len(), 56);
    }

    #[test]
    fn test_rejects_bad_secrets() {
        assert_eq!(Keypair::from_secret("not-a-seed").unwrap_err(), KeyError::InvalidSecret);
        // an account address is not a seed
        let public = Keypair::from_secret(&seed(3)).unwrap().public_key();
        assert_eq!(Keypair::from_secret(&public).unwrap_err(), KeyError::InvalidSecret);
    }

    #[test]
    fn test_debug_hides_secret() {
        let secret = seed(5);
        let keypair = Keypair::from_secret(&secret).unwrap();
        let rendered = format!("{:?}", keypair);
        assert!(!rendered.contains(&secret));
        assert!(rendered.contains(&keypair.public_key()));
    }

    #[test]
    fn test_decorated_signature_verifies() {
        let keypair = Keypair::random();
        let hash = [42u8; 32];
        let decorated = keypair.sign_decorated(&hash).unwrap();

        assert_eq!(&decorated.hint.0[..], &keypair.public_key_bytes()[28..]);

        let verifying = VerifyingKey::from_bytes(&keypair.public_key_bytes()).unwrap();
        let raw: [u8; 64] = decorated.signature.0.to_vec().try_into().unwrap();
        let signature = ed25519_dalek::Signature::from_bytes(&raw);
        assert!(verifying.verify(&hash, &signature).is_ok());
    }

    #[test]
    fn test_parse_account_id() {
        let keypair = Keypair::random();
        assert_eq!(parse_account_id(&keypair.public_key()).unwrap(), keypair.account_id());
        assert!(matches!(parse_account_id("GABC"), Err(KeyError::InvalidAccount(_))));
    }
}
