use bech32::Hrp;
use secp256k1::{schnorr, All, Keypair, Message, Secp256k1, SecretKey, XOnlyPublicKey};
use std::fmt;
use thiserror::Error;

const NSEC: Hrp = Hrp::parse_unchecked("nsec");

#[derive(Debug, Error)]
pub enum KeyError {
    #[error("invalid bech32 key: {0}")]
    Bech32(#[from] bech32::DecodeError),

    #[error("expected an nsec key, got prefix {0:?}")]
    WrongPrefix(String),

    #[error("invalid hex key: {0}")]
    Hex(#[from] hex::FromHexError),

    #[error("invalid secret key: {0}")]
    Secp(#[from] secp256k1::Error),
}

/// Signing identity: a secp256k1 secret key and its x-only public key.
#[derive(Clone)]
pub struct Keys {
    secp: Secp256k1<All>,
    keypair: Keypair,
    public: XOnlyPublicKey,
}

impl Keys {
    pub fn new(secret: SecretKey) -> Self {
        let secp = Secp256k1::new();
        let keypair = Keypair::from_secret_key(&secp, &secret);
        let (public, _) = keypair.x_only_public_key();
        Self {
            secp,
            keypair,
            public,
        }
    }

    /// Decode a bech32 `nsec1...` secret key.
    pub fn from_nsec(nsec: &str) -> Result<Self, KeyError> {
        let (hrp, data) = bech32::decode(nsec.trim())?;
        if hrp != NSEC {
            return Err(KeyError::WrongPrefix(hrp.to_string()));
        }
        Ok(Self::new(SecretKey::from_slice(&data)?))
    }

    /// Accept either an `nsec1...` string or a 64-char hex secret.
    pub fn parse(value: &str) -> Result<Self, KeyError> {
        let value = value.trim();
        if value.starts_with("nsec1") {
            return Self::from_nsec(value);
        }
        let bytes = hex::decode(value)?;
        Ok(Self::new(SecretKey::from_slice(&bytes)?))
    }

    pub fn public_key(&self) -> XOnlyPublicKey {
        self.public
    }

    pub fn public_key_hex(&self) -> String {
        hex::encode(self.public.serialize())
    }

    /// Deterministic BIP-340 signature over a 32-byte digest.
    pub fn sign(&self, digest: [u8; 32]) -> schnorr::Signature {
        let message = Message::from_digest(digest);
        self.secp.sign_schnorr_no_aux_rand(&message, &self.keypair)
    }
}

impl fmt::Debug for Keys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Keys")
            .field("public", &self.public_key_hex())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // NIP-19 test vectors
    const NSEC_VECTOR: &str = "nsec1vl029mgpspedva04g90vltkh6fvh240zqtv9k0t9af8935ke9laqsnlfe5";
    const SECRET_HEX: &str = "67dea2ed018072d675f5415ecfaed7d2597555e202d85b3d65ea4e58d2d92ffa";
    const NPUB_VECTOR: &str = "npub10elfcs4fr0l0r8af98jlmgdh9c8tcxjvz9qkw038js35mp4dma8qzvjptg";

    #[test]
    fn test_nsec_and_hex_decode_to_same_key() {
        let from_nsec = Keys::from_nsec(NSEC_VECTOR).unwrap();
        let from_hex = Keys::parse(SECRET_HEX).unwrap();
        assert_eq!(from_nsec.public_key_hex(), from_hex.public_key_hex());
        assert_eq!(from_nsec.public_key_hex().len(), 64);
    }

    #[test]
    fn test_parse_dispatches_on_prefix() {
        let keys = Keys::parse(&format!("  {}\n", NSEC_VECTOR)).unwrap();
        assert_eq!(
            keys.public_key_hex(),
            Keys::parse(SECRET_HEX).unwrap().public_key_hex()
        );
    }

    #[test]
    fn test_npub_is_rejected() {
        let err = Keys::from_nsec(NPUB_VECTOR).unwrap_err();
        assert!(matches!(err, KeyError::WrongPrefix(ref p) if p == "npub"));
    }

    #[test]
    fn test_bad_checksum_is_rejected() {
        let mut broken = NSEC_VECTOR.to_string();
        broken.pop();
        broken.push('q');
        assert!(matches!(
            Keys::from_nsec(&broken).unwrap_err(),
            KeyError::Bech32(_)
        ));
    }

    #[test]
    fn test_bad_hex_is_rejected() {
        assert!(matches!(Keys::parse("zz").unwrap_err(), KeyError::Hex(_)));
        // Right encoding, wrong length
        assert!(matches!(Keys::parse("abcd").unwrap_err(), KeyError::Secp(_)));
    }

    #[test]
    fn test_signature_verifies() {
        let keys = Keys::parse(SECRET_HEX).unwrap();
        let digest = [7u8; 32];
        let sig = keys.sign(digest);
        let secp = Secp256k1::verification_only();
        secp.verify_schnorr(&sig, &Message::from_digest(digest), &keys.public_key())
            .unwrap();
        // No aux randomness: same input, same signature
        assert_eq!(sig, keys.sign(digest));
    }

    #[test]
    fn test_debug_hides_secret() {
        let keys = Keys::parse(SECRET_HEX).unwrap();
        let debug = format!("{:?}", keys);
        assert!(!debug.contains(SECRET_HEX));
        assert!(debug.contains(&keys.public_key_hex()));
    }
}
