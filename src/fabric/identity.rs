//! X.509 identities and transaction signing.
//!
//! # Security
//! - Private keys are only read from wallet entries
//! - Keys are never logged; `Identity` has a redacting `Debug`
//! - Signatures are ECDSA P-256 over SHA-256, low-S, DER encoded, as
//!   Fabric peers require

use p256::ecdsa::signature::Signer as _;
use p256::ecdsa::{Signature, SigningKey, VerifyingKey};
use p256::pkcs8::DecodePrivateKey;
use p256::SecretKey;
use prost::Message;

use crate::fabric::proto::SerializedIdentity;
use crate::fabric::types::{FabricError, FabricResult};

/// An enrolled identity: MSP membership plus X.509 credentials.
#[derive(Clone, PartialEq, Eq)]
pub struct Identity {
    msp_id: String,
    /// PEM encoded certificate.
    certificate: String,
    /// PEM encoded private key (PKCS#8 or SEC1).
    private_key: String,
}

impl Identity {
    pub fn new(
        msp_id: impl Into<String>,
        certificate: impl Into<String>,
        private_key: impl Into<String>,
    ) -> Self {
        Self {
            msp_id: msp_id.into(),
            certificate: certificate.into(),
            private_key: private_key.into(),
        }
    }

    pub fn msp_id(&self) -> &str {
        &self.msp_id
    }

    pub fn certificate(&self) -> &str {
        &self.certificate
    }

    pub(crate) fn private_key_pem(&self) -> &str {
        &self.private_key
    }

    /// Protobuf `msp.SerializedIdentity` used as the transaction creator.
    pub fn serialized(&self) -> Vec<u8> {
        SerializedIdentity {
            mspid: self.msp_id.clone(),
            id_bytes: self.certificate.as_bytes().to_vec(),
        }
        .encode_to_vec()
    }

    /// Build a signer from the identity's private key.
    pub fn signer(&self) -> FabricResult<TransactionSigner> {
        TransactionSigner::from_pem(&self.private_key)
    }
}

impl std::fmt::Debug for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Identity")
            .field("msp_id", &self.msp_id)
            .field("private_key", &"<redacted>")
            .finish()
    }
}

/// Signs proposals, envelopes and commit status requests.
#[derive(Clone)]
pub struct TransactionSigner {
    key: SigningKey,
}

impl TransactionSigner {
    /// Parse a PEM private key. PKCS#8 (`BEGIN PRIVATE KEY`) is what the
    /// Fabric CA client writes; SEC1 (`BEGIN EC PRIVATE KEY`) is also accepted.
    pub fn from_pem(pem: &str) -> FabricResult<Self> {
        let key = SigningKey::from_pkcs8_pem(pem)
            .or_else(|_| SecretKey::from_sec1_pem(pem).map(SigningKey::from))
            .map_err(|_| {
                FabricError::Identity("private key is not a PEM encoded P-256 key".to_string())
            })?;
        Ok(Self { key })
    }

    /// Sign `message` (hashed with SHA-256) and return the DER signature.
    pub fn sign(&self, message: &[u8]) -> Vec<u8> {
        let signature: Signature = self.key.sign(message);
        // Fabric rejects high-S signatures
        let signature = signature.normalize_s().unwrap_or(signature);
        signature.to_der().as_bytes().to_vec()
    }

    pub fn verifying_key(&self) -> VerifyingKey {
        self.key.verifying_key().clone()
    }
}

impl std::fmt::Debug for TransactionSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransactionSigner").finish_non_exhaustive()
    }
}
