//! Transaction proposal building and result extraction.
//!
//! # Responsibilities
//! - Generate the nonce and derive the transaction ID
//! - Assemble channel/signature headers and the chaincode invocation
//! - Sign the proposal with the caller's identity
//! - Pull the chaincode result out of an endorsed transaction envelope

use prost::Message;
use rand::RngCore;
use sha2::{Digest, Sha256};
use std::time::SystemTime;

use crate::fabric::identity::TransactionSigner;
use crate::fabric::proto::{
    ChaincodeAction, ChaincodeActionPayload, ChaincodeHeaderExtension, ChaincodeId,
    ChaincodeInput, ChaincodeInvocationSpec, ChaincodeProposalPayload, ChaincodeSpec,
    ChannelHeader, Header, Payload, Proposal, ProposalResponsePayload, SignatureHeader,
    SignedProposal, Transaction, HEADER_TYPE_ENDORSER_TRANSACTION,
};
use crate::fabric::types::{FabricError, FabricResult, Invocation};

const NONCE_LEN: usize = 24;

/// A signed proposal ready to send to the gateway.
#[derive(Debug, Clone)]
pub struct SignedTransactionProposal {
    pub transaction_id: String,
    pub channel_id: String,
    pub signed: SignedProposal,
}

/// Transaction ID: hex SHA-256 of nonce followed by the serialized creator.
pub fn transaction_id(nonce: &[u8], creator: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(nonce);
    hasher.update(creator);
    hex::encode(hasher.finalize())
}

fn new_nonce() -> Vec<u8> {
    let mut nonce = vec![0u8; NONCE_LEN];
    rand::thread_rng().fill_bytes(&mut nonce);
    nonce
}

impl SignedTransactionProposal {
    /// Build and sign a proposal for `invocation`, created by `creator`
    /// (a serialized identity).
    pub fn new(invocation: &Invocation, creator: &[u8], signer: &TransactionSigner) -> Self {
        Self::with_nonce(invocation, creator, signer, new_nonce())
    }

    fn with_nonce(
        invocation: &Invocation,
        creator: &[u8],
        signer: &TransactionSigner,
        nonce: Vec<u8>,
    ) -> Self {
        let tx_id = transaction_id(&nonce, creator);
        let chaincode_id = ChaincodeId {
            name: invocation.chaincode.clone(),
            ..Default::default()
        };

        let channel_header = ChannelHeader {
            r#type: HEADER_TYPE_ENDORSER_TRANSACTION,
            timestamp: Some(SystemTime::now().into()),
            channel_id: invocation.channel.clone(),
            tx_id: tx_id.clone(),
            extension: ChaincodeHeaderExtension {
                chaincode_id: Some(chaincode_id.clone()),
            }
            .encode_to_vec(),
            ..Default::default()
        };
        let signature_header = SignatureHeader {
            creator: creator.to_vec(),
            nonce,
        };
        let header = Header {
            channel_header: channel_header.encode_to_vec(),
            signature_header: signature_header.encode_to_vec(),
        };

        let invocation_spec = ChaincodeInvocationSpec {
            chaincode_spec: Some(ChaincodeSpec {
                chaincode_id: Some(chaincode_id),
                input: Some(ChaincodeInput {
                    args: invocation.chaincode_args(),
                    is_init: false,
                }),
                ..Default::default()
            }),
        };
        let payload = ChaincodeProposalPayload {
            input: invocation_spec.encode_to_vec(),
            ..Default::default()
        };

        let proposal_bytes = Proposal {
            header: header.encode_to_vec(),
            payload: payload.encode_to_vec(),
        }
        .encode_to_vec();
        let signature = signer.sign(&proposal_bytes);

        Self {
            transaction_id: tx_id,
            channel_id: invocation.channel.clone(),
            signed: SignedProposal {
                proposal_bytes,
                signature,
            },
        }
    }
}

/// Chaincode response payload carried in a prepared (endorsed) transaction.
pub fn transaction_result(envelope_payload: &[u8]) -> FabricResult<Vec<u8>> {
    let payload = Payload::decode(envelope_payload)
        .map_err(|e| FabricError::Decode(format!("transaction payload: {}", e)))?;
    let transaction = Transaction::decode(payload.data.as_slice())
        .map_err(|e| FabricError::Decode(format!("transaction: {}", e)))?;
    let action = transaction
        .actions
        .first()
        .ok_or_else(|| FabricError::Decode("transaction: no actions".to_string()))?;
    let action_payload = ChaincodeActionPayload::decode(action.payload.as_slice())
        .map_err(|e| FabricError::Decode(format!("chaincode action payload: {}", e)))?;
    let endorsed = action_payload
        .action
        .ok_or_else(|| FabricError::Decode("chaincode action payload: no endorsed action".to_string()))?;
    let response_payload = ProposalResponsePayload::decode(endorsed.proposal_response_payload.as_slice())
        .map_err(|e| FabricError::Decode(format!("proposal response payload: {}", e)))?;
    let chaincode_action = ChaincodeAction::decode(response_payload.extension.as_slice())
        .map_err(|e| FabricError::Decode(format!("chaincode action: {}", e)))?;

    Ok(chaincode_action
        .response
        .map(|response| response.payload)
        .unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fabric::identity::tests::generated_key_pem;
    use crate::fabric::identity::Identity;
    use crate::fabric::proto::{ChaincodeEndorsedAction, Response, TransactionAction};
    use p256::ecdsa::signature::Verifier;
    use p256::ecdsa::Signature;

    fn invocation() -> Invocation {
        Invocation {
            channel: "mychannel".into(),
            chaincode: "asset-transfer-basic".into(),
            transaction: "CreateAsset".into(),
            args: vec!["asset1".into(), "100".into()],
        }
    }

    #[test]
    fn test_transaction_id_is_hash_of_nonce_and_creator() {
        let id = transaction_id(b"nonce", b"creator");
        let expected = hex::encode(Sha256::digest(b"noncecreator"));
        assert_eq!(id, expected);
        assert_eq!(id.len(), 64);
    }

    #[test]
    fn test_proposal_contents_and_signature() {
        let identity = Identity::new("Org1MSP", "CERT", generated_key_pem());
        let signer = identity.signer().unwrap();
        let creator = identity.serialized();

        let nonce = vec![7u8; NONCE_LEN];
        let proposal = SignedTransactionProposal::with_nonce(&invocation(), &creator, &signer, nonce.clone());

        assert_eq!(proposal.transaction_id, transaction_id(&nonce, &creator));
        assert_eq!(proposal.channel_id, "mychannel");

        let signature = Signature::from_der(&proposal.signed.signature).unwrap();
        signer
            .verifying_key()
            .verify(&proposal.signed.proposal_bytes, &signature)
            .unwrap();

        let decoded = Proposal::decode(proposal.signed.proposal_bytes.as_slice()).unwrap();
        let header = Header::decode(decoded.header.as_slice()).unwrap();
        let channel_header = ChannelHeader::decode(header.channel_header.as_slice()).unwrap();
        assert_eq!(channel_header.r#type, HEADER_TYPE_ENDORSER_TRANSACTION);
        assert_eq!(channel_header.channel_id, "mychannel");
        assert_eq!(channel_header.tx_id, proposal.transaction_id);
        assert!(channel_header.timestamp.is_some());

        let signature_header = SignatureHeader::decode(header.signature_header.as_slice()).unwrap();
        assert_eq!(signature_header.creator, creator);
        assert_eq!(signature_header.nonce, nonce);

        let payload = ChaincodeProposalPayload::decode(decoded.payload.as_slice()).unwrap();
        let spec = ChaincodeInvocationSpec::decode(payload.input.as_slice())
            .unwrap()
            .chaincode_spec
            .unwrap();
        assert_eq!(spec.chaincode_id.unwrap().name, "asset-transfer-basic");
        assert_eq!(
            spec.input.unwrap().args,
            vec![b"CreateAsset".to_vec(), b"asset1".to_vec(), b"100".to_vec()]
        );
    }

    #[test]
    fn test_fresh_nonce_per_proposal() {
        let identity = Identity::new("Org1MSP", "CERT", generated_key_pem());
        let signer = identity.signer().unwrap();
        let creator = identity.serialized();

        let first = SignedTransactionProposal::new(&invocation(), &creator, &signer);
        let second = SignedTransactionProposal::new(&invocation(), &creator, &signer);
        assert_ne!(first.transaction_id, second.transaction_id);
    }

    fn endorsed_payload(response: Option<Response>) -> Vec<u8> {
        let chaincode_action = ChaincodeAction {
            response,
            ..Default::default()
        };
        let response_payload = ProposalResponsePayload {
            proposal_hash: vec![1, 2, 3],
            extension: chaincode_action.encode_to_vec(),
        };
        let action_payload = ChaincodeActionPayload {
            chaincode_proposal_payload: Vec::new(),
            action: Some(ChaincodeEndorsedAction {
                proposal_response_payload: response_payload.encode_to_vec(),
            }),
        };
        let transaction = Transaction {
            actions: vec![TransactionAction {
                header: Vec::new(),
                payload: action_payload.encode_to_vec(),
            }],
        };
        Payload {
            header: None,
            data: transaction.encode_to_vec(),
        }
        .encode_to_vec()
    }

    #[test]
    fn test_transaction_result_extraction() {
        let payload = endorsed_payload(Some(Response {
            status: 200,
            message: String::new(),
            payload: b"old-balance".to_vec(),
        }));
        assert_eq!(transaction_result(&payload).unwrap(), b"old-balance".to_vec());

        let payload = endorsed_payload(None);
        assert!(transaction_result(&payload).unwrap().is_empty());
    }

    #[test]
    fn test_transaction_result_without_actions() {
        let payload = Payload {
            header: None,
            data: Transaction { actions: vec![] }.encode_to_vec(),
        }
        .encode_to_vec();
        let err = transaction_result(&payload).unwrap_err();
        assert_eq!(err.to_string(), "Failed to decode transaction: no actions");
    }
}
