//! Fabric Gateway gRPC client.
//!
//! # Responsibilities
//! - Connect to the gateway peer named by the connection profile (TLS or
//!   plaintext) with a bounded connect timeout
//! - Evaluate: signed proposal → `Evaluate`
//! - Submit: signed proposal → `Endorse` → signed envelope → `Submit` →
//!   signed `CommitStatus`
//! - Turn gRPC failures into errors that keep the endorsers' messages

use async_trait::async_trait;
use prost::Message;
use std::sync::Arc;
use std::time::Duration;
use tonic::codec::ProstCodec;
use tonic::codegen::http::uri::PathAndQuery;
use tonic::transport::{Certificate, Channel, ClientTlsConfig, Endpoint};
use tonic::{Code, Status};

use crate::fabric::gateway::{Connector, GatewayOptions, LedgerClient};
use crate::fabric::identity::{Identity, TransactionSigner};
use crate::fabric::profile::ConnectionProfile;
use crate::fabric::proposal::{transaction_result, SignedTransactionProposal};
use crate::fabric::proto::{
    methods, CommitStatusRequest, CommitStatusResponse, EndorseRequest, EndorseResponse,
    ErrorDetail, EvaluateRequest, EvaluateResponse, RpcStatus, SignedCommitStatusRequest,
    SubmitRequest, SubmitResponse, ERROR_DETAIL_TYPE, TX_VALIDATION_VALID,
};
use crate::fabric::types::{validation_code_name, FabricError, FabricResult, Invocation};

/// Opens a fresh gRPC channel to the gateway peer on every connect.
#[derive(Debug, Clone)]
pub struct GrpcConnector {
    connect_timeout: Duration,
    call_timeout: Duration,
}

impl GrpcConnector {
    /// `call_timeout` applies when the profile does not set an endorser
    /// timeout of its own.
    pub fn new(connect_timeout: Duration, call_timeout: Duration) -> Self {
        Self {
            connect_timeout,
            call_timeout,
        }
    }
}

#[async_trait]
impl Connector for GrpcConnector {
    async fn connect(
        &self,
        profile: &ConnectionProfile,
        identity: &Identity,
        options: &GatewayOptions,
    ) -> FabricResult<Arc<dyn LedgerClient>> {
        let endpoint = profile.gateway_endpoint(options.discovery).await?;
        let signer = identity.signer()?;
        let call_timeout = profile.endorser_timeout().unwrap_or(self.call_timeout);

        let mut transport = Endpoint::from_shared(endpoint.uri.clone())
            .map_err(|e| FabricError::Connection(format!("{}: {}", endpoint.uri, error_chain(&e))))?
            .connect_timeout(self.connect_timeout)
            .timeout(call_timeout);

        if let Some(tls) = &endpoint.tls {
            let tls_config = ClientTlsConfig::new()
                .ca_certificate(Certificate::from_pem(&tls.ca_pem))
                .domain_name(tls.domain.clone());
            transport = transport.tls_config(tls_config).map_err(|e| {
                FabricError::Connection(format!("{}: {}", endpoint.uri, error_chain(&e)))
            })?;
        }

        let channel = transport.connect().await.map_err(|e| {
            tracing::warn!(
                peer = %endpoint.peer_name,
                uri = %endpoint.uri,
                error = %error_chain(&e),
                "Gateway peer unreachable"
            );
            FabricError::Connection(format!("{}: {}", endpoint.uri, error_chain(&e)))
        })?;

        // With discovery off, keep endorsement inside the profile's organizations.
        let target_organizations = if options.discovery.enabled {
            Vec::new()
        } else {
            profile.msp_ids()
        };

        tracing::debug!(
            peer = %endpoint.peer_name,
            uri = %endpoint.uri,
            msp_id = %endpoint.msp_id,
            call_timeout_secs = call_timeout.as_secs(),
            "Gateway channel established"
        );

        Ok(Arc::new(GrpcLedgerClient {
            channel,
            signer,
            creator: identity.serialized(),
            target_organizations,
            call_timeout,
        }))
    }
}

/// Ledger client bound to one gateway channel and one identity.
pub struct GrpcLedgerClient {
    channel: Channel,
    signer: TransactionSigner,
    /// Serialized identity of the signer.
    creator: Vec<u8>,
    target_organizations: Vec<String>,
    call_timeout: Duration,
}

impl GrpcLedgerClient {
    async fn unary<Req, Resp>(&self, method: &'static str, request: Req) -> Result<Resp, Status>
    where
        Req: Message + Send + Sync + 'static,
        Resp: Message + Default + Send + Sync + 'static,
    {
        let mut grpc = tonic::client::Grpc::new(self.channel.clone());
        grpc.ready()
            .await
            .map_err(|e| Status::unavailable(format!("Service was not ready: {}", error_chain(&e))))?;

        let codec: ProstCodec<Req, Resp> = ProstCodec::default();
        let response = grpc
            .unary(tonic::Request::new(request), PathAndQuery::from_static(method), codec)
            .await?;
        Ok(response.into_inner())
    }

    fn call_error(&self, operation: &'static str, status: Status) -> FabricError {
        status_error(operation, status, self.call_timeout)
    }
}

#[async_trait]
impl LedgerClient for GrpcLedgerClient {
    async fn evaluate(&self, invocation: &Invocation) -> FabricResult<Vec<u8>> {
        let proposal = SignedTransactionProposal::new(invocation, &self.creator, &self.signer);
        let request = EvaluateRequest {
            transaction_id: proposal.transaction_id.clone(),
            channel_id: proposal.channel_id.clone(),
            proposed_transaction: Some(proposal.signed),
            target_organizations: self.target_organizations.clone(),
        };

        let response: EvaluateResponse = self
            .unary(methods::EVALUATE, request)
            .await
            .map_err(|s| self.call_error("Evaluate", s))?;

        response
            .result
            .map(|r| r.payload)
            .ok_or_else(|| FabricError::Decode("evaluate response: missing result".to_string()))
    }

    async fn submit(&self, invocation: &Invocation) -> FabricResult<Vec<u8>> {
        let proposal = SignedTransactionProposal::new(invocation, &self.creator, &self.signer);
        let tx_id = proposal.transaction_id.clone();
        let channel_id = proposal.channel_id.clone();

        let endorse = EndorseRequest {
            transaction_id: tx_id.clone(),
            channel_id: channel_id.clone(),
            proposed_transaction: Some(proposal.signed),
            endorsing_organizations: self.target_organizations.clone(),
        };
        let endorsed: EndorseResponse = self
            .unary(methods::ENDORSE, endorse)
            .await
            .map_err(|s| self.call_error("Endorse", s))?;

        let mut envelope = endorsed.prepared_transaction.ok_or_else(|| {
            FabricError::Decode("endorse response: missing prepared transaction".to_string())
        })?;
        let result = transaction_result(&envelope.payload)?;
        envelope.signature = self.signer.sign(&envelope.payload);

        let submit = SubmitRequest {
            transaction_id: tx_id.clone(),
            channel_id: channel_id.clone(),
            prepared_transaction: Some(envelope),
        };
        let _: SubmitResponse = self
            .unary(methods::SUBMIT, submit)
            .await
            .map_err(|s| self.call_error("Submit", s))?;

        tracing::debug!(tx_id = %tx_id, channel = %channel_id, "Transaction submitted, awaiting commit");

        let status_request = CommitStatusRequest {
            transaction_id: tx_id.clone(),
            channel_id,
            identity: self.creator.clone(),
        }
        .encode_to_vec();
        let signed_status = SignedCommitStatusRequest {
            signature: self.signer.sign(&status_request),
            request: status_request,
        };
        let status: CommitStatusResponse = self
            .unary(methods::COMMIT_STATUS, signed_status)
            .await
            .map_err(|s| self.call_error("CommitStatus", s))?;

        if status.result != TX_VALIDATION_VALID {
            return Err(FabricError::Commit {
                tx_id,
                code: status.result,
                status: validation_code_name(status.result),
            });
        }

        tracing::debug!(tx_id = %tx_id, block = status.block_number, "Transaction committed");
        Ok(result)
    }
}

impl std::fmt::Debug for GrpcLedgerClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GrpcLedgerClient")
            .field("target_organizations", &self.target_organizations)
            .field("call_timeout_secs", &self.call_timeout.as_secs())
            .finish()
    }
}

/// Map a gRPC status to a ledger error, keeping endorser details.
fn status_error(operation: &'static str, status: Status, call_timeout: Duration) -> FabricError {
    let timed_out = status.code() == Code::DeadlineExceeded
        || (status.code() == Code::Cancelled && status.message().contains("Timeout expired"));
    if timed_out {
        return FabricError::Timeout {
            operation,
            secs: call_timeout.as_secs(),
        };
    }
    if status.code() == Code::Unavailable {
        return FabricError::Connection(describe_status(&status));
    }
    FabricError::Rpc(describe_status(&status))
}

/// Status message followed by any `gateway.ErrorDetail` entries.
fn describe_status(status: &Status) -> String {
    let details = error_details(status.details());
    if details.is_empty() {
        return status.message().to_string();
    }
    let details: Vec<String> = details
        .iter()
        .map(|d| format!("{} ({}): {}", d.address, d.msp_id, d.message))
        .collect();
    format!("{} [{}]", status.message(), details.join("; "))
}

fn error_details(raw: &[u8]) -> Vec<ErrorDetail> {
    if raw.is_empty() {
        return Vec::new();
    }
    match RpcStatus::decode(raw) {
        Ok(rpc_status) => rpc_status
            .details
            .iter()
            .filter(|any| any.type_url.ends_with(ERROR_DETAIL_TYPE))
            .filter_map(|any| ErrorDetail::decode(any.value.as_slice()).ok())
            .collect(),
        Err(e) => {
            tracing::debug!(error = %e, "Undecodable gRPC status details");
            Vec::new()
        }
    }
}

fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
