//! In-process `gateway.Gateway` service for exercising the gRPC client.
//!
//! Checks every signature it receives against the caller's verifying key
//! and records the order of calls. Endorse prepares a transaction whose
//! chaincode response is `created`; CommitStatus answers with a fixed
//! validation code.

use p256::ecdsa::signature::Verifier;
use p256::ecdsa::{Signature, VerifyingKey};
use prost::Message;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;
use tokio_stream::wrappers::TcpListenerStream;
use tonic::body::BoxBody;
use tonic::codec::ProstCodec;
use tonic::codegen::{empty_body, http, Body, BoxFuture, Context, Poll, Service, StdError};
use tonic::server::{NamedService, UnaryService};
use tonic::{Code, Status};

use crate::fabric::proto::{
    methods, ChaincodeAction, ChaincodeActionPayload, ChaincodeEndorsedAction,
    ChaincodeInvocationSpec, ChaincodeProposalPayload, ChannelHeader, CommitStatusRequest,
    CommitStatusResponse, EndorseRequest, EndorseResponse, Envelope, EvaluateRequest,
    EvaluateResponse, Header, Payload, Proposal, ProposalResponsePayload, Response,
    SignedCommitStatusRequest, SignedProposal, SubmitRequest, SubmitResponse, Transaction,
    TransactionAction,
};

pub(crate) const SUBMIT_RESULT: &[u8] = b"created";

#[derive(Default)]
struct Recorded {
    calls: Vec<&'static str>,
    organizations: Vec<String>,
    transaction_id: Option<String>,
    prepared: Option<Vec<u8>>,
}

#[derive(Clone)]
pub(crate) struct FakeGateway {
    key: VerifyingKey,
    commit_result: i32,
    recorded: Arc<Mutex<Recorded>>,
}

impl FakeGateway {
    pub(crate) fn new(key: VerifyingKey, commit_result: i32) -> Self {
        Self {
            key,
            commit_result,
            recorded: Arc::default(),
        }
    }

    /// Serve on an ephemeral local port until the test runtime ends.
    pub(crate) async fn spawn(&self) -> SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let service = self.clone();
        tokio::spawn(async move {
            tonic::transport::Server::builder()
                .add_service(service)
                .serve_with_incoming(TcpListenerStream::new(listener))
                .await
                .unwrap();
        });
        addr
    }

    pub(crate) fn calls(&self) -> Vec<&'static str> {
        self.recorded.lock().unwrap().calls.clone()
    }

    /// Organizations named by the last Evaluate or Endorse.
    pub(crate) fn organizations(&self) -> Vec<String> {
        self.recorded.lock().unwrap().organizations.clone()
    }

    /// Transaction ID taken from the last proposal's channel header.
    pub(crate) fn transaction_id(&self) -> Option<String> {
        self.recorded.lock().unwrap().transaction_id.clone()
    }

    fn verify(&self, what: &str, message: &[u8], der: &[u8]) -> Result<(), Status> {
        let signature = Signature::from_der(der)
            .map_err(|e| Status::unauthenticated(format!("{}: malformed signature: {}", what, e)))?;
        if signature.normalize_s().is_some() {
            return Err(Status::unauthenticated(format!("{}: high-S signature", what)));
        }
        self.key
            .verify(message, &signature)
            .map_err(|_| Status::unauthenticated(format!("{}: signature does not verify", what)))
    }

    /// Verify a signed proposal and return its channel header and
    /// chaincode arguments.
    fn open_proposal(
        &self,
        signed: Option<SignedProposal>,
        transaction_id: &str,
        channel_id: &str,
    ) -> Result<(ChannelHeader, Vec<Vec<u8>>), Status> {
        let signed = signed.ok_or_else(|| Status::invalid_argument("missing proposal"))?;
        self.verify("proposal", &signed.proposal_bytes, &signed.signature)?;

        let proposal = Proposal::decode(signed.proposal_bytes.as_slice()).map_err(invalid)?;
        let header = Header::decode(proposal.header.as_slice()).map_err(invalid)?;
        let channel_header = ChannelHeader::decode(header.channel_header.as_slice()).map_err(invalid)?;
        if channel_header.tx_id != transaction_id || channel_header.channel_id != channel_id {
            return Err(Status::invalid_argument("request does not match proposal header"));
        }

        let payload = ChaincodeProposalPayload::decode(proposal.payload.as_slice()).map_err(invalid)?;
        let args = ChaincodeInvocationSpec::decode(payload.input.as_slice())
            .map_err(invalid)?
            .chaincode_spec
            .and_then(|spec| spec.input)
            .map(|input| input.args)
            .unwrap_or_default();

        self.recorded.lock().unwrap().transaction_id = Some(channel_header.tx_id.clone());
        Ok((channel_header, args))
    }

    fn evaluate(&self, request: EvaluateRequest) -> Result<EvaluateResponse, Status> {
        self.record("Evaluate", Some(request.target_organizations.as_slice()));
        let (_, args) = self.open_proposal(
            request.proposed_transaction,
            &request.transaction_id,
            &request.channel_id,
        )?;
        Ok(EvaluateResponse {
            result: Some(Response {
                status: 200,
                message: String::new(),
                payload: args.join(&b' '),
            }),
        })
    }

    fn endorse(&self, request: EndorseRequest) -> Result<EndorseResponse, Status> {
        self.record("Endorse", Some(request.endorsing_organizations.as_slice()));
        let (channel_header, _) = self.open_proposal(
            request.proposed_transaction,
            &request.transaction_id,
            &request.channel_id,
        )?;

        let payload = prepared_transaction(&channel_header);
        self.recorded.lock().unwrap().prepared = Some(payload.clone());
        Ok(EndorseResponse {
            prepared_transaction: Some(Envelope {
                payload,
                signature: Vec::new(),
            }),
        })
    }

    fn submit(&self, request: SubmitRequest) -> Result<SubmitResponse, Status> {
        self.record("Submit", None);
        let envelope = request
            .prepared_transaction
            .ok_or_else(|| Status::invalid_argument("missing prepared transaction"))?;
        if self.recorded.lock().unwrap().prepared.as_ref() != Some(&envelope.payload) {
            return Err(Status::failed_precondition("transaction was not endorsed here"));
        }
        self.verify("envelope", &envelope.payload, &envelope.signature)?;
        Ok(SubmitResponse {})
    }

    fn commit_status(&self, request: SignedCommitStatusRequest) -> Result<CommitStatusResponse, Status> {
        self.record("CommitStatus", None);
        self.verify("commit status request", &request.request, &request.signature)?;
        let status_request = CommitStatusRequest::decode(request.request.as_slice()).map_err(invalid)?;
        if Some(&status_request.transaction_id) != self.transaction_id().as_ref() {
            return Err(Status::not_found(format!(
                "unknown transaction {}",
                status_request.transaction_id
            )));
        }
        Ok(CommitStatusResponse {
            result: self.commit_result,
            block_number: 7,
        })
    }

    fn record(&self, call: &'static str, organizations: Option<&[String]>) {
        let mut recorded = self.recorded.lock().unwrap();
        recorded.calls.push(call);
        if let Some(organizations) = organizations {
            recorded.organizations = organizations.to_vec();
        }
    }
}

fn invalid(err: prost::DecodeError) -> Status {
    Status::invalid_argument(err.to_string())
}

/// Envelope payload of an endorsed transaction answering `SUBMIT_RESULT`.
fn prepared_transaction(channel_header: &ChannelHeader) -> Vec<u8> {
    let chaincode_action = ChaincodeAction {
        response: Some(Response {
            status: 200,
            message: String::new(),
            payload: SUBMIT_RESULT.to_vec(),
        }),
        ..Default::default()
    };
    let action_payload = ChaincodeActionPayload {
        chaincode_proposal_payload: Vec::new(),
        action: Some(ChaincodeEndorsedAction {
            proposal_response_payload: ProposalResponsePayload {
                proposal_hash: Vec::new(),
                extension: chaincode_action.encode_to_vec(),
            }
            .encode_to_vec(),
        }),
    };
    let transaction = Transaction {
        actions: vec![TransactionAction {
            header: Vec::new(),
            payload: action_payload.encode_to_vec(),
        }],
    };
    Payload {
        header: Some(Header {
            channel_header: channel_header.encode_to_vec(),
            signature_header: Vec::new(),
        }),
        data: transaction.encode_to_vec(),
    }
    .encode_to_vec()
}

/// Adapts a plain function to a unary gRPC method.
struct Unary<F>(F);

impl<Req, Resp, F> UnaryService<Req> for Unary<F>
where
    F: FnMut(Req) -> Result<Resp, Status>,
{
    type Response = Resp;
    type Future = std::future::Ready<Result<tonic::Response<Resp>, Status>>;

    fn call(&mut self, request: tonic::Request<Req>) -> Self::Future {
        std::future::ready((self.0)(request.into_inner()).map(tonic::Response::new))
    }
}

async fn unary<Req, Resp, F, B>(handler: F, request: http::Request<B>) -> http::Response<BoxBody>
where
    Req: Message + Default + Send + 'static,
    Resp: Message + Send + 'static,
    F: FnMut(Req) -> Result<Resp, Status> + Send + 'static,
    B: Body + Send + 'static,
    B::Error: Into<StdError> + Send + 'static,
{
    let codec: ProstCodec<Resp, Req> = ProstCodec::default();
    tonic::server::Grpc::new(codec).unary(Unary(handler), request).await
}

impl<B> Service<http::Request<B>> for FakeGateway
where
    B: Body + Send + 'static,
    B::Error: Into<StdError> + Send + 'static,
{
    type Response = http::Response<BoxBody>;
    type Error = std::convert::Infallible;
    type Future = BoxFuture<Self::Response, Self::Error>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: http::Request<B>) -> Self::Future {
        let gateway = self.clone();
        match request.uri().path() {
            methods::EVALUATE => {
                let handler = move |r: EvaluateRequest| gateway.evaluate(r);
                Box::pin(async move { Ok(unary(handler, request).await) })
            }
            methods::ENDORSE => {
                let handler = move |r: EndorseRequest| gateway.endorse(r);
                Box::pin(async move { Ok(unary(handler, request).await) })
            }
            methods::SUBMIT => {
                let handler = move |r: SubmitRequest| gateway.submit(r);
                Box::pin(async move { Ok(unary(handler, request).await) })
            }
            methods::COMMIT_STATUS => {
                let handler = move |r: SignedCommitStatusRequest| gateway.commit_status(r);
                Box::pin(async move { Ok(unary(handler, request).await) })
            }
            _ => Box::pin(async move {
                let mut response = http::Response::new(empty_body());
                let headers = response.headers_mut();
                headers.insert("grpc-status", (Code::Unimplemented as i32).into());
                headers.insert(http::header::CONTENT_TYPE, tonic::metadata::GRPC_CONTENT_TYPE);
                Ok(response)
            }),
        }
    }
}

impl NamedService for FakeGateway {
    const NAME: &'static str = "gateway.Gateway";
}
