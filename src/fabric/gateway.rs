//! Gateway, network and contract handles.
//!
//! The bridge only ever needs four calls: connect a gateway, pick a
//! network (channel), pick a contract (chaincode), then submit or evaluate
//! a transaction. The wire work sits behind [`Connector`] and
//! [`LedgerClient`] so the transport can be swapped out.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Instant;

use crate::fabric::identity::Identity;
use crate::fabric::profile::ConnectionProfile;
use crate::fabric::types::{DiscoveryOptions, FabricError, FabricResult, Invocation, InvocationKind};
use crate::fabric::wallet::Wallet;
use crate::observability::metrics;

/// Executes invocations against the ledger for one connected identity.
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Run a read-only transaction and return its result.
    async fn evaluate(&self, invocation: &Invocation) -> FabricResult<Vec<u8>>;

    /// Endorse, order and commit a transaction and return its result.
    async fn submit(&self, invocation: &Invocation) -> FabricResult<Vec<u8>>;
}

/// Opens ledger connections.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(
        &self,
        profile: &ConnectionProfile,
        identity: &Identity,
        options: &GatewayOptions,
    ) -> FabricResult<Arc<dyn LedgerClient>>;
}

/// Options for [`Gateway::connect`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayOptions {
    /// Wallet label of the signing identity.
    pub identity: String,
    pub discovery: DiscoveryOptions,
}

/// A connected gateway for one identity.
pub struct Gateway {
    client: Arc<dyn LedgerClient>,
    identity: String,
}

impl Gateway {
    /// Look up the identity in the wallet and connect.
    ///
    /// Fails with [`FabricError::IdentityNotFound`] before any network
    /// traffic when the label is not in the wallet.
    pub async fn connect(
        connector: &dyn Connector,
        profile: &ConnectionProfile,
        wallet: &Wallet,
        options: GatewayOptions,
    ) -> FabricResult<Self> {
        let identity = wallet
            .get(&options.identity)
            .await?
            .ok_or_else(|| FabricError::IdentityNotFound(options.identity.clone()))?;

        let client = connector.connect(profile, &identity, &options).await?;

        tracing::debug!(
            identity = %options.identity,
            msp_id = %identity.msp_id(),
            profile = %profile.name,
            "Gateway connected"
        );

        Ok(Self {
            client,
            identity: options.identity,
        })
    }

    /// Wrap an already connected client.
    pub fn from_client(client: Arc<dyn LedgerClient>, identity: impl Into<String>) -> Self {
        Self {
            client,
            identity: identity.into(),
        }
    }

    pub fn identity(&self) -> &str {
        &self.identity
    }

    pub fn network(&self, channel: &str) -> Network {
        Network {
            client: self.client.clone(),
            channel: channel.to_string(),
        }
    }
}

/// A channel as seen through a gateway.
#[derive(Clone)]
pub struct Network {
    client: Arc<dyn LedgerClient>,
    channel: String,
}

impl Network {
    pub fn name(&self) -> &str {
        &self.channel
    }

    pub fn contract(&self, chaincode: &str) -> Contract {
        Contract {
            client: self.client.clone(),
            channel: self.channel.clone(),
            chaincode: chaincode.to_string(),
        }
    }
}

/// A chaincode on a channel.
#[derive(Clone)]
pub struct Contract {
    client: Arc<dyn LedgerClient>,
    channel: String,
    chaincode: String,
}

impl Contract {
    pub fn chaincode(&self) -> &str {
        &self.chaincode
    }

    /// Submit a state-changing transaction.
    pub async fn submit_transaction(&self, name: &str, args: &[&str]) -> FabricResult<Vec<u8>> {
        self.invoke(InvocationKind::Submit, name, args).await
    }

    /// Evaluate a read-only transaction.
    pub async fn evaluate_transaction(&self, name: &str, args: &[&str]) -> FabricResult<Vec<u8>> {
        self.invoke(InvocationKind::Evaluate, name, args).await
    }

    async fn invoke(&self, kind: InvocationKind, name: &str, args: &[&str]) -> FabricResult<Vec<u8>> {
        let invocation = Invocation {
            channel: self.channel.clone(),
            chaincode: self.chaincode.clone(),
            transaction: name.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
        };

        let start = Instant::now();
        let result = match kind {
            InvocationKind::Submit => self.client.submit(&invocation).await,
            InvocationKind::Evaluate => self.client.evaluate(&invocation).await,
        };
        metrics::record_ledger_call(name, kind, result.is_ok(), start);

        match &result {
            Ok(payload) => tracing::debug!(
                transaction = %name,
                kind = kind.as_str(),
                channel = %self.channel,
                chaincode = %self.chaincode,
                result_len = payload.len(),
                "Transaction completed"
            ),
            Err(e) => tracing::warn!(
                transaction = %name,
                kind = kind.as_str(),
                channel = %self.channel,
                chaincode = %self.chaincode,
                error = %e,
                "Transaction failed"
            ),
        }
        result
    }
}
