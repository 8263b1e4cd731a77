//! Asset operations against the configured contract.

use std::path::Path;
use std::sync::Arc;

use crate::config::FabricConfig;
use crate::fabric::{
    ConnectionProfile, Connector, Contract, FabricResult, Gateway, GatewayOptions, Wallet,
};

/// Runs asset operations, opening a fresh connection context for each one.
#[derive(Clone)]
pub struct BridgeService {
    config: FabricConfig,
    connector: Arc<dyn Connector>,
}

impl BridgeService {
    pub fn new(config: FabricConfig, connector: Arc<dyn Connector>) -> Self {
        Self { config, connector }
    }

    pub fn config(&self) -> &FabricConfig {
        &self.config
    }

    /// Build a connection context: read the profile, open the wallet,
    /// connect as the configured identity and bind the contract.
    ///
    /// The profile and wallet are read from disk on every call, so edits
    /// take effect on the next request.
    pub async fn connect(&self) -> FabricResult<Contract> {
        let profile =
            ConnectionProfile::load(Path::new(&self.config.connection_profile)).await?;
        let wallet = Wallet::open(&self.config.wallet_path).await?;

        let options = GatewayOptions {
            identity: self.config.identity.clone(),
            discovery: self.config.discovery,
        };
        let gateway = Gateway::connect(self.connector.as_ref(), &profile, &wallet, options).await?;

        let network = gateway.network(&self.config.channel);
        tracing::debug!(
            identity = %gateway.identity(),
            channel = %network.name(),
            wallet = %wallet.path().display(),
            "Connection context ready"
        );
        Ok(network.contract(&self.config.chaincode))
    }

    /// Submit `CreateAsset(id, value)`.
    pub async fn create_asset(&self, id: &str, value: &str) -> FabricResult<()> {
        let contract = self.connect().await?;
        contract.submit_transaction("CreateAsset", &[id, value]).await?;
        tracing::info!(asset_id = %id, chaincode = %contract.chaincode(), "Asset created");
        Ok(())
    }

    /// Evaluate `ReadAsset(id)` and return the raw result.
    pub async fn read_asset(&self, id: &str) -> FabricResult<Vec<u8>> {
        let contract = self.connect().await?;
        contract.evaluate_transaction("ReadAsset", &[id]).await
    }

    /// Evaluate `GetAllAssets()` and return the raw result.
    pub async fn list_assets(&self) -> FabricResult<Vec<u8>> {
        let contract = self.connect().await?;
        contract.evaluate_transaction("GetAllAssets", &[]).await
    }
}

impl std::fmt::Debug for BridgeService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BridgeService")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
