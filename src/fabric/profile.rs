//! Connection profile loading and gateway peer selection.
//!
//! # Responsibilities
//! - Read and parse the JSON connection profile (common connection profile
//!   format produced by the Fabric test network)
//! - Pick the gateway peer for the client organization
//! - Rewrite peer endpoints for local networks (`as_localhost`)
//! - Resolve the peer's TLS root certificate (inline PEM or file path)

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;
use url::Url;

use crate::fabric::types::{DiscoveryOptions, FabricError, FabricResult};

/// Parsed connection profile.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionProfile {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub version: String,

    #[serde(default)]
    pub client: Option<ClientSection>,

    /// Organizations keyed by name (e.g. "Org1").
    #[serde(default)]
    pub organizations: BTreeMap<String, Organization>,

    /// Peers keyed by name (e.g. "peer0.org1.example.com").
    #[serde(default)]
    pub peers: BTreeMap<String, PeerConfig>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientSection {
    /// Organization the client acts on behalf of.
    pub organization: Option<String>,

    #[serde(default)]
    pub connection: Option<ClientConnection>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ClientConnection {
    #[serde(default)]
    pub timeout: Option<ConnectionTimeouts>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ConnectionTimeouts {
    #[serde(default)]
    pub peer: Option<PeerTimeouts>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PeerTimeouts {
    /// Endorser timeout in seconds.
    #[serde(default)]
    pub endorser: Option<Seconds>,
}

/// Profiles written by hand use numbers, generated ones use strings ("300").
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum Seconds {
    Number(u64),
    Text(String),
}

impl Seconds {
    pub fn as_secs(&self) -> Option<u64> {
        match self {
            Seconds::Number(n) => Some(*n),
            Seconds::Text(s) => s.trim().parse().ok(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Organization {
    pub mspid: String,

    #[serde(default)]
    pub peers: Vec<String>,

    #[serde(default)]
    pub certificate_authorities: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PeerConfig {
    /// Peer endpoint, `grpcs://host:port` or `grpc://host:port`.
    pub url: String,

    #[serde(rename = "tlsCACerts", default)]
    pub tls_ca_certs: Option<TlsCaCerts>,

    #[serde(default)]
    pub grpc_options: GrpcOptions,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TlsCaCerts {
    #[serde(default)]
    pub pem: Option<String>,

    #[serde(default)]
    pub path: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct GrpcOptions {
    #[serde(rename = "ssl-target-name-override", default)]
    pub ssl_target_name_override: Option<String>,

    #[serde(rename = "hostnameOverride", default)]
    pub hostname_override: Option<String>,
}

/// Where and how to reach the gateway peer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayEndpoint {
    pub peer_name: String,
    pub msp_id: String,
    /// `http://` or `https://` URI usable by the gRPC transport.
    pub uri: String,
    pub tls: Option<TlsSettings>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsSettings {
    pub ca_pem: Vec<u8>,
    /// Name expected in the peer's certificate.
    pub domain: String,
}

impl ConnectionProfile {
    /// Read and parse a profile from disk.
    pub async fn load(path: &Path) -> FabricResult<Self> {
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            FabricError::Profile(format!(
                "Failed to read connection profile {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_json(&content).map_err(|e| match e {
            FabricError::Profile(msg) => {
                FabricError::Profile(format!("{} ({})", msg, path.display()))
            }
            other => other,
        })
    }

    /// Parse a profile from JSON text.
    pub fn from_json(content: &str) -> FabricResult<Self> {
        serde_json::from_str(content)
            .map_err(|e| FabricError::Profile(format!("Failed to parse connection profile: {}", e)))
    }

    /// The organization the client belongs to: `client.organization`, or
    /// the first organization listed when the profile names none.
    pub fn client_organization(&self) -> FabricResult<(&str, &Organization)> {
        let named = self.client.as_ref().and_then(|c| c.organization.as_deref());
        match named {
            Some(name) => self
                .organizations
                .get_key_value(name)
                .map(|(k, v)| (k.as_str(), v))
                .ok_or_else(|| {
                    FabricError::Profile(format!(
                        "Client organization {} is not defined in the connection profile",
                        name
                    ))
                }),
            None => self
                .organizations
                .iter()
                .next()
                .map(|(k, v)| (k.as_str(), v))
                .ok_or_else(|| {
                    FabricError::Profile("Connection profile defines no organizations".to_string())
                }),
        }
    }

    /// MSP IDs of every organization in the profile.
    pub fn msp_ids(&self) -> Vec<String> {
        self.organizations.values().map(|o| o.mspid.clone()).collect()
    }

    /// Endorser timeout from `client.connection.timeout.peer.endorser`.
    pub fn endorser_timeout(&self) -> Option<Duration> {
        self.client
            .as_ref()?
            .connection
            .as_ref()?
            .timeout
            .as_ref()?
            .peer
            .as_ref()?
            .endorser
            .as_ref()?
            .as_secs()
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }

    /// Resolve the endpoint of the client organization's gateway peer.
    pub async fn gateway_endpoint(
        &self,
        discovery: DiscoveryOptions,
    ) -> FabricResult<GatewayEndpoint> {
        let (org_name, org) = self.client_organization()?;

        let (peer_name, peer) = org
            .peers
            .iter()
            .find_map(|name| self.peers.get(name).map(|p| (name.clone(), p)))
            .ok_or_else(|| {
                FabricError::Profile(format!(
                    "No peers defined for organization {} in the connection profile",
                    org_name
                ))
            })?;

        let target = PeerTarget::parse(&peer.url, discovery.as_localhost)?;

        let tls = if target.secure {
            let ca_pem = peer_tls_ca(&peer_name, peer).await?;
            let domain = peer
                .grpc_options
                .ssl_target_name_override
                .clone()
                .or_else(|| peer.grpc_options.hostname_override.clone())
                .unwrap_or_else(|| target.original_host.clone());
            Some(TlsSettings { ca_pem, domain })
        } else {
            None
        };

        Ok(GatewayEndpoint {
            peer_name,
            msp_id: org.mspid.clone(),
            uri: target.uri,
            tls,
        })
    }
}

/// Peer URL translated for the gRPC transport.
#[derive(Debug)]
struct PeerTarget {
    uri: String,
    secure: bool,
    original_host: String,
}

impl PeerTarget {
    fn parse(raw: &str, as_localhost: bool) -> FabricResult<Self> {
        let parsed = Url::parse(raw)
            .map_err(|e| FabricError::Profile(format!("Invalid peer URL '{}': {}", raw, e)))?;

        let secure = match parsed.scheme() {
            "grpcs" | "https" => true,
            "grpc" | "http" => false,
            other => {
                return Err(FabricError::Profile(format!(
                    "Unsupported peer URL scheme '{}' in '{}'",
                    other, raw
                )))
            }
        };
        let original_host = parsed
            .host_str()
            .ok_or_else(|| FabricError::Profile(format!("Peer URL '{}' has no host", raw)))?
            .to_string();
        let port = parsed
            .port_or_known_default()
            .ok_or_else(|| FabricError::Profile(format!("Peer URL '{}' has no port", raw)))?;

        let host = if as_localhost { "localhost" } else { original_host.as_str() };
        let scheme = if secure { "https" } else { "http" };

        Ok(Self {
            uri: format!("{}://{}:{}", scheme, host, port),
            secure,
            original_host,
        })
    }
}

async fn peer_tls_ca(peer_name: &str, peer: &PeerConfig) -> FabricResult<Vec<u8>> {
    let certs = peer.tls_ca_certs.as_ref().ok_or_else(|| {
        FabricError::Profile(format!("No tlsCACerts defined for TLS peer {}", peer_name))
    })?;

    if let Some(pem) = &certs.pem {
        return Ok(pem.as_bytes().to_vec());
    }
    if let Some(path) = &certs.path {
        return tokio::fs::read(path).await.map_err(|e| {
            FabricError::Profile(format!(
                "Failed to read TLS CA certificate {} for peer {}: {}",
                path, peer_name, e
            ))
        });
    }
    Err(FabricError::Profile(format!(
        "tlsCACerts for peer {} has neither pem nor path",
        peer_name
    )))
}
