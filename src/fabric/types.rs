//! Gateway-facing types and error definitions.

use thiserror::Error;

// Discovery options are configured, not negotiated.
pub use crate::config::schema::DiscoveryConfig as DiscoveryOptions;

/// Errors that can occur while reaching or invoking the ledger.
#[derive(Debug, Error)]
pub enum FabricError {
    /// Connection profile could not be read or parsed.
    #[error("{0}")]
    Profile(String),

    /// Wallet directory or identity file could not be accessed.
    #[error("Wallet error: {0}")]
    Wallet(String),

    /// The requested identity label is not in the wallet.
    #[error("Identity not found in wallet: {0}")]
    IdentityNotFound(String),

    /// Identity credentials are malformed (certificate or private key).
    #[error("Invalid identity: {0}")]
    Identity(String),

    /// Gateway peer could not be reached.
    #[error("Failed to connect to gateway: {0}")]
    Connection(String),

    /// A gateway call failed; the message carries per-endorser details.
    #[error("{0}")]
    Rpc(String),

    /// The transaction was ordered but did not commit as valid.
    #[error("Transaction {tx_id} failed to commit with status code {code} ({status})")]
    Commit {
        tx_id: String,
        code: i32,
        status: &'static str,
    },

    /// A gateway call timed out.
    #[error("{operation} timed out after {secs} seconds")]
    Timeout { operation: &'static str, secs: u64 },

    /// A gateway response could not be decoded.
    #[error("Failed to decode {0}")]
    Decode(String),
}

/// Result type for ledger operations.
pub type FabricResult<T> = Result<T, FabricError>;

/// Whether a transaction reads (evaluate) or writes (submit) ledger state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InvocationKind {
    Evaluate,
    Submit,
}

impl InvocationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvocationKind::Evaluate => "evaluate",
            InvocationKind::Submit => "submit",
        }
    }
}

/// A single chaincode function call against one channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub channel: String,
    pub chaincode: String,
    pub transaction: String,
    /// Positional string arguments, in call order.
    pub args: Vec<String>,
}

impl Invocation {
    /// The chaincode argument list: function name followed by its arguments.
    pub fn chaincode_args(&self) -> Vec<Vec<u8>> {
        std::iter::once(self.transaction.as_bytes().to_vec())
            .chain(self.args.iter().map(|a| a.as_bytes().to_vec()))
            .collect()
    }
}

/// Transaction validation codes reported by the committing peer.
///
/// Only the commonly seen codes get a name; everything else maps to
/// "INVALID_OTHER_REASON" in messages.
pub fn validation_code_name(code: i32) -> &'static str {
    match code {
        0 => "VALID",
        1 => "NIL_ENVELOPE",
        2 => "BAD_PAYLOAD",
        3 => "BAD_COMMON_HEADER",
        4 => "BAD_CREATOR_SIGNATURE",
        5 => "INVALID_ENDORSER_TRANSACTION",
        6 => "INVALID_CONFIG_TRANSACTION",
        7 => "UNSUPPORTED_TX_PAYLOAD",
        8 => "BAD_PROPOSAL_TXID",
        9 => "DUPLICATE_TXID",
        10 => "ENDORSEMENT_POLICY_FAILURE",
        11 => "MVCC_READ_CONFLICT",
        12 => "PHANTOM_READ_CONFLICT",
        13 => "UNKNOWN_TX_TYPE",
        14 => "TARGET_CHAIN_NOT_FOUND",
        15 => "MARSHAL_TX_ERROR",
        16 => "NIL_TXACTION",
        17 => "EXPIRED_CHAINCODE",
        18 => "CHAINCODE_VERSION_CONFLICT",
        19 => "BAD_HEADER_EXTENSION",
        20 => "BAD_CHANNEL_HEADER",
        21 => "BAD_RESPONSE_PAYLOAD",
        22 => "BAD_RWSET",
        23 => "ILLEGAL_WRITESET",
        24 => "INVALID_WRITESET",
        25 => "INVALID_CHAINCODE",
        254 => "NOT_VALIDATED",
        _ => "INVALID_OTHER_REASON",
    }
}
