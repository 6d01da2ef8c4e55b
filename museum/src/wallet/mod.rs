//! Wallet and chain capability boundary, plus the value-transfer executor.
//!
//! The executor only talks to the [`Wallet`] and [`ChainClient`] traits; the
//! alloy-backed implementations live in `evm.rs`.

mod evm;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use alloy::network::TransactionBuilder;
use alloy::primitives::{Address, Bytes, TxHash, B256, U256};
use alloy::rpc::types::TransactionRequest;
use alloy::signers::local::PrivateKeySigner;
use bevy::prelude::*;
use crossbeam_channel::Sender;

use crate::catalog::ModelRecord;
use crate::error::{MintError, TransactionError};

pub use evm::{EvmTransferBackend, LocalWallet, RpcChainClient};

/// Ticker of the devnet's native currency, shown next to prices.
pub const NATIVE_SYMBOL: &str = "ETH";

/// Gas for a plain value transfer.
pub const TRANSFER_GAS_LIMIT: u64 = 21_000;

/// Network state a transfer is built against.
///
/// `recent_blockhash` is informational on EVM: it is logged with the
/// transfer but not part of the signed payload. Replay protection comes from
/// `nonce` and `chain_id`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChainContext {
    pub recent_blockhash: B256,
    pub nonce: u64,
    pub chain_id: u64,
    pub max_fee_per_gas: u128,
    pub max_priority_fee_per_gas: u128,
}

/// An unsigned single-instruction value transfer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransferDraft {
    pub from: Address,
    pub to: Address,
    pub value: U256,
    pub gas_limit: u64,
    pub context: ChainContext,
}

impl TransferDraft {
    /// Placeholder mint: the sender pays the price to itself. No distinguishable
    /// asset is created.
    pub fn to_self(from: Address, value: U256, context: ChainContext) -> Self {
        Self {
            from,
            to: from,
            value,
            gas_limit: TRANSFER_GAS_LIMIT,
            context,
        }
    }

    pub fn to_request(&self) -> TransactionRequest {
        TransactionRequest::default()
            .with_from(self.from)
            .with_to(self.to)
            .with_value(self.value)
            .with_nonce(self.context.nonce)
            .with_chain_id(self.context.chain_id)
            .with_gas_limit(self.gas_limit)
            .with_max_fee_per_gas(self.context.max_fee_per_gas)
            .with_max_priority_fee_per_gas(self.context.max_priority_fee_per_gas)
    }
}

/// Shared flag checked between transfer steps; set on teardown.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    pub fn check(&self) -> Result<(), TransactionError> {
        if self.is_cancelled() {
            Err(TransactionError::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// Signing capability of a connected wallet.
#[allow(async_fn_in_trait)]
pub trait Wallet {
    fn address(&self) -> Address;

    /// Returns the signed transaction in its raw wire encoding.
    async fn sign(&self, draft: &TransferDraft) -> Result<Bytes, TransactionError>;
}

/// Network client of the devnet.
#[allow(async_fn_in_trait)]
pub trait ChainClient {
    async fn recent_context(&self, from: Address) -> Result<ChainContext, TransactionError>;

    async fn submit_raw(&self, raw: &Bytes) -> Result<TxHash, TransactionError>;

    /// Resolves once the transaction is included. No timeout; only `cancel`
    /// stops the wait.
    async fn confirm(&self, hash: TxHash, cancel: &CancelToken) -> Result<(), TransactionError>;
}

/// Runs one placeholder mint: fetch context, build a self-transfer of the
/// record's price, sign, submit, confirm. Nothing is retried.
///
/// Without a wallet this returns [`MintError::WalletNotConnected`] before
/// touching the network.
pub async fn execute_transfer<W: Wallet, C: ChainClient>(
    wallet: Option<&W>,
    client: &C,
    record: &ModelRecord,
    cancel: &CancelToken,
) -> Result<TxHash, MintError> {
    let Some(wallet) = wallet else {
        return Err(MintError::WalletNotConnected);
    };
    let value = record.base_units()?;
    let from = wallet.address();

    let context = client.recent_context(from).await?;
    cancel.check()?;
    debug!(
        "building transfer of {value} wei for {} at block {}",
        record.display_name, context.recent_blockhash
    );

    let draft = TransferDraft::to_self(from, value, context);
    let raw = wallet.sign(&draft).await?;
    cancel.check()?;

    let hash = client.submit_raw(&raw).await?;
    info!("submitted {hash} for {}", record.display_name);

    client.confirm(hash, cancel).await?;
    info!("confirmed {hash}");
    Ok(hash)
}

/// What a backend needs to run one transfer.
#[derive(Clone, Debug)]
pub struct TransferRequest {
    pub record: ModelRecord,
    pub wallet: Option<LocalWallet>,
}

/// Result of one transfer, sent back to the ECS over a channel.
#[derive(Clone, Debug)]
pub struct TransferOutcome {
    pub record: ModelRecord,
    /// Transaction id on success.
    pub result: Result<String, MintError>,
}

/// Runs transfers off the main thread and reports on `outcomes`.
pub trait TransferBackend: Send + Sync + 'static {
    fn spawn(
        &self,
        request: TransferRequest,
        outcomes: Sender<TransferOutcome>,
        cancel: CancelToken,
    );
}

/// Connection state of the local signer.
#[derive(Resource, Default)]
pub struct WalletSession {
    configured: Option<LocalWallet>,
    active: Option<LocalWallet>,
}

impl WalletSession {
    pub fn new(signer: Option<PrivateKeySigner>) -> Self {
        Self {
            configured: signer.map(LocalWallet::new),
            active: None,
        }
    }

    pub fn can_connect(&self) -> bool {
        self.configured.is_some()
    }

    /// Returns whether a wallet is connected afterwards.
    pub fn connect(&mut self) -> bool {
        if self.active.is_none() {
            self.active = self.configured.clone();
            if let Some(wallet) = &self.active {
                info!("wallet connected: {}", wallet.address());
            }
        }
        self.active.is_some()
    }

    pub fn disconnect(&mut self) {
        if self.active.take().is_some() {
            info!("wallet disconnected");
        }
    }

    pub fn is_connected(&self) -> bool {
        self.active.is_some()
    }

    pub fn address(&self) -> Option<Address> {
        self.active.as_ref().map(Wallet::address)
    }

    pub fn active(&self) -> Option<&LocalWallet> {
        self.active.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::address;

    fn context() -> ChainContext {
        ChainContext {
            recent_blockhash: B256::repeat_byte(0xab),
            nonce: 7,
            chain_id: 31337,
            max_fee_per_gas: 2_000_000_000,
            max_priority_fee_per_gas: 1_000_000_000,
        }
    }

    #[test]
    fn draft_pays_the_sender() {
        let from = address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266");
        let draft = TransferDraft::to_self(from, U256::from(10u64), context());

        assert_eq!(draft.to, from);
        assert_eq!(draft.gas_limit, TRANSFER_GAS_LIMIT);

        let request = draft.to_request();
        assert_eq!(request.from, Some(from));
        assert_eq!(request.value, Some(U256::from(10u64)));
        assert_eq!(request.nonce, Some(7));
        assert_eq!(request.chain_id, Some(31337));
    }

    #[test]
    fn blockhash_does_not_change_the_signed_request() {
        let from = address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266");
        let other = ChainContext {
            recent_blockhash: B256::repeat_byte(0xcd),
            ..context()
        };

        let a = TransferDraft::to_self(from, U256::from(10u64), context()).to_request();
        let b = TransferDraft::to_self(from, U256::from(10u64), other).to_request();

        assert_eq!(a, b);
    }

    #[test]
    fn cancel_token_is_shared_between_clones() {
        let token = CancelToken::new();
        let clone = token.clone();
        assert!(clone.check().is_ok());

        token.cancel();

        assert!(clone.is_cancelled());
        assert_eq!(clone.check(), Err(TransactionError::Cancelled));
    }

    #[test]
    fn session_without_signer_cannot_connect() {
        let mut session = WalletSession::new(None);

        assert!(!session.connect());
        assert!(session.address().is_none());
    }

    #[test]
    fn session_connects_and_disconnects() {
        let signer: PrivateKeySigner =
            "0x59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d"
                .parse()
                .unwrap();
        let expected = signer.address();
        let mut session = WalletSession::new(Some(signer));

        assert!(!session.is_connected());
        assert!(session.connect());
        assert_eq!(session.address(), Some(expected));

        session.disconnect();
        assert!(!session.is_connected());
        assert!(session.can_connect());
    }
}
