//! Devnet wallet and client: local signer + alloy HTTP provider on a
//! dedicated thread per transfer.

use std::thread;
use std::time::Duration;

use alloy::eips::eip2718::Encodable2718;
use alloy::eips::BlockNumberOrTag;
use alloy::network::{EthereumWallet, TransactionBuilder};
use alloy::primitives::{Address, Bytes, TxHash};
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::signers::local::PrivateKeySigner;
use bevy::log::{debug, error};
use crossbeam_channel::Sender;
use url::Url;

use super::{
    execute_transfer, CancelToken, ChainClient, ChainContext, TransferBackend, TransferDraft,
    TransferOutcome, TransferRequest, Wallet,
};
use crate::error::{MintError, TransactionError};

const CONFIRM_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// In-process secp256k1 signer standing in for a browser wallet.
#[derive(Clone, Debug)]
pub struct LocalWallet {
    signer: PrivateKeySigner,
    wallet: EthereumWallet,
}

impl LocalWallet {
    pub fn new(signer: PrivateKeySigner) -> Self {
        let wallet = EthereumWallet::from(signer.clone());
        Self { signer, wallet }
    }
}

impl Wallet for LocalWallet {
    fn address(&self) -> Address {
        self.signer.address()
    }

    async fn sign(&self, draft: &TransferDraft) -> Result<Bytes, TransactionError> {
        let envelope = draft
            .to_request()
            .build(&self.wallet)
            .await
            .map_err(|err| TransactionError::Signing(err.to_string()))?;
        Ok(envelope.encoded_2718().into())
    }
}

/// JSON-RPC client for the devnet endpoint.
#[derive(Clone)]
pub struct RpcChainClient {
    provider: DynProvider,
}

impl RpcChainClient {
    pub fn connect_http(rpc_url: Url) -> Self {
        Self {
            provider: ProviderBuilder::new().connect_http(rpc_url).erased(),
        }
    }
}

impl ChainClient for RpcChainClient {
    async fn recent_context(&self, from: Address) -> Result<ChainContext, TransactionError> {
        let fetch_err = |err: alloy::transports::TransportError| {
            TransactionError::Blockhash(err.to_string())
        };

        let block = self
            .provider
            .get_block_by_number(BlockNumberOrTag::Latest)
            .await
            .map_err(fetch_err)?
            .ok_or_else(|| TransactionError::Blockhash("latest block unavailable".into()))?;
        let nonce = self
            .provider
            .get_transaction_count(from)
            .pending()
            .await
            .map_err(fetch_err)?;
        let chain_id = self.provider.get_chain_id().await.map_err(fetch_err)?;
        let fees = self
            .provider
            .estimate_eip1559_fees()
            .await
            .map_err(fetch_err)?;

        Ok(ChainContext {
            recent_blockhash: block.header.hash,
            nonce,
            chain_id,
            max_fee_per_gas: fees.max_fee_per_gas,
            max_priority_fee_per_gas: fees.max_priority_fee_per_gas,
        })
    }

    async fn submit_raw(&self, raw: &Bytes) -> Result<TxHash, TransactionError> {
        let pending = self
            .provider
            .send_raw_transaction(raw)
            .await
            .map_err(|err| TransactionError::Submission(err.to_string()))?;
        Ok(*pending.tx_hash())
    }

    async fn confirm(&self, hash: TxHash, cancel: &CancelToken) -> Result<(), TransactionError> {
        loop {
            cancel.check()?;
            let receipt = self
                .provider
                .get_transaction_receipt(hash)
                .await
                .map_err(|err| TransactionError::Confirmation(err.to_string()))?;
            match receipt {
                Some(receipt) if receipt.status() => return Ok(()),
                Some(_) => return Err(TransactionError::Reverted(hash.to_string())),
                None => tokio::time::sleep(CONFIRM_POLL_INTERVAL).await,
            }
        }
    }
}

/// Runs each transfer on its own thread with a current-thread tokio runtime.
pub struct EvmTransferBackend {
    rpc_url: Url,
}

impl EvmTransferBackend {
    pub fn new(rpc_url: Url) -> Self {
        Self { rpc_url }
    }
}

impl TransferBackend for EvmTransferBackend {
    fn spawn(
        &self,
        request: TransferRequest,
        outcomes: Sender<TransferOutcome>,
        cancel: CancelToken,
    ) {
        let rpc_url = self.rpc_url.clone();
        thread::spawn(move || {
            let rt = match tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
            {
                Ok(rt) => rt,
                Err(err) => {
                    error!("failed to build tokio runtime: {err}");
                    let _ = outcomes.send(TransferOutcome {
                        record: request.record,
                        result: Err(MintError::Transaction(TransactionError::Submission(
                            err.to_string(),
                        ))),
                    });
                    return;
                }
            };

            let client = RpcChainClient::connect_http(rpc_url);
            let result = rt.block_on(execute_transfer(
                request.wallet.as_ref(),
                &client,
                &request.record,
                &cancel,
            ));

            if cancel.is_cancelled() {
                debug!(
                    "transfer for {} cancelled, dropping outcome",
                    request.record.display_name
                );
                return;
            }
            // Receiver gone means the app has shut down.
            let _ = outcomes.send(TransferOutcome {
                record: request.record,
                result: result.map(|hash| hash.to_string()),
            });
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wallet::TRANSFER_GAS_LIMIT;
    use alloy::consensus::{Transaction, TxEnvelope};
    use alloy::eips::eip2718::Decodable2718;
    use alloy::primitives::{B256, U256};

    const ANVIL_KEY_0: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    #[tokio::test]
    async fn local_wallet_signs_decodable_self_transfer() {
        let wallet = LocalWallet::new(ANVIL_KEY_0.parse().unwrap());
        let from = wallet.address();
        let draft = TransferDraft::to_self(
            from,
            U256::from(10_000_000_000_000_000u128),
            ChainContext {
                recent_blockhash: B256::ZERO,
                nonce: 3,
                chain_id: 31337,
                max_fee_per_gas: 2_000_000_000,
                max_priority_fee_per_gas: 1_000_000_000,
            },
        );

        let raw = wallet.sign(&draft).await.unwrap();
        let envelope = TxEnvelope::decode_2718(&mut raw.as_ref()).unwrap();

        assert_eq!(envelope.nonce(), 3);
        assert_eq!(envelope.chain_id(), Some(31337));
        assert_eq!(envelope.gas_limit(), TRANSFER_GAS_LIMIT);
        assert_eq!(envelope.to(), Some(from));
        assert_eq!(envelope.value(), U256::from(10_000_000_000_000_000u128));
    }
}
