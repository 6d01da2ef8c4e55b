//! Mint flow: status state machine, dispatch to the transfer backend, and
//! draining outcomes back into the ECS.

use std::collections::{HashMap, HashSet};

use bevy::prelude::*;
use crossbeam_channel::{Receiver, Sender};

use crate::catalog::ModelRecord;
use crate::error::{MintError, TransactionError};
use crate::ownership::OwnershipRecord;
use crate::wallet::{CancelToken, TransferBackend, TransferOutcome, TransferRequest, WalletSession};

const MAX_OUTCOMES_PER_FRAME: usize = 8;

/// Status line shown to the user. Stays until the next attempt overwrites it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum TransactionStatus {
    #[default]
    Idle,
    Pending {
        model: String,
    },
    Succeeded {
        model: String,
        id: String,
    },
    Failed {
        message: String,
    },
}

impl TransactionStatus {
    pub fn failed(err: &MintError) -> Self {
        let message = match err {
            MintError::WalletNotConnected => err.to_string(),
            MintError::Transaction(inner) => format!("Minting failed: {inner}"),
        };
        Self::Failed { message }
    }

    pub fn text(&self) -> Option<String> {
        match self {
            Self::Idle => None,
            Self::Pending { .. } => Some("Minting...".to_string()),
            Self::Succeeded { model, id } => Some(format!("Successfully minted {model}! TX: {id}")),
            Self::Failed { message } => Some(message.clone()),
        }
    }

    pub fn tx_id(&self) -> Option<&str> {
        match self {
            Self::Succeeded { id, .. } => Some(id),
            _ => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending { .. })
    }
}

/// Tracks the visible status and which models have a transfer in flight.
#[derive(Resource, Default, Debug)]
pub struct MintLedger {
    status: TransactionStatus,
    in_flight: HashSet<String>,
}

impl MintLedger {
    pub fn status(&self) -> &TransactionStatus {
        &self.status
    }

    pub fn is_in_flight(&self, model: &str) -> bool {
        self.in_flight.contains(model)
    }

    /// Starts a mint for `record`. Returns the request to hand to a backend,
    /// or `None` when there is nothing to send: no wallet (status becomes
    /// Failed) or a transfer for the same model still pending (ignored).
    pub fn begin(
        &mut self,
        record: &ModelRecord,
        wallet: &WalletSession,
    ) -> Option<TransferRequest> {
        if !wallet.is_connected() {
            self.status = TransactionStatus::failed(&MintError::WalletNotConnected);
            return None;
        }
        if !self.in_flight.insert(record.display_name.clone()) {
            warn!(
                "transfer for {} already pending, ignoring click",
                record.display_name
            );
            return None;
        }
        self.status = TransactionStatus::Pending {
            model: record.display_name.clone(),
        };
        Some(TransferRequest {
            record: record.clone(),
            wallet: wallet.active().cloned(),
        })
    }

    /// Applies a finished transfer. Ownable models are marked owned on success.
    pub fn settle(&mut self, outcome: TransferOutcome, ownership: &mut OwnershipRecord) {
        let name = outcome.record.display_name;
        self.in_flight.remove(&name);
        match outcome.result {
            Ok(id) => {
                info!("minted {name}: {id}");
                if outcome.record.ownable {
                    ownership.set_owned(&name);
                }
                self.status = TransactionStatus::Succeeded { model: name, id };
            }
            Err(MintError::Transaction(TransactionError::Cancelled)) => {
                debug!("transfer for {name} cancelled");
            }
            Err(err) => {
                error!("minting {name} failed: {err}");
                self.status = TransactionStatus::failed(&err);
            }
        }
    }
}

/// A click resolved to a recorded exhibit.
#[derive(Event, Clone, Debug)]
pub struct MintRequested {
    pub record: ModelRecord,
}

/// Bevy resource owning the backend and the channel its threads report on.
/// Dropping it cancels everything still in flight.
#[derive(Resource)]
pub struct TransferChannel {
    backend: Box<dyn TransferBackend>,
    sender: Sender<TransferOutcome>,
    receiver: Receiver<TransferOutcome>,
    tokens: HashMap<String, CancelToken>,
}

impl TransferChannel {
    pub fn new(backend: impl TransferBackend) -> Self {
        Self::from_boxed(Box::new(backend))
    }

    pub fn from_boxed(backend: Box<dyn TransferBackend>) -> Self {
        let (sender, receiver) = crossbeam_channel::unbounded();
        Self {
            backend,
            sender,
            receiver,
            tokens: HashMap::new(),
        }
    }

    pub fn dispatch(&mut self, request: TransferRequest) {
        let cancel = CancelToken::new();
        self.tokens
            .insert(request.record.display_name.clone(), cancel.clone());
        self.backend.spawn(request, self.sender.clone(), cancel);
    }

    pub fn try_recv(&mut self) -> Option<TransferOutcome> {
        let outcome = self.receiver.try_recv().ok()?;
        self.tokens.remove(&outcome.record.display_name);
        Some(outcome)
    }

    pub fn in_flight(&self) -> usize {
        self.tokens.len()
    }

    pub fn cancel_all(&mut self) {
        for (model, token) in self.tokens.drain() {
            debug!("cancelling transfer for {model}");
            token.cancel();
        }
    }
}

impl Drop for TransferChannel {
    fn drop(&mut self) {
        self.cancel_all();
    }
}

pub fn mint_plugin(app: &mut App) {
    app.add_event::<MintRequested>()
        .init_resource::<MintLedger>()
        .add_systems(
            Update,
            (dispatch_mint_requests, drain_transfer_outcomes).chain(),
        );
}

fn dispatch_mint_requests(
    mut requests: EventReader<MintRequested>,
    wallet: Res<WalletSession>,
    mut ledger: ResMut<MintLedger>,
    mut channel: ResMut<TransferChannel>,
) {
    for MintRequested { record } in requests.read() {
        if let Some(request) = ledger.begin(record, &wallet) {
            channel.dispatch(request);
        }
    }
}

fn drain_transfer_outcomes(
    mut channel: ResMut<TransferChannel>,
    mut ledger: ResMut<MintLedger>,
    mut ownership: ResMut<OwnershipRecord>,
) {
    for _ in 0..MAX_OUTCOMES_PER_FRAME {
        let Some(outcome) = channel.try_recv() else {
            break;
        };
        ledger.settle(outcome, &mut ownership);
    }
}
