//! Wallet bookkeeping and the interactive two-party transfer.
//!
//! A transfer takes two sequential steps:
//!
//! 1. The sender calls [`Wallet::send`], which spends confirmed outputs into
//!    a change output and returns a [`Slate`]: its half of the transaction
//!    plus the opening `(value, blind)` of that half's rollup.
//! 2. The receiver calls [`Wallet::receive`] on the slate. It checks the
//!    opening, creates an output for the value, cancels the sender's blind
//!    with its own kernel excess, and merges both halves into a balanced
//!    transaction ready for [`Ledger::process`].
//!
//! The slate must travel to the receiver only, over a channel providing
//! confidentiality and integrity. This crate does not provide that channel.

use std::collections::HashSet;

use curve25519_dalek::scalar::Scalar;
#[cfg(feature = "std")]
use rand::thread_rng;
use rand_core::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::crypto::random_nonzero_scalar;
use crate::ledger::{Ledger, UtxoView};
use crate::{
    Commitment, LedgerError, OwnedOutput, PartialTransactionBuilder, Transaction, WalletError,
};

/// What the sender hands to the receiver: its half of the transaction and
/// the opening of that half's rollup. Only the transaction ever becomes
/// public.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Slate {
    transaction: Transaction,
    value: u64,
    blind: Scalar,
}

impl Slate {
    pub fn new(transaction: Transaction, value: u64, blind: Scalar) -> Self {
        Slate {
            transaction,
            value,
            blind,
        }
    }

    pub fn transaction(&self) -> &Transaction {
        &self.transaction
    }

    pub fn value(&self) -> u64 {
        self.value
    }

    pub fn blind(&self) -> &Scalar {
        &self.blind
    }

    /// Whether the disclosed opening reproduces the transaction's rollup.
    pub fn opening_matches(&self) -> bool {
        self.transaction.rollup() == Commitment::new(self.value, &self.blind)
    }
}

/// Lifecycle of a single transfer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TransferState {
    Unsent,
    AwaitingReceive(Slate),
    Finalized(Transaction),
    Confirmed,
    Rejected(LedgerError),
}

impl TransferState {
    /// Submit a finalized transaction to `ledger`. Any other state is
    /// returned unchanged.
    pub fn submit(self, ledger: &mut Ledger) -> TransferState {
        match self {
            TransferState::Finalized(tx) => match ledger.process(&tx) {
                Ok(()) => TransferState::Confirmed,
                Err(e) => TransferState::Rejected(e),
            },
            other => other,
        }
    }
}

/// A single party's set of owned outputs.
///
/// Outputs stay in the wallet after they are selected as inputs. Balances are
/// always reconciled against a [`UtxoView`], so an output used by a transfer
/// that never reaches the ledger remains spendable. [`Wallet::prune_spent`]
/// drops the selected outputs once the ledger shows them spent.
#[derive(Clone, Debug, Default)]
pub struct Wallet {
    outputs: Vec<OwnedOutput>,
    // Commitments of outputs handed out as inputs by `select_inputs_with_rng`.
    selected: HashSet<Commitment>,
}

impl Wallet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_outputs(outputs: Vec<OwnedOutput>) -> Self {
        Wallet {
            outputs,
            selected: HashSet::new(),
        }
    }

    pub fn outputs(&self) -> &[OwnedOutput] {
        &self.outputs
    }

    #[cfg(feature = "std")]
    pub fn generate_output(&mut self, value: u64) -> OwnedOutput {
        self.generate_output_with_rng(value, &mut thread_rng())
    }

    /// Create an output of `value` under a fresh blind and record it.
    /// Afterwards the wallet holds exactly one more output, the returned one.
    pub fn generate_output_with_rng<T: RngCore + CryptoRng>(
        &mut self,
        value: u64,
        rng: &mut T,
    ) -> OwnedOutput {
        let output = OwnedOutput::generate_with_rng(value, rng);
        self.outputs.push(output);
        debug!(outputs = self.outputs.len(), "generated output");
        output
    }

    /// Owned outputs whose commitments are currently unspent.
    pub fn confirmed_outputs<'a, U: UtxoView>(
        &'a self,
        utxos: &'a U,
    ) -> impl Iterator<Item = &'a OwnedOutput> + 'a {
        self.outputs
            .iter()
            .filter(move |o| utxos.contains(&o.commitment()))
    }

    pub fn confirmed_balance<U: UtxoView>(&self, utxos: &U) -> u64 {
        let balance = self
            .confirmed_outputs(utxos)
            .fold(0u64, |acc, o| acc.saturating_add(o.value()));
        trace!(balance, "reconciled wallet against utxo set");
        balance
    }

    /// Pick confirmed outputs worth at least `amount`, largest first, and
    /// create a change output for the remainder. Nothing is recorded when
    /// the confirmed outputs fall short.
    pub fn select_inputs_with_rng<U, T>(
        &mut self,
        amount: u64,
        utxos: &U,
        rng: &mut T,
    ) -> Result<(Vec<OwnedOutput>, OwnedOutput), WalletError>
    where
        U: UtxoView,
        T: RngCore + CryptoRng,
    {
        let mut candidates: Vec<OwnedOutput> = self.confirmed_outputs(utxos).copied().collect();
        candidates.sort_by(|a, b| b.value().cmp(&a.value()));

        let mut selected = Vec::new();
        let mut total: u128 = 0;
        for candidate in candidates {
            if total >= amount as u128 {
                break;
            }
            total += candidate.value() as u128;
            selected.push(candidate);
        }

        if total < amount as u128 {
            let available = self.confirmed_balance(utxos);
            warn!(available, requested = amount, "insufficient confirmed funds");
            return Err(WalletError::InsufficientFunds {
                available,
                requested: amount,
            });
        }

        // The last selected output alone exceeds the shortfall before it, so
        // the change never exceeds a single u64 output value.
        let change = (total - amount as u128) as u64;
        debug!(inputs = selected.len(), "selected inputs");
        self.selected.extend(selected.iter().map(OwnedOutput::commitment));
        let change_output = self.generate_output_with_rng(change, rng);
        Ok((selected, change_output))
    }

    /// Forget outputs that were selected as inputs and are no longer in
    /// `utxos`, returning how many were dropped.
    ///
    /// Outputs never selected are kept even when `utxos` lacks them: change
    /// and received outputs of a transfer that has not been confirmed yet
    /// stay in the wallet. Selected outputs still present in `utxos` stay
    /// spendable.
    pub fn prune_spent<U: UtxoView>(&mut self, utxos: &U) -> usize {
        let before = self.outputs.len();
        let selected = &mut self.selected;
        self.outputs.retain(|o| {
            let commitment = o.commitment();
            if selected.contains(&commitment) && !utxos.contains(&commitment) {
                selected.remove(&commitment);
                false
            } else {
                true
            }
        });
        let pruned = before - self.outputs.len();
        debug!(pruned, outputs = self.outputs.len(), "pruned spent outputs");
        pruned
    }

    #[cfg(feature = "std")]
    pub fn send<U: UtxoView>(&mut self, amount: u64, utxos: &U) -> Result<Slate, WalletError> {
        self.send_with_rng(amount, utxos, &mut thread_rng())
    }

    /// Build the sender's half of a transfer of `amount`.
    pub fn send_with_rng<U, T>(
        &mut self,
        amount: u64,
        utxos: &U,
        rng: &mut T,
    ) -> Result<Slate, WalletError>
    where
        U: UtxoView,
        T: RngCore + CryptoRng,
    {
        let (inputs, change) = self.select_inputs_with_rng(amount, utxos, rng)?;
        let excess_blind = random_nonzero_scalar(rng);
        let (transaction, opening) =
            PartialTransactionBuilder::new(inputs, vec![change]).close_with_rng(&excess_blind, rng);
        assert_eq!(opening.value, amount as i128);
        debug!(
            inputs = transaction.inputs().len(),
            outputs = transaction.outputs().len(),
            "created slate"
        );
        Ok(Slate::new(transaction, amount, opening.blind))
    }

    #[cfg(feature = "std")]
    pub fn receive(&mut self, slate: &Slate) -> Result<Transaction, WalletError> {
        self.receive_with_rng(slate, &mut thread_rng())
    }

    /// Complete a transfer from `slate`, returning the balanced transaction.
    ///
    /// Fails with [`WalletError::OpeningMismatch`] before touching the wallet
    /// if the disclosed opening does not match the sender's rollup, which
    /// guards against being told of more coins than the transaction carries.
    pub fn receive_with_rng<T: RngCore + CryptoRng>(
        &mut self,
        slate: &Slate,
        rng: &mut T,
    ) -> Result<Transaction, WalletError> {
        if !slate.opening_matches() {
            warn!("slate opening does not match its transaction");
            return Err(WalletError::OpeningMismatch);
        }

        let output = self.generate_output_with_rng(slate.value(), rng);
        let excess_blind = output.blind() - slate.blind();
        let (transaction, opening) =
            PartialTransactionBuilder::new(vec![], vec![output]).close_with_rng(&excess_blind, rng);
        debug_assert_eq!(opening.value + slate.value() as i128, 0);
        debug_assert!(opening.blind + slate.blind() == Scalar::zero());

        let merged = slate.transaction().merge(&transaction);
        debug!(
            inputs = merged.inputs().len(),
            outputs = merged.outputs().len(),
            "finalized transfer"
        );
        Ok(merged)
    }
}
