//! The UTXO ledger. It stores commitments only and never sees a value.

use std::collections::HashSet;

use tracing::{debug, warn};

use crate::{Commitment, LedgerError, Transaction};

/// Read-only membership view over a set of unspent commitments.
pub trait UtxoView {
    fn contains(&self, commitment: &Commitment) -> bool;
}

#[derive(Clone, Debug, Default)]
pub struct Ledger {
    utxo: HashSet<Commitment>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the ledger with genesis outputs. These are trusted as given and
    /// carry no kernel.
    pub fn from_genesis<I>(outputs: I) -> Result<Self, LedgerError>
    where
        I: IntoIterator<Item = Commitment>,
    {
        let mut utxo = HashSet::new();
        for (index, output) in outputs.into_iter().enumerate() {
            if !utxo.insert(output) {
                return Err(LedgerError::DuplicateOutput { index });
            }
        }
        debug!(utxo_count = utxo.len(), "initialised ledger from genesis");
        Ok(Ledger { utxo })
    }

    /// Validate `tx` against the current UTXO set and, only if every check
    /// passes, replace its inputs by its outputs.
    ///
    /// The kernel signature is checked against the transaction's rollup.
    /// A valid signature proves the rollup is `r * H` for some `r` known to
    /// the builders, so the net value is zero. There is no separate
    /// "rollup is identity" check.
    pub fn process(&mut self, tx: &Transaction) -> Result<(), LedgerError> {
        let mut spent = HashSet::with_capacity(tx.inputs().len());
        for (index, input) in tx.inputs().iter().enumerate() {
            if !self.utxo.contains(input) || !spent.insert(*input) {
                warn!(index, "transaction input not found in utxo set");
                return Err(LedgerError::InputReference { index });
            }
        }

        if !tx.verify_kernel() {
            warn!("invalid signature on transaction kernel");
            return Err(LedgerError::BadSignature);
        }

        // An output may reuse a commitment this transaction spends.
        let mut created = HashSet::with_capacity(tx.outputs().len());
        for (index, output) in tx.outputs().iter().enumerate() {
            let live = self.utxo.contains(output) && !spent.contains(output);
            if live || !created.insert(*output) {
                warn!(index, "transaction output already present in utxo set");
                return Err(LedgerError::DuplicateOutput { index });
            }
        }

        for input in &spent {
            self.utxo.remove(input);
        }
        self.utxo.extend(created);
        debug!(
            inputs = tx.inputs().len(),
            outputs = tx.outputs().len(),
            utxo_count = self.utxo.len(),
            "applied transaction"
        );
        Ok(())
    }

    pub fn contains(&self, commitment: &Commitment) -> bool {
        self.utxo.contains(commitment)
    }

    pub fn len(&self) -> usize {
        self.utxo.len()
    }

    pub fn is_empty(&self) -> bool {
        self.utxo.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Commitment> {
        self.utxo.iter()
    }
}

impl UtxoView for Ledger {
    fn contains(&self, commitment: &Commitment) -> bool {
        Ledger::contains(self, commitment)
    }
}

impl UtxoView for HashSet<Commitment> {
    fn contains(&self, commitment: &Commitment) -> bool {
        HashSet::contains(self, commitment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::random_nonzero_scalar;
    use crate::{OwnedOutput, PartialTransactionBuilder, Signature};
    use curve25519_dalek::scalar::Scalar;
    use rand_chacha::ChaCha20Rng;
    use rand_core::SeedableRng;
    use std::sync::{Arc, Mutex};
    use std::thread;

    fn genesis(csprng: &mut ChaCha20Rng, value: u64) -> (OwnedOutput, Ledger) {
        let output = OwnedOutput::generate_with_rng(value, csprng);
        let ledger = Ledger::from_genesis(vec![output.commitment()])
            .expect("Genesis with one output is valid");
        (output, ledger)
    }

    // Spend `input` fully into outputs of the given values, balanced in one go.
    fn spend(csprng: &mut ChaCha20Rng, input: OwnedOutput, values: &[u64]) -> (Transaction, Vec<OwnedOutput>) {
        let outputs: Vec<OwnedOutput> = values
            .iter()
            .map(|v| OwnedOutput::generate_with_rng(*v, &mut *csprng))
            .collect();
        let excess_blind = random_nonzero_scalar(csprng);
        let (tx, opening) = PartialTransactionBuilder::new(vec![input], outputs.clone())
            .close_with_rng(&excess_blind, csprng);
        assert_eq!(opening.value, 0);
        (tx, outputs)
    }

    #[quickcheck]
    fn balanced_transaction_should_swap_commitments(seed: u64, value: u32, split: u32) -> bool {
        let mut csprng: ChaCha20Rng = SeedableRng::seed_from_u64(seed);
        let total = value as u64 + split as u64;
        let (genesis_output, mut ledger) = genesis(&mut csprng, total);
        let (tx, outputs) = spend(&mut csprng, genesis_output, &[value as u64, split as u64]);
        ledger.process(&tx).is_ok()
            && !ledger.contains(&genesis_output.commitment())
            && outputs.iter().all(|o| ledger.contains(&o.commitment()))
            && ledger.len() == 2
    }

    #[quickcheck]
    fn inflating_transaction_should_be_rejected(seed: u64, value: u32) -> bool {
        let mut csprng: ChaCha20Rng = SeedableRng::seed_from_u64(seed);
        let (genesis_output, mut ledger) = genesis(&mut csprng, value as u64);
        let minted = OwnedOutput::generate_with_rng(value as u64 + 1, &mut csprng);
        let (tx, opening) = PartialTransactionBuilder::new(vec![genesis_output], vec![minted])
            .close_with_rng(&random_nonzero_scalar(&mut csprng), &mut csprng);
        assert_eq!(opening.value, -1);
        ledger.process(&tx) == Err(LedgerError::BadSignature)
            && ledger.contains(&genesis_output.commitment())
            && ledger.len() == 1
    }

    #[test]
    fn double_spend_should_fail_with_input_reference() {
        let mut csprng: ChaCha20Rng = SeedableRng::seed_from_u64(3);
        let (genesis_output, mut ledger) = genesis(&mut csprng, 1000);
        let (first, _) = spend(&mut csprng, genesis_output, &[400, 600]);
        let (second, _) = spend(&mut csprng, genesis_output, &[1000]);
        ledger.process(&first).expect("First spend should be accepted");
        assert_eq!(
            ledger.process(&second),
            Err(LedgerError::InputReference { index: 0 })
        );
        assert_eq!(
            ledger.process(&first),
            Err(LedgerError::InputReference { index: 0 })
        );
        assert_eq!(ledger.len(), 2);
    }

    #[test]
    fn repeated_input_within_transaction_should_fail() {
        let mut csprng: ChaCha20Rng = SeedableRng::seed_from_u64(4);
        let (genesis_output, mut ledger) = genesis(&mut csprng, 1000);
        let doubled = OwnedOutput::generate_with_rng(2000, &mut csprng);
        let (tx, opening) =
            PartialTransactionBuilder::new(vec![genesis_output, genesis_output], vec![doubled])
                .close_with_rng(&random_nonzero_scalar(&mut csprng), &mut csprng);
        assert_eq!(opening.value, 0);
        assert_eq!(
            ledger.process(&tx),
            Err(LedgerError::InputReference { index: 1 })
        );
        assert!(ledger.contains(&genesis_output.commitment()));
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn unknown_input_should_leave_ledger_untouched() {
        let mut csprng: ChaCha20Rng = SeedableRng::seed_from_u64(5);
        let (genesis_output, mut ledger) = genesis(&mut csprng, 1000);
        let fabricated = OwnedOutput::generate_with_rng(1000, &mut csprng);
        let (tx, _) = spend(&mut csprng, fabricated, &[1000]);
        let before: HashSet<Commitment> = ledger.iter().copied().collect();
        assert_eq!(
            ledger.process(&tx),
            Err(LedgerError::InputReference { index: 0 })
        );
        let after: HashSet<Commitment> = ledger.iter().copied().collect();
        assert_eq!(before, after);
        assert!(ledger.contains(&genesis_output.commitment()));
    }

    #[test]
    fn forged_signature_should_be_rejected() {
        let mut csprng: ChaCha20Rng = SeedableRng::seed_from_u64(6);
        let (genesis_output, mut ledger) = genesis(&mut csprng, 1000);
        let (tx, _) = spend(&mut csprng, genesis_output, &[1000]);
        let forged = Transaction::new(
            tx.inputs().to_vec(),
            tx.outputs().to_vec(),
            *tx.kernel_excess(),
            Signature::from_parts(tx.signature().s() + Scalar::one(), *tx.signature().nonce_point()),
        );
        assert_eq!(ledger.process(&forged), Err(LedgerError::BadSignature));
        assert!(ledger.contains(&genesis_output.commitment()));
        ledger.process(&tx).expect("Untampered transaction should be accepted");
    }

    #[test]
    fn existing_output_should_be_rejected_as_duplicate() {
        let mut csprng: ChaCha20Rng = SeedableRng::seed_from_u64(7);
        let first = OwnedOutput::generate_with_rng(500, &mut csprng);
        let second = OwnedOutput::generate_with_rng(500, &mut csprng);
        let mut ledger = Ledger::from_genesis(vec![first.commitment(), second.commitment()])
            .expect("Distinct genesis outputs are valid");
        // Spending `first` into a copy of `second` is balanced but would
        // insert an existing commitment.
        let excess_blind = random_nonzero_scalar(&mut csprng);
        let (tx, opening) = PartialTransactionBuilder::new(vec![first], vec![second])
            .close_with_rng(&excess_blind, &mut csprng);
        assert_eq!(opening.value, 0);
        assert_eq!(
            ledger.process(&tx),
            Err(LedgerError::DuplicateOutput { index: 0 })
        );
        assert!(ledger.contains(&first.commitment()));
        assert_eq!(ledger.len(), 2);
    }

    #[test]
    fn repeated_output_within_transaction_should_fail() {
        let mut csprng: ChaCha20Rng = SeedableRng::seed_from_u64(10);
        let (genesis_output, mut ledger) = genesis(&mut csprng, 1000);
        let half = OwnedOutput::generate_with_rng(500, &mut csprng);
        let (tx, opening) = PartialTransactionBuilder::new(vec![genesis_output], vec![half, half])
            .close_with_rng(&random_nonzero_scalar(&mut csprng), &mut csprng);
        assert_eq!(opening.value, 0);
        assert_eq!(
            ledger.process(&tx),
            Err(LedgerError::DuplicateOutput { index: 1 })
        );
        assert!(ledger.contains(&genesis_output.commitment()));
        assert!(!ledger.contains(&half.commitment()));
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn output_may_recreate_spent_input() {
        let mut csprng: ChaCha20Rng = SeedableRng::seed_from_u64(11);
        let (genesis_output, mut ledger) = genesis(&mut csprng, 1000);
        let (tx, opening) = PartialTransactionBuilder::new(vec![genesis_output], vec![genesis_output])
            .close_with_rng(&random_nonzero_scalar(&mut csprng), &mut csprng);
        assert_eq!(opening.value, 0);
        ledger.process(&tx).expect("Spending into the same commitment is balanced");
        assert!(ledger.contains(&genesis_output.commitment()));
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn duplicate_genesis_should_be_rejected() {
        let mut csprng: ChaCha20Rng = SeedableRng::seed_from_u64(8);
        let output = OwnedOutput::generate_with_rng(1, &mut csprng);
        assert_eq!(
            Ledger::from_genesis(vec![output.commitment(), output.commitment()]).err(),
            Some(LedgerError::DuplicateOutput { index: 1 })
        );
    }

    #[test]
    fn racing_spends_should_admit_exactly_one() {
        let mut csprng: ChaCha20Rng = SeedableRng::seed_from_u64(9);
        let (genesis_output, ledger) = genesis(&mut csprng, 1000);
        let ledger = Arc::new(Mutex::new(ledger));
        let candidates: Vec<Transaction> = (0..4)
            .map(|i| spend(&mut csprng, genesis_output, &[1000 - i, i]).0)
            .collect();
        let handles: Vec<_> = candidates
            .into_iter()
            .map(|tx| {
                let ledger = Arc::clone(&ledger);
                thread::spawn(move || ledger.lock().unwrap().process(&tx))
            })
            .collect();
        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(results
            .iter()
            .filter(|r| r.is_err())
            .all(|r| *r == Err(LedgerError::InputReference { index: 0 })));
        assert_eq!(ledger.lock().unwrap().len(), 2);
    }
}
