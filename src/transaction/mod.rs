use curve25519_dalek::scalar::Scalar;
#[cfg(feature = "std")]
use rand::thread_rng;
use rand_core::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};

use crate::crypto::random_nonzero_scalar;
use crate::{Commitment, Signature};

/// An output whose opening is known to its owner. Lives only inside a wallet.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct OwnedOutput {
    value: u64,
    blind: Scalar,
}

impl OwnedOutput {
    pub fn new(value: u64, blind: Scalar) -> Self {
        OwnedOutput { value, blind }
    }

    /// Create an output of `value` under a fresh blind.
    pub fn generate_with_rng<T: RngCore + CryptoRng>(value: u64, rng: &mut T) -> Self {
        OwnedOutput::new(value, random_nonzero_scalar(rng))
    }

    pub fn value(&self) -> u64 {
        self.value
    }

    pub fn blind(&self) -> &Scalar {
        &self.blind
    }

    /// The public commitment for this output.
    pub fn commitment(&self) -> Commitment {
        Commitment::new(self.value, &self.blind)
    }
}

/// Opening `(value, blind)` of a transaction's rollup. The value is signed:
/// a receiving half carries a negative net value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Opening {
    pub value: i128,
    pub blind: Scalar,
}

impl Opening {
    pub fn commitment(&self) -> Commitment {
        Commitment::from_opening(self.value, &self.blind)
    }
}

/// Immutable bundle of input and output commitments plus the kernel
/// (excess commitment and its signature).
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Transaction {
    inputs: Vec<Commitment>,
    outputs: Vec<Commitment>,
    kernel_excess: Commitment,
    signature: Signature,
}

impl Transaction {
    pub(crate) fn new(
        inputs: Vec<Commitment>,
        outputs: Vec<Commitment>,
        kernel_excess: Commitment,
        signature: Signature,
    ) -> Self {
        Transaction {
            inputs,
            outputs,
            kernel_excess,
            signature,
        }
    }

    pub fn inputs(&self) -> &[Commitment] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[Commitment] {
        &self.outputs
    }

    pub fn kernel_excess(&self) -> &Commitment {
        &self.kernel_excess
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// `kernel_excess + sum(inputs) - sum(outputs)`, which commits to the
    /// transaction's net value under its net blind.
    pub fn rollup(&self) -> Commitment {
        self.inputs.iter().fold(self.kernel_excess, |acc, i| &acc + i)
            - self.outputs.iter().sum::<Commitment>()
    }

    /// Whether the kernel signature proves the rollup is a pure multiple of
    /// the blinding generator, i.e. the transaction is balanced.
    pub fn verify_kernel(&self) -> bool {
        self.signature.verify(&self.rollup())
    }

    /// Combine two halves: inputs and outputs are concatenated, kernels and
    /// signatures are added.
    pub fn merge(&self, other: &Transaction) -> Transaction {
        Transaction::new(
            self.inputs.iter().chain(&other.inputs).copied().collect(),
            self.outputs.iter().chain(&other.outputs).copied().collect(),
            &self.kernel_excess + &other.kernel_excess,
            self.signature.merge(&other.signature),
        )
    }
}

/// Builds one party's half of a transaction from outputs whose openings it
/// knows.
#[derive(Clone, Debug, Default)]
pub struct PartialTransactionBuilder {
    inputs: Vec<OwnedOutput>,
    outputs: Vec<OwnedOutput>,
}

impl PartialTransactionBuilder {
    pub fn new(inputs: Vec<OwnedOutput>, outputs: Vec<OwnedOutput>) -> Self {
        PartialTransactionBuilder { inputs, outputs }
    }

    pub fn add_input(&mut self, input: OwnedOutput) -> &mut Self {
        self.inputs.push(input);
        self
    }

    pub fn add_output(&mut self, output: OwnedOutput) -> &mut Self {
        self.outputs.push(output);
        self
    }

    /// `sum(input values) - sum(output values)`.
    pub fn net_value(&self) -> i128 {
        let spent: i128 = self.inputs.iter().map(|o| o.value as i128).sum();
        let created: i128 = self.outputs.iter().map(|o| o.value as i128).sum();
        spent - created
    }

    fn net_blind(&self) -> Scalar {
        let spent = self
            .inputs
            .iter()
            .fold(Scalar::zero(), |acc, o| acc + o.blind);
        self.outputs.iter().fold(spent, |acc, o| acc - o.blind)
    }

    /// Close with a freshly drawn excess blind.
    #[cfg(feature = "std")]
    pub fn close(&self) -> (Transaction, Opening) {
        let mut rng = thread_rng();
        let excess_blind = random_nonzero_scalar(&mut rng);
        self.close_with_rng(&excess_blind, &mut rng)
    }

    /// Close the transaction, contributing `excess_blind` as the kernel
    /// excess. Returns the transaction and the opening of its rollup; the
    /// opening is never part of the transaction itself.
    pub fn close_with_rng<T: RngCore + CryptoRng>(
        &self,
        excess_blind: &Scalar,
        rng: &mut T,
    ) -> (Transaction, Opening) {
        let opening = Opening {
            value: self.net_value(),
            blind: self.net_blind() + excess_blind,
        };
        let transaction = Transaction::new(
            self.inputs.iter().map(OwnedOutput::commitment).collect(),
            self.outputs.iter().map(OwnedOutput::commitment).collect(),
            Commitment::excess(excess_blind),
            Signature::sign_with_rng(&opening.blind, rng),
        );
        debug_assert!(transaction.rollup() == opening.commitment());
        (transaction, opening)
    }
}
