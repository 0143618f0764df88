//! Mimblewimble-style confidential transactions.
//!
//! Amounts are hidden in Pedersen [`Commitment`]s. A [`Ledger`] keeps only
//! the set of unspent commitments and accepts a [`Transaction`] when its
//! kernel [`Signature`] proves the transaction's rollup carries no value
//! term. Two [`Wallet`]s build a transaction interactively: the sender
//! produces a [`Slate`] and the receiver completes it.

#[macro_use]
extern crate lazy_static;

#[cfg(test)]
extern crate quickcheck;
#[cfg(test)]
#[macro_use(quickcheck)]
extern crate quickcheck_macros;

pub mod commitment;
pub mod constants;
pub mod crypto;
mod errors;
pub use errors::{LedgerError, WalletError};
pub mod ledger;
pub mod signature;
pub mod transaction;
pub mod wallet;

pub use commitment::Commitment;
pub use crypto::{RistrettoPoint, Scalar};
pub use ledger::{Ledger, UtxoView};
pub use signature::Signature;
pub use transaction::{Opening, OwnedOutput, PartialTransactionBuilder, Transaction};
pub use wallet::{Slate, TransferState, Wallet};
