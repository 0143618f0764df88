use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("Input {index} not found in utxo set")]
    InputReference { index: usize },
    #[error("Invalid signature on transaction kernel")]
    BadSignature,
    #[error("Output {index} already present in utxo set")]
    DuplicateOutput { index: usize },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WalletError {
    #[error("Not enough coins: have {available}, need {requested}")]
    InsufficientFunds { available: u64, requested: u64 },
    #[error("Incorrect opening information, the slate does not carry the stated amount")]
    OpeningMismatch,
}
