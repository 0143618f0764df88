use anyhow::{ensure, Context};
use rand_core::OsRng;
use tracing_subscriber::EnvFilter;

use mw_ledger::{Ledger, OwnedOutput, Wallet};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut csprng = OsRng;
    let genesis_output = OwnedOutput::generate_with_rng(1000, &mut csprng);
    let mut ledger = Ledger::from_genesis(vec![genesis_output.commitment()])?;
    let mut sender = Wallet::from_outputs(vec![genesis_output]);
    let mut receivers: Vec<Wallet> = (0..3).map(|_| Wallet::new()).collect();
    let transaction_values: Vec<u64> = vec![8, 88, 888];

    for (receiver, value) in receivers.iter_mut().zip(&transaction_values) {
        let slate = sender
            .send_with_rng(*value, &ledger, &mut csprng)
            .context("Sender should be able to afford the transfer")?;
        let transaction = receiver.receive_with_rng(&slate, &mut csprng)?;
        ledger.process(&transaction)?;
    }

    let transferred: u64 = transaction_values.iter().sum();
    ensure!(
        sender.confirmed_balance(&ledger) == 1000 - transferred,
        "sender balance should drop by the transferred amount"
    );
    for (receiver, value) in receivers.iter().zip(&transaction_values) {
        ensure!(
            receiver.confirmed_balance(&ledger) == *value,
            "receiver should hold exactly what it was sent"
        );
    }
    println!(
        "sender holds {}, ledger tracks {} unspent commitments",
        sender.confirmed_balance(&ledger),
        ledger.len()
    );
    Ok(())
}
