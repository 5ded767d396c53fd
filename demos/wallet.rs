//! Wallet
//!
//! This example walks through a wallet held in a dispatcher.
//!
//! Key concepts:
//! - Reducers change state synchronously through `update`
//! - Actions run asynchronously through `send` and can nest updates
//! - Every completed operation lands in the history
//! - State change notifications arrive through a spawned notifier
//!
//! Run with: cargo run --example wallet

use frostbox::core::{BoxError, State};
use frostbox::dispatch::{Action, Dispatcher, Reducer, Scope};
use std::sync::Arc;

#[derive(Clone, PartialEq, Debug)]
struct Wallet {
    amount: i64,
}

impl State for Wallet {}

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    let store = Dispatcher::new(Wallet { amount: 0 });

    let add = Reducer::new("add", |mut wallet: Wallet, amount: &i64| {
        wallet.amount += amount;
        Ok(wallet)
    });

    let deposit = {
        let add = add.clone();
        Action::new(
            "deposit",
            move |_wallet: Arc<Wallet>, amount: i64, store: Dispatcher<Wallet>| {
                let add = add.clone();
                async move {
                    store.update(&add, amount)?;
                    Ok::<(), BoxError>(())
                }
            },
        )
    };

    store.on_action(Scope::All, |wallet, _argument, name| {
        println!("{name} finished, amount is {}", wallet.amount);
        Ok(())
    });
    store.on_state_change(|wallet, previous| {
        println!("changed from {} to {}", previous.amount, wallet.amount);
        Ok(())
    });
    let notifier = store.spawn_notifier();

    store.update(&add, 3)?;
    store.send(&deposit, 7).await?;
    store.next(&deposit, 5).await?;

    tokio::task::yield_now().await;
    store.flush_notifications();
    notifier.abort();

    println!("\nHistory:");
    for entry in store.history().entries() {
        println!("  {:?} {} -> {}", entry.kind, entry.name, entry.state.amount);
    }
    println!("\nFinal amount: {}", store.state().amount);

    Ok(())
}
