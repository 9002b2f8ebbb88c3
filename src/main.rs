//! Command-line front end: one-off quotes and a randomized multi-trader
//! simulation that exercises the engine end to end against the in-memory
//! ledger.

use std::sync::Arc;

use alloy::primitives::{Address, B256, U256};
use clap::{Parser, Subcommand};
use eddy::amm::engine::Amm;
use eddy::amm::quote::quote_out;
use eddy::amm::token::TokenId;
use eddy::config::Config;
use eddy::ledger::{InMemoryLedger, Ledger};
use eddy::utils::logger::setup_logger;
use log::{info, warn};

/// Command-line interface definition.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Price a single swap from explicit reserves
    Quote {
        /// Exact input amount
        amount_in: u128,
        /// Reserve on the input side
        reserve_in: u128,
        /// Reserve on the output side
        reserve_out: u128,
        /// Fee override in basis points
        #[arg(long)]
        fee_bps: Option<u16>,
    },
    /// Run a randomized multi-trader simulation on an in-memory ledger
    Simulate {
        /// Number of pools to seed
        #[arg(long, default_value_t = 4)]
        pools: usize,
        /// Number of concurrent traders
        #[arg(long, default_value_t = 8)]
        traders: usize,
        /// Number of trades per trader
        #[arg(long, default_value_t = 250)]
        trades: usize,
    },
}

/// Deterministic address from a small index.
fn address(n: u64) -> Address {
    Address::from_word(B256::from(U256::from(n)))
}

/// Deterministic token from a small index, disjoint from trader accounts.
fn sim_token(n: u64) -> TokenId {
    TokenId::new(address(0xA000 + n))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = Config::from_env();
    setup_logger()?;

    match cli.command {
        Commands::Quote {
            amount_in,
            reserve_in,
            reserve_out,
            fee_bps,
        } => {
            let fee_bps = fee_bps.unwrap_or(config.fee_bps);
            let amount_out = quote_out(amount_in, reserve_in, reserve_out, fee_bps)?;
            println!("{amount_out}");
        }
        Commands::Simulate {
            pools,
            traders,
            trades,
        } => simulate(config, pools, traders, trades).await?,
    }

    Ok(())
}

/// Seeds `pools` pools, lets `traders` concurrent tasks fire `trades`
/// random swaps each, and prints the resulting pool states as JSON.
async fn simulate(
    config: Config,
    pools: usize,
    traders: usize,
    trades: usize,
) -> Result<(), Box<dyn std::error::Error>> {
    let ledger = Arc::new(InMemoryLedger::new());
    let vault = address(0xEE00);
    let amm = Arc::new(Amm::new(
        Arc::clone(&ledger) as Arc<dyn Ledger>,
        vault,
        config.fee_bps,
    ));

    // One provider seeds every pool; pair i links token i and token i+1
    let provider = address(1);
    let deadline = u64::MAX;
    for i in 0..pools {
        let (token_a, token_b) = (sim_token(i as u64), sim_token(i as u64 + 1));
        let (reserve_a, reserve_b) = (
            u128::from(fastrand::u64(100_000..1_000_000)),
            u128::from(fastrand::u64(100_000..1_000_000)),
        );
        for token in [token_a, token_b] {
            ledger.mint(token, provider, reserve_a + reserve_b);
            ledger.approve(token, provider, vault, u128::MAX);
        }
        amm.add_liquidity(
            token_a, token_b, reserve_a, reserve_b, 0, 0, provider, provider, deadline,
        )?;
    }
    info!("seeded {pools} pools with fee {} bps", config.fee_bps);

    let mut handles = Vec::with_capacity(traders);
    for t in 0..traders {
        let amm = Arc::clone(&amm);
        let ledger = Arc::clone(&ledger);
        handles.push(tokio::spawn(async move {
            let trader = address(0x100 + t as u64);
            for i in 0..=pools {
                ledger.mint(sim_token(i as u64), trader, 10_000_000);
                ledger.approve(sim_token(i as u64), trader, amm.vault(), u128::MAX);
            }

            let (mut filled, mut rejected) = (0u64, 0u64);
            for _ in 0..trades {
                let i = fastrand::usize(0..pools) as u64;
                let path = if fastrand::bool() {
                    [sim_token(i), sim_token(i + 1)]
                } else {
                    [sim_token(i + 1), sim_token(i)]
                };
                let amount_in = u128::from(fastrand::u64(1..5_000));
                match amm.swap_exact_tokens_for_tokens(
                    amount_in, 0, &path, trader, trader, deadline,
                ) {
                    Ok(_) => filled += 1,
                    Err(err) => {
                        rejected += 1;
                        log::debug!("trader {trader}: swap rejected: {err}");
                    }
                }
            }
            (filled, rejected)
        }));
    }

    let (mut filled, mut rejected) = (0u64, 0u64);
    for handle in handles {
        let (f, r) = handle.await?;
        filled += f;
        rejected += r;
    }
    info!("simulation done: {filled} swaps filled, {rejected} rejected");
    if rejected > filled {
        warn!("more swaps rejected than filled; consider larger seed reserves");
    }

    println!("{}", serde_json::to_string_pretty(&amm.pools())?);
    Ok(())
}
