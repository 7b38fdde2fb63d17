use axum::Router;
use clap::{Parser, Subcommand};
use matching_engine::instrument::{Asset, Pair};
use matching_engine::{api, market_maker, simulate, state::AppState};
use serde_json::json;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "matching-engine")]
#[command(version = "0.1", about = "A limit-order matching engine with an HTTP/WS front-end")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the server plus a market maker and a noisy-flow simulator
    Simulate { port: u16, secs: u64 },
    /// Run the HTTP/WS server only
    Server { port: u16 },
}

/// Token cancelled on ctrl-c, shared by every long-running task.
fn shutdown_token() -> CancellationToken {
    let token = CancellationToken::new();
    let tc = token.clone();
    tokio::spawn(async move {
        signal::ctrl_c()
            .await
            .expect("failed to install ctrl+C handler");
        tc.cancel();
    });
    token
}

async fn wait_for_server(api_base: &str) -> anyhow::Result<()> {
    let client = reqwest::Client::new();
    loop {
        match client
            .get(format!(
                "{}/book/bbo/{}",
                api_base,
                Pair::crypto_usd(Asset::BTC).code()
            ))
            .send()
            .await
        {
            Ok(resp) if resp.status().is_success() => break,
            _ => tokio::time::sleep(Duration::from_millis(25)).await,
        };
    }
    Ok(())
}

async fn seed_book(ep: &str) -> anyhow::Result<()> {
    // Seed the book with a resting bid @48 and ask @52
    let client = reqwest::Client::new();
    for (side, price) in &[("buy", 48.0), ("sell", 52.0)] {
        client
            .post(format!("{}/order/submit", ep))
            .json(&json!({
                "symbol": Pair::crypto_usd(Asset::BTC).code(),
                "side": side,
                "order_type": "limit",
                "price": price,
                "qty": 10,
            }))
            .send()
            .await?
            .error_for_status()?;
        tracing::info!(side, price, "seeded resting orders");
    }
    Ok(())
}

async fn get_app_listener(port: u16, state: AppState) -> anyhow::Result<(TcpListener, Router)> {
    let app = api::router(state);
    let ep = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(ep).await?;
    Ok((listener, app))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let state = AppState::new();
    let token = shutdown_token();
    let server_token = token.clone();
    let mm_token = token.clone();
    let sim_token = token.clone();

    let cli = Cli::parse();
    let base = "http://127.0.0.1".to_string();
    match cli.command {
        // runs the system with a market-maker bot and a simulator client
        Commands::Simulate { port, secs } => {
            let mut handlers = tokio::task::JoinSet::new();
            let (listener, app) = get_app_listener(port, state.clone()).await?;
            handlers.spawn(async move {
                tracing::info!("HTTP/WS server listening on 0.0.0.0:{}", port);
                axum::serve(listener, app)
                    .with_graceful_shutdown(server_token.cancelled_owned())
                    .await
                    .expect("server task failed");
            });
            let ep = format!("{base}:{port}");
            tracing::info!("end_point: {}", ep);
            wait_for_server(&ep).await?;
            seed_book(&ep).await?;

            let pair = Pair::crypto_usd(Asset::BTC);
            let mm_base = ep.clone();
            let mm_pair = pair.clone();
            handlers.spawn(async move {
                if let Err(e) = market_maker::run_market_maker(&mm_base, mm_pair, mm_token).await {
                    tracing::error!("Market maker exited: {:?}", e);
                }
            });
            handlers.spawn(async move {
                if let Err(e) = simulate::run_simulation(
                    simulate::SimConfig {
                        api_base: ep,
                        pair,
                        run_secs: if secs == 0 { None } else { Some(secs) },
                        attack_rate_hz: 5.0,
                        noise_sigma: 0.25,
                        mean_qty: 3.0,
                    },
                    sim_token,
                )
                .await
                {
                    tracing::error!("Simulation error: {:?}", e);
                }
            });
            handlers.join_all().await;
        }
        Commands::Server { port } => {
            let (listener, app) = get_app_listener(port, state.clone()).await?;
            let svh = tokio::spawn(async move {
                tracing::info!("HTTP/WS server listening on 0.0.0.0:{}", port);
                axum::serve(listener, app)
                    .with_graceful_shutdown(server_token.cancelled_owned())
                    .await
                    .expect("server task failed");
            });
            svh.await?;
        }
    };
    Ok(())
}
