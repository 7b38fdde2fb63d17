//! Simulation harness for noisy order flow against the engine.

use rand::Rng;
use rand_distr::{Distribution, Exp, Exp1, Normal};
use reqwest::{Client, ClientBuilder};
use serde_json::json;
use std::time::{Duration, Instant};
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::api::OrderAck;
use crate::instrument::Pair;

#[derive(Clone)]
pub struct SimConfig {
    pub api_base: String,
    pub pair: Pair,
    pub run_secs: Option<u64>,
    pub attack_rate_hz: f64, // Poisson rate λ
    pub noise_sigma: f64,    // N(0, σ) drift applied to mid each tick
    pub mean_qty: f64,       // average order size (unit-exp * mean_qty)
}

/// Pick an order type for the next tick. Mostly plain limit orders, with an
/// occasional market, immediate-or-cancel or fill-or-kill thrown in so every
/// matching path sees traffic.
fn random_order_type() -> &'static str {
    match rand::rng().random_range(0..10) {
        0 => "market",
        1 => "ioc",
        2 => "fok",
        _ => "limit",
    }
}

/// Noisy order-flow loop: exponential inter-arrival times, a drifting mid,
/// and orders quoted one spread either side of it.
pub async fn run_simulation(cfg: SimConfig, cancel_token: CancellationToken) -> anyhow::Result<()> {
    // A small client timeout is helpful under load; tweak as desired.
    let client: Client = ClientBuilder::new()
        .timeout(Duration::from_secs(5))
        .build()?;

    let ia = Exp::new(cfg.attack_rate_hz).expect("attack_rate_hz must be > 0");
    let drift = Normal::new(0.0, cfg.noise_sigma).expect("noise_sigma >= 0");
    let size = Exp1;

    let mut iv: i64 = 0;
    let mut pnl: f64 = 0.0;
    let mut mid: f64 = 50.0;
    let start = Instant::now();

    let spread = 1.0_f64;

    loop {
        // hard stop
        if let Some(max_secs) = cfg.run_secs {
            if start.elapsed().as_secs() >= max_secs {
                break;
            }
        }

        // exponential inter-arrival
        let wait_secs: f64 = ia.sample(&mut rand::rng());
        tokio::select! {
            _ = cancel_token.cancelled() => {
                info!("received shutdown; exiting simulation loop");
                break;
            }
            _ = sleep(Duration::from_secs_f64(wait_secs)) => {}
        }

        // size ~ Exp1 * mean_qty  (and round to >= 1)
        let unit: f64 = size.sample(&mut rand::rng());
        let qty = (unit * cfg.mean_qty).max(1.0).round() as u64;

        // mid drift, floored so quotes stay positive
        mid = (mid + drift.sample(&mut rand::rng())).max(2.0 * spread);

        let (price, side) = if rand::rng().random_bool(0.5) {
            (mid - spread, "buy")
        } else {
            (mid + spread, "sell")
        };
        // snap to the engine's two-decimal tick grid
        let price = (price * 100.0).round() / 100.0;

        let order_type = random_order_type();
        let mut body = json!({
            "symbol": cfg.pair.code(),
            "side": side,
            "qty": qty,
            "order_type": order_type,
        });
        if order_type != "market" {
            body["price"] = json!(price);
        }

        // place the order; on failure, warn and continue
        match client
            .post(format!("{}/order/submit", cfg.api_base))
            .json(&body)
            .send()
            .await
        {
            Ok(resp) => {
                if let Err(e) = resp.error_for_status_ref() {
                    warn!(error = %e, "order post returned non-success");
                    continue;
                }
                match resp.json::<OrderAck>().await {
                    Ok(ack) => {
                        for t in &ack.trades {
                            let q = t.qty as f64;
                            if side == "buy" {
                                iv -= t.qty as i64; // maker sold to us
                                pnl += t.price * q;
                            } else {
                                iv += t.qty as i64; // maker bought from us
                                pnl -= t.price * q;
                            }
                        }
                        info!(
                            elapsed = format_args!("{:.1}s", start.elapsed().as_secs_f64()),
                            side,
                            order_type,
                            qty,
                            price = format_args!("{price:.2}"),
                            status = ?ack.status,
                            mid = format_args!("{mid:.2}"),
                            inventory = iv,
                            pnl = format_args!("{pnl:.2}"),
                            "sim tick"
                        );
                    }
                    Err(e) => warn!(error = %e, "failed to parse OrderAck JSON"),
                }
            }
            Err(e) => {
                warn!(error = %e, "HTTP request failed");
                continue;
            }
        }
    }

    info!(
        inventory = iv,
        pnl = format_args!("{pnl:.2}"),
        "simulation done"
    );
    Ok(())
}
