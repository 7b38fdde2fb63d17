//! A small two-sided quoting bot used by the `simulate` subcommand.
//!
//! The bot watches the engine's websocket feed for top-of-book updates,
//! tracks the mid price, and keeps one bid and one ask resting a fixed
//! spread either side of it. When the mid moves it cancels its previous
//! quotes and posts fresh ones, so there is always passive liquidity for
//! the simulator's aggressive flow to hit.

use futures_util::StreamExt;
use serde_json::json;
use tokio::{sync::watch, time};
use tokio_tungstenite::{connect_async, tungstenite::protocol::Message as WsMsg};
use tokio_util::sync::CancellationToken;

use crate::{
    api::{OrderAck, WsFrame},
    errors::MarketMakerError,
    instrument::Pair,
};

// how far from mid to quote
const SPREAD: f64 = 0.5;
// milliseconds between quote refreshes
const PACE_MS: u64 = 500;

/// Starts the market maker loop against a REST+WS API at `api_base`.
///
/// 1. Connects to `ws://{api_base}/ws/{symbol}` (retrying until the server
///    is up) and spawns a task that turns `bbo` frames into mid-price
///    updates on a `tokio::watch` channel.
/// 2. Ticks every `PACE_MS` ms: when the mid has moved, cancels the
///    previously posted quotes and posts a fresh buy at `mid - SPREAD` and
///    sell at `mid + SPREAD`, remembering the acked order ids for the next
///    cancellation round.
pub async fn run_market_maker(
    api_base: &str,
    target_pair: Pair,
    token: CancellationToken,
) -> Result<(), MarketMakerError> {
    let ws_url = format!(
        "ws://{host}/ws/{symbol}",
        host = api_base.trim_start_matches("http://"),
        symbol = target_pair.code()
    );
    tracing::info!(url = %ws_url, "market maker: connecting");
    let ws_stream = loop {
        match connect_async(&ws_url).await {
            Ok((stream, _)) => {
                tracing::info!("market maker: ws connected");
                break stream;
            }
            Err(e) => {
                tracing::warn!("market maker: ws connect failed: {e}; retrying...");
                tokio::time::sleep(std::time::Duration::from_millis(100)).await
            }
        }
    };

    let (_write, read) = ws_stream.split();

    // latest observed mid price
    let (mid_tx, mid_rx) = watch::channel(None::<f64>);

    let watched = target_pair.code();
    let frames = read.filter_map(|msg| async move {
        match msg {
            Ok(WsMsg::Text(txt)) => match serde_json::from_str::<WsFrame>(&txt) {
                Ok(frame) => Some(frame),
                Err(err) => {
                    tracing::warn!("invalid WS frame: {err}");
                    None
                }
            },
            _ => None,
        }
    });
    tokio::spawn(async move {
        tokio::pin!(frames);
        while let Some(frame) = frames.next().await {
            if let WsFrame::Bbo { symbol, bbo } = frame {
                if symbol != watched {
                    continue;
                }
                if let (Some(bb), Some(aa)) = (bbo.bids.first(), bbo.asks.first()) {
                    let _ = mid_tx.send(Some((bb.price + aa.price) / 2.0));
                }
            }
        }
    });

    let client = reqwest::Client::new();
    let mut outstanding: Vec<String> = Vec::new();
    let mut interval = time::interval(time::Duration::from_millis(PACE_MS));
    let mut last_mid = None;
    loop {
        tokio::select! {
            // cancellation wins instantly
            _ = token.cancelled() => {
                tracing::info!("market maker: shutdown requested, tearing down...");
                break;
            }
            _ = interval.tick() => {
                // only quote once we have a mid price
                let mid_opt: Option<f64> = *mid_rx.borrow();
                let Some(mid) = mid_opt else { continue };
                if Some(mid) == last_mid {
                    continue;
                }

                // market moved: clear stale quotes, then re-quote both sides
                for id in outstanding.drain(..) {
                    let _ = client
                        .delete(format!(
                            "{}/order/cancel/{}/{}",
                            api_base,
                            target_pair.code(),
                            id
                        ))
                        .send()
                        .await;
                }
                for (side, price) in [("buy", mid - SPREAD), ("sell", mid + SPREAD)] {
                    let price = (price.max(0.01) * 100.0).round() / 100.0;
                    tracing::info!(side, price, "posting quote");
                    if let Ok(resp) = client
                        .post(format!("{}/order/submit", api_base))
                        .json(&json!({
                            "symbol": target_pair.code(),
                            "side": side,
                            "order_type": "limit",
                            "price": price,
                            "qty": 1,
                        }))
                        .send()
                        .await
                    {
                        if let Ok(ack) = resp.json::<OrderAck>().await {
                            outstanding.push(ack.order_id);
                        }
                    }
                }
                last_mid = Some(mid);
            }
        }
    }
    Ok(())
}
