use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::json;
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::sync::broadcast;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::{error, warn};

use axum::{
    Json, Router,
    body::Bytes,
    extract::{
        FromRequest, Path, Request, State, WebSocketUpgrade,
        ws::{Message, WebSocket},
    },
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post},
};
use uuid::Uuid;

use crate::{
    events::MarketEvent,
    instrument::Pair,
    orderbook::{BboSnapshot, DepthSnapshot},
    orders::{OrderIntent, OrderStatus, OrderType, Side},
    state::AppState,
    trade::Trade,
};

/// Depth levels served by `GET /book/depth/{symbol}`.
const DEPTH_LEVELS: usize = 5;
/// Trades served by `GET /trades/{symbol}`.
const TRADES_TAIL: usize = 50;

type ApiErr = (StatusCode, Json<serde_json::Value>);
fn err(status: StatusCode, msg: &str) -> ApiErr {
    (status, Json(json!({ "error": msg })))
}

fn log_rejected(payload: &SubmitOrder, reason: &str) {
    warn!(
        reason,
        symbol = %payload.symbol,
        side = ?payload.side,
        order_type = ?payload.order_type,
        price = ?payload.price,
        qty = payload.qty,
        "order rejected"
    );
}

/// Json extractor that logs a capped preview of any body that fails to
/// deserialize, instead of dropping the request silently.
pub struct LoggedJson<T>(pub T);

impl<S, T> FromRequest<S> for LoggedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = ApiErr;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let method = req.method().clone();
        let uri = req.uri().clone();
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| err(StatusCode::BAD_REQUEST, &e.to_string()))?;

        match serde_json::from_slice::<T>(&bytes) {
            Ok(val) => Ok(LoggedJson(val)),
            Err(e) => {
                let preview = String::from_utf8_lossy(&bytes);
                let preview = &preview[..preview.len().min(4096)];
                warn!(
                    error = %e,
                    %method,
                    uri = %uri,
                    body_preview = %preview,
                    "request rejected: JSON deserialization failed"
                );
                Err(err(StatusCode::UNPROCESSABLE_ENTITY, &e.to_string()))
            }
        }
    }
}

/// Request payload for `POST /order/submit`.
///
/// - `symbol`: instrument code, e.g. `"BTC-USD"`
/// - `side`: `buy` or `sell`
/// - `price`: decimal limit price; required unless `order_type` is `market`
/// - `qty`: units to trade, must be positive
/// - `order_type`: `limit`, `market`, `ioc` or `fok`
#[derive(Deserialize)]
pub struct SubmitOrder {
    pub symbol: String,
    pub side: Side,
    pub price: Option<f64>,
    pub qty: u64,
    pub order_type: OrderType,
}

/// A trade as it appears on the wire: tick prices converted back to
/// decimals, timestamp as unix milliseconds.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct TradeMsg {
    pub trade_id: String,
    pub symbol: String,
    pub price: f64,
    pub qty: u64,
    pub aggressor_side: Side,
    pub maker_order_id: String,
    pub taker_order_id: String,
    pub timestamp_ms: u64,
}

impl TradeMsg {
    fn from_trade(pair: &Pair, trade: &Trade) -> Self {
        Self {
            trade_id: trade.trade_id.clone(),
            symbol: trade.symbol.clone(),
            price: pair.ticks_to_price(trade.price),
            qty: trade.qty,
            aggressor_side: trade.aggressor_side,
            maker_order_id: trade.maker_order_id.clone(),
            taker_order_id: trade.taker_order_id.clone(),
            timestamp_ms: unix_millis(trade.timestamp),
        }
    }
}

fn unix_millis(ts: SystemTime) -> u64 {
    ts.duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct LevelMsg {
    pub price: f64,
    pub qty: u64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct BboMsg {
    pub bids: Vec<LevelMsg>,
    pub asks: Vec<LevelMsg>,
}

impl BboMsg {
    fn from_snapshot(pair: &Pair, snap: &BboSnapshot) -> Self {
        let level = |l: &crate::orderbook::BboLevel| LevelMsg {
            price: pair.ticks_to_price(l.price),
            qty: l.qty,
        };
        Self {
            bids: snap.bids.iter().map(level).collect(),
            asks: snap.asks.iter().map(level).collect(),
        }
    }
}

/// Depth as `[price, qty]` pairs per side, best first.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct DepthMsg {
    pub bids: Vec<(f64, u64)>,
    pub asks: Vec<(f64, u64)>,
}

impl DepthMsg {
    fn from_snapshot(pair: &Pair, snap: &DepthSnapshot) -> Self {
        let level = |&(price, qty): &(u64, u64)| (pair.ticks_to_price(price), qty);
        Self {
            bids: snap.bids.iter().map(level).collect(),
            asks: snap.asks.iter().map(level).collect(),
        }
    }
}

/// A websocket push frame, either a trade print or a top-of-book update.
///
/// Serialized as an internally-tagged object:
/// ```text
/// {"type": "trade", "symbol": "BTC-USD", "price": 101.0, ...}
/// {"type": "bbo", "symbol": "BTC-USD", "bbo": {"bids": [...], "asks": [...]}}
/// ```
#[derive(Serialize, Deserialize, Debug)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum WsFrame {
    Trade(TradeMsg),
    Bbo { symbol: String, bbo: BboMsg },
}

/// Response for `POST /order/submit`.
#[derive(Serialize, Deserialize, Debug)]
pub struct OrderAck {
    pub order_id: String,
    pub status: OrderStatus,
    pub trades: Vec<TradeMsg>,
    pub message: String,
}

/// `POST /order/submit`
///
/// Runs the order through its symbol's book and acks with the outcome.
///
/// *Success:* 200, JSON [`OrderAck`] (a rejected fill-or-kill is still a 200
/// with `status: "rejected"`; it is an outcome, not an error)
/// *Bad request:* 400, JSON `{ "error": … }` for a missing price, zero qty,
/// or a price off the tick grid
/// *Unknown symbol:* 404
pub async fn submit_order(
    State(state): State<AppState>,
    LoggedJson(payload): LoggedJson<SubmitOrder>,
) -> Result<Json<OrderAck>, ApiErr> {
    let Ok(pair) = payload.symbol.parse::<Pair>() else {
        log_rejected(&payload, "symbol not found");
        return Err(err(StatusCode::NOT_FOUND, "symbol not found"));
    };
    if payload.qty == 0 {
        log_rejected(&payload, "qty must be > 0");
        return Err(err(StatusCode::BAD_REQUEST, "qty must be > 0"));
    }
    let price = match payload.order_type {
        OrderType::Market => None,
        _ => {
            let Some(price) = payload.price else {
                log_rejected(&payload, "price required for this order type");
                return Err(err(
                    StatusCode::BAD_REQUEST,
                    "price required for this order type",
                ));
            };
            let ticks = pair
                .price_to_ticks(price)
                .map_err(|e| err(StatusCode::BAD_REQUEST, &e.to_string()))?;
            Some(ticks)
        }
    };

    let order_id = Uuid::new_v4().to_string();
    let outcome = {
        let mut books = state.books.write().await;
        let Some(book) = books.get_mut(&pair) else {
            return Err(err(StatusCode::NOT_FOUND, "symbol not found"));
        };
        book.submit(OrderIntent {
            id: order_id.clone(),
            side: payload.side,
            order_type: payload.order_type,
            price,
            qty: payload.qty,
        })
        .map_err(|e| err(StatusCode::BAD_REQUEST, &e.to_string()))?
    };

    Ok(Json(OrderAck {
        order_id,
        status: outcome.status,
        trades: outcome
            .trades
            .iter()
            .map(|t| TradeMsg::from_trade(&pair, t))
            .collect(),
        message: "Order processed".to_string(),
    }))
}

/// `DELETE /order/cancel/{symbol}/{id}`
///
/// A cancel miss is not an error: both outcomes are a 200 with a message,
/// so callers can retry idempotently.
pub async fn cancel_order(
    Path((symbol, order_id)): Path<(String, String)>,
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, ApiErr> {
    let Ok(pair) = symbol.parse::<Pair>() else {
        return Err(err(StatusCode::NOT_FOUND, "symbol not found"));
    };
    let cancelled = {
        let mut books = state.books.write().await;
        match books.get_mut(&pair) {
            Some(book) => book.cancel(&order_id),
            None => return Err(err(StatusCode::NOT_FOUND, "symbol not found")),
        }
    };
    let message = if cancelled { "Canceled" } else { "Order not found" };
    Ok(Json(json!({ "message": message })))
}

/// `GET /book/bbo/{symbol}`
/// Best bid/offer with the aggregate size at each.
pub async fn get_bbo(
    Path(symbol): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<BboMsg>, ApiErr> {
    let Ok(pair) = symbol.parse::<Pair>() else {
        return Err(err(StatusCode::NOT_FOUND, "symbol not found"));
    };
    let books = state.books.read().await;
    let snapshot = books.get(&pair).map(|b| b.bbo()).unwrap_or_default();
    Ok(Json(BboMsg::from_snapshot(&pair, &snapshot)))
}

/// `GET /book/depth/{symbol}`
/// Up to five aggregated levels per side, best first.
pub async fn get_depth(
    Path(symbol): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<DepthMsg>, ApiErr> {
    let Ok(pair) = symbol.parse::<Pair>() else {
        return Err(err(StatusCode::NOT_FOUND, "symbol not found"));
    };
    let books = state.books.read().await;
    let snapshot = books.get(&pair).map(|b| b.depth(DEPTH_LEVELS)).unwrap_or_default();
    Ok(Json(DepthMsg::from_snapshot(&pair, &snapshot)))
}

/// `GET /trades/{symbol}`
/// The last fifty trades, oldest first.
pub async fn get_trades(
    Path(symbol): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<Vec<TradeMsg>>, ApiErr> {
    let Ok(pair) = symbol.parse::<Pair>() else {
        return Err(err(StatusCode::NOT_FOUND, "symbol not found"));
    };
    let books = state.books.read().await;
    let trades = books
        .get(&pair)
        .map(|b| b.recent_trades(TRADES_TAIL))
        .unwrap_or_default();
    Ok(Json(
        trades.iter().map(|t| TradeMsg::from_trade(&pair, t)).collect(),
    ))
}

/// `GET /ws/{symbol}`
/// Upgrades to a WebSocket and streams trade prints and top-of-book updates
/// for one symbol.
pub async fn ws_handler(
    Path(symbol): Path<String>,
    State(state): State<AppState>,
    ws: WebSocketUpgrade,
) -> Result<impl IntoResponse, ApiErr> {
    let Ok(pair) = symbol.parse::<Pair>() else {
        return Err(err(StatusCode::NOT_FOUND, "symbol not found"));
    };
    Ok(ws.on_upgrade(move |socket| handle_socket(socket, state, pair)))
}

/// Drives one subscriber: an initial BBO frame, then every event for the
/// subscribed symbol as it is published. A subscriber that cannot keep up
/// with the broadcast channel skips the missed events rather than stalling
/// the engine.
pub async fn handle_socket(mut socket: WebSocket, state: AppState, pair: Pair) {
    let mut events = state.events.subscribe();

    let initial = {
        let books = state.books.read().await;
        books.get(&pair).map(|b| b.bbo()).unwrap_or_default()
    };
    let frame = WsFrame::Bbo {
        symbol: pair.code(),
        bbo: BboMsg::from_snapshot(&pair, &initial),
    };
    if let Err(e) = send_frame(&mut socket, &frame).await {
        error!("failed to send initial bbo frame: {e:?}");
        return;
    }

    loop {
        match events.recv().await {
            Ok(event) => {
                if event.symbol() != pair.code() {
                    continue;
                }
                let frame = match event {
                    MarketEvent::Trade(t) => WsFrame::Trade(TradeMsg::from_trade(&pair, &t)),
                    MarketEvent::Bbo { symbol, bbo } => WsFrame::Bbo {
                        symbol,
                        bbo: BboMsg::from_snapshot(&pair, &bbo),
                    },
                };
                if let Err(e) = send_frame(&mut socket, &frame).await {
                    error!("websocket send failed: {e:?}");
                    break;
                }
            }
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                warn!(skipped, "websocket subscriber lagged; skipping ahead");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

async fn send_frame(socket: &mut WebSocket, frame: &WsFrame) -> Result<(), axum::Error> {
    socket
        .send(Message::Text(serde_json::to_string(frame).unwrap().into()))
        .await
}

/// Constructs the application's `Router` with all routes and shared state.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/order/submit", post(submit_order))
        .route("/order/cancel/{symbol}/{id}", delete(cancel_order))
        .route("/book/bbo/{symbol}", get(get_bbo))
        .route("/book/depth/{symbol}", get(get_depth))
        .route("/trades/{symbol}", get(get_trades))
        .route("/ws/{symbol}", get(ws_handler))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(
                    DefaultMakeSpan::new()
                        .include_headers(false)
                        .level(tracing::Level::TRACE),
                )
                .on_response(DefaultOnResponse::new().level(tracing::Level::TRACE)),
        )
        .with_state(state)
}
