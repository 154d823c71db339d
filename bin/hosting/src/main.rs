//! Tournament Host Binary
//!
//! Serves one authoritative No-Limit Hold'em table over WebSocket on
//! `BIND_ADDR` (default `0.0.0.0:8080`).

#[tokio::main]
async fn main() {
    hh_core::init();
    hh_hosting::run().await.expect("table server exited with an error");
}
