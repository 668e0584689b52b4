//! Shared application state: injected into every handler via `axum::extract::State`.

use crate::{config::Config, db::Db};

/// Application-wide state passed via axum `State<AppState>`.
///
/// `SqlitePool` is already `Arc`-backed, so cloning the state per request is cheap.
/// No handler reaches the pool through anything but this value.
#[derive(Clone)]
pub struct AppState {
    pub pool:   Db,
    pub config: Config,
}
