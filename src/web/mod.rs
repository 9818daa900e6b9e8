pub mod error;
pub mod handlers;
pub mod upload;

use crate::analysis::SketchAnalyzer;
use crate::market::MarketSummary;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::services::ServeDir;

pub use upload::UploadStore;

/// 启动时构建一次，之后只读，随每个请求注入 handler
pub struct AppState {
    pub analyzer: Arc<dyn SketchAnalyzer>,
    pub summary: MarketSummary,
    pub uploads: UploadStore,
    pub static_dir: PathBuf,
    pub max_upload_bytes: usize,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/analyze", post(handlers::analyze))
        .route("/market-summary", get(handlers::market_summary))
        .nest_service("/static", ServeDir::new(&state.static_dir))
        .layer(DefaultBodyLimit::max(state.max_upload_bytes))
        .with_state(state)
}
