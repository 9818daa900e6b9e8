mod ai;
mod analysis;
mod config;
mod market;
mod web;

use anyhow::Context;
use log::{info, warn};
use std::sync::Arc;

use crate::ai::AnyProvider;
use crate::analysis::{
    AnalysisConfig, AnalysisService, SketchAnalyzer, UnconfiguredAnalyzer, MAX_RESPONSE_TOKENS,
};
use crate::config::Config;
use crate::market::{Dataset, MarketContext, MarketSummary, PromptBuilder};
use crate::web::{AppState, UploadStore};

#[tokio::main(flavor = "multi_thread")]
async fn main() -> anyhow::Result<()> {
    // 先加载 .env，RUST_LOG 也可以写在里面
    let env_loaded = dotenv::dotenv().ok();

    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Warn)
        .filter_module("saree_analyzer", log::LevelFilter::Info)
        .parse_default_env()
        .init();

    match env_loaded {
        Some(path) => info!("Loaded environment from {}", path.display()),
        None => info!("No .env file found, using process environment"),
    }

    let cfg = Config::from_env();

    // 数据集和市场上下文在接收请求之前计算好，之后只读
    let dataset = Dataset::load(&cfg.dataset_path)
        .with_context(|| format!("loading dataset {}", cfg.dataset_path.display()))?;
    if dataset.is_empty() {
        warn!("Dataset is empty, market context will only contain placeholders");
    }
    let context = MarketContext::build(&dataset);
    info!(
        "Market context ready: {} products, {} chars",
        context.product_count(),
        context.as_str().len()
    );
    let system_prompt: Arc<str> = PromptBuilder::new(&context).build().into();
    let summary = MarketSummary::from_dataset(&dataset);

    // 缺少 API key 不影响启动，只让 /analyze 返回错误
    let analyzer: Arc<dyn SketchAnalyzer> = match AnyProvider::from_env() {
        Ok(provider) => {
            let model = cfg
                .analysis_model
                .clone()
                .unwrap_or_else(|| provider.default_model().to_string());
            info!("AI provider: {}, model: {}", provider.name(), model);
            Arc::new(AnalysisService::new(
                provider,
                system_prompt,
                AnalysisConfig {
                    model,
                    max_tokens: MAX_RESPONSE_TOKENS,
                    temperature: cfg.analysis_temperature,
                },
            ))
        }
        Err(e) => {
            warn!("AI provider not configured ({e}); /analyze will fail until it is set");
            Arc::new(UnconfiguredAnalyzer::new(&e))
        }
    };

    let uploads = UploadStore::new(
        cfg.static_dir.join(&cfg.upload_subdir),
        format!("/static/{}", cfg.upload_subdir),
    );
    uploads
        .ensure_dir()
        .await
        .with_context(|| format!("creating upload dir {}", uploads.dir().display()))?;

    let state = Arc::new(AppState {
        analyzer,
        summary,
        uploads,
        static_dir: cfg.static_dir.clone(),
        max_upload_bytes: cfg.max_upload_bytes,
    });
    let app = web::router(state);

    let listener = tokio::net::TcpListener::bind(&cfg.bind_addr)
        .await
        .with_context(|| format!("binding {}", cfg.bind_addr))?;
    info!("Saree analyzer running on http://{}", cfg.bind_addr);

    axum::serve(listener, app).await?;
    Ok(())
}
