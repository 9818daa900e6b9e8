use crate::analysis::{assemble, AssessedSketch, ImageMime, SketchImage};
use crate::market::MarketSummary;
use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, State};
use axum::response::Html;
use axum::Json;
use log::{info, warn};
use std::sync::Arc;

use super::error::ApiError;
use super::upload::secure_filename;
use super::AppState;

/// multipart 中图片字段的名字
const SKETCH_FIELD: &str = "sketch";

pub async fn index() -> Html<&'static str> {
    Html(include_str!("../../templates/index.html"))
}

pub async fn market_summary(State(state): State<Arc<AppState>>) -> Json<MarketSummary> {
    Json(state.summary.clone())
}

/// 上传草图 -> 校验 -> 落盘 -> 调用 AI -> 附上图片地址返回。
/// 所有校验都在落盘和外部调用之前完成。
pub async fn analyze(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<AssessedSketch>, ApiError> {
    // 不是 multipart 请求（没有 boundary、Content-Type 不对）也按没有上传文件处理
    let mut multipart = multipart.map_err(|e| {
        warn!("Rejected non-multipart /analyze request: {e}");
        ApiError::NoFile
    })?;
    let mut upload = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some(SKETCH_FIELD) {
            let filename = field.file_name().unwrap_or_default().to_string();
            let bytes = field.bytes().await?;
            upload = Some((filename, bytes));
            break;
        }
    }

    let (filename, bytes) = upload.ok_or(ApiError::NoFile)?;
    if filename.is_empty() {
        return Err(ApiError::NoFileSelected);
    }
    if ImageMime::from_filename(&filename).is_none() {
        return Err(ApiError::InvalidFileType);
    }
    let safe_name = secure_filename(&filename);
    let mime = ImageMime::from_filename(&safe_name).ok_or(ApiError::InvalidFilename)?;

    let stored = state
        .uploads
        .save(&safe_name, &bytes)
        .await
        .map_err(ApiError::Storage)?;
    info!(
        "Stored sketch {} ({} bytes, {})",
        stored.path.display(),
        bytes.len(),
        mime.as_str()
    );

    let result = state
        .analyzer
        .analyze(SketchImage {
            bytes: bytes.to_vec(),
            mime,
        })
        .await?;

    Ok(Json(assemble(result, stored.url)))
}
