use crate::ai::{ChatRequest, ImagePart, LlmProvider};
use crate::market::USER_INSTRUCTION;
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use log::{debug, info, warn};
use std::sync::Arc;

use super::model::AnalysisResult;
use super::parser::parse_analysis;
use super::types::{AnalysisError, SketchAnalyzer, SketchImage};

/// 回复长度上限
pub const MAX_RESPONSE_TOKENS: u32 = 1500;

#[derive(Clone, Debug)]
pub struct AnalysisConfig {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: Option<f32>,
}

/// 一次请求一次调用：不重试、不保留会话
pub struct AnalysisService<P: LlmProvider> {
    provider: P,
    system_prompt: Arc<str>,
    cfg: AnalysisConfig,
}

impl<P: LlmProvider> AnalysisService<P> {
    pub fn new(provider: P, system_prompt: Arc<str>, cfg: AnalysisConfig) -> Self {
        Self {
            provider,
            system_prompt,
            cfg,
        }
    }

    fn request_for(&self, image: &SketchImage) -> ChatRequest {
        ChatRequest {
            model: self.cfg.model.clone(),
            system: self.system_prompt.to_string(),
            user: USER_INSTRUCTION.to_string(),
            image: Some(ImagePart {
                media_type: image.mime.as_str().to_string(),
                data: STANDARD.encode(&image.bytes),
            }),
            temperature: self.cfg.temperature,
            max_tokens: self.cfg.max_tokens,
        }
    }
}

#[async_trait]
impl<P: LlmProvider> SketchAnalyzer for AnalysisService<P> {
    async fn analyze(&self, image: SketchImage) -> Result<AnalysisResult, AnalysisError> {
        let req = self.request_for(&image);
        info!(
            "Requesting analysis: model={}, mime={}, bytes={}",
            req.model,
            image.mime.as_str(),
            image.bytes.len()
        );

        let resp = self.provider.chat(req).await.map_err(|e| {
            warn!("AI request failed: {e}");
            AnalysisError::from(e)
        })?;

        match parse_analysis(&resp.text) {
            Ok(result) => {
                info!(
                    "Analysis done: total_score={}, classification={}",
                    result.total_score,
                    result.classification.label()
                );
                Ok(result)
            }
            Err(e) => {
                warn!("Unparseable AI reply ({e}): {}", resp.text);
                if let Some(raw) = &resp.raw {
                    debug!("Raw provider response: {raw}");
                }
                Err(e)
            }
        }
    }
}
