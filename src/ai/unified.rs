use crate::ai::types::{ChatRequest, ChatResponse, LlmError, LlmProvider};
use crate::ai::{AnthropicProvider, OpenRouterProvider};
use async_trait::async_trait;

#[derive(Clone)]
pub enum InnerProvider {
    Anthropic(AnthropicProvider),
    OpenRouter(OpenRouterProvider),
}

#[derive(Clone)]
pub struct AnyProvider {
    inner: InnerProvider,
}

impl AnyProvider {
    pub fn from_env() -> Result<Self, LlmError> {
        let which = std::env::var("LLM_PROVIDER")
            .unwrap_or_else(|_| "anthropic".to_string())
            .to_lowercase();
        match which.as_str() {
            "openrouter" => {
                let p = OpenRouterProvider::from_env()?;
                Ok(Self {
                    inner: InnerProvider::OpenRouter(p),
                })
            }
            _ => {
                let p = AnthropicProvider::from_env()?;
                Ok(Self {
                    inner: InnerProvider::Anthropic(p),
                })
            }
        }
    }

    /// 未显式配置 ANALYSIS_MODEL 时使用的模型
    pub fn default_model(&self) -> &'static str {
        match &self.inner {
            InnerProvider::Anthropic(_) => "claude-sonnet-4-20250514",
            InnerProvider::OpenRouter(_) => "anthropic/claude-sonnet-4",
        }
    }

    pub fn name(&self) -> &'static str {
        match &self.inner {
            InnerProvider::Anthropic(_) => "anthropic",
            InnerProvider::OpenRouter(_) => "openrouter",
        }
    }
}

#[async_trait]
impl LlmProvider for AnyProvider {
    async fn chat(&self, req: ChatRequest) -> Result<ChatResponse, LlmError> {
        match &self.inner {
            InnerProvider::Anthropic(p) => p.chat(req).await,
            InnerProvider::OpenRouter(p) => p.chat(req).await,
        }
    }
}
