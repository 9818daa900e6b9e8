use crate::ai::build_llm_http_client;
use crate::ai::types::{ChatRequest, ChatResponse, LlmError, LlmProvider};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::Value;

#[derive(Clone)]
pub struct OpenRouterProvider {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl OpenRouterProvider {
    pub fn from_env() -> Result<Self, LlmError> {
        let api_key = std::env::var("OPENROUTER_API_KEY")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or(LlmError::MissingEnv("OPENROUTER_API_KEY"))?;
        let base_url = std::env::var("OPENROUTER_BASE_URL")
            .unwrap_or_else(|_| "https://openrouter.ai/api/v1".to_string());

        Ok(Self {
            client: build_llm_http_client()?,
            api_key,
            base_url,
        })
    }
}

/// OpenAI 兼容格式：图片以 data URL 形式放进 user 消息
fn completions_body(req: &ChatRequest) -> Value {
    let user = match &req.image {
        Some(image) => serde_json::json!([
            {
                "type": "image_url",
                "image_url": {"url": format!("data:{};base64,{}", image.media_type, image.data)}
            },
            {"type": "text", "text": req.user}
        ]),
        None => Value::String(req.user.clone()),
    };

    let mut body = serde_json::json!({
        "model": req.model,
        "max_tokens": req.max_tokens,
        "messages": [
            {"role": "system", "content": req.system},
            {"role": "user", "content": user}
        ]
    });
    if let Some(t) = req.temperature {
        body["temperature"] = serde_json::json!(t);
    }
    body
}

fn extract_text(v: &Value, raw: &str) -> Result<String, LlmError> {
    // 兼容多种返回结构：message.content（字符串或数组）、content、text，以及顶层 output_text
    let choice0 = v
        .get("choices")
        .and_then(|c| c.get(0))
        .ok_or_else(|| LlmError::InvalidResponse(format!("missing choices[0], raw={raw}")))?;

    let content = choice0
        .get("message")
        .and_then(|m| m.get("content"))
        .or_else(|| choice0.get("content"));

    if let Some(content) = content {
        return match content {
            Value::String(s) => Ok(s.clone()),
            Value::Array(arr) => {
                let parts: Vec<String> = arr
                    .iter()
                    .filter_map(|it| {
                        it.get("text")
                            .and_then(|x| x.as_str())
                            .or_else(|| it.as_str())
                            .map(|t| t.to_string())
                    })
                    .collect();
                Ok(parts.join("\n"))
            }
            _ => Err(LlmError::InvalidResponse(format!(
                "unexpected content type, raw={raw}"
            ))),
        };
    }
    if let Some(Value::String(s)) = choice0.get("text") {
        return Ok(s.clone());
    }
    if let Some(Value::String(s)) = v.get("output_text") {
        return Ok(s.clone());
    }
    Err(LlmError::InvalidResponse(format!(
        "missing content/text in choices[0], raw={raw}"
    )))
}

#[async_trait]
impl LlmProvider for OpenRouterProvider {
    async fn chat(&self, req: ChatRequest) -> Result<ChatResponse, LlmError> {
        let url = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));
        let body = completions_body(&req);

        let resp = self
            .client
            .post(url)
            .bearer_auth(&self.api_key)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::Http(e.to_string()))?;

        match resp.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => return Err(LlmError::Unauthorized),
            StatusCode::TOO_MANY_REQUESTS => return Err(LlmError::RateLimited),
            _ => {}
        }

        let status = resp.status();
        let raw = resp
            .text()
            .await
            .map_err(|e| LlmError::Http(e.to_string()))?;

        if !status.is_success() {
            return Err(LlmError::Http(format!("{} {}", status.as_u16(), raw)));
        }

        let v: Value = serde_json::from_str(&raw)
            .map_err(|e| LlmError::InvalidResponse(format!("json parse failed: {e}, raw={raw}")))?;
        let text = extract_text(&v, &raw)?;

        Ok(ChatResponse {
            text,
            raw: Some(raw),
        })
    }
}
