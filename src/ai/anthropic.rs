use crate::ai::build_llm_http_client;
use crate::ai::types::{ChatRequest, ChatResponse, LlmError, LlmProvider};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::Value;

const ANTHROPIC_VERSION: &str = "2023-06-01";

#[derive(Clone)]
pub struct AnthropicProvider {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl AnthropicProvider {
    pub fn from_env() -> Result<Self, LlmError> {
        let api_key = std::env::var("ANTHROPIC_API_KEY")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or(LlmError::MissingEnv("ANTHROPIC_API_KEY"))?;
        let base_url = std::env::var("ANTHROPIC_BASE_URL")
            .unwrap_or_else(|_| "https://api.anthropic.com/v1".to_string());

        Ok(Self {
            client: build_llm_http_client()?,
            api_key,
            base_url,
        })
    }
}

/// Messages API 请求体：system 单独传，图片放在 user 消息的 content 数组里
fn messages_body(req: &ChatRequest) -> Value {
    let mut content = Vec::new();
    if let Some(image) = &req.image {
        content.push(serde_json::json!({
            "type": "image",
            "source": {
                "type": "base64",
                "media_type": image.media_type,
                "data": image.data,
            }
        }));
    }
    content.push(serde_json::json!({"type": "text", "text": req.user}));

    let mut body = serde_json::json!({
        "model": req.model,
        "max_tokens": req.max_tokens,
        "system": req.system,
        "messages": [
            {"role": "user", "content": content}
        ]
    });
    if let Some(t) = req.temperature {
        body["temperature"] = serde_json::json!(t);
    }
    body
}

fn extract_text(v: &Value, raw: &str) -> Result<String, LlmError> {
    let blocks = v
        .get("content")
        .and_then(|c| c.as_array())
        .ok_or_else(|| LlmError::InvalidResponse(format!("missing content, raw={raw}")))?;

    let parts: Vec<&str> = blocks
        .iter()
        .filter(|b| b.get("type").and_then(|t| t.as_str()) == Some("text"))
        .filter_map(|b| b.get("text").and_then(|t| t.as_str()))
        .collect();

    if parts.is_empty() {
        return Err(LlmError::InvalidResponse(format!(
            "no text block in content, raw={raw}"
        )));
    }
    Ok(parts.join("\n"))
}

#[async_trait]
impl LlmProvider for AnthropicProvider {
    async fn chat(&self, req: ChatRequest) -> Result<ChatResponse, LlmError> {
        let url = format!("{}/messages", self.base_url.trim_end_matches('/'));
        let body = messages_body(&req);

        // 只请求一次，不做超时重试
        let resp = self
            .client
            .post(url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::types::ImagePart;

    fn request(image: Option<ImagePart>) -> ChatRequest {
        ChatRequest {
            model: "m".to_string(),
            system: "sys".to_string(),
            user: "look".to_string(),
            image,
            temperature: None,
            max_tokens: 1500,
        }
    }

    #[test]
    fn body_puts_image_before_text() {
        let body = messages_body(&request(Some(ImagePart {
            media_type: "image/png".to_string(),
            data: "AAAA".to_string(),
        })));
        assert_eq!(body["system"], "sys");
        assert_eq!(body["max_tokens"], 1500);
        assert!(body.get("temperature").is_none());
        let content = body["messages"][0]["content"].as_array().unwrap();
        assert_eq!(content.len(), 2);
        assert_eq!(content[0]["source"]["media_type"], "image/png");
        assert_eq!(content[0]["source"]["data"], "AAAA");
        assert_eq!(content[1]["text"], "look");
    }

    #[test]
    fn text_only_body() {
        let body = messages_body(&request(None));
        let content = body["messages"][0]["content"].as_array().unwrap();
        assert_eq!(content.len(), 1);
        assert_eq!(content[0]["type"], "text");
    }

    #[test]
    fn extract_joins_text_blocks() {
        let v = serde_json::json!({
            "content": [
                {"type": "text", "text": "{\"a\":"},
                {"type": "tool_use", "id": "x"},
                {"type": "text", "text": "1}"}
            ]
        });
        assert_eq!(extract_text(&v, "").unwrap(), "{\"a\":\n1}");
    }

    #[test]
    fn extract_without_text_is_invalid() {
        let v = serde_json::json!({"content": []});
        assert!(matches!(
            extract_text(&v, ""),
            Err(LlmError::InvalidResponse(_))
        ));
    }
}
