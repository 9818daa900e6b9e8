use log::warn;

use super::model::{AnalysisResult, Classification, MAX_SUB_SCORE, MAX_TOTAL_SCORE};
use super::types::AnalysisError;

/// 去掉 ``` 代码块包裹（可带 json 标记），返回其中的文本
pub fn strip_code_fence(text: &str) -> &str {
    let raw = text.trim();
    let Some(rest) = raw.strip_prefix("```") else {
        return raw;
    };
    let inner = match rest.find("```") {
        Some(end) => &rest[..end],
        None => rest,
    };
    inner.strip_prefix("json").unwrap_or(inner).trim()
}

/// 严格按结果结构解析模型回复
pub fn parse_analysis(text: &str) -> Result<AnalysisResult, AnalysisError> {
    let body = strip_code_fence(text);
    let mut result: AnalysisResult =
        serde_json::from_str(body).map_err(|e| AnalysisError::ResponseParse(e.to_string()))?;

    for (name, v) in result.scores.named() {
        if v > MAX_SUB_SCORE {
            return Err(AnalysisError::ResponseParse(format!(
                "scores.{name} = {v} is outside 0-{MAX_SUB_SCORE}"
            )));
        }
    }
    if result.total_score > MAX_TOTAL_SCORE {
        return Err(AnalysisError::ResponseParse(format!(
            "total_score = {} is outside 0-{MAX_TOTAL_SCORE}",
            result.total_score
        )));
    }

    let expected = Classification::from_total_score(result.total_score);
    if result.classification != expected {
        warn!(
            "Model classified total_score {} as {}, normalizing to {}",
            result.total_score,
            result.classification.label(),
            expected.label()
        );
        result.classification = expected;
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    const BODY: &str = r#"{
  "design_description": "A red silk saree with a gold zari border.",
  "detected_style": "Kanjivaram Silk",
  "detected_features": ["zari border", "temple motif"],
  "scores": {
    "market_demand": 18,
    "design_uniqueness": 14,
    "price_competitiveness": 15,
    "material_appeal": 19,
    "trend_alignment": 16
  },
  "total_score": 82,
  "classification": "LAUNCH",
  "classification_reasoning": "Strong demand for wedding silk.",
  "market_insights": "Silk dominates high-review listings.",
  "recommendations": ["Keep the border", "Price near the median"],
  "similar_top_products": ["Kanjivaram Silk Wedding Saree"]
}"#;

    #[test]
    fn strips_json_fence() {
        let fenced = format!("```json\n{BODY}\n```");
        assert_eq!(strip_code_fence(&fenced), BODY);
        let bare_fence = format!("```\n{BODY}\n```");
        assert_eq!(strip_code_fence(&bare_fence), BODY);
        assert_eq!(strip_code_fence(&format!("  {BODY}\n")), BODY);
    }

    #[test]
    fn fenced_and_bare_replies_parse_identically() {
        let fenced = parse_analysis(&format!("```json\n{BODY}\n```")).unwrap();
        let bare = parse_analysis(BODY).unwrap();
        assert_eq!(fenced, bare);
        assert_eq!(bare.total_score, 82);
        assert_eq!(bare.classification, Classification::Launch);
        assert_eq!(bare.detected_features.len(), 2);
    }

    #[test]
    fn unterminated_fence_still_parses() {
        let parsed = parse_analysis(&format!("```json\n{BODY}")).unwrap();
        assert_eq!(parsed.total_score, 82);
    }

    #[test]
    fn prose_reply_is_parse_failure() {
        let err = parse_analysis("I think this saree looks lovely!").unwrap_err();
        match err {
            AnalysisError::ResponseParse(msg) => assert!(msg.contains("expected value")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn missing_field_is_parse_failure() {
        let partial = BODY.replace("\"market_insights\": \"Silk dominates high-review listings.\",", "");
        let err = parse_analysis(&partial).unwrap_err();
        assert!(matches!(err, AnalysisError::ResponseParse(ref m) if m.contains("market_insights")));
    }

    #[test]
    fn out_of_range_scores_are_rejected() {
        let bad = BODY.replace("\"material_appeal\": 19", "\"material_appeal\": 25");
        let err = parse_analysis(&bad).unwrap_err();
        assert!(err.to_string().contains("scores.material_appeal = 25"));

        let bad_total = BODY.replace("\"total_score\": 82", "\"total_score\": 120");
        assert!(matches!(
            parse_analysis(&bad_total),
            Err(AnalysisError::ResponseParse(_))
        ));
    }

    #[test]
    fn unknown_classification_is_rejected() {
        let bad = BODY.replace("\"LAUNCH\"", "\"MAYBE\"");
        assert!(matches!(
            parse_analysis(&bad),
            Err(AnalysisError::ResponseParse(_))
        ));
    }

    #[test]
    fn inconsistent_classification_follows_total() {
        let odd = BODY
            .replace("\"total_score\": 82", "\"total_score\": 49")
            .replace("\"LAUNCH\"", "\"MODIFY\"");
        let parsed = parse_analysis(&odd).unwrap();
        assert_eq!(parsed.classification, Classification::DoNotProduce);

        let edge = BODY.replace("\"total_score\": 82", "\"total_score\": 75");
        assert_eq!(parse_analysis(&edge).unwrap().classification, Classification::Launch);
    }
}
