use serde::{Deserialize, Serialize};

pub const MAX_SUB_SCORE: u32 = 20;
pub const MAX_TOTAL_SCORE: u32 = 100;

/// 市场可行性结论
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Classification {
    #[serde(rename = "LAUNCH")]
    Launch,
    #[serde(rename = "MODIFY")]
    Modify,
    #[serde(rename = "DO NOT PRODUCE")]
    DoNotProduce,
}

impl Classification {
    pub const ALL: [Classification; 3] = [
        Classification::Launch,
        Classification::Modify,
        Classification::DoNotProduce,
    ];

    /// 75-100 LAUNCH，50-74 MODIFY，0-49 DO NOT PRODUCE
    pub fn from_total_score(total: u32) -> Self {
        match total {
            75.. => Classification::Launch,
            50..=74 => Classification::Modify,
            _ => Classification::DoNotProduce,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Classification::Launch => "LAUNCH",
            Classification::Modify => "MODIFY",
            Classification::DoNotProduce => "DO NOT PRODUCE",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Scores {
    pub market_demand: u32,
    pub design_uniqueness: u32,
    pub price_competitiveness: u32,
    pub material_appeal: u32,
    pub trend_alignment: u32,
}

impl Scores {
    pub fn named(&self) -> [(&'static str, u32); 5] {
        [
            ("market_demand", self.market_demand),
            ("design_uniqueness", self.design_uniqueness),
            ("price_competitiveness", self.price_competitiveness),
            ("material_appeal", self.material_appeal),
            ("trend_alignment", self.trend_alignment),
        ]
    }
}

/// 模型按 system prompt 中的 JSON 格式返回的评估结果
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub design_description: String,
    pub detected_style: String,
    pub detected_features: Vec<String>,
    pub scores: Scores,
    pub total_score: u32,
    pub classification: Classification,
    pub classification_reasoning: String,
    pub market_insights: String,
    pub recommendations: Vec<String>,
    pub similar_top_products: Vec<String>,
}

/// 附带上传图片地址的最终响应
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AssessedSketch {
    #[serde(flatten)]
    pub result: AnalysisResult,
    pub image_url: String,
}

pub fn assemble(result: AnalysisResult, image_url: impl Into<String>) -> AssessedSketch {
    AssessedSketch {
        result,
        image_url: image_url.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification_bands() {
        assert_eq!(Classification::from_total_score(80), Classification::Launch);
        assert_eq!(Classification::from_total_score(60), Classification::Modify);
        assert_eq!(Classification::from_total_score(30), Classification::DoNotProduce);

        assert_eq!(Classification::from_total_score(49), Classification::DoNotProduce);
        assert_eq!(Classification::from_total_score(50), Classification::Modify);
        assert_eq!(Classification::from_total_score(74), Classification::Modify);
        assert_eq!(Classification::from_total_score(75), Classification::Launch);
        assert_eq!(Classification::from_total_score(0), Classification::DoNotProduce);
        assert_eq!(Classification::from_total_score(100), Classification::Launch);
    }

    #[test]
    fn classification_wire_names() {
        for c in Classification::ALL {
            let v = serde_json::to_value(c).unwrap();
            assert_eq!(v, serde_json::Value::String(c.label().to_string()));
            let back: Classification = serde_json::from_value(v).unwrap();
            assert_eq!(back, c);
        }
        assert!(serde_json::from_str::<Classification>("\"launch\"").is_err());
    }

    #[test]
    fn assemble_flattens_image_url() {
        let result = AnalysisResult {
            design_description: "d".to_string(),
            detected_style: "s".to_string(),
            detected_features: vec!["zari".to_string()],
            scores: Scores {
                market_demand: 16,
                design_uniqueness: 15,
                price_competitiveness: 14,
                material_appeal: 18,
                trend_alignment: 17,
            },
            total_score: 80,
            classification: Classification::Launch,
            classification_reasoning: "r".to_string(),
            market_insights: "m".to_string(),
            recommendations: vec![],
            similar_top_products: vec![],
        };
        let out = assemble(result.clone(), "/static/uploads/a.png");
        assert_eq!(out.result, result);

        let v = serde_json::to_value(&out).unwrap();
        assert_eq!(v["image_url"], "/static/uploads/a.png");
        assert_eq!(v["classification"], "LAUNCH");
        assert_eq!(v["scores"]["material_appeal"], 18);
        assert!(v.get("result").is_none());
    }
}
