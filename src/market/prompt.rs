use crate::market::context::MarketContext;

/// 随图片一起发送的用户指令
pub const USER_INSTRUCTION: &str =
    "Please analyze this saree product sketch/design and provide the full JSON analysis.";

/// 把市场上下文嵌入固定的评估说明，生成 system prompt
pub struct PromptBuilder<'a> {
    context: &'a MarketContext,
}

impl<'a> PromptBuilder<'a> {
    pub fn new(context: &'a MarketContext) -> Self {
        Self { context }
    }

    pub fn build(&self) -> String {
        let mut lines = Vec::new();
        lines.push("You are an expert saree product analyst and fashion market researcher.".to_string());
        lines.push(
            "You have deep knowledge of the Indian saree market with access to real market data."
                .to_string(),
        );
        lines.push("".to_string());
        lines.push(format!(
            "REAL MARKET DATA FROM {} SAREE PRODUCTS:",
            self.context.product_count()
        ));
        lines.push(self.context.as_str().to_string());
        lines.push("".to_string());

        lines.push("Your task is to analyze a sketch/image of a saree product and provide:".to_string());
        lines.push("1. A detailed semantic analysis of the design".to_string());
        lines.push("2. Market viability scoring across multiple dimensions".to_string());
        lines.push("3. A final classification decision".to_string());
        lines.push("".to_string());

        lines.push("SCORING CRITERIA (each out of 20, total out of 100):".to_string());
        for (i, dim) in DIMENSIONS.iter().enumerate() {
            lines.push(format!("{}. **{}** (0-20): {}", i + 1, dim.title, dim.question));
            for anchor in dim.anchors {
                lines.push(format!("   - {anchor}"));
            }
            lines.push("".to_string());
        }

        lines.push("CLASSIFICATION RULES:".to_string());
        lines.push("- Score 75-100: **LAUNCH** (Strong market fit, proceed to production)".to_string());
        lines.push("- Score 50-74: **MODIFY** (Promising but needs adjustments before launch)".to_string());
        lines.push("- Score 0-49: **DO NOT PRODUCE** (Poor market fit, high risk)".to_string());
        lines.push("".to_string());

        lines.push("Respond ONLY with a valid JSON object in this exact format:".to_string());
        lines.push(OUTPUT_SCHEMA.to_string());
        lines.push("No markdown, no explanations, no text before or after the JSON.".to_string());

        lines.join("\n")
    }
}

struct Dimension {
    title: &'static str,
    question: &'static str,
    anchors: &'static [&'static str],
}

const DIMENSIONS: &[Dimension] = &[
    Dimension {
        title: "Market Demand Score",
        question: "How much demand exists for this style/material based on market data?",
        anchors: &[
            "High review counts in similar products = higher score",
            "Trending materials/styles = higher score",
        ],
    },
    Dimension {
        title: "Design Uniqueness Score",
        question: "How differentiated is this product?",
        anchors: &[
            "Overcrowded market segment = lower score",
            "Unique design elements = higher score",
        ],
    },
    Dimension {
        title: "Price Competitiveness Score",
        question: "Estimated price point vs market?",
        anchors: &[
            "Premium but justified = higher score",
            "Overpriced for segment = lower score",
        ],
    },
    Dimension {
        title: "Material Appeal Score",
        question: "Quality/desirability of material visible?",
        anchors: &[
            "Silk/handloom = higher premium potential",
            "Synthetic blends = lower score",
        ],
    },
    Dimension {
        title: "Trend Alignment Score",
        question: "How well does it align with current trends?",
        anchors: &[
            "Wedding/festive wear trending = bonus",
            "Everyday cotton growing = bonus",
        ],
    },
];

// 字段名必须与 analysis::model::AnalysisResult 的序列化字段一致
const OUTPUT_SCHEMA: &str = r#"{
  "design_description": "Detailed description of what you see in the sketch (2-3 sentences)",
  "detected_style": "e.g., Kanjivaram Silk / Banarasi / Cotton Handloom / etc.",
  "detected_features": ["feature1", "feature2", "feature3"],
  "scores": {
    "market_demand": <0-20>,
    "design_uniqueness": <0-20>,
    "price_competitiveness": <0-20>,
    "material_appeal": <0-20>,
    "trend_alignment": <0-20>
  },
  "total_score": <0-100>,
  "classification": "LAUNCH" | "MODIFY" | "DO NOT PRODUCE",
  "classification_reasoning": "2-3 sentence explanation of why this classification was given",
  "market_insights": "Key market insight relevant to this product (1-2 sentences)",
  "recommendations": ["recommendation1", "recommendation2", "recommendation3"],
  "similar_top_products": ["brief description of 1-2 similar successful products from the dataset"]
}"#;
