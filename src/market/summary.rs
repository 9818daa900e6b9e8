use crate::market::context::{value_counts, PriceStats};
use crate::market::dataset::Dataset;
use serde::Serialize;
use serde_json::{Map, Value};

const SUMMARY_TOP_N: usize = 5;

/// `/market-summary` 返回的数据集概览
#[derive(Clone, Debug, Serialize)]
pub struct MarketSummary {
    pub total_products: usize,
    pub avg_price: Option<f64>,
    pub top_materials: Map<String, Value>,
    pub top_brands: Map<String, Value>,
    pub avg_rating: Option<f64>,
}

impl MarketSummary {
    pub fn from_dataset(dataset: &Dataset) -> Self {
        let records = dataset.records();
        let ratings: Vec<f64> = records
            .iter()
            .map(|r| r.rating)
            .filter(|r| r.is_finite())
            .collect();
        let avg_rating = if ratings.is_empty() {
            None
        } else {
            Some(round2(ratings.iter().sum::<f64>() / ratings.len() as f64))
        };

        Self {
            total_products: records.len(),
            avg_price: PriceStats::from_records(records).map(|p| round2(p.mean)),
            top_materials: top_counts(records.iter().map(|r| r.material.as_deref())),
            top_brands: top_counts(records.iter().map(|r| r.brand.as_deref())),
            avg_rating,
        }
    }
}

fn top_counts<'a>(values: impl IntoIterator<Item = Option<&'a str>>) -> Map<String, Value> {
    value_counts(values)
        .into_iter()
        .take(SUMMARY_TOP_N)
        .map(|(k, n)| (k, Value::from(n)))
        .collect()
}

/// 保留两位小数。按二进制的精确值舍入，恰好一半时取偶数（0.125 -> 0.12）
fn round2(x: f64) -> f64 {
    format!("{x:.2}").parse().unwrap_or(x)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSV: &str = "\
title,material_raw,brand,price_current,rating,review_count
a,Silk,A,100,4.0,1
b,Silk,B,200,4.5,2
c,Cotton,A,300,4.333,3
d,,C,401,5.0,4
";

    #[test]
    fn summary_aggregates() {
        let ds = Dataset::from_reader(CSV.as_bytes()).unwrap();
        let s = MarketSummary::from_dataset(&ds);
        assert_eq!(s.total_products, 4);
        assert_eq!(s.avg_price, Some(250.25));
        assert_eq!(s.avg_rating, Some(4.46));

        let mats: Vec<(&String, &Value)> = s.top_materials.iter().collect();
        assert_eq!(mats[0], (&"Silk".to_string(), &Value::from(2)));
        assert_eq!(mats.len(), 2);
        assert_eq!(s.top_brands.keys().next().map(String::as_str), Some("A"));
    }

    #[test]
    fn round2_ties_go_to_even() {
        assert_eq!(round2(0.125), 0.12);
        assert_eq!(round2(0.375), 0.38);
        assert_eq!(round2(2.675), 2.67);
        assert_eq!(round2(4.4583), 4.46);
        assert_eq!(round2(-0.125), -0.12);
    }

    #[test]
    fn empty_summary_serializes_nulls() {
        let s = MarketSummary::from_dataset(&Dataset::default());
        let v = serde_json::to_value(&s).unwrap();
        assert_eq!(v["total_products"], 0);
        assert!(v["avg_price"].is_null());
        assert!(v["avg_rating"].is_null());
        assert_eq!(v["top_brands"], serde_json::json!({}));
    }
}
