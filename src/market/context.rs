use crate::market::dataset::{Dataset, ProductRecord};
use std::collections::{BTreeMap, HashMap};

/// 没有可用数据时每个小节输出的占位行
pub const NO_DATA: &str = "  (no data)";

pub const TOP_MATERIALS: usize = 10;
pub const TOP_RATED: usize = 5;
pub const TOP_BRANDS: usize = 8;
pub const TOP_DEMAND_MATERIALS: usize = 6;
pub const TOP_RATED_MIN_RATING: f64 = 4.5;

/// 标题关键词词表。按子串计数，不做分词。
pub const KEYWORDS: &[&str] = &[
    "silk",
    "cotton",
    "banarasi",
    "kanjivaram",
    "zari",
    "handloom",
    "jacquard",
    "paithani",
    "wedding",
    "blouse",
    "printed",
    "embroidered",
    "georgette",
    "linen",
];

#[derive(Clone, Debug, PartialEq)]
pub struct Section {
    pub header: &'static str,
    pub lines: Vec<String>,
}

impl Section {
    fn new(header: &'static str, lines: Vec<String>) -> Self {
        let lines = if lines.is_empty() {
            vec![NO_DATA.to_string()]
        } else {
            lines
        };
        Self { header, lines }
    }

    fn render(&self) -> String {
        let mut out = String::from(self.header);
        for l in &self.lines {
            out.push('\n');
            out.push_str(l);
        }
        out
    }
}

/// 市场上下文：进程启动时从完整数据集计算一次，之后只读
#[derive(Clone, Debug)]
pub struct MarketContext {
    sections: Vec<Section>,
    text: String,
    product_count: usize,
}

impl MarketContext {
    pub fn build(dataset: &Dataset) -> Self {
        let records = dataset.records();
        let sections = if records.is_empty() {
            // 空数据集：六个小节统一输出占位行
            SECTION_HEADERS
                .iter()
                .map(|h| Section::new(*h, Vec::new()))
                .collect()
        } else {
            vec![
                Section::new(SECTION_HEADERS[0], material_lines(records)),
                Section::new(SECTION_HEADERS[1], price_lines(records)),
                Section::new(SECTION_HEADERS[2], top_rated_lines(records)),
                Section::new(SECTION_HEADERS[3], brand_lines(records)),
                Section::new(SECTION_HEADERS[4], keyword_lines(records)),
                Section::new(SECTION_HEADERS[5], demand_lines(records)),
            ]
        };

        let text = sections
            .iter()
            .map(Section::render)
            .collect::<Vec<_>>()
            .join("\n\n");

        Self {
            sections,
            text,
            product_count: records.len(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn product_count(&self) -> usize {
        self.product_count
    }
}

pub const SECTION_HEADERS: [&str; 6] = [
    "=== MARKET MATERIAL DISTRIBUTION ===",
    "=== PRICE RANGE INSIGHTS ===",
    "=== TOP PERFORMING PRODUCTS (Rating ≥ 4.5) ===",
    "=== TOP BRANDS BY VOLUME ===",
    "=== KEYWORD FREQUENCY IN MARKET ===",
    "=== AVG REVIEW COUNT BY MATERIAL (Demand Indicator) ===",
];

fn material_lines(records: &[ProductRecord]) -> Vec<String> {
    value_counts(records.iter().map(|r| r.material.as_deref()))
        .into_iter()
        .take(TOP_MATERIALS)
        .map(|(mat, count)| format!("  {mat}: {count} products"))
        .collect()
}

fn price_lines(records: &[ProductRecord]) -> Vec<String> {
    match PriceStats::from_records(records) {
        Some(p) => vec![
            format!("  Min price: ₹{:.0}", p.min),
            format!("  Max price: ₹{:.0}", p.max),
            format!("  Average price: ₹{:.0}", p.mean),
            format!("  Median price: ₹{:.0}", p.median),
        ],
        None => Vec::new(),
    }
}

fn top_rated_lines(records: &[ProductRecord]) -> Vec<String> {
    top_rated(records, TOP_RATED)
        .into_iter()
        .map(|r| {
            format!(
                "  • {} | ₹{:?} | Rating: {:?} | Reviews: {}",
                r.title, r.price_current, r.rating, r.review_count
            )
        })
        .collect()
}

fn brand_lines(records: &[ProductRecord]) -> Vec<String> {
    value_counts(records.iter().map(|r| r.brand.as_deref()))
        .into_iter()
        .take(TOP_BRANDS)
        .map(|(brand, count)| format!("  {brand}: {count} products"))
        .collect()
}

fn keyword_lines(records: &[ProductRecord]) -> Vec<String> {
    keyword_counts(records)
        .into_iter()
        .map(|(kw, count)| format!("  '{kw}': appears {count} times"))
        .collect()
}

fn demand_lines(records: &[ProductRecord]) -> Vec<String> {
    avg_reviews_by_material(records)
        .into_iter()
        .take(TOP_DEMAND_MATERIALS)
        .map(|(mat, avg)| format!("  {mat}: {avg:.0} avg reviews"))
        .collect()
}

/// 按出现次数降序计数，空值不参与；次数相同按首次出现的顺序
pub fn value_counts<'a, I>(values: I) -> Vec<(String, usize)>
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    let mut order: Vec<(String, usize)> = Vec::new();
    let mut index: HashMap<&'a str, usize> = HashMap::new();
    for v in values.into_iter().flatten() {
        match index.get(v) {
            Some(&i) => order[i].1 += 1,
            None => {
                index.insert(v, order.len());
                order.push((v.to_string(), 1));
            }
        }
    }
    // sort_by 是稳定排序
    order.sort_by(|a, b| b.1.cmp(&a.1));
    order
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PriceStats {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub median: f64,
}

impl PriceStats {
    /// 没有有效价格时返回 None
    pub fn from_records(records: &[ProductRecord]) -> Option<Self> {
        let mut prices: Vec<f64> = records
            .iter()
            .map(|r| r.price_current)
            .filter(|p| p.is_finite())
            .collect();
        if prices.is_empty() {
            return None;
        }
        prices.sort_by(f64::total_cmp);

        let n = prices.len();
        let median = if n % 2 == 1 {
            prices[n / 2]
        } else {
            (prices[n / 2 - 1] + prices[n / 2]) / 2.0
        };
        let mean = prices.iter().sum::<f64>() / n as f64;

        Some(Self {
            min: prices[0],
            max: prices[n - 1],
            // 浮点误差不能让均值越过上下界
            mean: mean.clamp(prices[0], prices[n - 1]),
            median,
        })
    }
}

/// 评分不低于 4.5 的商品，按评论数降序（同评论数保持原顺序）
pub fn top_rated(records: &[ProductRecord], n: usize) -> Vec<&ProductRecord> {
    let mut rated: Vec<&ProductRecord> = records
        .iter()
        .filter(|r| r.rating >= TOP_RATED_MIN_RATING)
        .collect();
    rated.sort_by(|a, b| b.review_count.cmp(&a.review_count));
    rated.truncate(n);
    rated
}

/// 所有标题转小写后以空格拼接，再按子串（不重叠）计数
pub fn keyword_counts(records: &[ProductRecord]) -> Vec<(&'static str, usize)> {
    let all_titles = records
        .iter()
        .map(|r| r.title.to_lowercase())
        .collect::<Vec<_>>()
        .join(" ");
    KEYWORDS
        .iter()
        .map(|kw| (*kw, all_titles.matches(kw).count()))
        .collect()
}

/// 各材质平均评论数，降序；平均值相同时按材质名排序
pub fn avg_reviews_by_material(records: &[ProductRecord]) -> Vec<(String, f64)> {
    let mut groups: BTreeMap<&str, (u64, usize)> = BTreeMap::new();
    for r in records {
        if let Some(mat) = r.material.as_deref() {
            let e = groups.entry(mat).or_insert((0, 0));
            e.0 += r.review_count;
            e.1 += 1;
        }
    }
    let mut avgs: Vec<(String, f64)> = groups
        .into_iter()
        .map(|(mat, (sum, n))| (mat.to_string(), sum as f64 / n as f64))
        .collect();
    avgs.sort_by(|a, b| b.1.total_cmp(&a.1));
    avgs
}
