use log::{info, warn};
use serde::{Deserialize, Deserializer};
use std::io::Read;
use std::path::Path;

#[derive(thiserror::Error, Debug)]
pub enum DatasetError {
    #[error("cannot open dataset {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: csv::Error,
    },
    #[error("dataset header is unreadable: {0}")]
    Header(#[source] csv::Error),
    #[error("dataset is missing column '{0}'")]
    MissingColumn(&'static str),
}

const REQUIRED_COLUMNS: &[&str] = &[
    "title",
    "material_raw",
    "brand",
    "price_current",
    "rating",
    "review_count",
];

/// 数据集中的一行商品记录，加载后不再修改
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct ProductRecord {
    #[serde(default)]
    pub title: String,
    #[serde(rename = "material_raw", default, deserialize_with = "blank_as_none")]
    pub material: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub brand: Option<String>,
    pub price_current: f64,
    pub rating: f64,
    #[serde(deserialize_with = "whole_count")]
    pub review_count: u64,
}

fn blank_as_none<'de, D>(d: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let v: Option<String> = Option::deserialize(d)?;
    Ok(v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()))
}

// 清洗后的 CSV 里 review_count 可能写成 "123.0"
fn whole_count<'de, D>(d: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let n = f64::deserialize(d)?;
    if !n.is_finite() || n < 0.0 {
        return Err(serde::de::Error::custom(format!(
            "review_count must be a non-negative number, got {n}"
        )));
    }
    Ok(n.round() as u64)
}

/// 内存中的商品表
#[derive(Clone, Debug, Default)]
pub struct Dataset {
    records: Vec<ProductRecord>,
}

impl Dataset {
    pub fn new(records: Vec<ProductRecord>) -> Self {
        Self { records }
    }

    pub fn load(path: &Path) -> Result<Self, DatasetError> {
        let reader = csv::Reader::from_path(path).map_err(|source| DatasetError::Open {
            path: path.display().to_string(),
            source,
        })?;
        let ds = Self::from_csv_reader(reader)?;
        info!(
            "Loaded {} product records from {}",
            ds.len(),
            path.display()
        );
        Ok(ds)
    }

    /// 无法解析的行会被跳过并记录告警，缺列则直接失败
    pub fn from_reader<R: Read>(rdr: R) -> Result<Self, DatasetError> {
        Self::from_csv_reader(csv::Reader::from_reader(rdr))
    }

    fn from_csv_reader<R: Read>(mut reader: csv::Reader<R>) -> Result<Self, DatasetError> {
        let headers = reader.headers().map_err(DatasetError::Header)?.clone();
        for col in REQUIRED_COLUMNS {
            if !headers.iter().any(|h| h.trim() == *col) {
                return Err(DatasetError::MissingColumn(col));
            }
        }

        let mut records = Vec::new();
        let mut skipped = 0usize;
        for (idx, row) in reader.deserialize::<ProductRecord>().enumerate() {
            match row {
                Ok(r) => records.push(r),
                Err(e) => {
                    skipped += 1;
                    // 第 1 行是表头
                    warn!("Skipping dataset row {}: {}", idx + 2, e);
                }
            }
        }
        if skipped > 0 {
            warn!("Skipped {} malformed dataset rows", skipped);
        }
        Ok(Self { records })
    }

    pub fn records(&self) -> &[ProductRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
