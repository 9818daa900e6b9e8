use std::path::PathBuf;

const DEFAULT_MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

/// 服务配置，从环境变量读取（main 里会先加载 .env）
#[derive(Clone, Debug)]
pub struct Config {
    /// 商品数据集 CSV
    pub dataset_path: PathBuf,
    /// 监听地址
    pub bind_addr: String,
    /// 静态文件目录，挂在 /static 下
    pub static_dir: PathBuf,
    /// 上传目录（相对 static_dir）
    pub upload_subdir: String,
    /// 请求体上限
    pub max_upload_bytes: usize,
    /// 不设置则用 provider 的默认模型
    pub analysis_model: Option<String>,
    /// 采样温度，不设置则用 provider 的默认值
    pub analysis_temperature: Option<f32>,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(get: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| {
            get(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        Self {
            dataset_path: non_empty("DATASET_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("clean_saree_data.csv")),
            bind_addr: non_empty("BIND_ADDR").unwrap_or_else(|| "127.0.0.1:5000".to_string()),
            static_dir: non_empty("STATIC_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("static")),
            upload_subdir: non_empty("UPLOAD_SUBDIR")
                .map(|s| s.trim_matches('/').to_string())
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| "uploads".to_string()),
            max_upload_bytes: non_empty("MAX_UPLOAD_BYTES")
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_MAX_UPLOAD_BYTES),
            analysis_model: non_empty("ANALYSIS_MODEL"),
            analysis_temperature: non_empty("ANALYSIS_TEMPERATURE")
                .and_then(|v| v.parse::<f32>().ok())
                .filter(|t| t.is_finite() && *t >= 0.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(pairs: &[(&str, &str)]) -> Config {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|k| env.get(k).cloned())
    }

    #[test]
    fn defaults() {
        let c = config(&[]);
        assert_eq!(c.dataset_path, PathBuf::from("clean_saree_data.csv"));
        assert_eq!(c.bind_addr, "127.0.0.1:5000");
        assert_eq!(c.static_dir, PathBuf::from("static"));
        assert_eq!(c.upload_subdir, "uploads");
        assert_eq!(c.max_upload_bytes, 16 * 1024 * 1024);
        assert_eq!(c.analysis_model, None);
        assert_eq!(c.analysis_temperature, None);
    }

    #[test]
    fn overrides_and_bad_values() {
        let c = config(&[
            ("DATASET_PATH", "data/sarees.csv"),
            ("UPLOAD_SUBDIR", "/sketches/"),
            ("MAX_UPLOAD_BYTES", "lots"),
            ("ANALYSIS_MODEL", "  "),
            ("ANALYSIS_TEMPERATURE", "warm"),
        ]);
        assert_eq!(c.dataset_path, PathBuf::from("data/sarees.csv"));
        assert_eq!(c.upload_subdir, "sketches");
        assert_eq!(c.max_upload_bytes, 16 * 1024 * 1024);
        assert_eq!(c.analysis_model, None);
        assert_eq!(c.analysis_temperature, None);
    }

    #[test]
    fn temperature_is_parsed() {
        let c = config(&[("ANALYSIS_TEMPERATURE", "0.2")]);
        assert_eq!(c.analysis_temperature, Some(0.2));
        let c = config(&[("ANALYSIS_TEMPERATURE", "-1")]);
        assert_eq!(c.analysis_temperature, None);
    }
}
