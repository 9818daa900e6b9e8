use chrono::Local;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tokio::io::AsyncWriteExt;
use unicode_normalization::UnicodeNormalization;
use uuid::Uuid;

/// 上传文件落盘的位置及其对外 URL 前缀
#[derive(Clone, Debug)]
pub struct UploadStore {
    dir: PathBuf,
    url_prefix: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct StoredUpload {
    pub filename: String,
    pub path: PathBuf,
    pub url: String,
}

impl UploadStore {
    pub fn new(dir: PathBuf, url_prefix: impl Into<String>) -> Self {
        Self {
            dir,
            url_prefix: url_prefix.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub async fn ensure_dir(&self) -> std::io::Result<()> {
        tokio::fs::create_dir_all(&self.dir).await
    }

    /// `safe_name` 必须已经过 secure_filename。
    /// 文件名带时间戳和 uuid，同一秒内的同名上传也不会互相覆盖。
    pub async fn save(&self, safe_name: &str, bytes: &[u8]) -> std::io::Result<StoredUpload> {
        let filename = format!(
            "{}-{}-{}",
            Local::now().format("%Y%m%d%H%M%S"),
            Uuid::new_v4().simple(),
            safe_name
        );
        let path = self.dir.join(&filename);
        // create_new：万一重名直接报错，不覆盖已有文件
        let mut file = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        Ok(StoredUpload {
            url: format!("{}/{}", self.url_prefix, filename),
            filename,
            path,
        })
    }
}

fn unsafe_chars() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^A-Za-z0-9_.-]").expect("static regex"))
}

/// 把客户端文件名变成可以直接拼进路径的安全文件名。
/// 先做 NFKD 分解（é -> e + 组合符），再丢掉非 ASCII 字符，结果可能为空。
pub fn secure_filename(name: &str) -> String {
    let ascii: String = name
        .nfkd()
        .filter(char::is_ascii)
        .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
        .collect();
    let joined = ascii.split_whitespace().collect::<Vec<_>>().join("_");
    unsafe_chars()
        .replace_all(&joined, "")
        .trim_matches(|c| c == '.' || c == '_')
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn secure_filename_cases() {
        assert_eq!(secure_filename("My cool sketch.png"), "My_cool_sketch.png");
        assert_eq!(secure_filename("../../etc/passwd"), "etc_passwd");
        assert_eq!(secure_filename("..\\win\\x.jpg"), "win_x.jpg");
        assert_eq!(secure_filename("  a$b%c.webp "), "abc.webp");
        assert_eq!(secure_filename("साड़ी.png"), "png");
        assert_eq!(secure_filename("café.png"), "cafe.png");
        assert_eq!(secure_filename("Ｓａｒｅｅ ñ.jpg"), "Saree_n.jpg");
        assert_eq!(secure_filename("..."), "");
    }

    #[tokio::test]
    async fn save_writes_prefixed_file() {
        let tmp = tempfile::tempdir().unwrap();
        let store = UploadStore::new(tmp.path().join("uploads"), "/static/uploads/");
        store.ensure_dir().await.unwrap();

        let stored = store.save("sketch.png", b"img").await.unwrap();
        assert!(stored.filename.ends_with("-sketch.png"));
        assert_eq!(stored.url, format!("/static/uploads/{}", stored.filename));
        assert_eq!(std::fs::read(&stored.path).unwrap(), b"img");
        assert_eq!(stored.path.parent(), Some(store.dir()));
    }

    #[tokio::test]
    async fn same_name_saved_twice_keeps_both_files() {
        let tmp = tempfile::tempdir().unwrap();
        let store = UploadStore::new(tmp.path().to_path_buf(), "/static/uploads");

        let first = store.save("sketch.png", b"first").await.unwrap();
        let second = store.save("sketch.png", b"second").await.unwrap();
        assert_ne!(first.path, second.path);
        assert_ne!(first.url, second.url);
        assert!(second.filename.ends_with("-sketch.png"));
        assert_eq!(std::fs::read(&first.path).unwrap(), b"first");
        assert_eq!(std::fs::read(&second.path).unwrap(), b"second");
        assert_eq!(std::fs::read_dir(store.dir()).unwrap().count(), 2);
    }
}
