use crate::ai::LlmError;
use async_trait::async_trait;

use super::model::AnalysisResult;

/// 允许上传的图片类型
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ImageMime {
    Png,
    Jpeg,
    Gif,
    Webp,
}

impl ImageMime {
    pub const ALLOWED_EXTENSIONS: [&'static str; 5] = ["png", "jpg", "jpeg", "gif", "webp"];

    /// 扩展名不区分大小写
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "png" => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "gif" => Some(Self::Gif),
            "webp" => Some(Self::Webp),
            _ => None,
        }
    }

    /// 取文件名最后一个 '.' 之后的部分判断
    pub fn from_filename(name: &str) -> Option<Self> {
        let (_, ext) = name.rsplit_once('.')?;
        Self::from_extension(ext)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Gif => "image/gif",
            Self::Webp => "image/webp",
        }
    }
}

/// 单次分析请求：图片内容及其 MIME 类型，只在一次 HTTP 调用内存在
#[derive(Clone, Debug)]
pub struct SketchImage {
    pub bytes: Vec<u8>,
    pub mime: ImageMime,
}

#[derive(thiserror::Error, Debug)]
pub enum AnalysisError {
    /// 网络、鉴权、配额等远端错误，原样透传
    #[error("{0}")]
    Provider(#[from] LlmError),
    /// 模型有回复，但去掉代码块后仍不是合法的结果 JSON
    #[error("Failed to parse AI response: {0}")]
    ResponseParse(String),
    /// 启动时没能创建 provider（通常是缺少 API key）
    #[error("AI service unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait SketchAnalyzer: Send + Sync {
    async fn analyze(&self, image: SketchImage) -> Result<AnalysisResult, AnalysisError>;
}

/// 未配置 AI 凭据时使用：服务照常启动，只有分析接口报错
pub struct UnconfiguredAnalyzer {
    reason: String,
}

impl UnconfiguredAnalyzer {
    pub fn new(err: &LlmError) -> Self {
        Self {
            reason: err.to_string(),
        }
    }
}

#[async_trait]
impl SketchAnalyzer for UnconfiguredAnalyzer {
    async fn analyze(&self, _image: SketchImage) -> Result<AnalysisResult, AnalysisError> {
        Err(AnalysisError::Unavailable(self.reason.clone()))
    }
}
