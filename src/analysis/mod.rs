pub mod model;
pub mod parser;
pub mod service;
pub mod types;

pub use model::{assemble, AnalysisResult, AssessedSketch, Classification};
pub use service::{AnalysisConfig, AnalysisService, MAX_RESPONSE_TOKENS};
pub use types::{AnalysisError, ImageMime, SketchAnalyzer, SketchImage, UnconfiguredAnalyzer};
