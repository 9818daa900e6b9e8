pub mod context;
pub mod dataset;
pub mod prompt;
pub mod summary;

pub use context::MarketContext;
pub use dataset::Dataset;
pub use prompt::{PromptBuilder, USER_INSTRUCTION};
pub use summary::MarketSummary;
