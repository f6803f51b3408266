/// 批次查詢
pub mod orchestrator;
pub mod types;

pub use orchestrator::{BatchOrchestrator, DEFAULT_ITEM_TIMEOUT, MAX_BATCH_ITEMS};
pub use types::{BatchItem, BatchOutcome, BatchRequest};
