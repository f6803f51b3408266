// analytics.rs - 統計分析模組
//
// 對觀測序列計算彙總統計，不進行任何 I/O。

pub mod statistics;

pub use statistics::{calculate_statistics, StatisticsResult};
