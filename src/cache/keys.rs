use std::cell::RefCell;

use crate::domain_types::{format_date, SeriesQuery, TemporalMode};

/// 快取鍵分隔符
pub const KEY_SEPARATOR: char = ':';

/// 快取鍵的操作類型標籤
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyKind {
    Data,
    Stats,
    DataSummary,
    Stations,
}

impl KeyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            KeyKind::Data => "data",
            KeyKind::Stats => "stats",
            KeyKind::DataSummary => "dataSummary",
            KeyKind::Stations => "stations",
        }
    }
}

/// 快取鍵構建器，重用內部緩衝區以減少分配
///
/// 欄位值中的 `%` 與 `:` 會被轉義，確保不同查詢不會拼出相同的鍵。
pub struct KeyBuilder {
    buffer: String,
}

impl KeyBuilder {
    pub fn new() -> Self {
        Self {
            buffer: String::with_capacity(128),
        }
    }

    fn start(&mut self, kind: KeyKind) -> &mut Self {
        self.buffer.clear();
        self.buffer.push_str(kind.as_str());
        self
    }

    /// 附加一個欄位值（會轉義）
    fn field(&mut self, value: &str) -> &mut Self {
        self.buffer.push(KEY_SEPARATOR);
        for ch in value.chars() {
            match ch {
                '%' => self.buffer.push_str("%25"),
                ':' => self.buffer.push_str("%3A"),
                _ => self.buffer.push(ch),
            }
        }
        self
    }

    /// 附加固定字面標籤（不轉義）
    fn literal(&mut self, tag: &str) -> &mut Self {
        self.buffer.push(KEY_SEPARATOR);
        self.buffer.push_str(tag);
        self
    }

    fn series(&mut self, query: &SeriesQuery) -> &mut Self {
        let series = &query.series;
        self.field(&query.domain)
            .field(&series.station)
            .field(&series.name)
            .field(&series.sensor_code)
            .field(&series.method)
            .field(&series.aspect)
    }

    fn range(&mut self, temporal: &TemporalMode, period_tag: &str) -> &mut Self {
        match temporal {
            TemporalMode::Period(period) => self.literal(period_tag).field(period),
            TemporalMode::Range { start, end } => self
                .literal("range")
                .field(&format_date(start))
                .field(&format_date(end)),
        }
    }

    fn finish(&self) -> String {
        self.buffer.clone()
    }

    /// 資料端點鍵：`data:{domain}:{series...}:latest:{period}` 或 `...:range:{start}:{end}`
    pub fn data_key(&mut self, query: &SeriesQuery) -> String {
        self.start(KeyKind::Data)
            .series(query)
            .range(&query.temporal, "latest")
            .finish()
    }

    /// 統計端點鍵：`stats:{domain}:{series...}:period:{period}` 或 `...:range:{start}:{end}`
    pub fn stats_key(&mut self, query: &SeriesQuery) -> String {
        self.start(KeyKind::Stats)
            .series(query)
            .range(&query.temporal, "period")
            .finish()
    }

    /// 領域摘要鍵，指定站點時為站點摘要鍵
    pub fn summary_key(&mut self, domain: &str, station: Option<&str>) -> String {
        self.start(KeyKind::DataSummary).field(domain);
        if let Some(station) = station {
            self.field(station);
        }
        self.finish()
    }

    /// 站點清單鍵
    pub fn stations_key(&mut self, domain: &str) -> String {
        self.start(KeyKind::Stations).field(domain).finish()
    }
}

impl Default for KeyBuilder {
    fn default() -> Self {
        Self::new()
    }
}

thread_local! {
    static KEY_BUILDER: RefCell<KeyBuilder> = RefCell::new(KeyBuilder::new());
}

fn with_builder<F: FnOnce(&mut KeyBuilder) -> String>(f: F) -> String {
    KEY_BUILDER.with(|builder| f(&mut builder.borrow_mut()))
}

/// 生成資料查詢快取鍵
pub fn data_key(query: &SeriesQuery) -> String {
    with_builder(|b| b.data_key(query))
}

/// 生成統計查詢快取鍵
pub fn stats_key(query: &SeriesQuery) -> String {
    with_builder(|b| b.stats_key(query))
}

/// 生成領域摘要快取鍵
pub fn summary_key(domain: &str) -> String {
    with_builder(|b| b.summary_key(domain, None))
}

/// 生成站點摘要快取鍵
pub fn station_summary_key(domain: &str, station: &str) -> String {
    with_builder(|b| b.summary_key(domain, Some(station)))
}

/// 生成站點清單快取鍵
pub fn stations_key(domain: &str) -> String {
    with_builder(|b| b.stations_key(domain))
}
