use serde::{Deserialize, Serialize};
use serde_json::Value;
use statrs::statistics::{Data, Distribution, Max, Min};

/// 觀測序列的彙總統計
///
/// `count` 是輸入觀測筆數，不是取得數值的筆數：觀測存在但都沒有數值
/// 時，`count` 為觀測筆數而其餘欄位為 `None`；沒有任何觀測時 `count` 為 0。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatisticsResult {
    pub count: usize,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub mean: Option<f64>,
    pub std_dev: Option<f64>,
}

impl StatisticsResult {
    fn empty(count: usize) -> Self {
        Self {
            count,
            min: None,
            max: None,
            mean: None,
            std_dev: None,
        }
    }
}

/// 取出觀測中的 `val` 數值；數字字串亦可接受
fn observation_value(point: &Value) -> Option<f64> {
    let value = match point.get("val")? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    value.filter(|v| v.is_finite())
}

/// 計算觀測序列的 count/min/max/mean/樣本標準差
pub fn calculate_statistics(points: &[Value]) -> StatisticsResult {
    let values: Vec<f64> = points.iter().filter_map(observation_value).collect();

    if values.is_empty() {
        return StatisticsResult::empty(points.len());
    }

    let count = values.len();
    let data = Data::new(values);

    // 樣本標準差（除以 N-1），單一數值時定義為 0
    let std_dev = if count > 1 { data.std_dev() } else { Some(0.0) };

    StatisticsResult {
        count: points.len(),
        min: Some(data.min()),
        max: Some(data.max()),
        mean: data.mean(),
        std_dev,
    }
}
