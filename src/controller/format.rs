use chrono::{DateTime, NaiveDateTime, Utc};
use serde_json::Value;

/// 把方式适用的区域列表拼成展示用字符串；非数组输入返回空串
pub fn method_regions_label(value: &Value) -> String {
    match value {
        Value::Array(items) => items
            .iter()
            .map(|v| match v {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect::<Vec<_>>()
            .join(", "),
        _ => String::new(),
    }
}

/// 解析服务端时间戳（带时区的 RFC3339，或不带时区按 UTC 处理）
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let t = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(t) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(t, fmt).ok())
        .map(|naive| naive.and_utc())
}

/// 相对时间，例如 "3 分钟前"；无法解析时原样返回
pub fn date_from_now(raw: &str, now: DateTime<Utc>) -> String {
    let Some(ts) = parse_timestamp(raw) else {
        return raw.to_string();
    };
    let secs = (now - ts).num_seconds();
    let (future, secs) = if secs < 0 { (true, -secs) } else { (false, secs) };
    let label = match secs {
        0..=44 => "几秒".to_string(),
        45..=3_599 => format!("{} 分钟", (secs / 60).max(1)),
        3_600..=86_399 => format!("{} 小时", secs / 3_600),
        86_400..=2_591_999 => format!("{} 天", secs / 86_400),
        2_592_000..=31_535_999 => format!("{} 个月", secs / 2_592_000),
        _ => format!("{} 年", secs / 31_536_000),
    };
    if future {
        format!("{}后", label)
    } else {
        format!("{}前", label)
    }
}
