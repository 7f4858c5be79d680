use dashboard_errors::{DashboardError, DashboardResult};
use serde_json::Value;

use crate::counts::Counts;
use crate::record::Record;

/// 列表接口的一页结果
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ListPage {
    pub records: Vec<Record>,
    pub page_count: i64,
    pub page_number: i64,
    pub total_count: i64,
    pub counts: Option<Counts>,
}

impl ListPage {
    pub fn from_wire(value: &Value) -> DashboardResult<Self> {
        let object = value.as_object().ok_or_else(|| {
            DashboardError::Serialization("列表响应必须是JSON对象".to_string())
        })?;

        let records = match object.get("Records") {
            Some(Value::Array(items)) => items
                .iter()
                .map(Record::from_wire)
                .collect::<DashboardResult<Vec<_>>>()?,
            Some(Value::Null) | None => Vec::new(),
            Some(other) => {
                return Err(DashboardError::Serialization(format!(
                    "Records 必须是数组: {other}"
                )))
            }
        };

        let number = |key: &str| object.get(key).and_then(Value::as_i64).unwrap_or(0);

        let counts = match object.get("Counts") {
            Some(Value::Null) | None => None,
            Some(counts) => Some(serde_json::from_value(counts.clone())?),
        };

        Ok(Self {
            records,
            page_count: number("PageCount").max(0),
            page_number: number("PageNumber").max(1),
            total_count: number("TotalCount").max(0),
            counts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_wire() {
        let page = ListPage::from_wire(&json!({
            "Records": [{"Id": 1, "JobName": "a"}, {"Id": 2, "JobName": "b"}],
            "PageCount": 5,
            "PageNumber": 2,
            "TotalCount": 48,
            "Counts": {"QueueCount": 48, "WorkerCount": 2},
        }))
        .unwrap();

        assert_eq!(page.records.len(), 2);
        assert_eq!(page.records[1].id(), 2);
        assert_eq!(page.page_count, 5);
        assert_eq!(page.page_number, 2);
        assert_eq!(page.total_count, 48);
        assert_eq!(page.counts.unwrap().worker_count, 2);
    }

    #[test]
    fn test_missing_fields_default() {
        let page = ListPage::from_wire(&json!({})).unwrap();
        assert!(page.records.is_empty());
        assert_eq!(page.page_count, 0);
        assert_eq!(page.page_number, 1);
        assert!(page.counts.is_none());
    }

    #[test]
    fn test_rejects_non_array_records() {
        assert!(ListPage::from_wire(&json!({"Records": "nope"})).is_err());
        assert!(ListPage::from_wire(&json!("nope")).is_err());
    }
}
