use crate::error::AppError;
use crate::quotation::{QuotationRecord, QuoteStatus};
use crate::storage;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// 历史筛选的日期字段
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DateField {
    #[default]
    Created,
    Delivery,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryFilter {
    #[serde(default)]
    pub status: Option<QuoteStatus>,
    /// 编号或客户名的子串匹配，不区分大小写
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub date_from: Option<String>,
    #[serde(default)]
    pub date_to: Option<String>,
    #[serde(default)]
    pub date_field: DateField,
}

/// 历史存储：单个 JSON 数组文件，整体读-改-写。
/// 追加为主，仅状态字段原地修改
pub struct HistoryStore {
    path: PathBuf,
}

impl HistoryStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// 读取全部记录；文件缺失或损坏时退化为空列表
    pub fn load_all(&self) -> Vec<QuotationRecord> {
        let mut records: Vec<QuotationRecord> = storage::load_json_or(&self.path, Vec::new());
        for record in &mut records {
            record.normalize();
        }
        records
    }

    fn save_all(&self, records: &[QuotationRecord]) -> Result<(), AppError> {
        storage::save_json(&self.path, &records)
    }

    pub fn append(&self, record: QuotationRecord) -> Result<(), AppError> {
        let mut records = self.load_all();
        records.push(record);
        self.save_all(&records)
    }

    /// 按编号找到第一条记录并改写其状态，然后重写整个文件
    pub fn update_status(
        &self,
        number: &str,
        status: QuoteStatus,
    ) -> Result<QuotationRecord, AppError> {
        let mut records = self.load_all();
        let record = records
            .iter_mut()
            .find(|r| r.number == number)
            .ok_or_else(|| AppError::RecordNotFound(number.to_string()))?;

        record.status = status;
        let updated = record.clone();
        self.save_all(&records)?;
        Ok(updated)
    }

    pub fn filter(&self, filter: &HistoryFilter) -> Vec<QuotationRecord> {
        self.load_all()
            .into_iter()
            .filter(|r| matches(r, filter))
            .collect()
    }
}

fn matches(record: &QuotationRecord, filter: &HistoryFilter) -> bool {
    if let Some(status) = filter.status {
        if record.status != status {
            return false;
        }
    }

    if let Some(text) = filter.text.as_deref() {
        let needle = text.trim().to_lowercase();
        if !needle.is_empty() {
            let in_number = record.number.to_lowercase().contains(&needle);
            let in_client = record.client.name.to_lowercase().contains(&needle);
            if !in_number && !in_client {
                return false;
            }
        }
    }

    if filter.date_from.is_some() || filter.date_to.is_some() {
        let raw = match filter.date_field {
            DateField::Created => Some(record.created_at.as_str()),
            DateField::Delivery => record.delivery_date.as_deref(),
        };
        // 筛选日期范围时，无法解析日期的记录不入选
        let Some(date) = raw.and_then(parse_date) else {
            return false;
        };
        if let Some(from) = filter.date_from.as_deref().and_then(parse_date) {
            if date < from {
                return false;
            }
        }
        if let Some(to) = filter.date_to.as_deref().and_then(parse_date) {
            if date > to {
                return false;
            }
        }
    }

    true
}

/// 取字符串前 10 位按 YYYY-MM-DD 解析（createdAt 带时分，截断即可）
fn parse_date(raw: &str) -> Option<NaiveDate> {
    let prefix = raw.get(..10)?;
    NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quotation::{ClientInfo, Currency, LineItem};

    fn record(number: &str, client: &str, created: &str) -> QuotationRecord {
        QuotationRecord {
            number: number.to_string(),
            base_number: number.to_string(),
            version: 1,
            created_at: created.to_string(),
            delivery_date: None,
            client: ClientInfo {
                name: client.to_string(),
                email: format!("{}@ejemplo.com", client.to_lowercase().replace(' ', ".")),
                address: "Av. Principal 123".to_string(),
                tax_id: String::new(),
            },
            payment_terms: "Contado".to_string(),
            validity: "15 días".to_string(),
            items: vec![LineItem {
                description: "Producto A".to_string(),
                quantity: 2.0,
                unit_price: 50.0,
                subtotal: 100.0,
                image_ref: None,
            }],
            subtotal: 100.0,
            tax: 18.0,
            total: 118.0,
            tax_rate: 0.18,
            currency: Currency::Soles,
            tax_enabled: true,
            document_path: format!("{} - {}.pdf", client, number),
            status: QuoteStatus::Generated,
        }
    }

    fn store() -> (tempfile::TempDir, HistoryStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = HistoryStore::new(dir.path().join("historial.json"));
        (dir, store)
    }

    #[test]
    fn append_then_reload_reproduces_every_field() {
        let (_dir, store) = store();
        let mut original = record("COT-2025-00001", "Cliente Test", "2025-08-06 10:30");
        original.delivery_date = Some("2025-08-20".to_string());
        original.items[0].image_ref = Some("COT-2025-00001_ref1.png".to_string());

        store.append(original.clone()).unwrap();
        let loaded = store.load_all();

        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0], original);
    }

    #[test]
    fn missing_file_loads_as_empty() {
        let (_dir, store) = store();
        assert!(store.load_all().is_empty());
    }

    #[test]
    fn corrupt_file_loads_as_empty() {
        let (dir, store) = store();
        std::fs::write(dir.path().join("historial.json"), "[{ roto").unwrap();
        assert!(store.load_all().is_empty());
    }

    #[test]
    fn update_status_persists_in_place() {
        let (_dir, store) = store();
        store
            .append(record("COT-2025-00001", "Cliente A", "2025-08-01 09:00"))
            .unwrap();
        store
            .append(record("COT-2025-00002", "Cliente B", "2025-08-02 09:00"))
            .unwrap();

        let updated = store
            .update_status("COT-2025-00001", QuoteStatus::Sent)
            .unwrap();
        assert_eq!(updated.status, QuoteStatus::Sent);

        let records = store.load_all();
        assert_eq!(records[0].status, QuoteStatus::Sent);
        assert_eq!(records[1].status, QuoteStatus::Generated);
    }

    #[test]
    fn update_status_unknown_number_fails() {
        let (_dir, store) = store();
        let err = store.update_status("COT-2025-09999", QuoteStatus::Accepted);
        assert!(matches!(err, Err(AppError::RecordNotFound(_))));
    }

    #[test]
    fn filter_by_status_and_text() {
        let (_dir, store) = store();
        store
            .append(record("COT-2025-00001", "Panadería Rosa", "2025-08-01 09:00"))
            .unwrap();
        store
            .append(record("COT-2025-00002", "Ferretería Lima", "2025-08-02 09:00"))
            .unwrap();
        store
            .update_status("COT-2025-00002", QuoteStatus::Sent)
            .unwrap();

        let sent = store.filter(&HistoryFilter {
            status: Some(QuoteStatus::Sent),
            ..HistoryFilter::default()
        });
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].number, "COT-2025-00002");

        // 子串匹配不区分大小写，编号与客户名皆可
        let by_client = store.filter(&HistoryFilter {
            text: Some("PANADERÍA".to_string()),
            ..HistoryFilter::default()
        });
        assert_eq!(by_client.len(), 1);

        let by_number = store.filter(&HistoryFilter {
            text: Some("00002".to_string()),
            ..HistoryFilter::default()
        });
        assert_eq!(by_number.len(), 1);
        assert_eq!(by_number[0].client.name, "Ferretería Lima");
    }

    #[test]
    fn filter_by_creation_date_range() {
        let (_dir, store) = store();
        store
            .append(record("COT-2025-00001", "A", "2025-07-15 09:00"))
            .unwrap();
        store
            .append(record("COT-2025-00002", "B", "2025-08-02 09:00"))
            .unwrap();

        let august = store.filter(&HistoryFilter {
            date_from: Some("2025-08-01".to_string()),
            date_to: Some("2025-08-31".to_string()),
            ..HistoryFilter::default()
        });
        assert_eq!(august.len(), 1);
        assert_eq!(august[0].number, "COT-2025-00002");
    }

    #[test]
    fn delivery_date_filter_excludes_records_without_one() {
        let (_dir, store) = store();
        let mut with_date = record("COT-2025-00001", "A", "2025-08-01 09:00");
        with_date.delivery_date = Some("2025-08-10".to_string());
        store.append(with_date).unwrap();
        store
            .append(record("COT-2025-00002", "B", "2025-08-01 10:00"))
            .unwrap();

        let found = store.filter(&HistoryFilter {
            date_from: Some("2025-08-01".to_string()),
            date_to: Some("2025-08-31".to_string()),
            date_field: DateField::Delivery,
            ..HistoryFilter::default()
        });
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].number, "COT-2025-00001");
    }

    #[test]
    fn legacy_records_are_normalized_on_load() {
        let (dir, store) = store();
        // 旧格式：无 baseNumber/version/status 字段
        std::fs::write(
            dir.path().join("historial.json"),
            r#"[{
                "number": "COT-2024-00009-V2",
                "createdAt": "2024-11-02 16:20",
                "client": { "name": "Cliente Antiguo" },
                "items": [],
                "subtotal": 10.0,
                "tax": 1.8,
                "total": 11.8
            }]"#,
        )
        .unwrap();

        let records = store.load_all();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].base_number, "COT-2024-00009");
        assert_eq!(records[0].version, 2);
        assert_eq!(records[0].status, QuoteStatus::Generated);
    }
}
