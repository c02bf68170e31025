use crate::quotation::{ClientInfo, QuotationRecord};
use std::collections::HashMap;

/// 相似度下限与建议条数上限
const SUGGEST_CUTOFF: f64 = 0.4;
pub const SUGGEST_LIMIT: usize = 6;

/// 从历史记录推导的客户目录：小写客户名 → 最近一次的联系方式。
/// 按文件顺序遍历、后写覆盖先写；追加顺序即时间顺序，
/// 所以"最后出现"与"最近"一致（若记录被重排则不再成立）
pub struct ClientDirectory {
    entries: HashMap<String, ClientInfo>,
}

impl ClientDirectory {
    pub fn from_records(records: &[QuotationRecord]) -> Self {
        let mut entries = HashMap::new();
        for record in records {
            let name = record.client.name.trim();
            if name.is_empty() {
                continue;
            }
            entries.insert(name.to_lowercase(), record.client.clone());
        }
        Self { entries }
    }

    /// 精确匹配（不区分大小写），不做子串查找
    pub fn lookup(&self, name: &str) -> Option<&ClientInfo> {
        self.entries.get(&name.trim().to_lowercase())
    }

    /// 去重后的客户显示名，按字母序，用于"clientes frecuentes"下拉
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.entries.values().map(|c| c.name.clone()).collect();
        names.sort();
        names
    }

    /// 模糊建议：对全部已知客户名计算相似度，
    /// 超过下限的按相似度降序（同分按名字）取前几条
    pub fn suggest(&self, partial: &str, limit: usize) -> Vec<String> {
        let query = partial.trim().to_lowercase();
        if query.is_empty() {
            return Vec::new();
        }

        let mut scored: Vec<(f64, String)> = self
            .entries
            .values()
            .map(|c| (similarity(&query, &c.name.to_lowercase()), c.name.clone()))
            .filter(|(score, _)| *score > SUGGEST_CUTOFF)
            .collect();

        scored.sort_by(|a, b| {
            b.0.partial_cmp(&a.0)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.1.cmp(&b.1))
        });
        scored.truncate(limit);
        scored.into_iter().map(|(_, name)| name).collect()
    }
}

/// Ratcliff/Obershelp 相似度：2M / (|a| + |b|)，
/// M 为递归取最长公共块的匹配字符总数
pub fn similarity(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    2.0 * matching_chars(&a, &b) as f64 / total as f64
}

fn matching_chars(a: &[char], b: &[char]) -> usize {
    let (i, j, len) = longest_block(a, b);
    if len == 0 {
        return 0;
    }
    len + matching_chars(&a[..i], &b[..j]) + matching_chars(&a[i + len..], &b[j + len..])
}

/// 最长公共连续块，返回 (a 起点, b 起点, 长度)
fn longest_block(a: &[char], b: &[char]) -> (usize, usize, usize) {
    let mut best = (0, 0, 0);
    let mut row = vec![0usize; b.len() + 1];

    for i in 0..a.len() {
        let mut prev = 0;
        for j in 0..b.len() {
            let diagonal = prev;
            prev = row[j + 1];
            if a[i] == b[j] {
                let len = diagonal + 1;
                row[j + 1] = len;
                if len > best.2 {
                    best = (i + 1 - len, j + 1 - len, len);
                }
            } else {
                row[j + 1] = 0;
            }
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quotation::{Currency, LineItem, QuoteStatus};

    fn record(client: &ClientInfo, number: &str) -> QuotationRecord {
        QuotationRecord {
            number: number.to_string(),
            base_number: number.to_string(),
            version: 1,
            created_at: "2025-08-06 10:00".to_string(),
            delivery_date: None,
            client: client.clone(),
            payment_terms: String::new(),
            validity: String::new(),
            items: Vec::<LineItem>::new(),
            subtotal: 0.0,
            tax: 0.0,
            total: 0.0,
            tax_rate: 0.18,
            currency: Currency::Soles,
            tax_enabled: true,
            document_path: String::new(),
            status: QuoteStatus::Generated,
        }
    }

    fn client(name: &str, email: &str) -> ClientInfo {
        ClientInfo {
            name: name.to_string(),
            email: email.to_string(),
            address: String::new(),
            tax_id: String::new(),
        }
    }

    #[test]
    fn later_record_wins_per_lowercased_name() {
        let records = vec![
            record(&client("Panadería Rosa", "viejo@rosa.pe"), "COT-2025-00001"),
            record(&client("PANADERÍA ROSA", "nuevo@rosa.pe"), "COT-2025-00002"),
        ];
        let directory = ClientDirectory::from_records(&records);

        let found = directory.lookup("panadería rosa").unwrap();
        assert_eq!(found.email, "nuevo@rosa.pe");
        assert_eq!(found.name, "PANADERÍA ROSA");
    }

    #[test]
    fn lookup_is_exact_not_substring() {
        let records = vec![record(&client("Ferretería Lima", "x@lima.pe"), "COT-1")];
        let directory = ClientDirectory::from_records(&records);

        assert!(directory.lookup("FERRETERÍA LIMA").is_some());
        assert!(directory.lookup("Ferretería").is_none());
    }

    #[test]
    fn empty_names_are_skipped() {
        let records = vec![record(&client("   ", "nadie@x.pe"), "COT-1")];
        let directory = ClientDirectory::from_records(&records);
        assert!(directory.names().is_empty());
    }

    #[test]
    fn similarity_bounds() {
        assert_eq!(similarity("", ""), 1.0);
        assert_eq!(similarity("abc", "abc"), 1.0);
        assert_eq!(similarity("abc", "xyz"), 0.0);
        let partial = similarity("panaderia", "panaderia rosa");
        assert!(partial > 0.7 && partial < 1.0);
    }

    #[test]
    fn suggestions_ordered_by_similarity_and_capped() {
        let records = vec![
            record(&client("Panadería Rosa", "a@x.pe"), "COT-1"),
            record(&client("Panadería Rosario", "b@x.pe"), "COT-2"),
            record(&client("Ferretería Lima", "c@x.pe"), "COT-3"),
        ];
        let directory = ClientDirectory::from_records(&records);

        let suggestions = directory.suggest("panaderia ros", SUGGEST_LIMIT);
        assert!(!suggestions.is_empty());
        assert_eq!(suggestions[0], "Panadería Rosa");
        assert!(!suggestions.contains(&"Ferretería Lima".to_string()));

        let capped = directory.suggest("panaderia", 1);
        assert_eq!(capped.len(), 1);
    }

    #[test]
    fn blank_query_returns_nothing() {
        let records = vec![record(&client("Cliente", "c@x.pe"), "COT-1")];
        let directory = ClientDirectory::from_records(&records);
        assert!(directory.suggest("   ", SUGGEST_LIMIT).is_empty());
    }
}
