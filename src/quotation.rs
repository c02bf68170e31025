use crate::numbering;
use serde::{Deserialize, Serialize};

/// 货币，与历史文件中的字符串值一一对应
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Soles,
    Dolares,
    Euros,
}

impl Currency {
    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::Soles => "S/",
            Currency::Dolares => "$",
            Currency::Euros => "€",
        }
    }
}

/// 报价单状态。不限制状态之间的转换，确认由前端负责
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuoteStatus {
    #[default]
    Generated,
    Sent,
    Accepted,
    Rejected,
}

impl QuoteStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuoteStatus::Generated => "Generated",
            QuoteStatus::Sent => "Sent",
            QuoteStatus::Accepted => "Accepted",
            QuoteStatus::Rejected => "Rejected",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientInfo {
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub tax_id: String,
}

/// 历史记录中的行项目快照
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub description: String,
    pub quantity: f64,
    #[serde(rename = "unitPrice")]
    pub unit_price: f64,
    pub subtotal: f64,
    #[serde(default)]
    pub image_ref: Option<String>,
}

/// 编辑中的行项目，由前端传入；imagePath 指向原始图片文件，
/// 生成时才复制进参考图目录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftItem {
    pub description: String,
    pub quantity: f64,
    #[serde(rename = "unitPrice")]
    pub unit_price: f64,
    #[serde(default)]
    pub image_path: Option<String>,
}

impl DraftItem {
    pub fn subtotal(&self) -> f64 {
        self.quantity * self.unit_price
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuotationRecord {
    pub number: String,
    #[serde(default)]
    pub base_number: String,
    #[serde(default)]
    pub version: u32,
    pub created_at: String,
    #[serde(default)]
    pub delivery_date: Option<String>,
    pub client: ClientInfo,
    #[serde(default)]
    pub payment_terms: String,
    #[serde(default)]
    pub validity: String,
    pub items: Vec<LineItem>,
    pub subtotal: f64,
    pub tax: f64,
    pub total: f64,
    #[serde(default)]
    pub tax_rate: f64,
    #[serde(default)]
    pub currency: Currency,
    #[serde(default)]
    pub tax_enabled: bool,
    #[serde(default)]
    pub document_path: String,
    #[serde(default)]
    pub status: QuoteStatus,
}

impl QuotationRecord {
    /// 旧版本历史文件没有 baseNumber/version 字段，读取时从编号补齐
    pub fn normalize(&mut self) {
        if self.base_number.is_empty() || self.version == 0 {
            let (base, version) = numbering::split_version(&self.number);
            self.base_number = base;
            self.version = version;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Totals {
    pub subtotal: f64,
    pub tax: f64,
    pub total: f64,
}

/// 合计计算：全精度求和，只在持久化/显示处舍入到 2 位。
/// 不在此处校验数量/价格为正，校验属于录入环节。
pub fn compute_totals(items: &[DraftItem], tax_enabled: bool, tax_rate: f64) -> Totals {
    let subtotal: f64 = items.iter().map(DraftItem::subtotal).sum();
    let tax = if tax_enabled { subtotal * tax_rate } else { 0.0 };
    Totals {
        subtotal,
        tax,
        total: subtotal + tax,
    }
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// 千位分隔的金额格式，PDF 与界面共用（S/ 1,234.56）
pub fn format_money(value: f64) -> String {
    let s = format!("{:.2}", value);
    let (int_part, dec_part) = s.split_once('.').unwrap_or((s.as_str(), "00"));

    let mut out = String::new();
    let chars: Vec<char> = int_part.chars().collect();
    let mut cnt = 0;
    for i in (0..chars.len()).rev() {
        if chars[i] == '-' {
            out.push(chars[i]);
            continue;
        }
        if cnt == 3 {
            out.push(',');
            cnt = 0;
        }
        out.push(chars[i]);
        cnt += 1;
    }
    let int_with_sep: String = out.chars().rev().collect();
    format!("{}.{}", int_with_sep, dec_part)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(quantity: f64, unit_price: f64) -> DraftItem {
        DraftItem {
            description: "Producto".to_string(),
            quantity,
            unit_price,
            image_path: None,
        }
    }

    #[test]
    fn subtotal_is_sum_of_products() {
        let items = vec![item(2.0, 50.0), item(1.0, 30.0), item(3.0, 10.0)];
        let totals = compute_totals(&items, false, 0.18);
        assert!((totals.subtotal - 160.0).abs() < 1e-9);
    }

    #[test]
    fn subtotal_is_order_independent() {
        let a = vec![item(2.0, 50.0), item(1.0, 100.0), item(0.5, 9.9)];
        let b = vec![item(0.5, 9.9), item(2.0, 50.0), item(1.0, 100.0)];
        let ta = compute_totals(&a, true, 0.18);
        let tb = compute_totals(&b, true, 0.18);
        assert!((ta.subtotal - tb.subtotal).abs() < 1e-9);
        assert!((ta.total - tb.total).abs() < 1e-9);
    }

    #[test]
    fn tax_is_zero_when_disabled() {
        let items = vec![item(4.0, 25.0)];
        let totals = compute_totals(&items, false, 0.99);
        assert_eq!(totals.tax, 0.0);
        assert!((totals.total - totals.subtotal).abs() < 1e-9);
    }

    #[test]
    fn total_equals_subtotal_plus_tax() {
        let items = vec![item(3.0, 33.33), item(1.0, 0.01)];
        let totals = compute_totals(&items, true, 0.18);
        assert!((totals.total - (totals.subtotal + totals.tax)).abs() < 1e-9);
    }

    #[test]
    fn igv_scenario_200_36_236() {
        let items = vec![item(2.0, 50.0), item(1.0, 100.0)];
        let totals = compute_totals(&items, true, 0.18);
        assert_eq!(round2(totals.subtotal), 200.0);
        assert_eq!(round2(totals.tax), 36.0);
        assert_eq!(round2(totals.total), 236.0);
    }

    #[test]
    fn round2_keeps_two_decimals() {
        assert_eq!(round2(10.125), 10.13);
        assert_eq!(round2(10.124), 10.12);
        assert_eq!(round2(0.0), 0.0);
    }

    #[test]
    fn money_format_uses_thousands_separator() {
        assert_eq!(format_money(1234.56), "1,234.56");
        assert_eq!(format_money(0.0), "0.00");
        assert_eq!(format_money(1234567.0), "1,234,567.00");
    }

    #[test]
    fn currency_wire_values_and_symbols() {
        assert_eq!(serde_json::to_string(&Currency::Soles).unwrap(), "\"SOLES\"");
        assert_eq!(serde_json::to_string(&Currency::Dolares).unwrap(), "\"DOLARES\"");
        assert_eq!(Currency::Soles.symbol(), "S/");
        assert_eq!(Currency::Euros.symbol(), "€");
    }

    #[test]
    fn status_defaults_to_generated() {
        let parsed: QuoteStatus = serde_json::from_str("\"Sent\"").unwrap();
        assert_eq!(parsed, QuoteStatus::Sent);
        assert_eq!(QuoteStatus::default(), QuoteStatus::Generated);
    }

    #[test]
    fn normalize_fills_base_and_version_from_number() {
        let mut record = sample_record("COT-2025-00007-V3");
        record.base_number = String::new();
        record.version = 0;
        record.normalize();
        assert_eq!(record.base_number, "COT-2025-00007");
        assert_eq!(record.version, 3);

        let mut plain = sample_record("COT-2025-00001");
        plain.base_number = String::new();
        plain.version = 0;
        plain.normalize();
        assert_eq!(plain.base_number, "COT-2025-00001");
        assert_eq!(plain.version, 1);
    }

    fn sample_record(number: &str) -> QuotationRecord {
        QuotationRecord {
            number: number.to_string(),
            base_number: number.to_string(),
            version: 1,
            created_at: "2025-08-06 10:30".to_string(),
            delivery_date: None,
            client: ClientInfo {
                name: "Cliente Test".to_string(),
                email: "cliente@ejemplo.com".to_string(),
                address: "Av. Principal 123".to_string(),
                tax_id: String::new(),
            },
            payment_terms: "50% adelanto - 50% contraentrega".to_string(),
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
            document_path: format!("Cliente_Test - {}.pdf", number),
            status: QuoteStatus::Generated,
        }
    }
}
