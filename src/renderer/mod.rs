//! 文档渲染：把定稿的报价单排版成 PDF 字节流。
//! 文件写盘与历史登记由 command 层负责

mod layout;
mod pdf;

use crate::config::CompanyInfo;
use crate::error::AppError;
use crate::quotation::{ClientInfo, Currency, LineItem, Totals};
use std::path::PathBuf;

/// 渲染一份报价单所需的全部数据
pub struct RenderJob {
    pub company: CompanyInfo,
    pub logo_path: Option<String>,
    pub number: String,
    /// 显示用日期（dd/mm/YYYY）
    pub date: String,
    pub client: ClientInfo,
    pub delivery_date: Option<String>,
    pub payment_terms: String,
    pub validity: String,
    /// 自由文本的条款区，可为空
    pub terms: String,
    pub items: Vec<LineItem>,
    pub totals: Totals,
    pub currency: Currency,
    /// imageRef 相对此目录解析
    pub references_dir: PathBuf,
}

pub fn render_quotation(job: &RenderJob) -> Result<Vec<u8>, AppError> {
    pdf::generate(job)
}

/// 客户名清洗成文件名：去掉非法字符，空格换下划线
pub fn sanitize_filename(name: &str) -> String {
    let re = regex::Regex::new(r"[^\w\s\-\.]").unwrap();
    let cleaned = re.replace_all(name, "");
    let cleaned = cleaned.trim().split_whitespace().collect::<Vec<_>>().join("_");
    if cleaned.is_empty() {
        "SinCliente".to_string()
    } else {
        cleaned
    }
}
