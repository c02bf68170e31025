#![allow(non_snake_case)]

use crate::config::AppState;
use crate::error::Result;
use crate::numbering;
use crate::quotation::{
    compute_totals, round2, ClientInfo, Currency, DraftItem, LineItem, QuotationRecord,
    QuoteStatus, Totals,
};
use crate::renderer::{self, RenderJob};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tauri::State;
use tracing::{info, warn};

/// 编辑中的报价单，由前端整体传入
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuotationDraft {
    pub client: ClientInfo,
    #[serde(default)]
    pub delivery_date: Option<String>,
    #[serde(default)]
    pub payment_terms: String,
    #[serde(default)]
    pub validity: String,
    #[serde(default)]
    pub terms: String,
    pub items: Vec<DraftItem>,
    #[serde(default = "default_tax_enabled")]
    pub tax_enabled: bool,
    #[serde(default)]
    pub currency: Option<Currency>,
    /// 以某个既有编号为基础出新版本时携带该编号
    #[serde(default)]
    pub version_of: Option<String>,
}

fn default_tax_enabled() -> bool {
    true
}

/// 录入校验：不通过则不触碰任何状态
fn validate(draft: &QuotationDraft) -> Result<()> {
    if draft.client.name.trim().is_empty() {
        return Err("Cliente es obligatorio.".to_string());
    }
    if draft.items.is_empty() {
        return Err("No hay ítems.".to_string());
    }
    for item in &draft.items {
        if item.description.trim().is_empty() {
            return Err("La descripción no puede estar vacía.".to_string());
        }
        if !item.quantity.is_finite() || item.quantity <= 0.0 {
            return Err("Cantidad o precio inválidos.".to_string());
        }
        if !item.unit_price.is_finite() || item.unit_price < 0.0 {
            return Err("Cantidad o precio inválidos.".to_string());
        }
    }

    let email = draft.client.email.trim();
    if !email.is_empty() {
        let re = regex::Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").unwrap();
        if !re.is_match(email) {
            return Err("Email del cliente inválido.".to_string());
        }
    }
    Ok(())
}

/// 实时合计面板用：纯计算，不落盘
#[tauri::command]
pub fn preview_totals(items: Vec<DraftItem>, taxEnabled: bool, taxRate: f64) -> Result<Totals> {
    Ok(compute_totals(&items, taxEnabled, taxRate))
}

/// 生成报价单：校验 → 发号 → 渲染 PDF → 迁移参考图 → 登记历史。
/// 校验失败在写任何文件之前返回
#[tauri::command]
pub fn generate_quotation(
    state: State<'_, AppState>,
    draft: QuotationDraft,
) -> Result<QuotationRecord> {
    generate(&state, draft)
}

fn generate(state: &AppState, draft: QuotationDraft) -> Result<QuotationRecord> {
    validate(&draft)?;

    let records = state.history.load_all();

    // 发号；基础序列递增后立即持久化配置，异常退出也不会重号
    let (number, config) = {
        let mut config = state
            .config
            .lock()
            .map_err(|_| "configuración no disponible".to_string())?;
        let number = numbering::issue(&mut config, &records, draft.version_of.as_deref());
        if draft.version_of.is_none() {
            state.save_config(&config).map_err(|e| e.to_string())?;
        }
        (number, config.clone())
    };

    let quotations_dir = state.quotations_dir(&config);
    let references_dir = state.references_dir(&config);
    fs::create_dir_all(&quotations_dir).map_err(|e| e.to_string())?;
    fs::create_dir_all(&references_dir).map_err(|e| e.to_string())?;

    // 工作图片移入参考图目录，按编号+序号改名
    let mut items: Vec<LineItem> = Vec::with_capacity(draft.items.len());
    for (i, item) in draft.items.iter().enumerate() {
        let image_ref = item
            .image_path
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .and_then(|src| copy_reference_image(src, &references_dir, &number, i + 1));

        items.push(LineItem {
            description: item.description.trim().to_string(),
            quantity: item.quantity,
            unit_price: item.unit_price,
            subtotal: round2(item.subtotal()),
            image_ref,
        });
    }

    let totals = compute_totals(&draft.items, draft.tax_enabled, config.tax_rate);
    let currency = draft.currency.unwrap_or(config.currency);
    let client = ClientInfo {
        name: draft.client.name.trim().to_string(),
        email: draft.client.email.trim().to_string(),
        address: draft.client.address.trim().to_string(),
        tax_id: draft.client.tax_id.trim().to_string(),
    };
    let payment_terms = if draft.payment_terms.trim().is_empty() {
        config.payment_terms.clone()
    } else {
        draft.payment_terms.trim().to_string()
    };
    let validity = if draft.validity.trim().is_empty() {
        config.validity.clone()
    } else {
        draft.validity.trim().to_string()
    };

    let now = chrono::Local::now();
    let file_name = format!("{} - {}.pdf", renderer::sanitize_filename(&client.name), number);
    let (base_number, version) = numbering::split_version(&number);

    let record = QuotationRecord {
        number: number.clone(),
        base_number,
        version,
        created_at: now.format("%Y-%m-%d %H:%M").to_string(),
        delivery_date: draft.delivery_date.clone(),
        client: client.clone(),
        payment_terms: payment_terms.clone(),
        validity: validity.clone(),
        items: items.clone(),
        subtotal: round2(totals.subtotal),
        tax: round2(totals.tax),
        total: round2(totals.total),
        tax_rate: config.tax_rate,
        currency,
        tax_enabled: draft.tax_enabled,
        document_path: file_name.clone(),
        status: QuoteStatus::Generated,
    };

    let job = RenderJob {
        company: config.company.clone(),
        logo_path: config.logo_path.clone(),
        number: number.clone(),
        date: now.format("%d/%m/%Y").to_string(),
        client,
        delivery_date: draft.delivery_date.clone(),
        payment_terms,
        validity,
        terms: draft.terms.clone(),
        items,
        totals: Totals {
            subtotal: record.subtotal,
            tax: record.tax,
            total: record.total,
        },
        currency,
        references_dir,
    };

    let bytes = renderer::render_quotation(&job).map_err(|e| e.to_string())?;
    let output_path = quotations_dir.join(&file_name);
    fs::write(&output_path, &bytes).map_err(|e| format!("No se pudo escribir el PDF: {}", e))?;

    state.history.append(record.clone()).map_err(|e| e.to_string())?;
    info!("cotización {} generada en {}", number, output_path.display());

    Ok(record)
}

/// 复制参考图；失败时只跳过该图（与渲染同样的降级策略）
fn copy_reference_image(
    src: &str,
    references_dir: &Path,
    number: &str,
    index: usize,
) -> Option<String> {
    let ext = Path::new(src)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("png")
        .to_lowercase();
    let file_name = format!("{}_ref{}.{}", number, index, ext);

    match fs::copy(src, references_dir.join(&file_name)) {
        Ok(_) => Some(file_name),
        Err(e) => {
            warn!("no se pudo copiar la imagen {}: {}", src, e);
            None
        }
    }
}
