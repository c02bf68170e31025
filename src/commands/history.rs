#![allow(non_snake_case)]

use crate::config::AppState;
use crate::error::Result;
use crate::history::HistoryFilter;
use crate::quotation::{QuotationRecord, QuoteStatus};
use std::collections::BTreeMap;
use tauri::State;

#[tauri::command]
pub fn list_history(state: State<'_, AppState>) -> Result<Vec<QuotationRecord>> {
    Ok(state.history.load_all())
}

#[tauri::command]
pub fn filter_history(
    state: State<'_, AppState>,
    filter: HistoryFilter,
) -> Result<Vec<QuotationRecord>> {
    Ok(state.history.filter(&filter))
}

/// 改写某条记录的状态。状态集合封闭，但不限制转换方向；
/// Aceptada/Rechazada 的确认对话框在前端
#[tauri::command]
pub fn update_quotation_status(
    state: State<'_, AppState>,
    number: String,
    status: QuoteStatus,
) -> Result<QuotationRecord> {
    state
        .history
        .update_status(&number, status)
        .map_err(|e| e.to_string())
}

/// 导出历史为 CSV（Excel 直接打开）。
/// 文件尾部附汇总块，不是严格的表格数据，按原样保留
#[tauri::command]
pub fn export_history_csv(state: State<'_, AppState>, outputPath: String) -> Result<String> {
    let records = state.history.load_all();
    if records.is_empty() {
        return Err("No hay cotizaciones para exportar.".to_string());
    }

    let csv = build_csv(&records);
    std::fs::write(&outputPath, csv).map_err(|e| format!("No se pudo exportar: {}", e))?;
    Ok(outputPath)
}

fn csv_escape(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn build_csv(records: &[QuotationRecord]) -> String {
    // BOM：utf-8-sig，Excel 才能认出编码
    let mut out = String::from("\u{feff}");
    out.push_str(
        "numero,fecha,entrega,cliente,email,direccion,ruc,items,subtotal,igv,total,moneda,estado,archivo\n",
    );

    let mut grand_total = 0.0;
    let mut by_status: BTreeMap<&'static str, usize> = BTreeMap::new();

    for r in records {
        grand_total += r.total;
        *by_status.entry(r.status.as_str()).or_insert(0) += 1;

        let row = [
            csv_escape(&r.number),
            csv_escape(&r.created_at),
            csv_escape(r.delivery_date.as_deref().unwrap_or("")),
            csv_escape(&r.client.name),
            csv_escape(&r.client.email),
            csv_escape(&r.client.address),
            csv_escape(&r.client.tax_id),
            r.items.len().to_string(),
            format!("{:.2}", r.subtotal),
            format!("{:.2}", r.tax),
            format!("{:.2}", r.total),
            format!("{:?}", r.currency).to_uppercase(),
            r.status.as_str().to_string(),
            csv_escape(&r.document_path),
        ];
        out.push_str(&row.join(","));
        out.push('\n');
    }

    out.push('\n');
    out.push_str(&format!("TOTAL GENERAL,{:.2}\n", grand_total));
    for (status, count) in by_status {
        out.push_str(&format!("{},{}\n", status, count));
    }

    out
}
