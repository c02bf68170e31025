pub mod clients;
pub mod config;
pub mod draft;
pub mod email;
pub mod files;
pub mod history;
pub mod quotation;
pub mod ruc;

use crate::config::AppState;
use crate::quotation::QuotationRecord;
use std::path::PathBuf;

/// 历史记录只存文件名，打开/附件时在当前配置的目录下解析
pub(crate) fn resolve_document_path(
    state: &AppState,
    record: &QuotationRecord,
) -> Result<PathBuf, String> {
    let config = state
        .config
        .lock()
        .map_err(|_| "configuración no disponible".to_string())?;
    Ok(state.quotations_dir(&config).join(&record.document_path))
}
