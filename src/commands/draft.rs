use crate::commands::quotation::QuotationDraft;
use crate::config::AppState;
use crate::error::Result;
use crate::storage;
use tauri::State;

/// 自动保存定时器（前端）每次触发时整体覆盖草稿文件
#[tauri::command]
pub fn save_draft(state: State<'_, AppState>, draft: QuotationDraft) -> Result<()> {
    storage::save_json(&state.paths.draft_file, &draft).map_err(|e| e.to_string())
}

/// 启动时恢复上次的草稿；没有或损坏则返回 None
#[tauri::command]
pub fn load_draft(state: State<'_, AppState>) -> Result<Option<QuotationDraft>> {
    Ok(storage::load_json_or(&state.paths.draft_file, None))
}

#[tauri::command]
pub fn discard_draft(state: State<'_, AppState>) -> Result<()> {
    let path = &state.paths.draft_file;
    if path.exists() {
        std::fs::remove_file(path).map_err(|e| e.to_string())?;
    }
    Ok(())
}
