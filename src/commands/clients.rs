use crate::clients::{ClientDirectory, SUGGEST_LIMIT};
use crate::config::AppState;
use crate::error::Result;
use crate::quotation::ClientInfo;
use tauri::State;

fn directory(state: &AppState) -> ClientDirectory {
    ClientDirectory::from_records(&state.history.load_all())
}

/// 客户名模糊建议（输入框防抖后调用）
#[tauri::command]
pub fn suggest_clients(state: State<'_, AppState>, partial: String) -> Result<Vec<String>> {
    Ok(directory(&state).suggest(&partial, SUGGEST_LIMIT))
}

/// 精确取回某客户最近的联系方式，用于快速填充
#[tauri::command]
pub fn lookup_client(state: State<'_, AppState>, name: String) -> Result<Option<ClientInfo>> {
    Ok(directory(&state).lookup(&name).cloned())
}

/// "Clientes frecuentes" 下拉的全量去重名单
#[tauri::command]
pub fn frequent_clients(state: State<'_, AppState>) -> Result<Vec<String>> {
    Ok(directory(&state).names())
}
