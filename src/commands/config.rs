use crate::config::{AppConfig, AppState, CONFIG_SCHEMA_VERSION};
use crate::error::Result;
use tauri::State;

#[tauri::command]
pub fn get_config(state: State<'_, AppState>) -> Result<AppConfig> {
    let config = state
        .config
        .lock()
        .map_err(|_| "configuración no disponible".to_string())?;
    Ok(config.clone())
}

/// 保存配置对话框的内容并落盘
#[tauri::command]
pub fn save_config(state: State<'_, AppState>, config: AppConfig) -> Result<AppConfig> {
    if !(0.0..=1.0).contains(&config.tax_rate) {
        return Err("Tasa de IGV inválida (debe estar entre 0 y 1).".to_string());
    }
    if config.email.port == 0 {
        return Err("Puerto inválido.".to_string());
    }

    let mut guard = state
        .config
        .lock()
        .map_err(|_| "configuración no disponible".to_string())?;

    let mut incoming = config;
    incoming.schema_version = CONFIG_SCHEMA_VERSION;
    // 序列为空时保留原值；correlativo 只能经发号路径递增
    if incoming.series.trim().is_empty() {
        incoming.series = guard.series.clone();
    } else {
        incoming.series = incoming.series.trim().to_string();
    }
    incoming.correlative = guard.correlative;

    state.save_config(&incoming).map_err(|e| e.to_string())?;
    *guard = incoming;
    Ok(guard.clone())
}
