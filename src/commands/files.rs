use crate::commands::resolve_document_path;
use crate::config::AppState;
use crate::error::Result;
use tauri::State;

/// 用系统程序打开某条记录的 PDF（历史窗口双击）
#[tauri::command]
pub fn open_quotation(state: State<'_, AppState>, number: String) -> Result<String> {
    let record = state
        .history
        .load_all()
        .into_iter()
        .find(|r| r.number == number)
        .ok_or_else(|| format!("Cotización no encontrada: {}", number))?;

    let path = resolve_document_path(&state, &record)?;
    if !path.exists() {
        return Err(format!(
            "El archivo no se encuentra en la ruta registrada:\n{}",
            path.display()
        ));
    }

    let path_str = path.to_string_lossy().to_string();
    open_with_default(&path_str).map_err(|e| format!("No se pudo abrir el archivo: {}", e))?;
    Ok(path_str)
}

/// 打开生成目录
#[tauri::command]
pub fn open_quotations_folder(state: State<'_, AppState>) -> Result<String> {
    let dir = {
        let config = state
            .config
            .lock()
            .map_err(|_| "configuración no disponible".to_string())?;
        state.quotations_dir(&config)
    };
    std::fs::create_dir_all(&dir).map_err(|e| e.to_string())?;

    let dir_str = dir.to_string_lossy().to_string();
    open_with_default(&dir_str).map_err(|e| format!("No se pudo abrir la carpeta: {}", e))?;
    Ok(dir_str)
}

/// 用默认程序打开文件
fn open_with_default(file_path: &str) -> std::result::Result<(), String> {
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open")
            .arg(file_path)
            .spawn()
            .map(|_| ())
            .map_err(|e| e.to_string())
    }
    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/c", "start", "", file_path])
            .spawn()
            .map(|_| ())
            .map_err(|e| e.to_string())
    }
    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open")
            .arg(file_path)
            .spawn()
            .map(|_| ())
            .map_err(|e| e.to_string())
    }
}
