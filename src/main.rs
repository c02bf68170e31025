// Prevents additional console window on Windows in release builds
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod clients;
mod commands;
mod config;
mod error;
mod history;
mod numbering;
mod quotation;
mod renderer;
mod storage;

use commands::{
    clients::*,
    config::*,
    draft::*,
    email::*,
    files::*,
    history::*,
    quotation::*,
    ruc::*,
};
use tauri::menu::{MenuBuilder, MenuItem, SubmenuBuilder};
use tauri::{Emitter, Manager};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    tauri::Builder::default()
        .plugin(tauri_plugin_shell::init())
        .plugin(tauri_plugin_dialog::init())
        .plugin(tauri_plugin_fs::init())
        .setup(|app| {
            // Initialize app state
            app.manage(config::AppState::new());

            // ── 构建原生系统菜单 ──
            let handle = app.handle();

            let file_menu = SubmenuBuilder::new(handle, "Archivo")
                .item(&MenuItem::with_id(handle, "generate_pdf", "Generar PDF", true, Some("CmdOrCtrl+G"))?)
                .item(&MenuItem::with_id(handle, "send_email", "Enviar por correo", true, Some("CmdOrCtrl+E"))?)
                .item(&MenuItem::with_id(handle, "new_version", "Nueva versión...", true, None::<&str>)?)
                .separator()
                .item(&MenuItem::with_id(handle, "export_csv", "Exportar Excel (CSV)...", true, None::<&str>)?)
                .item(&MenuItem::with_id(handle, "open_folder", "Abrir carpeta de cotizaciones", true, None::<&str>)?)
                .separator()
                .quit()
                .build()?;

            let view_menu = SubmenuBuilder::new(handle, "Ver")
                .item(&MenuItem::with_id(handle, "show_history", "Historial", true, Some("CmdOrCtrl+H"))?)
                .item(&MenuItem::with_id(handle, "show_settings", "Configuración...", true, Some("CmdOrCtrl+,"))?)
                .build()?;

            let menu = MenuBuilder::new(handle)
                .item(&file_menu)
                .item(&view_menu)
                .build()?;

            app.set_menu(menu)?;

            // 监听菜单事件，转发到前端
            app.on_menu_event(move |app_handle, event| {
                let id = event.id().0.as_str();
                if let Some(window) = app_handle.get_webview_window("main") {
                    let _ = window.emit("menu-event", id);
                }
            });

            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            // Quotation commands
            generate_quotation,
            preview_totals,

            // History commands
            list_history,
            filter_history,
            update_quotation_status,
            export_history_csv,

            // Client directory commands
            suggest_clients,
            lookup_client,
            frequent_clients,

            // Config commands
            get_config,
            save_config,

            // Draft autosave commands
            save_draft,
            load_draft,
            discard_draft,

            // Email commands
            test_smtp_connection,
            send_quotation_email,

            // RUC lookup
            lookup_ruc,

            // File helpers
            open_quotation,
            open_quotations_folder,
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
