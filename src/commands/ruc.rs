use crate::config::AppState;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tauri::State;

const RUC_API_BASE: &str = "https://dniruc.apisperu.com/api/v1/ruc";
const RUC_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RucInfo {
    pub ruc: String,
    pub name: String,
    pub address: Option<String>,
}

/// 服务端字段因版本而异，都按可缺失处理
#[derive(Debug, Deserialize)]
struct RucApiResponse {
    #[serde(rename = "razonSocial")]
    razon_social: Option<String>,
    nombre: Option<String>,
    direccion: Option<String>,
}

/// 按 RUC 查询客户名称/地址。单次请求、固定超时、无重试；
/// 成功后由前端覆盖客户名/地址字段
#[tauri::command]
pub async fn lookup_ruc(state: State<'_, AppState>, ruc: String) -> Result<RucInfo> {
    let ruc = ruc.trim().to_string();
    if ruc.len() != 11 || !ruc.chars().all(|c| c.is_ascii_digit()) {
        return Err("RUC inválido: deben ser 11 dígitos.".to_string());
    }

    let token = {
        let config = state
            .config
            .lock()
            .map_err(|_| "configuración no disponible".to_string())?;
        config.ruc_token.clone()
    };
    let token = token
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| "Configura el token de consulta RUC en 'Configuración'.".to_string())?;

    let client = reqwest::Client::builder()
        .timeout(RUC_TIMEOUT)
        .build()
        .map_err(|e| e.to_string())?;

    let url = format!("{}/{}?token={}", RUC_API_BASE, ruc, token);
    let response = client
        .get(&url)
        .send()
        .await
        .map_err(|e| format!("Consulta RUC fallida: {}", e))?;

    if !response.status().is_success() {
        return Err(format!("Consulta RUC fallida: HTTP {}", response.status()));
    }

    let data: RucApiResponse = response
        .json()
        .await
        .map_err(|e| format!("Respuesta RUC inválida: {}", e))?;

    let name = data
        .razon_social
        .or(data.nombre)
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .ok_or_else(|| format!("El servicio no devolvió datos para el RUC {}.", ruc))?;

    Ok(RucInfo {
        ruc,
        name,
        address: data
            .direccion
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty()),
    })
}
