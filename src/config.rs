use crate::error::AppError;
use crate::history::HistoryStore;
use crate::quotation::Currency;
use crate::storage;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::warn;

/// 配置文件结构版本；读旧文件时缺失字段按默认值补齐后升级
pub const CONFIG_SCHEMA_VERSION: u32 = 2;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyInfo {
    pub name: String,
    #[serde(default)]
    pub tax_id: String,
    #[serde(default)]
    pub address: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailConfig {
    #[serde(default)]
    pub host: String,
    #[serde(default = "default_smtp_port")]
    pub port: u16,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default = "default_use_tls")]
    pub use_tls: bool,
}

fn default_smtp_port() -> u16 {
    587
}

fn default_use_tls() -> bool {
    true
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: default_smtp_port(),
            username: String::new(),
            password: String::new(),
            use_tls: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    #[serde(default)]
    pub schema_version: u32,
    pub company: CompanyInfo,
    #[serde(default)]
    pub logo_path: Option<String>,
    pub series: String,
    pub correlative: u32,
    #[serde(default = "default_tax_rate")]
    pub tax_rate: f64,
    #[serde(default)]
    pub currency: Currency,
    #[serde(default = "default_payment_terms")]
    pub payment_terms: String,
    #[serde(default = "default_validity")]
    pub validity: String,
    #[serde(default)]
    pub email: EmailConfig,
    #[serde(default)]
    pub ruc_token: Option<String>,
    #[serde(default)]
    pub quotations_dir: Option<PathBuf>,
    #[serde(default)]
    pub references_dir: Option<PathBuf>,
}

fn default_tax_rate() -> f64 {
    0.18
}

fn default_payment_terms() -> String {
    "50% adelanto - 50% contraentrega".to_string()
}

fn default_validity() -> String {
    "15 días".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        let year = chrono::Local::now().format("%Y");
        Self {
            schema_version: CONFIG_SCHEMA_VERSION,
            company: CompanyInfo {
                name: "TENTACIONES ELENA".to_string(),
                tax_id: "20123456789".to_string(),
                address: "El Palmar 107 Urb. Salamanca Ate".to_string(),
            },
            logo_path: None,
            series: format!("COT-{}", year),
            correlative: 1,
            tax_rate: default_tax_rate(),
            currency: Currency::Soles,
            payment_terms: default_payment_terms(),
            validity: default_validity(),
            email: EmailConfig::default(),
            ruc_token: None,
            quotations_dir: None,
            references_dir: None,
        }
    }
}

impl AppConfig {
    /// 读旧配置：serde 的 default 已补齐缺失字段，这里只升级版本号
    fn migrate(mut self) -> Self {
        if self.schema_version < CONFIG_SCHEMA_VERSION {
            self.schema_version = CONFIG_SCHEMA_VERSION;
        }
        self
    }
}

/// 应用文件位置，集中解析一次
#[derive(Debug, Clone)]
pub struct AppPaths {
    pub base_dir: PathBuf,
    pub config_file: PathBuf,
    pub history_file: PathBuf,
    pub draft_file: PathBuf,
}

impl AppPaths {
    pub fn resolve() -> Self {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        Self::under(home.join("Cotizador"))
    }

    pub fn under(base_dir: PathBuf) -> Self {
        Self {
            config_file: base_dir.join("config_cotizador.json"),
            history_file: base_dir.join("historial_cotizaciones.json"),
            draft_file: base_dir.join("borrador.json"),
            base_dir,
        }
    }
}

pub struct AppState {
    pub paths: AppPaths,
    pub config: Mutex<AppConfig>,
    pub history: HistoryStore,
}

impl AppState {
    pub fn new() -> Self {
        Self::with_paths(AppPaths::resolve())
    }

    pub fn with_paths(paths: AppPaths) -> Self {
        if let Err(e) = std::fs::create_dir_all(&paths.base_dir) {
            warn!("无法创建目录 {}: {}", paths.base_dir.display(), e);
        }

        let config =
            storage::load_json_or(&paths.config_file, AppConfig::default()).migrate();
        let history = HistoryStore::new(paths.history_file.clone());

        Self {
            paths,
            config: Mutex::new(config),
            history,
        }
    }

    /// 配置的每次有效变更（含发号）都立即落盘
    pub fn save_config(&self, config: &AppConfig) -> std::result::Result<(), AppError> {
        storage::save_json(&self.paths.config_file, config)
    }

    pub fn quotations_dir(&self, config: &AppConfig) -> PathBuf {
        config
            .quotations_dir
            .clone()
            .unwrap_or_else(|| self.paths.base_dir.join("Cotizaciones"))
    }

    pub fn references_dir(&self, config: &AppConfig) -> PathBuf {
        config
            .references_dir
            .clone()
            .unwrap_or_else(|| self.paths.base_dir.join("Referencias"))
    }
}
