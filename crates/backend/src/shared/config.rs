use chrono_tz::Tz;
use contracts::enums::order_status::OrderStatus;
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub upstream: UpstreamConfig,
    pub finance: FinanceConfig,
    pub crm: CrmConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

/// REST API учётной системы: заказы, счета к оплате и платежи
#[derive(Debug, Deserialize, Clone)]
pub struct UpstreamConfig {
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct FinanceConfig {
    /// IANA-имя часового пояса бизнеса для "к оплате сегодня"
    pub timezone: String,
    /// Статус, подставляемый вместо неизвестных кодов заказа
    pub unknown_status_fallback: OrderStatus,
    #[serde(default = "default_page_limit")]
    pub page_limit: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CrmConfig {
    pub message_counts_path: String,
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_page_limit() -> u32 {
    50
}

impl FinanceConfig {
    pub fn tz(&self) -> anyhow::Result<Tz> {
        self.timezone
            .parse::<Tz>()
            .map_err(|e| anyhow::anyhow!("invalid finance.timezone '{}': {}", self.timezone, e))
    }
}

/// Конфигурация по умолчанию, встроенная в бинарник
const DEFAULT_CONFIG: &str = r#"
[server]
port = 3000

[upstream]
base_url = "http://localhost:8080/api"
timeout_secs = 30

[finance]
timezone = "America/Sao_Paulo"
unknown_status_fallback = "approved"
page_limit = 50

[crm]
message_counts_path = "data/message_counts.json"
"#;

/// Загрузка конфигурации из config.toml
///
/// Порядок поиска:
/// 1. Рядом с исполняемым файлом (production)
/// 2. Встроенная конфигурация по умолчанию
pub fn load_config() -> anyhow::Result<Config> {
    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            let config_path = exe_dir.join("config.toml");

            if config_path.exists() {
                tracing::info!("Loading config from: {}", config_path.display());
                let contents = std::fs::read_to_string(&config_path)?;
                return parse_config(&contents);
            } else {
                tracing::warn!("config.toml not found at: {}", config_path.display());
            }
        }
    }

    tracing::info!("Using default embedded configuration");
    parse_config(DEFAULT_CONFIG)
}

fn parse_config(contents: &str) -> anyhow::Result<Config> {
    let config: Config = toml::from_str(contents)?;
    // Fail at startup rather than on the first "due today" computation
    config.finance.tz()?;
    Ok(config)
}

/// Путь из конфигурации: абсолютный как есть, относительный от папки исполняемого файла
pub fn resolve_path(path_str: &str) -> PathBuf {
    let path = Path::new(path_str);

    if path.is_absolute() {
        return path.to_path_buf();
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            return exe_dir.join(path);
        }
    }

    PathBuf::from(path_str)
}
