// ⚙️ Configuration - defaults overridden from the environment

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::whatsapp::BusinessApiConfig;

pub const DEFAULT_CLINIC_NAME: &str = "Caramelo Neurodesenvolvimento";
pub const DEFAULT_CLINIC_WHATSAPP: &str = "5511999999999";
pub const DEFAULT_CLIENT_PHONE: &str = "11999999999";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClinicConfig {
    pub clinic_name: String,

    /// Destination of every "send to clinic" message
    pub clinic_whatsapp: String,

    /// Used for client-bound messages; there is no client phone book
    pub client_phone: String,

    /// User id of the demo patient whose notifications the client dashboard shows
    pub demo_client_id: String,

    pub log: LogConfig,
    pub business_api: BusinessApiConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogConfig {
    pub dir: PathBuf,
    /// `EnvFilter` directive used when `RUST_LOG` is unset
    pub default_filter: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig {
            dir: default_log_dir(),
            default_filter: "info".to_string(),
        }
    }
}

impl Default for ClinicConfig {
    fn default() -> Self {
        ClinicConfig {
            clinic_name: DEFAULT_CLINIC_NAME.to_string(),
            clinic_whatsapp: DEFAULT_CLINIC_WHATSAPP.to_string(),
            client_phone: DEFAULT_CLIENT_PHONE.to_string(),
            demo_client_id: "1".to_string(),
            log: LogConfig::default(),
            business_api: BusinessApiConfig::default(),
        }
    }
}

impl ClinicConfig {
    /// Defaults, then process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults, then whatever `lookup` returns for each known variable
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = ClinicConfig::default();

        if let Some(number) = lookup("CARAMELO_CLINIC_WHATSAPP") {
            config.clinic_whatsapp = number;
        }
        if let Some(phone) = lookup("CARAMELO_CLIENT_PHONE") {
            config.client_phone = phone;
        }
        if let Some(dir) = lookup("CARAMELO_LOG_DIR") {
            config.log.dir = PathBuf::from(dir);
        }

        config.business_api = BusinessApiConfig {
            api_url: lookup("WHATSAPP_API_URL").unwrap_or_default(),
            access_token: lookup("WHATSAPP_ACCESS_TOKEN").unwrap_or_default(),
            phone_number_id: lookup("WHATSAPP_PHONE_NUMBER_ID").unwrap_or_default(),
        };

        config
    }
}

/// - macOS: ~/Library/Logs/caramelo
/// - Windows: %APPDATA%/caramelo/logs
/// - Linux: ~/.local/share/caramelo/logs
pub fn default_log_dir() -> PathBuf {
    if cfg!(target_os = "macos") {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        PathBuf::from(home).join("Library/Logs/caramelo")
    } else if cfg!(target_os = "windows") {
        let appdata = std::env::var("APPDATA").unwrap_or_else(|_| ".".to_string());
        PathBuf::from(appdata).join("caramelo").join("logs")
    } else {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        PathBuf::from(home).join(".local/share/caramelo/logs")
    }
}
