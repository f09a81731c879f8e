use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub inventory: InventoryConfig,
    #[serde(default)]
    pub report: ReportConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

/// Station/device inventory collaborator (equipment lists per station).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryConfig {
    pub base_url: String,
}

impl Default for InventoryConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8990".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Business-timezone offset from UTC, in minutes (IST = 330).
    pub timezone_offset_minutes: i32,
    /// When true a ticket is only zeroed if `status = CANCELLED` AND
    /// `is_cancelled` is set; when false the status alone is enough.
    pub require_cancelled_flag: bool,
    /// Lookback for still-open shift sessions, in days.
    pub shift_lookback_days: i64,
    /// Cap on concurrent per-station sub-queries within one report.
    pub station_fanout: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            timezone_offset_minutes: 330,
            require_cancelled_flag: false,
            shift_lookback_days: 30,
            station_fanout: 8,
        }
    }
}

impl Config {
    pub fn from_toml() -> Result<Self, Box<dyn std::error::Error>> {
        let config_path = env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
        use std::io::ErrorKind;

        let config_result = std::fs::read_to_string(&config_path);

        let mut config: Config = match config_result {
            Ok(config_str) => {
                toml::from_str(&config_str)
                    .map_err(|e| format!("Failed to parse config file: {e}"))?
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                // No config file: build from environment variables and defaults.
                let database_url = env::var("DATABASE_URL").map_err(|_| {
                    "DATABASE_URL is not set and no config.toml was found".to_string()
                })?;

                Config {
                    server: ServerConfig {
                        host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                        port: env_parse("SERVER_PORT", 8080u16),
                    },
                    database: DatabaseConfig {
                        url: database_url,
                        max_connections: env_parse("DB_MAX_CONNECTIONS", 10u32),
                    },
                    inventory: InventoryConfig {
                        base_url: env::var("INVENTORY_BASE_URL")
                            .unwrap_or_else(|_| InventoryConfig::default().base_url),
                    },
                    report: ReportConfig {
                        timezone_offset_minutes: env_parse("REPORT_TZ_OFFSET_MINUTES", 330i32),
                        require_cancelled_flag: env_parse("REPORT_REQUIRE_CANCELLED_FLAG", false),
                        shift_lookback_days: env_parse("REPORT_SHIFT_LOOKBACK_DAYS", 30i64),
                        station_fanout: env_parse("REPORT_STATION_FANOUT", 8usize),
                    },
                }
            }
            Err(e) => {
                return Err(format!("Failed to read config file {config_path}: {e}").into());
            }
        };

        // Environment overrides apply even when the file exists.
        if let Ok(v) = env::var("SERVER_HOST") {
            config.server.host = v;
        }
        if let Ok(v) = env::var("SERVER_PORT") {
            if let Ok(p) = v.parse() {
                config.server.port = p;
            }
        }
        if let Ok(v) = env::var("DATABASE_URL") {
            config.database.url = v;
        }
        if let Ok(v) = env::var("DB_MAX_CONNECTIONS") {
            if let Ok(mc) = v.parse() {
                config.database.max_connections = mc;
            }
        }
        if let Ok(v) = env::var("INVENTORY_BASE_URL") {
            config.inventory.base_url = v;
        }
        if let Ok(v) = env::var("REPORT_TZ_OFFSET_MINUTES") {
            if let Ok(n) = v.parse() {
                config.report.timezone_offset_minutes = n;
            }
        }
        if let Ok(v) = env::var("REPORT_REQUIRE_CANCELLED_FLAG") {
            if let Ok(b) = v.parse() {
                config.report.require_cancelled_flag = b;
            }
        }
        if let Ok(v) = env::var("REPORT_SHIFT_LOOKBACK_DAYS") {
            if let Ok(n) = v.parse() {
                config.report.shift_lookback_days = n;
            }
        }
        if let Ok(v) = env::var("REPORT_STATION_FANOUT") {
            if let Ok(n) = v.parse() {
                config.report.station_fanout = n;
            }
        }

        Ok(config)
    }
}

fn env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}
