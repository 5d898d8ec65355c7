use crate::errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

pub mod migrate; // use submodule at src/config/migrate.rs

/// Department and model a controller is installed on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    pub department: String,
    pub model: String,
}

impl DeviceInfo {
    pub fn new(department: &str, model: &str) -> Self {
        Self {
            department: department.to_string(),
            model: model.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub database: String,
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_secs: u64,
    /// Offset used to evaluate shift boundaries ("+01:00"). System timezone when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shift_utc_offset: Option<String>,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default = "default_devices")]
    pub devices: BTreeMap<String, DeviceInfo>,
}

fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    5000
}
fn default_sweep_interval() -> u64 {
    30
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_devices() -> BTreeMap<String, DeviceInfo> {
    let mut devices = BTreeMap::new();
    devices.insert("ESP01".to_string(), DeviceInfo::new("Assembly", "Model_A"));
    devices.insert("ESP02".to_string(), DeviceInfo::new("Testing", "Model_A"));
    devices.insert("ESP03".to_string(), DeviceInfo::new("Packing", "Model_B"));
    devices.insert("ESP04".to_string(), DeviceInfo::new("Quality", "Model_C"));
    devices
}

impl Default for Config {
    fn default() -> Self {
        Self::with_database(Self::database_file())
    }
}

impl Config {
    /// Default configuration pointing at the given database file.
    pub fn with_database<P: AsRef<Path>>(db_path: P) -> Self {
        Self {
            database: db_path.as_ref().to_string_lossy().to_string(),
            bind_address: default_bind_address(),
            port: default_port(),
            sweep_interval_secs: default_sweep_interval(),
            shift_utc_offset: None,
            log_level: default_log_level(),
            devices: default_devices(),
        }
    }

    /// Return the standard configuration directory (`~/.rcycletime`)
    pub fn config_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".rcycletime")
    }

    /// Return the full path of the config file
    pub fn config_file() -> PathBuf {
        Self::config_dir().join("rcycletime.conf")
    }

    /// Return the full path of the SQLite database
    pub fn database_file() -> PathBuf {
        Self::config_dir().join("rcycletime.sqlite")
    }

    /// Load configuration from file, or return defaults if not found
    pub fn load() -> AppResult<Self> {
        Self::load_from(&Self::config_file())
    }

    pub fn load_from(path: &Path) -> AppResult<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }

        let content = fs::read_to_string(path).map_err(|_| AppError::ConfigLoad)?;
        serde_yaml::from_str(&content)
            .map_err(|e| AppError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Write this configuration as YAML.
    pub fn save_to(&self, path: &Path) -> AppResult<()> {
        let yaml = serde_yaml::to_string(self).map_err(|_| AppError::ConfigSave)?;
        let mut file = fs::File::create(path)?;
        file.write_all(yaml.as_bytes())?;
        Ok(())
    }

    /// Initialize configuration and database files
    pub fn init_all(custom_name: Option<String>, is_test: bool) -> AppResult<PathBuf> {
        let dir = Self::config_dir();
        fs::create_dir_all(&dir)?;

        // DB name: user provided or default
        let db_path = match custom_name {
            Some(name) => {
                let p = Path::new(&name);
                if p.is_absolute() {
                    p.to_path_buf()
                } else {
                    dir.join(p)
                }
            }
            None => dir.join("rcycletime.sqlite"),
        };

        // Write config file
        if !is_test {
            let config = Config::with_database(&db_path);
            config.save_to(&Self::config_file())?;
            println!("✅ Config file: {:?}", Self::config_file());
        }

        // Create empty DB file if not exists
        if !db_path.exists() {
            fs::File::create(&db_path)?;
        }

        println!("✅ Database:    {:?}", db_path);

        Ok(db_path)
    }
}
