use anyhow::anyhow;
use fern::colors::{Color, ColoredLevelConfig};
use league_core::{Address, Network, TransactionGate, TOKEN_DECIMALS};
use log::LevelFilter;
use serde::{Deserialize, Serialize};
use std::{
    env,
    fs::{self, File},
    io::{Read, Write},
    path::PathBuf,
    time::Duration,
};
use time::{format_description::well_known::Iso8601, OffsetDateTime};

#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Settings {
    pub level: Option<String>,
    pub chain_settings: ChainSettings,
    pub watcher_settings: WatcherSettings,
}

impl ConfigurableSettings for Settings {
    fn apply_overrides(&mut self, overrides: &SettingsOverrides) {
        if let Some(level) = &overrides.level {
            self.level = Some(level.clone());
        }
    }

    fn default_config_path() -> PathBuf {
        PathBuf::from("./config/local.toml")
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChainSettings {
    /// Chain id the wallet has to be connected to
    pub chain_id: u64,
    /// Human readable chain name shown on the switch network control
    pub network_name: String,
    /// Escrow contract holding the league pots, also the token spender
    pub escrow_address: String,
    /// ERC20 token staked as entry fee
    pub token_address: String,
    pub token_symbol: String,
    pub token_decimals: u8,
}

impl Default for ChainSettings {
    fn default() -> Self {
        ChainSettings {
            chain_id: 31337,
            network_name: String::from("Localhost"),
            escrow_address: String::from("0x5FbDB2315678afecb367f032d93F642f64180aa3"),
            token_address: String::from("0xe7f1725E7734CE288F8367e1Bb143E90bb3F0512"),
            token_symbol: String::from("CLAWD"),
            token_decimals: TOKEN_DECIMALS,
        }
    }
}

impl ChainSettings {
    pub fn network(&self) -> Network {
        Network {
            chain_id: self.chain_id,
            name: self.network_name.clone(),
        }
    }

    pub fn escrow(&self) -> Address {
        Address::new(self.escrow_address.clone())
    }

    pub fn token(&self) -> Address {
        Address::new(self.token_address.clone())
    }

    pub fn transaction_gate(&self) -> TransactionGate {
        TransactionGate::new(self.network(), self.escrow(), self.token_symbol.clone())
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WatcherSettings {
    /// Seconds between league snapshot refreshes
    pub refresh_interval_secs: u64,
    /// Milliseconds between countdown ticks, keep at or below one second
    pub countdown_tick_ms: u64,
}

impl Default for WatcherSettings {
    fn default() -> Self {
        WatcherSettings {
            refresh_interval_secs: 4,
            countdown_tick_ms: 1000,
        }
    }
}

impl WatcherSettings {
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs.max(1))
    }

    pub fn countdown_tick(&self) -> Duration {
        Duration::from_millis(self.countdown_tick_ms.clamp(1, 1000))
    }
}

/// Values supplied by the embedding application that win over the file.
#[derive(Clone, Debug, Default)]
pub struct SettingsOverrides {
    pub config: Option<String>,
    pub level: Option<String>,
}

pub trait ConfigurableSettings: Serialize + for<'de> Deserialize<'de> + Default {
    /// Apply overrides after loading from file
    fn apply_overrides(&mut self, overrides: &SettingsOverrides);

    /// Get the default config file path
    fn default_config_path() -> PathBuf {
        PathBuf::from("./config/settings.toml")
    }

    /// Get the config directory path
    fn config_directory() -> PathBuf {
        PathBuf::from("./config")
    }
}

pub fn get_settings(overrides: SettingsOverrides) -> Result<Settings, anyhow::Error> {
    get_settings_with_overrides(overrides)
}

pub fn get_settings_with_overrides<T: ConfigurableSettings>(
    overrides: SettingsOverrides,
) -> Result<T, anyhow::Error> {
    let mut settings = if let Some(config_path) = overrides.config.clone() {
        let path = PathBuf::from(config_path);

        let absolute_path = if path.is_absolute() {
            path
        } else {
            env::current_dir()?.join(path)
        };

        match File::open(absolute_path) {
            Ok(mut file) => {
                let mut content = String::new();
                file.read_to_string(&mut content)
                    .map_err(|e| anyhow!("Failed to read config: {}", e))?;
                toml::from_str(&content)
                    .map_err(|e| anyhow!("Failed to map config to settings: {}", e))?
            }
            Err(err) => return Err(anyhow!("Failed to find file: {}", err)),
        }
    } else {
        let default_path = T::default_config_path();
        match File::open(&default_path) {
            Ok(mut file) => {
                let mut content = String::new();
                file.read_to_string(&mut content)
                    .map_err(|e| anyhow!("Failed to read default config: {}", e))?;
                toml::from_str(&content)
                    .map_err(|e| anyhow!("Failed to parse default config: {}", e))?
            }
            Err(_) => {
                let default_settings = T::default();

                fs::create_dir_all(T::config_directory())
                    .map_err(|e| anyhow!("Failed to create config directory: {}", e))?;

                let toml_content = toml::to_string(&default_settings)
                    .map_err(|e| anyhow!("Failed to serialize default settings: {}", e))?;

                let mut file = fs::File::create(&default_path)
                    .map_err(|e| anyhow!("Failed to create config file: {}", e))?;
                file.write_all(toml_content.as_bytes())
                    .map_err(|e| anyhow!("Failed to write default config: {}", e))?;

                default_settings
            }
        }
    };

    settings.apply_overrides(&overrides);

    Ok(settings)
}

pub fn setup_logger(
    level: Option<String>,
    filter_targets: Vec<String>,
) -> Result<(), fern::InitError> {
    let rust_log = get_log_level(level);
    let colors = ColoredLevelConfig::new()
        .trace(Color::White)
        .debug(Color::Cyan)
        .info(Color::Blue)
        .warn(Color::Yellow)
        .error(Color::Magenta);

    fern::Dispatch::new()
        .format(move |out, message, record| {
            let timestamp = OffsetDateTime::now_utc()
                .format(&Iso8601::DEFAULT)
                .unwrap_or_default();
            out.finish(format_args!(
                "[{} {}] {}: {}",
                timestamp,
                colors.color(record.level()),
                record.target(),
                message
            ));
        })
        .level(rust_log)
        .filter(move |metadata| {
            !filter_targets
                .iter()
                .any(|filter| metadata.target().starts_with(filter))
        })
        .chain(std::io::stdout())
        .apply()?;
    Ok(())
}

pub fn get_log_level(level: Option<String>) -> LevelFilter {
    let level = level.unwrap_or_else(|| env::var("RUST_LOG").unwrap_or_default());
    match level.to_lowercase().as_str() {
        "trace" => LevelFilter::Trace,
        "debug" => LevelFilter::Debug,
        "info" => LevelFilter::Info,
        "warn" => LevelFilter::Warn,
        "error" => LevelFilter::Error,
        _ => LevelFilter::Info,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_parsing() {
        assert_eq!(get_log_level(Some("debug".into())), LevelFilter::Debug);
        assert_eq!(get_log_level(Some("WARN".into())), LevelFilter::Warn);
        assert_eq!(get_log_level(Some("chatty".into())), LevelFilter::Info);
    }

    #[test]
    fn test_settings_round_trip_through_toml_file() {
        let dir = env::temp_dir().join(format!("league-settings-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("league.toml");

        let mut settings = Settings::default();
        settings.chain_settings.chain_id = 8453;
        settings.chain_settings.network_name = "Base".into();
        settings.watcher_settings.refresh_interval_secs = 12;
        fs::write(&path, toml::to_string(&settings).unwrap()).unwrap();

        let loaded: Settings = get_settings_with_overrides(SettingsOverrides {
            config: Some(path.to_string_lossy().into_owned()),
            level: Some("debug".into()),
        })
        .unwrap();

        assert_eq!(loaded.level.as_deref(), Some("debug"));
        assert_eq!(loaded.chain_settings.network().name, "Base");
        assert_eq!(loaded.watcher_settings.refresh_interval(), Duration::from_secs(12));
        assert_eq!(loaded.chain_settings.transaction_gate().token_symbol, "CLAWD");

        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn test_missing_explicit_config_is_an_error() {
        let result = get_settings(SettingsOverrides {
            config: Some("/definitely/not/here/league.toml".into()),
            level: None,
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_setup_logger_installs_once() {
        // another test in this binary may have installed a logger already
        match setup_logger(Some("debug".into()), vec![String::from("hyper")]) {
            Ok(()) => log::info!("logger installed"),
            Err(fern::InitError::SetLoggerError(_)) => {}
            Err(e) => panic!("unexpected logger error: {e}"),
        }

        assert!(matches!(
            setup_logger(None, vec![]),
            Err(fern::InitError::SetLoggerError(_))
        ));
    }

    #[test]
    fn test_countdown_tick_never_slower_than_a_second() {
        let settings = WatcherSettings {
            refresh_interval_secs: 0,
            countdown_tick_ms: 5000,
        };
        assert_eq!(settings.countdown_tick(), Duration::from_secs(1));
        assert_eq!(settings.refresh_interval(), Duration::from_secs(1));
    }
}
