// Std.
use std::path::Path;
use std::time::Duration;

// External.
use configparser::ini::Ini;

// Custom.
use crate::reporter_service::RetryPolicy;
use shared::misc::error::AppError;
use shared::network::net_params::*;

pub const CONFIG_FILE_NAME: &str = "reporter_connector.ini";

// --------------- server section start ---------------
const CONFIG_SERVER_SECTION_NAME: &str = "server";
const CONFIG_HOST_PARAM: &str = "host";
const CONFIG_PORT_PARAM: &str = "port";
// --------------- server section end ---------------
// --------------- connection section start ---------------
const CONFIG_CONNECTION_SECTION_NAME: &str = "connection";
const CONFIG_RETRY_CONNECT_COUNT_PARAM: &str = "retry_connect_count";
const CONFIG_RETRY_CONNECT_INTERVAL_PARAM: &str = "retry_connect_interval_ms";
const CONFIG_CONNECT_TIMEOUT_PARAM: &str = "connect_timeout_ms";
const CONFIG_IO_TIMEOUT_PARAM: &str = "io_timeout_ms";
// --------------- connection section end ---------------

/// Where to send reports and how patiently.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigManager {
    pub server_host: String,
    pub server_port: u16,
    pub retry_connect_count: usize,
    pub retry_connect_interval_ms: u64,
    pub connect_timeout_ms: u64,
    /// `0` means no read/write timeout.
    pub io_timeout_ms: u64,
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self {
            server_host: String::from(DEFAULT_SERVER_HOST),
            server_port: DEFAULT_SERVER_PORT,
            retry_connect_count: RETRY_CONNECT_COUNT,
            retry_connect_interval_ms: RETRY_CONNECT_INTERVAL_MS,
            connect_timeout_ms: CONNECT_TIMEOUT_MS,
            io_timeout_ms: MAX_WAIT_TIME_IN_READ_WRITE_MS,
        }
    }
}

impl ConfigManager {
    /// Reads config values from the .ini file if it exists, otherwise uses default values.
    /// Values missing in the file also use default values.
    ///
    /// The file is never written.
    pub fn load(config_file: &Path) -> Result<Self, AppError> {
        let mut config_manager = ConfigManager::default();

        if !config_file.exists() {
            return Ok(config_manager);
        }

        let mut config = Ini::new();
        if let Err(e) = config.load(config_file) {
            return Err(AppError::new(&e, file!(), line!()));
        }

        config_manager.read_config(&config)?;

        Ok(config_manager)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.retry_connect_count,
            interval: Duration::from_millis(self.retry_connect_interval_ms),
        }
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn io_timeout(&self) -> Option<Duration> {
        if self.io_timeout_ms == 0 {
            None
        } else {
            Some(Duration::from_millis(self.io_timeout_ms))
        }
    }

    fn read_config(&mut self, config: &Ini) -> Result<(), AppError> {
        // Server section started.

        if let Some(host) = config.get(CONFIG_SERVER_SECTION_NAME, CONFIG_HOST_PARAM) {
            if !host.trim().is_empty() {
                self.server_host = host.trim().to_string();
            }
        }

        if let Some(port) =
            ConfigManager::read_number(config, CONFIG_SERVER_SECTION_NAME, CONFIG_PORT_PARAM)?
        {
            self.server_port = u16::try_from(port).map_err(|_| {
                AppError::new(
                    &format!("the value {} is not a valid port", port),
                    file!(),
                    line!(),
                )
            })?;
        }

        // Connection section started.

        if let Some(count) = ConfigManager::read_number(
            config,
            CONFIG_CONNECTION_SECTION_NAME,
            CONFIG_RETRY_CONNECT_COUNT_PARAM,
        )? {
            if count == 0 {
                return Err(AppError::new(
                    &format!("\"{}\" should be at least 1", CONFIG_RETRY_CONNECT_COUNT_PARAM),
                    file!(),
                    line!(),
                ));
            }
            self.retry_connect_count = count as usize;
        }

        if let Some(interval) = ConfigManager::read_number(
            config,
            CONFIG_CONNECTION_SECTION_NAME,
            CONFIG_RETRY_CONNECT_INTERVAL_PARAM,
        )? {
            self.retry_connect_interval_ms = interval;
        }

        if let Some(timeout) = ConfigManager::read_number(
            config,
            CONFIG_CONNECTION_SECTION_NAME,
            CONFIG_CONNECT_TIMEOUT_PARAM,
        )? {
            if timeout == 0 {
                return Err(AppError::new(
                    &format!("\"{}\" should be at least 1", CONFIG_CONNECT_TIMEOUT_PARAM),
                    file!(),
                    line!(),
                ));
            }
            self.connect_timeout_ms = timeout;
        }

        if let Some(timeout) = ConfigManager::read_number(
            config,
            CONFIG_CONNECTION_SECTION_NAME,
            CONFIG_IO_TIMEOUT_PARAM,
        )? {
            self.io_timeout_ms = timeout;
        }

        Ok(())
    }

    /// Returns `None` if the value is not set.
    fn read_number(config: &Ini, section: &str, key: &str) -> Result<Option<u64>, AppError> {
        config.getuint(section, key).map_err(|e| {
            AppError::new(
                &format!("failed to read \"{}\" in section \"{}\": {}", key, section, e),
                file!(),
                line!(),
            )
        })
    }
}
