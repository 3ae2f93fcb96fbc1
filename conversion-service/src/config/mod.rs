use service_core::config as core_config;
use service_core::error::AppError;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_TIMEOUT_SECS: u64 = 120;
const DEFAULT_MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct ConversionConfig {
    pub common: core_config::Config,
    pub tools: ToolsConfig,
    pub workspace: WorkspaceConfig,
    pub max_upload_bytes: usize,
}

#[derive(Debug, Clone)]
pub struct ToolsConfig {
    pub pandoc_path: String,
    pub wkhtmltopdf_path: String,
    pub timeout_secs: u64,
}

impl ToolsConfig {
    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone)]
pub struct WorkspaceConfig {
    pub temp_dir: PathBuf,
}

impl ConversionConfig {
    pub fn load() -> Result<Self, AppError> {
        // Load common config (handles .env and APP__ prefix)
        let common = core_config::Config::load()?;

        Ok(ConversionConfig {
            common,
            tools: ToolsConfig {
                pandoc_path: get_env("PANDOC_PATH", "pandoc"),
                wkhtmltopdf_path: get_env("WKHTMLTOPDF_PATH", "wkhtmltopdf"),
                timeout_secs: require_nonzero(
                    "CONVERSION_TIMEOUT_SECS",
                    parse_env("CONVERSION_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?,
                )?,
            },
            workspace: WorkspaceConfig {
                temp_dir: env::var("CONVERSION_TEMP_DIR")
                    .map(PathBuf::from)
                    .unwrap_or_else(|_| env::temp_dir()),
            },
            max_upload_bytes: require_nonzero(
                "MAX_UPLOAD_BYTES",
                parse_env("MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?,
            )?,
        })
    }
}

fn get_env(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_env<T>(key: &str, default: T) -> Result<T, AppError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(val) => parse_value(key, &val),
        Err(_) => Ok(default),
    }
}

fn parse_value<T>(key: &str, val: &str) -> Result<T, AppError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    val.trim().parse().map_err(|e: T::Err| {
        AppError::ConfigError(anyhow::anyhow!("{} has invalid value '{}': {}", key, val, e))
    })
}

// A zero timeout expires every tool call at once; a zero limit rejects
// every upload.
fn require_nonzero<T>(key: &str, val: T) -> Result<T, AppError>
where
    T: PartialEq + Default,
{
    if val == T::default() {
        return Err(AppError::ConfigError(anyhow::anyhow!(
            "{} must be greater than zero",
            key
        )));
    }
    Ok(val)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_value_accepts_numbers() {
        let timeout: u64 = parse_value("CONVERSION_TIMEOUT_SECS", " 30 ").unwrap();
        assert_eq!(timeout, 30);
    }

    #[test]
    fn test_parse_value_rejects_garbage() {
        let err = parse_value::<usize>("MAX_UPLOAD_BYTES", "lots").unwrap_err();
        assert!(matches!(err, AppError::ConfigError(_)));
        assert!(err.to_string().contains("MAX_UPLOAD_BYTES"));
    }

    #[test]
    fn test_zero_timeout_is_rejected() {
        let timeout: u64 = parse_value("CONVERSION_TIMEOUT_SECS", "0").unwrap();
        let err = require_nonzero("CONVERSION_TIMEOUT_SECS", timeout).unwrap_err();
        assert!(matches!(err, AppError::ConfigError(_)));
        assert!(err.to_string().contains("CONVERSION_TIMEOUT_SECS"));

        assert_eq!(require_nonzero("CONVERSION_TIMEOUT_SECS", 1u64).unwrap(), 1);
    }

    #[test]
    fn test_zero_upload_limit_is_rejected() {
        let err = require_nonzero("MAX_UPLOAD_BYTES", 0usize).unwrap_err();
        assert!(matches!(err, AppError::ConfigError(_)));
    }

    #[test]
    fn test_command_timeout() {
        let tools = ToolsConfig {
            pandoc_path: "pandoc".to_string(),
            wkhtmltopdf_path: "wkhtmltopdf".to_string(),
            timeout_secs: 45,
        };
        assert_eq!(tools.command_timeout(), Duration::from_secs(45));
    }
}
