use crate::error::{Result, TraceLensError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// APIのベースURL（未設定時）
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// 解析リクエストのタイムアウト（秒）
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 120;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_url: String,
    pub timeout_seconds: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_config()
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default_config())
        }
    }

    /// 読み込めない設定ファイルは警告を出して既定値で置き換える
    ///
    /// `config` サブコマンドが壊れた設定を上書きできるようにするため。
    pub fn load_or_default() -> Self {
        match Self::config_path() {
            Ok(path) => Self::load_or_default_from(&path),
            Err(e) => {
                tracing::warn!(error = %e, "config path unavailable, using defaults");
                Self::default_config()
            }
        }
    }

    pub fn load_or_default_from(path: &Path) -> Self {
        Self::load_from(path).unwrap_or_else(|e| {
            tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable config");
            Self::default_config()
        })
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| TraceLensError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("tracelens").join("config.json"))
    }

    fn default_config() -> Self {
        Self {
            api_url: DEFAULT_API_URL.into(),
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
        }
    }

    /// 実際に使うベースURL
    ///
    /// `--api-url`（環境変数 `TRACELENS_API_URL` を含む）が設定ファイルより優先。
    pub fn resolve_api_url(&self, flag: Option<&str>) -> String {
        flag.map(str::trim)
            .filter(|url| !url.is_empty())
            .unwrap_or(self.api_url.as_str())
            .trim_end_matches('/')
            .to_string()
    }

    /// タイムアウト（0秒は既定値に置き換える）
    pub fn timeout(&self, flag: Option<u64>) -> Duration {
        let seconds = match flag.unwrap_or(self.timeout_seconds) {
            0 => DEFAULT_TIMEOUT_SECONDS,
            s => s,
        };
        Duration::from_secs(seconds)
    }

    pub fn set_api_url(&mut self, url: String) -> Result<()> {
        let url = url.trim().trim_end_matches('/').to_string();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(TraceLensError::Config(format!(
                "URLは http:// または https:// で始めてください: {}",
                url
            )));
        }
        self.api_url = url;
        Ok(())
    }

    pub fn set_timeout(&mut self, seconds: u64) -> Result<()> {
        if seconds == 0 {
            return Err(TraceLensError::Config("タイムアウトは1秒以上にしてください".into()));
        }
        self.timeout_seconds = seconds;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempdir().expect("一時ディレクトリ作成失敗");
        let config = Config::load_from(&dir.path().join("none.json")).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.api_url, "http://localhost:8000");
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().expect("一時ディレクトリ作成失敗");
        let path = dir.path().join("nested").join("config.json");

        let mut config = Config::default();
        config.set_api_url("https://tracelens.example.com/".into()).unwrap();
        config.set_timeout(30).unwrap();
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.api_url, "https://tracelens.example.com");
        assert_eq!(loaded.timeout_seconds, 30);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempdir().expect("一時ディレクトリ作成失敗");
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"api_url":"http://10.0.0.2:8000"}"#).unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.api_url, "http://10.0.0.2:8000");
        assert_eq!(config.timeout_seconds, DEFAULT_TIMEOUT_SECONDS);
    }

    #[test]
    fn test_corrupt_file_can_be_repaired() {
        let dir = tempdir().expect("一時ディレクトリ作成失敗");
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ broken").unwrap();

        assert!(Config::load_from(&path).is_err());

        let mut config = Config::load_or_default_from(&path);
        assert_eq!(config, Config::default());

        config.set_api_url("http://10.0.0.5:8000".into()).unwrap();
        config.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap().api_url, "http://10.0.0.5:8000");
    }

    #[test]
    fn test_flag_overrides_file() {
        let config = Config::default();
        assert_eq!(config.resolve_api_url(None), "http://localhost:8000");
        assert_eq!(
            config.resolve_api_url(Some("http://api:9000/")),
            "http://api:9000"
        );
        assert_eq!(config.resolve_api_url(Some("  ")), "http://localhost:8000");
    }

    #[test]
    fn test_timeout_resolution() {
        let config = Config::default();
        assert_eq!(config.timeout(None), Duration::from_secs(120));
        assert_eq!(config.timeout(Some(5)), Duration::from_secs(5));
        assert_eq!(config.timeout(Some(0)), Duration::from_secs(120));
    }

    #[test]
    fn test_invalid_settings_rejected() {
        let mut config = Config::default();
        assert!(config.set_api_url("localhost:8000".into()).is_err());
        assert!(config.set_timeout(0).is_err());
        assert_eq!(config, Config::default());
    }
}
