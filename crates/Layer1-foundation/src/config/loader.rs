//! Config Loader - 설정 파일 탐색 및 로드
//!
//! 우선순위:
//! 1. 명시적 경로 (`--config`)
//! 2. `SEEDBRIDGE_CONFIG` 환경변수
//! 3. 글로벌 설정 (`<config_dir>/seedbridge/config.json`)
//! 4. 현재 디렉토리 `seedbridge.json`

use super::bridge::BridgeConfig;
use crate::{Error, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// 설정 파일명
pub const CONFIG_FILE: &str = "config.json";

/// 프로젝트 설정 파일명
pub const PROJECT_CONFIG_FILE: &str = "seedbridge.json";

/// 설정 경로 환경변수
pub const CONFIG_ENV: &str = "SEEDBRIDGE_CONFIG";

/// Base URL 덮어쓰기 환경변수
pub const BASE_URL_ENV: &str = "SEEDBRIDGE_API_BASE_URL";

/// 설정 파일 형식
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Json,
    Toml,
}

impl ConfigFormat {
    /// 확장자로 형식 결정 (`.toml`만 TOML, 나머지는 JSON)
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("toml") => ConfigFormat::Toml,
            _ => ConfigFormat::Json,
        }
    }
}

/// Parse and validate configuration text.
pub fn parse_config(content: &str, format: ConfigFormat) -> Result<BridgeConfig> {
    let mut config: BridgeConfig = match format {
        ConfigFormat::Json => serde_json::from_str(content)
            .map_err(|e| Error::invalid_config(format!("malformed JSON: {}", e)))?,
        ConfigFormat::Toml => toml::from_str(content)
            .map_err(|e| Error::invalid_config(format!("malformed TOML: {}", e)))?,
    };
    config.expand_env();
    Ok(config)
}

/// 설정 로더 (builder)
#[derive(Debug, Clone, Default)]
pub struct ConfigLoader {
    path: Option<PathBuf>,
    base_url: Option<String>,
    max_attempts: Option<u32>,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// 명시적 설정 경로
    pub fn path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// CLI에서 받은 base URL (환경변수보다 우선)
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = Some(attempts);
        self
    }

    /// 사용할 설정 파일 경로 결정
    pub fn resolve_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.path {
            return Ok(path.clone());
        }

        if let Ok(path) = std::env::var(CONFIG_ENV) {
            if !path.trim().is_empty() {
                return Ok(PathBuf::from(path));
            }
        }

        let mut candidates = Vec::new();
        if let Some(dir) = dirs::config_dir() {
            candidates.push(dir.join("seedbridge").join(CONFIG_FILE));
        }
        if let Ok(cwd) = std::env::current_dir() {
            candidates.push(cwd.join(PROJECT_CONFIG_FILE));
        }

        candidates
            .iter()
            .find(|p| p.exists())
            .cloned()
            .ok_or_else(|| {
                Error::ConfigNotFound(
                    candidates
                        .iter()
                        .map(|p| p.display().to_string())
                        .collect::<Vec<_>>()
                        .join(", "),
                )
            })
    }

    /// 설정 로드 + 덮어쓰기 적용 + 검증
    pub fn load(&self) -> Result<BridgeConfig> {
        let path = self.resolve_path()?;
        info!("Loading configuration from {}", path.display());

        let content = std::fs::read_to_string(&path).map_err(|e| {
            Error::invalid_config(format!("failed to read {}: {}", path.display(), e))
        })?;

        let config = parse_config(&content, ConfigFormat::from_path(&path))?;
        self.finish(config)
    }

    /// 이미 파싱된 설정에 덮어쓰기 적용 후 검증
    pub fn finish(&self, mut config: BridgeConfig) -> Result<BridgeConfig> {
        if let Ok(url) = std::env::var(BASE_URL_ENV) {
            if !url.trim().is_empty() {
                debug!("api_base_url overridden by {}", BASE_URL_ENV);
                config.api_base_url = Some(url);
            }
        }
        if let Some(url) = &self.base_url {
            debug!("api_base_url overridden by command line");
            config.api_base_url = Some(url.clone());
        }
        if let Some(attempts) = self.max_attempts {
            config.retry.max_attempts = attempts;
        }

        config.validate()?;
        Ok(config)
    }
}
