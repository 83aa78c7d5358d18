use crate::error::{AppError, Result};
use std::time::Duration;

/// 경매 API 기본 주소
pub const API_BASE_URL: &str = "https://v2.api.noroff.dev";

/// 세션 저장소 기본 위치
pub const DATABASE_URL: &str = "sqlite://session.db?mode=rwc";

/// 목록 페이지당 항목 수
pub const PAGE_SIZE: u32 = 20;

/// 검색 입력 대기 시간 (ms)
pub const SEARCH_QUIET_MS: u64 = 500;

#[derive(Debug, Clone)]
pub struct Config {
    pub api_base_url: String,
    pub api_key: Option<String>,
    pub database_url: String,
    pub bind_addr: String,
    pub page_size: u32,
    pub search_quiet_period: Duration,
    pub http_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: API_BASE_URL.to_string(),
            api_key: None,
            database_url: DATABASE_URL.to_string(),
            bind_addr: "0.0.0.0:3000".to_string(),
            page_size: PAGE_SIZE,
            search_quiet_period: Duration::from_millis(SEARCH_QUIET_MS),
            http_timeout: Duration::from_secs(30),
        }
    }
}

impl Config {
    /// 환경 변수로부터 설정 로드
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            api_base_url: lookup("API_BASE_URL")
                .map(|v| v.trim_end_matches('/').to_string())
                .unwrap_or(defaults.api_base_url),
            api_key: lookup("API_KEY").filter(|v| !v.trim().is_empty()),
            database_url: lookup("DATABASE_URL").unwrap_or(defaults.database_url),
            bind_addr: lookup("BIND_ADDR").unwrap_or(defaults.bind_addr),
            page_size: parse_var(&lookup, "PAGE_SIZE")?.unwrap_or(defaults.page_size),
            search_quiet_period: parse_var(&lookup, "SEARCH_QUIET_MS")?
                .map(Duration::from_millis)
                .unwrap_or(defaults.search_quiet_period),
            http_timeout: parse_var(&lookup, "HTTP_TIMEOUT_SECS")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.http_timeout),
        })
    }
}

fn parse_var<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Result<Option<T>> {
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| AppError::Config(format!("{key} 값이 올바르지 않습니다: {raw}"))),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let cfg = Config::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(cfg.api_base_url, API_BASE_URL);
        assert!(cfg.api_key.is_none());
        assert_eq!(cfg.page_size, 20);
        assert_eq!(cfg.search_quiet_period, Duration::from_millis(500));
    }

    #[test]
    fn overrides_are_applied() {
        let cfg = Config::from_lookup(lookup_from(&[
            ("API_BASE_URL", "http://localhost:9000/"),
            ("API_KEY", "key-123"),
            ("PAGE_SIZE", "12"),
            ("SEARCH_QUIET_MS", "250"),
        ]))
        .unwrap();
        assert_eq!(cfg.api_base_url, "http://localhost:9000");
        assert_eq!(cfg.api_key.as_deref(), Some("key-123"));
        assert_eq!(cfg.page_size, 12);
        assert_eq!(cfg.search_quiet_period, Duration::from_millis(250));
    }

    #[test]
    fn blank_api_key_is_ignored() {
        let cfg = Config::from_lookup(lookup_from(&[("API_KEY", "  ")])).unwrap();
        assert!(cfg.api_key.is_none());
    }

    #[test]
    fn malformed_number_is_a_config_error() {
        let err = Config::from_lookup(lookup_from(&[("PAGE_SIZE", "many")])).unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }
}
