//! Connection configuration
//!
//! 연결 설정

use std::fmt;

use serde::{Deserialize, Serialize};

/// 기본 호스트
pub const DEFAULT_HOST: &str = "localhost";
/// 기본 데이터베이스
pub const DEFAULT_DATABASE: &str = "test";
/// 기본 사용자
pub const DEFAULT_USERNAME: &str = "SYSTEM";
/// 기본 비밀번호
pub const DEFAULT_PASSWORD: &str = "MANAGER";

// ============================================================================
// ConnectionConfig - 연결 설정
// ============================================================================

/// 연결 설정
///
/// 세션 생성 시 캡처되어 `reset` 시 재연결에 그대로 사용됩니다.
///
/// | 필드 | 기본값 |
/// |------|--------|
/// | `host` | `localhost` |
/// | `database` | `test` |
/// | `username` | `SYSTEM` |
/// | `password` | `MANAGER` |
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionConfig {
    /// 호스트 이름 또는 IP
    pub host: String,
    /// 데이터베이스 이름
    pub database: String,
    /// 사용자명
    pub username: String,
    /// 비밀번호
    pub password: String,
}

impl ConnectionConfig {
    /// 새 설정 생성
    pub fn new() -> Self {
        Self::default()
    }

    /// 빌더 시작
    pub fn builder() -> ConnectionConfigBuilder {
        ConnectionConfigBuilder::new()
    }

    /// 호스트 설정
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// 데이터베이스 설정
    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = database.into();
        self
    }

    /// 사용자 인증 정보 설정
    pub fn with_credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = username.into();
        self.password = password.into();
        self
    }
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            database: DEFAULT_DATABASE.to_string(),
            username: DEFAULT_USERNAME.to_string(),
            password: DEFAULT_PASSWORD.to_string(),
        }
    }
}

impl fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("host", &self.host)
            .field("database", &self.database)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

// ============================================================================
// ConnectionConfigBuilder - 연결 설정 빌더
// ============================================================================

/// 연결 설정 빌더
#[derive(Debug, Default)]
pub struct ConnectionConfigBuilder {
    config: ConnectionConfig,
}

impl ConnectionConfigBuilder {
    /// 새 빌더 생성
    pub fn new() -> Self {
        Self::default()
    }

    /// 호스트 설정
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.config.host = host.into();
        self
    }

    /// 데이터베이스 설정
    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.config.database = database.into();
        self
    }

    /// 사용자명 설정
    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.config.username = username.into();
        self
    }

    /// 비밀번호 설정
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.config.password = password.into();
        self
    }

    /// 빌드
    pub fn build(self) -> ConnectionConfig {
        self.config
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ConnectionConfig::default();
        assert_eq!(config.host, "localhost");
        assert_eq!(config.database, "test");
        assert_eq!(config.username, "SYSTEM");
        assert_eq!(config.password, "MANAGER");
    }

    #[test]
    fn test_with_methods() {
        let config = ConnectionConfig::new()
            .with_host("db.example.com")
            .with_database("catalog")
            .with_credentials("admin", "secret");

        assert_eq!(config.host, "db.example.com");
        assert_eq!(config.database, "catalog");
        assert_eq!(config.username, "admin");
        assert_eq!(config.password, "secret");
    }

    #[test]
    fn test_builder() {
        let config = ConnectionConfig::builder()
            .with_database("my_db")
            .with_username("reader")
            .build();

        assert_eq!(config.host, "localhost");
        assert_eq!(config.database, "my_db");
        assert_eq!(config.username, "reader");
        assert_eq!(config.password, "MANAGER");
    }

    #[test]
    fn test_debug_redacts_password() {
        let config = ConnectionConfig::new().with_credentials("admin", "hunter2");
        let debug = format!("{:?}", config);

        assert!(debug.contains("admin"));
        assert!(!debug.contains("hunter2"));
    }

    #[test]
    fn test_deserialize_partial() {
        let config: ConnectionConfig =
            serde_json::from_str(r#"{"host": "xml-server", "database": "docs"}"#).unwrap();

        assert_eq!(config.host, "xml-server");
        assert_eq!(config.database, "docs");
        assert_eq!(config.username, "SYSTEM");
        assert_eq!(config.password, "MANAGER");
    }
}
