//! Session Management
//!
//! 세션 수명 주기 (연결, 닫기, 재연결, 정리)

use std::fmt;
use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};

use crate::protocol::{ConnectionAttribute, Driver, ResultCode};

use super::config::ConnectionConfig;
use super::error::{verify, SednaError, SednaResult};

// ============================================================================
// SessionStatus - 세션 상태
// ============================================================================

/// 클라이언트 측 세션 상태
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionStatus {
    /// 연결됨
    Connected,
    /// 닫힘
    #[default]
    Closed,
}

// ============================================================================
// SessionInner - 가드로 보호되는 상태
// ============================================================================

/// 세션 가드 안쪽의 가변 상태
///
/// 드라이버 핸들, 연결 상태, 자동 커밋 설정은 가드를 잡은 상태에서만 변경됩니다.
pub(crate) struct SessionInner {
    pub(super) driver: Box<dyn Driver>,
    pub(super) config: ConnectionConfig,
    pub(super) status: SessionStatus,
    pub(super) autocommit: bool,
}

impl SessionInner {
    fn new(driver: Box<dyn Driver>, config: ConnectionConfig) -> Self {
        Self {
            driver,
            config,
            status: SessionStatus::Closed,
            autocommit: true,
        }
    }

    /// 드라이버 마지막 에러 텍스트
    pub(super) fn last_error(&self) -> String {
        self.driver.last_error_message()
    }

    /// 세션 열기
    fn open(&mut self) -> SednaResult<()> {
        let code = self.driver.connect(
            &self.config.host,
            &self.config.database,
            &self.config.username,
            &self.config.password,
        );

        if code != ResultCode::SessionOpen {
            // 드라이버가 이미 소켓을 정리했으므로 이후 close를 시도하지 않음
            self.status = SessionStatus::Closed;
            let err = SednaError::classify(code, &self.last_error());
            tracing::debug!(
                host = %self.config.host,
                database = %self.config.database,
                error = %err,
                "connect failed"
            );
            return Err(err);
        }

        self.status = SessionStatus::Connected;
        tracing::debug!(host = %self.config.host, database = %self.config.database, "session open");
        Ok(())
    }

    /// 세션 닫기 (이미 닫혀 있으면 아무 것도 하지 않음)
    pub(super) fn close(&mut self) -> SednaResult<()> {
        if self.status == SessionStatus::Closed {
            return Ok(());
        }

        // 결과와 무관하게 핸들은 한 번만 닫음
        self.status = SessionStatus::Closed;
        let code = self.driver.close();
        tracing::debug!(host = %self.config.host, database = %self.config.database, "session closed");
        verify(ResultCode::SessionClosed, code, || self.last_error())
    }

    /// 연결 상태 확인
    pub(super) fn ensure_connected(&self) -> SednaResult<()> {
        match self.status {
            SessionStatus::Connected => Ok(()),
            SessionStatus::Closed => Err(SednaError::connection("Connection is closed.")),
        }
    }

    /// 드라이버가 연결 종료를 보고하면 세션도 닫힘으로 표시
    pub(super) fn refresh_status(&mut self) {
        if self.status == SessionStatus::Connected
            && self.driver.connection_status() != crate::protocol::ConnectionStatus::Ok
        {
            tracing::warn!(
                host = %self.config.host,
                database = %self.config.database,
                "driver reports connection lost"
            );
            self.status = SessionStatus::Closed;
        }
    }

    /// 드라이버 자동 커밋 설정
    pub(super) fn apply_autocommit(&mut self, on: bool) -> SednaResult<()> {
        let code = self.driver.set_attribute(ConnectionAttribute::Autocommit(on));
        verify(ResultCode::SetAttributeSucceeded, code, || self.last_error())
    }

    /// 저장된 자동 커밋 설정으로 복원
    pub(super) fn restore_autocommit(&mut self) -> SednaResult<()> {
        self.apply_autocommit(self.autocommit)
    }
}

impl Drop for SessionInner {
    fn drop(&mut self) {
        if self.status != SessionStatus::Closed {
            if let Err(e) = self.close() {
                tracing::warn!(
                    host = %self.config.host,
                    database = %self.config.database,
                    error = %e,
                    "failed to close session on drop"
                );
            }
        }
    }
}

// ============================================================================
// Session - 세션
// ============================================================================

/// Sedna 데이터베이스 세션
///
/// 하나의 논리적 연결을 나타냅니다. 모든 드라이버 호출은 세션마다 하나씩 있는
/// 가드를 잡은 상태로 이루어지므로 `Arc<Session>`을 여러 스레드에서 공유할 수
/// 있습니다. 서로 다른 세션은 서로를 기다리지 않습니다.
///
/// 세션이 드롭될 때 아직 열려 있으면 연결을 닫습니다.
pub struct Session {
    inner: Arc<Mutex<SessionInner>>,
    config: ConnectionConfig,
}

impl Session {
    /// 새 세션 연결
    ///
    /// 서버에 연결할 수 없으면 [`SednaError::Connection`], 인증에 실패하면
    /// [`SednaError::Authentication`]을 반환합니다.
    pub fn connect<D>(config: ConnectionConfig, driver: D) -> SednaResult<Self>
    where
        D: Driver + 'static,
    {
        let mut inner = SessionInner::new(Box::new(driver), config.clone());
        inner.open()?;

        Ok(Self {
            inner: Arc::new(Mutex::new(inner)),
            config,
        })
    }

    /// 연결 후 `work`를 실행하고 항상 연결을 닫음
    ///
    /// `work`의 에러는 그대로 전달됩니다. 닫기 에러는 `work`가 성공한 경우에만
    /// 반환됩니다.
    pub fn with_connection<D, F, T, E>(config: ConnectionConfig, driver: D, work: F) -> Result<T, E>
    where
        D: Driver + 'static,
        F: FnOnce(&Session) -> Result<T, E>,
        E: From<SednaError>,
    {
        let session = Self::connect(config, driver)?;
        let outcome = work(&session);
        let closed = session.close();

        match (outcome, closed) {
            (Ok(value), Ok(())) => Ok(value),
            (Ok(_), Err(e)) => Err(e.into()),
            (Err(e), closed) => {
                if let Err(close_err) = closed {
                    tracing::warn!(error = %close_err, "failed to close session after error");
                }
                Err(e)
            }
        }
    }

    /// 세션 닫기
    ///
    /// 이미 닫혀 있으면 드라이버를 호출하지 않습니다.
    pub fn close(&self) -> SednaResult<()> {
        self.lock().close()
    }

    /// 연결을 닫고 같은 설정으로 다시 연결
    pub fn reset(&self) -> SednaResult<()> {
        let mut inner = self.lock();
        if let Err(e) = inner.close() {
            tracing::warn!(error = %e, "close failed during reset, reconnecting anyway");
        }

        inner.open()?;
        if !inner.autocommit {
            inner.apply_autocommit(false)?;
        }
        Ok(())
    }

    /// 연결 여부 (클라이언트 측 상태만 확인)
    pub fn is_connected(&self) -> bool {
        self.status() == SessionStatus::Connected
    }

    /// 세션 상태
    pub fn status(&self) -> SessionStatus {
        self.lock().status
    }

    /// 자동 커밋 설정
    pub fn autocommit(&self) -> bool {
        self.lock().autocommit
    }

    /// 자동 커밋 켜기/끄기
    ///
    /// 드라이버에 적용한 뒤 설정을 저장합니다. 커밋과 롤백 후에는 항상 이 값으로
    /// 복원됩니다.
    pub fn set_autocommit(&self, on: bool) -> SednaResult<()> {
        let mut inner = self.lock();
        inner.ensure_connected()?;
        inner.apply_autocommit(on)?;
        inner.autocommit = on;
        Ok(())
    }

    /// 연결 설정
    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    /// 세션 가드 잡기
    pub(super) fn lock(&self) -> MutexGuard<'_, SessionInner> {
        self.inner.lock()
    }

    /// 가드를 공유하는 핸들 (백그라운드 실행용)
    pub(super) fn shared_inner(&self) -> Arc<Mutex<SessionInner>> {
        Arc::clone(&self.inner)
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("host", &self.config.host)
            .field("database", &self.config.database)
            .field("status", &self.status())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
