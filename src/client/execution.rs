//! Query execution
//!
//! 블로킹 실행과 백그라운드(tokio blocking pool) 실행

use crate::protocol::ResultCode;

use super::error::{SednaError, SednaResult};
use super::result::{drain, ResultSet};
use super::session::{Session, SessionInner};

impl SessionInner {
    pub(super) fn execute(&mut self, query: &str) -> SednaResult<Option<ResultSet>> {
        self.ensure_connected()?;

        tracing::debug!(database = %self.config.database, query_len = query.len(), "execute");
        match self.driver.execute(query) {
            ResultCode::QuerySucceeded => drain(&mut *self.driver).map(Some).map_err(|e| {
                self.refresh_status();
                e
            }),
            ResultCode::UpdateSucceeded | ResultCode::BulkLoadSucceeded => Ok(None),
            code => {
                let err = SednaError::classify(code, &self.last_error());
                self.refresh_status();
                Err(err)
            }
        }
    }
}

impl Session {
    /// 쿼리 실행 (블로킹)
    ///
    /// 조회 쿼리는 모든 결과 아이템을 읽어 `Some(ResultSet)`을, 갱신이나 벌크
    /// 로드 문은 `None`을 반환합니다. 같은 세션의 다른 호출이 진행 중이면
    /// 끝날 때까지 기다립니다.
    ///
    /// 세션이 닫혀 있으면 드라이버를 호출하지 않고 [`SednaError::Connection`]을
    /// 반환합니다.
    pub fn execute(&self, query: &str) -> SednaResult<Option<ResultSet>> {
        self.lock().execute(query)
    }

    /// 쿼리 실행 (비동기)
    ///
    /// 드라이버 호출은 tokio의 블로킹 스레드 풀에서 실행되므로 호출한 태스크와
    /// 런타임 워커는 막히지 않습니다. 세션 가드는 백그라운드 작업 안에서 잡힙니다.
    pub async fn execute_async(&self, query: impl Into<String>) -> SednaResult<Option<ResultSet>> {
        let query = query.into();
        self.run_background(move |inner| inner.execute(&query)).await
    }

    /// 세션 가드를 잡은 상태로 `work`를 블로킹 스레드 풀에서 실행
    pub(super) async fn run_background<T, F>(&self, work: F) -> SednaResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut SessionInner) -> SednaResult<T> + Send + 'static,
    {
        let inner = self.shared_inner();
        let task = tokio::task::spawn_blocking(move || {
            let mut guard = inner.lock();
            work(&mut guard)
        });

        match task.await {
            Ok(result) => result,
            Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
            Err(e) => Err(SednaError::generic(format!("Background task failed: {}", e))),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
