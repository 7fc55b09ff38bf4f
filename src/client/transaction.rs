//! Transaction control
//!
//! 명시적 트랜잭션 (begin/commit/rollback) 및 범위 트랜잭션

use crate::protocol::{ResultCode, TransactionStatus};

use super::error::{verify, SednaError, SednaResult};
use super::session::{Session, SessionInner};

/// 본문은 성공했지만 서버 측 트랜잭션이 이미 끝난 경우의 메시지
const PREMATURE_END: &str = "The transaction was prematurely ended, but no error was encountered.";

impl SessionInner {
    fn transaction_status(&self) -> TransactionStatus {
        self.driver.transaction_status()
    }

    fn begin(&mut self) -> SednaResult<()> {
        self.ensure_connected()?;
        if self.transaction_status().is_active() {
            return Err(SednaError::transaction("A transaction is already in progress."));
        }

        self.apply_autocommit(false)?;
        let code = self.driver.begin();
        verify(ResultCode::BeginTransactionSucceeded, code, || self.last_error())?;
        tracing::debug!(database = %self.config.database, "transaction started");
        Ok(())
    }

    /// 커밋 (트랜잭션이 없으면 `missing` 메시지로 실패)
    fn commit(&mut self, missing: &str) -> SednaResult<()> {
        self.ensure_connected()?;
        self.with_autocommit_restored(|inner| {
            if !inner.transaction_status().is_active() {
                return Err(SednaError::transaction(missing));
            }
            let code = inner.driver.commit();
            verify(ResultCode::CommitTransactionSucceeded, code, || inner.last_error())?;
            tracing::debug!(database = %inner.config.database, "transaction committed");
            Ok(())
        })
    }

    fn rollback(&mut self) -> SednaResult<()> {
        if self.ensure_connected().is_err() {
            return Ok(());
        }
        self.with_autocommit_restored(|inner| {
            if !inner.transaction_status().is_active() {
                return Ok(());
            }
            let code = inner.driver.rollback();
            verify(ResultCode::RollbackTransactionSucceeded, code, || inner.last_error())?;
            tracing::debug!(database = %inner.config.database, "transaction rolled back");
            Ok(())
        })
    }

    /// `op` 실행 후 결과와 무관하게 자동 커밋 설정 복원
    ///
    /// `op`의 에러가 우선하며, 복원 에러는 `op`가 성공한 경우에만 반환됩니다.
    fn with_autocommit_restored<T>(
        &mut self,
        op: impl FnOnce(&mut Self) -> SednaResult<T>,
    ) -> SednaResult<T> {
        let outcome = op(self);
        let restored = self.restore_autocommit();

        match (outcome, restored) {
            (Ok(value), Ok(())) => Ok(value),
            (Ok(_), Err(e)) => Err(e),
            (Err(e), Ok(())) => Err(e),
            (Err(e), Err(restore_err)) => {
                tracing::warn!(error = %restore_err, "failed to restore autocommit");
                Err(e)
            }
        }
    }
}

impl Session {
    /// 현재 트랜잭션 상태 (드라이버 기준)
    pub fn transaction_status(&self) -> TransactionStatus {
        self.lock().transaction_status()
    }

    /// 트랜잭션 시작
    ///
    /// 자동 커밋을 끄고 트랜잭션을 엽니다. 이미 트랜잭션이 진행 중이면
    /// [`SednaError::Transaction`]을 반환하며 기존 트랜잭션은 그대로 유지됩니다.
    pub fn begin(&self) -> SednaResult<()> {
        self.lock().begin()
    }

    /// 트랜잭션 커밋
    ///
    /// 진행 중인 트랜잭션이 없으면 [`SednaError::Transaction`]을 반환합니다.
    pub fn commit(&self) -> SednaResult<()> {
        self.lock().commit("No transaction in progress.")
    }

    /// 트랜잭션 롤백
    ///
    /// 진행 중인 트랜잭션이 없으면 아무 것도 하지 않습니다.
    pub fn rollback(&self) -> SednaResult<()> {
        self.lock().rollback()
    }

    /// 범위 트랜잭션
    ///
    /// 트랜잭션을 시작하고 `work`를 실행합니다. `work`가 성공하면 커밋하고,
    /// 에러를 반환하거나 패닉하면 롤백합니다. `work`의 에러는 변경 없이
    /// 그대로 반환됩니다.
    ///
    /// `work`가 성공했지만 서버 측 트랜잭션이 이미 끝났다면
    /// [`SednaError::Transaction`]을 반환합니다.
    ///
    /// # Example
    ///
    /// ```rust
    /// use sedna_client::{ConnectionConfig, MemoryDriver, SednaError, Session};
    ///
    /// let session = Session::connect(ConnectionConfig::default(), MemoryDriver::new())?;
    /// session.transaction(|tx| {
    ///     tx.execute("update insert <item/> into doc('inventory')/items")?;
    ///     Ok::<_, SednaError>(())
    /// })?;
    /// # Ok::<(), SednaError>(())
    /// ```
    pub fn transaction<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce(&Session) -> Result<T, E>,
        E: From<SednaError>,
    {
        self.begin()?;

        let mut scope = TransactionScope {
            session: self,
            armed: true,
        };
        let value = work(self)?;
        scope.armed = false;

        self.lock().commit(PREMATURE_END)?;
        Ok(value)
    }
}

/// 범위 트랜잭션 정리 가드
///
/// 본문이 에러를 반환하거나 패닉하면 드롭 시 롤백합니다.
struct TransactionScope<'a> {
    session: &'a Session,
    armed: bool,
}

impl Drop for TransactionScope<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        if let Err(e) = self.session.rollback() {
            tracing::warn!(error = %e, "rollback after failed transaction body failed");
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use std::panic::{self, AssertUnwindSafe};

    use super::*;
    use crate::client::config::ConnectionConfig;
    use crate::protocol::{DriverCall, MemoryDriver, MemoryHandle, Operation};

    fn open_session() -> (Session, MemoryHandle) {
        let driver = MemoryDriver::new();
        let handle = driver.handle();
        let session = Session::connect(ConnectionConfig::default(), driver).unwrap();
        handle.clear_calls();
        (session, handle)
    }

    #[derive(Debug)]
    enum AppError {
        Db(SednaError),
        Rejected(u32),
    }

    impl From<SednaError> for AppError {
        fn from(e: SednaError) -> Self {
            AppError::Db(e)
        }
    }

    #[test]
    fn test_begin_commit() {
        let (session, handle) = open_session();

        session.begin().unwrap();
        assert_eq!(session.transaction_status(), TransactionStatus::Active);
        assert!(!handle.autocommit());

        session.commit().unwrap();
        assert_eq!(session.transaction_status(), TransactionStatus::NoTransaction);
        assert!(handle.autocommit());

        assert_eq!(
            handle.calls(),
            vec![
                DriverCall::SetAttribute(crate::protocol::ConnectionAttribute::Autocommit(false)),
                DriverCall::Begin,
                DriverCall::Commit,
                DriverCall::SetAttribute(crate::protocol::ConnectionAttribute::Autocommit(true)),
            ]
        );
    }

    #[test]
    fn test_begin_rollback() {
        let (session, handle) = open_session();

        session.begin().unwrap();
        session.rollback().unwrap();

        assert_eq!(handle.transaction_status(), TransactionStatus::NoTransaction);
        assert_eq!(handle.count(Operation::Rollback), 1);
        assert!(handle.autocommit());
    }

    #[test]
    fn test_nested_begin_is_rejected() {
        let (session, handle) = open_session();
        session.begin().unwrap();

        let err = session.begin().unwrap_err();
        assert!(err.is_transaction_error());
        assert_eq!(handle.count(Operation::Begin), 1);

        // 기존 트랜잭션은 유지됨
        assert_eq!(session.transaction_status(), TransactionStatus::Active);
        session.commit().unwrap();
    }

    #[test]
    fn test_commit_without_transaction() {
        let (session, handle) = open_session();

        let err = session.commit().unwrap_err();
        assert!(matches!(err, SednaError::Transaction(_)));
        assert_eq!(err.message(), "No transaction in progress.");
        assert_eq!(handle.count(Operation::Commit), 0);
        assert!(handle.autocommit());
    }

    #[test]
    fn test_rollback_without_transaction_is_noop() {
        let (session, handle) = open_session();

        session.rollback().unwrap();
        assert_eq!(handle.count(Operation::Rollback), 0);
        assert!(handle.autocommit());
    }

    #[test]
    fn test_rollback_on_closed_session_is_noop() {
        let (session, handle) = open_session();
        session.close().unwrap();
        handle.clear_calls();

        session.rollback().unwrap();
        assert!(handle.calls().is_empty());
    }

    #[test]
    fn test_begin_on_closed_session() {
        let (session, handle) = open_session();
        session.close().unwrap();
        handle.clear_calls();

        assert!(session.begin().unwrap_err().is_connection_error());
        assert!(handle.calls().is_empty());
    }

    #[test]
    fn test_commit_failure_restores_autocommit() {
        let (session, handle) = open_session();
        session.begin().unwrap();
        handle.fail_next(
            Operation::Commit,
            ResultCode::CommitTransactionFailed,
            "SEDNA Message: ERROR SE4600\nCommit failed.\nDetails: lock conflict\n",
        );

        let err = session.commit().unwrap_err();
        assert!(err.is_transaction_error());
        assert_eq!(err.to_string(), "Commit failed. (lock conflict)");
        assert!(handle.autocommit());
    }

    #[test]
    fn test_restore_failure_after_successful_commit() {
        let (session, handle) = open_session();
        session.begin().unwrap();
        handle.fail_next(Operation::SetAttribute, ResultCode::Error, "H\nattribute rejected\n");

        let err = session.commit().unwrap_err();
        assert_eq!(err.message(), "attribute rejected");
        assert_eq!(handle.transaction_status(), TransactionStatus::NoTransaction);
    }

    #[test]
    fn test_autocommit_preference_restored() {
        let (session, handle) = open_session();
        session.set_autocommit(false).unwrap();

        session.begin().unwrap();
        session.commit().unwrap();
        assert!(!handle.autocommit());
        assert!(!session.autocommit());
    }

    #[test]
    fn test_scoped_transaction_commits() {
        let (session, handle) = open_session();

        let value = session
            .transaction(|tx| {
                assert_eq!(tx.transaction_status(), TransactionStatus::Active);
                tx.execute("update insert <a/> into doc('d')")?;
                Ok::<_, SednaError>(42)
            })
            .unwrap();

        assert_eq!(value, 42);
        assert_eq!(handle.count(Operation::Commit), 1);
        assert_eq!(handle.count(Operation::Rollback), 0);
        assert!(handle.autocommit());
    }

    #[test]
    fn test_scoped_transaction_rolls_back_on_error() {
        let (session, handle) = open_session();

        let err = session
            .transaction(|_| Err::<(), _>(AppError::Rejected(7)))
            .unwrap_err();

        assert!(matches!(err, AppError::Rejected(7)));
        assert_eq!(handle.count(Operation::Rollback), 1);
        assert_eq!(handle.count(Operation::Commit), 0);
        assert_eq!(handle.transaction_status(), TransactionStatus::NoTransaction);
        assert!(handle.autocommit());
    }

    #[test]
    fn test_scoped_transaction_keeps_error_when_rollback_fails() {
        let (session, handle) = open_session();
        handle.fail_next(
            Operation::Rollback,
            ResultCode::RollbackTransactionFailed,
            "H\nrollback failed\n",
        );

        let err = session
            .transaction(|_| Err::<(), _>(AppError::Rejected(1)))
            .unwrap_err();

        assert!(matches!(err, AppError::Rejected(1)));
        assert!(handle.autocommit());
    }

    #[test]
    fn test_scoped_transaction_rolls_back_on_panic() {
        let (session, handle) = open_session();

        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            let _ = session.transaction(|_| -> Result<(), SednaError> { panic!("body panicked") });
        }));

        assert!(result.is_err());
        assert_eq!(handle.count(Operation::Rollback), 1);
        assert_eq!(handle.transaction_status(), TransactionStatus::NoTransaction);
        assert!(handle.autocommit());

        // 세션은 계속 사용 가능
        session.begin().unwrap();
        session.commit().unwrap();
    }

    #[test]
    fn test_nested_scoped_transaction_is_rejected() {
        let (session, handle) = open_session();

        let err = session
            .transaction(|tx| {
                tx.transaction(|_| Ok::<_, SednaError>(()))?;
                Ok::<_, AppError>(())
            })
            .unwrap_err();

        assert!(matches!(err, AppError::Db(SednaError::Transaction(_))));
        assert_eq!(handle.count(Operation::Begin), 1);
        assert_eq!(handle.count(Operation::Rollback), 1);
        assert_eq!(handle.count(Operation::Commit), 0);
        assert_eq!(handle.transaction_status(), TransactionStatus::NoTransaction);
        assert!(handle.autocommit());
    }

    #[test]
    fn test_scoped_transaction_premature_end() {
        let (session, handle) = open_session();
        let remote = handle.clone();

        let err = session
            .transaction(|_| {
                remote.end_transaction_remotely();
                Ok::<_, AppError>(())
            })
            .unwrap_err();

        match err {
            AppError::Db(e) => {
                assert!(e.is_transaction_error());
                assert_eq!(e.message(), PREMATURE_END);
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(handle.count(Operation::Commit), 0);
        assert_eq!(handle.count(Operation::Rollback), 0);
        assert!(handle.autocommit());
    }

    #[test]
    fn test_scoped_transaction_begin_failure() {
        let (session, handle) = open_session();
        handle.fail_next(
            Operation::Begin,
            ResultCode::BeginTransactionFailed,
            "H\ncannot begin\n",
        );

        let err = session
            .transaction(|_| Ok::<_, AppError>(()))
            .unwrap_err();

        assert!(matches!(err, AppError::Db(SednaError::Transaction(_))));
        assert_eq!(handle.count(Operation::Rollback), 0);
    }

    #[test]
    fn test_scoped_transaction_commit_failure() {
        let (session, handle) = open_session();
        handle.fail_next(
            Operation::Commit,
            ResultCode::CommitTransactionFailed,
            "H\ncommit rejected\n",
        );

        let err = session
            .transaction(|_| Ok::<_, SednaError>(()))
            .unwrap_err();

        assert!(err.is_transaction_error());
        assert_eq!(err.message(), "commit rejected");
        assert_eq!(handle.count(Operation::Rollback), 0);
        assert!(handle.autocommit());
    }
}
