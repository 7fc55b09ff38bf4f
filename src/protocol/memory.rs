//! In-memory driver for testing.
//!
//! [`MemoryDriver`]는 네트워크 없이 [`Driver`] 트레이트를 구현합니다.
//! 스크립트된 쿼리 응답, 일회성 장애 주입, 호출 지연, 동시 실행 측정을
//! 지원하며 [`MemoryHandle`]로 호출 기록과 적재된 문서를 확인할 수 있습니다.
//!
//! 결과 아이템은 실제 서버와 같은 형태로 전달됩니다. 첫 번째를 제외한 모든
//! 아이템 앞에는 불필요한 줄바꿈 바이트 하나가 붙습니다.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use super::codes::{ConnectionAttribute, ConnectionStatus, ResultCode, TransactionStatus};
use super::Driver;

// ============================================================================
// DriverCall - 호출 기록
// ============================================================================

/// 드라이버 연산 종류
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// connect
    Connect,
    /// close
    Close,
    /// execute
    Execute,
    /// next
    Next,
    /// get_data
    GetData,
    /// begin
    Begin,
    /// commit
    Commit,
    /// rollback
    Rollback,
    /// set_attribute
    SetAttribute,
    /// load_data
    LoadData,
    /// end_load_data
    EndLoadData,
}

/// 기록된 드라이버 호출
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DriverCall {
    /// 연결
    Connect {
        /// 호스트
        host: String,
        /// 데이터베이스
        database: String,
        /// 사용자명
        username: String,
    },
    /// 닫기
    Close,
    /// 쿼리 실행
    Execute(String),
    /// 다음 아이템
    Next,
    /// 데이터 읽기
    GetData,
    /// 트랜잭션 시작
    Begin,
    /// 커밋
    Commit,
    /// 롤백
    Rollback,
    /// 속성 설정
    SetAttribute(ConnectionAttribute),
    /// 청크 적재
    LoadData {
        /// 문서 이름
        doc_name: String,
        /// 컬렉션 이름
        collection: Option<String>,
        /// 청크 길이
        len: usize,
    },
    /// 적재 종료
    EndLoadData,
}

impl DriverCall {
    /// 연산 종류
    pub fn operation(&self) -> Operation {
        match self {
            Self::Connect { .. } => Operation::Connect,
            Self::Close => Operation::Close,
            Self::Execute(_) => Operation::Execute,
            Self::Next => Operation::Next,
            Self::GetData => Operation::GetData,
            Self::Begin => Operation::Begin,
            Self::Commit => Operation::Commit,
            Self::Rollback => Operation::Rollback,
            Self::SetAttribute(_) => Operation::SetAttribute,
            Self::LoadData { .. } => Operation::LoadData,
            Self::EndLoadData => Operation::EndLoadData,
        }
    }
}

// ============================================================================
// ScriptedResponse - 스크립트된 응답
// ============================================================================

/// 쿼리에 대한 스크립트된 응답
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptedResponse {
    /// 결과 아이템 반환
    Items(Vec<Vec<u8>>),
    /// 갱신 성공
    Update,
    /// 벌크 로드 성공
    BulkLoad,
    /// 실행 실패
    Failure {
        /// 반환할 결과 코드
        code: ResultCode,
        /// 드라이버 에러 텍스트
        message: String,
    },
    /// 아이템을 반환한 뒤 스트림 중간에 실패
    FailAfter {
        /// 실패 전에 반환할 아이템
        items: Vec<Vec<u8>>,
        /// 드라이버 에러 텍스트
        message: String,
    },
}

impl ScriptedResponse {
    /// 문자열 아이템 응답 생성
    pub fn items<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Vec<u8>>,
    {
        Self::Items(items.into_iter().map(Into::into).collect())
    }

    /// 실패 응답 생성
    pub fn failure(code: ResultCode, message: impl Into<String>) -> Self {
        Self::Failure {
            code,
            message: message.into(),
        }
    }
}

// ============================================================================
// InFlightGauge - 동시 실행 측정
// ============================================================================

/// 동시에 진행 중인 `execute` 호출 수 측정기
///
/// 여러 드라이버가 하나의 게이지를 공유하면 세션 간 병렬성을 측정할 수 있습니다.
#[derive(Debug, Default)]
pub struct InFlightGauge {
    current: AtomicUsize,
    peak: AtomicUsize,
}

impl InFlightGauge {
    /// 새 게이지 생성
    pub fn new() -> Self {
        Self::default()
    }

    /// 공유 게이지 생성
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// 현재 진행 중인 호출 수
    pub fn current(&self) -> usize {
        self.current.load(Ordering::SeqCst)
    }

    /// 관측된 최대 동시 호출 수
    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    fn enter(&self) -> InFlightTicket<'_> {
        let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        InFlightTicket { gauge: self }
    }
}

struct InFlightTicket<'a> {
    gauge: &'a InFlightGauge,
}

impl Drop for InFlightTicket<'_> {
    fn drop(&mut self) {
        self.gauge.current.fetch_sub(1, Ordering::SeqCst);
    }
}

// ============================================================================
// MemoryState - 내부 상태
// ============================================================================

#[derive(Debug)]
struct PendingLoad {
    doc_name: String,
    collection: Option<String>,
    data: Vec<u8>,
}

#[derive(Debug)]
struct MemoryState {
    calls: Vec<DriverCall>,
    connection: ConnectionStatus,
    transaction: TransactionStatus,
    autocommit: bool,
    credentials: Option<(String, String)>,
    responses: HashMap<String, ScriptedResponse>,
    failures: HashMap<Operation, (ResultCode, String)>,
    pending: VecDeque<Vec<u8>>,
    trailing_error: Option<String>,
    current: Option<(Vec<u8>, usize)>,
    chunk_limit: usize,
    loading: Option<PendingLoad>,
    documents: HashMap<String, Vec<u8>>,
    last_error: String,
}

impl Default for MemoryState {
    fn default() -> Self {
        Self {
            calls: Vec::new(),
            connection: ConnectionStatus::Closed,
            transaction: TransactionStatus::NoTransaction,
            autocommit: true,
            credentials: None,
            responses: HashMap::new(),
            failures: HashMap::new(),
            pending: VecDeque::new(),
            trailing_error: None,
            current: None,
            chunk_limit: usize::MAX,
            loading: None,
            documents: HashMap::new(),
            last_error: String::new(),
        }
    }
}

impl MemoryState {
    fn record(&mut self, call: DriverCall) {
        self.calls.push(call);
    }

    /// 주입된 장애가 있으면 소비하고 코드 반환
    fn take_failure(&mut self, operation: Operation) -> Option<ResultCode> {
        self.failures.remove(&operation).map(|(code, message)| {
            self.last_error = message;
            code
        })
    }

    fn fail(&mut self, code: ResultCode, message: impl Into<String>) -> ResultCode {
        self.last_error = message.into();
        code
    }

    fn reset_results(&mut self) {
        self.pending.clear();
        self.trailing_error = None;
        self.current = None;
    }

    /// 서버 응답 형태로 아이템 적재 (첫 아이템 이후에는 줄바꿈 접두)
    fn stage_items(&mut self, items: Vec<Vec<u8>>) {
        for (index, item) in items.into_iter().enumerate() {
            if index == 0 {
                self.pending.push_back(item);
            } else {
                let mut framed = Vec::with_capacity(item.len() + 1);
                framed.push(b'\n');
                framed.extend_from_slice(&item);
                self.pending.push_back(framed);
            }
        }
    }
}

// ============================================================================
// MemoryHandle - 검사용 핸들
// ============================================================================

/// [`MemoryDriver`] 상태를 설정하고 확인하는 핸들
#[derive(Debug, Clone)]
pub struct MemoryHandle {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryHandle {
    /// 쿼리 응답 등록
    pub fn respond(&self, query: impl Into<String>, response: ScriptedResponse) {
        self.state.lock().responses.insert(query.into(), response);
    }

    /// 다음 `operation` 호출을 한 번 실패시킴
    pub fn fail_next(&self, operation: Operation, code: ResultCode, message: impl Into<String>) {
        self.state
            .lock()
            .failures
            .insert(operation, (code, message.into()));
    }

    /// 허용할 사용자명/비밀번호 설정
    pub fn require_credentials(&self, username: impl Into<String>, password: impl Into<String>) {
        self.state.lock().credentials = Some((username.into(), password.into()));
    }

    /// `get_data` 한 번에 반환할 최대 바이트 수
    pub fn set_chunk_limit(&self, limit: usize) {
        self.state.lock().chunk_limit = limit.max(1);
    }

    /// 서버 측에서 트랜잭션을 종료시킴
    pub fn end_transaction_remotely(&self) {
        self.state.lock().transaction = TransactionStatus::NoTransaction;
    }

    /// 서버 측에서 연결을 끊음
    pub fn drop_connection(&self) {
        self.state.lock().connection = ConnectionStatus::Failed;
    }

    /// 호출 기록
    pub fn calls(&self) -> Vec<DriverCall> {
        self.state.lock().calls.clone()
    }

    /// 특정 연산의 호출 횟수
    pub fn count(&self, operation: Operation) -> usize {
        self.state
            .lock()
            .calls
            .iter()
            .filter(|call| call.operation() == operation)
            .count()
    }

    /// 호출 기록 초기화
    pub fn clear_calls(&self) {
        self.state.lock().calls.clear();
    }

    /// 드라이버 측 연결 상태
    pub fn connection_status(&self) -> ConnectionStatus {
        self.state.lock().connection
    }

    /// 드라이버 측 트랜잭션 상태
    pub fn transaction_status(&self) -> TransactionStatus {
        self.state.lock().transaction
    }

    /// 드라이버 측 자동 커밋 상태
    pub fn autocommit(&self) -> bool {
        self.state.lock().autocommit
    }

    /// 적재된 문서 (`collection/doc` 또는 `doc`)
    pub fn document(&self, key: &str) -> Option<Vec<u8>> {
        self.state.lock().documents.get(key).cloned()
    }
}

// ============================================================================
// MemoryDriver - 인메모리 드라이버
// ============================================================================

/// 인메모리 드라이버
#[derive(Debug)]
pub struct MemoryDriver {
    state: Arc<Mutex<MemoryState>>,
    gauge: Arc<InFlightGauge>,
    latency: Duration,
}

impl Default for MemoryDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDriver {
    /// 새 드라이버 생성
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(MemoryState::default())),
            gauge: InFlightGauge::shared(),
            latency: Duration::ZERO,
        }
    }

    /// `execute` 호출 지연 설정
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// 동시 실행 게이지 설정
    pub fn with_gauge(mut self, gauge: Arc<InFlightGauge>) -> Self {
        self.gauge = gauge;
        self
    }

    /// 검사용 핸들
    pub fn handle(&self) -> MemoryHandle {
        MemoryHandle {
            state: Arc::clone(&self.state),
        }
    }

    /// 동시 실행 게이지
    pub fn gauge(&self) -> Arc<InFlightGauge> {
        Arc::clone(&self.gauge)
    }
}

impl Driver for MemoryDriver {
    fn connect(&mut self, host: &str, database: &str, username: &str, password: &str) -> ResultCode {
        let mut state = self.state.lock();
        state.record(DriverCall::Connect {
            host: host.to_string(),
            database: database.to_string(),
            username: username.to_string(),
        });

        if let Some(code) = state.take_failure(Operation::Connect) {
            state.connection = ConnectionStatus::Closed;
            return code;
        }

        let rejected = match &state.credentials {
            Some((user, pass)) => user != username || pass != password,
            None => false,
        };
        if rejected {
            state.connection = ConnectionStatus::Closed;
            return state.fail(
                ResultCode::AuthenticationFailed,
                "SEDNA Message: ERROR SE3053\nAuthentication failed.\n",
            );
        }

        state.connection = ConnectionStatus::Ok;
        state.transaction = TransactionStatus::NoTransaction;
        state.autocommit = true;
        ResultCode::SessionOpen
    }

    fn close(&mut self) -> ResultCode {
        let mut state = self.state.lock();
        state.record(DriverCall::Close);

        if let Some(code) = state.take_failure(Operation::Close) {
            return code;
        }

        state.connection = ConnectionStatus::Closed;
        state.transaction = TransactionStatus::NoTransaction;
        state.reset_results();
        ResultCode::SessionClosed
    }

    fn connection_status(&self) -> ConnectionStatus {
        self.state.lock().connection
    }

    fn execute(&mut self, query: &str) -> ResultCode {
        let _ticket = self.gauge.enter();
        if !self.latency.is_zero() {
            std::thread::sleep(self.latency);
        }

        let mut state = self.state.lock();
        state.record(DriverCall::Execute(query.to_string()));
        state.reset_results();

        if let Some(code) = state.take_failure(Operation::Execute) {
            return code;
        }

        match state.responses.get(query).cloned() {
            Some(ScriptedResponse::Items(items)) => {
                state.stage_items(items);
                ResultCode::QuerySucceeded
            }
            Some(ScriptedResponse::FailAfter { items, message }) => {
                state.stage_items(items);
                state.trailing_error = Some(message);
                ResultCode::QuerySucceeded
            }
            Some(ScriptedResponse::Failure { code, message }) => state.fail(code, message),
            Some(ScriptedResponse::BulkLoad) => ResultCode::BulkLoadSucceeded,
            Some(ScriptedResponse::Update) | None => ResultCode::UpdateSucceeded,
        }
    }

    fn next(&mut self) -> ResultCode {
        let mut state = self.state.lock();
        state.record(DriverCall::Next);

        if let Some(code) = state.take_failure(Operation::Next) {
            return code;
        }

        match state.pending.pop_front() {
            Some(item) => {
                state.current = Some((item, 0));
                ResultCode::NextItemSucceeded
            }
            None => {
                state.current = None;
                match state.trailing_error.take() {
                    Some(message) => state.fail(ResultCode::Error, message),
                    None => ResultCode::ResultEnd,
                }
            }
        }
    }

    fn get_data(&mut self, buf: &mut [u8]) -> Result<usize, ResultCode> {
        let mut state = self.state.lock();
        state.record(DriverCall::GetData);

        if let Some(code) = state.take_failure(Operation::GetData) {
            return Err(code);
        }

        let limit = state.chunk_limit;
        match state.current.as_mut() {
            Some((item, offset)) => {
                let n = (item.len() - *offset).min(buf.len()).min(limit);
                buf[..n].copy_from_slice(&item[*offset..*offset + n]);
                *offset += n;
                Ok(n)
            }
            None => Ok(0),
        }
    }

    fn transaction_status(&self) -> TransactionStatus {
        self.state.lock().transaction
    }

    fn begin(&mut self) -> ResultCode {
        let mut state = self.state.lock();
        state.record(DriverCall::Begin);

        if let Some(code) = state.take_failure(Operation::Begin) {
            return code;
        }
        if state.transaction.is_active() {
            return state.fail(
                ResultCode::BeginTransactionFailed,
                "SEDNA Message: ERROR SE4611\nThere is an active transaction.\n",
            );
        }

        state.transaction = TransactionStatus::Active;
        ResultCode::BeginTransactionSucceeded
    }

    fn commit(&mut self) -> ResultCode {
        let mut state = self.state.lock();
        state.record(DriverCall::Commit);

        if let Some(code) = state.take_failure(Operation::Commit) {
            state.transaction = TransactionStatus::NoTransaction;
            return code;
        }
        if !state.transaction.is_active() {
            return state.fail(
                ResultCode::CommitTransactionFailed,
                "SEDNA Message: ERROR SE4612\nThere is no active transaction.\n",
            );
        }

        state.transaction = TransactionStatus::NoTransaction;
        ResultCode::CommitTransactionSucceeded
    }

    fn rollback(&mut self) -> ResultCode {
        let mut state = self.state.lock();
        state.record(DriverCall::Rollback);

        if let Some(code) = state.take_failure(Operation::Rollback) {
            return code;
        }
        if !state.transaction.is_active() {
            return state.fail(
                ResultCode::RollbackTransactionFailed,
                "SEDNA Message: ERROR SE4612\nThere is no active transaction.\n",
            );
        }

        state.transaction = TransactionStatus::NoTransaction;
        ResultCode::RollbackTransactionSucceeded
    }

    fn set_attribute(&mut self, attribute: ConnectionAttribute) -> ResultCode {
        let mut state = self.state.lock();
        state.record(DriverCall::SetAttribute(attribute));

        if let Some(code) = state.take_failure(Operation::SetAttribute) {
            return code;
        }

        match attribute {
            ConnectionAttribute::Autocommit(on) => state.autocommit = on,
        }
        ResultCode::SetAttributeSucceeded
    }

    fn load_data(&mut self, chunk: &[u8], doc_name: &str, collection: Option<&str>) -> ResultCode {
        let mut state = self.state.lock();
        state.record(DriverCall::LoadData {
            doc_name: doc_name.to_string(),
            collection: collection.map(str::to_string),
            len: chunk.len(),
        });

        if let Some(code) = state.take_failure(Operation::LoadData) {
            state.loading = None;
            return code;
        }

        let load = state.loading.get_or_insert_with(|| PendingLoad {
            doc_name: doc_name.to_string(),
            collection: collection.map(str::to_string),
            data: Vec::new(),
        });
        load.data.extend_from_slice(chunk);
        ResultCode::DataChunkLoaded
    }

    fn end_load_data(&mut self) -> ResultCode {
        let mut state = self.state.lock();
        state.record(DriverCall::EndLoadData);

        if let Some(code) = state.take_failure(Operation::EndLoadData) {
            state.loading = None;
            return code;
        }

        match state.loading.take() {
            Some(load) => {
                let key = match &load.collection {
                    Some(collection) => format!("{}/{}", collection, load.doc_name),
                    None => load.doc_name.clone(),
                };
                state.documents.insert(key, load.data);
                ResultCode::BulkLoadSucceeded
            }
            None => state.fail(
                ResultCode::BulkLoadFailed,
                "SEDNA Message: ERROR SE2004\nNo data was loaded.\n",
            ),
        }
    }

    fn last_error_message(&self) -> String {
        self.state.lock().last_error.clone()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn connected() -> (MemoryDriver, MemoryHandle) {
        let mut driver = MemoryDriver::new();
        let handle = driver.handle();
        assert_eq!(driver.connect("localhost", "test", "SYSTEM", "MANAGER"), ResultCode::SessionOpen);
        (driver, handle)
    }

    #[test]
    fn test_items_are_framed_like_the_server() {
        let (mut driver, handle) = connected();
        handle.respond("q", ScriptedResponse::items(["a", "b"]));

        assert_eq!(driver.execute("q"), ResultCode::QuerySucceeded);

        let mut buf = [0u8; 16];
        assert_eq!(driver.next(), ResultCode::NextItemSucceeded);
        assert_eq!(driver.get_data(&mut buf), Ok(1));
        assert_eq!(&buf[..1], b"a");
        assert_eq!(driver.get_data(&mut buf), Ok(0));

        assert_eq!(driver.next(), ResultCode::NextItemSucceeded);
        assert_eq!(driver.get_data(&mut buf), Ok(2));
        assert_eq!(&buf[..2], b"\nb");

        assert_eq!(driver.next(), ResultCode::ResultEnd);
    }

    #[test]
    fn test_unscripted_query_is_an_update() {
        let (mut driver, _handle) = connected();
        assert_eq!(driver.execute("update insert <a/> into doc('x')"), ResultCode::UpdateSucceeded);
    }

    #[test]
    fn test_fail_next_is_one_shot() {
        let (mut driver, handle) = connected();
        handle.fail_next(Operation::Execute, ResultCode::Error, "H\nboom\n");

        assert_eq!(driver.execute("q"), ResultCode::Error);
        assert_eq!(driver.last_error_message(), "H\nboom\n");
        assert_eq!(driver.execute("q"), ResultCode::UpdateSucceeded);
    }

    #[test]
    fn test_credentials() {
        let mut driver = MemoryDriver::new();
        driver.handle().require_credentials("admin", "secret");

        assert_eq!(
            driver.connect("localhost", "test", "admin", "wrong"),
            ResultCode::AuthenticationFailed
        );
        assert_eq!(driver.connection_status(), ConnectionStatus::Closed);
        assert_eq!(driver.connect("localhost", "test", "admin", "secret"), ResultCode::SessionOpen);
        assert_eq!(driver.connection_status(), ConnectionStatus::Ok);
    }

    #[test]
    fn test_transactions() {
        let (mut driver, _handle) = connected();

        assert_eq!(driver.commit(), ResultCode::CommitTransactionFailed);
        assert_eq!(driver.begin(), ResultCode::BeginTransactionSucceeded);
        assert_eq!(driver.begin(), ResultCode::BeginTransactionFailed);
        assert_eq!(driver.transaction_status(), TransactionStatus::Active);
        assert_eq!(driver.rollback(), ResultCode::RollbackTransactionSucceeded);
        assert_eq!(driver.transaction_status(), TransactionStatus::NoTransaction);
    }

    #[test]
    fn test_bulk_load() {
        let (mut driver, handle) = connected();

        assert_eq!(driver.load_data(b"<a>", "doc", Some("col")), ResultCode::DataChunkLoaded);
        assert_eq!(driver.load_data(b"</a>", "doc", Some("col")), ResultCode::DataChunkLoaded);
        assert_eq!(driver.end_load_data(), ResultCode::BulkLoadSucceeded);

        assert_eq!(handle.document("col/doc"), Some(b"<a></a>".to_vec()));
        assert_eq!(driver.end_load_data(), ResultCode::BulkLoadFailed);
    }

    #[test]
    fn test_gauge() {
        let gauge = InFlightGauge::new();
        {
            let _a = gauge.enter();
            let _b = gauge.enter();
            assert_eq!(gauge.current(), 2);
        }
        assert_eq!(gauge.current(), 0);
        assert_eq!(gauge.peak(), 2);
    }
}
