//! Driver collaborator
//!
//! 세션 계층이 사용하는 저수준 드라이버 인터페이스입니다.
//! 실제 소켓 I/O와 와이어 프로토콜은 이 트레이트의 구현체가 담당합니다.
//!
//! # Architecture
//!
//! ```text
//! Session
//!   └── Mutex<SessionInner>
//!         └── Box<dyn Driver>   (소켓, 프로토콜, 직렬화)
//! ```
//!
//! 모든 메서드는 블로킹 호출입니다. 세션은 호출마다 자신의 가드를 잡은 상태로
//! 드라이버를 호출하므로 구현체는 동시 호출을 고려할 필요가 없습니다.

pub mod codes;
pub mod memory;

pub use codes::{ConnectionAttribute, ConnectionStatus, ResultCode, TransactionStatus};
pub use memory::{DriverCall, InFlightGauge, MemoryDriver, MemoryHandle, Operation, ScriptedResponse};

/// 결과 레코드 읽기 버퍼 크기
pub const RESULT_BUF_LEN: usize = 8192;

/// 벌크 로드 청크 크기
pub const LOAD_BUF_LEN: usize = 8192;

/// Sedna 드라이버 인터페이스
pub trait Driver: Send {
    /// 세션 열기
    ///
    /// 성공 시 [`ResultCode::SessionOpen`]을 반환합니다. 실패 시 구현체는 이미
    /// 소켓을 정리했을 수 있으므로 호출자는 `close`를 호출해서는 안 됩니다.
    fn connect(&mut self, host: &str, database: &str, username: &str, password: &str) -> ResultCode;

    /// 세션 닫기 (성공 시 [`ResultCode::SessionClosed`])
    fn close(&mut self) -> ResultCode;

    /// 마지막으로 알려진 연결 상태 (네트워크 확인 없음)
    fn connection_status(&self) -> ConnectionStatus;

    /// 쿼리 실행
    fn execute(&mut self, query: &str) -> ResultCode;

    /// 다음 결과 아이템으로 이동
    fn next(&mut self) -> ResultCode;

    /// 현재 아이템의 데이터를 `buf`에 읽기
    ///
    /// 읽은 바이트 수를 반환하며 0은 아이템의 끝을 뜻합니다.
    fn get_data(&mut self, buf: &mut [u8]) -> Result<usize, ResultCode>;

    /// 트랜잭션 상태
    fn transaction_status(&self) -> TransactionStatus;

    /// 트랜잭션 시작
    fn begin(&mut self) -> ResultCode;

    /// 트랜잭션 커밋
    fn commit(&mut self) -> ResultCode;

    /// 트랜잭션 롤백
    fn rollback(&mut self) -> ResultCode;

    /// 연결 속성 설정
    fn set_attribute(&mut self, attribute: ConnectionAttribute) -> ResultCode;

    /// 문서 데이터 청크 적재
    fn load_data(&mut self, chunk: &[u8], doc_name: &str, collection: Option<&str>) -> ResultCode;

    /// 벌크 로드 종료
    fn end_load_data(&mut self) -> ResultCode;

    /// 마지막 에러 메시지
    fn last_error_message(&self) -> String;
}

impl<D: Driver + ?Sized> Driver for Box<D> {
    fn connect(&mut self, host: &str, database: &str, username: &str, password: &str) -> ResultCode {
        (**self).connect(host, database, username, password)
    }

    fn close(&mut self) -> ResultCode {
        (**self).close()
    }

    fn connection_status(&self) -> ConnectionStatus {
        (**self).connection_status()
    }

    fn execute(&mut self, query: &str) -> ResultCode {
        (**self).execute(query)
    }

    fn next(&mut self) -> ResultCode {
        (**self).next()
    }

    fn get_data(&mut self, buf: &mut [u8]) -> Result<usize, ResultCode> {
        (**self).get_data(buf)
    }

    fn transaction_status(&self) -> TransactionStatus {
        (**self).transaction_status()
    }

    fn begin(&mut self) -> ResultCode {
        (**self).begin()
    }

    fn commit(&mut self) -> ResultCode {
        (**self).commit()
    }

    fn rollback(&mut self) -> ResultCode {
        (**self).rollback()
    }

    fn set_attribute(&mut self, attribute: ConnectionAttribute) -> ResultCode {
        (**self).set_attribute(attribute)
    }

    fn load_data(&mut self, chunk: &[u8], doc_name: &str, collection: Option<&str>) -> ResultCode {
        (**self).load_data(chunk, doc_name, collection)
    }

    fn end_load_data(&mut self) -> ResultCode {
        (**self).end_load_data()
    }

    fn last_error_message(&self) -> String {
        (**self).last_error_message()
    }
}
