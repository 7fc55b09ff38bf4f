//! Result codes and status values
//!
//! 드라이버가 반환하는 정수 결과 코드

use std::fmt;

// ============================================================================
// ResultCode - 결과 코드
// ============================================================================

/// 드라이버 결과 코드
///
/// 값은 Sedna C 드라이버(`libsedna`)의 상수와 동일합니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResultCode {
    /// 세션 열림
    SessionOpen,
    /// 세션 닫힘
    SessionClosed,
    /// 인증 실패
    AuthenticationFailed,
    /// 세션 열기 실패
    OpenSessionFailed,
    /// 세션 닫기 실패
    CloseSessionFailed,
    /// 조회 성공
    QuerySucceeded,
    /// 조회 실패
    QueryFailed,
    /// 갱신 성공
    UpdateSucceeded,
    /// 갱신 실패
    UpdateFailed,
    /// 벌크 로드 성공
    BulkLoadSucceeded,
    /// 벌크 로드 실패
    BulkLoadFailed,
    /// 트랜잭션 시작 성공
    BeginTransactionSucceeded,
    /// 트랜잭션 시작 실패
    BeginTransactionFailed,
    /// 롤백 성공
    RollbackTransactionSucceeded,
    /// 롤백 실패
    RollbackTransactionFailed,
    /// 커밋 성공
    CommitTransactionSucceeded,
    /// 커밋 실패
    CommitTransactionFailed,
    /// 다음 아이템 있음
    NextItemSucceeded,
    /// 다음 아이템 읽기 실패
    NextItemFailed,
    /// 아이템 없음
    NoItem,
    /// 결과 끝
    ResultEnd,
    /// 데이터 청크 적재됨
    DataChunkLoaded,
    /// 일반 에러
    Error,
    /// 속성 설정 성공
    SetAttributeSucceeded,
    /// 알 수 없는 코드
    Unknown(i32),
}

impl ResultCode {
    /// 정수 코드
    pub fn code(&self) -> i32 {
        match self {
            Self::SessionOpen => 1,
            Self::SessionClosed => 2,
            Self::AuthenticationFailed => -3,
            Self::OpenSessionFailed => -4,
            Self::CloseSessionFailed => -5,
            Self::QuerySucceeded => 6,
            Self::QueryFailed => -7,
            Self::UpdateSucceeded => 8,
            Self::UpdateFailed => -9,
            Self::BulkLoadSucceeded => 10,
            Self::BulkLoadFailed => -11,
            Self::BeginTransactionSucceeded => 12,
            Self::BeginTransactionFailed => -13,
            Self::RollbackTransactionSucceeded => 14,
            Self::RollbackTransactionFailed => -15,
            Self::CommitTransactionSucceeded => 16,
            Self::CommitTransactionFailed => -17,
            Self::NextItemSucceeded => 18,
            Self::NextItemFailed => -19,
            Self::NoItem => -20,
            Self::ResultEnd => -21,
            Self::DataChunkLoaded => 23,
            Self::Error => -24,
            Self::SetAttributeSucceeded => 32,
            Self::Unknown(code) => *code,
        }
    }

    /// 정수 코드에서 변환
    pub fn from_code(code: i32) -> Self {
        match code {
            1 => Self::SessionOpen,
            2 => Self::SessionClosed,
            -3 => Self::AuthenticationFailed,
            -4 => Self::OpenSessionFailed,
            -5 => Self::CloseSessionFailed,
            6 => Self::QuerySucceeded,
            -7 => Self::QueryFailed,
            8 => Self::UpdateSucceeded,
            -9 => Self::UpdateFailed,
            10 => Self::BulkLoadSucceeded,
            -11 => Self::BulkLoadFailed,
            12 => Self::BeginTransactionSucceeded,
            -13 => Self::BeginTransactionFailed,
            14 => Self::RollbackTransactionSucceeded,
            -15 => Self::RollbackTransactionFailed,
            16 => Self::CommitTransactionSucceeded,
            -17 => Self::CommitTransactionFailed,
            18 => Self::NextItemSucceeded,
            -19 => Self::NextItemFailed,
            -20 => Self::NoItem,
            -21 => Self::ResultEnd,
            23 => Self::DataChunkLoaded,
            -24 => Self::Error,
            32 => Self::SetAttributeSucceeded,
            other => Self::Unknown(other),
        }
    }
}

impl fmt::Display for ResultCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} ({})", self, self.code())
    }
}

impl From<i32> for ResultCode {
    fn from(code: i32) -> Self {
        Self::from_code(code)
    }
}

// ============================================================================
// Status - 상태 값
// ============================================================================

/// 드라이버 측 연결 상태
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionStatus {
    /// 연결 정상
    Ok,
    /// 닫힘
    #[default]
    Closed,
    /// 연결 실패
    Failed,
}

/// 트랜잭션 상태
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransactionStatus {
    /// 트랜잭션 없음
    #[default]
    NoTransaction,
    /// 활성 트랜잭션
    Active,
}

impl TransactionStatus {
    /// 활성 여부
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }
}

/// 연결 속성
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConnectionAttribute {
    /// 자동 커밋 on/off
    Autocommit(bool),
}

// ============================================================================
// Tests
// ============================================================================
