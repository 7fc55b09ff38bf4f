//! Client Error Types
//!
//! 세션 계층 에러 정의 및 드라이버 결과 코드 분류

use std::fmt;
use std::io;
use thiserror::Error;

use crate::protocol::ResultCode;

/// 세부 정보 표식
const DETAILS_MARKER: &str = "\nDetails: ";

/// 줄바꿈이 없는 에러 텍스트에 사용하는 메시지
const UNKNOWN_ERROR: &str = "Unknown error.";

const LINE_BREAKS: &[char] = &['\r', '\n'];

// ============================================================================
// ErrorKind - 에러 종류
// ============================================================================

/// 에러 종류
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// 일반 에러
    Generic,
    /// 인증 에러
    Authentication,
    /// 연결 에러
    Connection,
    /// 트랜잭션 에러
    Transaction,
}

impl ErrorKind {
    /// 결과 코드에 해당하는 에러 종류
    pub fn from_code(code: ResultCode) -> Self {
        match code {
            ResultCode::AuthenticationFailed => Self::Authentication,
            ResultCode::OpenSessionFailed | ResultCode::CloseSessionFailed => Self::Connection,
            ResultCode::BeginTransactionFailed
            | ResultCode::CommitTransactionFailed
            | ResultCode::RollbackTransactionFailed => Self::Transaction,
            _ => Self::Generic,
        }
    }
}

// ============================================================================
// ErrorMessage - 에러 메시지
// ============================================================================

/// 요약 메시지와 선택적 세부 정보
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorMessage {
    /// 요약 메시지
    pub message: String,
    /// 세부 정보
    pub details: Option<String>,
}

impl ErrorMessage {
    /// 새 메시지 생성
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            details: None,
        }
    }

    /// 세부 정보 추가
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// 드라이버의 마지막 에러 텍스트 파싱
    ///
    /// 첫 줄은 헤더이며 버려집니다. 그 뒤부터 `Details:`로 시작하는 줄 전까지가
    /// 메시지이고, 표식 뒤의 텍스트는 줄바꿈을 공백으로 바꿔 세부 정보가 됩니다.
    pub fn parse(text: &str) -> Self {
        let body = match text.find('\n') {
            Some(pos) => &text[pos..],
            None => return Self::new(UNKNOWN_ERROR),
        };

        let (message, details) = match body.find(DETAILS_MARKER) {
            Some(pos) => (&body[1..pos.max(1)], Some(&body[pos + DETAILS_MARKER.len()..])),
            None => (&body[1..], None),
        };

        let message = message.trim_end_matches(LINE_BREAKS);
        let details = details.map(|d| d.trim_end_matches(LINE_BREAKS).replace('\n', " "));

        Self {
            message: message.to_string(),
            details,
        }
    }
}

impl fmt::Display for ErrorMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.details {
            Some(details) if self.message.is_empty() => write!(f, "({})", details),
            Some(details) => write!(f, "{} ({})", self.message, details),
            None => write!(f, "{}", self.message),
        }
    }
}

impl From<&str> for ErrorMessage {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for ErrorMessage {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

// ============================================================================
// SednaError - 세션 에러
// ============================================================================

/// 세션 계층 에러
#[derive(Error, Debug)]
pub enum SednaError {
    /// 일반 에러
    #[error("{0}")]
    Generic(ErrorMessage),

    /// 인증 에러
    #[error("{0}")]
    Authentication(ErrorMessage),

    /// 연결 에러
    #[error("{0}")]
    Connection(ErrorMessage),

    /// 트랜잭션 에러
    #[error("{0}")]
    Transaction(ErrorMessage),

    /// 문서 소스 I/O 에러
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl SednaError {
    /// 결과 코드와 드라이버 에러 텍스트로 에러 분류
    pub fn classify(code: ResultCode, last_error: &str) -> Self {
        Self::with_kind(ErrorKind::from_code(code), ErrorMessage::parse(last_error))
    }

    /// 종류를 지정해 에러 생성
    pub fn with_kind(kind: ErrorKind, message: ErrorMessage) -> Self {
        match kind {
            ErrorKind::Generic => Self::Generic(message),
            ErrorKind::Authentication => Self::Authentication(message),
            ErrorKind::Connection => Self::Connection(message),
            ErrorKind::Transaction => Self::Transaction(message),
        }
    }

    /// 일반 에러 생성
    pub fn generic(msg: impl Into<String>) -> Self {
        Self::Generic(ErrorMessage::new(msg))
    }

    /// 인증 에러 생성
    pub fn authentication(msg: impl Into<String>) -> Self {
        Self::Authentication(ErrorMessage::new(msg))
    }

    /// 연결 에러 생성
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(ErrorMessage::new(msg))
    }

    /// 트랜잭션 에러 생성
    pub fn transaction(msg: impl Into<String>) -> Self {
        Self::Transaction(ErrorMessage::new(msg))
    }

    /// 에러 종류
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Generic(_) | Self::Io(_) => ErrorKind::Generic,
            Self::Authentication(_) => ErrorKind::Authentication,
            Self::Connection(_) => ErrorKind::Connection,
            Self::Transaction(_) => ErrorKind::Transaction,
        }
    }

    /// 요약 메시지
    pub fn message(&self) -> String {
        match self {
            Self::Generic(m) | Self::Authentication(m) | Self::Connection(m) | Self::Transaction(m) => {
                m.message.clone()
            }
            Self::Io(e) => e.to_string(),
        }
    }

    /// 세부 정보
    pub fn details(&self) -> Option<&str> {
        match self {
            Self::Generic(m) | Self::Authentication(m) | Self::Connection(m) | Self::Transaction(m) => {
                m.details.as_deref()
            }
            Self::Io(_) => None,
        }
    }

    /// 연결 에러 여부
    pub fn is_connection_error(&self) -> bool {
        self.kind() == ErrorKind::Connection
    }

    /// 트랜잭션 에러 여부
    pub fn is_transaction_error(&self) -> bool {
        self.kind() == ErrorKind::Transaction
    }
}

// ============================================================================
// Result Type
// ============================================================================

/// 세션 결과 타입
pub type SednaResult<T> = Result<T, SednaError>;

/// 결과 코드가 기대값이 아니면 분류된 에러 반환
pub(crate) fn verify(expected: ResultCode, actual: ResultCode, last_error: impl FnOnce() -> String) -> SednaResult<()> {
    if actual == expected {
        Ok(())
    } else {
        Err(SednaError::classify(actual, &last_error()))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_with_details() {
        let msg = ErrorMessage::parse("Header\nActual message\nDetails: line one\nline two\n");
        assert_eq!(msg.message, "Actual message");
        assert_eq!(msg.details.as_deref(), Some("line one line two"));
        assert_eq!(msg.to_string(), "Actual message (line one line two)");
    }

    #[test]
    fn test_parse_without_details() {
        let msg = ErrorMessage::parse("SEDNA Message: ERROR XPST0003\nIt is a static error.\n");
        assert_eq!(msg.message, "It is a static error.");
        assert_eq!(msg.details, None);
        assert_eq!(msg.to_string(), "It is a static error.");
    }

    #[test]
    fn test_parse_without_line_break() {
        let msg = ErrorMessage::parse("something went wrong");
        assert_eq!(msg.message, "Unknown error.");
        assert_eq!(msg.details, None);

        let msg = ErrorMessage::parse("");
        assert_eq!(msg.message, "Unknown error.");
    }

    #[test]
    fn test_parse_details_directly_after_header() {
        let msg = ErrorMessage::parse("Header\nDetails: only details\n");
        assert_eq!(msg.message, "");
        assert_eq!(msg.details.as_deref(), Some("only details"));
        assert_eq!(msg.to_string(), "(only details)");
    }

    #[test]
    fn test_parse_keeps_multiline_message() {
        let msg = ErrorMessage::parse("Header\nLine A\nLine B\nDetails: d\n");
        assert_eq!(msg.message, "Line A\nLine B");
        assert_eq!(msg.details.as_deref(), Some("d"));
        assert_eq!(msg.to_string(), "Line A\nLine B (d)");
    }

    #[test]
    fn test_kind_from_code() {
        assert_eq!(ErrorKind::from_code(ResultCode::AuthenticationFailed), ErrorKind::Authentication);
        assert_eq!(ErrorKind::from_code(ResultCode::OpenSessionFailed), ErrorKind::Connection);
        assert_eq!(ErrorKind::from_code(ResultCode::CloseSessionFailed), ErrorKind::Connection);
        assert_eq!(ErrorKind::from_code(ResultCode::BeginTransactionFailed), ErrorKind::Transaction);
        assert_eq!(ErrorKind::from_code(ResultCode::CommitTransactionFailed), ErrorKind::Transaction);
        assert_eq!(ErrorKind::from_code(ResultCode::RollbackTransactionFailed), ErrorKind::Transaction);
        assert_eq!(ErrorKind::from_code(ResultCode::Error), ErrorKind::Generic);
        assert_eq!(ErrorKind::from_code(ResultCode::QueryFailed), ErrorKind::Generic);
        assert_eq!(ErrorKind::from_code(ResultCode::Unknown(1234)), ErrorKind::Generic);
    }

    #[test]
    fn test_classify() {
        let err = SednaError::classify(
            ResultCode::CommitTransactionFailed,
            "Header\nActual message\nDetails: line one\nline two\n",
        );
        assert!(matches!(err, SednaError::Transaction(_)));
        assert!(err.is_transaction_error());
        assert_eq!(err.to_string(), "Actual message (line one line two)");
        assert_eq!(err.message(), "Actual message");
        assert_eq!(err.details(), Some("line one line two"));
    }

    #[test]
    fn test_error_creation() {
        let err = SednaError::connection("Connection is closed.");
        assert!(err.is_connection_error());
        assert_eq!(err.to_string(), "Connection is closed.");

        let err = SednaError::generic("Document is empty.");
        assert_eq!(err.kind(), ErrorKind::Generic);
        assert_eq!(err.details(), None);

        let err: SednaError = io::Error::new(io::ErrorKind::UnexpectedEof, "eof").into();
        assert_eq!(err.kind(), ErrorKind::Generic);
        assert_eq!(err.to_string(), "I/O error: eof");
    }

    #[test]
    fn test_verify() {
        assert!(verify(ResultCode::SessionClosed, ResultCode::SessionClosed, String::new).is_ok());

        let err = verify(ResultCode::SessionClosed, ResultCode::CloseSessionFailed, || {
            "H\nsocket error\n".to_string()
        })
        .unwrap_err();
        assert!(err.is_connection_error());
        assert_eq!(err.message(), "socket error");
    }
}
