//! Client Module
//!
//! Sedna 세션 계층: 연결 수명 주기, 쿼리 실행, 트랜잭션, 벌크 로드
//!
//! # Components
//!
//! - 설정 (ConnectionConfig, ConnectionConfigBuilder)
//! - 세션 (Session, SessionStatus)
//! - 트랜잭션 (begin/commit/rollback, 범위 트랜잭션)
//! - 결과 (ResultSet)
//! - 에러 (SednaError, ErrorKind, ErrorMessage)
//!
//! # Concurrency
//!
//! 세션마다 가드가 하나씩 있어 같은 세션의 드라이버 호출은 한 번에 하나만
//! 진행됩니다. `execute`는 호출 스레드에서 블로킹하며, `execute_async`는
//! tokio 블로킹 스레드 풀에서 같은 가드를 잡고 실행합니다.
//!
//! # Example
//!
//! ```rust
//! use sedna_client::client::{ConnectionConfig, Session};
//! use sedna_client::protocol::{MemoryDriver, ScriptedResponse};
//!
//! # fn main() -> Result<(), sedna_client::client::SednaError> {
//! let driver = MemoryDriver::new();
//! driver.handle().respond("doc('books')//title", ScriptedResponse::items(["<title>Dune</title>"]));
//!
//! let session = Session::connect(ConnectionConfig::default().with_database("library"), driver)?;
//! if let Some(titles) = session.execute("doc('books')//title")? {
//!     for title in &titles {
//!         println!("{}", String::from_utf8_lossy(title));
//!     }
//! }
//!
//! session.transaction(|tx| {
//!     tx.execute("update insert <title>Emma</title> into doc('books')/books")?;
//!     Ok::<_, sedna_client::client::SednaError>(())
//! })?;
//!
//! session.close()?;
//! # Ok(())
//! # }
//! ```

mod config;
mod error;
mod execution;
mod load;
mod result;
mod session;
mod transaction;

// Re-exports
pub use config::{
    ConnectionConfig, ConnectionConfigBuilder, DEFAULT_DATABASE, DEFAULT_HOST, DEFAULT_PASSWORD,
    DEFAULT_USERNAME,
};
pub use error::{ErrorKind, ErrorMessage, SednaError, SednaResult};
pub use result::ResultSet;
pub use session::{Session, SessionStatus};
