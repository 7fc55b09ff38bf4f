//! # Sedna Client
//!
//! A session layer for the [Sedna](https://www.sedna.org) native XML database.
//!
//! The crate sits on top of a low-level [`protocol::Driver`] that speaks the
//! Sedna wire protocol and adds connection lifecycle, query execution with
//! result streaming, transactions, bulk document loading and typed errors.
//!
//! ## Features
//!
//! - **Sessions** - Open, close, reset and automatic teardown on drop
//! - **Per-session serialization** - A session can be shared across threads; calls on it never interleave
//! - **Async dispatch** - Driver calls can run on the Tokio blocking pool
//! - **Transactions** - Explicit begin/commit/rollback and a scoped form that rolls back on error or panic
//! - **Bulk load** - Documents are streamed to the server in 8 KiB chunks
//!
//! ## Basic Usage
//!
//! ```rust
//! use sedna_client::{ConnectionConfig, MemoryDriver, ScriptedResponse, SednaError, Session};
//!
//! # fn main() -> Result<(), SednaError> {
//! let driver = MemoryDriver::new();
//! driver.handle().respond("doc('auction')//item/name", ScriptedResponse::items([
//!     "<name>lamp</name>",
//!     "<name>chair</name>",
//! ]));
//!
//! let config = ConnectionConfig::builder()
//!     .with_host("localhost")
//!     .with_database("auction")
//!     .build();
//! let session = Session::connect(config, driver)?;
//!
//! let names = session
//!     .execute("doc('auction')//item/name")?
//!     .unwrap_or_default()
//!     .into_strings();
//! assert_eq!(names, vec!["<name>lamp</name>", "<name>chair</name>"]);
//!
//! session.close()?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Async Usage
//!
//! ```rust,no_run
//! use sedna_client::{ConnectionConfig, MemoryDriver, Session};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let session = Session::connect(ConnectionConfig::default(), MemoryDriver::new())?;
//!
//!     session.load_document_async("<items/>", "auction", None).await?;
//!     let result = session.execute_async("doc('auction')/items").await?;
//!     println!("{:?}", result);
//!
//!     session.close()?;
//!     Ok(())
//! }
//! ```
//!
//! ## Transactions
//!
//! ```rust
//! # use sedna_client::{ConnectionConfig, MemoryDriver, SednaError, Session};
//! # fn main() -> Result<(), SednaError> {
//! # let session = Session::connect(ConnectionConfig::default(), MemoryDriver::new())?;
//! // Explicit control
//! session.begin()?;
//! session.execute("update delete doc('auction')//item[@sold]")?;
//! session.commit()?;
//!
//! // Scoped: commits on Ok, rolls back on Err or panic
//! session.transaction(|tx| {
//!     tx.execute("update insert <item/> into doc('auction')/items")?;
//!     Ok::<_, SednaError>(())
//! })?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! ```rust
//! # use sedna_client::{ConnectionConfig, MemoryDriver, SednaError, Session};
//! let session = Session::connect(ConnectionConfig::default(), MemoryDriver::new()).unwrap();
//! session.close().unwrap();
//!
//! match session.execute("doc('auction')") {
//!     Err(SednaError::Connection(msg)) => eprintln!("not connected: {}", msg),
//!     Err(e) => eprintln!("error: {}", e),
//!     Ok(_) => unreachable!(),
//! }
//! ```
//!
//! ## Modules
//!
//! - [`client`] - Sessions, transactions, results and errors
//! - [`protocol`] - Driver interface, result codes and an in-memory driver
//!

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod client;
pub mod protocol;

// Re-exports for convenience
pub use client::{
    ConnectionConfig, ConnectionConfigBuilder,
    ErrorKind, ErrorMessage, SednaError, SednaResult,
    ResultSet, Session, SessionStatus,
};

pub use protocol::{
    ConnectionStatus, Driver, MemoryDriver, MemoryHandle,
    ResultCode, ScriptedResponse, TransactionStatus,
};

/// Config alias for convenience
pub type Config = ConnectionConfig;
