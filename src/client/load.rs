//! Bulk document loading
//!
//! 문서를 고정 크기 청크로 나누어 서버에 적재합니다.

use std::io::{self, Read};

use bytes::Bytes;

use crate::protocol::{ResultCode, LOAD_BUF_LEN};

use super::error::{verify, SednaError, SednaResult};
use super::session::{Session, SessionInner};

impl SessionInner {
    /// `reader`의 내용을 청크 단위로 적재
    fn load_from<R: Read>(&mut self, mut reader: R, doc_name: &str, collection: Option<&str>) -> SednaResult<()> {
        self.ensure_connected()?;

        let mut buffer = vec![0u8; LOAD_BUF_LEN];
        let mut total = 0usize;
        loop {
            let n = match reader.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            };

            let code = self.driver.load_data(&buffer[..n], doc_name, collection);
            verify(ResultCode::DataChunkLoaded, code, || self.last_error())?;
            total += n;
        }

        if total == 0 {
            return Err(SednaError::generic("Document is empty."));
        }

        let code = self.driver.end_load_data();
        verify(ResultCode::BulkLoadSucceeded, code, || self.last_error())?;

        tracing::debug!(
            database = %self.config.database,
            doc_name,
            collection = collection.unwrap_or(""),
            bytes = total,
            "document loaded"
        );
        Ok(())
    }
}

impl Session {
    /// 문서 적재
    ///
    /// 문서를 최대 8 KiB 청크로 나누어 보낸 뒤 적재를 종료합니다. 적재가 끝날
    /// 때까지 세션 가드를 잡고 있으므로 같은 세션의 다른 호출과 섞이지 않습니다.
    ///
    /// 빈 문서는 드라이버를 호출하지 않고 [`SednaError::Generic`]으로 거부됩니다.
    pub fn load_document(&self, document: impl AsRef<[u8]>, doc_name: &str, collection: Option<&str>) -> SednaResult<()> {
        self.lock().load_from(document.as_ref(), doc_name, collection)
    }

    /// `reader`에서 읽은 문서 적재
    ///
    /// 읽기 에러는 [`SednaError::Io`]로 반환됩니다.
    pub fn load_document_from<R: Read>(&self, reader: R, doc_name: &str, collection: Option<&str>) -> SednaResult<()> {
        self.lock().load_from(reader, doc_name, collection)
    }

    /// 문서 적재 (비동기)
    pub async fn load_document_async(
        &self,
        document: impl Into<Bytes>,
        doc_name: impl Into<String>,
        collection: Option<String>,
    ) -> SednaResult<()> {
        let document = document.into();
        let doc_name = doc_name.into();
        self.run_background(move |inner| inner.load_from(&document[..], &doc_name, collection.as_deref()))
            .await
    }
}

// ============================================================================
// Tests
// ============================================================================
