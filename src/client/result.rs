//! Result sets
//!
//! 쿼리 결과 아이템 수집

use std::fmt;

use bytes::{Bytes, BytesMut};

use crate::protocol::{Driver, ResultCode, RESULT_BUF_LEN};

use super::error::{SednaError, SednaResult};

// ============================================================================
// ResultSet - 결과 집합
// ============================================================================

/// 쿼리 결과 집합
///
/// 서버가 보낸 순서대로 완전히 읽힌 아이템들입니다.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultSet {
    items: Vec<Bytes>,
}

impl ResultSet {
    /// 새 결과 집합 생성
    pub fn new(items: Vec<Bytes>) -> Self {
        Self { items }
    }

    /// 빈 결과 집합
    pub fn empty() -> Self {
        Self::default()
    }

    /// 아이템 수
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// 빈 결과 여부
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// 인덱스로 아이템 가져오기
    pub fn get(&self, index: usize) -> Option<&Bytes> {
        self.items.get(index)
    }

    /// 아이템 반복자
    pub fn iter(&self) -> std::slice::Iter<'_, Bytes> {
        self.items.iter()
    }

    /// 첫 번째 아이템 (없으면 None)
    pub fn first(&self) -> Option<&Bytes> {
        self.items.first()
    }

    /// 단일 아이템 가져오기
    pub fn single(mut self) -> SednaResult<Bytes> {
        if self.items.len() != 1 {
            return Err(SednaError::generic(format!(
                "Expected single item, got {}",
                self.items.len()
            )));
        }
        Ok(self.items.remove(0))
    }

    /// 모든 아이템을 문자열로 변환 (잘못된 UTF-8은 대체 문자)
    pub fn into_strings(self) -> Vec<String> {
        self.items
            .iter()
            .map(|item| String::from_utf8_lossy(item).into_owned())
            .collect()
    }

    /// 모든 아이템 가져오기
    pub fn into_vec(self) -> Vec<Bytes> {
        self.items
    }
}

impl fmt::Display for ResultSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let items: Vec<String> = self
            .items
            .iter()
            .map(|item| String::from_utf8_lossy(item).into_owned())
            .collect();
        write!(f, "[{}]", items.join(", "))
    }
}

impl IntoIterator for ResultSet {
    type Item = Bytes;
    type IntoIter = std::vec::IntoIter<Bytes>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a> IntoIterator for &'a ResultSet {
    type Item = &'a Bytes;
    type IntoIter = std::slice::Iter<'a, Bytes>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl FromIterator<Bytes> for ResultSet {
    fn from_iter<I: IntoIterator<Item = Bytes>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

// ============================================================================
// Draining
// ============================================================================

/// 현재 쿼리의 모든 결과 아이템 읽기
///
/// 중간에 에러가 나면 이미 읽은 아이템은 버려집니다.
pub(crate) fn drain<D: Driver + ?Sized>(driver: &mut D) -> SednaResult<ResultSet> {
    let mut items = Vec::new();
    loop {
        match driver.next() {
            ResultCode::NextItemSucceeded => {
                // 프로토콜이 첫 아이템 이후의 모든 아이템 앞에 줄바꿈을 붙임
                let strip_leading = !items.is_empty();
                items.push(read_item(driver, strip_leading)?);
            }
            ResultCode::ResultEnd | ResultCode::NoItem => break,
            code => return Err(SednaError::classify(code, &driver.last_error_message())),
        }
    }
    Ok(ResultSet::new(items))
}

/// 아이템 하나를 끝까지 읽기
fn read_item<D: Driver + ?Sized>(driver: &mut D, mut strip_leading: bool) -> SednaResult<Bytes> {
    // 마지막 바이트는 드라이버의 종료 문자용
    let mut buffer = [0u8; RESULT_BUF_LEN];
    let mut item = BytesMut::new();
    loop {
        let n = driver
            .get_data(&mut buffer[..RESULT_BUF_LEN - 1])
            .map_err(|code| SednaError::classify(code, &driver.last_error_message()))?;
        if n == 0 {
            break;
        }
        if strip_leading {
            item.extend_from_slice(&buffer[1..n]);
            strip_leading = false;
        } else {
            item.extend_from_slice(&buffer[..n]);
        }
    }
    Ok(item.freeze())
}

// ============================================================================
// Tests
// ============================================================================
