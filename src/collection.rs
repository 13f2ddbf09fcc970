//! FeatureCollection 판별 모듈
//!
//! 파싱된 JSON 문서가 분할 가능한 컬렉션인지 판별합니다.
//! 레코드(Feature)는 내용을 해석하지 않고 그대로 다룹니다.

use serde_json::Value;
use std::fmt;

/// 컬렉션 판별 기준
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionShape {
    /// 타입 구분 필드 이름
    pub type_field: String,
    /// 컬렉션을 나타내는 타입 값
    pub collection_tag: String,
    /// 레코드 배열 필드 이름
    pub records_field: String,
}

impl Default for CollectionShape {
    fn default() -> Self {
        Self {
            type_field: "type".to_string(),
            collection_tag: "FeatureCollection".to_string(),
            records_field: "features".to_string(),
        }
    }
}

/// 문서를 건너뛴 이유
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// 최상위 값이 객체가 아님
    NotAnObject,
    /// 타입 값이 컬렉션 태그와 다름 (없으면 None)
    TypeMismatch { found: Option<String> },
    /// 레코드 필드 없음
    MissingRecords,
    /// 레코드 필드가 배열이 아님
    RecordsNotArray,
    /// 레코드 배열이 비어 있음
    EmptyRecords,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::NotAnObject => write!(f, "최상위 값이 JSON 객체가 아님"),
            SkipReason::TypeMismatch { found: Some(t) } => write!(f, "타입이 '{}'임", t),
            SkipReason::TypeMismatch { found: None } => write!(f, "타입 필드 없음"),
            SkipReason::MissingRecords => write!(f, "features 필드 없음"),
            SkipReason::RecordsNotArray => write!(f, "features가 배열이 아님"),
            SkipReason::EmptyRecords => write!(f, "features가 비어 있음"),
        }
    }
}

impl CollectionShape {
    /// 문서가 분할 가능한 컬렉션이면 레코드 목록을 반환
    ///
    /// 타입 값이 컬렉션 태그와 같고 레코드 배열이 비어 있지 않아야 합니다.
    ///
    /// # Examples
    /// ```
    /// use loon_utils::collection::{CollectionShape, SkipReason};
    /// use serde_json::json;
    ///
    /// let shape = CollectionShape::default();
    /// let doc = json!({"type": "FeatureCollection", "features": [{"id": 1}]});
    /// assert_eq!(shape.records(&doc).unwrap().len(), 1);
    ///
    /// let single = json!({"type": "Feature", "id": 9});
    /// assert!(matches!(shape.records(&single), Err(SkipReason::TypeMismatch { .. })));
    /// ```
    pub fn records<'a>(&self, doc: &'a Value) -> Result<&'a [Value], SkipReason> {
        let map = doc.as_object().ok_or(SkipReason::NotAnObject)?;

        match map.get(&self.type_field) {
            Some(Value::String(t)) if *t == self.collection_tag => {}
            Some(Value::String(t)) => {
                return Err(SkipReason::TypeMismatch {
                    found: Some(t.clone()),
                })
            }
            Some(other) => {
                return Err(SkipReason::TypeMismatch {
                    found: Some(other.to_string()),
                })
            }
            None => return Err(SkipReason::TypeMismatch { found: None }),
        }

        let records = map
            .get(&self.records_field)
            .ok_or(SkipReason::MissingRecords)?
            .as_array()
            .ok_or(SkipReason::RecordsNotArray)?;

        if records.is_empty() {
            return Err(SkipReason::EmptyRecords);
        }

        Ok(records)
    }
}
