//! 파일 필터 모듈
//!
//! 확장자 허용 목록과 glob 패턴을 사용한 입력 파일 선별을 담당합니다.

use glob::Pattern;
use std::path::Path;

use crate::error::{LoonError, Result};

/// GeoJSON 분할 대상 확장자 (대소문자 무시)
pub const GEOJSON_EXTENSIONS: &[&str] = &["json", "geojson"];

/// 확장자와 이름 패턴으로 파일을 거르는 필터
#[derive(Debug, Clone, Default)]
pub struct FileFilter {
    pattern: Option<Pattern>,
}

impl FileFilter {
    /// 새 파일 필터 생성
    ///
    /// # Arguments
    /// * `pattern` - 파일 이름 glob 패턴 (None이면 이름으로 거르지 않음)
    ///
    /// # Examples
    /// ```
    /// use loon_utils::pattern::FileFilter;
    ///
    /// let filter = FileFilter::new(Some("loc_*".to_string())).unwrap();
    /// assert!(filter.accepts("loc_1.geojson".as_ref()));
    /// assert!(!filter.accepts("loc_1.txt".as_ref()));
    /// assert!(!filter.accepts("other.json".as_ref()));
    /// ```
    pub fn new(pattern: Option<String>) -> Result<Self> {
        let compiled = match pattern {
            Some(ref p) => {
                Some(Pattern::new(p).map_err(|_| LoonError::InvalidPattern { pattern: p.clone() })?)
            }
            None => None,
        };

        Ok(Self { pattern: compiled })
    }

    /// 경로의 확장자가 허용 목록에 있는지 확인
    fn has_allowed_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|s| s.to_str())
            .map(|ext| GEOJSON_EXTENSIONS.iter().any(|a| a.eq_ignore_ascii_case(ext)))
            .unwrap_or(false)
    }

    /// 파일 이름이 패턴과 일치하는지 확인 (패턴이 없으면 항상 true)
    fn matches_name(&self, file_name: &str) -> bool {
        match &self.pattern {
            Some(p) => p.matches(file_name),
            None => true,
        }
    }

    /// 확장자와 이름 패턴을 모두 통과하는지 확인
    pub fn accepts(&self, path: &Path) -> bool {
        self.has_allowed_extension(path)
            && path
                .file_name()
                .and_then(|s| s.to_str())
                .map(|s| self.matches_name(s))
                .unwrap_or(false)
    }
}
