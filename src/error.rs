//! 에러 타입 정의 모듈
//!
//! loon-utils에서 발생할 수 있는 모든 에러 타입과 경고를 정의합니다.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

use crate::cli::ValueKind;
use crate::collection::SkipReason;

/// loon-utils에서 발생할 수 있는 에러 타입
#[derive(Error, Debug)]
pub enum LoonError {
    /// 입력 파일이 존재하지 않음
    #[error("입력 파일을 찾을 수 없습니다: {path}")]
    NotFound { path: PathBuf },

    /// 입력 폴더가 존재하지 않음
    #[error("입력 폴더를 찾을 수 없습니다: {path}")]
    InputDirNotFound { path: PathBuf },

    /// 입력이 폴더가 아님
    #[error("입력 경로가 폴더가 아닙니다: {path}")]
    NotADirectory { path: PathBuf },

    /// 출력 폴더 생성 실패
    #[error("출력 폴더를 만들 수 없습니다 ({path}): {reason}")]
    OutputDirError { path: PathBuf, reason: String },

    /// 파일 열기 실패
    #[error("파일을 열 수 없습니다 ({file}): {reason}")]
    FileOpenError { file: PathBuf, reason: String },

    /// JSON 파싱 실패
    #[error("JSON 파싱 실패 ({file}): {reason}")]
    Malformed { file: PathBuf, reason: String },

    /// FeatureCollection이 아닌 문서
    #[error("FeatureCollection이 아니므로 건너뜁니다 ({file}): {reason}")]
    Skipped { file: PathBuf, reason: SkipReason },

    /// JSON 직렬화 실패
    #[error("JSON 직렬화 실패 ({file}): {reason}")]
    SerializeError { file: PathBuf, reason: String },

    /// 파일 쓰기 실패
    #[error("파일 쓰기 실패 ({file}): {reason}")]
    WriteError { file: PathBuf, reason: String },

    /// Parquet 읽기 실패
    #[error("Parquet 읽기 실패 ({file}): {reason}")]
    ParquetReadError { file: PathBuf, reason: String },

    /// Parquet 쓰기 실패
    #[error("Parquet 쓰기 실패 ({file}): {reason}")]
    ParquetWriteError { file: PathBuf, reason: String },

    /// 컬럼 값을 지정한 타입으로 변환할 수 없음
    #[error("컬럼 값 '{value}'을(를) {kind} 타입으로 변환할 수 없습니다: {reason}")]
    InvalidValue {
        value: String,
        kind: ValueKind,
        reason: String,
    },

    /// 유효하지 않은 패턴
    #[error("유효하지 않은 패턴: {pattern}")]
    InvalidPattern { pattern: String },
}

/// 에러 분류
///
/// 호출자가 에러를 어떤 단위로 처리할지 결정할 때 사용합니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// 입력 파일/폴더 없음
    NotFound,
    /// 문서 파싱 실패 (파일 단위로 건너뜀)
    Malformed,
    /// 파싱은 되었지만 기대한 구조가 아님 (파일 단위로 건너뜀)
    Skipped,
    /// 그 외 모든 에러
    Unexpected,
}

impl LoonError {
    /// 에러의 분류 반환
    pub fn kind(&self) -> ErrorKind {
        match self {
            LoonError::NotFound { .. } | LoonError::InputDirNotFound { .. } => ErrorKind::NotFound,
            LoonError::Malformed { .. } => ErrorKind::Malformed,
            LoonError::Skipped { .. } => ErrorKind::Skipped,
            _ => ErrorKind::Unexpected,
        }
    }
}

/// 작업은 계속되지만 사용자에게 알려야 하는 경고
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    /// 이미 존재하는 컬럼의 값을 덮어씀
    ColumnOverwritten { column: String },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::ColumnOverwritten { column } => {
                write!(f, "컬럼 '{}'이(가) 이미 존재합니다. 값을 덮어씁니다.", column)
            }
        }
    }
}

/// loon-utils 결과 타입 별칭
pub type Result<T> = std::result::Result<T, LoonError>;
