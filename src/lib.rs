//! loon-utils - Parquet / GeoJSON 파일 변환 도구 모음
//!
//! 데이터 파일을 다루는 두 개의 독립적인 CLI 도구를 제공합니다.
//!
//! # 주요 기능
//!
//! - 🧱 **컬럼 추가** (`add-parquet-col`): Parquet 파일의 모든 행에 상수 값 컬럼을 추가하여 새 파일로 저장
//! - ✂️ **GeoJSON 분할** (`split-geojsons`): FeatureCollection 파일의 각 Feature를 개별 파일로 저장
//! - ⚠️ **파일 단위 에러 처리**: 잘못된 파일 하나가 전체 작업을 멈추지 않음
//! - 🛡️ **안전한 쓰기**: 컬럼 추가 실패 시 불완전한 출력 파일을 남기지 않음
//! - 📈 **상세 통계**: 분할/건너뜀/실패 파일 수, 입출력 용량 표시
//! - 🔍 **패턴 필터링**: glob 형식의 파일 이름 필터링
//!
//! # 예제
//!
//! ```bash
//! # 컬럼 추가
//! add-parquet-col data.parquet source_tag Processed_V2 -o tagged.parquet
//!
//! # GeoJSON 분할
//! split-geojsons -i ./cells -o ./cell
//! ```

pub mod appender;
pub mod cli;
pub mod collection;
pub mod error;
pub mod logging;
pub mod pattern;
pub mod splitter;
pub mod stats;

// Re-exports for convenient access
pub use appender::{add_column, add_column_with, AppendOptions, AppendReport, ColumnValue};
pub use cli::{AppendArgs, SplitArgs, ValueKind};
pub use collection::{CollectionShape, SkipReason};
pub use error::{ErrorKind, LoonError, Result, Warning};
pub use pattern::FileFilter;
pub use splitter::{split_all, split_all_with, split_one, SplitOptions, SplitResult, SplitSummary};
pub use stats::{format_bytes, SplitStats};
