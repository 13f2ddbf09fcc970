//! Parquet 컬럼 추가 모듈
//!
//! Parquet 파일 전체를 메모리로 읽어 지정한 컬럼을 모든 행에 같은 값으로 채운 뒤
//! 새 파일로 저장합니다.
//!
//! 출력은 같은 폴더의 임시 파일에 먼저 쓰고, writer를 닫은 뒤에만 최종 경로로
//! 원자적으로 옮깁니다. 실패하면 임시 파일은 자동으로 삭제되고 기존 출력 파일은
//! 그대로 남습니다. 출력 파일의 권한은 원본 파일과 같게 맞춥니다.

use arrow::array::{ArrayRef, BooleanArray, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use arrow::error::ArrowError;
use arrow::record_batch::{RecordBatch, RecordBatchOptions};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;
use std::fmt;
use std::fs::{self, File, Permissions};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::NamedTempFile;
use tracing::debug;

use crate::cli::ValueKind;
use crate::error::{LoonError, Result, Warning};

/// pandas가 DataFrame 인덱스를 저장할 때 쓰는 스키마 메타데이터 키
const PANDAS_METADATA_KEY: &str = "pandas";

/// 모든 행에 채울 상수 값
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnValue {
    Utf8(String),
    Int64(i64),
    Float64(f64),
    Boolean(bool),
}

impl ColumnValue {
    /// 문자열 인자를 지정한 타입의 값으로 변환
    ///
    /// # Examples
    /// ```
    /// use loon_utils::appender::ColumnValue;
    /// use loon_utils::cli::ValueKind;
    ///
    /// assert_eq!(ColumnValue::parse("7", ValueKind::Int).unwrap(), ColumnValue::Int64(7));
    /// assert_eq!(ColumnValue::parse("TRUE", ValueKind::Bool).unwrap(), ColumnValue::Boolean(true));
    /// assert!(ColumnValue::parse("seven", ValueKind::Int).is_err());
    /// ```
    pub fn parse(raw: &str, kind: ValueKind) -> Result<Self> {
        let invalid = |reason: String| LoonError::InvalidValue {
            value: raw.to_string(),
            kind,
            reason,
        };

        match kind {
            ValueKind::String => Ok(ColumnValue::Utf8(raw.to_string())),
            ValueKind::Int => raw
                .trim()
                .parse::<i64>()
                .map(ColumnValue::Int64)
                .map_err(|e| invalid(e.to_string())),
            ValueKind::Float => raw
                .trim()
                .parse::<f64>()
                .map(ColumnValue::Float64)
                .map_err(|e| invalid(e.to_string())),
            ValueKind::Bool => raw
                .trim()
                .to_ascii_lowercase()
                .parse::<bool>()
                .map(ColumnValue::Boolean)
                .map_err(|e| invalid(e.to_string())),
        }
    }

    /// 값에 대응하는 Arrow 타입
    pub fn data_type(&self) -> DataType {
        match self {
            ColumnValue::Utf8(_) => DataType::Utf8,
            ColumnValue::Int64(_) => DataType::Int64,
            ColumnValue::Float64(_) => DataType::Float64,
            ColumnValue::Boolean(_) => DataType::Boolean,
        }
    }

    /// 값을 `rows`개 반복한 배열 생성
    pub fn broadcast(&self, rows: usize) -> ArrayRef {
        match self {
            ColumnValue::Utf8(s) => Arc::new(StringArray::from_iter_values(
                std::iter::repeat(s.as_str()).take(rows),
            )),
            ColumnValue::Int64(v) => Arc::new(Int64Array::from_value(*v, rows)),
            ColumnValue::Float64(v) => Arc::new(Float64Array::from_value(*v, rows)),
            ColumnValue::Boolean(b) => Arc::new(BooleanArray::from(vec![*b; rows])),
        }
    }
}

impl fmt::Display for ColumnValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnValue::Utf8(s) => write!(f, "{}", s),
            ColumnValue::Int64(v) => write!(f, "{}", v),
            ColumnValue::Float64(v) => write!(f, "{}", v),
            ColumnValue::Boolean(b) => write!(f, "{}", b),
        }
    }
}

/// 컬럼 추가 옵션
#[derive(Debug, Clone)]
pub struct AppendOptions {
    /// 컬럼 값 타입
    pub value_kind: ValueKind,
    /// 읽기 배치 크기 (행 수)
    pub batch_size: usize,
}

impl Default for AppendOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl AppendOptions {
    /// 기본 옵션 생성
    pub fn new() -> Self {
        Self {
            value_kind: ValueKind::String,
            batch_size: 64 * 1024,
        }
    }

    /// 컬럼 값 타입 설정
    pub fn with_value_kind(mut self, value_kind: ValueKind) -> Self {
        self.value_kind = value_kind;
        self
    }

    /// 읽기 배치 크기 설정 (0이면 1로 취급)
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }
}

/// 컬럼 추가 결과
#[derive(Debug)]
pub struct AppendReport {
    /// 원본 파일 경로
    pub input: PathBuf,
    /// 생성된 파일 경로
    pub output: PathBuf,
    /// 추가한 컬럼 이름
    pub column: String,
    /// 채운 값
    pub value: ColumnValue,
    /// 전체 행 수
    pub rows: usize,
    /// 원본 파일 크기
    pub input_size: u64,
    /// 생성된 파일 크기
    pub output_size: u64,
    /// 작업 중 발생한 경고
    pub warnings: Vec<Warning>,
}

impl AppendReport {
    /// 기존 컬럼을 덮어썼는지 여부
    pub fn overwritten(&self) -> bool {
        self.warnings
            .iter()
            .any(|w| matches!(w, Warning::ColumnOverwritten { .. }))
    }
}

/// 출력 컬럼 하나의 출처
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnSource {
    /// 원본의 해당 위치 컬럼을 그대로 사용
    Input(usize),
    /// 상수 값으로 채움
    Broadcast,
}

/// 원본 스키마로부터 계산한 출력 컬럼 배치
#[derive(Debug)]
struct ColumnPlan {
    schema: SchemaRef,
    sources: Vec<ColumnSource>,
    overwritten: bool,
}

/// pandas 인덱스 컬럼(`__index_level_N__`)인지 확인
fn is_pandas_index(name: &str) -> bool {
    name.starts_with("__index_level_") && name.ends_with("__")
}

/// 출력 스키마 계산
///
/// 같은 이름의 컬럼은 제자리에서 교체하고, 없으면 맨 뒤에 추가합니다.
/// pandas 인덱스 컬럼과 이를 설명하는 메타데이터는 출력에서 제외합니다.
fn plan_columns(input: &Schema, column: &str, data_type: &DataType) -> ColumnPlan {
    let mut fields: Vec<Field> = Vec::with_capacity(input.fields().len() + 1);
    let mut sources = Vec::with_capacity(input.fields().len() + 1);
    let mut overwritten = false;

    for (i, field) in input.fields().iter().enumerate() {
        if is_pandas_index(field.name()) {
            continue;
        }

        if field.name() == column {
            overwritten = true;
            fields.push(Field::new(column, data_type.clone(), false));
            sources.push(ColumnSource::Broadcast);
        } else {
            fields.push((**field).clone());
            sources.push(ColumnSource::Input(i));
        }
    }

    if !overwritten {
        fields.push(Field::new(column, data_type.clone(), false));
        sources.push(ColumnSource::Broadcast);
    }

    let mut metadata = input.metadata().clone();
    metadata.remove(PANDAS_METADATA_KEY);

    ColumnPlan {
        schema: Arc::new(Schema::new_with_metadata(fields, metadata)),
        sources,
        overwritten,
    }
}

/// 배치 하나에 상수 컬럼 적용
fn apply_plan(
    batch: &RecordBatch,
    plan: &ColumnPlan,
    value: &ColumnValue,
) -> std::result::Result<RecordBatch, ArrowError> {
    let rows = batch.num_rows();
    let columns: Vec<ArrayRef> = plan
        .sources
        .iter()
        .map(|source| match source {
            ColumnSource::Input(i) => batch.column(*i).clone(),
            ColumnSource::Broadcast => value.broadcast(rows),
        })
        .collect();

    let options = RecordBatchOptions::new().with_row_count(Some(rows));
    RecordBatch::try_new_with_options(plan.schema.clone(), columns, &options)
}

/// Parquet 파일에 상수 값 컬럼 추가
///
/// # Arguments
/// * `input` - 원본 Parquet 파일 경로 (수정하지 않음)
/// * `output` - 생성할 Parquet 파일 경로
/// * `column` - 추가(또는 덮어쓸) 컬럼 이름
/// * `raw_value` - 모든 행에 채울 값 (`options.value_kind` 타입으로 변환)
/// * `options` - 처리 옵션
///
/// # Returns
/// 행 수와 파일 크기, 경고를 담은 `AppendReport`
///
/// # Errors
/// 원본이 없으면 `NotFound`, 값 변환·읽기·쓰기 실패 시 해당 에러를 반환합니다.
/// 어떤 경우에도 불완전한 출력 파일은 남지 않습니다.
pub fn add_column(
    input: &Path,
    output: &Path,
    column: &str,
    raw_value: &str,
    options: &AppendOptions,
) -> Result<AppendReport> {
    add_column_with(input, output, column, raw_value, options, |_| {})
}

/// `add_column`과 같지만 경고가 생기는 즉시 `on_warning`을 호출
///
/// 경고는 출력 파일을 쓰기 전에 전달되므로 쓰기가 실패해도 호출자는 경고를 받습니다.
pub fn add_column_with<F>(
    input: &Path,
    output: &Path,
    column: &str,
    raw_value: &str,
    options: &AppendOptions,
    mut on_warning: F,
) -> Result<AppendReport>
where
    F: FnMut(&Warning),
{
    if !input.is_file() {
        return Err(LoonError::NotFound {
            path: input.to_path_buf(),
        });
    }

    let value = ColumnValue::parse(raw_value, options.value_kind)?;
    let input_meta = fs::metadata(input).map_err(|e| LoonError::FileOpenError {
        file: input.to_path_buf(),
        reason: e.to_string(),
    })?;
    let input_size = input_meta.len();

    let (schema, batches) = read_batches(input, options.batch_size)?;
    let rows: usize = batches.iter().map(RecordBatch::num_rows).sum();
    debug!(file = %input.display(), rows, batches = batches.len(), "read parquet input");

    let plan = plan_columns(&schema, column, &value.data_type());

    let mut warnings = Vec::new();
    if plan.overwritten {
        let warning = Warning::ColumnOverwritten {
            column: column.to_string(),
        };
        debug!(file = %input.display(), column, "overwriting existing column");
        on_warning(&warning);
        warnings.push(warning);
    }

    let transformed = batches
        .iter()
        .map(|batch| apply_plan(batch, &plan, &value))
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| LoonError::ParquetWriteError {
            file: output.to_path_buf(),
            reason: e.to_string(),
        })?;

    write_batches(output, plan.schema.clone(), &transformed, input_meta.permissions())?;
    debug!(file = %output.display(), column, "wrote parquet output");

    let output_size = fs::metadata(output).map(|m| m.len()).unwrap_or(0);

    Ok(AppendReport {
        input: input.to_path_buf(),
        output: output.to_path_buf(),
        column: column.to_string(),
        value,
        rows,
        input_size,
        output_size,
        warnings,
    })
}

/// Parquet 파일 전체를 배치 목록으로 읽기
fn read_batches(path: &Path, batch_size: usize) -> Result<(SchemaRef, Vec<RecordBatch>)> {
    let read_error = |reason: String| LoonError::ParquetReadError {
        file: path.to_path_buf(),
        reason,
    };

    let file = File::open(path).map_err(|e| LoonError::FileOpenError {
        file: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).map_err(|e| read_error(e.to_string()))?;
    let schema = builder.schema().clone();
    let reader = builder
        .with_batch_size(batch_size)
        .build()
        .map_err(|e| read_error(e.to_string()))?;

    let batches = reader
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| read_error(e.to_string()))?;

    Ok((schema, batches))
}

/// 배치 목록을 임시 파일에 쓴 뒤 `permissions`를 적용해 최종 경로로 옮기기
fn write_batches(
    output: &Path,
    schema: SchemaRef,
    batches: &[RecordBatch],
    permissions: Permissions,
) -> Result<()> {
    let write_error = |reason: String| LoonError::ParquetWriteError {
        file: output.to_path_buf(),
        reason,
    };

    let parent = output
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let mut temp = NamedTempFile::new_in(parent).map_err(|e| LoonError::WriteError {
        file: output.to_path_buf(),
        reason: e.to_string(),
    })?;

    let props = WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .build();
    let mut writer = ArrowWriter::try_new(temp.as_file_mut(), schema, Some(props))
        .map_err(|e| write_error(e.to_string()))?;

    for batch in batches {
        writer.write(batch).map_err(|e| write_error(e.to_string()))?;
    }
    writer.close().map_err(|e| write_error(e.to_string()))?;

    // 임시 파일은 0600으로 만들어지므로 원본 권한을 그대로 옮김
    temp.as_file()
        .set_permissions(permissions)
        .map_err(|e| LoonError::WriteError {
            file: output.to_path_buf(),
            reason: e.to_string(),
        })?;

    temp.persist(output).map_err(|e| LoonError::WriteError {
        file: output.to_path_buf(),
        reason: e.error.to_string(),
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::Array;
    use std::collections::HashMap;

    fn schema_of(names: &[&str]) -> Schema {
        Schema::new(
            names
                .iter()
                .map(|n| Field::new(*n, DataType::Int64, true))
                .collect::<Vec<_>>(),
        )
    }

    #[test]
    fn test_parse_values() {
        assert_eq!(
            ColumnValue::parse("Processed_V2", ValueKind::String).unwrap(),
            ColumnValue::Utf8("Processed_V2".to_string())
        );
        assert_eq!(
            ColumnValue::parse(" 42 ", ValueKind::Int).unwrap(),
            ColumnValue::Int64(42)
        );
        assert_eq!(
            ColumnValue::parse("1.5", ValueKind::Float).unwrap(),
            ColumnValue::Float64(1.5)
        );
        assert_eq!(
            ColumnValue::parse("False", ValueKind::Bool).unwrap(),
            ColumnValue::Boolean(false)
        );
    }

    #[test]
    fn test_parse_invalid_value() {
        let err = ColumnValue::parse("abc", ValueKind::Float).unwrap_err();
        assert!(matches!(err, LoonError::InvalidValue { .. }));
    }

    #[test]
    fn test_broadcast_lengths() {
        let array = ColumnValue::Utf8("x".to_string()).broadcast(4);
        assert_eq!(array.len(), 4);
        let strings = array.as_any().downcast_ref::<StringArray>().unwrap();
        assert!(strings.iter().all(|v| v == Some("x")));

        assert_eq!(ColumnValue::Int64(3).broadcast(0).len(), 0);
    }

    #[test]
    fn test_plan_appends_new_column() {
        let plan = plan_columns(&schema_of(&["a", "b"]), "tag", &DataType::Utf8);

        assert!(!plan.overwritten);
        assert_eq!(
            plan.sources,
            vec![
                ColumnSource::Input(0),
                ColumnSource::Input(1),
                ColumnSource::Broadcast
            ]
        );
        assert_eq!(plan.schema.field(2).name(), "tag");
        assert_eq!(plan.schema.field(2).data_type(), &DataType::Utf8);
    }

    #[test]
    fn test_plan_replaces_in_place() {
        let plan = plan_columns(&schema_of(&["a", "tag", "b"]), "tag", &DataType::Utf8);

        assert!(plan.overwritten);
        assert_eq!(plan.schema.fields().len(), 3);
        assert_eq!(plan.schema.field(1).name(), "tag");
        assert_eq!(plan.schema.field(1).data_type(), &DataType::Utf8);
        assert_eq!(plan.sources[1], ColumnSource::Broadcast);
    }

    #[test]
    fn test_plan_drops_pandas_index() {
        let mut metadata = HashMap::new();
        metadata.insert(PANDAS_METADATA_KEY.to_string(), "{}".to_string());
        metadata.insert("origin".to_string(), "survey".to_string());
        let schema = schema_of(&["a", "__index_level_0__"]).with_metadata(metadata);

        let plan = plan_columns(&schema, "tag", &DataType::Utf8);

        let names: Vec<_> = plan.schema.fields().iter().map(|f| f.name().clone()).collect();
        assert_eq!(names, vec!["a", "tag"]);
        assert!(!plan.schema.metadata().contains_key(PANDAS_METADATA_KEY));
        assert_eq!(plan.schema.metadata().get("origin").map(String::as_str), Some("survey"));
    }

    #[test]
    fn test_apply_plan_keeps_other_columns() {
        let schema = Arc::new(schema_of(&["a"]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![Arc::new(Int64Array::from(vec![1, 2, 3])) as ArrayRef],
        )
        .unwrap();
        let plan = plan_columns(&schema, "flag", &DataType::Boolean);

        let out = apply_plan(&batch, &plan, &ColumnValue::Boolean(true)).unwrap();

        assert_eq!(out.num_rows(), 3);
        let a = out.column(0).as_any().downcast_ref::<Int64Array>().unwrap();
        assert_eq!(a.values().to_vec(), vec![1, 2, 3]);
        let flag = out.column(1).as_any().downcast_ref::<BooleanArray>().unwrap();
        assert!(flag.iter().all(|v| v == Some(true)));
    }
}
