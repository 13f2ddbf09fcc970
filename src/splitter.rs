//! GeoJSON 분할 모듈
//!
//! 입력 폴더의 FeatureCollection 파일을 찾아 각 Feature를 개별 파일로 저장합니다.
//! 파일 하나의 실패는 해당 파일에서 끝나며 나머지 파일 처리는 계속됩니다.

use memmap2::Mmap;
use serde_json::Value;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, trace};
use walkdir::WalkDir;

use crate::collection::CollectionShape;
use crate::error::{ErrorKind, LoonError, Result};
use crate::pattern::FileFilter;

/// 분할 결과 파일의 확장자
pub const SPLIT_EXTENSION: &str = "json";

/// 파일 하나의 분할 결과
#[derive(Debug)]
pub struct SplitResult {
    /// 처리된 파일 경로
    pub path: PathBuf,
    /// 생성된 파일 경로 목록 (레코드 순서, 쓰기 도중 실패하면 그 전까지의 파일)
    pub written: Vec<PathBuf>,
    /// 에러 (실패 또는 건너뜀)
    pub error: Option<LoonError>,
    /// 원본 파일 크기
    pub file_size: u64,
    /// 생성된 파일들의 총 크기
    pub bytes_written: u64,
}

impl SplitResult {
    /// 성공 결과 생성
    pub fn success(
        path: PathBuf,
        written: Vec<PathBuf>,
        file_size: u64,
        bytes_written: u64,
    ) -> Self {
        Self {
            path,
            written,
            error: None,
            file_size,
            bytes_written,
        }
    }

    /// 실패 결과 생성
    pub fn failure(path: PathBuf, error: LoonError, file_size: u64) -> Self {
        Self {
            path,
            written: Vec::new(),
            error: Some(error),
            file_size,
            bytes_written: 0,
        }
    }

    /// 분할에 성공했는지 여부
    pub fn is_split(&self) -> bool {
        self.error.is_none()
    }

    /// 에러 분류 (성공이면 None)
    pub fn kind(&self) -> Option<ErrorKind> {
        self.error.as_ref().map(LoonError::kind)
    }

    /// 원본 파일 이름
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// 폴더 전체 분할 결과 요약
#[derive(Debug, Default)]
pub struct SplitSummary {
    /// 발견된 파일 수
    pub files_found: usize,
    /// 파일별 결과 (처리 순서)
    pub results: Vec<SplitResult>,
}

impl SplitSummary {
    /// 분할에 성공한 파일 수
    pub fn split_count(&self) -> usize {
        self.results.iter().filter(|r| r.is_split()).count()
    }

    /// 특정 분류의 에러가 난 파일 수
    pub fn count_kind(&self, kind: ErrorKind) -> usize {
        self.results
            .iter()
            .filter(|r| r.kind() == Some(kind))
            .count()
    }

    /// 생성된 전체 파일 수
    pub fn records_written(&self) -> usize {
        self.results.iter().map(|r| r.written.len()).sum()
    }
}

/// 분할 옵션
#[derive(Debug, Clone)]
pub struct SplitOptions {
    /// 입력 파일 필터
    pub filter: FileFilter,
    /// 컬렉션 판별 기준
    pub shape: CollectionShape,
    /// 대용량 파일 임계값 (이상이면 메모리 매핑 사용)
    pub mmap_threshold: u64,
}

impl Default for SplitOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl SplitOptions {
    /// 기본 옵션 생성
    pub fn new() -> Self {
        Self {
            filter: FileFilter::default(),
            shape: CollectionShape::default(),
            mmap_threshold: 10 * 1024 * 1024, // 10MB
        }
    }

    /// 파일 이름 패턴 설정
    ///
    /// # Errors
    /// 패턴이 올바른 glob 형식이 아니면 `InvalidPattern`을 반환합니다.
    pub fn with_pattern(mut self, pattern: Option<String>) -> Result<Self> {
        self.filter = FileFilter::new(pattern)?;
        Ok(self)
    }

    /// 메모리 매핑 임계값 설정
    pub fn with_mmap_threshold(mut self, threshold: u64) -> Self {
        self.mmap_threshold = threshold;
        self
    }
}

/// 입력 폴더 유효성 검사
pub fn validate_input_dir(input_dir: &Path) -> Result<()> {
    if !input_dir.exists() {
        return Err(LoonError::InputDirNotFound {
            path: input_dir.to_path_buf(),
        });
    }

    if !input_dir.is_dir() {
        return Err(LoonError::NotADirectory {
            path: input_dir.to_path_buf(),
        });
    }

    Ok(())
}

/// 출력 폴더 생성 (이미 있으면 그대로 사용)
pub fn ensure_output_dir(output_dir: &Path) -> Result<()> {
    fs::create_dir_all(output_dir).map_err(|e| LoonError::OutputDirError {
        path: output_dir.to_path_buf(),
        reason: e.to_string(),
    })
}

/// 입력 폴더 바로 아래의 분할 대상 파일 수집 (하위 폴더는 탐색하지 않음)
///
/// 실행마다 같은 순서가 되도록 경로 순으로 정렬합니다.
pub fn collect_collection_files(input_dir: &Path, filter: &FileFilter) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(input_dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.path().is_file())
        .filter(|e| filter.accepts(e.path()))
        .map(|e| e.into_path())
        .collect();

    files.sort();
    files
}

/// 폴더 안의 모든 FeatureCollection 파일 분할
///
/// # Arguments
/// * `input_dir` - 입력 폴더
/// * `output_dir` - 출력 폴더 (없으면 생성)
/// * `options` - 분할 옵션
///
/// # Returns
/// 파일별 결과를 담은 `SplitSummary`. 입력 폴더가 없거나 출력 폴더를
/// 만들 수 없을 때만 에러를 반환합니다.
pub fn split_all(
    input_dir: &Path,
    output_dir: &Path,
    options: &SplitOptions,
) -> Result<SplitSummary> {
    split_all_with(input_dir, output_dir, options, |_, _| {})
}

/// `split_all`과 같지만 파일 하나가 끝날 때마다 `on_result`를 호출
///
/// `on_result`는 결과와 함께 전체 파일 수를 받습니다.
pub fn split_all_with<F>(
    input_dir: &Path,
    output_dir: &Path,
    options: &SplitOptions,
    mut on_result: F,
) -> Result<SplitSummary>
where
    F: FnMut(&SplitResult, usize),
{
    validate_input_dir(input_dir)?;
    ensure_output_dir(output_dir)?;

    let files = collect_collection_files(input_dir, &options.filter);
    debug!(input = %input_dir.display(), found = files.len(), "collected candidate files");

    let mut summary = SplitSummary {
        files_found: files.len(),
        results: Vec::with_capacity(files.len()),
    };

    for path in files {
        let result = split_one(path, output_dir, options);
        on_result(&result, summary.files_found);
        summary.results.push(result);
    }

    Ok(summary)
}

/// 단일 파일 분할
///
/// # Arguments
/// * `path` - 처리할 GeoJSON 파일 경로
/// * `output_dir` - 결과 파일을 저장할 폴더 (이미 존재해야 함)
/// * `options` - 분할 옵션
///
/// # Returns
/// 처리 결과를 담은 `SplitResult`
pub fn split_one(path: PathBuf, output_dir: &Path, options: &SplitOptions) -> SplitResult {
    let file_size = fs::metadata(&path).map(|m| m.len()).unwrap_or(0);

    let doc = match parse_document(&path, file_size, options) {
        Ok(doc) => doc,
        Err(e) => return SplitResult::failure(path, e, file_size),
    };

    let records = match options.shape.records(&doc) {
        Ok(records) => records,
        Err(reason) => {
            debug!(file = %path.display(), %reason, "skipping non-collection document");
            let error = LoonError::Skipped {
                file: path.clone(),
                reason,
            };
            return SplitResult::failure(path, error, file_size);
        }
    };

    let base_name = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    let mut written = Vec::with_capacity(records.len());
    let mut bytes_written = 0u64;

    for (i, record) in records.iter().enumerate() {
        let file_name = format!("{}-{}.{}", base_name, i, SPLIT_EXTENSION);
        let target = output_dir.join(file_name);

        match write_record(&target, record) {
            Ok(bytes) => {
                trace!(file = %target.display(), index = i, bytes, "wrote record");
                bytes_written += bytes;
                written.push(target);
            }
            Err(e) => {
                let mut result = SplitResult::failure(path, e, file_size);
                result.written = written;
                result.bytes_written = bytes_written;
                return result;
            }
        }
    }

    SplitResult::success(path, written, file_size, bytes_written)
}

/// 파일 크기에 따라 읽기 방식을 골라 JSON 파싱
fn parse_document(path: &Path, file_size: u64, options: &SplitOptions) -> Result<Value> {
    if file_size >= options.mmap_threshold {
        // 대용량 파일: 메모리 매핑 사용
        parse_with_mmap(path)
    } else {
        // 일반 파일: 버퍼 리더 사용
        parse_with_reader(path)
    }
}

/// 버퍼 리더를 사용한 JSON 파싱
fn parse_with_reader(path: &Path) -> Result<Value> {
    let file = File::open(path).map_err(|e| LoonError::FileOpenError {
        file: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    let reader = BufReader::new(file);
    serde_json::from_reader(reader).map_err(|e| json_read_error(path, e))
}

/// 메모리 매핑을 사용한 JSON 파싱 (대용량 파일용)
fn parse_with_mmap(path: &Path) -> Result<Value> {
    let file = File::open(path).map_err(|e| LoonError::FileOpenError {
        file: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    // SAFETY: 매핑은 이 함수 안에서만 읽기 전용으로 사용되고 파싱 후 바로 해제됩니다.
    let mmap = unsafe {
        Mmap::map(&file).map_err(|e| LoonError::FileOpenError {
            file: path.to_path_buf(),
            reason: format!("메모리 매핑 실패: {}", e),
        })?
    };

    serde_json::from_slice(&mmap).map_err(|e| json_read_error(path, e))
}

/// serde_json 에러를 파싱 실패와 I/O 실패로 구분
fn json_read_error(path: &Path, e: serde_json::Error) -> LoonError {
    if e.is_io() {
        LoonError::FileOpenError {
            file: path.to_path_buf(),
            reason: e.to_string(),
        }
    } else {
        LoonError::Malformed {
            file: path.to_path_buf(),
            reason: e.to_string(),
        }
    }
}

/// 레코드 하나를 2칸 들여쓰기 JSON으로 저장하고 쓴 바이트 수 반환
fn write_record(target: &Path, record: &Value) -> Result<u64> {
    let file = File::create(target).map_err(|e| LoonError::WriteError {
        file: target.to_path_buf(),
        reason: e.to_string(),
    })?;

    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, record).map_err(|e| LoonError::SerializeError {
        file: target.to_path_buf(),
        reason: e.to_string(),
    })?;
    writer.flush().map_err(|e| LoonError::WriteError {
        file: target.to_path_buf(),
        reason: e.to_string(),
    })?;

    let bytes = fs::metadata(target).map(|m| m.len()).unwrap_or(0);
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn create_test_json(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_collect_skips_other_extensions_and_subdirs() {
        let temp_dir = TempDir::new().unwrap();
        create_test_json(temp_dir.path(), "a.json", "{}");
        create_test_json(temp_dir.path(), "b.geojson", "{}");
        create_test_json(temp_dir.path(), "notes.txt", "not json");
        let sub_dir = temp_dir.path().join("nested");
        fs::create_dir(&sub_dir).unwrap();
        create_test_json(&sub_dir, "deep.json", "{}");

        let files = collect_collection_files(temp_dir.path(), &FileFilter::default());

        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.json", "b.geojson"]);
    }

    #[test]
    fn test_split_one_writes_each_feature() {
        let temp_dir = TempDir::new().unwrap();
        let out_dir = temp_dir.path().join("out");
        fs::create_dir(&out_dir).unwrap();
        let path = create_test_json(
            temp_dir.path(),
            "cells.geojson",
            r#"{"type":"FeatureCollection","features":[{"id":1},{"id":2},{"id":3}]}"#,
        );

        let result = split_one(path, &out_dir, &SplitOptions::new());

        assert!(result.is_split());
        assert_eq!(result.written.len(), 3);
        assert_eq!(result.written[2], out_dir.join("cells-2.json"));
        let content = fs::read_to_string(out_dir.join("cells-0.json")).unwrap();
        assert_eq!(serde_json::from_str::<Value>(&content).unwrap(), json!({"id": 1}));
    }

    #[test]
    fn test_split_one_pretty_two_space_indent() {
        let temp_dir = TempDir::new().unwrap();
        let path = create_test_json(
            temp_dir.path(),
            "p.json",
            r#"{"type":"FeatureCollection","features":[{"id":1,"properties":{"name":"x"}}]}"#,
        );

        let result = split_one(path, temp_dir.path(), &SplitOptions::new());
        assert!(result.is_split());

        let content = fs::read_to_string(temp_dir.path().join("p-0.json")).unwrap();
        assert_eq!(
            content,
            "{\n  \"id\": 1,\n  \"properties\": {\n    \"name\": \"x\"\n  }\n}"
        );
    }

    #[test]
    fn test_split_one_preserves_key_order() {
        let temp_dir = TempDir::new().unwrap();
        let path = create_test_json(
            temp_dir.path(),
            "o.json",
            r#"{"type":"FeatureCollection","features":[{"z":1,"a":2,"m":3}]}"#,
        );

        split_one(path, temp_dir.path(), &SplitOptions::new());

        let content = fs::read_to_string(temp_dir.path().join("o-0.json")).unwrap();
        let z = content.find("\"z\"").unwrap();
        let a = content.find("\"a\"").unwrap();
        let m = content.find("\"m\"").unwrap();
        assert!(z < a && a < m);
    }

    #[test]
    fn test_split_one_malformed() {
        let temp_dir = TempDir::new().unwrap();
        let path = create_test_json(temp_dir.path(), "bad.json", r#"{"type": "Feature"#);

        let result = split_one(path, temp_dir.path(), &SplitOptions::new());

        assert_eq!(result.kind(), Some(ErrorKind::Malformed));
        assert!(result.written.is_empty());
    }

    #[test]
    fn test_split_one_mmap_path() {
        let temp_dir = TempDir::new().unwrap();
        let path = create_test_json(
            temp_dir.path(),
            "big.json",
            r#"{"type":"FeatureCollection","features":[{"id":1}]}"#,
        );

        let options = SplitOptions::new().with_mmap_threshold(0);
        let result = split_one(path, temp_dir.path(), &options);

        assert!(result.is_split());
        assert!(temp_dir.path().join("big-0.json").exists());
    }

    #[test]
    fn test_invalid_pattern_rejected_by_builder() {
        let result = SplitOptions::new().with_pattern(Some("[oops".to_string()));

        assert!(matches!(result, Err(LoonError::InvalidPattern { .. })));
    }

    #[test]
    fn test_summary_counts() {
        let temp_dir = TempDir::new().unwrap();
        let in_dir = temp_dir.path().join("in");
        fs::create_dir(&in_dir).unwrap();
        create_test_json(
            &in_dir,
            "a.json",
            r#"{"type":"FeatureCollection","features":[{"id":1},{"id":2}]}"#,
        );
        create_test_json(&in_dir, "b.geojson", r#"{"type":"Feature","id":9}"#);
        create_test_json(&in_dir, "c.json", "not json at all");

        let mut seen = 0;
        let out_dir = temp_dir.path().join("out");
        let summary = split_all_with(&in_dir, &out_dir, &SplitOptions::new(), |_, total| {
            seen += 1;
            assert_eq!(total, 3);
        })
        .unwrap();

        assert_eq!(seen, 3);
        assert_eq!(summary.files_found, 3);
        assert_eq!(summary.split_count(), 1);
        assert_eq!(summary.count_kind(ErrorKind::Skipped), 1);
        assert_eq!(summary.count_kind(ErrorKind::Malformed), 1);
        assert_eq!(summary.records_written(), 2);
    }
}
