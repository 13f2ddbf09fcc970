//! CLI 인자 파싱 모듈
//!
//! clap을 사용한 두 도구(`add-parquet-col`, `split-geojsons`)의 명령줄 인자 정의를 담당합니다.

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use crate::appender::AppendOptions;
use crate::error::Result;
use crate::splitter::SplitOptions;

/// 추가할 컬럼 값의 타입
#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq, Eq)]
pub enum ValueKind {
    /// 문자열 (UTF-8)
    #[default]
    String,
    /// 64비트 정수
    Int,
    /// 64비트 실수
    Float,
    /// 불리언 (true/false)
    Bool,
}

impl std::fmt::Display for ValueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValueKind::String => write!(f, "String"),
            ValueKind::Int => write!(f, "Int"),
            ValueKind::Float => write!(f, "Float"),
            ValueKind::Bool => write!(f, "Bool"),
        }
    }
}

/// add-parquet-col CLI 인자 구조체
#[derive(Parser, Debug)]
#[command(
    name = "add-parquet-col",
    author = "YourName <your@email.com>",
    version,
    about = "Parquet 파일의 모든 행에 상수 값을 가진 컬럼을 추가하는 CLI 도구",
    long_about = r#"
ADD PARQUET COLUMN
==================

Parquet 파일을 읽어 지정한 컬럼을 모든 행에 같은 값으로 채운 뒤
새 Parquet 파일로 저장합니다. 원본 파일은 수정하지 않습니다.

특징:
  • 이미 존재하는 컬럼은 경고 후 덮어쓰기
  • 문자열/정수/실수/불리언 타입 지원
  • 실패 시 불완전한 출력 파일을 남기지 않음

예제:
  add-parquet-col data.parquet source_tag Processed_V2
  add-parquet-col data.parquet batch 7 --type int -o tagged.parquet
"#
)]
pub struct AppendArgs {
    /// 원본 Parquet 파일 경로 (예: data.parquet)
    pub input_file: PathBuf,

    /// 추가할 컬럼 이름 (예: source_tag)
    pub column_name_to_add: String,

    /// 모든 행에 채울 값 (예: Processed_V2)
    pub column_value: String,

    /// 생성될 Parquet 파일 경로 (기본값: modified.parquet)
    #[arg(short = 'o', long = "output", default_value = "modified.parquet")]
    pub output_file: PathBuf,

    /// 컬럼 값 타입
    #[arg(short = 't', long = "type", value_enum, default_value_t = ValueKind::String)]
    pub value_kind: ValueKind,

    /// 상세 출력 모드
    #[arg(short, long)]
    pub verbose: bool,
}

impl AppendArgs {
    /// CLI 인자로부터 처리 옵션 생성
    pub fn to_options(&self) -> AppendOptions {
        AppendOptions::new().with_value_kind(self.value_kind)
    }
}

/// split-geojsons CLI 인자 구조체
#[derive(Parser, Debug)]
#[command(
    name = "split-geojsons",
    author = "YourName <your@email.com>",
    version,
    about = "GeoJSON FeatureCollection 파일을 Feature 단위 파일로 분할하는 CLI 도구",
    long_about = r#"
SPLIT GEOJSON FEATURE COLLECTIONS
=================================

입력 폴더의 .json / .geojson 파일 중 FeatureCollection을 찾아
각 Feature를 `{원본이름}-{번호}.json` 파일로 저장합니다.

특징:
  • 잘못된 JSON이나 FeatureCollection이 아닌 파일은 건너뛰고 계속 진행
  • 진행률 표시 및 상세 통계
  • 2칸 들여쓰기로 읽기 쉬운 출력

예제:
  split-geojsons -i ./cells -o ./cell
  split-geojsons -i ./cells -o ./cell --pattern "loc_*" --dry-run
"#
)]
pub struct SplitArgs {
    /// GeoJSON 파일들이 있는 입력 폴더 경로
    #[arg(short, long)]
    pub input: PathBuf,

    /// 분할된 파일이 저장될 출력 폴더 경로 (기본값: cell)
    #[arg(short, long, default_value = "cell")]
    pub output: PathBuf,

    /// 파일 이름 패턴 필터 (glob 형식, 예: "loc_*", "cells?.geojson")
    #[arg(short, long)]
    pub pattern: Option<String>,

    /// 상세 출력 모드
    #[arg(short, long)]
    pub verbose: bool,

    /// 실제 분할 없이 처리될 파일 목록만 표시
    #[arg(long)]
    pub dry_run: bool,

    /// 에러 로그 파일 경로
    #[arg(long)]
    pub log: Option<PathBuf>,
}

impl SplitArgs {
    /// CLI 인자로부터 분할 옵션 생성 (패턴이 잘못되면 에러)
    pub fn to_options(&self) -> Result<SplitOptions> {
        SplitOptions::new().with_pattern(self.pattern.clone())
    }
}
