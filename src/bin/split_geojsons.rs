//! split-geojsons - GeoJSON FeatureCollection 분할 도구
//!
//! 메인 엔트리포인트

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use loon_utils::{
    cli::SplitArgs,
    error::ErrorKind,
    logging,
    splitter::{self, SplitOptions, SplitResult},
    stats::SplitStats,
};

fn main() -> ExitCode {
    let args = SplitArgs::parse();
    logging::init(args.verbose);

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {:#}", "❌ 오류:".bright_red(), e);
            ExitCode::FAILURE
        }
    }
}

/// 분할 실행
fn run(args: &SplitArgs) -> Result<()> {
    let options = args.to_options()?;
    splitter::validate_input_dir(&args.input)?;

    print_header(args);

    if args.dry_run {
        let files = splitter::collect_collection_files(&args.input, &options.filter);
        print_dry_run(&files);
        return Ok(());
    }

    run_split_mode(args, &options)
}

/// 헤더 출력
fn print_header(args: &SplitArgs) {
    println!("\n{}", "═".repeat(50).bright_blue());
    println!(
        "{}",
        " ✂️ GEOJSON FEATURECOLLECTION SPLITTER".bright_white().bold()
    );
    println!("{}", "═".repeat(50).bright_blue());
    println!("  {} 입력 폴더: {:?}", "📂".bright_cyan(), args.input);
    println!("  {} 출력 폴더: {:?}", "📄".bright_green(), args.output);

    if let Some(ref pattern) = args.pattern {
        println!("  {} 패턴 필터: {}", "🔍".bright_magenta(), pattern);
    }

    if args.dry_run {
        println!(
            "  {} {}",
            "⚠️".bright_yellow(),
            "드라이런 모드 (실제 분할 없음)".yellow()
        );
    }

    println!("{}", "═".repeat(50).bright_blue());
}

/// 드라이런 출력
fn print_dry_run(files: &[PathBuf]) {
    if files.is_empty() {
        println!("{}", "⚠️ 처리할 GeoJSON 파일이 없습니다.".yellow());
        return;
    }

    println!("\n{}", "📋 처리 예정 파일 목록:".bright_cyan());
    for (i, path) in files.iter().enumerate() {
        println!("  {}. {:?}", i + 1, path.file_name().unwrap_or_default());
    }
    println!(
        "\n{} 총 {} 개의 파일이 처리될 예정입니다.",
        "ℹ️".bright_blue(),
        files.len().to_string().bright_green()
    );
}

/// 분할 모드 실행
fn run_split_mode(args: &SplitArgs, options: &SplitOptions) -> Result<()> {
    println!(
        "\n{} 출력 폴더 확인: {:?}",
        "📁".bright_cyan(),
        args.output
    );
    println!("{}", "📁 파일 검색 중...".bright_cyan());

    let mut pb: Option<ProgressBar> = None;
    let mut stats = SplitStats::new(0);

    let summary = splitter::split_all_with(&args.input, &args.output, options, |result, total| {
        let bar = pb.get_or_insert_with(|| {
            println!(
                "  {} 발견된 파일 수: {}",
                "📋".bright_white(),
                total.to_string().bright_green()
            );
            stats.total_files = total;
            create_progress_bar(total)
        });

        stats.record(result);
        report_result(bar, result, args.verbose);
        bar.inc(1);
    })?;

    if summary.files_found == 0 {
        println!(
            "{} {:?}",
            "⚠️ 처리할 GeoJSON 파일이 없습니다:".yellow(),
            args.input
        );
        return Ok(());
    }

    if let Some(bar) = pb {
        bar.finish_with_message("완료!");
    }

    // 에러 로그 파일 작성
    if let Some(ref log_path) = args.log {
        write_error_log(log_path, &summary.results)?;
    }

    stats.print_summary();

    println!("\n{} 분할 완료: {:?}\n", "✅".bright_green(), args.output);

    Ok(())
}

/// 파일 하나의 결과 출력
fn report_result(pb: &ProgressBar, result: &SplitResult, verbose: bool) {
    for line in result_lines(result, verbose) {
        pb.println(line);
    }
}

/// 결과 출력 줄 생성 (성공 파일은 항상 한 줄, 상세 모드에서는 레코드별 파일도 표시)
fn result_lines(result: &SplitResult, verbose: bool) -> Vec<String> {
    let name = result.file_name();

    match (&result.error, result.kind()) {
        (None, _) => {
            let mut lines = vec![format!(
                "  {} {} -> {}개 파일",
                "✓".green(),
                name,
                result.written.len()
            )];
            if verbose {
                lines.extend(result.written.iter().map(|path| {
                    format!(
                        "    -> {}",
                        path.file_name().unwrap_or_default().to_string_lossy()
                    )
                }));
            }
            lines
        }
        (Some(reason), Some(ErrorKind::Skipped)) => {
            vec![format!("  {} {}", "⏭".yellow(), reason)]
        }
        (Some(error), _) => {
            vec![format!("  {} {}", "•".red(), error.to_string().red())]
        }
    }
}

/// 진행률 바 생성
fn create_progress_bar(total: usize) -> ProgressBar {
    let pb = ProgressBar::new(total as u64);
    let style = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▓▒░");
    pb.set_style(style);
    pb
}

/// 에러 로그 파일 작성 (건너뛴 파일은 제외)
fn write_error_log(log_path: &Path, results: &[SplitResult]) -> Result<()> {
    let errors: Vec<&SplitResult> = results
        .iter()
        .filter(|r| matches!(r.kind(), Some(k) if k != ErrorKind::Skipped))
        .collect();

    let mut log_file = File::create(log_path)
        .with_context(|| format!("에러 로그 파일을 만들 수 없습니다: {:?}", log_path))?;

    writeln!(log_file, "split-geojsons 에러 로그")?;
    writeln!(log_file, "생성 시간: {}", unix_now())?;
    writeln!(log_file, "총 에러 수: {}", errors.len())?;
    writeln!(log_file, "{}", "=".repeat(50))?;

    for result in errors {
        writeln!(log_file, "\n파일: {:?}", result.path)?;
        if let Some(ref error) = result.error {
            writeln!(log_file, "에러: {}", error)?;
        }
    }

    println!("\n{} 에러 로그 저장: {:?}", "📝".bright_cyan(), log_path);

    Ok(())
}

/// 현재 시간 문자열 반환
fn unix_now() -> String {
    use std::time::SystemTime;
    let duration = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap_or_default();
    format!("Unix timestamp: {}", duration.as_secs())
}

#[cfg(test)]
mod tests {
    use super::*;
    use loon_utils::error::LoonError;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_write_error_log_excludes_skipped() {
        let temp_dir = TempDir::new().unwrap();
        let log_path = temp_dir.path().join("errors.log");
        let results = vec![
            SplitResult::failure(
                PathBuf::from("bad.json"),
                LoonError::Malformed {
                    file: PathBuf::from("bad.json"),
                    reason: "EOF".to_string(),
                },
                3,
            ),
            SplitResult::failure(
                PathBuf::from("b.geojson"),
                LoonError::Skipped {
                    file: PathBuf::from("b.geojson"),
                    reason: loon_utils::SkipReason::EmptyRecords,
                },
                10,
            ),
        ];

        write_error_log(&log_path, &results).unwrap();

        let content = fs::read_to_string(&log_path).unwrap();
        assert!(content.contains("총 에러 수: 1"));
        assert!(content.contains("bad.json"));
        assert!(!content.contains("b.geojson"));
    }

    #[test]
    fn test_result_lines_for_split_file() {
        let result = SplitResult::success(
            PathBuf::from("in/a.json"),
            vec![PathBuf::from("out/a-0.json"), PathBuf::from("out/a-1.json")],
            40,
            30,
        );

        let quiet = result_lines(&result, false);
        assert_eq!(quiet.len(), 1);
        assert!(quiet[0].contains("a.json"));
        assert!(quiet[0].contains("2개 파일"));

        let verbose = result_lines(&result, true);
        assert_eq!(verbose.len(), 3);
        assert!(verbose[1].contains("a-0.json"));
        assert!(verbose[2].contains("a-1.json"));
    }
}
