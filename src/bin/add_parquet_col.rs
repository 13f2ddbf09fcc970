//! add-parquet-col - Parquet 컬럼 추가 도구
//!
//! 메인 엔트리포인트

use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use std::process::ExitCode;

use loon_utils::{
    appender::{add_column_with, AppendReport},
    cli::AppendArgs,
    logging,
    stats::format_bytes,
};

fn main() -> ExitCode {
    let args = AppendArgs::parse();
    logging::init(args.verbose);

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", "❌ 오류:".bright_red(), e);
            ExitCode::FAILURE
        }
    }
}

/// 컬럼 추가 실행
fn run(args: &AppendArgs) -> Result<()> {
    println!(
        "{} 파일 읽는 중: {:?}",
        "->".bright_cyan(),
        args.input_file
    );

    // 경고는 쓰기 전에 바로 출력
    let report = add_column_with(
        &args.input_file,
        &args.output_file,
        &args.column_name_to_add,
        &args.column_value,
        &args.to_options(),
        |warning| eprintln!("{} {}", "⚠️ 경고:".yellow(), warning),
    )?;

    print_report(&report, args.verbose);
    Ok(())
}

/// 결과 출력
fn print_report(report: &AppendReport, verbose: bool) {
    println!(
        "{} 컬럼 '{}'을(를) 값 '{}'(으)로 추가했습니다.",
        "->".bright_cyan(),
        report.column.bright_white(),
        report.value.to_string().bright_green()
    );
    println!(
        "{} 새 파일 생성: {:?}",
        "->".bright_cyan(),
        report.output
    );

    if verbose {
        println!("{} 행 수: {}", "->".bright_cyan(), report.rows);
    }

    println!(
        "{} 크기 비교: 원본={}, 새 파일={}",
        "->".bright_cyan(),
        format_bytes(report.input_size),
        format_bytes(report.output_size)
    );
}
