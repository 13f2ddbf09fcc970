//! 통계 및 유틸리티 모듈
//!
//! 분할 처리 통계 집계와 용량/시간 포맷팅을 담당합니다.

use colored::Colorize;
use std::time::{Duration, Instant};

use crate::error::ErrorKind;
use crate::splitter::SplitResult;

/// 분할 처리 통계 구조체
#[derive(Debug, Default)]
pub struct SplitStats {
    /// 총 파일 수
    pub total_files: usize,
    /// 분할 성공 수
    pub split_count: usize,
    /// FeatureCollection이 아니어서 건너뛴 수
    pub skipped_count: usize,
    /// JSON 파싱 실패 수
    pub malformed_count: usize,
    /// 그 외 에러 수
    pub error_count: usize,
    /// 생성된 Feature 파일 수
    pub records_written: usize,
    /// 읽은 총 바이트
    pub total_bytes_read: u64,
    /// 쓴 총 바이트
    pub total_bytes_written: u64,
    /// 처리 시작 시간
    start_time: Option<Instant>,
}

impl SplitStats {
    /// 새 통계 인스턴스 생성
    pub fn new(total_files: usize) -> Self {
        Self {
            total_files,
            start_time: Some(Instant::now()),
            ..Default::default()
        }
    }

    /// 파일 하나의 결과 반영
    pub fn record(&mut self, result: &SplitResult) {
        self.total_bytes_read += result.file_size;
        self.total_bytes_written += result.bytes_written;
        self.records_written += result.written.len();

        match result.kind() {
            None => self.split_count += 1,
            Some(ErrorKind::Skipped) => self.skipped_count += 1,
            Some(ErrorKind::Malformed) => self.malformed_count += 1,
            Some(_) => self.error_count += 1,
        }
    }

    /// 경과 시간 반환
    pub fn elapsed(&self) -> Duration {
        self.start_time
            .map(|t| t.elapsed())
            .unwrap_or(Duration::ZERO)
    }

    /// 분할 통계 요약 출력
    pub fn print_summary(&self) {
        println!("\n{}", "═".repeat(50).bright_blue());
        println!("{}", " 📊 분할 통계".bright_white().bold());
        println!("{}", "═".repeat(50).bright_blue());

        println!(
            "  {} 전체 파일:    {}",
            "📁".bright_cyan(),
            self.total_files
        );
        println!(
            "  {} 분할:         {}",
            "✅".bright_green(),
            self.split_count.to_string().green()
        );
        println!(
            "  {} 건너뜀:       {}",
            "⏭️".bright_yellow(),
            self.skipped_count.to_string().yellow()
        );

        let failed = self.malformed_count + self.error_count;
        if failed > 0 {
            println!(
                "  {} 실패:         {} (JSON 오류 {}, 기타 {})",
                "❌".bright_red(),
                failed.to_string().red(),
                self.malformed_count,
                self.error_count
            );
        } else {
            println!("  {} 실패:         {}", "✅".bright_green(), "0".green());
        }

        println!(
            "  {} 생성 파일:    {}",
            "🧩".bright_magenta(),
            self.records_written.to_string().bright_green()
        );
        println!(
            "  {} 입력 용량:    {}",
            "📥".bright_yellow(),
            format_bytes(self.total_bytes_read)
        );
        println!(
            "  {} 출력 용량:    {}",
            "📤".bright_magenta(),
            format_bytes(self.total_bytes_written)
        );
        println!(
            "  {} 처리 시간:    {}",
            "⏱️".bright_cyan(),
            format_duration(self.elapsed())
        );

        println!("{}", "═".repeat(50).bright_blue());
    }
}

/// 바이트를 읽기 쉬운 형식으로 변환
///
/// # Arguments
/// * `bytes` - 바이트 수
///
/// # Returns
/// 형식화된 문자열 (예: "1.25 MB")
///
/// # Examples
/// ```
/// use loon_utils::stats::format_bytes;
///
/// assert_eq!(format_bytes(500), "500 B");
/// assert_eq!(format_bytes(1024), "1.00 KB");
/// assert_eq!(format_bytes(1048576), "1.00 MB");
/// ```
pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// 경과 시간을 읽기 쉬운 형식으로 변환
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    let millis = duration.subsec_millis();

    if secs >= 3600 {
        let hours = secs / 3600;
        let mins = (secs % 3600) / 60;
        format!("{}시간 {}분", hours, mins)
    } else if secs >= 60 {
        let mins = secs / 60;
        let remaining_secs = secs % 60;
        format!("{}분 {}초", mins, remaining_secs)
    } else if secs > 0 {
        format!("{}.{:03}초", secs, millis)
    } else {
        format!("{}ms", millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collection::SkipReason;
    use crate::error::LoonError;
    use std::path::PathBuf;

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(0), "0 B");
        assert_eq!(format_bytes(1023), "1023 B");
        assert_eq!(format_bytes(1536), "1.50 KB");
        assert_eq!(format_bytes(1048576), "1.00 MB");
        assert_eq!(format_bytes(1073741824), "1.00 GB");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_millis(500)), "500ms");
        assert_eq!(format_duration(Duration::from_secs(5)), "5.000초");
        assert_eq!(format_duration(Duration::from_secs(65)), "1분 5초");
        assert_eq!(format_duration(Duration::from_secs(3665)), "1시간 1분");
    }

    #[test]
    fn test_record_results() {
        let mut stats = SplitStats::new(3);

        stats.record(&SplitResult::success(
            PathBuf::from("a.json"),
            vec![PathBuf::from("a-0.json"), PathBuf::from("a-1.json")],
            100,
            40,
        ));
        stats.record(&SplitResult::failure(
            PathBuf::from("b.geojson"),
            LoonError::Skipped {
                file: PathBuf::from("b.geojson"),
                reason: SkipReason::TypeMismatch {
                    found: Some("Feature".to_string()),
                },
            },
            20,
        ));
        stats.record(&SplitResult::failure(
            PathBuf::from("c.json"),
            LoonError::Malformed {
                file: PathBuf::from("c.json"),
                reason: "EOF".to_string(),
            },
            5,
        ));

        assert_eq!(stats.split_count, 1);
        assert_eq!(stats.skipped_count, 1);
        assert_eq!(stats.malformed_count, 1);
        assert_eq!(stats.error_count, 0);
        assert_eq!(stats.records_written, 2);
        assert_eq!(stats.total_bytes_read, 125);
        assert_eq!(stats.total_bytes_written, 40);
    }
}
