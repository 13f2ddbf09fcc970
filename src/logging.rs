//! 로깅 초기화 모듈
//!
//! 사용자용 진행 상황은 각 CLI가 컬러로 직접 출력하고, 라이브러리 내부의
//! 세부 이벤트는 `tracing`으로 stderr에 남깁니다.

use tracing_subscriber::EnvFilter;

/// `--verbose` 없이 사용할 기본 필터
pub const DEFAULT_FILTER: &str = "warn";

/// `--verbose`에서 사용할 필터
pub const VERBOSE_FILTER: &str = "loon_utils=debug";

/// 필터 지시자 선택 (`RUST_LOG`가 설정되어 있으면 그 값이 우선)
pub fn filter_directive(verbose: bool) -> &'static str {
    if verbose {
        VERBOSE_FILTER
    } else {
        DEFAULT_FILTER
    }
}

/// tracing 구독자 초기화
///
/// 이미 초기화되어 있으면 아무것도 하지 않습니다.
pub fn init(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directive(verbose)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_directive() {
        assert_eq!(filter_directive(false), "warn");
        assert_eq!(filter_directive(true), "loon_utils=debug");
    }

    #[test]
    fn test_init_twice_is_harmless() {
        init(false);
        init(true);
    }
}
