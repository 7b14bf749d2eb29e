//! 환경변수 확장
//!
//! - `${VAR}`: 환경변수 값 (없으면 빈 문자열)
//! - `${VAR:-default}`: 환경변수가 없으면 기본값

use lazy_static::lazy_static;
use regex::{Captures, Regex};

lazy_static! {
    static ref DEFAULT_PATTERN: Regex =
        Regex::new(r"\$\{([^}:]+):-([^}]*)\}").expect("valid env default pattern");
    static ref SIMPLE_PATTERN: Regex =
        Regex::new(r"\$\{([^}]+)\}").expect("valid env pattern");
}

/// Expand `${VAR}` and `${VAR:-default}` references in `value`.
pub fn expand_env_var(value: &str) -> String {
    if !value.contains("${") {
        return value.to_string();
    }

    let result = DEFAULT_PATTERN.replace_all(value, |caps: &Captures| {
        std::env::var(&caps[1]).unwrap_or_else(|_| caps[2].to_string())
    });

    SIMPLE_PATTERN
        .replace_all(&result, |caps: &Captures| {
            std::env::var(&caps[1]).unwrap_or_default()
        })
        .into_owned()
}
