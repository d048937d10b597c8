//! Relay 엔드포인트 주소 검증
//!
//! 쉼표로 구분된 주소 목록을 scheme://host:port 형태로 정규화합니다.
//! 예: "127.0.0.1:8250,https://pump2:8250"
//!  -> ["http://127.0.0.1:8250", "https://pump2:8250"]

use crate::error::{RelayError, Result};
use tracing::debug;
use url::Url;

/// 허용되는 URL 스킴
const ALLOWED_SCHEMES: [&str; 4] = ["http", "https", "unix", "unixs"];

/// 쉼표로 구분된 주소 목록을 정규화된 엔드포인트 목록으로 파싱
///
/// - 스킴 마커(`://`)가 없으면 `http://`를 붙입니다
/// - 입력 순서가 유지되고 중복은 제거하지 않습니다
/// - host:port 형식이 아니거나 경로가 있으면 실패합니다
pub fn parse_endpoints(addrs: &str) -> Result<Vec<String>> {
    let mut endpoints = Vec::new();

    for candidate in addrs.split(',') {
        let candidate = candidate.trim();
        let with_scheme = if candidate.contains("://") {
            candidate.to_string()
        } else {
            format!("http://{}", candidate)
        };

        let url = Url::parse(&with_scheme).map_err(|e| match e {
            url::ParseError::InvalidPort
            | url::ParseError::EmptyHost
            | url::ParseError::InvalidIpv4Address
            | url::ParseError::InvalidIpv6Address => {
                RelayError::InvalidHostPort(candidate.to_string())
            }
            other => RelayError::UrlParse(other),
        })?;

        if !ALLOWED_SCHEMES.contains(&url.scheme()) {
            return Err(RelayError::InvalidScheme(candidate.to_string()));
        }

        // url 크레이트는 기본 포트(http 80 등)를 지워버리므로
        // host:port는 authority 문자열에서 직접 검증한다
        let (host, port) = match split_host_port(authority(&with_scheme)) {
            Some(pair) => pair,
            None => return Err(RelayError::InvalidHostPort(candidate.to_string())),
        };

        if !url.path().is_empty() && url.path() != "/" {
            return Err(RelayError::UnexpectedPath(candidate.to_string()));
        }

        endpoints.push(format!("{}://{}:{}", url.scheme(), host, port));
    }

    debug!("Parsed {} relay endpoints", endpoints.len());
    Ok(endpoints)
}

/// scheme:// 뒤의 authority 부분 추출 (경로/쿼리/프래그먼트 전까지)
fn authority(with_scheme: &str) -> &str {
    let rest = match with_scheme.split_once("://") {
        Some((_, rest)) => rest,
        None => with_scheme,
    };
    rest.split(|c| c == '/' || c == '?' || c == '#')
        .next()
        .unwrap_or(rest)
}

/// "host:port" 분리 (IPv6 리터럴은 대괄호 필수)
fn split_host_port(authority: &str) -> Option<(&str, u16)> {
    let (host, port) = authority.rsplit_once(':')?;
    if host.is_empty() {
        return None;
    }
    if host.contains(':') && !(host.starts_with('[') && host.ends_with(']')) {
        return None;
    }
    let port = port.parse::<u16>().ok()?;
    Some((host, port))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_scheme_prepended() {
        let endpoints = parse_endpoints("192.168.199.113:23").unwrap();
        assert_eq!(endpoints, vec!["http://192.168.199.113:23"]);
    }

    #[test]
    fn test_scheme_preserved() {
        let endpoints = parse_endpoints("https://192.168.199.113:2379").unwrap();
        assert_eq!(endpoints, vec!["https://192.168.199.113:2379"]);

        let endpoints = parse_endpoints("unix://relay-host:8250").unwrap();
        assert_eq!(endpoints, vec!["unix://relay-host:8250"]);
    }

    #[test]
    fn test_order_and_duplicates_preserved() {
        let endpoints = parse_endpoints("a:1, a:1 ,https://b:2").unwrap();
        assert_eq!(endpoints, vec!["http://a:1", "http://a:1", "https://b:2"]);
    }

    #[test]
    fn test_explicit_default_port_kept() {
        // url 크레이트 정규화가 :443을 지우면 안 됨
        let endpoints = parse_endpoints("https://host:443").unwrap();
        assert_eq!(endpoints, vec!["https://host:443"]);
    }

    #[test]
    fn test_invalid_scheme() {
        let err = parse_endpoints("ftp://host:21").unwrap_err();
        assert!(matches!(err, RelayError::InvalidScheme(_)));
    }

    #[test]
    fn test_invalid_host_port() {
        let err = parse_endpoints("bad::port").unwrap_err();
        assert!(matches!(err, RelayError::InvalidHostPort(_)));

        // 포트 누락
        let err = parse_endpoints("http://host").unwrap_err();
        assert!(matches!(err, RelayError::InvalidHostPort(_)));
    }

    #[test]
    fn test_unexpected_path() {
        let err = parse_endpoints("http://host:1/path").unwrap_err();
        assert!(matches!(err, RelayError::UnexpectedPath(_)));
    }

    #[test]
    fn test_ipv6_host() {
        let endpoints = parse_endpoints("[::1]:8250").unwrap();
        assert_eq!(endpoints, vec!["http://[::1]:8250"]);
    }

    #[test]
    fn test_whitespace_trimmed() {
        let endpoints = parse_endpoints(" 127.0.0.1:8250 , host:2 ").unwrap();
        assert_eq!(endpoints, vec!["http://127.0.0.1:8250", "http://host:2"]);
    }
}
