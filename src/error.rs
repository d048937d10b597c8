//! Binlog relay 관련 에러 타입

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RelayError {
    #[error("URL 스킴은 http, https, unix, unixs만 가능합니다: {0}")]
    InvalidScheme(String),

    #[error("URL 주소가 \"host:port\" 형식이 아닙니다: {0}")]
    InvalidHostPort(String),

    #[error("URL에 경로를 포함할 수 없습니다: {0}")]
    UnexpectedPath(String),

    #[error("URL 파싱 에러: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("relay 클라이언트가 설정되지 않았습니다")]
    NoClient,

    #[error("binlog 페이로드가 너무 큽니다: {size} bytes (제한 {limit} bytes)")]
    PayloadTooLarge { size: usize, limit: usize },

    #[error("치명적 에러: binlog 쓰기 실패: {0}")]
    Critical(String),

    #[error("relay 클라이언트 생성 에러: {0}")]
    ClientCreation(String),

    #[error("직렬화 에러: {0}")]
    SerializationError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, RelayError>;
