//! Binlog 복제 설정 및 전역 제어 플래그
//!
//! 설정 로딩 자체는 외부 몫이고, 여기서는 쓰기 경로가 소비하는
//! 값들만 정의합니다.

use crate::relay_client::RelayClientConfig;
use std::path::PathBuf;
use std::time::Duration;
use tracing::warn;

/// 기본 binlog 쓰기 타임아웃
pub const DEFAULT_WRITE_TIMEOUT: Duration = Duration::from_secs(15);

/// 허용되는 최소 쓰기 타임아웃
pub const MIN_WRITE_TIMEOUT: Duration = Duration::from_millis(300);

/// TLS / 유닉스 소켓 보안 설정
#[derive(Debug, Clone, Default)]
pub struct SecurityConfig {
    /// CA 인증서 경로
    pub ssl_ca: Option<PathBuf>,
    /// 클라이언트 인증서 경로
    pub ssl_cert: Option<PathBuf>,
    /// 클라이언트 키 경로
    pub ssl_key: Option<PathBuf>,
    /// 유닉스 소켓 경로 (unix/unixs 스킴용)
    pub socket_path: Option<PathBuf>,
}

/// Binlog 복제 설정
#[derive(Debug, Clone)]
pub struct BinlogConfig {
    /// 복제 활성화 여부 (마스터 스위치)
    pub enable: bool,
    /// 세션 변수로 복제를 제어하는 auto 모드
    pub auto_mode: bool,
    /// relay 쓰기 실패를 무시하고 로컬 커밋을 계속할지 여부
    pub ignore_error: bool,
    /// 쉼표로 구분된 relay 주소 목록
    pub addrs: String,
    /// 쓰기 타임아웃
    pub write_timeout: Duration,
    /// 보안 설정
    pub security: SecurityConfig,
}

impl Default for BinlogConfig {
    fn default() -> Self {
        BinlogConfig {
            enable: false,
            auto_mode: false,
            ignore_error: false,
            addrs: String::new(),
            write_timeout: DEFAULT_WRITE_TIMEOUT,
            security: SecurityConfig::default(),
        }
    }
}

impl BinlogConfig {
    pub fn new(addrs: impl Into<String>) -> Self {
        BinlogConfig {
            enable: true,
            addrs: addrs.into(),
            ..Default::default()
        }
    }

    /// 복제 활성 여부 결정
    ///
    /// 마스터 스위치가 꺼져 있으면 항상 false입니다. auto 모드에서는
    /// 세션 변수가 복제를 끌 수 있지만 켤 수는 없습니다.
    pub fn should_enable_binlog(&self, session_override: Option<bool>) -> bool {
        if !self.enable {
            return false;
        }
        if self.auto_mode {
            return session_override.unwrap_or(true);
        }
        true
    }

    /// 쓰기 타임아웃 설정 (300ms 미만은 무시하고 기존 값 유지)
    pub fn set_write_timeout(&mut self, timeout: Duration) {
        if timeout < MIN_WRITE_TIMEOUT {
            warn!(
                "Binlog write timeout {:?} is too short, keeping {:?}",
                timeout, self.write_timeout
            );
            return;
        }
        self.write_timeout = timeout;
    }

    /// relay 클라이언트 생성 설정으로 변환
    pub fn client_config(&self) -> RelayClientConfig {
        RelayClientConfig {
            write_timeout: self.write_timeout,
            security: self.security.clone(),
        }
    }
}
