//! Relay 클라이언트 경계 인터페이스
//!
//! 실제 relay 노드 탐색, 부하 분산, 전송은 외부 클라이언트 구현이 담당합니다.
//! 이 크레이트는 쓰기 호출 한 번의 결과만 타입으로 구분합니다.

use crate::config::{SecurityConfig, DEFAULT_WRITE_TIMEOUT};
use crate::error::{RelayError, Result};
use crate::events::BinlogEvent;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

/// 메시지 크기 제한 기본값 (relay 계층 설정과 동일하게 유지)
pub const DEFAULT_MAX_MESSAGE_SIZE: usize = 4 * 1024 * 1024;

/// Relay 쓰기 에러
///
/// 쓰기 조정자는 에러 문자열이 아니라 이 태그로 분기합니다.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RelayWriteError {
    /// 이벤트가 relay 메시지 크기 제한을 초과
    #[error("binlog 페이로드가 너무 큽니다: {size} bytes (제한 {limit} bytes)")]
    PayloadTooLarge { size: usize, limit: usize },

    /// relay 노드에 연결할 수 없음
    #[error("relay 노드를 사용할 수 없습니다: {0}")]
    Unavailable(String),

    /// 그 외 일시적 실패
    #[error("relay 쓰기 실패: {0}")]
    Other(String),
}

/// Relay 클라이언트 생성 설정
#[derive(Debug, Clone)]
pub struct RelayClientConfig {
    /// 쓰기 타임아웃
    pub write_timeout: Duration,
    /// TLS / 유닉스 소켓 보안 설정
    pub security: SecurityConfig,
}

impl Default for RelayClientConfig {
    fn default() -> Self {
        RelayClientConfig {
            write_timeout: DEFAULT_WRITE_TIMEOUT,
            security: SecurityConfig::default(),
        }
    }
}

/// Binlog 이벤트를 relay 계층으로 전달하는 클라이언트
///
/// 재시도와 타임아웃은 구현체 내부 책임입니다. 이 크레이트는 구현체가
/// 포기한 뒤의 결과만 분류합니다.
#[async_trait]
pub trait RelayClient: Send + Sync {
    /// Binlog 이벤트 한 건 쓰기
    async fn write_binlog(&self, event: &BinlogEvent) -> std::result::Result<(), RelayWriteError>;
}

/// 검증된 엔드포인트 목록으로 클라이언트를 생성하는 팩토리
#[async_trait]
pub trait RelayClientFactory: Send + Sync {
    async fn create(
        &self,
        endpoints: &[String],
        config: &RelayClientConfig,
    ) -> Result<Arc<dyn RelayClient>>;
}

/// 인메모리 relay 클라이언트
///
/// 데모와 테스트에서 실제 relay 계층 대신 사용합니다. 기록된 이벤트를
/// 보관하고 메시지 크기 제한을 검사합니다.
pub struct MemoryRelayClient {
    max_message_size: usize,
    written: RwLock<Vec<BinlogEvent>>,
}

impl MemoryRelayClient {
    pub fn new() -> Self {
        Self::with_max_message_size(DEFAULT_MAX_MESSAGE_SIZE)
    }

    pub fn with_max_message_size(max_message_size: usize) -> Self {
        MemoryRelayClient {
            max_message_size,
            written: RwLock::new(Vec::new()),
        }
    }

    /// 지금까지 기록된 이벤트 수
    pub fn len(&self) -> usize {
        self.written.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.written.read().is_empty()
    }

    /// 기록된 이벤트 사본
    pub fn written(&self) -> Vec<BinlogEvent> {
        self.written.read().clone()
    }
}

impl Default for MemoryRelayClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RelayClient for MemoryRelayClient {
    async fn write_binlog(&self, event: &BinlogEvent) -> std::result::Result<(), RelayWriteError> {
        let payload = serde_json::to_vec(event)
            .map_err(|e| RelayWriteError::Other(format!("Failed to encode event: {}", e)))?;

        if payload.len() > self.max_message_size {
            return Err(RelayWriteError::PayloadTooLarge {
                size: payload.len(),
                limit: self.max_message_size,
            });
        }

        self.written.write().push(event.clone());
        debug!(
            "Stored binlog event, type: {}, start ts: {}",
            event.tp.as_str(),
            event.start_ts
        );
        Ok(())
    }
}

/// MemoryRelayClient를 만드는 팩토리
pub struct MemoryRelayFactory {
    max_message_size: usize,
}

impl MemoryRelayFactory {
    pub fn new() -> Self {
        MemoryRelayFactory {
            max_message_size: DEFAULT_MAX_MESSAGE_SIZE,
        }
    }

    pub fn with_max_message_size(max_message_size: usize) -> Self {
        MemoryRelayFactory { max_message_size }
    }
}

impl Default for MemoryRelayFactory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RelayClientFactory for MemoryRelayFactory {
    async fn create(
        &self,
        endpoints: &[String],
        config: &RelayClientConfig,
    ) -> Result<Arc<dyn RelayClient>> {
        if endpoints.is_empty() {
            return Err(RelayError::ClientCreation("Empty endpoint list".to_string()));
        }

        info!(
            "Creating in-memory relay client for {} endpoints, write timeout: {:?}",
            endpoints.len(),
            config.write_timeout
        );
        Ok(Arc::new(MemoryRelayClient::with_max_message_size(
            self.max_message_size,
        )))
    }
}
