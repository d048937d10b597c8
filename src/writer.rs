//! Binlog 쓰기 조정자
//!
//! 커밋 경로에서 binlog 이벤트를 relay 계층으로 전달하고, 결과를
//! 분류해 서킷 브레이커 상태를 갱신합니다. relay 전달은 best-effort
//! 인프라입니다: 장애가 이어지면 매 트랜잭션을 실패시키는 대신
//! 의도적으로 복제를 끊는 쪽을 택합니다.

use crate::error::{RelayError, Result};
use crate::events::BinlogEvent;
use crate::handle::RelayClientHandle;
use crate::relay_client::{RelayClient, RelayWriteError};
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Binlog 이벤트 하나와 그 이벤트를 쓸 클라이언트 쌍
///
/// 트랜잭션 슬롯에 저장했다가 커밋 머신이 꺼내 플러시합니다.
pub struct BinlogInfo {
    pub event: BinlogEvent,
    pub client: Option<Arc<dyn RelayClient>>,
}

impl BinlogInfo {
    pub fn new(event: BinlogEvent, client: Option<Arc<dyn RelayClient>>) -> Self {
        BinlogInfo { event, client }
    }
}

/// 서킷 브레이커 상태
///
/// skip_count > 0이면 명시적으로 리셋될 때까지 모든 쓰기가 no-op
/// 성공으로 단락됩니다. 카운터는 실패당 CAS 성공 한 번으로만 증가하므로
/// 동시 실패가 중복 집계되지 않습니다.
pub struct BreakerState {
    skip_count: AtomicU32,
    ignore_errors: AtomicBool,
    tripped_at: RwLock<Option<DateTime<Utc>>>,
}

impl BreakerState {
    pub fn new(ignore_errors: bool) -> Self {
        BreakerState {
            skip_count: AtomicU32::new(0),
            ignore_errors: AtomicBool::new(ignore_errors),
            tripped_at: RwLock::new(None),
        }
    }

    /// 현재 skip 카운터
    pub fn skip_count(&self) -> u32 {
        self.skip_count.load(Ordering::SeqCst)
    }

    /// 브레이커 열림 여부
    pub fn is_open(&self) -> bool {
        self.skip_count() > 0
    }

    pub fn ignore_errors(&self) -> bool {
        self.ignore_errors.load(Ordering::SeqCst)
    }

    /// ignore_errors 플래그 설정 (서버 기동 시 설정값으로 호출)
    pub fn set_ignore_errors(&self, on: bool) {
        self.ignore_errors.store(on, Ordering::SeqCst);
    }

    /// 관찰한 값 기준으로 skip 카운터 CAS 증가
    ///
    /// 같은 값을 관찰한 동시 실패 writer 중 하나만 성공합니다.
    pub fn trip(&self, observed: u32) -> bool {
        let won = self
            .skip_count
            .compare_exchange(observed, observed + 1, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok();
        if won {
            *self.tripped_at.write() = Some(Utc::now());
            warn!("Binlog breaker tripped, further writes will be skipped");
        }
        won
    }

    /// 브레이커 닫기
    ///
    /// 자동 복구 경로는 없습니다. 복구 탐지는 운영자 행동입니다.
    pub fn reset(&self) {
        self.skip_count.store(0, Ordering::SeqCst);
        *self.tripped_at.write() = None;
        warn!("Binlog breaker reset, writes re-enabled");
    }

    /// 마지막으로 열린 시각
    pub fn tripped_at(&self) -> Option<DateTime<Utc>> {
        *self.tripped_at.read()
    }
}

/// 브레이커와 카운터 상태 스냅샷 (운영 관측용)
#[derive(Debug, Clone, Serialize)]
pub struct RelayStatus {
    pub skip_count: u32,
    pub ignore_errors: bool,
    pub critical_errors: u64,
    pub tripped_at: Option<DateTime<Utc>>,
}

impl RelayStatus {
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "skip_count": self.skip_count,
            "ignore_errors": self.ignore_errors,
            "critical_errors": self.critical_errors,
            "tripped_at": self.tripped_at.map(|t| t.to_rfc3339()),
        })
    }
}

/// Binlog 쓰기 서비스
///
/// 서버 기동 시 한 번 만들어 커밋 경로마다 주입합니다. 공유 클라이언트
/// 핸들과 브레이커 상태를 함께 소유합니다.
pub struct BinlogRelay {
    handle: RelayClientHandle,
    breaker: BreakerState,
    critical_errors: AtomicU64,
}

impl BinlogRelay {
    pub fn new(ignore_errors: bool) -> Self {
        BinlogRelay {
            handle: RelayClientHandle::new(),
            breaker: BreakerState::new(ignore_errors),
            critical_errors: AtomicU64::new(0),
        }
    }

    /// 공유 클라이언트 핸들
    pub fn handle(&self) -> &RelayClientHandle {
        &self.handle
    }

    /// 브레이커 상태
    pub fn breaker(&self) -> &BreakerState {
        &self.breaker
    }

    /// 누적 critical 에러 수 (단락된 쓰기 + 무시된 실패)
    pub fn critical_errors(&self) -> u64 {
        self.critical_errors.load(Ordering::SeqCst)
    }

    /// 브레이커 명시적 리셋
    pub fn reset_breaker(&self) {
        self.breaker.reset();
    }

    /// 상태 스냅샷
    pub fn status(&self) -> RelayStatus {
        RelayStatus {
            skip_count: self.breaker.skip_count(),
            ignore_errors: self.breaker.ignore_errors(),
            critical_errors: self.critical_errors(),
            tripped_at: self.breaker.tripped_at(),
        }
    }

    /// Binlog 이벤트 한 건을 relay 계층으로 쓰기
    ///
    /// 결과는 네 가지로 분류됩니다:
    /// 1. 브레이커 열림: 클라이언트를 호출하지 않고 성공 반환
    /// 2. 클라이언트 미설정: NoClient (설정 오류, 일시적 장애 아님)
    /// 3. 페이로드 초과: PayloadTooLarge, 브레이커는 건드리지 않음
    /// 4. 일시적 실패: ignore_errors면 브레이커에 흡수, 아니면 Critical
    pub async fn write(&self, info: &BinlogInfo) -> Result<()> {
        let skip = self.breaker.skip_count();
        if skip > 0 {
            // 조용히 버려지는 쓰기도 운영자가 볼 수 있어야 함
            self.critical_errors.fetch_add(1, Ordering::SeqCst);
            return Ok(());
        }

        let client = match info.client.as_ref() {
            Some(client) => client,
            None => {
                error!("Relay client is not configured");
                return Err(RelayError::NoClient);
            }
        };

        debug!(
            "Begin write binlog, start ts: {}, type: {}",
            info.event.start_ts,
            info.event.tp.as_str()
        );
        let result = client.write_binlog(&info.event).await;
        debug!(
            "End write binlog, start ts: {}, type: {}",
            info.event.start_ts,
            info.event.tp.as_str()
        );

        match result {
            Ok(()) => Ok(()),
            Err(RelayWriteError::PayloadTooLarge { size, limit }) => {
                warn!("Binlog event too large: {} bytes (limit {})", size, limit);
                Err(RelayError::PayloadTooLarge { size, limit })
            }
            Err(e) => {
                error!("Write binlog failed: {}", e);
                if self.breaker.ignore_errors() {
                    error!("Critical error, write binlog failed but error ignored: {}", e);
                    self.critical_errors.fetch_add(1, Ordering::SeqCst);
                    // 한 번 실패하면 이후 binlog 쓰기를 멈춘다
                    self.breaker.trip(skip);
                    return Ok(());
                }
                Err(RelayError::Critical(e.to_string()))
            }
        }
    }
}
