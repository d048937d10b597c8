//! 공유 relay 클라이언트 핸들
//!
//! 프로세스 전체에서 하나의 클라이언트를 모든 writer가 공유합니다.
//! 읽기는 read lock, 교체는 write lock으로 보호하고, 교체는 항상
//! 통째로 이루어집니다 (제자리 수정 없음).

use crate::endpoints::parse_endpoints;
use crate::relay_client::{RelayClient, RelayClientConfig, RelayClientFactory};
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{debug, error, info};

/// 공유 relay 클라이언트 핸들
#[derive(Default)]
pub struct RelayClientHandle {
    client: RwLock<Option<Arc<dyn RelayClient>>>,
}

impl RelayClientHandle {
    pub fn new() -> Self {
        RelayClientHandle {
            client: RwLock::new(None),
        }
    }

    /// 현재 공유 클라이언트 반환 (없으면 None)
    pub fn get(&self) -> Option<Arc<dyn RelayClient>> {
        self.client.read().clone()
    }

    /// 공유 클라이언트 교체
    ///
    /// 이전 클라이언트는 여기서 닫지 않습니다 (소유자 책임).
    pub fn set(&self, client: Arc<dyn RelayClient>) {
        info!("Replacing shared relay client");
        *self.client.write() = Some(client);
    }

    /// 클라이언트가 없으면 주소 목록으로 생성해서 공유 슬롯에 저장
    ///
    /// 주소 검증이나 생성 실패는 로그만 남기고 None을 반환합니다. 커밋
    /// 경로가 설정 문제로 패닉하지 않아야 하기 때문입니다. 동시 호출이
    /// 중복 생성할 수 있지만, 슬롯은 write lock 아래에서 다시 확인하므로
    /// 승자는 하나이고 이후 get()은 모두 같은 클라이언트를 봅니다.
    pub async fn get_or_create(
        &self,
        addrs: &str,
        config: &RelayClientConfig,
        factory: &dyn RelayClientFactory,
    ) -> Option<Arc<dyn RelayClient>> {
        if let Some(client) = self.get() {
            return Some(client);
        }

        let endpoints = match parse_endpoints(addrs) {
            Ok(endpoints) => endpoints,
            Err(e) => {
                error!("Invalid relay address list {:?}: {}", addrs, e);
                return None;
            }
        };

        // write lock을 잡은 채 await하지 않는다
        let created = match factory.create(&endpoints, config).await {
            Ok(client) => client,
            Err(e) => {
                error!("Failed to create relay client: {}", e);
                return None;
            }
        };

        let mut slot = self.client.write();
        if let Some(existing) = slot.as_ref() {
            debug!("Another writer installed the relay client first");
            return Some(existing.clone());
        }
        *slot = Some(created.clone());
        info!("Shared relay client initialized");
        Some(created)
    }
}
