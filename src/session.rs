//! 트랜잭션 컨텍스트의 binlog 슬롯
//!
//! 세션/트랜잭션 기계가 소유하는 상태 중 binlog 쓰기 경로가 사용하는
//! 부분만 정의합니다. 커밋 머신은 여기서 BinlogInfo를 꺼내 플러시합니다.

use crate::ddl::add_version_comment;
use crate::events::{BinlogEvent, PrewriteValue};
use crate::relay_client::RelayClient;
use crate::writer::BinlogInfo;
use std::sync::Arc;
use tracing::debug;

/// 트랜잭션 단위 binlog 상태
#[derive(Default)]
pub struct TxnContext {
    /// 트랜잭션 시작 시점의 스키마 버전
    pub schema_version: i64,
    prewrite: Option<PrewriteValue>,
    binlog_info: Option<BinlogInfo>,
}

impl TxnContext {
    pub fn new(schema_version: i64) -> Self {
        TxnContext {
            schema_version,
            ..Default::default()
        }
    }

    /// Prewrite 값 조회
    ///
    /// create_if_absent면 현재 스키마 버전으로 새로 만듭니다. DML 실행
    /// 경로가 변경 내용을 여기에 누적합니다.
    pub fn prewrite_value(&mut self, create_if_absent: bool) -> Option<&mut PrewriteValue> {
        if self.prewrite.is_none() && create_if_absent {
            self.prewrite = Some(PrewriteValue::new(self.schema_version));
        }
        self.prewrite.as_mut()
    }

    /// 누적된 Prewrite 값 꺼내기 (커밋 시 Prewrite 이벤트로 변환)
    pub fn take_prewrite_value(&mut self) -> Option<PrewriteValue> {
        self.prewrite.take()
    }

    /// 커밋 머신이 플러시할 BinlogInfo 저장
    pub fn set_binlog_info(&mut self, info: BinlogInfo) {
        self.binlog_info = Some(info);
    }

    pub fn binlog_info(&self) -> Option<&BinlogInfo> {
        self.binlog_info.as_ref()
    }

    /// BinlogInfo 꺼내기 (슬롯은 비워짐)
    pub fn take_binlog_info(&mut self) -> Option<BinlogInfo> {
        self.binlog_info.take()
    }

    /// DDL binlog 슬롯 설정
    ///
    /// 클라이언트가 없으면 아무것도 하지 않습니다. 쿼리는 버전 게이트
    /// 주석 처리를 거친 뒤 저장됩니다.
    pub fn set_ddl_binlog(
        &mut self,
        client: Option<Arc<dyn RelayClient>>,
        job_id: i64,
        ddl_query: &str,
    ) {
        let client = match client {
            Some(client) => client,
            None => return,
        };

        let annotated = add_version_comment(ddl_query);
        debug!("Set DDL binlog, job id: {}", job_id);
        self.binlog_info = Some(BinlogInfo::new(
            BinlogEvent::ddl(job_id, annotated),
            Some(client),
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ddl::SPECIAL_COMMENT_PREFIX;
    use crate::relay_client::MemoryRelayClient;

    #[test]
    fn test_prewrite_value_create_if_absent() {
        let mut txn = TxnContext::new(42);
        assert!(txn.prewrite_value(false).is_none());

        let value = txn.prewrite_value(true).unwrap();
        assert_eq!(value.schema_version, 42);

        // 이미 있으면 그대로 반환
        value.mutation_mut(1);
        assert_eq!(txn.prewrite_value(true).unwrap().mutations.len(), 1);
    }

    #[test]
    fn test_take_prewrite_value_empties_slot() {
        let mut txn = TxnContext::new(1);
        txn.prewrite_value(true);
        assert!(txn.take_prewrite_value().is_some());
        assert!(txn.prewrite_value(false).is_none());
    }

    #[test]
    fn test_set_ddl_binlog_without_client_is_noop() {
        let mut txn = TxnContext::new(1);
        txn.set_ddl_binlog(None, 7, "ALTER TABLE t SHARD_ROW_ID_BITS=4");
        assert!(txn.binlog_info().is_none());
    }

    #[test]
    fn test_set_ddl_binlog_annotates_query() {
        let mut txn = TxnContext::new(1);
        let client: Arc<dyn RelayClient> = Arc::new(MemoryRelayClient::new());
        txn.set_ddl_binlog(Some(client), 7, "ALTER TABLE t SHARD_ROW_ID_BITS=4");

        let info = txn.take_binlog_info().unwrap();
        assert_eq!(info.event.ddl_job_id, Some(7));
        let query = info.event.ddl_query.unwrap();
        assert!(query.contains(SPECIAL_COMMENT_PREFIX));
        assert!(info.client.is_some());

        // 슬롯은 비워짐
        assert!(txn.binlog_info().is_none());
    }
}
