//! Binlog 이벤트 타입 및 데이터 구조 정의

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Binlog 이벤트 타입
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinlogEventType {
    /// 트랜잭션 prewrite (DML 변경 내용 포함)
    Prewrite,
    /// 트랜잭션 커밋
    Commit,
    /// 트랜잭션 롤백
    Rollback,
    /// DDL 실행 전
    PreDdl,
    /// DDL 실행 후
    PostDdl,
}

impl BinlogEventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BinlogEventType::Prewrite => "Prewrite",
            BinlogEventType::Commit => "Commit",
            BinlogEventType::Rollback => "Rollback",
            BinlogEventType::PreDdl => "PreDDL",
            BinlogEventType::PostDdl => "PostDDL",
        }
    }
}

/// 테이블 단위 변경 내용
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableMutation {
    /// 테이블 ID
    pub table_id: i64,
    /// 삽입된 행들 (인코딩된 바이트)
    pub inserted_rows: Vec<Bytes>,
    /// 수정된 행들
    pub updated_rows: Vec<Bytes>,
    /// 삭제된 행들
    pub deleted_rows: Vec<Bytes>,
}

impl TableMutation {
    pub fn new(table_id: i64) -> Self {
        TableMutation {
            table_id,
            ..Default::default()
        }
    }
}

/// Prewrite 시점의 변경 내용 묶음
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PrewriteValue {
    /// 트랜잭션 시작 시점의 스키마 버전
    pub schema_version: i64,
    /// 테이블별 변경 내용
    pub mutations: Vec<TableMutation>,
}

impl PrewriteValue {
    pub fn new(schema_version: i64) -> Self {
        PrewriteValue {
            schema_version,
            ..Default::default()
        }
    }

    /// 테이블 변경 내용 참조 (없으면 새 항목 추가)
    pub fn mutation_mut(&mut self, table_id: i64) -> &mut TableMutation {
        let idx = match self.mutations.iter().position(|m| m.table_id == table_id) {
            Some(idx) => idx,
            None => {
                self.mutations.push(TableMutation::new(table_id));
                self.mutations.len() - 1
            }
        };
        &mut self.mutations[idx]
    }
}

/// 완성된 Binlog 이벤트
///
/// 커밋/DDL 시점에 만들어져 쓰기 조정자가 한 번 소비하고 버립니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BinlogEvent {
    /// 이벤트 타입
    pub tp: BinlogEventType,
    /// 트랜잭션 시작 타임스탬프 (TSO)
    pub start_ts: i64,
    /// 커밋 타임스탬프 (Commit 이벤트만 사용)
    pub commit_ts: i64,
    /// DDL job ID (DDL 이벤트만 사용)
    pub ddl_job_id: Option<i64>,
    /// DDL 쿼리 원문 (DDL 이벤트만 사용)
    pub ddl_query: Option<String>,
    /// Prewrite 변경 내용 (Prewrite 이벤트만 사용)
    pub prewrite_value: Option<PrewriteValue>,
}

impl BinlogEvent {
    pub fn prewrite(start_ts: i64, value: PrewriteValue) -> Self {
        BinlogEvent {
            tp: BinlogEventType::Prewrite,
            start_ts,
            commit_ts: 0,
            ddl_job_id: None,
            ddl_query: None,
            prewrite_value: Some(value),
        }
    }

    pub fn commit(start_ts: i64, commit_ts: i64) -> Self {
        BinlogEvent {
            tp: BinlogEventType::Commit,
            start_ts,
            commit_ts,
            ddl_job_id: None,
            ddl_query: None,
            prewrite_value: None,
        }
    }

    pub fn rollback(start_ts: i64) -> Self {
        BinlogEvent {
            tp: BinlogEventType::Rollback,
            start_ts,
            commit_ts: 0,
            ddl_job_id: None,
            ddl_query: None,
            prewrite_value: None,
        }
    }

    /// DDL 이벤트 생성
    ///
    /// start_ts는 커밋 머신이 플러시 직전에 채웁니다.
    pub fn ddl(job_id: i64, ddl_query: impl Into<String>) -> Self {
        BinlogEvent {
            tp: BinlogEventType::Prewrite,
            start_ts: 0,
            commit_ts: 0,
            ddl_job_id: Some(job_id),
            ddl_query: Some(ddl_query.into()),
            prewrite_value: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_type_as_str() {
        assert_eq!(BinlogEventType::Prewrite.as_str(), "Prewrite");
        assert_eq!(BinlogEventType::PreDdl.as_str(), "PreDDL");
    }

    #[test]
    fn test_mutation_mut_reuses_entry() {
        let mut value = PrewriteValue::new(5);
        value.mutation_mut(42).inserted_rows.push(Bytes::from_static(b"r1"));
        value.mutation_mut(42).deleted_rows.push(Bytes::from_static(b"r2"));
        value.mutation_mut(7).inserted_rows.push(Bytes::from_static(b"r3"));

        assert_eq!(value.mutations.len(), 2);
        assert_eq!(value.mutations[0].table_id, 42);
        assert_eq!(value.mutations[0].inserted_rows.len(), 1);
        assert_eq!(value.mutations[0].deleted_rows.len(), 1);
    }

    #[test]
    fn test_ddl_event() {
        let event = BinlogEvent::ddl(7, "ALTER TABLE t ADD COLUMN c INT");
        assert_eq!(event.tp, BinlogEventType::Prewrite);
        assert_eq!(event.ddl_job_id, Some(7));
        assert!(event.ddl_query.is_some());
        assert_eq!(event.start_ts, 0);
    }
}
