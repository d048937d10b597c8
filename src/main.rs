/// Binlog relay 쓰기 경로 사용 예제
///
/// 인메모리 relay 클라이언트로 DML 트랜잭션과 DDL의 복제 경로를
/// 끝까지 구동합니다.
use binlog_relay::config::BinlogConfig;
use binlog_relay::events::BinlogEvent;
use binlog_relay::relay_client::MemoryRelayFactory;
use binlog_relay::session::TxnContext;
use binlog_relay::writer::{BinlogInfo, BinlogRelay};
use bytes::Bytes;
use std::env;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 로깅 초기화
    tracing_subscriber::fmt::init();

    let mut config = BinlogConfig::new(
        env::var("RELAY_ADDRS").unwrap_or_else(|_| "127.0.0.1:8250".to_string()),
    );
    config.ignore_error = env::var("RELAY_IGNORE_ERROR")
        .map(|v| v == "1")
        .unwrap_or(false);

    if !config.should_enable_binlog(None) {
        warn!("Binlog replication disabled");
        return Ok(());
    }

    info!("Starting binlog relay demo, addrs: {}", config.addrs);

    let relay = BinlogRelay::new(config.ignore_error);
    let factory = MemoryRelayFactory::new();

    // 첫 사용 시점에 공유 클라이언트 지연 생성
    let client = relay
        .handle()
        .get_or_create(&config.addrs, &config.client_config(), &factory)
        .await;
    if client.is_none() {
        warn!("Relay client unavailable, binlog writes will fail");
    }

    // DML 트랜잭션: prewrite + commit
    let mut txn = TxnContext::new(100);
    if let Some(value) = txn.prewrite_value(true) {
        value
            .mutation_mut(42)
            .inserted_rows
            .push(Bytes::from_static(b"row-1"));
    }

    if let Some(value) = txn.take_prewrite_value() {
        let start_ts = 405_000;
        relay
            .write(&BinlogInfo::new(
                BinlogEvent::prewrite(start_ts, value),
                client.clone(),
            ))
            .await?;
        relay
            .write(&BinlogInfo::new(
                BinlogEvent::commit(start_ts, start_ts + 1),
                client.clone(),
            ))
            .await?;
        info!("DML transaction replicated, start ts: {}", start_ts);
    }

    // DDL: 주석 처리 후 슬롯에 저장, 커밋 머신이 꺼내 플러시
    let mut ddl_txn = TxnContext::new(101);
    ddl_txn.set_ddl_binlog(client.clone(), 7, "ALTER TABLE t SHARD_ROW_ID_BITS=4");
    if let Some(ddl_info) = ddl_txn.take_binlog_info() {
        info!("DDL query rewritten: {:?}", ddl_info.event.ddl_query);
        relay.write(&ddl_info).await?;
    }

    info!("Relay status: {}", relay.status().to_json());

    Ok(())
}

#[cfg(test)]
mod integration_tests {
    use super::*;

    /// 전체 쓰기 경로 통합 테스트 (인메모리 relay 사용)
    #[tokio::test]
    async fn test_full_write_path() {
        let config = BinlogConfig::new("127.0.0.1:8250,127.0.0.1:8251");
        let relay = BinlogRelay::new(config.ignore_error);
        let factory = MemoryRelayFactory::new();

        let client = relay
            .handle()
            .get_or_create(&config.addrs, &config.client_config(), &factory)
            .await;
        assert!(client.is_some());

        let mut txn = TxnContext::new(1);
        txn.set_ddl_binlog(client.clone(), 3, "CREATE TABLE t (a INT) SHARD_ROW_ID_BITS=2");
        let ddl_info = txn.take_binlog_info().unwrap();
        relay.write(&ddl_info).await.unwrap();

        relay
            .write(&BinlogInfo::new(BinlogEvent::commit(10, 11), client))
            .await
            .unwrap();

        assert_eq!(relay.critical_errors(), 0);
        assert!(!relay.breaker().is_open());
    }
}
