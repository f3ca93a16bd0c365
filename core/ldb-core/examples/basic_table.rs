//! 기본 테이블 작업 예제
//!
//! 실행: cargo run --example basic_table --features logging

use ldb_core::{
    Engine, EngineConfig, ExternalLock, KeyPart, KeyType, LdbResult, LockMode, SqlCommand,
    StatementContext, TableOps, TableSchema,
};

const RECORD_LENGTH: usize = 32;

/// [len][name: 12 bytes][city: 19 bytes]
fn row(name: &str, city: &str) -> Vec<u8> {
    let mut row = vec![0u8; RECORD_LENGTH];
    row[0] = name.len() as u8;
    row[1..1 + name.len()].copy_from_slice(name.as_bytes());
    row[13..13 + city.len()].copy_from_slice(city.as_bytes());
    row
}

fn key(name: &str) -> Vec<u8> {
    let mut key = vec![0u8; 12];
    key[..name.len()].copy_from_slice(name.as_bytes());
    key
}

fn city(row: &[u8]) -> String {
    String::from_utf8_lossy(&row[13..]).trim_end_matches('\0').to_string()
}

fn main() -> LdbResult<()> {
    ldb_core::logging::init();
    println!("=== LDB 기본 테이블 예제 ===\n");

    // 1. 엔진 초기화
    let dir = tempfile::tempdir()?;
    let engine = Engine::init(EngineConfig::new(dir.path()).apply_env()?)?;
    println!("1. 엔진 초기화: {}", dir.path().display());

    // 2. 테이블 생성 / 열기
    let schema = TableSchema::single_key(RECORD_LENGTH, KeyPart::new("name", 0, 12, KeyType::VarText1));
    let mut handler = engine.handler();
    handler.create("people", &schema)?;
    handler.open("people", &schema)?;
    println!("2. 테이블 'people' 생성 및 열기 완료");

    // 3. 락 협상 + 쓰기 (락 해제 시 커밋)
    let mut session = engine.new_session();
    let granted = handler.store_lock(LockMode::Write, &StatementContext::new(SqlCommand::Insert));
    println!("3. 요청 {:?} → 부여 {:?}", LockMode::Write, granted);

    handler.external_lock(&mut session, ExternalLock::Write)?;
    handler.write_row(&mut session, &row("alice", "Seoul"))?;
    handler.write_row(&mut session, &row("bob", "Busan"))?;
    handler.update_row(&mut session, &row("bob", "Busan"), &row("bob", "Incheon"))?;
    handler.delete_row(&mut session, &row("alice", "Seoul"))?;
    handler.external_lock(&mut session, ExternalLock::Unlock)?;
    println!("   ✓ 배치 커밋 완료");

    // 4. 조회
    println!("4. 조회...");
    println!("   bob → {}", city(&handler.point_lookup(&key("bob"))?));
    match handler.point_lookup(&key("alice")) {
        Err(e) => println!("   alice → {e} (handler code {})", e.handler_code()),
        Ok(row) => println!("   alice → {}", city(&row)),
    }

    // 5. 상태
    println!("5. 엔진 상태");
    for (name, value) in engine.show_status() {
        println!("   {name} = {value}");
    }

    handler.close()?;
    engine.shutdown()?;
    println!("\n=== 예제 완료 ===");
    Ok(())
}
