//! 쓰기 경로 / 포인트 조회 벤치마크
//!
//! 배치 크기별 락 해제 커밋 비용과 압축 유무에 따른 조회 비용 비교

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use ldb_core::{
    Engine, EngineConfig, ExternalLock, KeyPart, KeyType, TableHandler, TableOps, TableSchema,
};
use std::sync::Arc;
use tempfile::{TempDir, tempdir};

const RECORD_LENGTH: usize = 128;

fn schema() -> TableSchema {
    TableSchema::single_key(RECORD_LENGTH, KeyPart::new("id", 0, 8, KeyType::Binary))
}

fn row(id: u64) -> Vec<u8> {
    let mut row = vec![0u8; RECORD_LENGTH];
    row[..8].copy_from_slice(&id.to_be_bytes());
    row[8..16].copy_from_slice(&(id * 31).to_le_bytes());
    row
}

/// 테스트용 엔진 + 열린 테이블
fn setup(compression: &str) -> (TempDir, Arc<Engine>, TableHandler) {
    let dir = tempdir().unwrap();
    let engine = Engine::init(EngineConfig::new(dir.path()).with_sync_writes(false)).unwrap();
    engine.variables().set("ldb_compression", compression).unwrap();
    let mut handler = engine.handler();
    handler.create("bench", &schema()).unwrap();
    handler.open("bench", &schema()).unwrap();
    (dir, engine, handler)
}

fn bench_batch_commit(c: &mut Criterion) {
    let mut group = c.benchmark_group("batch_commit");

    for size in [1u64, 100, 1000].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, &size| {
            let (_dir, engine, mut handler) = setup("zstd");
            let mut session = engine.new_session();
            let mut next = 0u64;

            b.iter(|| {
                handler.external_lock(&mut session, ExternalLock::Write).unwrap();
                for _ in 0..size {
                    handler.write_row(&mut session, black_box(&row(next))).unwrap();
                    next += 1;
                }
                handler.external_lock(&mut session, ExternalLock::Unlock).unwrap();
            });
        });
    }

    group.finish();
}

fn bench_point_lookup(c: &mut Criterion) {
    let mut group = c.benchmark_group("point_lookup");

    for compression in ["none", "zstd"] {
        group.bench_function(compression, |b| {
            let (_dir, engine, mut handler) = setup(compression);
            let mut session = engine.new_session();
            handler.external_lock(&mut session, ExternalLock::Write).unwrap();
            for id in 0..1000 {
                handler.write_row(&mut session, &row(id)).unwrap();
            }
            handler.external_lock(&mut session, ExternalLock::Unlock).unwrap();

            let mut id = 0u64;
            b.iter(|| {
                let key = (id % 1000).to_be_bytes();
                black_box(handler.point_lookup(&key).unwrap());
                id += 1;
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_batch_commit, bench_point_lookup);
criterion_main!(benches);
