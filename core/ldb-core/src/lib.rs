//! # LDB — Single-Key Row Tables on an Embedded Ordered KV Store
//!
//! LDB는 관계형 쿼리 실행기의 행(row) 기반 테이블 인터페이스를
//! 임베디드 정렬 키-값 저장소(sled)에 연결하는 스토리지 엔진 어댑터입니다.
//! 테이블마다 하나의 유니크 단일 컬럼 키만 지원하는 의도적으로 좁은 어댑터입니다.
//!
//! ## 주요 특징
//!
//! - **테이블 핸들 레지스트리**: 테이블 이름당 하나의 저장소 인스턴스, 참조 카운트 공유
//! - **락 기반 배치 트랜잭션**: 락 획득 시 트랜잭션 생성, 해제 시 원자적 배치 커밋
//! - **키 코덱**: 행 버퍼에서 키 컬럼 바이트 추출 (가변 길이 접두사 제거)
//! - **값 코덱**: 1바이트 태그 + raw/zstd 본문
//!
//! ## 빠른 시작
//!
//! ```rust
//! use ldb_core::{Engine, EngineConfig, ExternalLock, KeyPart, KeyType, TableOps, TableSchema};
//!
//! # fn main() -> ldb_core::LdbResult<()> {
//! let dir = tempfile::tempdir()?;
//! let engine = Engine::init(EngineConfig::new(dir.path()))?;
//!
//! // 키: 0번 바이트부터 4바이트
//! let schema = TableSchema::single_key(12, KeyPart::new("id", 0, 4, KeyType::Binary));
//! let mut handler = engine.handler();
//! handler.create("orders", &schema)?;
//! handler.open("orders", &schema)?;
//!
//! // 락 획득 → 쓰기 → 락 해제(커밋)
//! let mut session = engine.new_session();
//! handler.external_lock(&mut session, ExternalLock::Write)?;
//! handler.write_row(&mut session, b"0001payload1")?;
//! handler.external_lock(&mut session, ExternalLock::Unlock)?;
//!
//! assert_eq!(handler.point_lookup(b"0001")?, b"0001payload1".to_vec());
//! handler.close()?;
//! # Ok(())
//! # }
//! ```
//!
//! ## 쓰기 경로
//!
//! ```text
//! executor → TableHandler → key codec → session Transaction (batch)
//!          → lock release → TableHandle → sled apply_batch (atomic)
//! ```
//!
//! ## 모듈 구조
//!
//! - [`engine`] — 엔진 수명 주기, 레지스트리, 핸들러 ([`Engine`], [`TableOps`])
//! - [`storage`] — 키/값 코덱, 배치, sled 바인딩
//! - [`transaction`] — 락 협상, 세션별 트랜잭션
//! - [`schema`] — 호스트 테이블 정의
//! - [`config`] — 엔진 설정

pub mod config;
pub mod engine;
pub mod error;
pub mod schema;
pub mod storage;
pub mod transaction;

// Logging utilities
pub mod logging;

// Re-export commonly used types
pub use config::{CompressionAlgorithm, CompressionConfig, EngineConfig};
pub use engine::{Engine, FullSurface, TableHandler, TableOps};
pub use error::{LdbError, LdbResult};
pub use schema::{IndexDef, KeyPart, KeyType, TableSchema};
pub use transaction::{ExternalLock, LockMode, Session, SqlCommand, StatementContext};
