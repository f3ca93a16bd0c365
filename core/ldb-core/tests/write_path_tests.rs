// Write path integration tests
//
// 행 쓰기 → 세션 배치 → 락 해제 커밋 → 포인트 조회 종단 간 검증

mod common;

use common::{engine, key_of, make_row, schema};
use ldb_core::{ExternalLock, LdbError, TableOps};
use proptest::prelude::*;

// ─── Helpers ────────────────────────────────────────────

/// Run `body` inside one write-lock scope and commit at release.
fn locked<F>(handler: &mut ldb_core::TableHandler, session: &mut ldb_core::Session, body: F)
where
    F: FnOnce(&mut ldb_core::TableHandler, &mut ldb_core::Session),
{
    handler.external_lock(session, ExternalLock::Write).unwrap();
    body(handler, session);
    handler.external_lock(session, ExternalLock::Unlock).unwrap();
}

// ─── Round trip ─────────────────────────────────────────

#[test]
fn write_then_lookup_returns_row() {
    let (_dir, engine) = engine();
    let mut handler = engine.handler();
    handler.create("t1", &schema()).unwrap();
    handler.open("t1", &schema()).unwrap();
    let mut session = engine.new_session();

    let row = make_row("alice", b"likes tea");
    locked(&mut handler, &mut session, |h, s| h.write_row(s, &row).unwrap());

    assert_eq!(handler.point_lookup(&key_of("alice")).unwrap(), row);
    handler.close().unwrap();
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn any_row_round_trips(
        name in "[a-z]{1,16}",
        payload in proptest::collection::vec(any::<u8>(), 0..47),
    ) {
        let (_dir, engine) = engine();
        let mut handler = engine.handler();
        handler.create("t1", &schema()).unwrap();
        handler.open("t1", &schema()).unwrap();
        let mut session = engine.new_session();

        let row = make_row(&name, &payload);
        locked(&mut handler, &mut session, |h, s| h.write_row(s, &row).unwrap());

        prop_assert_eq!(handler.point_lookup(&key_of(&name)).unwrap(), row);
        handler.close().unwrap();
    }
}

#[test]
fn rows_survive_reopen() {
    let (_dir, engine) = engine();
    let mut handler = engine.handler();
    handler.create("t1", &schema()).unwrap();
    handler.open("t1", &schema()).unwrap();
    let mut session = engine.new_session();

    let rows: Vec<Vec<u8>> = (0..20)
        .map(|i| make_row(&format!("user{i:02}"), &[i as u8; 40]))
        .collect();
    locked(&mut handler, &mut session, |h, s| {
        for row in &rows {
            h.write_row(s, row).unwrap();
        }
    });
    handler.close().unwrap();
    assert!(engine.registry().is_empty());

    handler.open("t1", &schema()).unwrap();
    for (i, row) in rows.iter().enumerate() {
        assert_eq!(handler.point_lookup(&key_of(&format!("user{i:02}"))).unwrap(), *row);
    }
    handler.close().unwrap();
}

// ─── Update / delete ────────────────────────────────────

#[test]
fn update_with_key_change_moves_row() {
    let (_dir, engine) = engine();
    let mut handler = engine.handler();
    handler.create("t1", &schema()).unwrap();
    handler.open("t1", &schema()).unwrap();
    let mut session = engine.new_session();

    let old = make_row("k1", b"v1");
    let new = make_row("k2", b"v2");
    locked(&mut handler, &mut session, |h, s| h.write_row(s, &old).unwrap());
    locked(&mut handler, &mut session, |h, s| h.update_row(s, &old, &new).unwrap());

    assert!(matches!(handler.point_lookup(&key_of("k1")), Err(LdbError::NotFound)));
    assert_eq!(handler.point_lookup(&key_of("k2")).unwrap(), new);
    handler.close().unwrap();
}

#[test]
fn update_with_same_key_replaces_row() {
    let (_dir, engine) = engine();
    let mut handler = engine.handler();
    handler.create("t1", &schema()).unwrap();
    handler.open("t1", &schema()).unwrap();
    let mut session = engine.new_session();

    let old = make_row("k1", b"before");
    let new = make_row("k1", b"after");
    locked(&mut handler, &mut session, |h, s| {
        h.write_row(s, &old).unwrap();
        h.update_row(s, &old, &new).unwrap();
    });

    assert_eq!(handler.point_lookup(&key_of("k1")).unwrap(), new);
    handler.close().unwrap();
}

#[test]
fn delete_removes_row() {
    let (_dir, engine) = engine();
    let mut handler = engine.handler();
    handler.create("t1", &schema()).unwrap();
    handler.open("t1", &schema()).unwrap();
    let mut session = engine.new_session();

    let row = make_row("gone", b"soon");
    locked(&mut handler, &mut session, |h, s| h.write_row(s, &row).unwrap());
    locked(&mut handler, &mut session, |h, s| h.delete_row(s, &row).unwrap());

    let err = handler.point_lookup(&key_of("gone")).unwrap_err();
    assert!(matches!(err, LdbError::NotFound));
    assert_eq!(err.handler_code(), ldb_core::error::codes::HA_ERR_END_OF_FILE);
    handler.close().unwrap();
}

#[test]
fn later_operations_in_batch_win() {
    let (_dir, engine) = engine();
    let mut handler = engine.handler();
    handler.create("t1", &schema()).unwrap();
    handler.open("t1", &schema()).unwrap();
    let mut session = engine.new_session();

    let first = make_row("k", b"first");
    let second = make_row("k", b"second");
    let doomed = make_row("d", b"doomed");
    locked(&mut handler, &mut session, |h, s| {
        h.write_row(s, &first).unwrap();
        h.write_row(s, &second).unwrap();
        h.write_row(s, &doomed).unwrap();
        h.delete_row(s, &doomed).unwrap();
    });

    assert_eq!(handler.point_lookup(&key_of("k")).unwrap(), second);
    assert!(matches!(handler.point_lookup(&key_of("d")), Err(LdbError::NotFound)));
    handler.close().unwrap();
}

// ─── Visibility ─────────────────────────────────────────

#[test]
fn uncommitted_writes_are_invisible() {
    let (_dir, engine) = engine();
    let mut handler = engine.handler();
    handler.create("t1", &schema()).unwrap();
    handler.open("t1", &schema()).unwrap();
    let mut session = engine.new_session();

    let row = make_row("pending", b"x");
    handler.external_lock(&mut session, ExternalLock::Write).unwrap();
    handler.write_row(&mut session, &row).unwrap();

    // not even the writing session sees its own batch
    assert!(matches!(handler.point_lookup(&key_of("pending")), Err(LdbError::NotFound)));

    handler.external_lock(&mut session, ExternalLock::Unlock).unwrap();
    assert_eq!(handler.point_lookup(&key_of("pending")).unwrap(), row);
    handler.close().unwrap();
}

#[test]
fn compression_setting_does_not_strand_rows() {
    let (_dir, engine) = engine();
    let mut handler = engine.handler();
    handler.create("t1", &schema()).unwrap();
    handler.open("t1", &schema()).unwrap();
    let mut session = engine.new_session();

    let zeros = make_row("zeros", &[0u8; 40]);
    locked(&mut handler, &mut session, |h, s| h.write_row(s, &zeros).unwrap());

    engine.variables().set("ldb_compression", "none").unwrap();
    let plain = make_row("plain", &[7u8; 40]);
    locked(&mut handler, &mut session, |h, s| h.write_row(s, &plain).unwrap());

    assert_eq!(handler.point_lookup(&key_of("zeros")).unwrap(), zeros);
    assert_eq!(handler.point_lookup(&key_of("plain")).unwrap(), plain);
    handler.close().unwrap();
}

#[test]
fn status_counts_commits_and_lookups() {
    let (_dir, engine) = engine();
    let mut handler = engine.handler();
    handler.create("t1", &schema()).unwrap();
    handler.open("t1", &schema()).unwrap();
    let mut session = engine.new_session();

    locked(&mut handler, &mut session, |h, s| {
        h.write_row(s, &make_row("a", b"1")).unwrap();
        h.write_row(s, &make_row("b", b"2")).unwrap();
    });
    handler.point_lookup(&key_of("a")).unwrap();
    let _ = handler.point_lookup(&key_of("zz"));

    let lines = engine.show_status();
    let value = |name: &str| lines.iter().find(|(n, _)| n == name).map(|(_, v)| *v);
    assert_eq!(value("ldb_store_opens"), Some(1));
    assert_eq!(value("ldb.t1.commits"), Some(1));
    assert_eq!(value("ldb.t1.rows_put"), Some(2));
    assert_eq!(value("ldb.t1.lookups"), Some(2));
    assert_eq!(value("ldb.t1.lookup_misses"), Some(1));
    handler.close().unwrap();
}
