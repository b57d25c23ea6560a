//! End-to-end scenarios over the typed AST.

use indoc::indoc;
use questsql_encoder::{
    parse_one, AlignMode, CreateTableSource, Expression, Statement,
};

#[test]
fn select_with_where_round_trips() {
    let stmt = parse_one("SELECT * FROM trades WHERE symbol = 'BTC-USD'").unwrap();
    let Statement::Select(select) = &stmt else {
        panic!("expected a select, got {stmt:?}");
    };
    assert!(!select.implicit);
    assert_eq!(select.columns.len(), 1);
    assert_eq!(select.from.len(), 1);
    assert!(select.where_clause.is_some());
    assert_eq!(
        stmt.to_string(),
        "SELECT * FROM trades WHERE symbol = 'BTC-USD'"
    );
}

#[test]
fn sample_by_carries_fill_and_alignment() {
    let stmt =
        parse_one("SELECT avg(price) FROM trades SAMPLE BY 1h FILL(PREV) ALIGN TO CALENDAR")
            .unwrap();
    let Statement::Select(select) = stmt else {
        panic!("expected a select");
    };
    let sample_by = select.sample_by.expect("sample by present");
    assert_eq!(sample_by.duration, "1h");
    assert_eq!(sample_by.fill, vec!["PREV".to_string()]);
    let align_to = sample_by.align_to.expect("alignment present");
    assert_eq!(align_to.mode, AlignMode::Calendar);
    assert_eq!(align_to.time_zone, None);
}

#[test]
fn create_table_collects_every_clause() {
    let stmt = parse_one(indoc! {"
        CREATE TABLE t (ts TIMESTAMP, p DOUBLE)
        TIMESTAMP(ts) PARTITION BY DAY WAL
        DEDUP UPSERT KEYS(ts) TTL 30 DAYS
    "})
    .unwrap();
    let Statement::CreateTable(create) = stmt else {
        panic!("expected create table");
    };
    assert_eq!(create.table.to_string(), "t");
    assert_eq!(create.timestamp.as_deref(), Some("ts"));
    assert_eq!(create.partition_by.as_deref(), Some("DAY"));
    assert_eq!(create.wal, Some(true));
    assert_eq!(create.dedup_keys, vec!["ts".to_string()]);
    let ttl = create.ttl.as_ref().expect("ttl present");
    assert_eq!(ttl.value, "30");
    assert_eq!(ttl.unit.as_deref(), Some("DAYS"));
    let CreateTableSource::Columns(columns) = &create.source else {
        panic!("expected explicit columns");
    };
    assert_eq!(columns.len(), 2);
    assert_eq!(columns[0].name, "ts");
    assert_eq!(columns[0].type_name, "TIMESTAMP");
}

#[test]
fn resume_wal_keeps_both_spellings() {
    for spelling in ["TXN", "TRANSACTION"] {
        let sql = format!("ALTER TABLE trades RESUME WAL FROM {spelling} 42");
        let stmt = parse_one(&sql).unwrap();
        assert_eq!(stmt.to_string(), sql);
    }
}

#[test]
fn implicit_select_keeps_its_shape() {
    let stmt = parse_one("trades WHERE price > 0").unwrap();
    let Statement::Select(select) = &stmt else {
        panic!("expected a select");
    };
    assert!(select.implicit);
    assert_eq!(select.from.len(), 1);
    assert!(select.columns.is_empty());
    assert_eq!(stmt.to_string(), "trades WHERE price > 0");
}

#[test]
fn cte_names_reach_the_ast() {
    let stmt =
        parse_one("WITH recent AS (SELECT * FROM trades LIMIT 100) SELECT symbol FROM recent")
            .unwrap();
    let Statement::Select(select) = stmt else {
        panic!("expected a select");
    };
    assert_eq!(select.with.len(), 1);
    assert_eq!(select.with[0].name, "recent");
    assert!(select.with[0].select.limit.is_some());
}

#[test]
fn partial_ast_comes_back_with_errors() {
    let result = questsql_encoder::parse_to_ast("SELECT a FROM t; SELECT FROM ; SELECT b FROM u");
    assert!(!result.errors.is_empty());
    // The two well-formed statements still convert.
    assert!(result.ast.len() >= 2);
}

#[test]
fn function_star_excludes_args() {
    let stmt = parse_one("SELECT count(*) FROM trades").unwrap();
    let Statement::Select(select) = stmt else {
        panic!("expected a select");
    };
    let Expression::FunctionCall(call) = &select.columns[0].expr else {
        panic!("expected a function call");
    };
    assert!(call.star);
    assert!(call.args.is_empty());
}
