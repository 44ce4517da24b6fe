// Copyright 2025 Stoolap Contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Session Tests
//!
//! End-to-end command sequences executed through the DSL.

use std::sync::Arc;

use colstore::{shared_database, Config, Error, QueryResult, Response, Session, SharedDatabase};
use tempfile::tempdir;

fn new_session() -> Session {
    Session::new(shared_database(None), Arc::new(Config::default().with_btree_order(4)))
}

fn run(session: &mut Session, lines: &[&str]) {
    for line in lines {
        if let Err(e) = session.execute_dsl(line) {
            panic!("{} failed: {}", line, e);
        }
    }
}

fn tuple(session: &mut Session, line: &str) -> Vec<QueryResult> {
    match session.execute_dsl(line).unwrap() {
        Response::Tuple(columns) => columns,
        other => panic!("expected a tuple, got {:?}", other),
    }
}

fn ints(session: &Session, name: &str) -> Vec<i32> {
    let result = session.catalog().get(name).unwrap();
    result.as_ints().unwrap().to_vec()
}

/// db1.grades(id, score) holding ids 0..10 and scores id * 10 % 70
fn grades(session: &mut Session) {
    run(
        session,
        &[
            r#"create(db,"db1")"#,
            r#"create(tbl,"grades",db1,2)"#,
            r#"create(col,"id",db1.grades,unsorted)"#,
            r#"create(col,"score",db1.grades,unsorted)"#,
        ],
    );
    for id in 0..10 {
        session
            .execute_dsl(&format!("relational_insert(db1.grades,{},{})", id, id * 10 % 70))
            .unwrap();
    }
}

#[test]
fn test_select_fetch_tuple() {
    let mut session = new_session();
    grades(&mut session);
    run(
        &mut session,
        &[
            "-- ids in [3, 6)",
            "s1=select(db1.grades.id,3,6)",
            "f1=fetch(db1.grades.score,s1)",
        ],
    );
    assert_eq!(ints(&session, "s1"), vec![3, 4, 5]);
    assert_eq!(
        tuple(&mut session, "tuple(s1,f1)"),
        vec![QueryResult::Int(vec![3, 4, 5]), QueryResult::Int(vec![30, 40, 50])]
    );
}

#[test]
fn test_select_over_result() {
    let mut session = new_session();
    grades(&mut session);
    run(
        &mut session,
        &[
            "s1=select(db1.grades.id,null,8)",
            "f1=fetch(db1.grades.score,s1)",
            "s2=select(s1,f1,20,null)",
        ],
    );
    // scores of ids 0..8 are 0,10,..,60,0
    assert_eq!(ints(&session, "s2"), vec![2, 3, 4, 5, 6]);
}

#[test]
fn test_aggregates_and_arithmetic() {
    let mut session = new_session();
    grades(&mut session);
    run(
        &mut session,
        &[
            "s=select(db1.grades.id,1,5)",
            "ids=fetch(db1.grades.id,s)",
            "scores=fetch(db1.grades.score,s)",
            "lo=min(scores)",
            "hi=max(scores)",
            "n=count(scores)",
            "mean=avg(scores)",
            "total=add(ids,scores)",
            "diff=sub(ids,scores)",
        ],
    );
    assert_eq!(tuple(&mut session, "tuple(lo)"), vec![QueryResult::Int(vec![10])]);
    assert_eq!(tuple(&mut session, "tuple(hi)"), vec![QueryResult::Int(vec![40])]);
    assert_eq!(tuple(&mut session, "tuple(n)"), vec![QueryResult::Int(vec![4])]);
    assert_eq!(tuple(&mut session, "tuple(mean)"), vec![QueryResult::LongDouble(vec![25.0])]);
    assert_eq!(
        tuple(&mut session, "tuple(total,diff)"),
        vec![
            QueryResult::Long(vec![11, 22, 33, 44]),
            QueryResult::Long(vec![-9, -18, -27, -36])
        ]
    );
    // Int promoted to Long alongside a Long result
    assert_eq!(
        tuple(&mut session, "tuple(ids,total)"),
        vec![QueryResult::Long(vec![1, 2, 3, 4]), QueryResult::Long(vec![11, 22, 33, 44])]
    );
}

#[test]
fn test_column_operand() {
    let mut session = new_session();
    grades(&mut session);
    run(&mut session, &["n=count(db1.grades.score)", "m=max(db1.grades.score)"]);
    assert_eq!(
        tuple(&mut session, "tuple(n,m)"),
        vec![QueryResult::Int(vec![10]), QueryResult::Int(vec![60])]
    );
}

#[test]
fn test_join_through_dsl() {
    let mut session = new_session();
    grades(&mut session);
    run(
        &mut session,
        &[
            r#"create(tbl,"bonus",db1,2)"#,
            r#"create(col,"score",db1.bonus,unsorted)"#,
            r#"create(col,"points",db1.bonus,unsorted)"#,
            "relational_insert(db1.bonus,10,1)",
            "relational_insert(db1.bonus,60,2)",
            "relational_insert(db1.bonus,99,3)",
            "s1=select(db1.grades.id,null,null)",
            "f1=fetch(db1.grades.score,s1)",
            "s2=select(db1.bonus.score,null,null)",
            "f2=fetch(db1.bonus.score,s2)",
        ],
    );
    for strategy in ["", ",nested-loop", ",hash", ",radix"] {
        let line = format!("p1,p2=join(f1,s1,f2,s2{})", strategy);
        run(&mut session, &[line.as_str()]);
    }
    run(&mut session, &["q1,q2=hashjoin(f1,s1,f2,s2)"]);
    let mut pairs: Vec<(i32, i32)> = ints(&session, "q1")
        .into_iter()
        .zip(ints(&session, "q2"))
        .collect();
    pairs.sort_unstable();
    // score 10 at ids 1 and 8, score 60 at id 6
    assert_eq!(pairs, vec![(1, 0), (6, 1), (8, 0)]);
}

#[test]
fn test_leading_column_and_indexes() {
    let mut session = new_session();
    run(
        &mut session,
        &[
            r#"create(db,"db1")"#,
            r#"create(tbl,"t",db1,2)"#,
            r#"create(col,"k",db1.t,sorted)"#,
            r#"create(col,"v",db1.t,unsorted)"#,
            "create(idx,db1.t.v,btree)",
            "relational_insert(db1.t,30,3)",
            "relational_insert(db1.t,10,1)",
            "relational_insert(db1.t,20,2)",
            "s=select(db1.t.k,10,30)",
            "f=fetch(db1.t.v,s)",
            "sv=select(db1.t.v,2,4)",
        ],
    );
    assert_eq!(ints(&session, "s"), vec![0, 1]);
    assert_eq!(ints(&session, "f"), vec![1, 2]);
    let mut sv = ints(&session, "sv");
    sv.sort_unstable();
    assert_eq!(sv, vec![1, 2]);
    assert!(matches!(
        session.execute_dsl("create(idx,db1.t.v,sorted)"),
        Err(Error::IndexAlreadyExists(_))
    ));
}

#[test]
fn test_bulk_load() {
    let mut session = new_session();
    run(
        &mut session,
        &[
            r#"create(db,"db1")"#,
            r#"create(tbl,"t",db1,2)"#,
            r#"create(col,"a",db1.t,sorted)"#,
            r#"create(col,"b",db1.t,unsorted)"#,
        ],
    );
    // header order differs from the schema order
    session
        .load("db1.t.b,db1.t.a", &[vec![100, 3], vec![200, 1], vec![300, 2]])
        .unwrap();
    run(&mut session, &["s=select(db1.t.a,null,null)", "f=fetch(db1.t.b,s)"]);
    assert_eq!(ints(&session, "f"), vec![200, 300, 100]);

    assert!(session.load("db1.t.a,db1.x.b", &[vec![1, 2]]).is_err());
    assert!(session.load("db1.t.a", &[vec![1]]).is_err());
}

#[test]
fn test_shared_scan_batches_linear_selects() {
    let mut session = new_session();
    grades(&mut session);
    run(
        &mut session,
        &[
            "shared",
            "s1=select(db1.grades.score,0,25)",
            "s2=select(db1.grades.score,50,null)",
        ],
    );
    assert!(session.is_batching());
    assert!(!session.catalog().contains("s1"));

    // referencing a queued target flushes the batch
    run(&mut session, &["f1=fetch(db1.grades.id,s1)"]);
    assert_eq!(ints(&session, "s1"), vec![0, 1, 2, 7, 8, 9]);
    assert_eq!(ints(&session, "s2"), vec![5, 6]);

    run(&mut session, &["s3=select(db1.grades.score,60,61)", "shared"]);
    assert!(!session.is_batching());
    assert_eq!(ints(&session, "s3"), vec![6]);
}

#[test]
fn test_first_definition_wins() {
    let mut session = new_session();
    grades(&mut session);
    run(&mut session, &["s=select(db1.grades.id,0,2)", "s=select(db1.grades.id,5,10)"]);
    assert_eq!(ints(&session, "s"), vec![0, 1]);
    assert_eq!(session.catalog().len(), 2);
}

#[test]
fn test_errors() {
    let mut session = new_session();
    assert!(matches!(
        session.execute_dsl(r#"create(tbl,"t",db1,1)"#),
        Err(Error::DatabaseNotFound)
    ));
    grades(&mut session);
    assert!(matches!(
        session.execute_dsl(r#"create(db,"db1")"#),
        Err(Error::DatabaseAlreadyExists(_))
    ));
    assert!(matches!(session.execute_dsl("x=min(nothing)"), Err(Error::VariableNotFound(_))));
    assert!(matches!(
        session.execute_dsl("s=select(db1.grades.nope,0,1)"),
        Err(Error::ColumnNotFound(_))
    ));
    assert!(matches!(session.execute_dsl("bogus(1)"), Err(Error::Parse(_))));
    assert!(matches!(
        session.execute_dsl("relational_insert(db1.grades,1)"),
        Err(Error::ColumnCountMismatch { .. })
    ));

    run(&mut session, &["e=select(db1.grades.id,100,200)", "fe=fetch(db1.grades.score,e)"]);
    assert!(matches!(session.execute_dsl("m=min(fe)"), Err(Error::EmptyInput(_))));
    run(&mut session, &["c=count(fe)"]);
    assert_eq!(ints(&session, "c"), vec![0]);

    run(&mut session, &["a=select(db1.grades.id,0,3)", "b=select(db1.grades.id,0,4)"]);
    assert!(matches!(session.execute_dsl("tuple(a,b)"), Err(Error::LengthMismatch { .. })));
    assert!(matches!(session.execute_dsl("d=add(a,b)"), Err(Error::LengthMismatch { .. })));
}

#[test]
fn test_sessions_share_database_not_catalog() {
    let db: SharedDatabase = shared_database(None);
    let config = Arc::new(Config::default());
    let mut first = Session::new(Arc::clone(&db), Arc::clone(&config));
    let mut second = Session::new(db, config);
    grades(&mut first);
    run(&mut first, &["s=select(db1.grades.id,0,1)"]);

    assert!(matches!(second.execute_dsl("n=count(s)"), Err(Error::VariableNotFound(_))));
    run(&mut second, &["n=count(db1.grades.id)"]);
    assert_eq!(ints(&second, "n"), vec![10]);
}

#[test]
fn test_shutdown_writes_snapshot() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("db.txt");
    let config = Arc::new(Config::default().with_snapshot_path(&path));
    let mut session = Session::new(shared_database(None), config);
    grades(&mut session);
    assert_eq!(session.execute_dsl("shutdown").unwrap(), Response::Shutdown);

    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.starts_with("db1\n1\ngrades\n2\nid\nnone\nnone\n10\n0\n1\n"));
}

fn two_sessions() -> (Session, Session) {
    let db: SharedDatabase = shared_database(None);
    let config = Arc::new(Config::default().with_btree_order(4));
    (
        Session::new(Arc::clone(&db), Arc::clone(&config)),
        Session::new(db, config),
    )
}

#[test]
fn test_queued_select_ignores_later_inserts() {
    let (mut a, mut b) = two_sessions();
    run(
        &mut a,
        &[
            r#"create(db,"db1")"#,
            r#"create(tbl,"t",db1,1)"#,
            r#"create(col,"c",db1.t,unsorted)"#,
            "relational_insert(db1.t,3)",
            "now=select(db1.t.c,0,10)",
            "shared",
            "queued=select(db1.t.c,0,10)",
        ],
    );
    run(&mut b, &["relational_insert(db1.t,7)"]);
    run(&mut a, &["shared"]);
    assert_eq!(ints(&a, "now"), vec![0]);
    assert_eq!(ints(&a, "queued"), vec![0]);

    run(&mut a, &["after=select(db1.t.c,0,10)"]);
    assert_eq!(ints(&a, "after"), vec![0, 1]);
}

/// db1.lt(k sorted, v unsorted) holding (1, 10) and (5, 50)
fn leading_table(session: &mut Session) {
    run(
        session,
        &[
            r#"create(db,"db1")"#,
            r#"create(tbl,"lt",db1,2)"#,
            r#"create(col,"k",db1.lt,sorted)"#,
            r#"create(col,"v",db1.lt,unsorted)"#,
            "relational_insert(db1.lt,5,50)",
            "relational_insert(db1.lt,1,10)",
        ],
    );
}

#[test]
fn test_batch_flushes_before_reorganizing() {
    let (mut a, mut b) = two_sessions();
    leading_table(&mut a);
    run(&mut a, &["shared", "q=select(db1.lt.v,0,100)"]);
    run(&mut b, &["relational_insert(db1.lt,0,0)"]);

    // reading the table would re-sort the new row in front of the queued rows
    run(&mut a, &["n=count(db1.lt.k)"]);
    assert_eq!(ints(&a, "q"), vec![0, 1]);
    assert_eq!(ints(&a, "n"), vec![3]);
    run(&mut a, &["shared"]);
}

#[test]
fn test_batch_rejected_after_foreign_reorganize() {
    let (mut a, mut b) = two_sessions();
    leading_table(&mut a);
    run(&mut a, &["shared", "q=select(db1.lt.v,0,100)"]);
    run(&mut b, &["relational_insert(db1.lt,0,0)", "n=count(db1.lt.k)"]);

    let err = a.execute_dsl("shared").unwrap_err();
    assert!(err.is_invalid_argument(), "{}", err);
    assert!(!a.is_batching());
    assert!(!a.catalog().contains("q"));

    run(&mut a, &["q2=select(db1.lt.v,0,100)"]);
    assert_eq!(ints(&a, "q2"), vec![0, 1, 2]);
}
