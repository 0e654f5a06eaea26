//! Runner Sequence Tests
//!
//! Compiled checks driven through a scripted store:
//! - Statements run strictly in order, teardown last
//! - Output rows become issues stamped with the check's class handle
//! - A failing check does not stop the others

use std::collections::HashMap;

use geocheck::check::parse_check;
use geocheck::planner::{compile, CompiledCheck};
use geocheck::runner::{
    CheckRunner, ClassRegistry, FeatureRef, Issue, MemoryClassRegistry, ResultRow, RunError,
    RunResult, StatementExecutor,
};

// =============================================================================
// Helper Functions
// =============================================================================

/// Store double: records statements, answers SELECTs on a stage with rows,
/// fails any statement mentioning a poisoned relation.
#[derive(Default)]
struct ScriptedStore {
    executed: Vec<String>,
    rows: HashMap<String, Vec<ResultRow>>,
    poisoned: Option<String>,
}

impl StatementExecutor for ScriptedStore {
    fn execute(
        &mut self,
        sql: &str,
        on_row: Option<&mut dyn FnMut(&ResultRow) -> RunResult<()>>,
    ) -> RunResult<()> {
        self.executed.push(sql.trim().to_string());

        if let Some(poison) = &self.poisoned {
            if sql.contains(poison.as_str()) && !sql.starts_with("DROP") {
                return Err(RunError::Store(format!("relation {} is broken", poison)));
            }
        }

        if let Some(on_row) = on_row {
            for (source, rows) in &self.rows {
                if sql.contains(&format!("FROM {} AS el", source)) {
                    for row in rows {
                        on_row(row)?;
                    }
                }
            }
        }
        Ok(())
    }
}

/// Registry double counting registrations
#[derive(Default)]
struct CountingRegistry {
    inner: MemoryClassRegistry,
    calls: usize,
}

impl ClassRegistry for CountingRegistry {
    fn register_class(
        &mut self,
        item: &str,
        level: &str,
        tags: &[String],
        title: &str,
    ) -> geocheck::runner::ClassHandle {
        self.calls += 1;
        self.inner.register_class(item, level, tags, title)
    }
}

fn check(id: &str, sink: &str, obj: &str, geom: &str, from: &str) -> CompiledCheck {
    let text = format!(
        "<analyser>
           <class><id>{id}</id><item>90{id}</item><level>1</level><title>Check {id}</title></class>
           <requests>
             <request>
               <name>tagged_{id}</name><obj>{obj}</obj><geom>{geom}</geom><from>{from}</from>
               <filter><has_tag>amenity</has_tag></filter>
             </request>
             <request>
               <name>{sink}</name><obj>{obj}</obj><geom>{geom}</geom><from>tagged_{id}</from>
               <filter><has_not_tag>name</has_not_tag></filter>
             </request>
           </requests>
         </analyser>",
        id = id,
        sink = sink,
        obj = obj,
        geom = geom,
        from = from,
    );
    compile(&parse_check(&text).unwrap()).unwrap()
}

// =============================================================================
// Sequencing Tests
// =============================================================================

#[test]
fn test_statements_run_in_order() {
    let checks = vec![check("1", "unnamed", "node", "point", "nodes")];
    let mut registry = MemoryClassRegistry::new();
    let runner = CheckRunner::new(&checks, &mut registry);
    let mut store = ScriptedStore::default();

    runner.run_check("1", &mut store, &mut |_| {}).unwrap();

    assert_eq!(store.executed.len(), 3);
    assert!(store.executed[0].starts_with("CREATE TEMP TABLE tagged_1 AS"));
    assert!(store.executed[1].starts_with("SELECT DISTINCT"));
    assert!(store.executed[1].contains("FROM tagged_1 AS el"));
    assert_eq!(store.executed[2], "DROP TABLE IF EXISTS tagged_1;");
}

#[test]
fn test_rows_become_issues() {
    let checks = vec![
        check("1", "unnamed_nodes", "node", "point", "nodes"),
        check("2", "unnamed_ways", "way", "linestring", "ways_linestring"),
    ];
    let mut registry = MemoryClassRegistry::new();
    let runner = CheckRunner::new(&checks, &mut registry);

    let mut store = ScriptedStore::default();
    store.rows.insert(
        "tagged_1".into(),
        vec![
            ResultRow::from_values(["10", "POINT(1 1)"]),
            ResultRow::from_values(["11", "POINT(2 2)"]),
        ],
    );
    store
        .rows
        .insert("tagged_2".into(), vec![ResultRow::from_values(["77"])]);

    let mut issues: Vec<Issue> = Vec::new();
    let summary = runner.run_all(&mut store, &mut |issue| issues.push(issue));

    assert!(summary.failed.is_empty());
    assert_eq!(
        summary.completed,
        [("1".to_string(), 2), ("2".to_string(), 1)]
    );
    assert_eq!(summary.issue_count(), 3);

    assert_eq!(issues[0].check_id, "1");
    assert_eq!(
        issues[1].feature,
        FeatureRef::Node {
            id: 11,
            position: "POINT(2 2)".into()
        }
    );
    assert_eq!(issues[2].feature, FeatureRef::Way { id: 77 });
    assert_eq!(issues[2].class, runner.handle("2").unwrap());
    assert_eq!(registry.get(issues[2].class).unwrap().item, "902");
}

// =============================================================================
// Isolation Tests
// =============================================================================

#[test]
fn test_failing_check_does_not_stop_others() {
    let checks = vec![
        check("1", "first", "node", "point", "nodes"),
        check("2", "second", "way", "polygon", "ways_bbox"),
        check("3", "third", "node", "point", "nodes"),
    ];
    let mut registry = MemoryClassRegistry::new();
    let runner = CheckRunner::new(&checks, &mut registry);

    let mut store = ScriptedStore {
        poisoned: Some("tagged_2".into()),
        ..Default::default()
    };
    store
        .rows
        .insert("tagged_3".into(), vec![ResultRow::from_values(["5", "POINT(0 0)"])]);

    let mut issues = Vec::new();
    let summary = runner.run_all(&mut store, &mut |issue| issues.push(issue));

    let completed: Vec<&str> = summary.completed.iter().map(|(id, _)| id.as_str()).collect();
    assert_eq!(completed, ["1", "3"]);
    assert_eq!(summary.failed.len(), 1);
    assert_eq!(summary.failed[0].0, "2");
    assert!(matches!(summary.failed[0].1, RunError::Store(_)));

    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].check_id, "3");

    // The failed check still dropped what it materialized
    assert!(store
        .executed
        .contains(&"DROP TABLE IF EXISTS tagged_2;".to_string()));
}

#[test]
fn test_one_registration_per_check() {
    let checks = vec![
        check("1", "a", "node", "point", "nodes"),
        check("2", "b", "node", "point", "nodes"),
        check("3", "c", "relation", "polygon", "relations_polygon"),
    ];
    let mut registry = CountingRegistry::default();
    let runner = CheckRunner::new(&checks, &mut registry);

    let mut store = ScriptedStore::default();
    runner.run_all(&mut store, &mut |_| {});
    runner.run_all(&mut store, &mut |_| {});

    assert_eq!(registry.calls, 3);
    assert_eq!(registry.inner.len(), 3);
}

#[test]
fn test_relations_polygon_setup_runs_first_and_drops_last() {
    let checks = vec![check("4", "rels", "relation", "polygon", "relations_polygon")];
    let mut registry = MemoryClassRegistry::new();
    let runner = CheckRunner::new(&checks, &mut registry);
    let mut store = ScriptedStore::default();

    runner.run_check("4", &mut store, &mut |_| {}).unwrap();

    assert!(store.executed[0].starts_with("CREATE TEMP TABLE relations_polygon"));
    assert_eq!(
        store.executed.last().map(String::as_str),
        Some("DROP TABLE IF EXISTS relations_polygon;")
    );
}
