//! Check runner
//!
//! Registers one class per compiled check, then drives each check's
//! statements through a [`StatementExecutor`] strictly in order. Rows of the
//! output statement become [`Issue`]s.

use crate::observability::{log_event_with_fields, Event};
use crate::planner::{CompiledCheck, StatementRole};

use super::errors::{RunError, RunResult};
use super::executor::{FeatureRef, Issue, ResultRow, StatementExecutor};
use super::registry::{ClassHandle, ClassRegistry};

/// Outcome of [`CheckRunner::run_all`]
#[derive(Debug, Default)]
pub struct RunSummary {
    /// `(check id, issue count)` of checks that completed, in run order
    pub completed: Vec<(String, usize)>,
    /// Checks that aborted, in run order
    pub failed: Vec<(String, RunError)>,
}

impl RunSummary {
    /// Total issues reported by completed checks
    pub fn issue_count(&self) -> usize {
        self.completed.iter().map(|(_, n)| n).sum()
    }
}

/// Drives compiled checks against a store
pub struct CheckRunner<'a> {
    checks: &'a [CompiledCheck],
    /// Parallel to `checks`
    handles: Vec<ClassHandle>,
    drop_intermediates: bool,
}

impl<'a> CheckRunner<'a> {
    /// Registers every check's class with `registry`, once each
    pub fn new<R: ClassRegistry + ?Sized>(checks: &'a [CompiledCheck], registry: &mut R) -> Self {
        let handles = checks
            .iter()
            .map(|check| {
                let class = &check.class;
                let handle = registry.register_class(&class.item, &class.level, &[], &class.title);
                log_event_with_fields(
                    Event::ClassRegistered,
                    &[
                        ("check", check.id()),
                        ("item", &class.item),
                        ("handle", &handle.raw().to_string()),
                    ],
                );
                handle
            })
            .collect();

        Self {
            checks,
            handles,
            drop_intermediates: true,
        }
    }

    /// Whether relations materialized by a check are dropped after it runs
    pub fn with_drop_intermediates(mut self, drop: bool) -> Self {
        self.drop_intermediates = drop;
        self
    }

    /// Class handle registered for a check
    pub fn handle(&self, check_id: &str) -> Option<ClassHandle> {
        self.position(check_id).map(|idx| self.handles[idx])
    }

    fn position(&self, check_id: &str) -> Option<usize> {
        self.checks.iter().position(|c| c.id() == check_id)
    }

    /// Runs one check, handing each issue to `on_issue`. Returns the issue count.
    pub fn run_check(
        &self,
        check_id: &str,
        executor: &mut dyn StatementExecutor,
        on_issue: &mut dyn FnMut(Issue),
    ) -> RunResult<usize> {
        let idx = self
            .position(check_id)
            .ok_or_else(|| RunError::UnknownCheck(check_id.to_string()))?;
        let check = &self.checks[idx];
        let class = self.handles[idx];

        log_event_with_fields(
            Event::CheckRunBegin,
            &[
                ("check", check.id()),
                ("statements", &check.statements.len().to_string()),
            ],
        );

        let result = Self::run_statements(check, class, executor, on_issue);
        let result = match (result, self.drop_intermediates) {
            (Ok(count), true) => Self::run_teardown(check, executor).map(|_| count),
            (Err(e), true) => {
                // Pipeline error wins over a teardown error
                let _ = Self::run_teardown(check, executor);
                Err(e)
            }
            (result, false) => result,
        };

        match &result {
            Ok(count) => log_event_with_fields(
                Event::CheckRunComplete,
                &[("check", check.id()), ("issues", &count.to_string())],
            ),
            Err(e) => log_event_with_fields(
                Event::CheckRunFailed,
                &[
                    ("check", check.id()),
                    ("code", e.code()),
                    ("reason", &e.to_string()),
                ],
            ),
        }
        result
    }

    fn run_statements(
        check: &CompiledCheck,
        class: ClassHandle,
        executor: &mut dyn StatementExecutor,
        on_issue: &mut dyn FnMut(Issue),
    ) -> RunResult<usize> {
        if check.output().is_none() {
            return Err(RunError::MissingOutput(check.id().to_string()));
        }

        let mut count = 0;
        for statement in &check.statements {
            if statement.role == StatementRole::Output {
                let mut on_row = |row: &ResultRow| -> RunResult<()> {
                    let feature = FeatureRef::from_row(check.result_kind, row)?;
                    on_issue(Issue {
                        check_id: check.id().to_string(),
                        class,
                        feature,
                    });
                    count += 1;
                    Ok(())
                };
                executor.execute(&statement.sql, Some(&mut on_row))?;
            } else {
                executor.execute(&statement.sql, None)?;
            }

            log_event_with_fields(
                Event::StatementExecuted,
                &[
                    ("check", check.id()),
                    ("stage", &statement.stage),
                    ("role", statement.role.as_str()),
                ],
            );
        }
        Ok(count)
    }

    fn run_teardown(check: &CompiledCheck, executor: &mut dyn StatementExecutor) -> RunResult<()> {
        for statement in check.teardown() {
            executor.execute(&statement.sql, None)?;
            log_event_with_fields(
                Event::StatementExecuted,
                &[
                    ("check", check.id()),
                    ("stage", &statement.stage),
                    ("role", statement.role.as_str()),
                ],
            );
        }
        Ok(())
    }

    /// Runs every check in load order. A failing check is recorded and the
    /// rest still run.
    pub fn run_all(
        &self,
        executor: &mut dyn StatementExecutor,
        on_issue: &mut dyn FnMut(Issue),
    ) -> RunSummary {
        let mut summary = RunSummary::default();
        for check in self.checks {
            match self.run_check(check.id(), executor, on_issue) {
                Ok(count) => summary.completed.push((check.id().to_string(), count)),
                Err(e) => summary.failed.push((check.id().to_string(), e)),
            }
        }
        summary
    }
}
