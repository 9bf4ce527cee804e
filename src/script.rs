//! Headless script execution against a browse session.
//!
//! Script files drive the engine the way a user would drive the views and
//! check the observable state after each step:
//!
//! ```text
//! # drill into cars and filter by price
//! category:1
//! subcategory:10
//! price:100..500
//! assert:path:1,10,-
//! assert:url:/category/1?subcategory=10&max_price=500&min_price=100
//! assert:count:4
//! ```
//!
//! One command per line; `#` starts a comment. Failed assertions are
//! collected, not fatal, so a report covers the whole script.

use std::path::Path;

use crate::command::{Assertion, Command};
use crate::error::{BrowseError, Result};
use crate::filters::FacetValue;
use crate::session::{BrowseEvent, BrowseSession};
use crate::snapshot::SessionSnapshot;

/// What executing one command did
#[derive(Debug, Clone, Default)]
pub struct CommandEffect {
    pub changed: bool,
    pub output: Option<String>,
    pub quit: bool,
}

/// Execute a single driver command against a session.
///
/// Returns an error for commands that cannot be applied (a facet value the
/// key rejects); assertions are handled by the script runner, not here.
pub fn apply_command(session: &mut BrowseSession, command: &Command) -> Result<CommandEffect> {
    let mut effect = CommandEffect::default();

    match command {
        Command::SelectCategory(id) => {
            effect.changed = session.apply(BrowseEvent::SelectCategory(*id));
        }
        Command::SelectSubcategory(id) => {
            effect.changed = session.apply(BrowseEvent::SelectSubcategory(*id));
        }
        Command::SelectChildCategory(id) => {
            effect.changed = session.apply(BrowseEvent::SelectChildCategory(*id));
        }
        Command::ResetSelection => {
            effect.changed = session.apply(BrowseEvent::ResetSelection);
        }
        Command::SetFacet { key, value } => {
            let parsed = FacetValue::parse_for_key(key, value).ok_or_else(|| {
                BrowseError::Script(format!("facet '{}' rejects value '{}'", key, value))
            })?;
            effect.changed = session.apply(BrowseEvent::SetFacet {
                key: key.clone(),
                value: Some(parsed),
            });
        }
        Command::UnsetFacet { key } => {
            effect.changed = session.apply(BrowseEvent::SetFacet {
                key: key.clone(),
                value: None,
            });
        }
        Command::ToggleFacet { key, value } => {
            let parsed = FacetValue::parse_for_key(key, value).ok_or_else(|| {
                BrowseError::Script(format!("facet '{}' rejects value '{}'", key, value))
            })?;
            effect.changed = session.apply(BrowseEvent::ToggleFacet {
                key: key.clone(),
                value: parsed,
            });
        }
        Command::PriceRange { min, max } => {
            effect.changed = session.apply(BrowseEvent::PriceRange {
                min: *min,
                max: *max,
            });
        }
        Command::ClearFilters => {
            effect.changed = session.apply(BrowseEvent::ClearFilters);
        }
        Command::Navigate(url) => {
            effect.changed = session.apply(BrowseEvent::Navigate(url.clone()));
        }
        Command::ShowState => {
            let snapshot = SessionSnapshot::from_session(session);
            effect.output = Some(serde_json::to_string_pretty(&snapshot)?);
        }
        Command::Quit => {
            effect.quit = true;
        }
        Command::Assert(_) => {
            // Assertions only make sense inside a script run
        }
    }

    Ok(effect)
}

/// Check one assertion against the session's observable state
fn check_assertion(session: &BrowseSession, assertion: &Assertion) -> std::result::Result<(), String> {
    let snapshot = SessionSnapshot::from_session(session);

    let mismatch = |what: &str, expected: &str, actual: &str| {
        Err(format!(
            "{} mismatch: expected '{}', got '{}'",
            what, expected, actual
        ))
    };

    match assertion {
        Assertion::Path(expected) => {
            let actual = snapshot.path_display();
            if &actual != expected {
                return mismatch("path", expected, &actual);
            }
        }
        Assertion::Url(expected) => {
            if &snapshot.url != expected {
                return mismatch("url", expected, &snapshot.url);
            }
        }
        Assertion::Count(expected) => {
            if snapshot.active_filters != *expected {
                return mismatch(
                    "count",
                    &expected.to_string(),
                    &snapshot.active_filters.to_string(),
                );
            }
        }
        Assertion::Query(expected) => {
            if &snapshot.listing_query != expected {
                return mismatch("query", expected, &snapshot.listing_query);
            }
        }
        Assertion::Facet { key, value } => {
            let actual = snapshot
                .filters
                .get(key)
                .map(|v| v.to_string())
                .unwrap_or_default();
            if &actual != value {
                return mismatch(&format!("facet '{}'", key), value, &actual);
            }
        }
    }
    Ok(())
}

/// A parsed script: commands with their source line numbers
#[derive(Debug, Clone)]
pub struct ScriptRunner {
    pub commands: Vec<(usize, Command)>,
}

/// Outcome of one script run
#[derive(Debug, Clone, Default)]
pub struct ScriptReport {
    pub executed: usize,
    pub assertions: usize,
    pub failures: Vec<String>,
}

impl ScriptReport {
    pub fn success(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn print_summary(&self) {
        println!(
            "script: {} commands, {} assertions, {} failures",
            self.executed,
            self.assertions,
            self.failures.len()
        );
        for failure in &self.failures {
            println!("  FAIL {}", failure);
        }
    }
}

impl ScriptRunner {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_string(&content)
    }

    pub fn from_string(content: &str) -> Result<Self> {
        let mut commands = Vec::new();

        for (index, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let command = Command::from_string(line)
                .map_err(|e| BrowseError::Script(format!("line {}: {}", index + 1, e)))?;
            commands.push((index + 1, command));
        }

        Ok(Self { commands })
    }

    /// Run every command in order, collecting assertion failures
    pub fn run(&self, session: &mut BrowseSession) -> ScriptReport {
        let mut report = ScriptReport::default();

        log::info!("running script with {} commands", self.commands.len());

        for (line, command) in &self.commands {
            if let Command::Assert(assertion) = command {
                report.assertions += 1;
                if let Err(message) = check_assertion(session, assertion) {
                    log::warn!("assertion failed at line {}: {}", line, message);
                    report.failures.push(format!("line {}: {}", line, message));
                }
                continue;
            }

            report.executed += 1;
            match apply_command(session, command) {
                Ok(effect) => {
                    if let Some(output) = effect.output {
                        println!("{}", output);
                    }
                    if effect.quit {
                        break;
                    }
                }
                Err(e) => {
                    log::warn!("command failed at line {}: {}", line, e);
                    report.failures.push(format!("line {}: {}", line, e));
                }
            }
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::{Category, CategoryTree, SubCategory};
    use std::sync::Arc;

    fn session() -> BrowseSession {
        let mut vehicles = Category::new(1, "Vehicles");
        let mut cars = SubCategory::new(10, "Cars", 1);
        cars.add_child(SubCategory::new(100, "Sedans", 1));
        vehicles.add_subcategory(cars);
        BrowseSession::new(Arc::new(CategoryTree::new(vec![vehicles])))
    }

    #[test]
    fn test_script_parsing_skips_comments_and_blanks() {
        let runner = ScriptRunner::from_string(
            "# drill down\n\ncategory:1\nsub:10\n\n# check\nassert:path:1,10,-\n",
        )
        .unwrap();
        assert_eq!(runner.commands.len(), 3);
        assert_eq!(runner.commands[0].0, 3); // line numbers survive
    }

    #[test]
    fn test_script_parse_error_names_line() {
        let err = ScriptRunner::from_string("category:1\nbogus\n").unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn test_run_with_passing_assertions() {
        let mut session = session();
        let runner = ScriptRunner::from_string(
            "category:1\nsub:10\nprice:100..500\n\
             assert:path:1,10,-\n\
             assert:url:/category/1?subcategory=10&max_price=500&min_price=100\n\
             assert:count:4\n",
        )
        .unwrap();

        let report = runner.run(&mut session);
        assert!(report.success(), "failures: {:?}", report.failures);
        assert_eq!(report.executed, 3);
        assert_eq!(report.assertions, 3);
    }

    #[test]
    fn test_run_collects_failures() {
        let mut session = session();
        let runner = ScriptRunner::from_string(
            "category:1\nassert:path:2,-,-\nassert:count:1\n",
        )
        .unwrap();

        let report = runner.run(&mut session);
        assert!(!report.success());
        assert_eq!(report.failures.len(), 1);
        assert!(report.failures[0].contains("line 2"));
    }

    #[test]
    fn test_facet_assertion_and_absence() {
        let mut session = session();
        let runner = ScriptRunner::from_string(
            "toggle:condition=new\n\
             assert:facet:condition=new\n\
             toggle:condition=new\n\
             assert:facet:condition=\n",
        )
        .unwrap();

        let report = runner.run(&mut session);
        assert!(report.success(), "failures: {:?}", report.failures);
    }

    #[test]
    fn test_invalid_facet_value_is_reported() {
        let mut session = session();
        let runner = ScriptRunner::from_string("facet:condition=mint\n").unwrap();
        let report = runner.run(&mut session);
        assert_eq!(report.failures.len(), 1);
        assert!(report.failures[0].contains("rejects value"));
    }

    #[test]
    fn test_quit_stops_execution() {
        let mut session = session();
        let runner = ScriptRunner::from_string("category:1\nquit\ncategory:2\n").unwrap();
        let report = runner.run(&mut session);
        assert_eq!(report.executed, 2);
        assert_eq!(
            session.selection().category_id,
            Some(1)
        );
    }
}
