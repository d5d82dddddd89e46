//! Validate command implementation

use anyhow::Result;
use sf_core::SourceLocation;
use sf_db::{DbError, RecordStore};

use crate::cli::{GlobalArgs, ValidateArgs};
use crate::commands::common::{ExitCode, ProjectContext};

/// Validation result severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Severity {
    Warning,
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Warning => write!(f, "WARNING"),
            Severity::Error => write!(f, "ERROR"),
        }
    }
}

/// A single validation issue
struct ValidationIssue {
    severity: Severity,
    code: &'static str,
    message: String,
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}: {}", self.severity, self.code, self.message)
    }
}

/// Collect validation issues
#[derive(Default)]
struct ValidationContext {
    issues: Vec<ValidationIssue>,
}

impl ValidationContext {
    fn error(&mut self, code: &'static str, message: impl Into<String>) {
        self.issues.push(ValidationIssue {
            severity: Severity::Error,
            code,
            message: message.into(),
        });
    }

    fn warning(&mut self, code: &'static str, message: impl Into<String>) {
        self.issues.push(ValidationIssue {
            severity: Severity::Warning,
            code,
            message: message.into(),
        });
    }

    fn count(&self, severity: Severity) -> usize {
        self.issues.iter().filter(|i| i.severity == severity).count()
    }
}

/// Execute the validate command
pub(crate) async fn execute(args: &ValidateArgs, global: &GlobalArgs) -> Result<()> {
    let project = ProjectContext::load(global)?;
    println!("Validating pipeline: {}\n", project.config.name);

    let mut ctx = ValidationContext::default();
    validate_source_location(&project, &mut ctx);
    validate_store(&project, &mut ctx).await;
    if args.source {
        validate_extract(&project, &mut ctx).await;
    }

    for issue in &ctx.issues {
        println!("{}", issue);
    }

    let errors = ctx.count(Severity::Error);
    let warnings = ctx.count(Severity::Warning);
    println!(
        "\nValidation finished: {} error(s), {} warning(s)",
        errors, warnings
    );
    if errors > 0 {
        return Err(ExitCode(1).into());
    }
    Ok(())
}

fn validate_source_location(project: &ProjectContext, ctx: &mut ValidationContext) {
    match project.config.source_location(&project.root) {
        SourceLocation::Path(path) if !path.is_file() => {
            ctx.error("V001", format!("source file {} does not exist", path.display()));
        }
        SourceLocation::Url(url) if !url.starts_with("http://") && !url.starts_with("https://") => {
            ctx.error("V002", format!("source url '{}' is not http(s)", url));
        }
        location => println!("  source: {}", location),
    }
}

/// The stored table, if present, must match the derived schema exactly.
async fn validate_store(project: &ProjectContext, ctx: &mut ValidationContext) {
    let store = match project.connector().and_then(|c| c.open().map_err(Into::into)) {
        Ok(store) => store,
        Err(e) => {
            ctx.error("V003", format!("cannot open database: {:#}", e));
            return;
        }
    };
    println!(
        "  database: {} {}#{}",
        store.db_type(),
        project.database_path(),
        store.table()
    );

    let schema = match project.pipeline() {
        Ok(pipeline) => pipeline.schema().clone(),
        Err(e) => {
            ctx.error("V004", format!("{:#}", e));
            return;
        }
    };

    match store.table_exists().await {
        Ok(false) => ctx.warning(
            "V005",
            format!(
                "table {} does not exist yet; the next run creates it",
                store.table()
            ),
        ),
        Ok(true) => match store.read_snapshot(&schema).await {
            Ok(snapshot) => println!("  table: {} records", snapshot.len()),
            Err(DbError::SchemaMismatch { message, .. }) => ctx.error(
                "V006",
                format!("table {} does not match the record schema: {}", store.table(), message),
            ),
            Err(e) => ctx.error("V007", e.to_string()),
        },
        Err(e) => ctx.error("V003", format!("cannot inspect database: {}", e)),
    }
}

async fn validate_extract(project: &ProjectContext, ctx: &mut ValidationContext) {
    let pipeline = match project.pipeline() {
        Ok(pipeline) => pipeline,
        Err(e) => {
            ctx.error("V004", format!("{:#}", e));
            return;
        }
    };
    match pipeline.run().await {
        Ok(dataset) => match dataset.index_by_id() {
            Ok(_) => println!("  extract: {} records", dataset.len()),
            Err(e) => ctx.error("V008", e.to_string()),
        },
        Err(e) => ctx.error("V009", e.to_string()),
    }
}

#[cfg(test)]
#[path = "validate_test.rs"]
mod tests;
