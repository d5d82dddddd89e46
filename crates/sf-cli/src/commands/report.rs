//! Report command implementation

use anyhow::{Context, Result};
use serde::Serialize;
use sf_db::sql::{quote_ident, quote_qualified};
use sf_db::RecordStore;

use crate::cli::{GlobalArgs, OutputFormat, ReportArgs};
use crate::commands::common::{self, ExitCode, ProjectContext};

/// One aggregate query and its result rows
#[derive(Debug, Serialize)]
struct ReportSection {
    title: String,
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

/// Execute the report command
pub(crate) async fn execute(args: &ReportArgs, global: &GlobalArgs) -> Result<()> {
    let ctx = ProjectContext::load(global)?;
    common::init_logging(&ctx, global.verbose)?;

    let table = &ctx.config.database.table;
    let store = ctx.connector()?.open().context("Failed to open database")?;
    if !store.table_exists().await? {
        eprintln!("Table {} does not exist yet; run `syncflow run` first", table);
        return Err(ExitCode(1).into());
    }

    let mut sections = Vec::new();
    for (title, sql) in report_queries(table) {
        let (columns, rows) = store
            .query_rows(&sql)
            .with_context(|| format!("Failed to compute '{}'", title))?;
        sections.push(ReportSection {
            title: title.to_string(),
            columns,
            rows,
        });
    }

    match args.output {
        OutputFormat::Json => common::print_json(&sections)?,
        OutputFormat::Text => {
            for (i, section) in sections.iter().enumerate() {
                if i > 0 {
                    println!();
                }
                println!("{}:", section.title);
                let headers: Vec<&str> = section.columns.iter().map(String::as_str).collect();
                common::print_table(&headers, &section.rows);
            }
        }
    }
    Ok(())
}

/// Survival rate by sex, passenger class, and age group
fn report_queries(table: &str) -> Vec<(&'static str, String)> {
    let from = quote_qualified(table);
    let survived = quote_ident("Survived");
    let rate = format!("ROUND(AVG({}), 2) AS {}", survived, quote_ident("SurvivalRate"));

    let by_column = |column: &str| {
        let col = quote_ident(column);
        format!(
            "SELECT {col}, {rate} FROM {from} GROUP BY {col} ORDER BY {col}",
            col = col,
            rate = rate,
            from = from
        )
    };

    let age = quote_ident("Age");
    let group = quote_ident("AgeGroup");
    let by_age = format!(
        "SELECT CASE \
             WHEN {age} < 12 THEN 'Child' \
             WHEN {age} < 18 THEN 'Teenager' \
             WHEN {age} < 35 THEN 'Adult' \
             WHEN {age} < 60 THEN 'Middle Aged' \
             ELSE 'Senior' END AS {group}, {rate} \
         FROM {from} GROUP BY {group} ORDER BY MIN(COALESCE({age}, 1000))",
        age = age,
        group = group,
        rate = rate,
        from = from
    );

    vec![
        ("Survival Rate by Gender", by_column("Sex")),
        ("Survival Rate by Passenger Class", by_column("Pclass")),
        ("Survival Rate by Age Group", by_age),
    ]
}

#[cfg(test)]
#[path = "report_test.rs"]
mod tests;
