//! Diff command implementation

use anyhow::{Context, Result};
use serde::Serialize;
use sf_core::{changed_fields, FieldChange, RecordId};
use sf_sync::Preview;

use crate::cli::{DiffArgs, GlobalArgs, OutputFormat};
use crate::commands::common::{self, ProjectContext};

/// Pending changes as reported by `syncflow diff`
#[derive(Debug, Serialize)]
struct DiffReport {
    table: String,
    bootstrap: bool,
    records: usize,
    inserted: usize,
    updated: usize,
    deleted: usize,
    insert_ids: Vec<i64>,
    update_ids: Vec<i64>,
    delete_ids: Vec<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    changes: Option<Vec<RecordChanges>>,
}

#[derive(Debug, Serialize)]
struct RecordChanges {
    id: i64,
    fields: Vec<FieldChange>,
}

/// Execute the diff command
pub(crate) async fn execute(args: &DiffArgs, global: &GlobalArgs) -> Result<()> {
    let ctx = ProjectContext::load(global)?;
    common::init_logging(&ctx, global.verbose)?;

    let coordinator = ctx.coordinator()?;
    let (dataset, preview) = coordinator
        .preview()
        .await
        .context("Failed to compute pending changes")?;

    let report = build_report(&ctx.config.database.table, dataset.len(), &preview, args.fields);
    match args.output {
        OutputFormat::Json => common::print_json(&report)?,
        OutputFormat::Text => print_report(&report, args.limit),
    }
    Ok(())
}

fn ids(ids: impl IntoIterator<Item = RecordId>) -> Vec<i64> {
    ids.into_iter().map(|id| id.0).collect()
}

fn build_report(table: &str, records: usize, preview: &Preview, fields: bool) -> DiffReport {
    let summary = preview.diff.summary();
    let changes = fields.then(|| {
        let schema = preview.snapshot.schema();
        preview
            .diff
            .to_update
            .iter()
            .filter_map(|new| {
                let old = preview.snapshot.get(new.id())?;
                Some(RecordChanges {
                    id: new.id().0,
                    fields: changed_fields(schema, new, old),
                })
            })
            .collect()
    });

    DiffReport {
        table: table.to_string(),
        bootstrap: preview.bootstrap,
        records,
        inserted: summary.inserted,
        updated: summary.updated,
        deleted: summary.deleted,
        insert_ids: ids(preview.diff.insert_ids()),
        update_ids: ids(preview.diff.update_ids()),
        delete_ids: ids(preview.diff.to_delete.iter().copied()),
        changes,
    }
}

fn print_report(report: &DiffReport, limit: usize) {
    if report.bootstrap {
        println!(
            "Table {} does not exist; the next run creates it with {} records",
            report.table, report.records
        );
        return;
    }

    if report.inserted + report.updated + report.deleted == 0 {
        println!("Table {} is up to date ({} records)", report.table, report.records);
        return;
    }

    println!("Pending changes for table {}:", report.table);
    print_ids("insert", &report.insert_ids, limit);
    print_ids("update", &report.update_ids, limit);
    print_ids("delete", &report.delete_ids, limit);

    if let Some(changes) = &report.changes {
        let rows: Vec<Vec<String>> = changes
            .iter()
            .flat_map(|c| {
                c.fields.iter().map(move |f| {
                    vec![
                        c.id.to_string(),
                        f.field.clone(),
                        f.old.to_string(),
                        f.new.to_string(),
                    ]
                })
            })
            .collect();
        if !rows.is_empty() {
            println!();
            common::print_table(&["ID", "FIELD", "OLD", "NEW"], &rows);
        }
    }
}

fn print_ids(label: &str, ids: &[i64], limit: usize) {
    if ids.is_empty() {
        return;
    }
    let shown: Vec<String> = ids.iter().take(limit).map(i64::to_string).collect();
    let more = ids.len().saturating_sub(limit);
    if more > 0 {
        println!("  {} {:>4}: {} (+{} more)", label, ids.len(), shown.join(", "), more);
    } else {
        println!("  {} {:>4}: {}", label, ids.len(), shown.join(", "));
    }
}

#[cfg(test)]
#[path = "diff_test.rs"]
mod tests;
