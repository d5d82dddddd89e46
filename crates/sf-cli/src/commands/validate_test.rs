use super::*;
use sf_core::{Config, Dataset, Field, FieldType, Schema};
use sf_db::DuckDbStore;
use std::sync::Arc;
use tempfile::TempDir;

fn project(dir: &TempDir, source: &str) -> ProjectContext {
    let yaml = format!(
        "name: titanic\nsource:\n  path: {}\ndatabase:\n  path: titanic.duckdb\n",
        source
    );
    ProjectContext {
        root: dir.path().to_path_buf(),
        config: Config::from_yaml(&yaml).unwrap(),
    }
}

fn codes(ctx: &ValidationContext) -> Vec<&'static str> {
    ctx.issues.iter().map(|i| i.code).collect()
}

#[test]
fn test_missing_source_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    let project = project(&dir, "missing.csv");

    let mut ctx = ValidationContext::default();
    validate_source_location(&project, &mut ctx);
    assert_eq!(codes(&ctx), vec!["V001"]);
    assert_eq!(ctx.count(Severity::Error), 1);
}

#[tokio::test]
async fn test_missing_table_is_a_warning() {
    let dir = TempDir::new().unwrap();
    let project = project(&dir, "titanic.csv");

    let mut ctx = ValidationContext::default();
    validate_store(&project, &mut ctx).await;
    assert_eq!(codes(&ctx), vec!["V005"]);
    assert_eq!(ctx.count(Severity::Error), 0);
}

#[tokio::test]
async fn test_drifted_table_is_an_error() {
    let dir = TempDir::new().unwrap();
    let project = project(&dir, "titanic.csv");

    {
        let store = DuckDbStore::from_path(&dir.path().join("titanic.duckdb"), "titanic").unwrap();
        let narrow = Arc::new(
            Schema::new(
                vec![Field::required("PassengerId", FieldType::Integer)],
                "PassengerId",
            )
            .unwrap(),
        );
        store.create_and_load(&Dataset::empty(narrow)).await.unwrap();
    }

    let mut ctx = ValidationContext::default();
    validate_store(&project, &mut ctx).await;
    assert_eq!(codes(&ctx), vec!["V006"]);
}
