use anyhow::Result;
use chrono::NaiveDate;
use member_etl::config::{Config, InputConfig};
use member_etl::pipeline::{FileStatus, Pipeline};
use member_etl::sink::{InMemorySink, Sink};
use member_etl::transform::{FieldKind, FieldSpec, RecordTransformer, Schema};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::tempdir;

fn reference_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
}

fn scenario_schema() -> Schema {
    Schema::new(vec![
        FieldSpec::new("first", "first", FieldKind::Text, true),
        FieldSpec::new("last", "last", FieldKind::Text, true),
        FieldSpec::new("dob", "dob", FieldKind::Date, true),
        FieldSpec::new("salary", "salary", FieldKind::Currency, true),
    ])
}

fn comma_input() -> InputConfig {
    InputConfig {
        delimiter: ',',
        ..InputConfig::default()
    }
}

#[tokio::test]
async fn test_multi_file_run_with_missing_file() -> Result<()> {
    let dir = tempdir()?;
    let good = dir.path().join("members1.csv");
    fs::write(
        &good,
        "first,last,dob,salary\nJohn,Smith,01011990,50000.5\nJane,Doe,31022020,1\nAnn,Lee,15061985,72000\n",
    )?;
    let missing = dir.path().join("does-not-exist.csv");
    let second = dir.path().join("members2.csv");
    fs::write(&second, "first,last,dob,salary\nBob,Stone,02021980,120000\n")?;

    let sink = Arc::new(InMemorySink::new());
    let pipeline = Pipeline::new(
        RecordTransformer::new(scenario_schema(), reference_date()),
        comma_input(),
        sink.clone(),
    );
    let summary = pipeline
        .run_and_close(&[good.clone(), missing.clone(), second.clone()])
        .await;

    assert_eq!(summary.files.len(), 3);
    let first = summary.files[0].result().expect("first file completes");
    assert_eq!((first.attempted, first.accepted, first.rejected), (3, 2, 1));
    assert_eq!(first.rejections[0].row, 2);
    assert_eq!(first.rejections[0].field.as_deref(), Some("dob"));

    assert!(matches!(summary.files[1].status, FileStatus::Failed(_)));
    assert_eq!(summary.files[2].result().map(|r| r.accepted), Some(1));

    assert_eq!(summary.attempted(), 4);
    assert_eq!(summary.accepted(), 3);
    assert!(!summary.is_success(false));

    let docs = sink.documents();
    assert_eq!(docs.len(), 3);
    assert_eq!(
        docs[0],
        serde_json::json!({
            "first": "John",
            "last": "Smith",
            "dob": "1990-01-01",
            "salary_numeric": "50000.5000",
            "salary_display": "$50,000.5000"
        })
    );
    assert_eq!(docs[2]["first"], "Bob");
    Ok(())
}

#[tokio::test]
async fn test_rejections_do_not_fail_run_unless_strict() -> Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("members.csv");
    fs::write(&path, "first,last,dob,salary\nJohn,,01011990,1\nAnn,Lee,15061985,2\n")?;

    let sink: Arc<dyn Sink> = Arc::new(InMemorySink::new());
    let pipeline = Pipeline::new(
        RecordTransformer::new(scenario_schema(), reference_date()),
        comma_input(),
        sink,
    );
    let summary = pipeline.run(&[path]).await;

    assert_eq!(summary.rejected(), 1);
    assert!(summary.is_success(false));
    assert!(!summary.is_success(true));
    Ok(())
}

#[tokio::test]
async fn test_rerun_accepts_same_count() -> Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("members.csv");
    fs::write(
        &path,
        "first,last,dob,salary\nJohn,Smith,01011990,1\nBad,Row,xx,2\nAnn,Lee,15061985,3\n",
    )?;
    let paths: Vec<PathBuf> = vec![path];

    let mut accepted = Vec::new();
    for _ in 0..2 {
        let sink = Arc::new(InMemorySink::new());
        let pipeline = Pipeline::new(
            RecordTransformer::new(scenario_schema(), reference_date()),
            comma_input(),
            sink.clone(),
        );
        let summary = pipeline.run_and_close(&paths).await;
        accepted.push((summary.accepted(), sink.documents()));
    }

    assert_eq!(accepted[0].0, 2);
    assert_eq!(accepted[0], accepted[1]);
    Ok(())
}

#[tokio::test]
async fn test_headerless_member_file_with_default_config() -> Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("member-data.csv");
    fs::write(
        &path,
        concat!(
            "york |Huang|RevenueNSW|1121970|89000.56789|1 George st|Sydney|NSW|2000|0298765432|0404123456|york.huang@mycom.com\n",
            "George|Adam|RevenueNSW|31042021|100|1 George st|Sydney|NSW|2000|0298765432|0404123456|g@mycom.com\n",
            "Too|Few|Fields\n",
            "\"Smith, Jr\"|Anne||29022000|45000|||||||\n",
        ),
    )?;

    let config = Config::from_toml_str("[input]\nhas_headers = false\n")?;
    config.validate()?;
    let sink = Arc::new(InMemorySink::new());
    let pipeline = Pipeline::new(
        RecordTransformer::new(config.schema, config.transform.reference_date),
        config.input,
        sink.clone(),
    );
    let summary = pipeline.run_and_close(&[path]).await;

    let result = summary.files[0].result().expect("file completes");
    assert_eq!(result.attempted, 4);
    assert_eq!(result.accepted, 2);
    assert_eq!(result.rejected, 2);
    assert_eq!(result.rejections[0].field.as_deref(), Some("birth_date"));
    assert_eq!(result.rejections[1].row, 3);

    let docs = sink.documents();
    assert_eq!(docs[0]["full_name"], "York Huang");
    assert_eq!(docs[0]["birth_date"], "1970-12-01");
    assert_eq!(docs[0]["age"], 53);
    assert_eq!(docs[0]["salary_numeric"], "89000.5679");
    assert_eq!(docs[0]["salary_display"], "$89,000.5679");
    assert_eq!(docs[0]["salary_bucket"], "B");
    assert_eq!(docs[0]["address"]["suburb"], "Sydney");
    assert_eq!(docs[0]["mobile"], "0404123456");
    assert!(docs[0].get("suburb").is_none());

    assert_eq!(docs[1]["first_name"], "Smith, jr");
    assert_eq!(docs[1]["salary_bucket"], "A");
    assert!(docs[1].get("address").is_none());
    assert!(docs[1].get("company").is_none());
    Ok(())
}
