//! Integration tests for generating documents from parsed fragments.

use std::fs;
use std::path::Path;

use chrono::{TimeZone, Utc};
use cifold_fragment::parse_fragment;
use cifold_generator::{
    DocumentGenerator, DocumentKind, DocumentWriter, GenerateOptions, GeneratorError,
    OutputFormat, ValidationRules,
};
use tempfile::tempdir;

const WORKFLOW: &str = r#"
name: ci
on:
  push:
    branches: [main]
jobs:
  build:
    runs-on: ubuntu-latest
    steps:
      - uses: actions/checkout@v4
      - run: cargo build --release
      - run: echo ${{ github.sha }}
"#;

fn options() -> GenerateOptions {
    GenerateOptions {
        timestamp: Some(Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap()),
        ..Default::default()
    }
}

#[test]
fn test_generated_yaml_parses_back() {
    let path = Path::new("/tpl/workflows/ci.yml");
    let parsed = parse_fragment(WORKFLOW, path).unwrap();
    let kind = DocumentKind::infer(path).unwrap();

    let text = DocumentGenerator::new(options())
        .generate(&parsed.root, kind, path)
        .unwrap();

    assert!(text.starts_with("# Generated by cifold from /tpl/workflows/ci.yml\n"));
    assert!(text.contains("# Generated at 2024-01-02T03:04:05Z"));

    let reparsed = parse_fragment(&text, path).unwrap();
    assert_eq!(reparsed.root, parsed.root);
}

#[test]
fn test_engine_expressions_survive_generation() {
    let path = Path::new("workflows/ci.yml");
    let parsed = parse_fragment(WORKFLOW, path).unwrap();

    let text = DocumentGenerator::new(GenerateOptions {
        format: OutputFormat::Json,
        ..options()
    })
    .generate(&parsed.root, DocumentKind::Workflow, path)
    .unwrap();

    let value: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(
        value["jobs"]["build"]["steps"][2]["run"],
        "echo ${{ github.sha }}"
    );
}

#[test]
fn test_unresolved_document_rejected() {
    let path = Path::new("workflows/ci.yml");
    let parsed = parse_fragment(
        "jobs:\n  build: !reference jobs/build.yml\n",
        path,
    )
    .unwrap();

    let err = DocumentGenerator::default()
        .generate(&parsed.root, DocumentKind::Workflow, path)
        .unwrap_err();

    match err {
        GeneratorError::Unresolved { path, location } => {
            assert_eq!(path, Path::new("workflows/ci.yml"));
            assert_eq!(location, "jobs.build");
        }
        other => panic!("expected unresolved error, got {:?}", other),
    }
}

#[test]
fn test_job_missing_steps_rejected() {
    let path = Path::new("jobs/lint.yml");
    let parsed = parse_fragment("runs-on: ubuntu-latest\nsteps: []\n", path).unwrap();

    let err = DocumentGenerator::default()
        .generate(&parsed.root, DocumentKind::Job, path)
        .unwrap_err();

    assert!(err.to_string().contains("missing required field `steps`"));
}

#[test]
fn test_relaxed_rules() {
    let path = Path::new("jobs/lint.yml");
    let parsed = parse_fragment("runs-on: ubuntu-latest\n", path).unwrap();

    let text = DocumentGenerator::new(GenerateOptions {
        provenance: false,
        ..Default::default()
    })
    .with_rules(ValidationRules::empty())
    .generate(&parsed.root, DocumentKind::Job, path)
    .unwrap();

    assert_eq!(text, "runs-on: ubuntu-latest\n");
}

#[test]
fn test_write_generated_document() {
    let dir = tempdir().unwrap();
    let source = dir.path().join("templates/workflows/ci.yml");
    let parsed = parse_fragment(WORKFLOW, &source).unwrap();

    let text = DocumentGenerator::new(options())
        .generate(&parsed.root, DocumentKind::Workflow, &source)
        .unwrap();

    let target = DocumentWriter::output_path(
        &source,
        &dir.path().join("templates"),
        &dir.path().join("out"),
        OutputFormat::Yaml,
    );
    DocumentWriter::write(&target, &text).unwrap();

    assert_eq!(target, dir.path().join("out/workflows/ci.yml"));
    assert_eq!(fs::read_to_string(&target).unwrap(), text);
}
