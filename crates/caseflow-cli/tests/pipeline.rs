// crates/caseflow-cli/tests/pipeline.rs
// ============================================================================
// Module: Pipeline Orchestration Tests
// Description: End-to-end stage driver and state machine behavior.
// Purpose: Pin stage sequencing, idempotent outputs, and the run log.
// ============================================================================

//! ## Overview
//! These tests drive the stage entry points the way the binary does: raw
//! wide CSVs go in, processed CSVs and SQLite tables come out, and the run
//! log records exactly one terminal line per run. HTTP fixtures come from a
//! local `tiny_http` server; no external network is touched.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    reason = "Test-only assertions and helpers are permitted."
)]

use std::fs;
use std::path::Path;
use std::thread;

use caseflow_cli::PipelineState;
use caseflow_cli::run_load;
use caseflow_cli::run_pipeline;
use caseflow_cli::run_transform;
use caseflow_cli::stages::COUNTRY_SUMMARY_FILE;
use caseflow_cli::stages::DAILY_CHANGES_FILE;
use caseflow_cli::stages::FULL_DATA_FILE;
use caseflow_cli::stages::TRANSFORMATION_METADATA_FILE;
use caseflow_config::PipelineConfig;
use rusqlite::Connection;
use tempfile::TempDir;
use tiny_http::Response;
use tiny_http::Server;

// ============================================================================
// SECTION: Helpers
// ============================================================================

const CONFIRMED_CSV: &str = "Province/State,Country/Region,Lat,Long,1/22/20,1/23/20,1/24/20\n\
                             Hubei,China,30.97,112.27,10,15,12\n\
                             ,Italy,41.87,12.56,0,2,5\n";
const DEATHS_CSV: &str = "Province/State,Country/Region,Lat,Long,1/22/20,1/23/20,1/24/20\n\
                          Hubei,China,30.97,112.27,1,2,3\n\
                          ,Italy,41.87,12.56,0,0,1\n";
const RECOVERED_CSV: &str = "Province/State,Country/Region,Lat,Long,1/22/20,1/23/20,1/24/20\n\
                             Hubei,China,30.97,112.27,0,1,4\n\
                             ,Italy,41.87,12.56,0,0,0\n";

fn test_config(dir: &Path) -> PipelineConfig {
    PipelineConfig {
        raw_data_dir: dir.join("raw"),
        processed_data_dir: dir.join("processed"),
        database_path: dir.join("cases.db"),
        log_file: dir.join("pipeline.log"),
        run_log_path: dir.join("pipeline_metadata.txt"),
        ..PipelineConfig::default()
    }
}

fn write_raw_fixtures(raw_dir: &Path) {
    fs::create_dir_all(raw_dir).expect("raw dir");
    fs::write(raw_dir.join("confirmed.csv"), CONFIRMED_CSV).expect("confirmed");
    fs::write(raw_dir.join("deaths.csv"), DEATHS_CSV).expect("deaths");
    fs::write(raw_dir.join("recovered.csv"), RECOVERED_CSV).expect("recovered");
}

/// Points the config's source URLs at a local server and serves one request
/// per category per expected run.
fn serve_categories(config: &mut PipelineConfig, runs: usize) -> thread::JoinHandle<()> {
    let server = Server::http("127.0.0.1:0").expect("http server");
    let addr = server.server_addr().to_string();
    config.sources.confirmed = format!("http://{addr}/confirmed.csv");
    config.sources.deaths = format!("http://{addr}/deaths.csv");
    config.sources.recovered = format!("http://{addr}/recovered.csv");
    thread::spawn(move || {
        for _ in 0..(runs * 3) {
            let Ok(request) = server.recv() else {
                return;
            };
            let body = if request.url().contains("confirmed") {
                CONFIRMED_CSV
            } else if request.url().contains("deaths") {
                DEATHS_CSV
            } else {
                RECOVERED_CSV
            };
            request.respond(Response::from_string(body)).expect("respond");
        }
    })
}

fn table_count(db_path: &Path, table: &str) -> i64 {
    let connection = Connection::open(db_path).expect("open db");
    connection
        .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))
        .expect("count")
}

// ============================================================================
// SECTION: Transform and Load Tests
// ============================================================================

#[test]
fn transform_then_load_end_to_end() {
    let dir = TempDir::new().expect("temp dir");
    let config = test_config(dir.path());
    write_raw_fixtures(&config.raw_data_dir);

    let summary = run_transform(&config).expect("transform");
    // Two regions x three dates.
    assert_eq!(summary.records, 6);
    assert_eq!(summary.countries, 2);

    for name in [FULL_DATA_FILE, COUNTRY_SUMMARY_FILE, DAILY_CHANGES_FILE] {
        assert!(config.processed_data_dir.join(name).exists(), "missing {name}");
    }
    let metadata =
        fs::read_to_string(config.processed_data_dir.join(TRANSFORMATION_METADATA_FILE))
            .expect("metadata");
    assert!(metadata.contains("total_records: 6"));
    assert!(metadata.contains("countries_included: 2"));
    assert!(metadata.contains("date_range: 2020-01-22 to 2020-01-24"));

    let report = run_load(&config).expect("load");
    assert_eq!(report.full_rows, 6);
    assert_eq!(table_count(&config.database_path, "full_data"), 6);
    assert_eq!(table_count(&config.database_path, "country_summary"), 6);
    assert_eq!(table_count(&config.database_path, "daily_changes"), 6);
}

#[test]
fn transform_outputs_are_byte_identical_across_reruns() {
    let dir = TempDir::new().expect("temp dir");
    let config = test_config(dir.path());
    write_raw_fixtures(&config.raw_data_dir);

    run_transform(&config).expect("first transform");
    let first: Vec<Vec<u8>> = [FULL_DATA_FILE, COUNTRY_SUMMARY_FILE, DAILY_CHANGES_FILE]
        .iter()
        .map(|name| fs::read(config.processed_data_dir.join(name)).expect("read"))
        .collect();

    run_transform(&config).expect("second transform");
    for (index, name) in
        [FULL_DATA_FILE, COUNTRY_SUMMARY_FILE, DAILY_CHANGES_FILE].iter().enumerate()
    {
        let second = fs::read(config.processed_data_dir.join(name)).expect("read");
        assert_eq!(first[index], second, "{name} changed across reruns");
    }
}

#[test]
fn daily_changes_clip_downward_corrections() {
    let dir = TempDir::new().expect("temp dir");
    let config = test_config(dir.path());
    write_raw_fixtures(&config.raw_data_dir);
    run_transform(&config).expect("transform");
    run_load(&config).expect("load");

    // Hubei confirmed=[10,15,12] must load as new_confirmed=[0,5,0].
    let connection = Connection::open(&config.database_path).expect("open db");
    let mut statement = connection
        .prepare(
            "SELECT new_confirmed FROM daily_changes WHERE province_state = 'Hubei' \
             ORDER BY date",
        )
        .expect("prepare");
    let increments: Vec<i64> = statement
        .query_map([], |row| row.get(0))
        .expect("query")
        .collect::<Result<_, _>>()
        .expect("rows");
    assert_eq!(increments, vec![0, 5, 0]);
}

#[test]
fn transform_without_confirmed_backbone_fails() {
    let dir = TempDir::new().expect("temp dir");
    let config = test_config(dir.path());
    fs::create_dir_all(&config.raw_data_dir).expect("raw dir");
    fs::write(config.raw_data_dir.join("deaths.csv"), DEATHS_CSV).expect("deaths");

    let err = run_transform(&config).unwrap_err();
    assert!(err.to_string().contains("confirmed"));
}

#[test]
fn transform_with_missing_optional_category_fills_zero() {
    let dir = TempDir::new().expect("temp dir");
    let config = test_config(dir.path());
    fs::create_dir_all(&config.raw_data_dir).expect("raw dir");
    fs::write(config.raw_data_dir.join("confirmed.csv"), CONFIRMED_CSV).expect("confirmed");

    run_transform(&config).expect("transform");
    run_load(&config).expect("load");

    let connection = Connection::open(&config.database_path).expect("open db");
    let deaths: i64 = connection
        .query_row("SELECT SUM(deaths) FROM full_data", [], |row| row.get(0))
        .expect("deaths sum");
    assert_eq!(deaths, 0);
    let active: i64 = connection
        .query_row(
            "SELECT active FROM full_data WHERE province_state = 'Hubei' AND \
             date = '2020-01-23'",
            [],
            |row| row.get(0),
        )
        .expect("active");
    assert_eq!(active, 15);
}

// ============================================================================
// SECTION: Full Pipeline Tests
// ============================================================================

#[test]
fn full_pipeline_succeeds_and_appends_one_run_log_line() {
    let dir = TempDir::new().expect("temp dir");
    let mut config = test_config(dir.path());
    let handle = serve_categories(&mut config, 1);

    let outcome = run_pipeline(&config).expect("pipeline");
    handle.join().expect("server thread");

    assert!(outcome.is_success());
    assert_eq!(outcome.state, PipelineState::Succeeded);
    assert_eq!(outcome.rows_loaded, Some(6 + 6 + 6));

    let run_log = fs::read_to_string(&config.run_log_path).expect("run log");
    let lines: Vec<&str> = run_log.lines().collect();
    assert_eq!(lines.len(), 1);
    assert!(lines[0].contains("status: succeeded"));
    assert!(lines[0].contains("duration_ms: "));
}

#[test]
fn extraction_failure_stops_the_pipeline_before_transform() {
    let dir = TempDir::new().expect("temp dir");
    let mut config = test_config(dir.path());
    // Bind and drop a listener so every category download is refused.
    let server = Server::http("127.0.0.1:0").expect("http server");
    let addr = server.server_addr().to_string();
    drop(server);
    config.sources.confirmed = format!("http://{addr}/confirmed.csv");
    config.sources.deaths = format!("http://{addr}/deaths.csv");
    config.sources.recovered = format!("http://{addr}/recovered.csv");

    let outcome = run_pipeline(&config).expect("pipeline");
    assert!(!outcome.is_success());
    assert_eq!(outcome.failed_stage, Some(PipelineState::Extracting));
    assert!(!config.processed_data_dir.join(FULL_DATA_FILE).exists());

    let run_log = fs::read_to_string(&config.run_log_path).expect("run log");
    assert!(run_log.contains("status: failed"));
    assert!(run_log.contains("stage: extracting"));
}

#[test]
fn unreachable_store_fails_the_run_without_partial_tables() {
    let dir = TempDir::new().expect("temp dir");
    let mut config = test_config(dir.path());
    // A directory at the database path makes the store unreachable.
    fs::create_dir_all(dir.path().join("cases.db")).expect("blocking dir");
    let handle = serve_categories(&mut config, 1);

    let outcome = run_pipeline(&config).expect("pipeline");
    handle.join().expect("server thread");

    assert!(!outcome.is_success());
    assert_eq!(outcome.failed_stage, Some(PipelineState::Loading));
    assert!(outcome.error.as_deref().is_some_and(|error| error.contains("store")));

    let run_log = fs::read_to_string(&config.run_log_path).expect("run log");
    assert!(run_log.contains("status: failed"));
    assert!(run_log.contains("stage: loading"));
}
