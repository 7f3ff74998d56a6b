//! Suite runner and expectation table tests

mod common;

use common::{dc42_image, patterned, sha256, write_gz, write_plain};
use imgverify::application::dto::VerifyOptions;
use imgverify::application::VerifySuiteUseCase;
use imgverify::domain::entities::{FixtureEntry, FixtureSuite, MediaType, VerificationState};
use imgverify::domain::services::{digest_hex, DigestAlgorithm};
use imgverify::error::HarnessError;
use imgverify::infrastructure::expectations::load_table;
use imgverify::infrastructure::fixture_store::LocalFixtureStore;
use imgverify::infrastructure::plugins::builtin_registry;
use rstest::*;
use std::sync::Arc;
use tempfile::TempDir;

fn runner(dir: &TempDir, options: VerifyOptions) -> VerifySuiteUseCase {
    VerifySuiteUseCase::new(
        Arc::new(LocalFixtureStore::new(dir.path())),
        Arc::new(builtin_registry()),
        options,
    )
}

/// Six floppies where the fourth is missing from disk
fn floppy_suite(dir: &TempDir) -> FixtureSuite {
    let fixtures = (0..6u64)
        .map(|i| {
            let data = patterned(720 + i, 512);
            let name = format!("disk{}.img.gz", i);
            if i != 3 {
                write_gz(dir.path(), "raw", &name, &data);
            }
            let media_type = MediaType::from_geometry(imgverify::domain::entities::Geometry::new(
                720 + i,
                512,
            ));
            FixtureEntry::new(name, media_type, 720 + i, 512, sha256(&data), None).unwrap()
        })
        .collect();
    FixtureSuite::new("floppies", "raw", "raw", fixtures)
}

// ============================================================================
// Suite Execution
// ============================================================================

#[rstest]
#[case::parallel(VerifyOptions::default().with_threads(3))]
#[case::sequential(VerifyOptions::default().sequential())]
#[case::unpipelined(VerifyOptions::default().sequential().unpipelined())]
fn test_failure_isolated_and_order_kept(#[case] options: VerifyOptions) {
    let dir = TempDir::new().unwrap();
    let suite = floppy_suite(&dir);
    let report = runner(&dir, options).execute(&suite).unwrap();

    let names: Vec<_> = report.results.iter().map(|r| r.fixture().file_name()).collect();
    assert_eq!(
        names,
        vec!["disk0.img.gz", "disk1.img.gz", "disk2.img.gz", "disk3.img.gz", "disk4.img.gz", "disk5.img.gz"]
    );
    assert_eq!(report.total(), 6);
    assert_eq!(report.passed(), 5);
    assert_eq!(report.errored(), 1);
    assert_eq!(report.results[3].state(), VerificationState::Errored);
    assert!(!report.is_success());
}

#[rstest]
fn test_summary_names_every_failure() {
    let dir = TempDir::new().unwrap();
    let suite = floppy_suite(&dir);
    let report = runner(&dir, VerifyOptions::default()).execute(&suite).unwrap();

    let summary = report.summary();
    assert!(summary.starts_with("floppies [raw]: 5/6 passed (1 errored)"));
    assert!(summary.contains("FAIL disk3.img.gz (errored)"));
    assert!(summary.contains("Errored: aborted after pending: FixtureNotFound"));
}

#[rstest]
fn test_unknown_plugin_is_fatal() {
    let dir = TempDir::new().unwrap();
    let suite = FixtureSuite::new("vmware", "vmdk", "vmdk", Vec::new());
    let err = runner(&dir, VerifyOptions::default()).execute(&suite).unwrap_err();
    assert!(matches!(err, HarnessError::UnknownPlugin { ref plugin, .. } if plugin == "vmdk"));
}

#[rstest]
fn test_digest_of_unknown_length_is_fatal() {
    let dir = TempDir::new().unwrap();
    let fixture =
        FixtureEntry::new("a.img", MediaType::Dos35Hd, 2880, 512, "abcdef0123", None).unwrap();
    let suite = FixtureSuite::new("floppies", "raw", "raw", vec![fixture]);
    let err = runner(&dir, VerifyOptions::default()).execute(&suite).unwrap_err();
    assert!(matches!(err, HarnessError::InvalidExpectation(_)));
}

#[rstest]
fn test_crc32_digest_is_inferred() {
    let dir = TempDir::new().unwrap();
    let data = patterned(1440, 512);
    write_plain(dir.path(), "raw", "a.img", &data);

    let crc = format!("{:08x}", crc32fast::hash(&data));
    let fixture = FixtureEntry::new("a.img", MediaType::Dos35DsDd9, 1440, 512, crc, None).unwrap();
    let suite = FixtureSuite::new("floppies", "raw", "raw", vec![fixture]);

    let report = runner(&dir, VerifyOptions::default()).execute(&suite).unwrap();
    assert!(report.is_success(), "{}", report.summary());
}

#[rstest]
fn test_md5_digest_is_inferred() {
    let dir = TempDir::new().unwrap();
    let data = patterned(1440, 512);
    write_plain(dir.path(), "raw", "a.img", &data);

    let md5 = digest_hex(DigestAlgorithm::Md5, &data);
    assert_eq!(md5.len(), 32);
    let fixture = FixtureEntry::new("a.img", MediaType::Dos35DsDd9, 1440, 512, md5, None).unwrap();
    let suite = FixtureSuite::new("floppies", "raw", "raw", vec![fixture]);

    let report = runner(&dir, VerifyOptions::default()).execute(&suite).unwrap();
    assert!(report.is_success(), "{}", report.summary());
}

// ============================================================================
// Table-Driven Runs
// ============================================================================

#[rstest]
fn test_run_from_table_file() {
    let dir = TempDir::new().unwrap();
    let raw = patterned(2880, 512);
    let apple = patterned(1600, 512);
    write_gz(dir.path(), "raw", "mf2hd.img.gz", &raw);
    write_gz(dir.path(), "dc42", "mf2dd.dc42.gz", &dc42_image("Apple", 1, &apple, 19_200));

    let table = format!(
        r#"{{
            "suites": [
                {{
                    "name": "raw floppies", "plugin": "raw", "folder": "raw",
                    "fixtures": [{{
                        "test_file": "mf2hd.img.gz", "media_type": "dos_35_hd",
                        "sectors": 2880, "sector_size": 512, "digest": "{}"
                    }}]
                }},
                {{
                    "name": "diskcopy", "plugin": "dc42", "folder": "dc42",
                    "fixtures": [{{
                        "test_file": "mf2dd.dc42.gz", "media_type": "apple_sony_ds",
                        "sectors": 1600, "sector_size": 512, "digest": "{}"
                    }}]
                }}
            ]
        }}"#,
        sha256(&raw),
        sha256(&apple)
    );
    let table_path = dir.path().join("expectations.json");
    std::fs::write(&table_path, table).unwrap();

    let suites = load_table(&table_path).unwrap();
    let report = runner(&dir, VerifyOptions::default()).run(&suites).unwrap();

    assert_eq!(report.suites.len(), 2);
    assert_eq!(report.total(), 2);
    assert!(report.is_success(), "{}", report.summary());
}

#[rstest]
fn test_missing_table_file() {
    let err = load_table("/nonexistent/expectations.json").unwrap_err();
    assert!(matches!(err, HarnessError::TableRead { .. }));
}
