//! Runs the commands against the dataset in `fixtures/demo`.

use std::path::{Path, PathBuf};

use hsl_cmd::{compute, dataset, export};
use hsl_core::method::Method;
use hsl_core::settings::LawSettings;

fn demo_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../fixtures/demo")
}

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("hsl-cmd-{}-{}", name, std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    dir
}

#[test]
fn bridge_law_is_stored_and_exported() {
    let db = dataset::load_dir(&demo_dir()).unwrap();
    let report =
        compute::compute_structure(&db, &LawSettings::default(), Method::Bradley78, 1).unwrap();
    assert!(report.is_saved());

    let stored = db.query_law(Method::Bradley78, 1).unwrap();
    assert_eq!(stored, report.table());
    assert!(stored.iter().filter(|s| s.q > 0.0).all(|s| s.zam >= s.zav));

    let mut buf = Vec::new();
    export::write_table(&mut buf, &stored).unwrap();
    let text = String::from_utf8(buf).unwrap();
    assert!(text.starts_with("q ;zav ;zam\n"));
    assert_eq!(text.lines().count(), stored.len() + 1);
}

#[test]
fn every_method_runs_on_the_bridge() {
    let db = dataset::load_dir(&demo_dir()).unwrap();
    for method in Method::ALL {
        let report = compute::compute_structure(&db, &LawSettings::default(), method, 1).unwrap();
        assert!(report.is_saved(), "{} deactivated the bridge", method);
    }
}

#[test]
fn unknown_structure_is_an_error() {
    let db = dataset::load_dir(&demo_dir()).unwrap();
    assert!(compute::compute_structure(&db, &LawSettings::default(), Method::Borda, 42).is_err());
}

#[test]
fn compute_all_skips_inactive_structures() {
    let db = dataset::load_dir(&demo_dir()).unwrap();
    let out = scratch_dir("orifice");
    let summary =
        compute::compute_all(&db, &LawSettings::default(), Method::Orifice, &out).unwrap();

    assert_eq!(summary.saved + summary.deactivated + summary.failed.len(), 2);
    assert!(compute::table_path(&out, Method::Orifice, 1).exists());
    assert!(!compute::table_path(&out, Method::Orifice, 3).exists());
    let _ = std::fs::remove_dir_all(&out);
}

#[test]
fn json_report_written_to_file() {
    let db = dataset::load_dir(&demo_dir()).unwrap();
    let report =
        compute::compute_structure(&db, &LawSettings::default(), Method::Borda, 1).unwrap();
    let out = scratch_dir("json");
    std::fs::create_dir_all(&out).unwrap();
    let path = out.join("borda.json");
    compute::write_report(&report, Some(path.as_path()), true).unwrap();

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(json["status"], "saved");
    assert_eq!(json["method"], "Borda");
    let _ = std::fs::remove_dir_all(&out);
}
