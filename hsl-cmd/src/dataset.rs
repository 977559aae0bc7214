//! Dataset directory loading.
//!
//! A dataset is a directory of CSV files, one per input table of the
//! structure database. `abacus.csv` is optional; only the Bradley methods
//! read it.

use std::path::Path;

use anyhow::Context;
use hsl_core::settings::LawSettings;
use hsl_db::Database;
use log::info;

pub const STRUCTURES_CSV: &str = "structures.csv";
pub const PARAMETERS_CSV: &str = "parameters.csv";
pub const PROFILES_CSV: &str = "profiles.csv";
pub const ELEMENTS_CSV: &str = "elements.csv";
pub const ABACUS_CSV: &str = "abacus.csv";

fn read(dir: &Path, file: &str) -> anyhow::Result<String> {
    let path = dir.join(file);
    std::fs::read_to_string(&path).with_context(|| format!("cannot read {}", path.display()))
}

/// Load every CSV of `dir` into a fresh in-memory database.
pub fn load_dir(dir: &Path) -> anyhow::Result<Database> {
    let db = Database::new()?;
    db.load_structures(&read(dir, STRUCTURES_CSV)?)
        .context(STRUCTURES_CSV)?;
    db.load_parameters(&read(dir, PARAMETERS_CSV)?)
        .context(PARAMETERS_CSV)?;
    db.load_profiles(&read(dir, PROFILES_CSV)?)
        .context(PROFILES_CSV)?;
    db.load_elements(&read(dir, ELEMENTS_CSV)?)
        .context(ELEMENTS_CSV)?;

    let abacus_path = dir.join(ABACUS_CSV);
    if abacus_path.exists() {
        db.load_abacus(&read(dir, ABACUS_CSV)?).context(ABACUS_CSV)?;
    } else {
        info!("No {} in {}, Bradley methods will fail", ABACUS_CSV, dir.display());
    }
    Ok(db)
}

/// Settings from a JSON file, or the defaults.
pub fn load_settings(path: Option<&Path>) -> anyhow::Result<LawSettings> {
    let Some(path) = path else {
        return Ok(LawSettings::default());
    };
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read settings {}", path.display()))?;
    let settings = serde_json::from_str(&raw)
        .with_context(|| format!("invalid settings file {}", path.display()))?;
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn demo_dir() -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("../fixtures/demo")
    }

    #[test]
    fn loads_demo_dataset() {
        let db = load_dir(&demo_dir()).unwrap();
        let structures = db.query_structures().unwrap();
        assert_eq!(structures.len(), 3);
        assert!(!structures[2].active);
    }

    #[test]
    fn missing_directory_is_reported() {
        let err = load_dir(Path::new("/nonexistent/hsl-dataset")).unwrap_err();
        assert!(format!("{:#}", err).contains("structures.csv"));
    }

    #[test]
    fn settings_file_overrides_defaults() {
        let settings = load_settings(Some(demo_dir().join("settings.json").as_path())).unwrap();
        assert_eq!(settings.gravity, 9.81);
        assert_eq!(settings.min_flow, LawSettings::default().min_flow);
        assert_eq!(load_settings(None).unwrap(), LawSettings::default());
    }
}
