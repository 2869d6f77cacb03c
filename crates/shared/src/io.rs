use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::fs;
use std::path::{Path, PathBuf};

use crate::models::{OutputBundle, UserProfile};

/// Get the default directory for storing generated bundles
pub fn get_default_bundles_dir() -> Result<PathBuf> {
    let data_dir = dirs::data_local_dir()
        .context("Could not determine local data directory")?
        .join("life-hacks-cycle")
        .join("bundles");

    fs::create_dir_all(&data_dir).context("Failed to create bundles directory")?;

    Ok(data_dir)
}

pub fn bundle_filename(at: DateTime<Utc>) -> String {
    format!("bundle-{}.json", at.format("%Y%m%dT%H%M%SZ"))
}

/// Write a bundle as pretty JSON
pub fn save_bundle(bundle: &OutputBundle, filepath: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(bundle).context("Failed to serialize output bundle")?;

    fs::write(filepath, json)
        .with_context(|| format!("Failed to write bundle file: {}", filepath.display()))?;

    Ok(())
}

/// Load user profiles from a JSON file.
///
/// Accepts either a bare array of profiles or an object with a
/// `user_profiles` array, the same shape the HTTP trigger takes.
pub fn load_profiles(filepath: &Path) -> Result<Vec<UserProfile>> {
    if !filepath.exists() {
        anyhow::bail!("Profiles file not found: {}", filepath.display());
    }

    let content = fs::read_to_string(filepath)
        .with_context(|| format!("Failed to read profiles file: {}", filepath.display()))?;

    parse_profiles(&content).with_context(|| {
        format!(
            "Failed to parse profiles from {}. Expected a JSON array of {{\"id\", \"interest\"}} objects.",
            filepath.display()
        )
    })
}

fn parse_profiles(content: &str) -> Result<Vec<UserProfile>> {
    #[derive(serde::Deserialize)]
    #[serde(untagged)]
    enum ProfilesFile {
        List(Vec<UserProfile>),
        Wrapped {
            #[serde(default)]
            user_profiles: Option<Vec<UserProfile>>,
        },
    }

    let profiles = match serde_json::from_str::<ProfilesFile>(content)? {
        ProfilesFile::List(profiles) => profiles,
        ProfilesFile::Wrapped { user_profiles } => user_profiles.unwrap_or_default(),
    };

    Ok(profiles)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CategorizedResult;
    use crate::projector::OutputProjector;
    use chrono::TimeZone;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("life-hacks-cycle-{}-{}", std::process::id(), name))
    }

    #[test]
    fn test_bundle_filename() {
        let at = Utc.with_ymd_and_hms(2026, 2, 1, 21, 25, 7).unwrap();
        assert_eq!(bundle_filename(at), "bundle-20260201T212507Z.json");
    }

    #[test]
    fn test_parse_profiles_both_shapes() {
        let list = parse_profiles(r#"[{"id": "u1", "interest": "health"}]"#).unwrap();
        assert_eq!(list, vec![UserProfile::new("u1", "health")]);

        let wrapped =
            parse_profiles(r#"{"user_profiles": [{"id": "u2", "interest": "creativity"}]}"#).unwrap();
        assert_eq!(wrapped, vec![UserProfile::new("u2", "creativity")]);

        assert!(parse_profiles("42").is_err());
    }

    #[test]
    fn test_load_profiles_missing_file() {
        let err = load_profiles(&temp_path("missing.json")).unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_save_bundle_writes_json() {
        let path = temp_path("bundle.json");
        let bundle = OutputProjector::project(&CategorizedResult::empty(), &[], &[]);

        save_bundle(&bundle, &path).unwrap();
        let written: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        fs::remove_file(&path).unwrap();

        assert_eq!(written["workshops"]["sessions"].as_array().unwrap().len(), 3);
    }
}
