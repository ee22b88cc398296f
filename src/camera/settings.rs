//! Camera settings loading
//!
//! Calibration files are often written by OpenCV's `FileStorage`, which emits
//! a `%YAML:1.0` directive that standard YAML parsers reject. The settings text
//! is cleaned before parsing:
//! - `%` directive lines are removed
//! - control characters (except \n, \r, \t) are removed

use serde::Deserialize;
use std::fmt;
use std::path::PathBuf;

use crate::types::Intrinsics;
use crate::{RelayError, Result};

/// Where a camera reads its settings from.
#[derive(Debug, Clone, PartialEq)]
pub enum SettingsSource {
    /// YAML file on disk
    File(PathBuf),
    /// YAML text held in memory
    Inline(String),
}

impl SettingsSource {
    pub fn file(path: impl Into<PathBuf>) -> Self {
        SettingsSource::File(path.into())
    }

    pub fn inline(yaml: impl Into<String>) -> Self {
        SettingsSource::Inline(yaml.into())
    }

    /// Raw settings text.
    pub fn read_to_string(&self) -> Result<String> {
        match self {
            SettingsSource::File(path) => std::fs::read_to_string(path)
                .map_err(|e| RelayError::settings_error(path.clone(), e)),
            SettingsSource::Inline(yaml) => Ok(yaml.clone()),
        }
    }
}

impl fmt::Display for SettingsSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingsSource::File(path) => write!(f, "{}", path.display()),
            SettingsSource::Inline(_) => f.write_str("<inline settings>"),
        }
    }
}

#[derive(Debug, Deserialize)]
struct CameraSettings {
    intrinsics: Option<Intrinsics>,
}

/// Read and validate the `intrinsics` record from `source`.
///
/// # Errors
///
/// - [`RelayError::Settings`] if the file cannot be read
/// - [`RelayError::Parse`] if the text is not valid YAML for the settings
/// - [`RelayError::Config`] if `intrinsics` is missing or unusable
pub fn read_intrinsics(source: &SettingsSource) -> Result<Intrinsics> {
    let raw = source.read_to_string()?;
    let cleaned = preprocess_settings_yaml(&raw)?;

    let settings: CameraSettings =
        serde_yaml_ng::from_str(&cleaned).map_err(|e| RelayError::Parse {
            context: format!("camera settings {source}"),
            details: e.to_string(),
        })?;

    let intrinsics = settings.intrinsics.ok_or_else(|| {
        RelayError::config(
            source.to_string(),
            "could not read all required camera parameters (missing 'intrinsics')",
        )
    })?;

    intrinsics.validate().map_err(|reason| RelayError::config(source.to_string(), reason))?;
    Ok(intrinsics)
}

/// Clean settings text so a standard YAML parser accepts it.
pub fn preprocess_settings_yaml(yaml: &str) -> Result<String> {
    let mut result = String::with_capacity(yaml.len());

    for line in yaml.lines() {
        if line.trim_start().starts_with('%') {
            continue;
        }
        result.extend(line.chars().filter(|ch| {
            !matches!(*ch, '\x00'..='\x08' | '\x0B'..='\x0C' | '\x0E'..='\x1F')
        }));
        result.push('\n');
    }

    if result.trim().is_empty() {
        return Err(RelayError::Parse {
            context: "settings preprocessing".to_string(),
            details: "settings are empty after preprocessing".to_string(),
        });
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    const OPENCV_SETTINGS: &str = "%YAML:1.0\n---\nintrinsics:\n   fu: 615.5\n   fv: 615.5\n   ppu: 320.0\n   ppv: 240.0\n   width: 640\n   height: 480\n";

    #[test]
    fn test_preprocess_strips_directives() {
        let result = preprocess_settings_yaml(OPENCV_SETTINGS).unwrap();
        assert!(!result.contains("%YAML"));
        assert!(result.contains("intrinsics:"));
    }

    #[test]
    fn test_preprocess_removes_control_characters() {
        let input = "intrinsics:\x00\x01\n  fu: 1\x03";
        let result = preprocess_settings_yaml(input).unwrap();
        assert!(!result.contains('\x00'));
        assert!(!result.contains('\x03'));
        assert!(result.contains("fu: 1"));
    }

    #[test]
    fn test_preprocess_rejects_empty() {
        assert!(preprocess_settings_yaml("%YAML:1.0\n  \n").is_err());
    }

    #[test]
    fn reads_opencv_style_intrinsics() {
        let intrinsics = read_intrinsics(&SettingsSource::inline(OPENCV_SETTINGS)).unwrap();

        assert_eq!(intrinsics.fu, 615.5);
        assert_eq!(intrinsics.ppv, 240.0);
        assert_eq!((intrinsics.width, intrinsics.height), (640, 480));
    }

    #[test]
    fn integer_focal_lengths_are_accepted() {
        let yaml = "intrinsics: {fu: 600, fv: 600, ppu: 320, ppv: 240, width: 640, height: 480}";
        let intrinsics = read_intrinsics(&SettingsSource::inline(yaml)).unwrap();
        assert_eq!(intrinsics.fu, 600.0);
    }

    #[test]
    fn missing_intrinsics_is_a_config_error() {
        let err = read_intrinsics(&SettingsSource::inline("camera2world_pose: []\n")).unwrap_err();
        assert!(matches!(err, RelayError::Config { .. }), "got {err:?}");
    }

    #[test]
    fn incomplete_intrinsics_is_a_parse_error() {
        let err = read_intrinsics(&SettingsSource::inline("intrinsics: {fu: 600}\n")).unwrap_err();
        assert!(matches!(err, RelayError::Parse { .. }), "got {err:?}");
    }

    #[test]
    fn missing_file_is_a_settings_error() {
        let source = SettingsSource::file("/nonexistent/camera.yaml");
        let err = read_intrinsics(&source).unwrap_err();

        assert!(matches!(err, RelayError::Settings { .. }));
        assert!(err.to_string().contains("/nonexistent/camera.yaml"));
    }
}
