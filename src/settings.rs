//! Storefront Settings

use std::{fs, path::Path};

use serde::Deserialize;
use thiserror::Error;

use crate::catalog::legacy::DEFAULT_GROUP_LABEL;

/// Errors loading settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// IO error reading the settings file
    #[error("Failed to read settings file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse settings YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// The contact link is not an http(s) URL
    #[error("Invalid contact link: {0}")]
    InvalidContactLink(String),
}

/// Store-wide settings used by checkout and the legacy adapter.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StorefrontSettings {
    /// Store name shown in order messages
    pub store_name: String,

    /// LINE official account id
    pub line_id: String,

    /// LINE chat link orders are sent to
    pub line_link: String,

    /// Convenience-store payment surcharge, in minor units
    pub convenience_surcharge: i64,

    /// Label for groups derived from legacy packages
    pub default_group_label: String,
}

impl Default for StorefrontSettings {
    fn default() -> Self {
        Self {
            store_name: "YH Game Store".to_string(),
            line_id: "@yh666".to_string(),
            line_link: "https://line.me/R/ti/p/@yh666".to_string(),
            convenience_surcharge: 30_00,
            default_group_label: DEFAULT_GROUP_LABEL.to_string(),
        }
    }
}

impl StorefrontSettings {
    /// Parse settings from YAML. Missing fields keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns a [`SettingsError`] if the YAML is malformed or the contact link is not a URL.
    pub fn from_yaml(yaml: &str) -> Result<Self, SettingsError> {
        let settings: Self = serde_norway::from_str(yaml)?;

        if !(settings.line_link.starts_with("https://")
            || settings.line_link.starts_with("http://"))
        {
            return Err(SettingsError::InvalidContactLink(settings.line_link));
        }

        Ok(settings)
    }

    /// Load settings from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns a [`SettingsError`] if the file cannot be read or parsed.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        Self::from_yaml(&fs::read_to_string(path)?)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;
    use testresult::TestResult;

    use super::*;

    #[test]
    fn defaults_match_storefront() {
        let settings = StorefrontSettings::default();

        assert_eq!(settings.line_id, "@yh666");
        assert_eq!(settings.convenience_surcharge, 3000);
        assert_eq!(settings.default_group_label, DEFAULT_GROUP_LABEL);
    }

    #[test]
    fn partial_yaml_keeps_defaults() -> TestResult {
        let settings = StorefrontSettings::from_yaml(
            "store_name: Test Store\nconvenience_surcharge: 2500\n",
        )?;

        assert_eq!(settings.store_name, "Test Store");
        assert_eq!(settings.convenience_surcharge, 2500);
        assert_eq!(settings.line_link, StorefrontSettings::default().line_link);

        Ok(())
    }

    #[test]
    fn rejects_non_url_contact_link() {
        let result = StorefrontSettings::from_yaml("line_link: not-a-link\n");

        assert!(matches!(
            result,
            Err(SettingsError::InvalidContactLink(link)) if link == "not-a-link"
        ));
    }

    #[test]
    fn loads_from_file() -> TestResult {
        let mut file = NamedTempFile::new()?;
        writeln!(file, "default_group_label: Choose a pack")?;

        let settings = StorefrontSettings::from_file(file.path())?;

        assert_eq!(settings.default_group_label, "Choose a pack");

        Ok(())
    }

    #[test]
    fn missing_file_is_io_error() {
        assert!(matches!(
            StorefrontSettings::from_file("/nonexistent/settings.yml"),
            Err(SettingsError::Io(_))
        ));
    }
}
