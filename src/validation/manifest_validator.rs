//! Manifest Validator - Validates package manifests (Cargo.toml, package.json)
//!
//! Used by the `check` command to confirm that every directory of a publish
//! task actually holds a publishable package before anything is uploaded.
//!
//! # Example
//!
//! ```no_run
//! use sequential_publisher::validation::ManifestValidator;
//! use std::path::Path;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let validator = ManifestValidator::new();
//! let result = validator.validate_dir(Path::new("engine")).await?;
//!
//! if result.is_valid {
//!     println!("Manifest is valid!");
//! }
//! # Ok(())
//! # }
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::fs;

/// Type of manifest file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ManifestType {
    Cargo,
    Npm,
}

impl ManifestType {
    pub fn file_name(&self) -> &'static str {
        match self {
            Self::Cargo => "Cargo.toml",
            Self::Npm => "package.json",
        }
    }

    /// Detect the manifest type present in `dir`
    pub fn detect(dir: &Path) -> Option<Self> {
        [Self::Cargo, Self::Npm]
            .into_iter()
            .find(|manifest| dir.join(manifest.file_name()).is_file())
    }
}

/// Result of manifest validation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationResult {
    /// Whether the manifest is valid
    pub is_valid: bool,
    /// List of validation errors
    pub errors: Vec<String>,
    /// List of validation warnings
    pub warnings: Vec<String>,
    /// Parsed manifest metadata
    pub metadata: Option<ManifestMetadata>,
}

impl ValidationResult {
    fn invalid(error: String) -> Self {
        Self {
            is_valid: false,
            errors: vec![error],
            warnings: Vec::new(),
            metadata: None,
        }
    }
}

/// Metadata extracted from manifest
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestMetadata {
    pub name: String,
    pub version: String,
    pub description: Option<String>,
    pub license: Option<String>,
}

/// Validator for package manifest files
pub struct ManifestValidator;

impl Default for ManifestValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl ManifestValidator {
    pub fn new() -> Self {
        Self
    }

    /// Validate the manifest found in `dir`.
    ///
    /// A directory without a recognised manifest is reported as invalid,
    /// not as an error.
    pub async fn validate_dir(&self, dir: &Path) -> anyhow::Result<ValidationResult> {
        let Some(manifest_type) = ManifestType::detect(dir) else {
            return Ok(ValidationResult::invalid(format!(
                "No Cargo.toml or package.json found in {}",
                dir.display()
            )));
        };

        self.validate(&dir.join(manifest_type.file_name()), manifest_type)
            .await
    }

    /// Validate a manifest file
    pub async fn validate(
        &self,
        path: &Path,
        manifest_type: ManifestType,
    ) -> anyhow::Result<ValidationResult> {
        let content = fs::read_to_string(path).await?;

        match manifest_type {
            ManifestType::Cargo => self.validate_cargo(&content),
            ManifestType::Npm => self.validate_npm(&content),
        }
    }

    fn validate_cargo(&self, content: &str) -> anyhow::Result<ValidationResult> {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        let parsed: toml::Value = match toml::from_str(content) {
            Ok(v) => v,
            Err(e) => return Ok(ValidationResult::invalid(format!("Invalid TOML: {}", e))),
        };

        let Some(package) = parsed.get("package") else {
            let error = if parsed.get("workspace").is_some() {
                "Virtual workspace manifest has no [package] to publish".to_string()
            } else {
                "Missing [package] section".to_string()
            };
            return Ok(ValidationResult::invalid(error));
        };

        let name = package.get("name").and_then(|v| v.as_str());
        // `version.workspace = true` is a table, resolved by cargo itself
        let version = match package.get("version") {
            Some(toml::Value::String(version)) => Some(version.clone()),
            Some(toml::Value::Table(table))
                if table.get("workspace").and_then(|v| v.as_bool()) == Some(true) =>
            {
                Some("workspace".to_string())
            }
            _ => None,
        };

        if name.is_none() {
            errors.push("Missing required field: package.name".to_string());
        }
        match &version {
            None => errors.push("Missing required field: package.version".to_string()),
            Some(version) if version != "workspace" => {
                if let Err(e) = semver::Version::parse(version) {
                    errors.push(format!("Invalid version {:?}: {}", version, e));
                }
            }
            Some(_) => {}
        }

        if package.get("publish").and_then(|v| v.as_bool()) == Some(false) {
            errors.push("package.publish is false".to_string());
        }

        let metadata = match (name, version) {
            (Some(name), Some(version)) => Some(ManifestMetadata {
                name: name.to_string(),
                version,
                description: package
                    .get("description")
                    .and_then(|v| v.as_str())
                    .map(String::from),
                license: package
                    .get("license")
                    .and_then(|v| v.as_str())
                    .map(String::from),
            }),
            _ => None,
        };

        if package.get("description").is_none() {
            warnings.push("Missing recommended field: package.description".to_string());
        }
        if package.get("license").is_none() && package.get("license-file").is_none() {
            warnings.push("Missing recommended field: package.license".to_string());
        }

        Ok(ValidationResult {
            is_valid: errors.is_empty(),
            errors,
            warnings,
            metadata,
        })
    }

    fn validate_npm(&self, content: &str) -> anyhow::Result<ValidationResult> {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        let parsed: serde_json::Value = match serde_json::from_str(content) {
            Ok(v) => v,
            Err(e) => return Ok(ValidationResult::invalid(format!("Invalid JSON: {}", e))),
        };

        let name = parsed.get("name").and_then(|v| v.as_str());
        let version = parsed.get("version").and_then(|v| v.as_str());

        if name.is_none() {
            errors.push("Missing required field: name".to_string());
        }
        match version {
            None => errors.push("Missing required field: version".to_string()),
            Some(version) => {
                if let Err(e) = semver::Version::parse(version) {
                    errors.push(format!("Invalid version {:?}: {}", version, e));
                }
            }
        }

        if parsed.get("private").and_then(|v| v.as_bool()) == Some(true) {
            errors.push("Package is marked private".to_string());
        }

        let metadata = match (name, version) {
            (Some(name), Some(version)) => Some(ManifestMetadata {
                name: name.to_string(),
                version: version.to_string(),
                description: parsed
                    .get("description")
                    .and_then(|v| v.as_str())
                    .map(String::from),
                license: parsed
                    .get("license")
                    .and_then(|v| v.as_str())
                    .map(String::from),
            }),
            _ => None,
        };

        if parsed.get("description").is_none() {
            warnings.push("Missing recommended field: description".to_string());
        }
        if parsed.get("license").is_none() {
            warnings.push("Missing recommended field: license".to_string());
        }

        Ok(ValidationResult {
            is_valid: errors.is_empty(),
            errors,
            warnings,
            metadata,
        })
    }
}
