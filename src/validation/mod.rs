pub mod manifest_validator;

pub use manifest_validator::{ManifestMetadata, ManifestType, ManifestValidator, ValidationResult};
