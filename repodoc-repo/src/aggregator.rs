//! Structural aggregation: config file detection and dependency extraction

use std::collections::HashSet;

use repodoc_core::ScanProfile;
use serde_json::Value;
use tracing::debug;

use crate::record::AnalysisRecord;

/// Dependency sections merged from the package manifest, in merge order
const DEPENDENCY_SECTIONS: [&str; 2] = ["dependencies", "devDependencies"];

#[derive(Debug, Clone)]
pub struct StructuralAggregator {
    config_file_names: HashSet<String>,
    package_manifest: String,
}

impl StructuralAggregator {
    pub fn new(profile: &ScanProfile) -> Self {
        Self {
            config_file_names: profile
                .config_file_names
                .iter()
                .map(|name| name.to_lowercase())
                .collect(),
            package_manifest: profile.package_manifest.to_lowercase(),
        }
    }

    /// Fold one accepted file into the record.
    ///
    /// `content` must be the full decoded file, not a budgeted prefix, or
    /// large manifests would fail to parse.
    pub fn observe(
        &self,
        relative_path: &str,
        file_name: &str,
        content: &str,
        record: &mut AnalysisRecord,
    ) {
        let file_name = file_name.to_lowercase();

        if self.config_file_names.contains(&file_name) {
            record.push_config_file(relative_path.to_string());
        }

        if file_name == self.package_manifest {
            match extract_dependencies(content) {
                Some(dependencies) => {
                    debug!(
                        path = %relative_path,
                        count = dependencies.len(),
                        "Merged manifest dependencies"
                    );
                    record.merge_dependencies(dependencies);
                }
                None => debug!(path = %relative_path, "Skipping unparseable manifest"),
            }
        }
    }
}

impl Default for StructuralAggregator {
    fn default() -> Self {
        Self::new(&ScanProfile::default())
    }
}

/// Runtime then development dependencies of a JSON package manifest.
///
/// `None` when the text is not a JSON object. Sections that are not objects
/// are ignored; versions that are not strings keep their JSON rendering.
pub fn extract_dependencies(content: &str) -> Option<Vec<(String, String)>> {
    let manifest: Value = serde_json::from_str(content).ok()?;
    let root = manifest.as_object()?;

    let dependencies = DEPENDENCY_SECTIONS
        .iter()
        .filter_map(|section| root.get(*section).and_then(Value::as_object))
        .flat_map(|entries| entries.iter())
        .map(|(name, version)| {
            let version = match version {
                Value::String(text) => text.clone(),
                other => other.to_string(),
            };
            (name.clone(), version)
        })
        .collect();

    Some(dependencies)
}
