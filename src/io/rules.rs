//! JSON rule files
//!
//! A rule file is the serde form of [`RuleSet`]:
//!
//! ```json
//! { "tiles": [ { "id": 0, "weight": 1.0,
//!                "neighbors": { "up": [0], "down": [0], "left": [0, 1], "right": [0] } } ] }
//! ```
//!
//! Missing neighbour lists mean no neighbour is allowed in that direction.

use crate::io::error::{AlgorithmError, Result};
use crate::io::image::ensure_parent_dir;
use crate::spatial::tiles::RuleSet;
use std::path::Path;

/// Parse a rule set from JSON text
///
/// # Errors
///
/// Returns an error if the text is not a valid rule set document.
pub fn parse_rules(json: &str) -> serde_json::Result<RuleSet> {
    serde_json::from_str(json)
}

/// Load a rule set from a JSON file
///
/// # Errors
///
/// Returns an error if:
/// - The file cannot be read
/// - The content is not a valid rule set document
pub fn load_rules<P: AsRef<Path>>(path: P) -> Result<RuleSet> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|e| AlgorithmError::FileSystem {
        path: path.to_path_buf(),
        operation: "read rule file",
        source: e,
    })?;
    parse_rules(&text).map_err(|e| AlgorithmError::RuleFormat {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Write a rule set as pretty-printed JSON
///
/// # Errors
///
/// Returns an error if:
/// - The parent directory cannot be created
/// - The rule set cannot be serialized
/// - The file cannot be written
pub fn save_rules(rules: &RuleSet, output_path: &str) -> Result<()> {
    let json = serde_json::to_string_pretty(rules).map_err(|e| AlgorithmError::RuleFormat {
        path: output_path.into(),
        source: e,
    })?;
    ensure_parent_dir(output_path)?;
    std::fs::write(output_path, json).map_err(|e| AlgorithmError::FileSystem {
        path: output_path.into(),
        operation: "write rule file",
        source: e,
    })
}
