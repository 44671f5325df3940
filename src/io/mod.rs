//! Input/output operations, configuration and error handling

/// Command-line interface and end-to-end generation runner
pub mod cli;
/// Constants and default values
pub mod configuration;
/// Error types and result alias
pub mod error;
/// PNG export of generated maps
pub mod image;
/// Terminal progress bars
pub mod progress;
/// JSON rule set files
pub mod rules;
/// GIF capture of step-wise generation
pub mod visualization;
