use std::path::Path;

use config::{Config, File, FileFormat};
use eyre::{Context, Result};

use crate::config::models::RenderInput;

/// Load a render input document from a file using the config crate
/// Supports multiple formats: YAML, JSON, TOML, etc.
pub fn load_input(input_path: &str) -> Result<RenderInput> {
    let input_path = Path::new(input_path);

    // Determine file format based on extension
    let format = match input_path.extension().and_then(|ext| ext.to_str()) {
        Some("yaml") | Some("yml") => FileFormat::Yaml,
        Some("json") => FileFormat::Json,
        Some("toml") => FileFormat::Toml,
        Some("ini") => FileFormat::Ini,
        _ => FileFormat::Yaml, // Default to YAML
    };

    let settings = Config::builder()
        .add_source(File::new(
            input_path
                .to_str()
                .ok_or_else(|| eyre::eyre!("Invalid UTF-8 path: {}", input_path.display()))?,
            format,
        ))
        .build()
        .with_context(|| format!("Failed to build config from {}", input_path.display()))?;

    let input: RenderInput = settings.try_deserialize().with_context(|| {
        format!(
            "Failed to deserialize render input from {}",
            input_path.display()
        )
    })?;

    Ok(input)
}
