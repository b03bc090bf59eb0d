//! Content file handling
//!
//! `hero.toml` overrides any part of the hero content; missing fields keep
//! the built-in page content.

use anyhow::{Context, Result};
use hero_scene::HeroContent;
use std::fs;
use std::path::Path;

/// Default content file name looked up in the working directory
pub const CONTENT_FILE: &str = "hero.toml";

/// Load content from `path`, or from `hero.toml` if present, or defaults
pub fn load_content(path: Option<&Path>) -> Result<HeroContent> {
    let path = match path {
        Some(path) => path,
        None => {
            let default = Path::new(CONTENT_FILE);
            if !default.exists() {
                tracing::debug!("no {} found, using built-in content", CONTENT_FILE);
                return Ok(HeroContent::default());
            }
            default
        }
    };

    let source = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    parse_content(&source).with_context(|| format!("Failed to parse {}", path.display()))
}

/// Parse a content file
pub fn parse_content(source: &str) -> Result<HeroContent> {
    let content: HeroContent = toml::from_str(source)?;
    Ok(content)
}
