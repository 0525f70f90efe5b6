//! CLI command implementations

pub mod apply;
pub mod list;
pub mod run;

use anyhow::{Context, Result, anyhow};
use pixfx_core::ImageAdapter;
use std::path::Path;

/// Load image from path
pub fn load_image(path: &Path) -> Result<ImageAdapter> {
    pixfx_io::read(path).with_context(|| format!("Failed to load: {}", path.display()))
}

/// Save image to path
pub fn save_image(path: &Path, image: &ImageAdapter) -> Result<()> {
    pixfx_io::write(path, image).with_context(|| format!("Failed to save: {}", path.display()))
}

/// Splits `Name=Value` at the first `=`.
pub fn split_assignment(arg: &str) -> Result<(&str, &str)> {
    let (name, value) = arg
        .split_once('=')
        .ok_or_else(|| anyhow!("expected NAME=VALUE, got '{}'", arg))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(anyhow!("missing parameter name in '{}'", arg));
    }
    Ok((name, value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_assignment() {
        assert_eq!(split_assignment("Radius=2.5").unwrap(), ("Radius", "2.5"));
        assert_eq!(split_assignment("Kernel=1 2; 3 4").unwrap(), ("Kernel", "1 2; 3 4"));
        assert_eq!(split_assignment("Matrix=a=b").unwrap(), ("Matrix", "a=b"));
        assert!(split_assignment("Radius").is_err());
        assert!(split_assignment("=3").is_err());
    }
}
