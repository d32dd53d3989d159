//! Locations of the Terraform working directories and the generated
//! `main.tf`.

use std::path::{Path, PathBuf};

pub const MAIN_TF: &str = "main.tf";

pub const RANCHER_KEY_PATH: &str = "tfp-automation/modules/rancher2";
pub const REGISTRY_KEY_PATH: &str = "tfp-automation/modules/registries";
pub const SANITY_KEY_PATH: &str = "tfp-automation/modules/sanity";

/// Files terraform leaves behind in a module directory.
pub const GENERATED_FILES: [&str; 4] = [
    MAIN_TF,
    "terraform.tfstate",
    "terraform.tfstate.backup",
    ".terraform.lock.hcl",
];
pub const GENERATED_DIRS: [&str; 1] = [".terraform"];

/// Resolves a module directory under the user's home directory.
///
/// Absolute paths are returned unchanged. Falls back to the relative path
/// when no home directory is known.
pub fn set_key_path(key_path: &str) -> PathBuf {
    let path = Path::new(key_path);
    if path.is_absolute() {
        return path.to_path_buf();
    }

    match dirs::home_dir() {
        Some(home) => home.join(path),
        None => path.to_path_buf(),
    }
}

pub fn main_tf_path(dir: &Path) -> PathBuf {
    dir.join(MAIN_TF)
}

/// Truncates `main.tf` in `dir` and writes `content` in full.
pub fn write_main_tf(dir: &Path, content: &[u8]) -> std::io::Result<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let path = main_tf_path(dir);
    std::fs::write(&path, content)?;
    tracing::debug!(path = %path.display(), bytes = content.len(), "wrote main.tf");
    Ok(path)
}
