use std::io::ErrorKind;

use super::ScenarioError;
use crate::keypath::{GENERATED_DIRS, GENERATED_FILES};
use crate::terraform::TerraformExecutor;

/// Destroys everything the module created and removes the files terraform
/// and the generator left in its directory. Does nothing when `enabled` is
/// false, so a failed run can be inspected.
pub async fn cleanup(executor: &dyn TerraformExecutor, enabled: bool) -> Result<(), ScenarioError> {
    let dir = executor.working_dir();
    if !enabled {
        tracing::info!(dir = %dir.display(), "cleanup disabled, leaving resources in place");
        return Ok(());
    }

    executor.destroy().await?;

    for file in GENERATED_FILES {
        let path = dir.join(file);
        match std::fs::remove_file(&path) {
            Ok(()) => tracing::debug!(path = %path.display(), "removed"),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(source) => {
                return Err(ScenarioError::Cleanup {
                    path: path.display().to_string(),
                    source,
                });
            }
        }
    }
    for sub in GENERATED_DIRS {
        let path = dir.join(sub);
        match std::fs::remove_dir_all(&path) {
            Ok(()) => tracing::debug!(path = %path.display(), "removed"),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(source) => {
                return Err(ScenarioError::Cleanup {
                    path: path.display().to_string(),
                    source,
                });
            }
        }
    }

    tracing::info!(dir = %dir.display(), "cleanup complete");
    Ok(())
}
