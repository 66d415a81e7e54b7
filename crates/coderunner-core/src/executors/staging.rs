// src/executors/staging.rs
use std::path::{Path, PathBuf};
use tempfile::{Builder, TempDir};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

/// Caller code written to a uniquely named file inside its own temporary
/// directory. The file and directory are removed when this value is dropped,
/// so every exit path out of a run cleans up after itself.
#[derive(Debug)]
pub struct StagedScript {
    dir: Option<TempDir>,
    script_path: PathBuf,
    file_name: String,
}

impl StagedScript {
    /// Write `code` to `script_<uuid><suffix>` under a fresh `code-exec-*`
    /// directory, created in `parent` or the system temp dir.
    pub async fn stage(
        code: &str,
        suffix: &str,
        parent: Option<&Path>,
    ) -> Result<Self, std::io::Error> {
        let mut builder = Builder::new();
        builder.prefix("code-exec-");
        let dir = match parent {
            Some(parent) => builder.tempdir_in(parent)?,
            None => builder.tempdir()?,
        };

        let file_name = format!("script_{}{}", Uuid::new_v4().simple(), suffix);
        let script_path = dir.path().join(&file_name);

        // Guard owns the directory from here on; an early return below drops it.
        let staged = Self {
            dir: Some(dir),
            script_path,
            file_name,
        };

        let mut file = fs::File::create(&staged.script_path).await?;
        file.write_all(code.as_bytes()).await?;
        file.flush().await?;

        log::debug!("Staged {} bytes at {}", code.len(), staged.script_path.display());
        Ok(staged)
    }

    pub fn path(&self) -> &Path {
        &self.script_path
    }

    /// Host directory holding the script; this is what gets bind-mounted.
    pub fn dir(&self) -> &Path {
        self.script_path
            .parent()
            .unwrap_or_else(|| Path::new("/"))
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Remove the script and its directory, logging instead of failing.
    pub fn cleanup(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if self.script_path.exists() {
            if let Err(e) = std::fs::remove_file(&self.script_path) {
                log::warn!("Failed to remove staged script {}: {}", self.script_path.display(), e);
            }
        }
        if let Some(dir) = self.dir.take() {
            let dir_path = dir.path().to_path_buf();
            if let Err(e) = dir.close() {
                // The sandbox may leave files the host user cannot delete.
                log::warn!("Failed to remove staging directory {}: {}", dir_path.display(), e);
            }
        }
    }
}

impl Drop for StagedScript {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_stage_writes_code() {
        let parent = tempdir().unwrap();
        let staged = StagedScript::stage("print('hello')", ".py", Some(parent.path()))
            .await
            .unwrap();

        assert!(staged.file_name().starts_with("script_"));
        assert!(staged.file_name().ends_with(".py"));
        assert_eq!(std::fs::read_to_string(staged.path()).unwrap(), "print('hello')");
        assert!(staged.dir().starts_with(parent.path()));
    }

    #[tokio::test]
    async fn test_cleanup_removes_file_and_dir() {
        let parent = tempdir().unwrap();
        let staged = StagedScript::stage("x = 1", ".py", Some(parent.path())).await.unwrap();
        let path = staged.path().to_path_buf();
        let dir = staged.dir().to_path_buf();

        staged.cleanup();

        assert!(!path.exists());
        assert!(!dir.exists());
    }

    #[tokio::test]
    async fn test_drop_removes_file() {
        let parent = tempdir().unwrap();
        let path = {
            let staged = StagedScript::stage("x = 1", ".py", Some(parent.path())).await.unwrap();
            staged.path().to_path_buf()
        };
        assert!(!path.exists());
        assert_eq!(std::fs::read_dir(parent.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_names_are_unique() {
        let parent = tempdir().unwrap();
        let a = StagedScript::stage("", ".py", Some(parent.path())).await.unwrap();
        let b = StagedScript::stage("", ".py", Some(parent.path())).await.unwrap();
        assert_ne!(a.path(), b.path());
        assert_ne!(a.dir(), b.dir());
    }

    #[tokio::test]
    async fn test_missing_parent_fails() {
        let result = StagedScript::stage("x", ".py", Some(Path::new("/no/such/parent"))).await;
        assert!(result.is_err());
    }
}
