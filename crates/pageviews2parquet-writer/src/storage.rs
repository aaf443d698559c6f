//! Storage operator initialization
//!
//! Plain OpenDAL filesystem operators: one rooted at the output tree, one at
//! the scratch directory. Writes are staged under a dot-prefixed sibling name
//! and renamed into place, so readers never observe a half-written file under
//! its final name and nothing but partitions accumulates in the output tree.
//!
//! The scratch operator is built on first use. Building an fs operator
//! creates its root, and runs that parse a local `--input` never download.

use crate::error::{Result, WriterError};
use opendal::{services, Operator};
use pageviews2parquet_config::StorageConfig;
use std::path::{Path, PathBuf};

/// Output operator plus scratch location for one run
#[derive(Clone, Debug)]
pub struct Storage {
    output: Operator,
    output_root: PathBuf,
    scratch_dir: PathBuf,
}

impl Storage {
    /// Create operators from the storage section of the runtime config
    pub fn from_config(config: &StorageConfig) -> Result<Self> {
        Self::new(&config.output_root, &config.scratch_dir)
    }

    pub fn new(output_root: impl AsRef<Path>, scratch_dir: impl AsRef<Path>) -> Result<Self> {
        let output_root = output_root.as_ref().to_path_buf();
        let scratch_dir = scratch_dir.as_ref().to_path_buf();

        let output = fs_operator(&output_root)?;

        tracing::debug!(
            output_root = %output_root.display(),
            scratch_dir = %scratch_dir.display(),
            "Storage operators initialized"
        );

        Ok(Self {
            output,
            output_root,
            scratch_dir,
        })
    }

    pub fn output_root(&self) -> &Path {
        &self.output_root
    }

    pub fn scratch_dir(&self) -> &Path {
        &self.scratch_dir
    }

    pub(crate) fn output_operator(&self) -> &Operator {
        &self.output
    }

    /// Operator rooted at the scratch directory, creating the directory
    pub(crate) fn scratch_operator(&self) -> Result<Operator> {
        fs_operator(&self.scratch_dir)
    }

    /// Local path of a scratch file by name
    pub fn scratch_path(&self, name: &str) -> PathBuf {
        self.scratch_dir.join(name)
    }
}

/// Staging name for `path`: same directory, dot-prefixed, `suffix` appended
pub(crate) fn staging_path(path: &str, suffix: &str) -> String {
    match path.rsplit_once('/') {
        Some((dir, file)) => format!("{dir}/.{file}.{suffix}"),
        None => format!(".{path}.{suffix}"),
    }
}

fn fs_operator(root: &Path) -> Result<Operator> {
    let root_str = root.to_string_lossy();
    let builder = services::Fs::default().root(&root_str);

    Operator::new(builder)
        .map(|op| op.finish())
        .map_err(|e| WriterError::storage_init(root_str.as_ref(), e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pageviews2parquet_config::StorageConfig;

    #[test]
    fn test_storage_from_config_paths() {
        let temp = tempfile::tempdir().unwrap();
        let config = StorageConfig {
            output_root: temp.path().join("out").to_string_lossy().to_string(),
            scratch_dir: temp.path().join("scratch").to_string_lossy().to_string(),
            ..StorageConfig::default()
        };

        let storage = Storage::from_config(&config).unwrap();
        assert_eq!(storage.output_root(), temp.path().join("out"));
        assert_eq!(
            storage.scratch_path("pageviews-20240115-030000.gz"),
            temp.path().join("scratch").join("pageviews-20240115-030000.gz")
        );
    }

    #[test]
    fn test_scratch_dir_created_on_first_use() {
        let temp = tempfile::tempdir().unwrap();
        let storage = Storage::new(temp.path().join("out"), temp.path().join("scratch")).unwrap();
        assert!(!temp.path().join("scratch").exists());

        storage.scratch_operator().unwrap();
        assert!(temp.path().join("scratch").is_dir());
    }

    #[test]
    fn test_staging_path() {
        assert_eq!(
            staging_path("2024/01/15/03.parquet", "tmp"),
            "2024/01/15/.03.parquet.tmp"
        );
        assert_eq!(staging_path("dump.gz", "part"), ".dump.gz.part");
    }
}
