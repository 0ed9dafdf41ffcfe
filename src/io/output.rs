//! About the output directories.
use std::fs;
use std::path::{Path, PathBuf};
use crate::common::error::DispatchError;





/// An output directory that has been created and fully cleared of any
/// previous contents. Holding a value of this type is the proof that the
/// directory is ready to receive the current run's files, so a re-run never
/// mixes stale and fresh output.
///
/// Only the coordinator rank prepares directories; the other workers learn
/// the resulting paths from the setup broadcast.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PreparedDir
{
    path: PathBuf,
}

impl PreparedDir
{
    /// Create the directory if absent and remove everything inside it
    /// (files, symlinks, and subdirectories).
    ///
    /// # Parameters
    /// ```text
    /// path: the output directory to be created and cleared
    /// ```
    pub fn prepare(path: &Path) -> Result<Self, DispatchError>
    {
        fs::create_dir_all(path).map_err(|source| DispatchError::InvalidPath
        {
            path: path.to_path_buf(),
            source,
        })?;
        clear_dir(path)?;

        Ok(PreparedDir
        {
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path
    {
        &self.path
    }

    pub fn into_path(self) -> PathBuf
    {
        self.path
    }
}





/// Remove every entry of the given directory: files and symlinks are
/// unlinked, subdirectories are removed recursively.
fn clear_dir(dir: &Path) -> Result<(), DispatchError>
{
    let invalid_path = |source| DispatchError::InvalidPath
    {
        path: dir.to_path_buf(),
        source,
    };

    for entry in fs::read_dir(dir).map_err(invalid_path)?
    {
        let entry = entry.map_err(invalid_path)?;
        let file_type = entry.file_type().map_err(invalid_path)?;

        // A symlink to a directory must be unlinked, not descended into
        if file_type.is_dir()
        {
            fs::remove_dir_all(entry.path()).map_err(invalid_path)?;
        }
        else
        {
            fs::remove_file(entry.path()).map_err(invalid_path)?;
        }
    }

    Ok(())
}
