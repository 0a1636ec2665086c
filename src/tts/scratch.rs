use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tempfile::TempPath;

/// Hands out uniquely named per-request WAV files under a single root
/// directory.
pub struct ScratchStore {
    root: PathBuf,
}

impl ScratchStore {
    pub fn new(root: impl Into<PathBuf>) -> io::Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Reserve a fresh artifact for one request. The name never collides
    /// with a concurrently live artifact.
    pub fn acquire(&self) -> io::Result<ScratchArtifact> {
        let file = tempfile::Builder::new()
            .prefix("tts-")
            .suffix(".wav")
            .tempfile_in(&self.root)?;

        Ok(ScratchArtifact {
            path: file.into_temp_path(),
        })
    }
}

/// A scoped scratch file. The file is removed when this value is dropped,
/// on every exit path; removal by an external actor first is tolerated.
pub struct ScratchArtifact {
    path: TempPath,
}

impl ScratchArtifact {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn read(&self) -> io::Result<Vec<u8>> {
        fs::read(self.path())
    }
}
