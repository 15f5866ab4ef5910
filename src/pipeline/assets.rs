//! Uploaded asset handles
//!
//! The collaborator receiving uploads hands the core a local path. The core
//! reads the file itself, once per cascade attempt, and never deletes it.

use std::path::{Path, PathBuf};

/// A file submitted for analysis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    path: PathBuf,
    name: String,
}

impl Asset {
    /// Asset named after its file name.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self { path, name }
    }

    /// Asset with an explicit display name (e.g. the original upload name).
    pub fn named(path: impl Into<PathBuf>, name: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            name: name.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Content type guessed from the file extension, for transcription uploads.
    pub fn audio_mime_type(&self) -> String {
        mime_guess::from_path(&self.path)
            .first()
            .filter(|m| m.type_() == mime_guess::mime::AUDIO || m.type_() == mime_guess::mime::VIDEO)
            .map_or_else(|| "audio/wav".to_string(), |m| m.essence_str().to_string())
    }

    /// Size on disk in bytes.
    pub async fn size(&self) -> std::io::Result<u64> {
        Ok(tokio::fs::metadata(&self.path).await?.len())
    }

    /// Read the whole file.
    pub async fn read(&self) -> std::io::Result<Vec<u8>> {
        tokio::fs::read(&self.path).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_from_path() {
        let asset = Asset::from_path("/tmp/uploads/leaf_01.jpg");
        assert_eq!(asset.name(), "leaf_01.jpg");
        assert_eq!(Asset::named("/tmp/x", "field photo").name(), "field photo");
    }

    #[test]
    fn test_audio_mime_type_guess() {
        assert_eq!(Asset::from_path("note.mp3").audio_mime_type(), "audio/mpeg");
        // Non-audio or unknown extensions fall back to WAV
        assert_eq!(Asset::from_path("note.txt").audio_mime_type(), "audio/wav");
        assert_eq!(Asset::from_path("recording").audio_mime_type(), "audio/wav");
    }

    #[tokio::test]
    async fn test_read_and_size() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("leaf.jpg");
        std::fs::write(&path, b"jpegbytes").unwrap();

        let asset = Asset::from_path(&path);
        assert_eq!(asset.size().await.unwrap(), 9);
        assert_eq!(asset.read().await.unwrap(), b"jpegbytes");
    }
}
