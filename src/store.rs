use std::fs;
use std::io::Write;

use camino::{Utf8Path, Utf8PathBuf};
use tempfile::Builder;
use tracing::debug;

use crate::domain::CountryCode;
use crate::error::FlashError;

/// On-disk layout of a run: the flags directory and the output document.
#[derive(Debug, Clone)]
pub struct Store {
    flags_dir: Utf8PathBuf,
    output_path: Utf8PathBuf,
}

impl Store {
    pub fn new(flags_dir: Utf8PathBuf, output_path: Utf8PathBuf) -> Self {
        Self {
            flags_dir,
            output_path,
        }
    }

    pub fn flags_dir(&self) -> &Utf8Path {
        &self.flags_dir
    }

    pub fn output_path(&self) -> &Utf8Path {
        &self.output_path
    }

    pub fn flag_path(&self, code: &CountryCode) -> Utf8PathBuf {
        self.flags_dir.join(format!("{}.png", code.to_lowercase()))
    }

    /// Path of the flag as written into `\includegraphics`, always with
    /// forward slashes.
    pub fn flag_reference(&self, code: &CountryCode) -> String {
        self.flag_path(code).as_str().replace('\\', "/")
    }

    pub async fn write_flag(
        &self,
        code: &CountryCode,
        content: &[u8],
    ) -> Result<Utf8PathBuf, FlashError> {
        let path = self.flag_path(code);
        tokio::fs::create_dir_all(self.flags_dir.as_std_path())
            .await
            .map_err(|err| FlashError::Filesystem(format!("create {}: {err}", self.flags_dir)))?;
        let tmp_path = path.with_extension("png.tmp");
        let written = match tokio::fs::write(tmp_path.as_std_path(), content).await {
            Ok(()) => tokio::fs::rename(tmp_path.as_std_path(), path.as_std_path())
                .await
                .map_err(|err| FlashError::Filesystem(format!("rename {tmp_path}: {err}"))),
            Err(err) => Err(FlashError::Filesystem(format!("write {tmp_path}: {err}"))),
        };
        if let Err(err) = written {
            let _ = tokio::fs::remove_file(tmp_path.as_std_path()).await;
            return Err(err);
        }
        debug!(code = %code, path = %path, bytes = content.len(), "flag written");
        Ok(path)
    }

    /// Replaces the output document in one step, so a failed write leaves
    /// the previous file intact.
    pub fn write_document(&self, content: &str) -> Result<(), FlashError> {
        let parent = match self.output_path.parent() {
            Some(parent) if !parent.as_str().is_empty() => parent.to_path_buf(),
            _ => Utf8PathBuf::from("."),
        };
        fs::create_dir_all(parent.as_std_path())
            .map_err(|err| FlashError::Filesystem(format!("create {parent}: {err}")))?;
        let mut temp = Builder::new()
            .prefix("flagdeck-doc")
            .tempfile_in(parent.as_std_path())
            .map_err(|err| FlashError::Filesystem(err.to_string()))?;
        temp.write_all(content.as_bytes())
            .map_err(|err| FlashError::Filesystem(err.to_string()))?;
        temp.persist(self.output_path.as_std_path()).map_err(|err| {
            FlashError::Filesystem(format!("persist {}: {}", self.output_path, err.error))
        })?;
        Ok(())
    }
}
