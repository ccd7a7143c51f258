use crate::config::VideoConfig;
use log::debug;
use std::io::{self, Write};
use std::path::Path;
use tempfile::NamedTempFile;

/// A per-request copy of the session cookies.
///
/// yt-dlp rewrites its cookie file on exit, so each request gets a private
/// file. The file is removed when the jar is dropped.
#[derive(Debug)]
pub struct CookieJar {
    file: NamedTempFile,
}

impl CookieJar {
    /// Build a jar from configured cookie content or a cookie file.
    ///
    /// Returns `Ok(None)` when no cookies are configured.
    pub fn from_config(config: &VideoConfig) -> io::Result<Option<Self>> {
        let scratch = config.scratch_dir();
        if let Some(content) = config.cookies.as_deref().filter(|c| !c.trim().is_empty()) {
            return Self::with_content(&scratch, content).map(Some);
        }
        if let Some(path) = &config.cookies_file {
            let content = std::fs::read_to_string(path)?;
            return Self::with_content(&scratch, &content).map(Some);
        }
        Ok(None)
    }

    pub fn with_content(scratch_dir: &Path, content: &str) -> io::Result<Self> {
        let mut file = tempfile::Builder::new()
            .prefix("cookies-")
            .suffix(".txt")
            .tempfile_in(scratch_dir)?;
        if !content.starts_with("# Netscape HTTP Cookie File") {
            writeln!(file, "# Netscape HTTP Cookie File")?;
        }
        file.write_all(content.as_bytes())?;
        if !content.ends_with('\n') {
            writeln!(file)?;
        }
        file.flush()?;
        debug!("Wrote cookie jar to {}", file.path().display());
        Ok(Self { file })
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }
}
