//! Filesystem storage for tool photos and QR codes.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use toolcrib_common::{Error, Result, ToolId};

use super::qr::render_qr_png;

/// URL prefix the upload directory is served under.
pub const PUBLIC_PREFIX: &str = "/uploads";

const ALLOWED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp"];

/// Whether a client-supplied file name has an accepted photo extension.
pub fn allowed_photo(filename: &str) -> bool {
    filename
        .rsplit_once('.')
        .map(|(_, ext)| ALLOWED_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Reduce a client-supplied file name to a safe, flat file name.
///
/// Directory components are dropped, whitespace becomes `_`, anything other
/// than ASCII alphanumerics, `.`, `-` and `_` is removed, and leading dots
/// and underscores are stripped. Returns `upload` if nothing survives.
pub fn sanitize_filename(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or("");

    let cleaned: String = base
        .chars()
        .filter_map(|c| match c {
            c if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') => Some(c),
            c if c.is_whitespace() => Some('_'),
            _ => None,
        })
        .collect();

    let cleaned = cleaned.trim_start_matches(['.', '_']);
    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned.to_string()
    }
}

/// The upload directory.
#[derive(Debug, Clone)]
pub struct UploadStore {
    dir: PathBuf,
}

impl UploadStore {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Create the directory if it does not exist yet.
    pub fn ensure_dir(&self) -> Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        Ok(())
    }

    /// Store an uploaded photo.
    ///
    /// Returns `Ok(None)` when the upload is empty or its extension is not an
    /// accepted photo type; such uploads are ignored. Content that does not
    /// look like an image is rejected.
    ///
    /// The file is stored as `<YYYYmmddHHMMSS>_<sanitized name>` and the
    /// public path (`/uploads/<file>`) is returned.
    pub fn store_photo(
        &self,
        original_name: &str,
        data: &[u8],
        now: DateTime<Utc>,
    ) -> Result<Option<String>> {
        if data.is_empty() || !allowed_photo(original_name) {
            tracing::debug!("Ignoring upload {:?}", original_name);
            return Ok(None);
        }

        image::guess_format(data).map_err(|_| {
            Error::invalid_input(format!("{} is not a recognized image", original_name))
        })?;

        let filename = format!(
            "{}_{}",
            now.format("%Y%m%d%H%M%S"),
            sanitize_filename(original_name)
        );

        self.ensure_dir()?;
        let path = self.dir.join(&filename);
        std::fs::write(&path, data)?;
        tracing::info!("Stored photo {}", path.display());

        Ok(Some(format!("{}/{}", PUBLIC_PREFIX, filename)))
    }

    /// Delete a file previously stored under `public_path`.
    ///
    /// Paths outside the upload directory are ignored, as is a file that is
    /// already gone.
    pub fn remove(&self, public_path: &str) -> Result<()> {
        let Some(file) = public_path
            .strip_prefix(PUBLIC_PREFIX)
            .and_then(|p| p.strip_prefix('/'))
        else {
            return Ok(());
        };
        if file.is_empty() || file.contains(['/', '\\']) || file.starts_with('.') {
            return Ok(());
        }

        match std::fs::remove_file(self.dir.join(file)) {
            Ok(()) => {
                tracing::debug!("Removed upload {}", file);
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Render and store the QR code for a tool, returning its public path.
    pub fn store_qr(&self, tool_id: ToolId, target_url: &str) -> Result<String> {
        let png = render_qr_png(target_url)?;
        let filename = format!("qr_tool_{}.png", tool_id);

        self.ensure_dir()?;
        std::fs::write(self.dir.join(&filename), png)?;
        tracing::debug!("Wrote QR code for tool {} -> {}", tool_id, target_url);

        Ok(format!("{}/{}", PUBLIC_PREFIX, filename))
    }
}
