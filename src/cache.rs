use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};

use log::{debug, info};

use crate::asset::{AssetError, join_uri_path};

/// The public directory resolved assets are copied into, so the front web
/// server can serve them directly next time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebDir {
    root: PathBuf,
}

impl WebDir {
    /// `None` unless `root` is an existing directory.
    pub fn new(root: impl Into<PathBuf>) -> Option<Self> {
        let root = root.into();
        if root.is_dir() {
            Some(Self { root })
        } else {
            debug!("Web directory {} does not exist, caching disabled", root.display());
            None
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Where `uri_path` would be cached. `uri_path` is appended verbatim.
    pub fn destination(&self, uri_path: &str) -> PathBuf {
        join_uri_path(&self.root, uri_path)
    }

    /// Whether the root still exists and has a write bit set.
    ///
    /// Only the permission bits are read, so a root that passes can still
    /// refuse the write itself. [`WebDir::write`] reports that as
    /// [`AssetError::Cache`].
    pub fn is_writable(&self) -> bool {
        match fs::metadata(&self.root) {
            Ok(meta) => meta.is_dir() && !meta.permissions().readonly(),
            Err(_) => false,
        }
    }

    /// Copy `contents` to `<root><uri_path>`, replacing whatever is there.
    ///
    /// Missing parent directories are created. The bytes go to a sibling
    /// temporary file first and are renamed into place, so a reader never
    /// sees a partial file.
    pub fn write(&self, uri_path: &str, contents: &[u8]) -> Result<PathBuf, AssetError> {
        if !self.is_writable() {
            return Err(AssetError::CacheNotWritable(self.root.clone()));
        }

        let dest = self.destination(uri_path);
        let Some(parent) = dest.parent() else {
            return Err(AssetError::CacheNotWritable(dest));
        };
        fs::create_dir_all(parent).map_err(|e| AssetError::Cache(parent.to_path_buf(), e))?;

        // Short fixed-length temp name, so any name that fits as `dest` fits here
        let mut builder = tempfile::Builder::new();
        builder.prefix(".");
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            // Same mode as a plain create, the front server has to read it
            builder.permissions(fs::Permissions::from_mode(0o666));
        }

        let mut tmp = builder
            .tempfile_in(parent)
            .map_err(|e| AssetError::Cache(dest.clone(), e))?;
        tmp.write_all(contents)
            .map_err(|e| AssetError::Cache(dest.clone(), e))?;
        tmp.persist(&dest)
            .map_err(|e| AssetError::Cache(dest.clone(), e.error))?;

        info!("Cached {} ({} bytes)", dest.display(), contents.len());
        Ok(dest)
    }
}
