use std::{
    fmt, io,
    path::{Path, PathBuf},
};

#[derive(Debug)]
pub enum AssetError {
    NotFound,
    PathTraversal(String),
    Unreadable(PathBuf, io::Error),
    CacheNotWritable(PathBuf),
    Cache(PathBuf, io::Error),
    InvalidContentType(String),
    Blocking,
}

impl fmt::Display for AssetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetError::NotFound => write!(f, "asset not found"),
            AssetError::PathTraversal(p) => write!(f, "refusing to resolve unsafe path {p:?}"),
            AssetError::Unreadable(p, e) => write!(f, "unable to read {}: {e}", p.display()),
            AssetError::CacheNotWritable(p) => write!(f, "directory {} is not writable", p.display()),
            AssetError::Cache(p, e) => write!(f, "unable to cache {}: {e}", p.display()),
            AssetError::InvalidContentType(m) => write!(f, "invalid content type {m:?}"),
            AssetError::Blocking => write!(f, "blocking asset lookup was cancelled"),
        }
    }
}

impl std::error::Error for AssetError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AssetError::Unreadable(_, e) | AssetError::Cache(_, e) => Some(e),
            _ => None,
        }
    }
}

/// A file found under one of the search paths, read into memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAsset {
    /// Where the file was found on disk.
    pub path: PathBuf,
    pub mime_type: String,
    pub contents: Vec<u8>,
}

impl ResolvedAsset {
    pub fn len(&self) -> usize {
        self.contents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contents.is_empty()
    }
}

/// `root` followed by `uri_path` as-is, the way the request path maps onto a
/// directory (`/srv/assets` + `/css/app.css`).
pub fn join_uri_path(root: &Path, uri_path: &str) -> PathBuf {
    let mut raw = root.as_os_str().to_os_string();
    raw.push(uri_path);
    PathBuf::from(raw)
}

/// Request paths that can be mapped onto a directory without escaping it.
pub fn is_safe_uri_path(uri_path: &str) -> bool {
    uri_path.starts_with('/')
        && !uri_path.contains('\0')
        && !uri_path.contains('\\')
        && !uri_path.split('/').any(|segment| segment == "..")
}
