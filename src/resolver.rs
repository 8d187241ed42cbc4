use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

use actix_web::{
    HttpRequest, HttpResponse,
    http::header::{self, ContentType, HeaderValue},
    web,
};
use log::{debug, info, warn};

use crate::{
    asset::{AssetError, ResolvedAsset, is_safe_uri_path, join_uri_path},
    cache::WebDir,
    conf::AssetsConfig,
    mime::MimeTable,
};

/// Maps request paths onto files found under a list of search directories.
///
/// Holds only the configuration it was built with; every request is
/// resolved independently, so one resolver can be shared between workers.
#[derive(Debug, Clone)]
pub struct AssetResolver {
    search_paths: Vec<PathBuf>,
    web_dir: Option<WebDir>,
    mime_types: MimeTable,
}

impl Default for AssetResolver {
    fn default() -> Self {
        Self::new(AssetsConfig::default())
    }
}

impl AssetResolver {
    /// Build a resolver. Never fails: a `web_dir` that is not an existing
    /// directory disables caching and no `paths` means nothing is found.
    pub fn new(config: AssetsConfig) -> Self {
        let search_paths: Vec<PathBuf> = config
            .paths
            .into_vec()
            .into_iter()
            .map(PathBuf::from)
            .collect();
        if search_paths.is_empty() {
            warn!("No asset search paths configured, nothing will be served");
        }

        let web_dir = config.web_dir.and_then(WebDir::new);

        Self {
            search_paths,
            web_dir,
            mime_types: MimeTable::with_overrides(&config.mime_types),
        }
    }

    pub fn search_paths(&self) -> &[PathBuf] {
        &self.search_paths
    }

    pub fn web_dir(&self) -> Option<&WebDir> {
        self.web_dir.as_ref()
    }

    pub fn mime_types(&self) -> &MimeTable {
        &self.mime_types
    }

    /// First readable regular file at `<search path><uri_path>`, in search
    /// path order.
    pub fn find_file(&self, uri_path: &str) -> Result<PathBuf, AssetError> {
        if !is_safe_uri_path(uri_path) {
            return Err(AssetError::PathTraversal(uri_path.to_string()));
        }

        self.search_paths
            .iter()
            .map(|root| join_uri_path(root, uri_path))
            .find(|candidate| is_readable_file(candidate))
            .ok_or(AssetError::NotFound)
    }

    pub fn detect_mime_type(&self, file: &Path, contents: &[u8]) -> String {
        self.mime_types.detect(file, contents)
    }

    /// Copy an asset into the web directory, if one is configured.
    /// Failures are logged and otherwise ignored.
    pub fn write_to_cache(&self, uri_path: &str, contents: &[u8]) {
        let Some(web_dir) = &self.web_dir else {
            return;
        };

        if let Err(e) = web_dir.write(uri_path, contents) {
            warn!("Unable to cache {}: {}", uri_path, e);
        }
    }

    /// Find, read and cache the asset for `uri_path`.
    ///
    /// Blocks on filesystem I/O.
    pub fn lookup(&self, uri_path: &str) -> Result<ResolvedAsset, AssetError> {
        let path = self.find_file(uri_path)?;
        let contents = fs::read(&path).map_err(|e| AssetError::Unreadable(path.clone(), e))?;

        self.write_to_cache(uri_path, &contents);

        let mime_type = self.detect_mime_type(&path, &contents);
        debug!("Resolved {} to {} ({})", uri_path, path.display(), mime_type);
        Ok(ResolvedAsset {
            path,
            mime_type,
            contents,
        })
    }

    /// [`AssetResolver::lookup`] on the blocking thread pool.
    pub async fn lookup_blocking(
        self: Arc<Self>,
        uri_path: String,
    ) -> Result<ResolvedAsset, AssetError> {
        match web::block(move || self.lookup(&uri_path)).await {
            Ok(v) => v,
            Err(_) => Err(AssetError::Blocking),
        }
    }

    /// Turn an asset into a `200 OK` response carrying its bytes.
    pub fn respond(asset: ResolvedAsset) -> Result<HttpResponse, AssetError> {
        let content_type = HeaderValue::from_str(&asset.mime_type)
            .map_err(|_| AssetError::InvalidContentType(asset.mime_type.clone()))?;

        info!("Serving {} ({} bytes)", asset.path.display(), asset.len());
        Ok(HttpResponse::Ok()
            .insert_header((header::CONTENT_TYPE, content_type))
            .body(asset.contents))
    }

    /// Serve `req` from the search paths.
    ///
    /// When nothing can be served, the request goes to `next` and its
    /// response is returned untouched; without `next` the answer is a 404.
    pub fn handle<N>(&self, req: &HttpRequest, next: Option<N>) -> HttpResponse
    where
        N: FnOnce(&HttpRequest) -> HttpResponse,
    {
        let uri_path = req.path();
        match self.lookup(uri_path).and_then(Self::respond) {
            Ok(res) => res,
            Err(e) => {
                report_miss(uri_path, &e);
                match next {
                    Some(next) => next(req),
                    None => not_found(uri_path),
                }
            }
        }
    }
}

fn is_readable_file(path: &Path) -> bool {
    path.is_file() && fs::File::open(path).is_ok()
}

/// Plain-text `404 Not Found` for `uri_path`.
pub fn not_found(uri_path: &str) -> HttpResponse {
    HttpResponse::NotFound()
        .content_type(ContentType::plaintext())
        .body(format!("{uri_path} not found"))
}

/// Log why `uri_path` could not be served. Plain misses are routine.
pub(crate) fn report_miss(uri_path: &str, err: &AssetError) {
    match err {
        AssetError::NotFound => debug!("No asset for {}", uri_path),
        AssetError::InvalidContentType(_) => warn!("Unable to serve {}. {}", uri_path, err),
        _ => warn!("Unable to resolve {}: {}", uri_path, err),
    }
}
