pub mod asset;
pub mod cache;
pub mod conf;
pub mod middleware;
pub mod mime;
pub mod resolver;
pub mod routes;
pub mod templates;

pub use asset::{AssetError, ResolvedAsset};
pub use conf::AssetsConfig;
pub use middleware::AssetsManager;
pub use resolver::AssetResolver;
