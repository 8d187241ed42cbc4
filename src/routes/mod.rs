use std::sync::Arc;

use actix_web::web::{self, ServiceConfig};
use minijinja::Environment;

use crate::{conf::ServerConfig, resolver::AssetResolver, templates::TemplateServerContext};

pub mod assets;

/// This serves as state for the Actix server.
pub struct RouteSharedData<'a> {
    pub resolver: Arc<AssetResolver>,
    pub jinja: Environment<'a>,
    pub server: TemplateServerContext,
}

/* -------------------------------------------------------------------------- */
/*                                Registration                                */
/* -------------------------------------------------------------------------- */

/// Serve assets for every request that no other route claims, answering
/// 404 when nothing matches.
pub fn setup_service_config<'a>(
    web_config: &'a mut ServiceConfig,
    server_config: &ServerConfig,
    templates: Option<Environment<'static>>,
) -> &'a mut ServiceConfig {
    let resolver = Arc::new(AssetResolver::new(server_config.assets.clone()));
    setup_service_config_with(web_config, server_config, resolver, templates)
}

/// Like [`setup_service_config`], sharing an existing resolver.
pub fn setup_service_config_with<'a>(
    web_config: &'a mut ServiceConfig,
    server_config: &ServerConfig,
    resolver: Arc<AssetResolver>,
    templates: Option<Environment<'static>>,
) -> &'a mut ServiceConfig {
    web_config.app_data(web::Data::new(RouteSharedData {
        resolver,
        jinja: match templates {
            Some(v) => v,
            None => crate::templates::templates_from_builtin(),
        },
        server: TemplateServerContext::new(&server_config.general.name),
    }));
    web_config.default_service(web::to(assets::serve_asset));

    web_config
}
