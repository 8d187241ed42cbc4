use std::sync::Arc;

use actix_web::{
    App, HttpServer,
    middleware::{Compress, Logger},
};
use assetshelf::{AssetResolver, conf::ServerConfig, routes::setup_service_config_with};
use clap::{Command, arg, crate_authors, crate_description, crate_name, crate_version};
use config::{Config, File};
use fern::colors::{Color, ColoredLevelConfig};
use log::{info, warn};

fn setup_logger(level: log::LevelFilter, file: Option<&str>) -> Result<(), fern::InitError> {
    let colors = ColoredLevelConfig::new()
        .info(Color::BrightGreen)
        .error(Color::BrightRed)
        .warn(Color::BrightYellow);

    let mut dispatch = fern::Dispatch::new()
        .format(move |out, message, record| {
            out.finish(format_args!(
                "[{}] [{}] {}",
                colors.color(record.level()),
                record.target(),
                message
            ))
        })
        .level(level)
        .chain(std::io::stdout());

    if let Some(file) = file {
        dispatch = dispatch.chain(fern::log_file(file)?);
    }

    dispatch.apply()?;
    Ok(())
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let cmd = Command::new(crate_name!())
        .version(crate_version!())
        .author(crate_authors!(","))
        .about(crate_description!())
        .arg(arg!(-c --config <FILE> "Path to a config file").required(false))
        .arg(arg!(-l --log_level <LEVEL> "Sets the logging level").required(false))
        .get_matches();

    let mut settings_builder = Config::builder();
    if let Some(v) = cmd.get_one::<String>("config") {
        settings_builder = settings_builder.add_source(File::with_name(v));
    }

    // Environment wins over the file.
    // Eg.. `ASSETS_ASSETS__WEB_DIR=public ./assetshelf` sets `assets.web_dir`
    settings_builder = settings_builder.add_source(
        config::Environment::with_prefix("ASSETS")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    );

    let mut config = settings_builder
        .build()
        .and_then(|s| s.try_deserialize::<ServerConfig>())
        .map_err(|e| {
            std::io::Error::other(format!("Failed to load server configuration: {e}"))
        })?;

    if let Some(level) = cmd.get_one::<String>("log_level") {
        config.logging.level = level.clone();
    }

    if let Err(e) = setup_logger(config.logging.level_filter(), config.logging.file.as_deref()) {
        eprintln!("Failed to set up logging: {e}");
    }

    let search_paths = config.assets.paths.clone().into_vec();
    info!("Serving assets from {:?}", search_paths);
    let resolver = Arc::new(AssetResolver::new(config.assets.clone()));
    match (resolver.web_dir(), &config.assets.web_dir) {
        (Some(v), _) => info!("Caching served assets into {}", v.root().display()),
        (None, Some(v)) => warn!("web_dir {} is not a directory, assets will not be cached", v),
        (None, None) => warn!("No web_dir configured, assets will not be cached"),
    }

    let bind = (config.general.bind.clone(), config.general.port);
    info!("Listening on {}:{}", bind.0, bind.1);

    HttpServer::new(move || {
        let config = config.clone();
        let resolver = Arc::clone(&resolver);
        App::new()
            .wrap(Compress::default())
            .wrap(Logger::default())
            .configure(move |f| {
                setup_service_config_with(f, &config, resolver, None);
            })
    })
    .bind(bind)?
    .run()
    .await
}
