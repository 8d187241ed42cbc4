//! Default Actix route for serving assets.

use actix_web::{HttpRequest, HttpResponse, http::header::ContentType, web};
use log::debug;

use crate::{
    resolver::{AssetResolver, not_found, report_miss},
    routes::RouteSharedData,
    templates::render_not_found,
};

pub async fn serve_asset(
    data: web::Data<RouteSharedData<'static>>,
    req: HttpRequest,
) -> HttpResponse {
    let uri_path = req.path().to_string();
    debug!("Asset requested: {}", uri_path);

    let served = data
        .resolver
        .clone()
        .lookup_blocking(uri_path.clone())
        .await
        .and_then(AssetResolver::respond);

    match served {
        Ok(res) => res,
        Err(e) => {
            report_miss(&uri_path, &e);
            match render_not_found(&data.jinja, &data.server, &uri_path) {
                Some(page) => HttpResponse::NotFound()
                    .content_type(ContentType::html())
                    .body(page),
                None => not_found(&uri_path),
            }
        }
    }
}
