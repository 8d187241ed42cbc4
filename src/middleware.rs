//! Actix middleware serving assets ahead of the wrapped service.
//!
//! A request that resolves to an asset is answered directly. Anything else,
//! including assets that cannot be turned into a response, is passed on to
//! the wrapped service untouched.

use std::{
    future::{Future, Ready, ready},
    pin::Pin,
    rc::Rc,
    sync::Arc,
};

use actix_web::{
    Error,
    body::{EitherBody, MessageBody},
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
};

use crate::{
    conf::AssetsConfig,
    resolver::{AssetResolver, report_miss},
};

/// `App::wrap` this to serve assets before any route sees the request.
#[derive(Clone)]
pub struct AssetsManager {
    resolver: Arc<AssetResolver>,
}

impl AssetsManager {
    pub fn new(config: AssetsConfig) -> Self {
        Self::from_resolver(Arc::new(AssetResolver::new(config)))
    }

    pub fn from_resolver(resolver: Arc<AssetResolver>) -> Self {
        Self { resolver }
    }

    pub fn resolver(&self) -> &Arc<AssetResolver> {
        &self.resolver
    }
}

impl<S, B> Transform<S, ServiceRequest> for AssetsManager
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = AssetsManagerMiddleware<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AssetsManagerMiddleware {
            service: Rc::new(service),
            resolver: Arc::clone(&self.resolver),
        }))
    }
}

pub struct AssetsManagerMiddleware<S> {
    service: Rc<S>,
    resolver: Arc<AssetResolver>,
}

impl<S, B> Service<ServiceRequest> for AssetsManagerMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let resolver = Arc::clone(&self.resolver);

        Box::pin(async move {
            let uri_path = req.path().to_string();
            let served = resolver
                .lookup_blocking(uri_path.clone())
                .await
                .and_then(AssetResolver::respond);

            match served {
                Ok(res) => Ok(req.into_response(res).map_into_right_body()),
                Err(e) => {
                    report_miss(&uri_path, &e);
                    let res = service.call(req).await?;
                    Ok(res.map_into_left_body())
                }
            }
        })
    }
}
