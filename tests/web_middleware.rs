use std::{
    fs,
    path::Path,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
};

use actix_web::{
    App, HttpResponse,
    http::{StatusCode, header},
    test, web,
};
use assetshelf::{AssetResolver, AssetsManager, conf::AssetsConfig};

fn init_logger() {
    let _ = env_logger::builder()
        .is_test(true)
        .filter_level(log::LevelFilter::Debug)
        .try_init();
}

fn write_file(root: &Path, name: &str, contents: &[u8]) {
    let path = root.join(name);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

fn dir_str(path: &Path) -> String {
    path.to_str().unwrap().to_string()
}

/// Counts how often the wrapped service is reached.
#[derive(Default)]
struct NextCalls(AtomicUsize);

async fn next_handler(calls: web::Data<NextCalls>) -> HttpResponse {
    calls.0.fetch_add(1, Ordering::SeqCst);
    HttpResponse::build(StatusCode::IM_A_TEAPOT)
        .insert_header(("X-Next", "1"))
        .body("from next")
}

/* -------------------------------------------------------------------------- */
/*                                 Delegation                                 */
/* -------------------------------------------------------------------------- */

/// A hit is answered by the middleware, the wrapped service never runs
#[tokio::test]
async fn middleware_serves_asset() {
    init_logger();

    let assets = tempfile::tempdir().unwrap();
    write_file(assets.path(), "test.js", b"console.log(1);");

    let calls = web::Data::new(NextCalls::default());
    let manager = AssetsManager::new(AssetsConfig::default().with_paths(dir_str(assets.path()).as_str()));
    let app = test::init_service(
        App::new()
            .app_data(calls.clone())
            .wrap(manager)
            .default_service(web::to(next_handler)),
    )
    .await;

    let req = test::TestRequest::get().uri("/test.js").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 200);
    assert_eq!(
        resp.headers().get(header::CONTENT_TYPE).unwrap(),
        "application/javascript"
    );
    assert!(resp.headers().get("X-Next").is_none());
    let body = test::read_body(resp).await;
    assert_eq!(body, "console.log(1);");
    assert_eq!(calls.0.load(Ordering::SeqCst), 0);
}

/// A miss returns whatever the wrapped service answers, and caches nothing
#[tokio::test]
async fn middleware_delegates_miss() {
    init_logger();

    let assets = tempfile::tempdir().unwrap();
    let public = tempfile::tempdir().unwrap();
    write_file(assets.path(), "test.js", b"console.log(1);");

    let calls = web::Data::new(NextCalls::default());
    let manager = AssetsManager::new(
        AssetsConfig::default()
            .with_paths(dir_str(assets.path()).as_str())
            .with_web_dir(dir_str(public.path())),
    );
    let app = test::init_service(
        App::new()
            .app_data(calls.clone())
            .wrap(manager)
            .default_service(web::to(next_handler)),
    )
    .await;

    let req = test::TestRequest::get().uri("/missing.txt").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 418);
    assert_eq!(resp.headers().get("X-Next").unwrap(), "1");
    let body = test::read_body(resp).await;
    assert_eq!(body, "from next");

    assert_eq!(calls.0.load(Ordering::SeqCst), 1);
    assert_eq!(fs::read_dir(public.path()).unwrap().count(), 0);
}

/// Routes registered behind the middleware keep working
#[tokio::test]
async fn middleware_keeps_routes() {
    init_logger();

    let assets = tempfile::tempdir().unwrap();
    write_file(assets.path(), "api/status", b"static status");

    let manager = AssetsManager::new(AssetsConfig::default().with_paths(dir_str(assets.path()).as_str()));
    let app = test::init_service(
        App::new()
            .wrap(manager)
            .route("/api/health", web::get().to(|| async { HttpResponse::Ok().body("ok") })),
    )
    .await;

    let req = test::TestRequest::get().uri("/api/health").to_request();
    let body = test::call_and_read_body(&app, req).await;
    assert_eq!(body, "ok");

    // Assets shadow routes for the same path
    let req = test::TestRequest::get().uri("/api/status").to_request();
    let body = test::call_and_read_body(&app, req).await;
    assert_eq!(body, "static status");

    let req = test::TestRequest::get().uri("/api/nothing").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 404);
}

/// An asset whose Content-Type cannot be sent falls back to the wrapped service
#[tokio::test]
async fn middleware_commit_failure_delegates() {
    init_logger();

    let assets = tempfile::tempdir().unwrap();
    write_file(assets.path(), "app.js", b"1");

    let calls = web::Data::new(NextCalls::default());
    let manager = AssetsManager::new(
        AssetsConfig::default()
            .with_paths(dir_str(assets.path()).as_str())
            .with_mime_type("js", "broken\r\nheader"),
    );
    let app = test::init_service(
        App::new()
            .app_data(calls.clone())
            .wrap(manager)
            .default_service(web::to(next_handler)),
    )
    .await;

    let req = test::TestRequest::get().uri("/app.js").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 418);
    assert_eq!(calls.0.load(Ordering::SeqCst), 1);
}

/// One resolver can back several apps
#[tokio::test]
async fn middleware_shared_resolver() {
    init_logger();

    let assets = tempfile::tempdir().unwrap();
    write_file(assets.path(), "shared.css", b"a {}");

    let resolver = Arc::new(AssetResolver::new(
        AssetsConfig::default().with_paths(dir_str(assets.path()).as_str()),
    ));

    for _ in 0..2 {
        let app = test::init_service(
            App::new()
                .wrap(AssetsManager::from_resolver(Arc::clone(&resolver)))
                .default_service(web::to(|| async { HttpResponse::NotFound().finish() })),
        )
        .await;

        let req = test::TestRequest::get().uri("/shared.css").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status().as_u16(), 200);
        assert_eq!(resp.headers().get(header::CONTENT_TYPE).unwrap(), "text/css");
    }
}
