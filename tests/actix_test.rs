use actix_web::http::{header, StatusCode};
use actix_web::{test, App};
use std::fs;
use std::path::Path;
use swagger_ui_middleware::adapter::actix::configure;
use swagger_ui_middleware::{service::INDEX_FILE, SwaggerUi, UiOptions};
use tempfile::TempDir;

/// Helper function to create a served directory holding a stylesheet
fn create_dist_dir() -> TempDir {
    let _ = env_logger::builder().is_test(true).try_init();
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    fs::write(temp_dir.path().join("index.css"), "body { margin: 0; }\n").unwrap();
    temp_dir
}

fn create_ui(options: UiOptions, dist_dir: &Path) -> SwaggerUi {
    SwaggerUi::new(options.build().unwrap())
        .unwrap()
        .with_dist_dir(dist_dir)
}

fn content_type(response: &actix_web::dev::ServiceResponse) -> String {
    response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

#[actix_web::test]
async fn test_root_serves_rendered_page() {
    let dist_dir = create_dist_dir();
    let ui = create_ui(UiOptions::new().title("Actix Docs"), dist_dir.path());
    let app = test::init_service(App::new().configure(configure("/docs", ui))).await;

    for uri in ["/docs", "/docs/"] {
        let response = test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await;
        assert_eq!(response.status(), StatusCode::OK, "GET {}", uri);
        assert!(content_type(&response).starts_with("text/html"));

        let body = test::read_body(response).await;
        let body = String::from_utf8_lossy(&body).replace("&#x2f;", "/");
        assert!(body.contains("<title>Actix Docs</title>"));
        assert!(body.contains("href=\"/docs/index.css\""));
    }
    assert!(dist_dir.path().join(INDEX_FILE).is_file());
}

#[actix_web::test]
async fn test_asset_is_served_without_rendering() {
    let dist_dir = create_dist_dir();
    let ui = create_ui(UiOptions::new(), dist_dir.path());
    let app = test::init_service(App::new().configure(configure("/docs", ui))).await;

    let response =
        test::call_service(&app, test::TestRequest::get().uri("/docs/index.css").to_request()).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(content_type(&response).starts_with("text/css"));
    let body = test::read_body(response).await;
    assert_eq!(&body[..], b"body { margin: 0; }\n");
    assert!(!dist_dir.path().join(INDEX_FILE).exists());
}

#[actix_web::test]
async fn test_missing_asset_is_not_found() {
    let dist_dir = create_dist_dir();
    let ui = create_ui(UiOptions::new(), dist_dir.path());
    let app = test::init_service(App::new().configure(configure("/docs", ui))).await;

    let response =
        test::call_service(&app, test::TestRequest::get().uri("/docs/missing.js").to_request()).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_traversal_is_not_found() {
    let dist_dir = create_dist_dir();
    let ui = create_ui(UiOptions::new(), dist_dir.path());
    let app = test::init_service(App::new().configure(configure("/docs", ui))).await;

    let response = test::call_service(
        &app,
        test::TestRequest::get().uri("/docs/..%2F..%2Fetc%2Fpasswd").to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_invalid_spec_file_is_server_error() {
    let dist_dir = create_dist_dir();
    let spec_file = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/petstore.txt");
    let ui = create_ui(UiOptions::new().spec_file(spec_file), dist_dir.path());
    let app = test::init_service(App::new().configure(configure("/docs", ui))).await;

    let response = test::call_service(&app, test::TestRequest::get().uri("/docs/").to_request()).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(!dist_dir.path().join(INDEX_FILE).exists());
}

#[actix_web::test]
async fn test_bundled_swagger_ui_assets() {
    let _ = env_logger::builder().is_test(true).try_init();
    let ui = SwaggerUi::new(UiOptions::new().build().unwrap()).unwrap();
    let app = test::init_service(App::new().configure(configure("/docs", ui))).await;

    let response =
        test::call_service(&app, test::TestRequest::get().uri("/docs/swagger-ui.css").to_request()).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(content_type(&response).starts_with("text/css"));

    let response = test::call_service(
        &app,
        test::TestRequest::get().uri("/docs/swagger-ui-bundle.js").to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(content_type(&response).contains("javascript"));
    assert!(!test::read_body(response).await.is_empty());
}
