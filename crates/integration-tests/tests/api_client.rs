//! Integration tests for the upstream API client: retries, error taxonomy,
//! auth header, session handling, uploads and catalog caching.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::{Multipart, Path};
use axum::http::{HeaderMap, StatusCode, Uri, header};
use axum::response::{Html, IntoResponse};
use axum::routing::{get, post};
use axum::{Json, Router};
use secrecy::SecretString;
use serde_json::{Value, json};

use vitrine_core::{ProductId, Role};
use vitrine_integration_tests::{TestContext, ok, page_envelope, product_json};
use vitrine_storefront::api::{ApiError, ErrorKind};
use vitrine_storefront::notify::ToastLevel;
use vitrine_storefront::session::Session;

fn counter() -> Arc<AtomicUsize> {
    Arc::new(AtomicUsize::new(0))
}

/// A route that always answers `status` and counts its hits.
fn failing(status: StatusCode, hits: &Arc<AtomicUsize>) -> axum::routing::MethodRouter {
    let hits = Arc::clone(hits);
    get(move || {
        let hits = Arc::clone(&hits);
        async move {
            hits.fetch_add(1, Ordering::SeqCst);
            (status, Json(json!({ "success": false, "message": "upstream says no" })))
        }
    })
}

// ============================================================================
// Retry policy
// ============================================================================

#[tokio::test]
async fn test_get_retried_on_503_then_surfaced_once() {
    let hits = counter();
    let router = Router::new().route("/products/{id}", failing(StatusCode::SERVICE_UNAVAILABLE, &hits));
    let ctx = TestContext::new(router).await;

    let err = ctx
        .state
        .api()
        .get_product(&ProductId::new("A1"))
        .await
        .expect_err("503 must fail");

    assert_eq!(hits.load(Ordering::SeqCst), 3);
    assert_eq!(err.kind(), ErrorKind::Server);
    assert_eq!(err.status(), Some(503));
    assert_eq!(
        ctx.toast_messages(),
        vec!["Erro no servidor. Tente novamente mais tarde.".to_string()]
    );
}

#[tokio::test]
async fn test_get_recovers_after_transient_failure() {
    let hits = counter();
    let router = Router::new().route(
        "/products/{id}",
        get({
            let hits = Arc::clone(&hits);
            move |Path(id): Path<String>| {
                let hits = Arc::clone(&hits);
                async move {
                    if hits.fetch_add(1, Ordering::SeqCst) == 0 {
                        return (StatusCode::BAD_GATEWAY, Json(json!({}))).into_response();
                    }
                    (StatusCode::OK, Json(ok(product_json(&id, "Vestido Midi", 199.9, &["P", "M"]))))
                        .into_response()
                }
            }
        }),
    );
    let ctx = TestContext::new(router).await;

    let product = ctx
        .state
        .api()
        .get_product(&ProductId::new("A1"))
        .await
        .expect("second attempt succeeds");

    assert_eq!(product.name, "Vestido Midi");
    assert_eq!(hits.load(Ordering::SeqCst), 2);
    assert!(ctx.toast_messages().is_empty());
}

#[tokio::test]
async fn test_404_is_not_retried() {
    let hits = counter();
    let router = Router::new().route("/products/{id}", failing(StatusCode::NOT_FOUND, &hits));
    let ctx = TestContext::new(router).await;

    let err = ctx
        .state
        .api()
        .get_product(&ProductId::new("missing"))
        .await
        .expect_err("404 must fail");

    assert_eq!(hits.load(Ordering::SeqCst), 1);
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(ctx.toast_messages(), vec!["Recurso não encontrado.".to_string()]);
}

#[tokio::test]
async fn test_429_is_retried_honouring_retry_after() {
    let hits = counter();
    let router = Router::new().route(
        "/lookbook",
        get({
            let hits = Arc::clone(&hits);
            move || {
                let hits = Arc::clone(&hits);
                async move {
                    hits.fetch_add(1, Ordering::SeqCst);
                    (
                        StatusCode::TOO_MANY_REQUESTS,
                        [(header::RETRY_AFTER, "0")],
                        Json(json!({ "message": "Muitas requisições" })),
                    )
                }
            }
        }),
    );
    let ctx = TestContext::new(router).await;

    let err = ctx
        .state
        .api()
        .list_lookbook(1, 10)
        .await
        .expect_err("429 must fail after retries");

    assert_eq!(hits.load(Ordering::SeqCst), 3);
    // 429 is not one of the classified statuses, so the server message wins.
    assert_eq!(err.kind(), ErrorKind::Generic);
    assert_eq!(ctx.toast_messages(), vec!["Muitas requisições".to_string()]);
}

#[tokio::test]
async fn test_post_is_never_retried() {
    let hits = counter();
    let router = Router::new().route(
        "/auth/login",
        post({
            let hits = Arc::clone(&hits);
            move || {
                let hits = Arc::clone(&hits);
                async move {
                    hits.fetch_add(1, Ordering::SeqCst);
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            }
        }),
    );
    let ctx = TestContext::new(router).await;

    let err = ctx
        .state
        .api()
        .login("ana@example.com", &SecretString::from("hunter2"))
        .await
        .expect_err("500 must fail");

    assert_eq!(hits.load(Ordering::SeqCst), 1);
    assert_eq!(err.kind(), ErrorKind::Server);
}

#[tokio::test]
async fn test_network_error_toast() {
    // Point the client at a port nothing listens on.
    let ctx = TestContext::with_config(Router::new(), |config| {
        config.api_base_url = "http://127.0.0.1:9/".parse().expect("url");
    })
    .await;

    let err = ctx
        .state
        .api()
        .list_products(1, 10, None)
        .await
        .expect_err("connection refused");

    assert_eq!(err.kind(), ErrorKind::Network);
    assert_eq!(
        ctx.toast_messages(),
        vec!["Erro de conexão. Verifique sua internet.".to_string()]
    );
}

// ============================================================================
// Envelope and auth
// ============================================================================

#[tokio::test]
async fn test_success_false_envelope_is_rejected_with_server_message() {
    let router = Router::new().route(
        "/auth/register",
        post(|| async {
            Json(json!({ "success": false, "message": "Email já cadastrado" }))
        }),
    );
    let ctx = TestContext::new(router).await;

    let err = ctx
        .state
        .api()
        .register("Ana", "ana@example.com", &SecretString::from("hunter2"))
        .await
        .expect_err("rejected");

    assert!(matches!(err, ApiError::Rejected(ref message) if message == "Email já cadastrado"));
    assert_eq!(ctx.toast_messages(), vec!["Email já cadastrado".to_string()]);
    assert!(ctx.state.sessions().current().is_none());
}

#[tokio::test]
async fn test_login_stores_session_and_sends_bearer_token() {
    let seen_auth = Arc::new(Mutex::new(Vec::<Option<String>>::new()));
    let router = Router::new()
        .route(
            "/auth/login",
            post(|Json(body): Json<Value>| async move {
                assert_eq!(body["email"], "ana@example.com");
                assert_eq!(body["password"], "hunter2");
                Json(ok(json!({ "token": "jwt-abc", "role": "admin" })))
            }),
        )
        .route(
            "/products",
            get({
                let seen_auth = Arc::clone(&seen_auth);
                move |headers: HeaderMap| {
                    let seen_auth = Arc::clone(&seen_auth);
                    async move {
                        let auth = headers
                            .get(header::AUTHORIZATION)
                            .and_then(|v| v.to_str().ok())
                            .map(str::to_string);
                        seen_auth.lock().expect("lock").push(auth);
                        Json(page_envelope(Vec::new(), 1, 10, 0))
                    }
                }
            }),
        );
    let ctx = TestContext::new(router).await;
    let api = ctx.state.api();

    api.list_products(1, 10, None).await.expect("anonymous list");

    let session = api
        .login("ana@example.com", &SecretString::from("hunter2"))
        .await
        .expect("login");
    assert_eq!(session.role(), Role::Admin);
    assert!(session.is_admin());

    api.invalidate_catalog();
    api.list_products(1, 10, None).await.expect("authenticated list");

    assert_eq!(
        *seen_auth.lock().expect("lock"),
        vec![None, Some("Bearer jwt-abc".to_string())]
    );

    // The session survives a restart.
    let session_file = ctx.data_dir.path().join("session.json");
    assert!(session_file.exists());
    let reloaded = vitrine_storefront::session::SessionStore::load(&session_file);
    assert_eq!(reloaded.current().map(|s| s.role()), Some(Role::Admin));
}

#[tokio::test]
async fn test_login_greets_returned_user() {
    let router = Router::new().route(
        "/auth/login",
        post(|| async {
            Json(ok(json!({
                "token": "jwt-abc",
                "role": "customer",
                "user": { "_id": "u1", "name": "Ana", "email": "ana@example.com" }
            })))
        }),
    );
    let ctx = TestContext::new(router).await;

    ctx.state
        .api()
        .login("ana@example.com", &SecretString::from("hunter2"))
        .await
        .expect("login");

    let toasts = ctx.notifier.toasts();
    assert_eq!(toasts.len(), 1);
    let greeting = toasts.first().expect("one toast");
    assert_eq!(greeting.level, ToastLevel::Success);
    assert_eq!(greeting.message, "Olá, Ana!");
}

#[tokio::test]
async fn test_success_without_data_is_surfaced() {
    let router = Router::new()
        .route("/products/{id}", get(|| async { Json(json!({ "success": true })) }))
        .route("/auth/login", post(|| async { Json(json!({ "success": true })) }));
    let ctx = TestContext::new(router).await;

    let err = ctx
        .state
        .api()
        .get_product(&ProductId::new("A1"))
        .await
        .expect_err("no data");
    assert!(matches!(err, ApiError::Parse(_)));

    let err = ctx
        .state
        .api()
        .login("ana@example.com", &SecretString::from("hunter2"))
        .await
        .expect_err("no token");
    assert_eq!(err.kind(), ErrorKind::Generic);

    assert_eq!(
        ctx.toast_messages(),
        vec!["Ocorreu um erro inesperado.".to_string(); 2]
    );
    assert!(ctx.state.sessions().current().is_none());
}

#[tokio::test]
async fn test_html_error_body_gets_fixed_message() {
    let router = Router::new().route(
        "/auth/login",
        post(|| async {
            (
                StatusCode::BAD_REQUEST,
                Html("<html><head><title>400 Bad Request</title></head><body><center>nginx</center></body></html>"),
            )
        }),
    );
    let ctx = TestContext::new(router).await;

    let err = ctx
        .state
        .api()
        .login("ana@example.com", &SecretString::from("hunter2"))
        .await
        .expect_err("400");

    assert_eq!(err.status(), Some(400));
    assert_eq!(err.kind(), ErrorKind::Generic);
    assert_eq!(ctx.toast_messages(), vec!["Ocorreu um erro inesperado.".to_string()]);
}

#[tokio::test]
async fn test_401_clears_session() {
    let router = Router::new().route(
        "/products/{id}",
        get(|| async { (StatusCode::UNAUTHORIZED, Json(json!({ "message": "jwt expired" }))) }),
    );
    let ctx = TestContext::new(router).await;
    ctx.state
        .sessions()
        .save(Session::new(SecretString::from("stale"), Role::Customer))
        .expect("save session");

    let err = ctx
        .state
        .api()
        .get_product(&ProductId::new("A1"))
        .await
        .expect_err("401");

    assert_eq!(err.kind(), ErrorKind::Unauthorized);
    assert!(ctx.state.sessions().current().is_none());
    assert!(!ctx.data_dir.path().join("session.json").exists());
    assert_eq!(
        ctx.toast_messages(),
        vec!["Sessão expirada. Faça login novamente.".to_string()]
    );
}

#[tokio::test]
async fn test_403_forbidden_toast() {
    let hits = counter();
    let router = Router::new().route("/lookbook", failing(StatusCode::FORBIDDEN, &hits));
    let ctx = TestContext::new(router).await;

    let err = ctx.state.api().list_lookbook(1, 10).await.expect_err("403");

    assert_eq!(err.kind(), ErrorKind::Forbidden);
    assert_eq!(hits.load(Ordering::SeqCst), 1);
    assert_eq!(
        ctx.toast_messages(),
        vec!["Você não tem permissão para realizar esta ação.".to_string()]
    );
}

// ============================================================================
// Resource paths
// ============================================================================

#[tokio::test]
async fn test_product_id_stays_in_its_path_segment() {
    let seen = Arc::new(Mutex::new(Vec::<String>::new()));
    let router = Router::new().fallback({
        let seen = Arc::clone(&seen);
        move |uri: Uri| {
            let seen = Arc::clone(&seen);
            async move {
                let target = uri.path_and_query().map(ToString::to_string).unwrap_or_default();
                seen.lock().expect("lock").push(target);
                Json(ok(product_json("A1", "Vestido Midi", 199.9, &["M"])))
            }
        }
    });
    let ctx = TestContext::new(router).await;
    let api = ctx.state.api();

    api.get_product(&ProductId::new("A1?admin=1"))
        .await
        .expect("query characters are escaped");
    api.get_product(&ProductId::new("../auth/login"))
        .await
        .expect("slashes are escaped");
    api.get_product(&ProductId::new("look#2"))
        .await
        .expect("fragment marker is escaped");

    assert_eq!(
        *seen.lock().expect("lock"),
        vec![
            "/products/A1%3Fadmin%3D1".to_string(),
            "/products/..%2Fauth%2Flogin".to_string(),
            "/products/look%232".to_string(),
        ]
    );
    assert!(ctx.toast_messages().is_empty());
}

#[tokio::test]
async fn test_dot_product_ids_are_refused_without_a_request() {
    let hits = counter();
    let router = Router::new().fallback({
        let hits = Arc::clone(&hits);
        move || {
            let hits = Arc::clone(&hits);
            async move {
                hits.fetch_add(1, Ordering::SeqCst);
                StatusCode::NOT_FOUND
            }
        }
    });
    let ctx = TestContext::new(router).await;

    for id in ["..", ".", ""] {
        let err = ctx
            .state
            .api()
            .get_product(&ProductId::new(id))
            .await
            .expect_err("dot segment id");
        assert!(matches!(err, ApiError::InvalidId(ref rejected) if rejected == id));
    }

    assert_eq!(hits.load(Ordering::SeqCst), 0);
    assert_eq!(
        ctx.toast_messages(),
        vec!["Ocorreu um erro inesperado.".to_string(); 3]
    );
}

// ============================================================================
// Uploads and caching
// ============================================================================

#[tokio::test]
async fn test_upload_sends_multipart() {
    let router = Router::new().route(
        "/uploads",
        post(|headers: HeaderMap, mut multipart: Multipart| async move {
            let content_type = headers
                .get(header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default()
                .to_string();
            assert!(content_type.starts_with("multipart/form-data"), "{content_type}");

            let field = multipart
                .next_field()
                .await
                .expect("read field")
                .expect("one field");
            assert_eq!(field.name(), Some("image"));
            assert_eq!(field.file_name(), Some("look.jpg"));
            assert_eq!(field.content_type(), Some("image/jpeg"));
            let bytes = field.bytes().await.expect("field bytes");
            assert_eq!(&bytes[..], b"\xFF\xD8\xFFfake-jpeg");

            Json(ok(json!({ "url": "https://cdn.example.com/uploads/look.jpg" })))
        }),
    );
    let ctx = TestContext::new(router).await;

    let uploaded = ctx
        .state
        .api()
        .upload_image("look.jpg", "image/jpeg", b"\xFF\xD8\xFFfake-jpeg".to_vec())
        .await
        .expect("upload");

    assert_eq!(uploaded.url, "https://cdn.example.com/uploads/look.jpg");
}

#[tokio::test]
async fn test_product_pages_are_cached() {
    let hits = counter();
    let router = Router::new().route(
        "/products",
        get({
            let hits = Arc::clone(&hits);
            move || {
                let hits = Arc::clone(&hits);
                async move {
                    hits.fetch_add(1, Ordering::SeqCst);
                    Json(page_envelope(
                        vec![product_json("A1", "Vestido Midi", 199.9, &["M"])],
                        1,
                        10,
                        1,
                    ))
                }
            }
        }),
    );
    let ctx = TestContext::new(router).await;
    let api = ctx.state.api();

    let first = api.list_products(1, 10, None).await.expect("first");
    let second = api.list_products(1, 10, None).await.expect("second");
    assert_eq!(first, second);
    assert_eq!(hits.load(Ordering::SeqCst), 1);

    // A different filter is a different cache entry.
    api.list_products(1, 10, Some("vestidos")).await.expect("filtered");
    assert_eq!(hits.load(Ordering::SeqCst), 2);
}
