//! REST surface: authentication, status codes and Problem bodies

mod common;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use common::*;
use kasus_service::contract::Actor;
use kasus_service::domain::{NoOpEventPublisher, Repositories};
use kasus_service::{Config, KasusServiceModule};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

const SECRET: &[u8] = b"integration-test-secret";

struct Api {
    fx: Fixture,
    module: KasusServiceModule,
}

impl Api {
    fn new() -> Self {
        let fx = Fixture::new();
        let module = KasusServiceModule::with_repositories(
            Repositories::from_store(fx.store.clone()),
            fx.images.clone(),
            Arc::new(NoOpEventPublisher),
            Config::default(),
            SECRET,
        );
        Self { fx, module }
    }

    fn router(&self) -> Router {
        self.module.router()
    }

    fn token(&self, actor: &Actor) -> String {
        self.module
            .auth()
            .issue(actor, chrono::Duration::minutes(5))
            .unwrap()
    }

    async fn call(&self, method: Method, uri: &str, actor: Option<&Actor>, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(actor) = actor {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", self.token(actor)));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }
}

#[tokio::test]
async fn health_and_openapi_are_public() {
    let api = Api::new();

    let (status, body) = api.call(Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    let (status, body) = api.call(Method::GET, "/openapi.json", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/kasus/{id}/verifikasi"].is_object());
}

#[tokio::test]
async fn protected_routes_require_a_bearer_token() {
    let api = Api::new();

    let (status, body) = api.call(Method::GET, "/kasus", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["status"], 401);

    let request = Request::builder()
        .uri("/kasus")
        .header(header::AUTHORIZATION, "Bearer garbage")
        .body(Body::empty())
        .unwrap();
    let response = api.router().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "application/problem+json"
    );
}

#[tokio::test]
async fn full_flow_over_http() {
    print_test_header(
        "full_flow_over_http",
        "Initiate (201 then 200), submit (201), verify after the coordinator opens the window",
    );
    let api = Api::new();
    let fx = &api.fx;

    let uri = format!("/penilaian/initiate/{}", fx.permohonan_id);
    let (status, body) = api.call(Method::POST, &uri, Some(&fx.koordinator), None).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["created"], true);
    let kasus_id = body["kasus_id"].as_str().unwrap().to_string();

    let (status, body) = api.call(Method::POST, &uri, Some(&fx.ketua), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["created"], false);
    assert_eq!(body["kasus_id"], kasus_id.as_str());

    let submission = json!({
        "desk_study": [{
            "pernyataan_lokasi": "Jl. Merdeka 1",
            "pernyataan_kegiatan": "Perdagangan eceran",
            "jenis_rencana_tata_ruang": "RDTR",
            "arahan_rencana_tata_ruang": "Zona perdagangan",
            "hasil_kesesuaian": "Sesuai"
        }],
        "pemeriksaan": [{"pernyataan": "Butir 1", "hasil": "Sesuai"}],
        "pengukuran": [{"parameter": "KDB", "nilai": 60.5, "status": "Sesuai"}],
        "tanda_tangan": [{"user_id": fx.ketua.user_id, "signature": PNG_DATA_URI}]
    });
    let (status, body) = api
        .call(
            Method::POST,
            &format!("/penilaian/pmp-umk/{kasus_id}"),
            Some(&fx.ketua),
            Some(submission),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["version"], 1);
    assert_eq!(body["pengukuran"][0]["nilai"], 60.5);
    assert_eq!(body["tanda_tangan_tim"].as_array().map(Vec::len), Some(1));

    let (status, body) = api
        .call(Method::GET, &format!("/kasus/{kasus_id}"), Some(&fx.petugas), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["kasus"]["status"], "Menunggu Verifikasi");
    assert_eq!(body["permohonan"]["status"], "Menunggu Penilaian");

    // Verification from Menunggu Verifikasi is outside the window
    let verify_uri = format!("/kasus/{kasus_id}/verifikasi");
    let (status, body) = api
        .call(Method::POST, &verify_uri, Some(&fx.ketua), Some(json!({"hasil": "Patuh"})))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["title"], "Invalid Status Transition");

    api.fx
        .store
        .set_kasus_status(uuid::Uuid::parse_str(&kasus_id).unwrap(), kasus_service::contract::KasusStatus::SurveiSelesai);
    let (status, body) = api
        .call(Method::POST, &verify_uri, Some(&fx.ketua), Some(json!({"hasil": "Patuh"})))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "Penilaian Selesai - Patuh");
}

#[tokio::test]
async fn non_members_get_403_problem() {
    let api = Api::new();
    let kasus_id = api.fx.initiate().await;

    let (status, body) = api
        .call(Method::DELETE, &format!("/kasus/{kasus_id}"), Some(&api.fx.outsider), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["status"], 403);
    assert!(body.get("errors").is_none());
    assert!(api.fx.store.kasus(kasus_id).is_some());

    let (status, _) = api
        .call(Method::DELETE, &format!("/kasus/{kasus_id}"), Some(&api.fx.ketua), None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn validation_errors_are_listed_per_field() {
    let api = Api::new();
    let kasus_id = api.fx.initiate().await;

    let (status, body) = api
        .call(
            Method::POST,
            &format!("/penilaian/pmp-umk/{kasus_id}"),
            Some(&api.fx.ketua),
            Some(json!({
                "desk_study": [{"hasil_kesesuaian": "Sesuai"}],
                "tanda_tangan": [{"user_id": api.fx.outsider.user_id, "signature": PNG_DATA_URI}]
            })),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let errors = body["errors"].as_object().unwrap();
    for field in [
        "desk_study.0.pernyataan_lokasi",
        "pemeriksaan",
        "tanda_tangan.0.user_id",
    ] {
        assert!(errors.contains_key(field), "missing {field} in {body}");
    }
}

#[tokio::test]
async fn request_listing_supports_the_pending_filter() {
    let api = Api::new();
    let (status, body) = api
        .call(Method::GET, "/permohonan-penilaian?status=pending", Some(&api.fx.sekretariat), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);
    assert_eq!(body["per_page"], 10);
    assert_eq!(body["last_page"], 1);

    let (status, body) = api
        .call(Method::GET, "/permohonan-penilaian?status=done", Some(&api.fx.sekretariat), None)
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["errors"]["status"].is_array());
}

#[tokio::test]
async fn create_endpoints_answer_201() {
    let api = Api::new();

    let (status, body) = api
        .call(
            Method::POST,
            "/permohonan-penilaian",
            Some(&api.fx.sekretariat),
            Some(json!({
                "pemegang_id": api.fx.pemegang_id,
                "tim_id": api.fx.team_id,
                "skor_prioritas": 70
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], "Baru");
    assert!(body["nomor_permohonan"].as_str().is_some_and(|n| !n.is_empty()));

    let (status, _) = api
        .call(
            Method::POST,
            "/pemegang",
            Some(&api.fx.petugas),
            Some(json!({"nama": "PT Sejahtera"})),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn unknown_case_is_404_only_for_admin() {
    let api = Api::new();
    let uri = format!("/kasus/{}", uuid::Uuid::new_v4());

    let (status, body) = api.call(Method::GET, &uri, Some(&api.fx.admin), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["status"], 404);

    let (status, body) = api.call(Method::GET, &uri, Some(&api.fx.ketua), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["status"], 403);
}
