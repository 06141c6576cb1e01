//! HTTP 客户端测试：actix-web 模拟后端

use actix_web::{web, App, HttpRequest, HttpResponse, HttpServer};
use machina::api::{HttpApiClient, MaintenanceApi};
use machina::config::ApiSettings;
use machina::models::{AlertQuery, AssistantRequest, ResolvedFilter, UserForm};
use machina::services::user_form_error;
use machina::AppError;
use reqwest::StatusCode;
use serde_json::{json, Value};
use std::sync::Mutex;

use crate::helpers::fixed_uuid;
use crate::{assert_err, assert_ok};

#[derive(Default)]
struct Recorded {
    queries: Mutex<Vec<String>>,
    bodies: Mutex<Vec<Value>>,
}

async fn list_alerts(req: HttpRequest, recorded: web::Data<Recorded>) -> HttpResponse {
    recorded.queries.lock().unwrap().push(req.query_string().to_string());
    HttpResponse::Ok().json(json!([
        {
            "id": fixed_uuid(10),
            "machine_id": fixed_uuid(1),
            "timestamp": "2024-03-01T07:55:00",
            "type": "Température",
            "severity": "Critique",
            "message": "Température au-dessus du seuil",
            "is_resolved": false,
            "resolved_at": null
        }
    ]))
}

async fn list_machines() -> HttpResponse {
    HttpResponse::Ok().json(json!([
        {
            "id": fixed_uuid(1),
            "name": "Presse hydraulique",
            "location": "Atelier A",
            "type": "Presse",
            "thresholds_config": {"temperature_max": 90.0},
            "installation_date": "2021-06-01T00:00:00Z"
        }
    ]))
}

async fn missing_machine() -> HttpResponse {
    HttpResponse::NotFound().json(json!({"detail": "Machine not found"}))
}

async fn create_user(body: web::Json<Value>, recorded: web::Data<Recorded>) -> HttpResponse {
    recorded.bodies.lock().unwrap().push(body.into_inner());
    HttpResponse::BadRequest().json(json!({"detail": "Email already registered"}))
}

async fn list_users() -> HttpResponse {
    HttpResponse::Ok()
        .content_type("application/json")
        .body(r#"[{"id": "pas-un-uuid"}]"#)
}

async fn resolve_alert() -> HttpResponse {
    HttpResponse::Ok().json(json!({"message": "Alert resolved"}))
}

async fn ask_assistant(body: web::Json<Value>, recorded: web::Data<Recorded>) -> HttpResponse {
    let question = body["question"].as_str().unwrap_or_default().to_string();
    recorded.bodies.lock().unwrap().push(body.into_inner());
    HttpResponse::Ok().json(json!({"response": format!("Écho : {}", question)}))
}

async fn start_backend(recorded: web::Data<Recorded>) -> HttpApiClient {
    let server = HttpServer::new(move || {
        App::new()
            .app_data(recorded.clone())
            .route("/alerts/", web::get().to(list_alerts))
            .route("/alerts/{id}/resolve", web::put().to(resolve_alert))
            .route("/machines/", web::get().to(list_machines))
            .route("/machines/{id}", web::get().to(missing_machine))
            .route("/users/", web::get().to(list_users))
            .route("/users/", web::post().to(create_user))
            .route("/ai-assistant/", web::post().to(ask_assistant))
    })
    .workers(1)
    .bind(("127.0.0.1", 0))
    .unwrap();
    let addr = server.addrs()[0];
    actix_web::rt::spawn(server.run());

    HttpApiClient::new(&ApiSettings {
        base_url: format!("http://{}/", addr),
        timeout_seconds: 5,
    })
    .unwrap()
}

#[actix_web::test]
async fn test_alert_query_parameters() {
    let recorded = web::Data::new(Recorded::default());
    let client = start_backend(recorded.clone()).await;

    let alerts = assert_ok!(client.list_alerts(&AlertQuery::unresolved().with_limit(10)).await);
    assert_ok!(
        client
            .list_alerts(&AlertQuery::default().with_resolved(ResolvedFilter::All).with_limit(20))
            .await
    );
    assert_ok!(
        client
            .list_alerts(&AlertQuery::default().with_resolved(ResolvedFilter::Resolved))
            .await
    );

    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].alert_type, "Température");
    assert_eq!(alerts[0].timestamp.to_rfc3339(), "2024-03-01T07:55:00+00:00", "无时区时间按 UTC 处理");

    let queries = recorded.queries.lock().unwrap().clone();
    assert_eq!(
        queries,
        vec![
            "resolved=false&limit=10".to_string(),
            "limit=20".to_string(),
            "resolved=true".to_string(),
        ],
        "all 时不应传 resolved 参数"
    );
}

#[actix_web::test]
async fn test_machines_decoded_with_typed_thresholds() {
    let client = start_backend(web::Data::new(Recorded::default())).await;

    let machines = assert_ok!(client.list_machines().await);

    assert_eq!(machines.len(), 1);
    assert_eq!(machines[0].machine_type.as_deref(), Some("Presse"));
    assert_eq!(machines[0].thresholds_config.len(), 1);
    assert!(machines[0].installation_date.is_some());
}

#[actix_web::test]
async fn test_not_found_keeps_detail() {
    let client = start_backend(web::Data::new(Recorded::default())).await;

    let err = assert_err!(client.get_machine(fixed_uuid(4)).await);
    assert!(matches!(err, AppError::NotFound(ref detail) if detail == "Machine not found"));
}

#[actix_web::test]
async fn test_rejected_user_exposes_backend_detail() {
    let recorded = web::Data::new(Recorded::default());
    let client = start_backend(recorded.clone()).await;
    let form = UserForm {
        name: "Claire Martin".to_string(),
        email: "claire@usine.fr".to_string(),
        ..Default::default()
    };

    let err = assert_err!(client.create_user(&form).await);

    match &err {
        AppError::Status { status, detail } => {
            assert_eq!(*status, StatusCode::BAD_REQUEST);
            assert_eq!(detail.as_deref(), Some("Email already registered"));
        }
        other => panic!("Expected Status error, got {:?}", other),
    }
    assert_eq!(user_form_error(&err), "Email already registered");

    let body = recorded.bodies.lock().unwrap()[0].clone();
    assert_eq!(
        body,
        json!({
            "name": "Claire Martin",
            "email": "claire@usine.fr",
            "role": "Technicien",
            "status": "Actif"
        })
    );
}

#[actix_web::test]
async fn test_malformed_payload_is_decode_error() {
    let client = start_backend(web::Data::new(Recorded::default())).await;

    let err = assert_err!(client.list_users().await);
    assert!(matches!(err, AppError::Decode(_)));
}

#[actix_web::test]
async fn test_resolve_ignores_response_body() {
    let client = start_backend(web::Data::new(Recorded::default())).await;
    assert_ok!(client.resolve_alert(fixed_uuid(10)).await);
}

#[actix_web::test]
async fn test_assistant_request_body() {
    let recorded = web::Data::new(Recorded::default());
    let client = start_backend(recorded.clone()).await;

    let reply = assert_ok!(
        client
            .ask_assistant(&AssistantRequest {
                question: "Pourquoi ?".to_string(),
                machine_id: None,
            })
            .await
    );

    assert_eq!(reply.response, "Écho : Pourquoi ?");
    assert_eq!(
        recorded.bodies.lock().unwrap()[0],
        json!({"question": "Pourquoi ?"}),
        "未选择机器时不发送 machine_id"
    );
}
