use std::sync::Arc;

use axum::{
  Router,
  body::Body,
  http::{Request, StatusCode, header},
};
use elective_core::{config::EngineConfig, reference::ReferenceData, service::SelectionService};
use elective_store_sqlite::SqliteStore;
use serde_json::{Value, json};
use tower::ServiceExt as _;
use uuid::Uuid;

use crate::api_router;

const REFERENCE: &str = include_str!("../../../fixtures/reference.json");

const ASHA: &str = "10000000-0000-0000-0000-000000000001";
const YEAR: &str = "00000000-0000-0000-0000-0000000000a1";

async fn app() -> Router {
  let store = SqliteStore::open_in_memory().await.unwrap();
  let refs = ReferenceData::from_json(REFERENCE).unwrap();
  let service = SelectionService::new(Arc::new(store), Arc::new(refs), &EngineConfig::default());
  api_router(Arc::new(service))
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
  let mut builder = Request::builder().method(method).uri(uri);
  let body = match body {
    Some(v) => {
      builder = builder.header(header::CONTENT_TYPE, "application/json");
      Body::from(v.to_string())
    }
    None => Body::empty(),
  };
  let resp = app.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
  let status = resp.status();
  let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
  (status, serde_json::from_slice(&bytes).unwrap())
}

fn pick(meta: u8, subject: u8) -> Value {
  json!({
    "meta_id":    format!("40000000-0000-0000-0000-{meta:012}"),
    "subject_id": format!("30000000-0000-0000-0000-{subject:012}"),
  })
}

fn valid_selections() -> Value {
  // Minor I, Minor II, IDC 1-3, AEC, CVAC.
  json!([pick(1, 1), pick(2, 2), pick(3, 4), pick(4, 7), pick(5, 8), pick(6, 5), pick(7, 6)])
}

fn selections_uri(session: Uuid) -> String {
  format!("/students/{ASHA}/sessions/{session}/selections")
}

// ─── Reads ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn eligibility_is_wrapped_in_envelope() {
  let app = app().await;
  let (status, body) = send(&app, "GET", &format!("/students/{ASHA}/eligibility"), None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["success"], true);
  assert!(body["data"]["MINOR"]["options"].is_array());
  assert!(body["data"]["CVAC"]["id"].is_string());
}

#[tokio::test]
async fn unknown_student_is_404_with_general_error() {
  let app = app().await;
  let uri = format!("/students/{}/eligibility", Uuid::new_v4());
  let (status, body) = send(&app, "GET", &uri, None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  assert_eq!(body["success"], false);
  assert_eq!(body["errors"][0]["field"], "general");
}

#[tokio::test]
async fn classify_reports_category_semesters_and_slot() {
  let app = app().await;
  let (status, body) =
    send(&app, "GET", "/classify?label=Minor%202%20(Semester%20III%20%26%20IV)", None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["data"]["category"], "MINOR");
  assert_eq!(body["data"]["semesters"], json!(["III", "IV"]));
  assert_eq!(body["data"]["slot"], "minor2");
  assert_eq!(body["data"]["slot_number"], 2);
}

#[tokio::test]
async fn classify_leaves_mismatched_slot_number_unplaced() {
  let app = app().await;
  let (status, body) = send(&app, "GET", "/classify?label=Minor%203%20(Semester%20III)", None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["data"]["semesters"], json!(["III"]));
  assert_eq!(body["data"]["slot"], Value::Null);
}

#[tokio::test]
async fn metas_carry_resolved_slots() {
  let app = app().await;
  let (status, body) = send(&app, "GET", &format!("/metas?academic_year_id={YEAR}"), None).await;
  assert_eq!(status, StatusCode::OK);
  let metas = body["data"].as_array().unwrap();
  assert_eq!(metas.len(), 8);
  let idc1 = metas.iter().find(|m| m["label"] == "IDC 1 (Semester I)").unwrap();
  assert_eq!(idc1["slot"], "idc1");
  let minor1 = metas.iter().find(|m| m["label"] == "Minor 1 (Semester I & II)").unwrap();
  assert_eq!(minor1["slot"], "minor1");
}

// ─── Validate ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn validate_returns_error_list_without_writing() {
  let app = app().await;
  let uri = format!("/students/{ASHA}/selections/validate");

  let (status, body) = send(&app, "POST", &uri, Some(json!({ "selections": valid_selections() }))).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["data"], json!([]));

  let mut same_idc = valid_selections();
  same_idc[4] = pick(5, 4);
  let (status, body) = send(&app, "POST", &uri, Some(json!({ "selections": same_idc }))).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["data"][0]["field"], "idc3");

  let (_, body) = send(&app, "GET", &format!("/students/{ASHA}/history"), None).await;
  assert_eq!(body["data"], json!([]));
}

// ─── Writes ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_then_conflict_for_student() {
  let app = app().await;
  let session = Uuid::new_v4();
  let body = json!({ "selections": valid_selections(), "created_by": ASHA });

  let (status, created) = send(&app, "POST", &selections_uri(session), Some(body.clone())).await;
  assert_eq!(status, StatusCode::CREATED);
  assert_eq!(created["data"].as_array().unwrap().len(), 7);

  let (status, again) = send(&app, "POST", &selections_uri(session), Some(body)).await;
  assert_eq!(status, StatusCode::CONFLICT);
  assert_eq!(again["errors"][0]["field"], "general");
}

#[tokio::test]
async fn admin_may_recreate() {
  let app = app().await;
  let session = Uuid::new_v4();
  let student = json!({ "selections": valid_selections(), "created_by": ASHA });
  send(&app, "POST", &selections_uri(session), Some(student)).await;

  let admin = json!({
    "selections": valid_selections(),
    "created_by": Uuid::new_v4(),
    "role": "ADMIN",
  });
  let (status, body) = send(&app, "POST", &selections_uri(session), Some(admin)).await;
  assert_eq!(status, StatusCode::CREATED);
  assert!(body["data"].as_array().unwrap().iter().all(|r| r["version"] == 2));
}

#[tokio::test]
async fn invalid_create_is_422_with_field_errors() {
  let app = app().await;
  let session = Uuid::new_v4();
  let mut selections = valid_selections();
  selections.as_array_mut().unwrap().pop();

  let body = json!({ "selections": selections, "created_by": ASHA });
  let (status, body) = send(&app, "POST", &selections_uri(session), Some(body)).await;
  assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
  assert_eq!(body["success"], false);
  assert_eq!(body["errors"], json!([{ "field": "cvac", "message": "CVAC is required" }]));
}

#[tokio::test]
async fn update_history_and_original() {
  let app = app().await;
  let session = Uuid::new_v4();
  let create = json!({ "selections": valid_selections(), "created_by": ASHA });
  send(&app, "POST", &selections_uri(session), Some(create)).await;

  let update = json!({
    "selections": [pick(5, 9)],
    "updated_by": ASHA,
    "change_reason": "timetable clash",
  });
  let (status, body) = send(&app, "PUT", &selections_uri(session), Some(update)).await;
  assert_eq!(status, StatusCode::OK);
  let active = body["data"].as_array().unwrap();
  assert_eq!(active.len(), 7);
  let idc3 = active.iter().find(|r| r["version"] == 2).unwrap();
  assert_eq!(idc3["change_reason"], "timetable clash");

  let uri = format!("/students/{ASHA}/history?session_id={session}");
  let (_, history) = send(&app, "GET", &uri, None).await;
  let history = history["data"].as_array().unwrap();
  assert_eq!(history.len(), 8);
  assert_eq!(history[0]["version"], 2);

  let id = idc3["id"].as_str().unwrap();
  let (status, original) = send(&app, "GET", &format!("/selections/{id}/original"), None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(original["data"]["version"], 1);
  assert_eq!(original["data"]["id"], idc3["parent_id"]);
  assert_eq!(original["data"]["is_deprecated"], true);
}

#[tokio::test]
async fn unknown_selection_is_404() {
  let app = app().await;
  let (status, _) = send(&app, "GET", &format!("/selections/{}", Uuid::new_v4()), None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}
