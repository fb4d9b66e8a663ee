//! End-to-end tests through the full router against an in-memory store.

use axum::{
  body::Body,
  http::{Request, StatusCode, header},
};
use rsvp_core::{
  rsvp::Rsvp,
  stats::RsvpStats,
  store::Privilege,
};
use serde_json::{Value, json};
use tower::ServiceExt as _;

use crate::{
  AppState, ServerConfig, app, build_state,
  sessions::{AdminAccount, hash_password},
};

const EMAIL: &str = "host@example.com";
const PASSWORD: &str = "s3cret";

fn config() -> ServerConfig {
  ServerConfig {
    host:                 "127.0.0.1".into(),
    port:                 3000,
    store_url:            ":memory:".into(),
    anon_key:             "anon-key".into(),
    service_role_key:     Some("service-key".into()),
    intake_privilege:     Privilege::Elevated,
    public_insert_policy: false,
    session_ttl_secs:     3600,
    admins:               vec![AdminAccount {
      email:         EMAIL.into(),
      password_hash: hash_password(PASSWORD).unwrap(),
    }],
  }
}

async fn send(
  state: &AppState,
  method: &str,
  uri: &str,
  token: Option<&str>,
  body: Option<Value>,
) -> (StatusCode, Value) {
  let mut builder = Request::builder().method(method).uri(uri);
  if let Some(token) = token {
    builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
  }
  let req = match body {
    Some(json) => builder
      .header(header::CONTENT_TYPE, "application/json")
      .body(Body::from(json.to_string()))
      .unwrap(),
    None => builder.body(Body::empty()).unwrap(),
  };
  let resp = app(state.clone()).oneshot(req).await.unwrap();
  let status = resp.status();
  let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
  (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

async fn login(state: &AppState) -> String {
  let (status, body) = send(
    state,
    "POST",
    "/api/auth/login",
    None,
    Some(json!({ "email": EMAIL, "password": PASSWORD })),
  )
  .await;
  assert_eq!(status, StatusCode::OK, "{body}");
  body["data"]["access_token"].as_str().unwrap().to_owned()
}

// ─── Scenarios ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn submitted_rsvp_shows_up_for_the_admin() {
  let state = build_state(&config()).await.unwrap();

  let (status, body) = send(
    &state,
    "POST",
    "/api/rsvp",
    None,
    Some(json!({ "name": "Alex Kim", "response": "yes", "guests": 2 })),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED);
  assert_eq!(body["data"]["guests"], 2);
  assert!(body["data"]["message"].is_null());

  let token = login(&state).await;
  let (status, body) = send(&state, "GET", "/api/rsvp", Some(&token), None).await;
  assert_eq!(status, StatusCode::OK);

  let rsvps: Vec<Rsvp> = serde_json::from_value(body["data"].clone()).unwrap();
  assert!(rsvps.iter().any(|r| r.name == "Alex Kim"));
  let stats = RsvpStats::compute(&rsvps);
  assert!(stats.total_yes >= 1);
  assert!(stats.total_guests >= 2);
}

#[tokio::test]
async fn rejected_submissions_write_nothing() {
  let state = build_state(&config()).await.unwrap();

  for bad in [
    json!({ "name": "", "response": "yes" }),
    json!({ "name": "Sam", "response": "unsure" }),
  ] {
    let (status, body) = send(&state, "POST", "/api/rsvp", None, Some(bad)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
  }

  let token = login(&state).await;
  let (_, body) = send(&state, "GET", "/api/rsvp", Some(&token), None).await;
  assert_eq!(body["data"], json!([]));
}

#[tokio::test]
async fn unauthenticated_read_gets_no_data() {
  let state = build_state(&config()).await.unwrap();
  send(
    &state,
    "POST",
    "/api/rsvp",
    None,
    Some(json!({ "name": "Alex", "response": "no" })),
  )
  .await;

  let (status, body) = send(&state, "GET", "/api/rsvp", None, None).await;
  assert_eq!(status, StatusCode::UNAUTHORIZED);
  assert_eq!(body, json!({ "success": false, "error": "Unauthorized" }));
}

#[tokio::test]
async fn token_stops_working_after_logout() {
  let state = build_state(&config()).await.unwrap();
  let token = login(&state).await;

  let (status, _) = send(&state, "GET", "/api/auth/user", Some(&token), None).await;
  assert_eq!(status, StatusCode::OK);

  let (status, _) = send(&state, "POST", "/api/auth/logout", Some(&token), None).await;
  assert_eq!(status, StatusCode::OK);

  let (status, _) = send(&state, "GET", "/api/rsvp", Some(&token), None).await;
  assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn wrong_password_is_rejected() {
  let state = build_state(&config()).await.unwrap();
  let (status, body) = send(
    &state,
    "POST",
    "/api/auth/login",
    None,
    Some(json!({ "email": EMAIL, "password": "guess" })),
  )
  .await;
  assert_eq!(status, StatusCode::UNAUTHORIZED);
  assert_eq!(body["error"], "Invalid login credentials");
}

// ─── Access levels ───────────────────────────────────────────────────────────

#[tokio::test]
async fn missing_service_role_key_fails_on_first_use() {
  let cfg = ServerConfig { service_role_key: None, ..config() };
  let state = build_state(&cfg).await.expect("startup does not need the elevated key");

  let (status, body) = send(
    &state,
    "POST",
    "/api/rsvp",
    None,
    Some(json!({ "name": "Sam", "response": "yes" })),
  )
  .await;
  assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
  assert_eq!(body, json!({ "success": false, "error": "Failed to save RSVP" }));

  let token = login(&state).await;
  let (status, body) = send(&state, "GET", "/api/rsvp", Some(&token), None).await;
  assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
  assert_eq!(body["error"], "Failed to fetch RSVPs");
}

#[tokio::test]
async fn restricted_intake_follows_public_insert_policy() {
  let denied = ServerConfig { intake_privilege: Privilege::Restricted, ..config() };
  let state = build_state(&denied).await.unwrap();
  let submission = json!({ "name": "Sam", "response": "maybe" });

  let (status, _) = send(&state, "POST", "/api/rsvp", None, Some(submission.clone())).await;
  assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

  let allowed = ServerConfig { public_insert_policy: true, ..denied };
  let state = build_state(&allowed).await.unwrap();
  let (status, _) = send(&state, "POST", "/api/rsvp", None, Some(submission)).await;
  assert_eq!(status, StatusCode::CREATED);

  let token = login(&state).await;
  let (_, body) = send(&state, "GET", "/api/rsvp", Some(&token), None).await;
  assert_eq!(body["data"].as_array().unwrap().len(), 1);
}

// ─── Configuration ───────────────────────────────────────────────────────────

#[test]
fn config_file_fills_defaults() {
  let toml = r#"
    store_url = "sqlite://rsvps.db"
    anon_key  = "anon"

    [[admins]]
    email         = "host@example.com"
    password_hash = "$argon2id$v=19$m=19456,t=2,p=1$c2FsdHNhbHQ$aGFzaA"
  "#;
  let cfg: ServerConfig = config::Config::builder()
    .add_source(config::File::from_str(toml, config::FileFormat::Toml))
    .build()
    .unwrap()
    .try_deserialize()
    .unwrap();

  assert_eq!(cfg.host, "127.0.0.1");
  assert_eq!(cfg.port, 3000);
  assert_eq!(cfg.intake_privilege, Privilege::Elevated);
  assert!(!cfg.public_insert_policy);
  assert_eq!(cfg.session_ttl().num_seconds(), 3600);
  assert!(cfg.service_role_key.is_none());
  assert_eq!(cfg.admins.len(), 1);
  assert_eq!(cfg.access_keys().restricted, "anon");
}

#[test]
fn config_reads_restricted_intake() {
  let toml = r#"
    store_url            = ":memory:"
    anon_key             = "anon"
    service_role_key     = "service"
    intake_privilege     = "restricted"
    public_insert_policy = true
    session_ttl_secs     = 60
  "#;
  let cfg: ServerConfig = config::Config::builder()
    .add_source(config::File::from_str(toml, config::FileFormat::Toml))
    .build()
    .unwrap()
    .try_deserialize()
    .unwrap();

  assert_eq!(cfg.intake_privilege, Privilege::Restricted);
  assert!(cfg.public_insert_policy);
  assert_eq!(cfg.session_ttl().num_seconds(), 60);
  assert!(cfg.admins.is_empty());
}
