//! Integration tests for `SqliteStore` against an in-memory database.

use rsvp_core::{
  rsvp::{NewRsvp, RsvpResponse},
  store::{Privilege, RsvpStore, SortOrder},
};

use crate::{AccessKeys, Error, RowPolicy, SqliteStore, StoreLocation};

fn keys() -> AccessKeys {
  AccessKeys {
    restricted: "anon-key".into(),
    elevated:   Some("service-key".into()),
  }
}

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory(keys())
    .await
    .expect("in-memory store")
}

fn new_rsvp(name: &str, response: RsvpResponse, guests: u32) -> NewRsvp {
  NewRsvp {
    name: name.into(),
    response,
    guests,
    message: None,
  }
}

// ─── Inserts ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn insert_assigns_id_and_timestamp() {
  let s = store().await;
  let before = chrono::Utc::now();

  let a = s
    .insert_one(Privilege::Elevated, new_rsvp("Alex Kim", RsvpResponse::Yes, 2))
    .await
    .unwrap();
  let b = s
    .insert_one(Privilege::Elevated, new_rsvp("Sam", RsvpResponse::No, 1))
    .await
    .unwrap();

  assert_ne!(a.id, b.id);
  assert_eq!(a.name, "Alex Kim");
  assert_eq!(a.guests, 2);
  assert!(a.created_at >= before - chrono::Duration::seconds(1));
}

#[tokio::test]
async fn message_roundtrips_and_absent_stays_absent() {
  let s = store().await;
  let mut with_message = new_rsvp("Casey", RsvpResponse::Maybe, 1);
  with_message.message = Some("Will confirm by May".into());

  let inserted = s.insert_one(Privilege::Elevated, with_message).await.unwrap();
  s.insert_one(Privilege::Elevated, new_rsvp("Drew", RsvpResponse::Yes, 3))
    .await
    .unwrap();

  let all = s
    .select_all(Privilege::Elevated, SortOrder::OldestFirst)
    .await
    .unwrap();
  assert_eq!(all.len(), 2);
  assert_eq!(all[0], inserted);
  assert_eq!(all[0].message.as_deref(), Some("Will confirm by May"));
  assert_eq!(all[1].message, None);
}

// ─── Ordering ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn select_all_orders_by_created_at() {
  let s = store().await;
  for name in ["first", "second", "third"] {
    s.insert_one(Privilege::Elevated, new_rsvp(name, RsvpResponse::Yes, 1))
      .await
      .unwrap();
  }

  let newest: Vec<_> = s
    .select_all(Privilege::Elevated, SortOrder::NewestFirst)
    .await
    .unwrap()
    .into_iter()
    .map(|r| r.name)
    .collect();
  assert_eq!(newest, ["third", "second", "first"]);

  let oldest: Vec<_> = s
    .select_all(Privilege::Elevated, SortOrder::OldestFirst)
    .await
    .unwrap()
    .into_iter()
    .map(|r| r.name)
    .collect();
  assert_eq!(oldest, ["first", "second", "third"]);
}

#[tokio::test]
async fn empty_store_selects_nothing() {
  let s = store().await;
  let all = s
    .select_all(Privilege::Elevated, SortOrder::NewestFirst)
    .await
    .unwrap();
  assert!(all.is_empty());
}

// ─── Access levels ───────────────────────────────────────────────────────────

#[tokio::test]
async fn missing_elevated_key_fails_on_use_not_open() {
  let s = SqliteStore::open_in_memory(AccessKeys {
    restricted: "anon-key".into(),
    elevated:   None,
  })
  .await
  .expect("open succeeds without an elevated key");

  let err = s
    .insert_one(Privilege::Elevated, new_rsvp("Sam", RsvpResponse::Yes, 1))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::MissingKey(Privilege::Elevated)));

  let err = s
    .select_all(Privilege::Elevated, SortOrder::NewestFirst)
    .await
    .unwrap_err();
  assert!(matches!(err, Error::MissingKey(Privilege::Elevated)));
}

#[tokio::test]
async fn blank_elevated_key_counts_as_missing() {
  let s = SqliteStore::open_in_memory(AccessKeys {
    restricted: "anon-key".into(),
    elevated:   Some(String::new()),
  })
  .await
  .unwrap();
  let err = s
    .select_all(Privilege::Elevated, SortOrder::NewestFirst)
    .await
    .unwrap_err();
  assert!(matches!(err, Error::MissingKey(Privilege::Elevated)));
}

#[tokio::test]
async fn restricted_select_sees_no_rows() {
  let s = store().await;
  s.insert_one(Privilege::Elevated, new_rsvp("Alex", RsvpResponse::Yes, 2))
    .await
    .unwrap();

  let visible = s
    .select_all(Privilege::Restricted, SortOrder::NewestFirst)
    .await
    .unwrap();
  assert!(visible.is_empty());
}

#[tokio::test]
async fn restricted_insert_needs_public_insert_policy() {
  let s = store().await;
  let err = s
    .insert_one(Privilege::Restricted, new_rsvp("Sam", RsvpResponse::No, 1))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::PolicyDenied("insert")));

  let s = s.with_policy(RowPolicy { public_insert: true });
  s.insert_one(Privilege::Restricted, new_rsvp("Sam", RsvpResponse::No, 1))
    .await
    .unwrap();

  let all = s
    .select_all(Privilege::Elevated, SortOrder::NewestFirst)
    .await
    .unwrap();
  assert_eq!(all.len(), 1);
}

// ─── Store URLs ──────────────────────────────────────────────────────────────

#[test]
fn store_urls_parse() {
  assert_eq!(StoreLocation::parse(":memory:").unwrap(), StoreLocation::Memory);
  assert_eq!(StoreLocation::parse("sqlite::memory:").unwrap(), StoreLocation::Memory);
  assert_eq!(
    StoreLocation::parse("sqlite://data/rsvps.db").unwrap(),
    StoreLocation::File("data/rsvps.db".into())
  );
  assert_eq!(
    StoreLocation::parse("rsvps.db").unwrap(),
    StoreLocation::File("rsvps.db".into())
  );
  assert!(StoreLocation::parse("https://example.supabase.co").is_err());
  assert!(StoreLocation::parse("  ").is_err());
}

#[tokio::test]
async fn connect_opens_memory_url() {
  let s = SqliteStore::connect("sqlite::memory:", keys()).await.unwrap();
  s.insert_one(Privilege::Elevated, new_rsvp("Alex", RsvpResponse::Yes, 1))
    .await
    .unwrap();
}
