//! Tests for the event service.

use std::sync::Arc;

use chrono::{DateTime, Duration, Local, TimeZone, Utc};
use mockable::Clock;
use rstest::rstest;

use super::*;
use crate::domain::ports::{FixtureAttachmentStore, MockAttachmentStore, MockEventRepository};
use crate::domain::{AttachmentUpload, ErrorCode, EventDraft, UserId};

struct FixtureClock;

impl Clock for FixtureClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        noon()
    }
}

fn noon() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 14, 12, 0, 0)
        .single()
        .expect("fixture timestamp")
}

fn make_service<S: AttachmentStore>(
    repo: MockEventRepository,
    store: S,
) -> EventService<MockEventRepository, S> {
    EventService::new(Arc::new(repo), Arc::new(store), Arc::new(FixtureClock))
}

fn draft(code: Option<&str>) -> EventDraft {
    EventDraft::try_new(
        code,
        "Robotics meetup",
        Some("Bring a laptop".into()),
        Some("Hall B".into()),
        noon(),
        Some(noon() + Duration::hours(2)),
    )
    .expect("valid draft")
}

fn stored_event() -> Event {
    Event {
        id: EventId::random(),
        event_code: EventCode::new("ROBOT").expect("code"),
        title: "Robotics meetup".into(),
        description: None,
        location: None,
        starts_at: noon(),
        ends_at: Some(noon() + Duration::hours(2)),
        attachment: None,
        created_by: UserId::random(),
        created_at: noon(),
    }
}

fn upload() -> AttachmentUpload {
    AttachmentUpload {
        file_name: "poster.png".into(),
        content_type: Some("image/png".into()),
        data: vec![1, 2, 3],
    }
}

#[rstest]
#[tokio::test]
async fn create_generates_code_when_absent() {
    let mut repo = MockEventRepository::new();
    repo.expect_find_by_code().return_once(|_| Ok(Vec::new()));
    repo.expect_create().times(1).return_once(|_| Ok(()));

    let creator = UserId::random();
    let event = make_service(repo, FixtureAttachmentStore)
        .create(CreateEventRequest {
            draft: draft(None),
            attachment: Some(upload()),
            created_by: creator,
        })
        .await
        .expect("event created");

    assert_eq!(event.created_by, creator);
    assert_eq!(event.event_code.as_ref().len(), crate::domain::event::GENERATED_CODE_LEN);
    assert_eq!(event.attachment.map(|a| a.size_bytes), Some(3));
    assert_eq!(event.created_at, noon());
}

#[rstest]
#[tokio::test]
async fn create_rejects_taken_code() {
    let mut repo = MockEventRepository::new();
    repo.expect_find_by_code()
        .times(1)
        .return_once(|_| Ok(vec![stored_event()]));
    repo.expect_create().never();

    let err = make_service(repo, FixtureAttachmentStore)
        .create(CreateEventRequest {
            draft: draft(Some("ROBOT")),
            attachment: None,
            created_by: UserId::random(),
        })
        .await
        .expect_err("duplicate code");
    assert_eq!(err.code(), ErrorCode::InvalidRequest);
    assert_eq!(err.message(), "event code already exists");
}

#[rstest]
#[tokio::test]
async fn create_removes_attachment_when_persistence_fails() {
    let mut repo = MockEventRepository::new();
    repo.expect_find_by_code().return_once(|_| Ok(Vec::new()));
    repo.expect_create()
        .return_once(|_| Err(EventPersistenceError::connection("refused")));

    let mut store = MockAttachmentStore::new();
    store.expect_store().times(1).returning(|upload| {
        Ok(EventAttachment {
            file_name: upload.file_name.clone(),
            content_type: upload.content_type.clone(),
            size_bytes: upload.data.len() as u64,
            storage_key: "abc-poster.png".into(),
        })
    });
    store
        .expect_remove()
        .times(1)
        .withf(|key| key == "abc-poster.png")
        .returning(|_| Ok(()));

    let err = make_service(repo, store)
        .create(CreateEventRequest {
            draft: draft(Some("ROBOT")),
            attachment: Some(upload()),
            created_by: UserId::random(),
        })
        .await
        .expect_err("persistence failure");
    assert_eq!(err.code(), ErrorCode::ServiceUnavailable);
}

#[rstest]
#[tokio::test]
async fn create_reports_oversized_attachment_as_invalid() {
    let mut repo = MockEventRepository::new();
    repo.expect_find_by_code().return_once(|_| Ok(Vec::new()));
    repo.expect_create().never();
    let mut store = MockAttachmentStore::new();
    store
        .expect_store()
        .returning(|_| Err(AttachmentStoreError::too_large(2_u64)));

    let err = make_service(repo, store)
        .create(CreateEventRequest {
            draft: draft(None),
            attachment: Some(upload()),
            created_by: UserId::random(),
        })
        .await
        .expect_err("too large");
    assert_eq!(err.code(), ErrorCode::InvalidRequest);
}

#[rstest]
#[tokio::test]
async fn by_code_with_no_matches_is_not_found() {
    let mut repo = MockEventRepository::new();
    repo.expect_find_by_code().return_once(|_| Ok(Vec::new()));

    let code = EventCode::new("XYZ").expect("code");
    let err = make_service(repo, FixtureAttachmentStore)
        .by_code(&code)
        .await
        .expect_err("no events");
    assert_eq!(err.code(), ErrorCode::NotFound);
    assert_eq!(err.message(), "invalid event code");
}

#[rstest]
#[tokio::test]
async fn list_returns_empty_vec_when_no_events() {
    let mut repo = MockEventRepository::new();
    repo.expect_list().return_once(|| Ok(Vec::new()));

    let events = make_service(repo, FixtureAttachmentStore)
        .list()
        .await
        .expect("list");
    assert!(events.is_empty());
}

#[rstest]
#[tokio::test]
async fn edit_rejects_schedule_inversion_without_update() {
    let existing = stored_event();
    let id = existing.id;
    let mut repo = MockEventRepository::new();
    repo.expect_find_by_id()
        .return_once(move |_| Ok(Some(existing)));
    repo.expect_update().never();

    let patch = EventPatch {
        starts_at: Some(noon() + Duration::hours(5)),
        ..EventPatch::default()
    };
    let err = make_service(repo, FixtureAttachmentStore)
        .edit(&id, patch)
        .await
        .expect_err("inverted schedule");
    assert_eq!(err.code(), ErrorCode::InvalidRequest);
}

#[rstest]
#[tokio::test]
async fn edit_missing_event_is_not_found() {
    let mut repo = MockEventRepository::new();
    repo.expect_update().return_once(|_, _| Ok(None));

    let patch = EventPatch {
        title: Some("Renamed".into()),
        ..EventPatch::default()
    };
    let err = make_service(repo, FixtureAttachmentStore)
        .edit(&EventId::random(), patch)
        .await
        .expect_err("missing event");
    assert_eq!(err.message(), "event not found");
}

#[rstest]
#[tokio::test]
async fn delete_removes_stored_attachment() {
    let mut existing = stored_event();
    existing.attachment = Some(EventAttachment {
        file_name: "poster.png".into(),
        content_type: None,
        size_bytes: 3,
        storage_key: "k-poster.png".into(),
    });
    let id = existing.id;
    let mut repo = MockEventRepository::new();
    repo.expect_delete()
        .times(1)
        .return_once(move |_| Ok(Some(existing)));
    let mut store = MockAttachmentStore::new();
    store.expect_remove().times(1).returning(|_| Ok(()));

    make_service(repo, store)
        .delete(&id)
        .await
        .expect("event deleted");
}

#[rstest]
#[tokio::test]
async fn delete_missing_event_is_not_found() {
    let mut repo = MockEventRepository::new();
    repo.expect_delete().return_once(|_| Ok(None));

    let err = make_service(repo, FixtureAttachmentStore)
        .delete(&EventId::random())
        .await
        .expect_err("missing event");
    assert_eq!(err.code(), ErrorCode::NotFound);
}
