//! Tests for events API handlers.

use super::*;
use crate::domain::ports::{MockEventCommand, MockEventQuery};
use crate::domain::{EventAttachment, EventId};
use crate::inbound::http::test_utils::{
    FormPart, MockPorts, multipart_body, sample_event, sample_user, session_cookie,
    test_session_middleware,
};
use crate::inbound::http::validation::json_config;
use actix_web::cookie::Cookie;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::{StatusCode, header};
use actix_web::{App, test as actix_test, web};
use rstest::rstest;
use serde_json::{Value, json};

async fn init(
    ports: MockPorts,
    limit: UploadLimit,
) -> impl Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error> {
    actix_test::init_service(
        App::new()
            .app_data(web::Data::new(ports.into_state()))
            .app_data(web::Data::new(limit))
            .app_data(json_config())
            .wrap(test_session_middleware())
            .route(
                "/test/login",
                web::post().to(|session: CallerSession| async move {
                    session.sign_in(&sample_user().id)?;
                    Ok::<_, Error>(HttpResponse::Ok())
                }),
            )
            .service(
                web::scope("/api/v1")
                    .service(list_events)
                    .service(get_events_by_code)
                    .service(get_event)
                    .service(create_event)
                    .service(edit_event)
                    .service(delete_event),
            ),
    )
    .await
}

async fn login<S>(app: &S) -> Cookie<'static>
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let response = actix_test::call_service(
        app,
        actix_test::TestRequest::post()
            .uri("/test/login")
            .to_request(),
    )
    .await;
    session_cookie(&response)
}

async fn json_body(response: ServiceResponse) -> Value {
    let body = actix_test::read_body(response).await;
    serde_json::from_slice(&body).expect("JSON body")
}

fn event_payload() -> Value {
    json!({
        "eventCode": "ROBOT",
        "title": "Robotics meetup",
        "description": "Bring a laptop",
        "location": "Hall B",
        "startsAt": "2025-04-01T10:00:00Z"
    })
}

fn create_request(parts: &[FormPart<'_>]) -> actix_test::TestRequest {
    let (content_type, body) = multipart_body(parts);
    actix_test::TestRequest::post()
        .uri("/api/v1/events")
        .insert_header((header::CONTENT_TYPE, content_type))
        .set_payload(body)
}

#[actix_web::test]
async fn list_events_returns_empty_array() {
    let mut events_query = MockEventQuery::new();
    events_query.expect_list().returning(|| Ok(Vec::new()));
    let app = init(
        MockPorts {
            events_query,
            ..MockPorts::default()
        },
        UploadLimit::default(),
    )
    .await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri("/api/v1/events")
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await, json!([]));
}

#[actix_web::test]
async fn get_event_returns_camel_case_json() {
    let mut events_query = MockEventQuery::new();
    events_query
        .expect_by_id()
        .returning(|_| Ok(sample_event()));
    let app = init(
        MockPorts {
            events_query,
            ..MockPorts::default()
        },
        UploadLimit::default(),
    )
    .await;
    let id = sample_event().id;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri(&format!("/api/v1/events/{id}"))
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["eventCode"], "ROBOT");
    assert_eq!(body["startsAt"], "2025-04-01T10:00:00Z");
    assert_eq!(body["createdBy"], sample_user().id.to_string());
}

#[actix_web::test]
async fn get_event_with_malformed_id_is_invalid() {
    let app = init(MockPorts::default(), UploadLimit::default()).await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri("/api/v1/events/42")
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(json_body(response).await["error"], "invalid event id");
}

#[actix_web::test]
async fn unknown_code_is_not_found() {
    let mut events_query = MockEventQuery::new();
    events_query
        .expect_by_code()
        .withf(|code| code.to_string() == "XYZ")
        .returning(|_| Err(Error::not_found("invalid event code")));
    let app = init(
        MockPorts {
            events_query,
            ..MockPorts::default()
        },
        UploadLimit::default(),
    )
    .await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri("/api/v1/events/code/XYZ")
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(json_body(response).await["error"], "invalid event code");
}

#[rstest]
#[case("AB")]
#[case("bad%20code")]
#[actix_rt::test]
async fn malformed_code_is_not_found(#[case] code: &str) {
    let mut events_query = MockEventQuery::new();
    events_query.expect_by_code().never();
    let app = init(
        MockPorts {
            events_query,
            ..MockPorts::default()
        },
        UploadLimit::default(),
    )
    .await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri(&format!("/api/v1/events/code/{code}"))
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(json_body(response).await["error"], "invalid event code");
}

#[actix_web::test]
async fn create_event_requires_session() {
    let app = init(MockPorts::default(), UploadLimit::default()).await;
    let data = event_payload().to_string();

    let request = create_request(&[FormPart {
        name: "data",
        file_name: None,
        content_type: None,
        body: data.as_bytes(),
    }])
    .to_request();
    let response = actix_test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(json_body(response).await["error"], "login required");
}

#[actix_web::test]
async fn create_event_passes_payload_attachment_and_caller() {
    let mut events = MockEventCommand::new();
    events
        .expect_create()
        .withf(|request| {
            let attachment = request.attachment.as_ref();
            request.created_by == sample_user().id
                && request.draft.title == "Robotics meetup"
                && request.draft.event_code.as_ref().map(ToString::to_string).as_deref() == Some("ROBOT")
                && attachment.map(|file| file.file_name.as_str()) == Some("agenda.pdf")
                && attachment.and_then(|file| file.content_type.as_deref())
                    == Some("application/pdf")
                && attachment.map(|file| file.data.as_slice()) == Some(b"%PDF".as_slice())
        })
        .times(1)
        .returning(|request| {
            let mut event = sample_event();
            event.attachment = request.attachment.map(|file| EventAttachment {
                storage_key: format!("fixture/{}", file.file_name),
                size_bytes: file.data.len() as u64,
                file_name: file.file_name,
                content_type: file.content_type,
            });
            Ok(event)
        });
    let app = init(
        MockPorts {
            events,
            ..MockPorts::default()
        },
        UploadLimit::default(),
    )
    .await;
    let cookie = login(&app).await;
    let data = event_payload().to_string();

    let request = create_request(&[
        FormPart {
            name: "data",
            file_name: None,
            content_type: None,
            body: data.as_bytes(),
        },
        FormPart {
            name: "file",
            file_name: Some("agenda.pdf"),
            content_type: Some("application/pdf"),
            body: b"%PDF",
        },
    ])
    .cookie(cookie)
    .to_request();
    let response = actix_test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = json_body(response).await;
    assert_eq!(body["created"]["eventCode"], "ROBOT");
    assert_eq!(body["created"]["attachment"]["fileName"], "agenda.pdf");
    assert_eq!(body["created"]["attachment"]["sizeBytes"], 4);
    assert!(body["created"]["attachment"].get("storageKey").is_none());
}

#[rstest]
#[case::missing_data(None, "missing required field: data")]
#[case::ends_before_start(
    Some(json!({"title": "Demo", "startsAt": "2025-04-01T10:00:00Z", "endsAt": "2025-04-01T09:00:00Z"})),
    "endsAt must not be before startsAt"
)]
#[actix_web::test]
async fn create_event_rejects_invalid_forms(#[case] data: Option<Value>, #[case] message: &str) {
    let app = init(MockPorts::default(), UploadLimit::default()).await;
    let cookie = login(&app).await;
    let data = data.map(|value| value.to_string());

    let mut parts = vec![FormPart {
        name: "file",
        file_name: Some("notes.txt"),
        content_type: Some("text/plain"),
        body: b"hello",
    }];
    if let Some(data) = &data {
        parts.push(FormPart {
            name: "data",
            file_name: None,
            content_type: None,
            body: data.as_bytes(),
        });
    }
    let request = create_request(&parts).cookie(cookie).to_request();
    let response = actix_test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["error"], message);
}

#[rstest]
#[case::extra_part("note", b"remember snacks".as_slice(), "unexpected multipart part: note")]
#[case::binary_data("data", b"\xff\xfe\xfd".as_slice(), "data part must be UTF-8")]
#[actix_rt::test]
async fn create_event_rejects_unusable_parts(
    #[case] name: &str,
    #[case] body: &[u8],
    #[case] message: &str,
) {
    let mut events = MockEventCommand::new();
    events.expect_create().never();
    let app = init(
        MockPorts {
            events,
            ..MockPorts::default()
        },
        UploadLimit::default(),
    )
    .await;
    let cookie = login(&app).await;
    let data = event_payload().to_string();

    let mut parts = Vec::new();
    if name != "data" {
        parts.push(FormPart {
            name: "data",
            file_name: None,
            content_type: None,
            body: data.as_bytes(),
        });
    }
    parts.push(FormPart {
        name,
        file_name: None,
        content_type: None,
        body,
    });
    let request = create_request(&parts).cookie(cookie).to_request();
    let response = actix_test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["error"], message);
}

#[actix_web::test]
async fn empty_file_part_means_no_attachment() {
    let mut events = MockEventCommand::new();
    events
        .expect_create()
        .withf(|request| request.attachment.is_none())
        .times(1)
        .returning(|_| Ok(sample_event()));
    let app = init(
        MockPorts {
            events,
            ..MockPorts::default()
        },
        UploadLimit::default(),
    )
    .await;
    let cookie = login(&app).await;
    let data = event_payload().to_string();

    let request = create_request(&[
        FormPart {
            name: "data",
            file_name: None,
            content_type: None,
            body: data.as_bytes(),
        },
        FormPart {
            name: "file",
            file_name: Some("empty.txt"),
            content_type: Some("text/plain"),
            body: b"",
        },
    ])
    .cookie(cookie)
    .to_request();
    let response = actix_test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::CREATED);
    assert!(json_body(response).await["created"]["attachment"].is_null());
}

#[actix_web::test]
async fn create_event_enforces_upload_limit() {
    let app = init(MockPorts::default(), UploadLimit(3)).await;
    let cookie = login(&app).await;
    let data = event_payload().to_string();

    let request = create_request(&[
        FormPart {
            name: "data",
            file_name: None,
            content_type: None,
            body: data.as_bytes(),
        },
        FormPart {
            name: "file",
            file_name: Some("big.bin"),
            content_type: None,
            body: b"0123456789",
        },
    ])
    .cookie(cookie)
    .to_request();
    let response = actix_test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["details"]["code"], "too_large");
}

#[rstest]
#[case::event_code(json!({"eventCode": "NEW"}))]
#[case::created_by(json!({"createdBy": "3fa85f64-5717-4562-b3fc-2c963f66afa6"}))]
#[case::attachment(json!({"attachment": null}))]
#[actix_rt::test]
async fn edit_event_rejects_fields_outside_allow_list(#[case] body: Value) {
    let app = init(MockPorts::default(), UploadLimit::default()).await;
    let id = sample_event().id;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::patch()
            .uri(&format!("/api/v1/events/{id}"))
            .set_json(body)
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn edit_event_wraps_updated_event() {
    let mut events = MockEventCommand::new();
    events
        .expect_edit()
        .withf(|_, patch| patch.title.as_deref() == Some("Renamed"))
        .returning(|_, patch| {
            let mut event = sample_event();
            patch.apply(&mut event);
            Ok(event)
        });
    let app = init(
        MockPorts {
            events,
            ..MockPorts::default()
        },
        UploadLimit::default(),
    )
    .await;
    let id = sample_event().id;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::patch()
            .uri(&format!("/api/v1/events/{id}"))
            .set_json(json!({"title": "Renamed"}))
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["updated"]["title"], "Renamed");
}

#[actix_web::test]
async fn delete_event_returns_no_content() {
    let mut events = MockEventCommand::new();
    let id = sample_event().id;
    events
        .expect_delete()
        .withf(move |candidate| *candidate == id)
        .times(1)
        .returning(|_| Ok(()));
    let app = init(
        MockPorts {
            events,
            ..MockPorts::default()
        },
        UploadLimit::default(),
    )
    .await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::delete()
            .uri(&format!("/api/v1/events/{id}"))
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let body = actix_test::read_body(response).await;
    assert!(body.is_empty());
}

#[actix_web::test]
async fn delete_missing_event_is_not_found() {
    let mut events = MockEventCommand::new();
    events
        .expect_delete()
        .returning(|_| Err(Error::not_found("event not found")));
    let app = init(
        MockPorts {
            events,
            ..MockPorts::default()
        },
        UploadLimit::default(),
    )
    .await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::delete()
            .uri(&format!("/api/v1/events/{}", EventId::random()))
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(json_body(response).await["error"], "event not found");
}
