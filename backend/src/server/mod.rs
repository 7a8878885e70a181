//! Server construction and middleware wiring.

mod config;
mod settings;
mod state_builders;

pub use config::ServerConfig;
pub use settings::{ServerSettings, SettingsError};

use state_builders::build_http_state;

use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};

use campus_events::Trace;
#[cfg(debug_assertions)]
use campus_events::doc::ApiDoc;
use campus_events::inbound::http::events::{
    create_event, delete_event, edit_event, get_event, get_events_by_code, list_events,
};
use campus_events::inbound::http::health::{HealthState, live, ready};
use campus_events::inbound::http::multipart::UploadLimit;
use campus_events::inbound::http::session_config::{SessionSettings, session_middleware};
use campus_events::inbound::http::state::HttpState;
use campus_events::inbound::http::users::{create_user, delete_user, edit_user, get_user, login};
use campus_events::inbound::http::validation::json_config;
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

#[derive(Clone)]
struct AppDependencies {
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
    upload_limit: web::Data<UploadLimit>,
    session: SessionSettings,
}

fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        health_state,
        http_state,
        upload_limit,
        session,
    } = deps;

    let api = web::scope("/api/v1")
        .wrap(session_middleware(&session))
        .service(login)
        .service(create_user)
        .service(get_user)
        .service(edit_user)
        .service(delete_user)
        .service(list_events)
        .service(get_events_by_code)
        .service(get_event)
        .service(create_event)
        .service(edit_event)
        .service(delete_event);

    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .app_data(upload_limit)
        .app_data(json_config())
        .wrap(Trace)
        .service(api)
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));

    app
}

/// Construct an Actix HTTP server using the provided health state and configuration.
///
/// # Errors
/// Propagates [`std::io::Error`] when preparing the attachment directory,
/// binding the socket, or starting the server fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let server_health_state = health_state.clone();
    let http_state = web::Data::new(build_http_state(&config)?);
    let upload_limit = web::Data::new(UploadLimit(config.max_upload_bytes));
    let ServerConfig {
        session,
        bind_addr,
        upload_dir: _,
        max_upload_bytes: _,
        db_pool: _,
    } = config;

    let server = HttpServer::new(move || {
        build_app(AppDependencies {
            health_state: server_health_state.clone(),
            http_state: http_state.clone(),
            upload_limit: upload_limit.clone(),
            session: session.clone(),
        })
    })
    .bind(bind_addr)?
    .run();

    health_state.mark_ready();
    Ok(server)
}
