//! Cookie session access for handlers.
//!
//! The only state kept in the session is the id of the user who logged in.
//! [`CallerSession`] stores it as a serialised [`UserId`] under
//! [`CALLER_KEY`].

use std::future::{Ready, ready};

use actix_session::{Session, SessionExt};
use actix_web::{FromRequest, HttpRequest, dev::Payload};
use tracing::warn;

use crate::domain::{Error, UserId};

pub(crate) const CALLER_KEY: &str = "caller";

/// Session of the current request, viewed as "who is calling".
#[derive(Clone)]
pub struct CallerSession(Session);

impl CallerSession {
    /// Bind the session to `user_id`, rotating the cookie.
    pub fn sign_in(&self, user_id: &UserId) -> Result<(), Error> {
        self.0.renew();
        self.0
            .insert(CALLER_KEY, user_id)
            .map_err(|error| Error::internal(format!("failed to write session: {error}")))
    }

    /// The signed-in user, if any.
    ///
    /// A value that no longer decodes as a user id clears the session.
    pub fn caller(&self) -> Option<UserId> {
        match self.0.get::<UserId>(CALLER_KEY) {
            Ok(caller) => caller,
            Err(error) => {
                warn!(%error, "discarding unreadable session");
                self.0.purge();
                None
            }
        }
    }

    /// The signed-in user or `401 Unauthorized`.
    pub fn require_caller(&self) -> Result<UserId, Error> {
        self.caller()
            .ok_or_else(|| Error::unauthorized("login required"))
    }
}

impl FromRequest for CallerSession {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(Ok(Self(req.get_session())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inbound::http::test_utils::{sample_user, session_cookie, test_session_middleware};
    use actix_web::dev::{Service, ServiceResponse};
    use actix_web::http::StatusCode;
    use actix_web::{App, HttpResponse, test, web};
    use rstest::rstest;

    async fn app() -> impl Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>
    {
        test::init_service(
            App::new()
                .wrap(test_session_middleware())
                .route(
                    "/sign-in",
                    web::post().to(|session: CallerSession| async move {
                        session.sign_in(&sample_user().id)?;
                        Ok::<_, Error>(HttpResponse::NoContent())
                    }),
                )
                .route(
                    "/forge",
                    web::post().to(|session: Session| async move {
                        session
                            .insert(CALLER_KEY, "not-a-uuid")
                            .map_err(actix_web::error::ErrorInternalServerError)?;
                        Ok::<_, actix_web::Error>(HttpResponse::NoContent())
                    }),
                )
                .route(
                    "/whoami",
                    web::get().to(|session: CallerSession| async move {
                        let caller = session.require_caller()?;
                        Ok::<_, Error>(HttpResponse::Ok().body(caller.to_string()))
                    }),
                ),
        )
        .await
    }

    #[actix_web::test]
    async fn signed_in_caller_is_recovered_from_cookie() {
        let app = app().await;
        let signed_in =
            test::call_service(&app, test::TestRequest::post().uri("/sign-in").to_request()).await;
        let cookie = session_cookie(&signed_in);

        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/whoami")
                .cookie(cookie)
                .to_request(),
        )
        .await;

        assert_eq!(res.status(), StatusCode::OK);
        let body = test::read_body(res).await;
        assert_eq!(body, sample_user().id.to_string());
    }

    #[rstest]
    #[case::anonymous(None)]
    #[case::forged(Some("/forge"))]
    #[actix_rt::test]
    async fn unusable_sessions_are_unauthorised(#[case] setup: Option<&str>) {
        let app = app().await;
        let mut request = test::TestRequest::get().uri("/whoami");
        if let Some(uri) = setup {
            let res = test::call_service(&app, test::TestRequest::post().uri(uri).to_request()).await;
            request = request.cookie(session_cookie(&res));
        }

        let res = test::call_service(&app, request.to_request()).await;

        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }
}
