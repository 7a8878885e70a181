//! Users API handlers.
//!
//! ```text
//! POST   /api/v1/users        {"firstName":"Ada",...}
//! GET    /api/v1/users/{id}
//! PATCH  /api/v1/users/{id}   {"course":"Physics"}
//! DELETE /api/v1/users/{id}
//! POST   /api/v1/login        {"email":"ada@example.org","password":"..."}
//! ```

use actix_web::{HttpResponse, delete, get, patch, post, web};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;
use utoipa::ToSchema;
use zeroize::Zeroizing;

use crate::domain::{
    Error, LoginCredentials, LoginValidationError, RegistrationRequest, User, UserPatch,
    parse_date_of_birth,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::CallerSession;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, invalid_field_error, parse_user_id};

/// Registration body for `POST /api/v1/users`.
///
/// Every field is optional at the wire level so missing values produce the
/// registration error messages rather than a generic body error.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub password_confirmation: Option<String>,
    pub profile_pic_url: Option<String>,
    /// Absent or `null` registers an internal user.
    #[schema(value_type = bool)]
    pub is_external: Option<bool>,
    pub student_code: Option<String>,
    pub course: Option<String>,
    pub semester_of_entry: Option<String>,
    /// `YYYY-MM-DD` or an RFC 3339 timestamp.
    pub date_of_birth: Option<String>,
}

impl From<CreateUserRequest> for RegistrationRequest {
    fn from(value: CreateUserRequest) -> Self {
        Self {
            first_name: value.first_name,
            last_name: value.last_name,
            email: value.email,
            password: value.password.map(Zeroizing::new),
            password_confirmation: value.password_confirmation.map(Zeroizing::new),
            profile_pic_url: value.profile_pic_url,
            is_external: value.is_external.unwrap_or(false),
            student_code: value.student_code,
            course: value.course,
            semester_of_entry: value.semester_of_entry,
            date_of_birth: value.date_of_birth,
        }
    }
}

/// Allow-listed body for `PATCH /api/v1/users/{id}`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UserPatchRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub profile_pic_url: Option<String>,
    pub course: Option<String>,
    pub semester_of_entry: Option<String>,
    pub date_of_birth: Option<String>,
}

impl TryFrom<UserPatchRequest> for UserPatch {
    type Error = Error;

    fn try_from(value: UserPatchRequest) -> Result<Self, Self::Error> {
        let date_of_birth = value
            .date_of_birth
            .as_deref()
            .map(parse_date_of_birth)
            .transpose()
            .map_err(|err| invalid_field_error(FieldName::new("dateOfBirth"), err.to_string()))?;
        Ok(Self {
            first_name: value.first_name,
            last_name: value.last_name,
            profile_pic_url: value.profile_pic_url,
            course: value.course,
            semester_of_entry: value.semester_of_entry,
            date_of_birth,
        })
    }
}

/// Public user representation; the password digest never leaves the server.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    #[schema(value_type = String, format = Uuid)]
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub is_external: bool,
    pub profile_pic_url: Option<String>,
    pub student_code: Option<String>,
    pub course: Option<String>,
    pub semester_of_entry: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email: user.email.to_string(),
            is_external: user.is_external,
            profile_pic_url: user.profile_pic_url.clone(),
            student_code: user.student_code.as_ref().map(ToString::to_string),
            course: user.course.clone(),
            semester_of_entry: user.semester_of_entry.clone(),
            date_of_birth: user.date_of_birth,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CreatedUser {
    pub created: UserResponse,
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct UpdatedUser {
    pub updated: UserResponse,
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct DeletedUser {
    pub deleted: UserResponse,
}

/// Login request body for `POST /api/v1/login`.
#[derive(Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl TryFrom<LoginRequest> for LoginCredentials {
    type Error = LoginValidationError;

    fn try_from(value: LoginRequest) -> Result<Self, Self::Error> {
        Self::try_from_parts(&value.email, &value.password)
    }
}

fn map_login_validation_error(err: LoginValidationError) -> Error {
    match err {
        LoginValidationError::InvalidEmail => Error::invalid_request("email must be valid")
            .with_details(json!({ "field": "email", "code": "invalid_email" })),
        LoginValidationError::EmptyPassword => Error::invalid_request("password must not be empty")
            .with_details(json!({ "field": "password", "code": "empty_password" })),
    }
}

/// Register a user.
#[utoipa::path(
    post,
    path = "/api/v1/users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = CreatedUser),
        (status = 400, description = "Invalid request", body = Error),
        (status = 500, description = "Internal server error", body = Error),
        (status = 503, description = "Persistence unavailable", body = Error)
    ),
    tags = ["users"],
    operation_id = "createUser"
)]
#[post("/users")]
pub async fn create_user(
    state: web::Data<HttpState>,
    payload: web::Json<CreateUserRequest>,
) -> ApiResult<HttpResponse> {
    let user = state.users.register(payload.into_inner().into()).await?;
    Ok(HttpResponse::Created().json(CreatedUser {
        created: UserResponse::from(&user),
    }))
}

/// Fetch a single user.
///
/// # Examples
/// ```
/// use actix_web::App;
/// use campus_events::inbound::http::users::get_user;
///
/// let app = App::new().service(get_user);
/// ```
#[utoipa::path(
    get,
    path = "/api/v1/users/{id}",
    params(("id" = String, Path, description = "User id")),
    responses(
        (status = 200, description = "User", body = UserResponse),
        (status = 404, description = "User not found", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["users"],
    operation_id = "getUser"
)]
#[get("/users/{id}")]
pub async fn get_user(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<UserResponse>> {
    let id = parse_user_id(&path)?;
    let user = state.users_query.fetch(&id).await?;
    Ok(web::Json(UserResponse::from(&user)))
}

/// Apply an allow-listed patch to a user.
#[utoipa::path(
    patch,
    path = "/api/v1/users/{id}",
    params(("id" = String, Path, description = "User id")),
    request_body = UserPatchRequest,
    responses(
        (status = 200, description = "User updated", body = UpdatedUser),
        (status = 400, description = "Invalid request", body = Error),
        (status = 404, description = "User not found", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["users"],
    operation_id = "editUser"
)]
#[patch("/users/{id}")]
pub async fn edit_user(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    payload: web::Json<UserPatchRequest>,
) -> ApiResult<web::Json<UpdatedUser>> {
    let id = parse_user_id(&path)?;
    let patch = UserPatch::try_from(payload.into_inner())?;
    let user = state.users.edit(&id, patch).await?;
    Ok(web::Json(UpdatedUser {
        updated: UserResponse::from(&user),
    }))
}

#[utoipa::path(
    delete,
    path = "/api/v1/users/{id}",
    params(("id" = String, Path, description = "User id")),
    responses(
        (status = 200, description = "User deleted", body = DeletedUser),
        (status = 404, description = "User not found", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["users"],
    operation_id = "deleteUser"
)]
#[delete("/users/{id}")]
pub async fn delete_user(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<DeletedUser>> {
    let id = parse_user_id(&path)?;
    let user = state.users.delete(&id).await?;
    Ok(web::Json(DeletedUser {
        deleted: UserResponse::from(&user),
    }))
}

/// Authenticate a user and establish a session.
#[utoipa::path(
    post,
    path = "/api/v1/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login success", headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Invalid credentials", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["users"],
    operation_id = "login",
    security([])
)]
#[post("/login")]
pub async fn login(
    state: web::Data<HttpState>,
    session: CallerSession,
    payload: web::Json<LoginRequest>,
) -> ApiResult<HttpResponse> {
    let credentials =
        LoginCredentials::try_from(payload.into_inner()).map_err(map_login_validation_error)?;
    let user_id = state.login.authenticate(&credentials).await?;
    session.sign_in(&user_id)?;
    info!(%user_id, "user logged in");
    Ok(HttpResponse::Ok().finish())
}
