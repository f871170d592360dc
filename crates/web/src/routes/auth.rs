//! Authentication route handlers.
//!
//! Handles login, registration, and logout. Both forms redirect back to
//! themselves with an error code in the query string on failure, and
//! into the role router on success.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use nani_connect_core::{Coordinates, Role};

use crate::db::users::UserRepository;
use crate::error::{clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::middleware::auth::{clear_current_user, set_current_user};
use crate::models::CurrentUser;
use crate::models::user::User;
use crate::services::auth::{AuthError, AuthService};
use crate::state::AppState;

// =============================================================================
// Form Types
// =============================================================================

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// Registration form data.
///
/// Latitude and longitude are filled by the sign-up page's geolocation
/// opt-in and arrive empty when the user declines.
#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    pub email: String,
    pub password: String,
    pub password_confirm: String,
    pub role: String,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub latitude: Option<f64>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub longitude: Option<f64>,
}

/// Form inputs submit empty strings when untouched; treat those as absent.
fn empty_as_none<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    match value.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => s.parse().map(Some).map_err(serde::de::Error::custom),
    }
}

// =============================================================================
// Query Types
// =============================================================================

/// Query parameters for error/success display.
#[derive(Debug, Deserialize)]
pub struct MessageQuery {
    pub error: Option<String>,
    pub success: Option<String>,
}

/// Map a redirect error code to the message shown in the flash banner.
fn describe_error(code: &str) -> String {
    match code {
        "credentials" => "Invalid email or password.".to_owned(),
        "email_taken" => "An account with this email already exists.".to_owned(),
        "invalid_email" => "That email address doesn't look right.".to_owned(),
        "password_mismatch" => "Passwords do not match.".to_owned(),
        "password_too_short" => "Password must be at least 8 characters.".to_owned(),
        "invalid_role" => "Please choose buyer or seller.".to_owned(),
        "session" => "Could not start a session, please try again.".to_owned(),
        _ => "Something went wrong, please try again.".to_owned(),
    }
}

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub error: Option<String>,
    pub success: Option<String>,
}

/// Register page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/register.html")]
pub struct RegisterTemplate {
    pub error: Option<String>,
}

// =============================================================================
// Login Routes
// =============================================================================

/// Display the login page.
pub async fn login_page(Query(query): Query<MessageQuery>) -> impl IntoResponse {
    LoginTemplate {
        error: query.error.as_deref().map(describe_error),
        success: query.success,
    }
}

/// Handle login form submission.
#[instrument(skip(state, session, form))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Response {
    let auth = AuthService::new(UserRepository::new(state.pool()));

    match auth.login(&form.email, &form.password).await {
        Ok(user) => establish_session(&session, &user).await,
        Err(AuthError::InvalidCredentials) => {
            tracing::warn!("login failed");
            Redirect::to("/auth/login?error=credentials").into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "login error");
            Redirect::to("/auth/login?error=failed").into_response()
        }
    }
}

// =============================================================================
// Registration Routes
// =============================================================================

/// Display the registration page.
pub async fn register_page(Query(query): Query<MessageQuery>) -> impl IntoResponse {
    RegisterTemplate {
        error: query.error.as_deref().map(describe_error),
    }
}

/// Handle registration form submission.
///
/// The role is validated against the closed set here at the boundary;
/// anything other than `buyer` or `seller` is rejected outright.
#[instrument(skip(state, session, form))]
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<RegisterForm>,
) -> Response {
    if form.password != form.password_confirm {
        return Redirect::to("/auth/register?error=password_mismatch").into_response();
    }

    let Ok(role) = form.role.parse::<Role>() else {
        return Redirect::to("/auth/register?error=invalid_role").into_response();
    };

    // A location needs both halves of the fix
    let coordinates = match (form.latitude, form.longitude) {
        (Some(lat), Some(lon)) => Some(Coordinates::new(lat, lon)),
        _ => None,
    };

    let auth = AuthService::new(UserRepository::new(state.pool()));

    match auth
        .register(&form.email, &form.password, role, coordinates)
        .await
    {
        Ok(user) => establish_session(&session, &user).await,
        Err(AuthError::UserAlreadyExists) => {
            Redirect::to("/auth/register?error=email_taken").into_response()
        }
        Err(AuthError::InvalidEmail(_)) => {
            Redirect::to("/auth/register?error=invalid_email").into_response()
        }
        Err(AuthError::WeakPassword(_)) => {
            Redirect::to("/auth/register?error=password_too_short").into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "registration error");
            Redirect::to("/auth/register?error=failed").into_response()
        }
    }
}

/// Store the identity in the session and send the user through the role
/// router.
async fn establish_session(session: &Session, user: &User) -> Response {
    let current = CurrentUser {
        id: user.id,
        email: user.email.clone(),
        role: user.role,
    };

    if let Err(e) = set_current_user(session, &current).await {
        tracing::error!(error = %e, "failed to set session");
        return Redirect::to("/auth/login?error=session").into_response();
    }

    set_sentry_user(&user.id, Some(user.email.as_str()));
    Redirect::to("/dashboard").into_response()
}

// =============================================================================
// Logout Route
// =============================================================================

/// Handle logout: clear the identity and destroy the session.
#[instrument(skip(session))]
pub async fn logout(session: Session) -> Response {
    if let Err(e) = clear_current_user(&session).await {
        tracing::error!(error = %e, "failed to clear session");
    }

    if let Err(e) = session.flush().await {
        tracing::error!(error = %e, "failed to flush session");
    }

    clear_sentry_user();
    Redirect::to("/auth/login?success=logged_out").into_response()
}
