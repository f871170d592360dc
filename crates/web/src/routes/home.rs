//! Role router.
//!
//! `/` and `/dashboard` never render anything themselves; they inspect the
//! session and bounce to the right place. The role comes from the server
//! side of the session, not from anything the client sends.

use axum::response::Redirect;
use tracing::instrument;

use nani_connect_core::Role;

use crate::middleware::auth::{OptionalAuth, RequireAuth};

/// Landing page: route to the dashboard when logged in, login otherwise.
#[instrument(skip(user))]
pub async fn home(OptionalAuth(user): OptionalAuth) -> Redirect {
    match user {
        Some(_) => Redirect::to("/dashboard"),
        None => Redirect::to("/auth/login"),
    }
}

/// Dashboard router: sellers to `/seller`, everyone else to `/buyer`.
#[instrument(skip(user))]
pub async fn dashboard(RequireAuth(user): RequireAuth) -> Redirect {
    match user.role {
        Role::Seller => Redirect::to("/seller"),
        Role::Buyer => Redirect::to("/buyer"),
    }
}
