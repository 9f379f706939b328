//! Authentication handlers.

use actix_web::{HttpResponse, web};

use inkpost_shared::dto::{CredentialsRequest, LoginResponse, ProfileResponse, UserResponse};

use crate::middleware::auth::{Identity, cleared_session_cookie, session_cookie};
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// POST /register
pub async fn register(
    state: web::Data<AppState>,
    body: web::Json<CredentialsRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    let user = state.auth.register(&req.username, &req.password).await?;

    Ok(HttpResponse::Ok().json(UserResponse {
        id: user.id.as_uuid(),
        username: user.username,
        created_at: user.created_at,
    }))
}

/// POST /login - sets the session cookie.
pub async fn login(
    state: web::Data<AppState>,
    body: web::Json<CredentialsRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    let session = state.auth.login(&req.username, &req.password).await?;

    Ok(HttpResponse::Ok()
        .cookie(session_cookie(session.token, state.secure_cookies))
        .json(LoginResponse {
            id: session.user.id.as_uuid(),
            username: session.user.username,
        }))
}

/// GET /profile - Protected route
pub async fn profile(identity: Identity) -> AppResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(ProfileResponse {
        id: identity.user_id.as_uuid(),
        username: identity.username,
        issued_at: identity.issued_at,
    }))
}

/// POST /logout - blanks the session cookie; nothing changes server-side.
pub async fn logout(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok()
        .cookie(cleared_session_cookie(state.secure_cookies))
        .json("ok")
}
