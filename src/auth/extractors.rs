use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
    response::Redirect,
};
use axum_extra::extract::CookieJar;
use uuid::Uuid;

use crate::auth::session::{SessionCodec, SESSION_COOKIE};

/// The single gate for protected routes: rehydrates the user id from the
/// session cookie, or redirects to the login page with the original path as
/// `redirectTo`.
pub struct AuthUser(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    SessionCodec: FromRef<S>,
{
    type Rejection = Redirect;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let codec = SessionCodec::from_ref(state);
        let jar = CookieJar::from_headers(&parts.headers);
        match codec.read(jar.get(SESSION_COOKIE).map(|c| c.value())) {
            Some(user_id) => Ok(AuthUser(user_id)),
            None => Err(Redirect::to(&format!(
                "/login?redirectTo={}",
                parts.uri.path()
            ))),
        }
    }
}

/// Optional variant for routes that only want to know who, if anyone, is
/// signed in.
pub struct MaybeAuthUser(pub Option<Uuid>);

#[async_trait]
impl<S> FromRequestParts<S> for MaybeAuthUser
where
    S: Send + Sync,
    SessionCodec: FromRef<S>,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let codec = SessionCodec::from_ref(state);
        let jar = CookieJar::from_headers(&parts.headers);
        Ok(MaybeAuthUser(
            codec.read(jar.get(SESSION_COOKIE).map(|c| c.value())),
        ))
    }
}
