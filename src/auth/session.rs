use axum::extract::FromRef;
use axum_extra::extract::cookie::{Cookie, SameSite};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use crate::state::AppState;

pub const SESSION_COOKIE: &str = "reqsmith_session";

const SESSION_MAX_AGE_DAYS: i64 = 30;

type HmacSha256 = Hmac<Sha256>;

/// An established login. Carries exactly one claim.
pub struct Session {
    user_id: Uuid,
}

impl Session {
    pub fn user_id(&self) -> Uuid {
        self.user_id
    }
}

/// Stateless signed-cookie session codec. The cookie value is
/// `"{user_id}.{mac}"` where the MAC covers the user id; nothing is tracked
/// server-side and expiry rides on the cookie's own max-age.
#[derive(Clone)]
pub struct SessionCodec {
    secret: String,
    secure: bool,
}

impl FromRef<AppState> for SessionCodec {
    fn from_ref(state: &AppState) -> Self {
        SessionCodec::new(
            state.config.session.secret.clone(),
            state.config.session.cookie_secure,
        )
    }
}

impl SessionCodec {
    pub fn new(secret: impl Into<String>, secure: bool) -> Self {
        Self {
            secret: secret.into(),
            secure,
        }
    }

    pub fn create(&self, user_id: Uuid) -> Session {
        Session { user_id }
    }

    pub fn serialize(&self, session: &Session) -> Cookie<'static> {
        let payload = session.user_id().to_string();
        let value = format!("{payload}.{}", self.sign(&payload));
        Cookie::build((SESSION_COOKIE, value))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.secure)
            .max_age(Duration::days(SESSION_MAX_AGE_DAYS))
            .build()
    }

    /// Decode a carrier value into a user id. This has exactly two outcomes:
    /// a missing, tampered or otherwise malformed carrier reads as `None`,
    /// never as an error, so a corrupt cookie can't fail a page load.
    pub fn read(&self, carrier: Option<&str>) -> Option<Uuid> {
        let value = carrier?;
        let (payload, signature) = value.split_once('.')?;
        let mut mac = HmacSha256::new_from_slice(self.secret.as_bytes()).ok()?;
        mac.update(payload.as_bytes());
        let signature = URL_SAFE_NO_PAD.decode(signature).ok()?;
        mac.verify_slice(&signature).ok()?;
        Uuid::parse_str(payload).ok()
    }

    /// A carrier that is already expired, so the client discards its copy on
    /// the next request regardless of clock skew.
    pub fn destroy(&self) -> Cookie<'static> {
        Cookie::build((SESSION_COOKIE, ""))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.secure)
            .max_age(Duration::ZERO)
            .expires(OffsetDateTime::UNIX_EPOCH)
            .build()
    }

    fn sign(&self, payload: &str) -> String {
        let mut mac = HmacSha256::new_from_slice(self.secret.as_bytes())
            .expect("hmac accepts any key length");
        mac.update(payload.as_bytes());
        URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codec() -> SessionCodec {
        SessionCodec::new("test-secret", false)
    }

    #[test]
    fn round_trip_returns_the_user_id() {
        let codec = codec();
        let user_id = Uuid::new_v4();
        let cookie = codec.serialize(&codec.create(user_id));
        assert_eq!(codec.read(Some(cookie.value())), Some(user_id));
    }

    #[test]
    fn destroyed_carrier_reads_as_absent() {
        let codec = codec();
        let destroyed = codec.destroy();
        assert_eq!(codec.read(Some(destroyed.value())), None);
        assert_eq!(destroyed.max_age(), Some(Duration::ZERO));
    }

    #[test]
    fn missing_and_malformed_carriers_read_as_absent() {
        let codec = codec();
        assert_eq!(codec.read(None), None);
        assert_eq!(codec.read(Some("")), None);
        assert_eq!(codec.read(Some("no-separator")), None);
        assert_eq!(codec.read(Some("payload.not!base64")), None);
    }

    #[test]
    fn swapping_the_payload_invalidates_the_signature() {
        let codec = codec();
        let cookie = codec.serialize(&codec.create(Uuid::new_v4()));
        let (_, signature) = cookie.value().split_once('.').unwrap();
        let forged = format!("{}.{signature}", Uuid::new_v4());
        assert_eq!(codec.read(Some(forged.as_str())), None);
    }

    #[test]
    fn a_different_secret_rejects_the_carrier() {
        let cookie = codec().serialize(&codec().create(Uuid::new_v4()));
        let other = SessionCodec::new("another-secret", false);
        assert_eq!(other.read(Some(cookie.value())), None);
    }

    #[test]
    fn cookie_attributes_are_fixed() {
        let cookie = codec().serialize(&codec().create(Uuid::new_v4()));
        assert_eq!(cookie.name(), SESSION_COOKIE);
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_eq!(cookie.secure(), Some(false));
        assert_eq!(cookie.max_age(), Some(Duration::days(30)));
    }

    #[test]
    fn production_codec_marks_the_cookie_secure() {
        let codec = SessionCodec::new("test-secret", true);
        let cookie = codec.serialize(&codec.create(Uuid::new_v4()));
        assert_eq!(cookie.secure(), Some(true));
    }
}
