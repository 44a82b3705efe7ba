use crate::models::{
    envelope::{Payload, ResponseEnvelope},
    error::AppError,
    user::{LoginRequest, RegisterRequest, Role, User},
};
use crate::services::http::{HttpClient, Request};
use serde::Serialize;
use std::sync::Arc;

const USER_KEYS: &[&str] = &["user", "data"];

const TOO_MANY_LOGINS: &str =
    "Too many login attempts. Please wait a moment before trying again.";
const TOO_MANY_REGISTRATIONS: &str =
    "Too many registration attempts. Please wait a moment before trying again.";

/// Sign-in, sign-up and the cached profile of the signed-in user.
#[derive(Debug, Clone)]
pub struct AuthService {
    http: Arc<HttpClient>,
}

impl AuthService {
    pub fn new(http: Arc<HttpClient>) -> Self {
        Self { http }
    }

    #[tracing::instrument(skip(self, password))]
    pub async fn login(
        &self,
        email: &str,
        password: &str,
    ) -> Result<ResponseEnvelope<User>, AppError> {
        let credentials = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let result = self.http.post("/auth/login", &credentials).await;

        let envelope = self.authenticate(result, TOO_MANY_LOGINS, "Connection error");
        if envelope.is_success() {
            tracing::info!("Signed in");
        }
        Ok(envelope)
    }

    pub async fn register(
        &self,
        request: &RegisterRequest,
    ) -> Result<ResponseEnvelope<User>, AppError> {
        let result = self.http.post("/auth/register", request).await;
        Ok(self.authenticate(result, TOO_MANY_REGISTRATIONS, "Registration failed"))
    }

    /// Fetches the profile behind the session cookie and refreshes the cache.
    pub async fn get_profile(&self) -> Result<ResponseEnvelope<User>, AppError> {
        let result = self.http.get("/auth/me", &[]).await;
        Ok(self.remember(ResponseEnvelope::from_result(
            result,
            USER_KEYS,
            "Failed to load profile",
        )))
    }

    pub async fn update_profile<B: Serialize + ?Sized>(
        &self,
        profile: &B,
    ) -> Result<ResponseEnvelope<User>, AppError> {
        let result = self.http.put("/auth/profile", profile).await;
        Ok(self.remember(ResponseEnvelope::from_result(
            result,
            USER_KEYS,
            "Failed to update profile",
        )))
    }

    /// Ends the session locally whatever the server answers.
    pub async fn logout(&self) -> Result<ResponseEnvelope<()>, AppError> {
        match self.http.send(Request::post("/auth/logout")).await {
            // The client already ended the session on the 401.
            Err(AppError::AuthError(_)) => {}
            Err(e) => {
                tracing::warn!(error = %e, "Logout request failed");
                self.http.session().end();
            }
            Ok(_) => self.http.session().end(),
        }
        Ok(ResponseEnvelope::done("Signed out"))
    }

    pub fn current_user(&self) -> Option<User> {
        self.http.session().current_user()
    }

    pub fn is_authenticated(&self) -> bool {
        self.current_user().is_some()
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.current_user().is_some_and(|user| user.has_role(role))
    }

    pub fn can_create_assignments(&self) -> bool {
        self.current_user().is_some_and(|user| user.is_staff())
    }

    pub fn can_grade_submissions(&self) -> bool {
        self.can_create_assignments()
    }

    fn authenticate(
        &self,
        result: Result<Payload, AppError>,
        throttled: &str,
        fallback: &str,
    ) -> ResponseEnvelope<User> {
        let envelope = match result {
            Err(e) if e.is_rate_limited() => ResponseEnvelope::failure(throttled),
            other => ResponseEnvelope::from_result(other, USER_KEYS, fallback),
        };
        self.remember(envelope)
    }

    fn remember(&self, envelope: ResponseEnvelope<User>) -> ResponseEnvelope<User> {
        if let Some(user) = envelope.data() {
            self.http.session().remember(user);
        }
        envelope
    }
}
