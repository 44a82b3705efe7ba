use crate::models::{envelope::ResponseEnvelope, error::AppError, user::User};
use crate::services::http::HttpClient;
use crate::utils::validation::validate_object_id;
use serde::Serialize;
use std::sync::Arc;

const USERS_KEYS: &[&str] = &["users", "data"];
const USER_KEYS: &[&str] = &["user", "data"];

/// Member administration.
#[derive(Debug, Clone)]
pub struct UserService {
    http: Arc<HttpClient>,
}

impl UserService {
    pub fn new(http: Arc<HttpClient>) -> Self {
        Self { http }
    }

    pub async fn list_users(
        &self,
        query: &[(String, String)],
    ) -> Result<ResponseEnvelope<Vec<User>>, AppError> {
        let result = self.http.get("/users", query).await;
        Ok(ResponseEnvelope::from_listing(result, USERS_KEYS, "Failed to load users"))
    }

    pub async fn get_user(&self, id: &str) -> Result<ResponseEnvelope<User>, AppError> {
        validate_object_id(id, "user")?;
        let result = self.http.get(&format!("/users/{id}"), &[]).await;
        Ok(ResponseEnvelope::from_result(result, USER_KEYS, "Failed to load user"))
    }

    pub async fn update_user<B: Serialize + ?Sized>(
        &self,
        id: &str,
        user: &B,
    ) -> Result<ResponseEnvelope<User>, AppError> {
        validate_object_id(id, "user")?;
        let result = self.http.put(&format!("/users/{id}"), user).await;
        Ok(ResponseEnvelope::from_result(result, USER_KEYS, "Failed to update user"))
    }

    pub async fn delete_user(&self, id: &str) -> Result<ResponseEnvelope<()>, AppError> {
        validate_object_id(id, "user")?;
        let result = self.http.delete(&format!("/users/{id}")).await;
        Ok(ResponseEnvelope::acknowledge(
            result,
            "User deleted",
            "Failed to delete user",
        ))
    }
}
