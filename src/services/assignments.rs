use crate::config::Config;
use crate::models::{
    assignment::{Assignment, AssignmentFilters, AssignmentStats},
    envelope::{Payload, ResponseEnvelope},
    error::AppError,
};
use crate::services::http::HttpClient;
use crate::utils::validation::validate_object_id;
use serde::Serialize;
use std::sync::Arc;

const ASSIGNMENTS_KEYS: &[&str] = &["assignments", "data"];
const ASSIGNMENT_KEYS: &[&str] = &["assignment", "data"];

#[derive(Debug, Clone)]
pub struct AssignmentService {
    http: Arc<HttpClient>,
}

impl AssignmentService {
    pub fn new(http: Arc<HttpClient>) -> Self {
        Self { http }
    }

    /// Assignments of the signed-in user. Never fails: an unreachable
    /// listing shows as an empty first page.
    pub async fn my_assignments(
        &self,
        filters: &AssignmentFilters,
    ) -> Result<ResponseEnvelope<Vec<Assignment>>, AppError> {
        let query = filters.to_query(Config::MY_PAGE_SIZE);
        let result = self.fetch_mine(query).await;
        Ok(ResponseEnvelope::or_empty(
            result,
            ASSIGNMENTS_KEYS,
            "Failed to load assignments",
        ))
    }

    pub async fn get_assignment(&self, id: &str) -> Result<ResponseEnvelope<Assignment>, AppError> {
        validate_object_id(id, "assignment")?;
        let result = self.http.get(&format!("/assignments/{id}"), &[]).await;
        Ok(ResponseEnvelope::from_result(
            result,
            ASSIGNMENT_KEYS,
            "Failed to load assignment",
        ))
    }

    pub async fn list_assignments(
        &self,
        filters: &AssignmentFilters,
    ) -> Result<ResponseEnvelope<Vec<Assignment>>, AppError> {
        let query = filters.to_query(Config::DEFAULT_PAGE_SIZE);
        let result = self.http.get("/assignments", &query).await;
        Ok(ResponseEnvelope::from_listing(
            result,
            ASSIGNMENTS_KEYS,
            "Failed to load assignments",
        ))
    }

    pub async fn create_assignment<B: Serialize + ?Sized>(
        &self,
        assignment: &B,
    ) -> Result<ResponseEnvelope<Assignment>, AppError> {
        let result = self.http.post("/assignments", assignment).await;
        Ok(ResponseEnvelope::from_result(
            result,
            ASSIGNMENT_KEYS,
            "Failed to create assignment",
        ))
    }

    pub async fn update_assignment<B: Serialize + ?Sized>(
        &self,
        id: &str,
        changes: &B,
    ) -> Result<ResponseEnvelope<Assignment>, AppError> {
        validate_object_id(id, "assignment")?;
        let result = self.http.put(&format!("/assignments/{id}"), changes).await;
        Ok(ResponseEnvelope::from_result(
            result,
            ASSIGNMENT_KEYS,
            "Failed to update assignment",
        ))
    }

    pub async fn delete_assignment(&self, id: &str) -> Result<ResponseEnvelope<()>, AppError> {
        validate_object_id(id, "assignment")?;
        let result = self.http.delete(&format!("/assignments/{id}")).await;
        Ok(ResponseEnvelope::acknowledge(
            result,
            "Assignment deleted",
            "Failed to delete assignment",
        ))
    }

    /// Dashboard counters. Falls back to the general listing, then to zeros.
    pub async fn assignment_stats(&self) -> Result<ResponseEnvelope<AssignmentStats>, AppError> {
        let limit = [("limit".to_string(), Config::STATS_PAGE_SIZE.to_string())];

        let mine = self.http.get("/assignments/my", &limit).await;
        if let Some(stats) = stats_from(mine) {
            return Ok(ResponseEnvelope::ok(stats));
        }

        tracing::warn!("Assignment statistics unavailable, using the general listing");
        let all = self.http.get("/assignments", &limit).await;
        if let Some(stats) = stats_from(all) {
            return Ok(ResponseEnvelope::ok(stats));
        }

        tracing::warn!("Fallback statistics failed, reporting zeros");
        Ok(ResponseEnvelope::ok(AssignmentStats::default()))
    }

    async fn fetch_mine(&self, mut query: Vec<(String, String)>) -> Result<Payload, AppError> {
        let mine = self.http.get("/assignments/my", &query).await;
        match mine {
            Err(e) => {
                tracing::warn!(error = %e, "Trying fallback for my assignments");
                query.push(("my".to_string(), "true".to_string()));
                self.http.get("/assignments", &query).await
            }
            ok => ok,
        }
    }
}

fn stats_from(result: Result<Payload, AppError>) -> Option<AssignmentStats> {
    let payload = result.ok().filter(Payload::is_success)?;
    let assignments: Vec<Assignment> = payload
        .extract_items(ASSIGNMENTS_KEYS)
        .ok()
        .flatten()
        .unwrap_or_default();
    Some(AssignmentStats::from_assignments(&assignments))
}
