use crate::config::Config;
use crate::models::{
    envelope::ResponseEnvelope,
    error::AppError,
    project::{Project, ProjectFilters},
};
use crate::services::http::{HttpClient, Request};
use crate::utils::validation::validate_object_id;
use serde::Serialize;
use std::sync::Arc;

const PROJECTS_KEYS: &[&str] = &["data", "projects"];
const PROJECT_KEYS: &[&str] = &["data", "project"];

const JOIN_UNAVAILABLE: &str =
    "Joining projects is not available yet. Please contact the teacher.";

#[derive(Debug, Clone)]
pub struct ProjectService {
    http: Arc<HttpClient>,
}

impl ProjectService {
    pub fn new(http: Arc<HttpClient>) -> Self {
        Self { http }
    }

    pub async fn list_projects(
        &self,
        filters: &ProjectFilters,
    ) -> Result<ResponseEnvelope<Vec<Project>>, AppError> {
        let query = filters.to_query(Config::DEFAULT_PAGE_SIZE);
        let result = self.http.get("/projects", &query).await;
        Ok(ResponseEnvelope::from_listing(
            result,
            PROJECTS_KEYS,
            "Failed to load projects",
        ))
    }

    pub async fn get_project(&self, id: &str) -> Result<ResponseEnvelope<Project>, AppError> {
        validate_object_id(id, "project")?;
        let result = self.http.get(&format!("/projects/{id}"), &[]).await;
        Ok(ResponseEnvelope::from_result(
            result,
            PROJECT_KEYS,
            "Failed to load project",
        ))
    }

    /// Projects of the signed-in user; a short general listing when the
    /// filtered listing is unavailable.
    pub async fn my_projects(&self) -> Result<ResponseEnvelope<Vec<Project>>, AppError> {
        let mine = [("filter".to_string(), "my".to_string())];
        let result = match self.http.get("/projects", &mine).await {
            Err(e) => {
                tracing::warn!(error = %e, "My projects unavailable, falling back to recent projects");
                let recent = [("limit".to_string(), "5".to_string())];
                self.http.get("/projects", &recent).await
            }
            ok => ok,
        };
        Ok(ResponseEnvelope::from_listing(
            result,
            PROJECTS_KEYS,
            "Failed to load projects",
        ))
    }

    pub async fn create_project<B: Serialize + ?Sized>(
        &self,
        project: &B,
    ) -> Result<ResponseEnvelope<Project>, AppError> {
        let result = self.http.post("/projects", project).await;
        Ok(ResponseEnvelope::from_result(
            result,
            PROJECT_KEYS,
            "Failed to create project",
        ))
    }

    pub async fn update_project<B: Serialize + ?Sized>(
        &self,
        id: &str,
        project: &B,
    ) -> Result<ResponseEnvelope<Project>, AppError> {
        validate_object_id(id, "project")?;
        let result = self.http.put(&format!("/projects/{id}"), project).await;
        Ok(ResponseEnvelope::from_result(
            result,
            PROJECT_KEYS,
            "Failed to update project",
        ))
    }

    pub async fn delete_project(&self, id: &str) -> Result<ResponseEnvelope<()>, AppError> {
        validate_object_id(id, "project")?;
        let result = self.http.delete(&format!("/projects/{id}")).await;
        Ok(ResponseEnvelope::acknowledge(
            result,
            "Project deleted",
            "Failed to delete project",
        ))
    }

    /// Joins the project. Backends without a join endpoint answer 404; the
    /// project is then probed to tell "no such project" from "not supported".
    pub async fn join_project(&self, id: &str) -> Result<ResponseEnvelope<()>, AppError> {
        validate_object_id(id, "project")?;
        let fallback = "Failed to join project";

        match self.http.send(Request::post(&format!("/projects/{id}/join"))).await {
            Err(join_error @ AppError::NotFound(_)) => {
                tracing::warn!(project = id, "Join endpoint not found, checking project");
                match self.http.get(&format!("/projects/{id}"), &[]).await {
                    Ok(project) if project.is_success() => {
                        Ok(ResponseEnvelope::failure(JOIN_UNAVAILABLE))
                    }
                    _ => Ok(ResponseEnvelope::failure(join_error.user_message(fallback))),
                }
            }
            result => Ok(ResponseEnvelope::acknowledge(
                result,
                "You have joined the project",
                fallback,
            )),
        }
    }

    pub async fn leave_project(&self, id: &str) -> Result<ResponseEnvelope<()>, AppError> {
        validate_object_id(id, "project")?;
        let result = self
            .http
            .send(Request::post(&format!("/projects/{id}/leave")))
            .await;
        Ok(ResponseEnvelope::acknowledge(
            result,
            "You have left the project",
            "Failed to leave project",
        ))
    }
}
