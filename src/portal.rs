use crate::config::ApiConfig;
use crate::models::error::AppError;
use crate::services::{
    assignments::AssignmentService, auth::AuthService, events::EventService, http::HttpClient,
    projects::ProjectService, resources::ResourceService, submissions::SubmissionService,
    users::UserService,
};
use std::sync::Arc;

/// Every domain service over one shared client, so that pacing and the
/// session are common to all of them.
#[derive(Debug, Clone)]
pub struct Portal {
    http: Arc<HttpClient>,
    auth: AuthService,
    users: UserService,
    projects: ProjectService,
    assignments: AssignmentService,
    submissions: SubmissionService,
    events: EventService,
    resources: ResourceService,
}

impl Portal {
    pub fn new(config: ApiConfig) -> Result<Self, AppError> {
        Ok(Self::with_client(HttpClient::new(config)?))
    }

    /// Portal configured from `SEMILLERO_API_URL`.
    pub fn from_env() -> Result<Self, AppError> {
        Self::new(ApiConfig::from_env()?)
    }

    pub fn with_client(http: HttpClient) -> Self {
        let http = Arc::new(http);
        Self {
            auth: AuthService::new(Arc::clone(&http)),
            users: UserService::new(Arc::clone(&http)),
            projects: ProjectService::new(Arc::clone(&http)),
            assignments: AssignmentService::new(Arc::clone(&http)),
            submissions: SubmissionService::new(Arc::clone(&http)),
            events: EventService::new(Arc::clone(&http)),
            resources: ResourceService::new(Arc::clone(&http)),
            http,
        }
    }

    pub fn http(&self) -> &HttpClient {
        &self.http
    }

    pub fn auth(&self) -> &AuthService {
        &self.auth
    }

    pub fn users(&self) -> &UserService {
        &self.users
    }

    pub fn projects(&self) -> &ProjectService {
        &self.projects
    }

    pub fn assignments(&self) -> &AssignmentService {
        &self.assignments
    }

    pub fn submissions(&self) -> &SubmissionService {
        &self.submissions
    }

    pub fn events(&self) -> &EventService {
        &self.events
    }

    pub fn resources(&self) -> &ResourceService {
        &self.resources
    }
}
