use crate::config::Config;
use crate::models::{
    envelope::ResponseEnvelope,
    error::AppError,
    file::{DownloadedFile, FileUpload},
    submission::{GradeData, NewSubmission, Submission, SubmissionFilters},
};
use crate::services::http::{HttpClient, Request};
use crate::services::transport::MultipartForm;
use crate::utils::validation::{validate_files, validate_object_id};
use serde::Serialize;
use std::sync::Arc;

const SUBMISSIONS_KEYS: &[&str] = &["submissions", "data"];
const SUBMISSION_KEYS: &[&str] = &["submission", "data"];

/// File-based deliveries for assignments, and their grading.
#[derive(Debug, Clone)]
pub struct SubmissionService {
    http: Arc<HttpClient>,
}

impl SubmissionService {
    pub fn new(http: Arc<HttpClient>) -> Self {
        Self { http }
    }

    /// Submissions of the signed-in user, an empty page when unavailable.
    pub async fn my_submissions(
        &self,
        filters: &SubmissionFilters,
    ) -> Result<ResponseEnvelope<Vec<Submission>>, AppError> {
        let mut query = filters.to_query(Config::MY_PAGE_SIZE);
        query.push(("filter".to_string(), "my".to_string()));
        let result = self.http.get("/submissions", &query).await;
        Ok(ResponseEnvelope::or_empty(
            result,
            SUBMISSIONS_KEYS,
            "Failed to load submissions",
        ))
    }

    /// Uploads a new submission with up to five attached files.
    pub async fn create_submission(
        &self,
        submission: &NewSubmission,
        files: Vec<FileUpload>,
    ) -> Result<ResponseEnvelope<Submission>, AppError> {
        validate_files(&files)?;

        let mut form = MultipartForm::new()
            .text("assignment", submission.assignment.as_str())
            .text("content", submission.content.as_str());
        if let Some(comments) = &submission.comments {
            form = form.text("comments", comments.as_str());
        }
        let form = files
            .into_iter()
            .fold(form, |form, file| form.file("files", file));

        let result = self
            .http
            .send(Request::post("/submissions").multipart(form))
            .await;
        Ok(ResponseEnvelope::from_result(
            result,
            SUBMISSION_KEYS,
            "Failed to create submission",
        ))
    }

    pub async fn get_submission(&self, id: &str) -> Result<ResponseEnvelope<Submission>, AppError> {
        validate_object_id(id, "submission")?;
        let result = self.http.get(&format!("/submissions/{id}"), &[]).await;
        Ok(ResponseEnvelope::from_result(
            result,
            SUBMISSION_KEYS,
            "Failed to load submission",
        ))
    }

    pub async fn submissions_for_assignment(
        &self,
        assignment_id: &str,
        filters: &SubmissionFilters,
    ) -> Result<ResponseEnvelope<Vec<Submission>>, AppError> {
        validate_object_id(assignment_id, "assignment")?;
        let query = filters.to_query(Config::DEFAULT_PAGE_SIZE);
        let result = self
            .http
            .get(&format!("/assignments/{assignment_id}/submissions"), &query)
            .await;
        Ok(ResponseEnvelope::from_listing(
            result,
            SUBMISSIONS_KEYS,
            "Failed to load submissions",
        ))
    }

    /// Updates a submission. With new files the change is sent as multipart
    /// form fields, otherwise as JSON.
    pub async fn update_submission<B: Serialize + ?Sized>(
        &self,
        id: &str,
        changes: &B,
        files: Vec<FileUpload>,
    ) -> Result<ResponseEnvelope<Submission>, AppError> {
        validate_object_id(id, "submission")?;
        let path = format!("/submissions/{id}");

        let result = if files.is_empty() {
            self.http.put(&path, changes).await
        } else {
            validate_files(&files)?;
            let form = MultipartForm::from_fields(changes)
                .map_err(|e| AppError::ValidationError(e.to_string()))?;
            let form = files
                .into_iter()
                .fold(form, |form, file| form.file("files", file));
            self.http.send(Request::put(&path).multipart(form)).await
        };

        Ok(ResponseEnvelope::from_result(
            result,
            SUBMISSION_KEYS,
            "Failed to update submission",
        ))
    }

    pub async fn grade_submission(
        &self,
        id: &str,
        grade: &GradeData,
    ) -> Result<ResponseEnvelope<Submission>, AppError> {
        validate_object_id(id, "submission")?;
        let result = self.http.put(&format!("/submissions/{id}/grade"), grade).await;
        Ok(ResponseEnvelope::from_result(
            result,
            SUBMISSION_KEYS,
            "Failed to grade submission",
        ))
    }

    /// Fetches one attached file as raw bytes.
    pub async fn download_file(
        &self,
        id: &str,
        filename: &str,
    ) -> Result<ResponseEnvelope<DownloadedFile>, AppError> {
        validate_object_id(id, "submission")?;
        if filename.trim().is_empty() {
            return Err(AppError::ValidationError("File name is required".to_string()));
        }

        let request = Request::get(&format!("/submissions/{id}/files")).segment(filename);
        match self.http.send_bytes(request).await {
            Ok(bytes) => Ok(ResponseEnvelope::ok(DownloadedFile {
                filename: filename.to_string(),
                bytes,
            })
            .with_message("File downloaded")),
            Err(e) => Ok(ResponseEnvelope::failure(
                e.user_message("Failed to download file"),
            )),
        }
    }

    pub async fn delete_submission(&self, id: &str) -> Result<ResponseEnvelope<()>, AppError> {
        validate_object_id(id, "submission")?;
        let result = self.http.delete(&format!("/submissions/{id}")).await;
        Ok(ResponseEnvelope::acknowledge(
            result,
            "Submission deleted",
            "Failed to delete submission",
        ))
    }
}
