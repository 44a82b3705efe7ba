use crate::models::{
    envelope::ResponseEnvelope, error::AppError, file::FileUpload, resource::Resource,
};
use crate::services::http::{HttpClient, Request};
use crate::services::transport::MultipartForm;
use crate::utils::validation::{validate_file, validate_object_id};
use serde::Serialize;
use std::sync::Arc;

const RESOURCES_KEYS: &[&str] = &["resources", "data"];
const RESOURCE_KEYS: &[&str] = &["resource", "data"];

#[derive(Debug, Clone)]
pub struct ResourceService {
    http: Arc<HttpClient>,
}

impl ResourceService {
    pub fn new(http: Arc<HttpClient>) -> Self {
        Self { http }
    }

    pub async fn list_resources(
        &self,
        query: &[(String, String)],
    ) -> Result<ResponseEnvelope<Vec<Resource>>, AppError> {
        let result = self.http.get("/resources", query).await;
        Ok(ResponseEnvelope::from_listing(
            result,
            RESOURCES_KEYS,
            "Failed to load resources",
        ))
    }

    pub async fn get_resource(&self, id: &str) -> Result<ResponseEnvelope<Resource>, AppError> {
        validate_object_id(id, "resource")?;
        let result = self.http.get(&format!("/resources/{id}"), &[]).await;
        Ok(ResponseEnvelope::from_result(
            result,
            RESOURCE_KEYS,
            "Failed to load resource",
        ))
    }

    /// Uploads `file` with the text `fields` describing it.
    pub async fn upload_resource<B: Serialize + ?Sized>(
        &self,
        fields: &B,
        file: FileUpload,
    ) -> Result<ResponseEnvelope<Resource>, AppError> {
        validate_file(&file)?;
        let form = MultipartForm::from_fields(fields)
            .map_err(|e| AppError::ValidationError(e.to_string()))?
            .file("file", file);

        let result = self
            .http
            .send(Request::post("/resources").multipart(form))
            .await;
        Ok(ResponseEnvelope::from_result(
            result,
            RESOURCE_KEYS,
            "Failed to upload resource",
        ))
    }

    pub async fn update_resource<B: Serialize + ?Sized>(
        &self,
        id: &str,
        changes: &B,
    ) -> Result<ResponseEnvelope<Resource>, AppError> {
        validate_object_id(id, "resource")?;
        let result = self.http.put(&format!("/resources/{id}"), changes).await;
        Ok(ResponseEnvelope::from_result(
            result,
            RESOURCE_KEYS,
            "Failed to update resource",
        ))
    }

    pub async fn delete_resource(&self, id: &str) -> Result<ResponseEnvelope<()>, AppError> {
        validate_object_id(id, "resource")?;
        let result = self.http.delete(&format!("/resources/{id}")).await;
        Ok(ResponseEnvelope::acknowledge(
            result,
            "Resource deleted",
            "Failed to delete resource",
        ))
    }

    pub async fn download_resource(&self, id: &str) -> Result<ResponseEnvelope<Vec<u8>>, AppError> {
        validate_object_id(id, "resource")?;
        let request = Request::get(&format!("/resources/{id}/download"));
        match self.http.send_bytes(request).await {
            Ok(bytes) => Ok(ResponseEnvelope::ok(bytes)),
            Err(e) => Ok(ResponseEnvelope::failure(
                e.user_message("Failed to download resource"),
            )),
        }
    }
}
