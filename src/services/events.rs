use crate::config::Config;
use crate::models::{
    envelope::ResponseEnvelope,
    error::AppError,
    event::{Event, EventFilters},
};
use crate::services::http::{HttpClient, Request};
use crate::utils::validation::validate_object_id;
use serde::Serialize;
use std::sync::Arc;

const EVENTS_KEYS: &[&str] = &["events", "data"];
const EVENT_KEYS: &[&str] = &["event", "data"];

#[derive(Debug, Clone)]
pub struct EventService {
    http: Arc<HttpClient>,
}

impl EventService {
    pub fn new(http: Arc<HttpClient>) -> Self {
        Self { http }
    }

    pub async fn list_events(
        &self,
        filters: &EventFilters,
    ) -> Result<ResponseEnvelope<Vec<Event>>, AppError> {
        let query = filters.to_query(Config::DEFAULT_PAGE_SIZE);
        let result = self.http.get("/events", &query).await;
        Ok(ResponseEnvelope::from_listing(result, EVENTS_KEYS, "Failed to load events"))
    }

    pub async fn get_event(&self, id: &str) -> Result<ResponseEnvelope<Event>, AppError> {
        validate_object_id(id, "event")?;
        let result = self.http.get(&format!("/events/{id}"), &[]).await;
        Ok(ResponseEnvelope::from_result(result, EVENT_KEYS, "Failed to load event"))
    }

    pub async fn create_event<B: Serialize + ?Sized>(
        &self,
        event: &B,
    ) -> Result<ResponseEnvelope<Event>, AppError> {
        let result = self.http.post("/events", event).await;
        Ok(ResponseEnvelope::from_result(result, EVENT_KEYS, "Failed to create event"))
    }

    pub async fn update_event<B: Serialize + ?Sized>(
        &self,
        id: &str,
        event: &B,
    ) -> Result<ResponseEnvelope<Event>, AppError> {
        validate_object_id(id, "event")?;
        let result = self.http.put(&format!("/events/{id}"), event).await;
        Ok(ResponseEnvelope::from_result(result, EVENT_KEYS, "Failed to update event"))
    }

    pub async fn delete_event(&self, id: &str) -> Result<ResponseEnvelope<()>, AppError> {
        validate_object_id(id, "event")?;
        let result = self.http.delete(&format!("/events/{id}")).await;
        Ok(ResponseEnvelope::acknowledge(
            result,
            "Event deleted",
            "Failed to delete event",
        ))
    }

    pub async fn register_for_event(&self, id: &str) -> Result<ResponseEnvelope<()>, AppError> {
        validate_object_id(id, "event")?;
        let result = self
            .http
            .send(Request::post(&format!("/events/{id}/register")))
            .await;
        Ok(ResponseEnvelope::acknowledge(
            result,
            "Registered successfully",
            "Failed to register for event",
        ))
    }

    pub async fn unregister_from_event(&self, id: &str) -> Result<ResponseEnvelope<()>, AppError> {
        validate_object_id(id, "event")?;
        let result = self.http.delete(&format!("/events/{id}/register")).await;
        Ok(ResponseEnvelope::acknowledge(
            result,
            "Registration cancelled",
            "Failed to cancel registration",
        ))
    }

    /// Events the signed-in user is registered for.
    pub async fn my_events(&self) -> Result<ResponseEnvelope<Vec<Event>>, AppError> {
        let result = self.http.get("/events/my", &[]).await;
        Ok(ResponseEnvelope::from_listing(result, EVENTS_KEYS, "Failed to load my events"))
    }
}
