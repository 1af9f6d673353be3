//! HTTP client for the Classroom backend.
//!
//! One typed method per REST endpoint. All authenticated calls send the
//! credential as `Authorization: Bearer <token>`; the backend's historical
//! custom-header convention is not reproduced here.

pub mod error;
pub mod types;

pub use error::ApiError;
pub use types::Ack;

use crate::config::AppConfig;
use rand::Rng;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, info, warn};
use types::*;
use url::Url;

/// Client for the Classroom REST API.
pub struct ApiClient {
    http: Client,
    base: Url,
}

impl ApiClient {
    /// Creates a client from the application configuration.
    pub fn new(config: &AppConfig) -> Result<Self, ApiError> {
        let http = Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| ApiError::Network {
                message: format!("Failed to build HTTP client: {e}"),
            })?;

        Ok(Self {
            http,
            base: config.base_url.clone(),
        })
    }

    fn url(&self, path: &str) -> Result<Url, ApiError> {
        Ok(self.base.join(path)?)
    }

    /// Sends a request and decodes a JSON body, mapping non-2xx statuses to
    /// the error taxonomy with the backend's `message` when one is present.
    async fn send<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
        method: &'static str,
        path: &str,
    ) -> Result<T, ApiError> {
        let correlation_id = generate_correlation_id();
        let start = Instant::now();
        debug!(
            correlation_id = %correlation_id,
            method,
            path,
            "Issuing API request"
        );

        let response = builder.send().await?;
        let status = response.status();

        if status.is_success() {
            let value = response.json::<T>().await?;
            info!(
                correlation_id = %correlation_id,
                method,
                path,
                status = status.as_u16(),
                duration_ms = start.elapsed().as_millis() as u64,
                "API request succeeded"
            );
            Ok(value)
        } else {
            let body = response.text().await.unwrap_or_default();
            let err = error_from_status(status.as_u16(), &body);
            warn!(
                correlation_id = %correlation_id,
                method,
                path,
                status = status.as_u16(),
                duration_ms = start.elapsed().as_millis() as u64,
                error = %err,
                "API request failed"
            );
            Err(err)
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, token: &str, path: &str) -> Result<T, ApiError> {
        let url = self.url(path)?;
        self.send(self.http.get(url).bearer_auth(token), "GET", path)
            .await
    }

    async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        token: Option<&str>,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let url = self.url(path)?;
        let mut builder = self.http.post(url).json(body);
        if let Some(token) = token {
            builder = builder.bearer_auth(token);
        }
        self.send(builder, "POST", path).await
    }

    async fn put_json<B: Serialize, T: DeserializeOwned>(
        &self,
        token: &str,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let url = self.url(path)?;
        self.send(self.http.put(url).json(body).bearer_auth(token), "PUT", path)
            .await
    }

    async fn delete_json<T: DeserializeOwned>(&self, token: &str, path: &str) -> Result<T, ApiError> {
        let url = self.url(path)?;
        self.send(self.http.delete(url).bearer_auth(token), "DELETE", path)
            .await
    }

    // -- auth ---------------------------------------------------------------

    pub async fn login(&self, payload: &LoginPayload) -> Result<LoginResponse, ApiError> {
        self.post_json(None, "auth/login", payload).await
    }

    pub async fn register(&self, payload: &RegisterPayload) -> Result<Ack, ApiError> {
        self.post_json(None, "auth/register", payload).await
    }

    // -- classes ------------------------------------------------------------

    /// Classes the current user belongs to (member view).
    pub async fn my_classes(&self, token: &str) -> Result<Vec<ClassRoom>, ApiError> {
        self.get_json(token, "classes/me").await
    }

    /// Classes owned by the current professor.
    pub async fn professor_classes(&self, token: &str) -> Result<Vec<ClassRoom>, ApiError> {
        self.get_json(token, "classes/professeur").await
    }

    pub async fn create_class(
        &self,
        token: &str,
        payload: &CreateClassPayload,
    ) -> Result<CreatedClass, ApiError> {
        self.post_json(Some(token), "classes", payload).await
    }

    pub async fn join_class(&self, token: &str, payload: &JoinClassPayload) -> Result<Ack, ApiError> {
        self.post_json(Some(token), "classes/join", payload).await
    }

    pub async fn class_students(&self, token: &str, class_id: i64) -> Result<Vec<User>, ApiError> {
        self.get_json(token, &format!("classes/{class_id}/students"))
            .await
    }

    // -- announcements ------------------------------------------------------

    pub async fn announcements(
        &self,
        token: &str,
        class_id: i64,
    ) -> Result<Vec<Announcement>, ApiError> {
        self.get_json(token, &format!("announcements/{class_id}")).await
    }

    pub async fn create_announcement(
        &self,
        token: &str,
        payload: &CreateAnnouncementPayload,
    ) -> Result<Ack, ApiError> {
        self.post_json(Some(token), "announcements", payload).await
    }

    // -- tasks & submissions ------------------------------------------------

    pub async fn class_tasks(&self, token: &str, class_id: i64) -> Result<Vec<Task>, ApiError> {
        self.get_json(token, &format!("tasks/class/{class_id}")).await
    }

    pub async fn create_task(&self, token: &str, payload: &CreateTaskPayload) -> Result<Ack, ApiError> {
        self.post_json(Some(token), "tasks", payload).await
    }

    pub async fn task_submissions(
        &self,
        token: &str,
        task_id: i64,
    ) -> Result<Vec<Submission>, ApiError> {
        self.get_json(token, &format!("tasks/{task_id}/submissions"))
            .await
    }

    pub async fn submit_task(
        &self,
        token: &str,
        task_id: i64,
        payload: &SubmitTaskPayload,
    ) -> Result<Ack, ApiError> {
        self.post_json(Some(token), &format!("tasks/{task_id}/submit"), payload)
            .await
    }

    pub async fn submission(&self, token: &str, submission_id: i64) -> Result<Submission, ApiError> {
        self.get_json(token, &format!("submissions/{submission_id}"))
            .await
    }

    pub async fn grade_submission(
        &self,
        token: &str,
        submission_id: i64,
        payload: &GradePayload,
    ) -> Result<Ack, ApiError> {
        self.put_json(token, &format!("submissions/{submission_id}/grade"), payload)
            .await
    }

    pub async fn my_submissions(&self, token: &str) -> Result<Vec<Submission>, ApiError> {
        self.get_json(token, "users/me/submissions").await
    }

    // -- users --------------------------------------------------------------

    pub async fn all_users(&self, token: &str) -> Result<Vec<User>, ApiError> {
        self.get_json(token, "users/all").await
    }

    pub async fn change_role(
        &self,
        token: &str,
        user_id: i64,
        payload: &ChangeRolePayload,
    ) -> Result<Ack, ApiError> {
        self.put_json(token, &format!("users/{user_id}/role"), payload)
            .await
    }

    pub async fn delete_user(&self, token: &str, user_id: i64) -> Result<Ack, ApiError> {
        self.delete_json(token, &format!("users/{user_id}")).await
    }

    // -- documentation ------------------------------------------------------

    pub async fn documentations(
        &self,
        token: &str,
        class_id: i64,
    ) -> Result<Vec<Documentation>, ApiError> {
        self.get_json(token, &format!("documentations/{class_id}"))
            .await
    }

    pub async fn create_documentation(
        &self,
        token: &str,
        payload: &CreateDocumentationPayload,
    ) -> Result<Ack, ApiError> {
        self.post_json(Some(token), "documentations", payload).await
    }

    // -- messages -----------------------------------------------------------

    pub async fn private_messages(&self, token: &str) -> Result<Vec<Message>, ApiError> {
        self.get_json(token, "messages/private/me").await
    }

    pub async fn public_messages(
        &self,
        token: &str,
        class_id: i64,
    ) -> Result<Vec<Message>, ApiError> {
        self.get_json(token, &format!("messages/public/class/{class_id}"))
            .await
    }

    pub async fn send_message(
        &self,
        token: &str,
        payload: &SendMessagePayload,
    ) -> Result<Ack, ApiError> {
        self.post_json(Some(token), "messages", payload).await
    }

    // -- projects & groups --------------------------------------------------

    pub async fn class_projects(&self, token: &str, class_id: i64) -> Result<Vec<Project>, ApiError> {
        self.get_json(token, &format!("projects/class/{class_id}"))
            .await
    }

    pub async fn create_project(
        &self,
        token: &str,
        payload: &CreateProjectPayload,
    ) -> Result<Ack, ApiError> {
        self.post_json(Some(token), "projects", payload).await
    }

    pub async fn project_groups(&self, token: &str, project_id: i64) -> Result<Vec<Group>, ApiError> {
        self.get_json(token, &format!("groups/project/{project_id}"))
            .await
    }

    pub async fn create_group(
        &self,
        token: &str,
        payload: &CreateGroupPayload,
    ) -> Result<Ack, ApiError> {
        self.post_json(Some(token), "groups", payload).await
    }

    pub async fn add_group_member(
        &self,
        token: &str,
        group_id: i64,
        payload: &AddMemberPayload,
    ) -> Result<Ack, ApiError> {
        self.post_json(Some(token), &format!("groups/{group_id}/members"), payload)
            .await
    }

    pub async fn remove_group_member(
        &self,
        token: &str,
        group_id: i64,
        user_id: i64,
    ) -> Result<Ack, ApiError> {
        self.delete_json(token, &format!("groups/{group_id}/members/{user_id}"))
            .await
    }
}

/// Maps a non-2xx status and raw body to an `ApiError`, extracting the
/// backend's `{message}` field when the body carries one.
fn error_from_status(status: u16, body: &str) -> ApiError {
    #[derive(Deserialize)]
    struct ErrorBody {
        #[serde(default)]
        message: Option<String>,
    }

    let message = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.message)
        .unwrap_or_default();

    match status {
        401 => ApiError::SessionExpired,
        403 => ApiError::Forbidden { message },
        _ => ApiError::Backend { status, message },
    }
}

/// Generates a unique correlation ID for request tracing.
fn generate_correlation_id() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_micros();
    let random: u32 = rand::thread_rng().gen();
    format!("{:x}-{:08x}", timestamp & 0xFFFFFFFF, random)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_message_extracted_from_body() {
        let err = error_from_status(400, r#"{"message": "Code de classe invalide."}"#);
        match err {
            ApiError::Backend { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "Code de classe invalide.");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_unauthorized_maps_to_session_expired() {
        assert!(matches!(
            error_from_status(401, ""),
            ApiError::SessionExpired
        ));
    }

    #[test]
    fn test_forbidden_keeps_backend_text() {
        match error_from_status(403, r#"{"message": "Réservé aux professeurs."}"#) {
            ApiError::Forbidden { message } => assert_eq!(message, "Réservé aux professeurs."),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_non_json_body_yields_empty_message() {
        match error_from_status(500, "<html>Internal Server Error</html>") {
            ApiError::Backend { message, .. } => assert!(message.is_empty()),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_correlation_id_format() {
        let id = generate_correlation_id();
        assert!(id.contains('-'));
        assert!(id.len() > 9);
    }

    #[test]
    fn test_client_builds_with_defaults() {
        let config = AppConfig::default();
        let client = ApiClient::new(&config).unwrap();
        let url = client.url("tasks/class/3").unwrap();
        assert_eq!(url.as_str(), "http://localhost:5000/api/tasks/class/3");
    }

    #[test]
    fn test_requests_carry_bearer_credential() {
        let config = AppConfig::default();
        let client = ApiClient::new(&config).unwrap();
        let url = client.url("classes/me").unwrap();
        let request = client
            .http
            .get(url)
            .bearer_auth("jeton-secret")
            .build()
            .unwrap();
        let auth = request
            .headers()
            .get(reqwest::header::AUTHORIZATION)
            .unwrap();
        assert_eq!(auth.to_str().unwrap(), "Bearer jeton-secret");
    }
}
