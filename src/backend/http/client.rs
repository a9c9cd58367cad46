use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use url::Url;

use super::models::*;
use crate::backend::traits::Backend;
use crate::backend::types::BackendError;
use crate::config::APP_NAME;
use crate::models::{
    Conversation, FeedbackRequest, ImageAttachment, Message, Profile, ProfileRequest,
};

pub struct HttpBackend {
    client: Client,
    base_url: Url,
}

impl HttpBackend {
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self, BackendError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(format!("{}/{}", APP_NAME, env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| BackendError::Network(e.to_string()))?;
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, BackendError> {
        self.base_url
            .join(path)
            .map_err(|e| BackendError::Network(format!("Invalid endpoint {}: {}", path, e)))
    }

    fn parse_error_message(body: &str) -> String {
        if let Ok(parsed) = serde_json::from_str::<ErrorResponse>(body) {
            return match parsed.detail {
                serde_json::Value::String(s) => s,
                other => other.to_string(),
            };
        }
        "Request failed".to_string()
    }

    /// Turn non-2xx responses into `BackendError::Server`.
    async fn check(response: Response) -> Result<Response, BackendError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(BackendError::Server {
            status: status.as_u16(),
            detail: Self::parse_error_message(&body),
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, BackendError> {
        let url = self.endpoint(path)?;
        tracing::debug!("GET {}", url);
        let response = self.client.get(url).send().await?;
        let response = Self::check(response).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| BackendError::InvalidResponse(e.to_string()))
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn get_profile(&self) -> Result<Profile, BackendError> {
        self.get_json("api/profile").await
    }

    async fn create_profile(&self, request: &ProfileRequest) -> Result<(), BackendError> {
        let url = self.endpoint("api/profile")?;
        tracing::debug!("POST {}", url);
        let response = self.client.post(url).json(request).send().await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn update_profile(&self, profile: &Profile) -> Result<Profile, BackendError> {
        let url = self.endpoint("api/profile")?;
        tracing::debug!("PUT {}", url);
        let response = self.client.put(url).json(profile).send().await?;
        let envelope: ProfileEnvelope = Self::check(response)
            .await?
            .json()
            .await
            .map_err(|e| BackendError::InvalidResponse(e.to_string()))?;
        Ok(envelope.profile)
    }

    async fn get_conversations(&self) -> Result<Vec<Conversation>, BackendError> {
        let records: Vec<ConversationRecord> = self.get_json("api/conversations").await?;
        Ok(records.into_iter().map(Conversation::from).collect())
    }

    async fn create_conversation(&self) -> Result<Conversation, BackendError> {
        let url = self.endpoint("api/conversations")?;
        tracing::debug!("POST {}", url);
        let response = self.client.post(url).send().await?;
        let record: ConversationRecord = Self::check(response)
            .await?
            .json()
            .await
            .map_err(|e| BackendError::InvalidResponse(e.to_string()))?;
        Ok(record.into())
    }

    async fn get_conversation_messages(
        &self,
        conversation_id: i64,
    ) -> Result<Vec<Message>, BackendError> {
        let records: Vec<MessageRecord> = self
            .get_json(&format!("api/conversations/{}/messages", conversation_id))
            .await?;
        records.into_iter().map(Message::try_from).collect()
    }

    async fn send_chat_message(
        &self,
        text: &str,
        image: Option<&ImageAttachment>,
        conversation_id: Option<i64>,
    ) -> Result<(), BackendError> {
        let url = self.endpoint("api/chat")?;

        let mut form = Form::new().text("user_message", text.to_string());
        if let Some(id) = conversation_id {
            form = form.text("conversation_id", id.to_string());
        }
        if let Some(image) = image {
            let part = Part::bytes(image.data.to_vec())
                .file_name(image.filename.clone())
                .mime_str(&image.mime_type)
                .map_err(|e| BackendError::Network(e.to_string()))?;
            form = form.part("fridge_image", part);
        }

        tracing::debug!(
            "POST {} (conversation: {:?}, image: {})",
            url,
            conversation_id,
            image.is_some()
        );
        let response = self.client.post(url).multipart(form).send().await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn submit_feedback(&self, feedback: &FeedbackRequest) -> Result<(), BackendError> {
        let url = self.endpoint("api/feedback")?;
        tracing::debug!("POST {}", url);
        let response = self.client.post(url).json(feedback).send().await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn reset_demo(&self) -> Result<(), BackendError> {
        let url = self.endpoint("api/reset")?;
        tracing::debug!("POST {}", url);
        let response = self.client.post(url).send().await?;
        Self::check(response).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend(base: &str) -> HttpBackend {
        HttpBackend::new(Url::parse(base).unwrap(), Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_endpoint_joins_relative_paths() {
        let b = backend("http://localhost:8000/");
        assert_eq!(
            b.endpoint("api/conversations/3/messages").unwrap().as_str(),
            "http://localhost:8000/api/conversations/3/messages"
        );

        let prefixed = backend("https://example.com/chefing/");
        assert_eq!(
            prefixed.endpoint("api/profile").unwrap().as_str(),
            "https://example.com/chefing/api/profile"
        );
    }

    #[test]
    fn test_parse_error_message() {
        assert_eq!(
            HttpBackend::parse_error_message(r#"{"detail":"Conversation not found"}"#),
            "Conversation not found"
        );
        assert_eq!(HttpBackend::parse_error_message("<html>"), "Request failed");
    }
}
