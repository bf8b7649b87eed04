use reqwest::{Client, Response};
use uuid::Uuid;

use guestbook_types::{Entry, EntryRequest};

use crate::config::ClientConfig;
use crate::error::ApiError;

/// Thin wrapper over the four entry endpoints. Any non-2xx status is an
/// error; the status code itself is never interpreted further.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            http: Client::new(),
            base_url: config.base_url,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn entry_url(&self, id: Uuid) -> String {
        format!("{}/{}", self.base_url, id)
    }

    pub async fn list(&self) -> Result<Vec<Entry>, ApiError> {
        let res = self.http.get(&self.base_url).send().await?;
        Ok(check(res)?.json().await?)
    }

    pub async fn create(&self, req: &EntryRequest) -> Result<Entry, ApiError> {
        let res = self.http.post(&self.base_url).json(req).send().await?;
        Ok(check(res)?.json().await?)
    }

    pub async fn update(&self, id: Uuid, req: &EntryRequest) -> Result<Entry, ApiError> {
        let res = self.http.put(self.entry_url(id)).json(req).send().await?;
        Ok(check(res)?.json().await?)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), ApiError> {
        let res = self.http.delete(self.entry_url(id)).send().await?;
        check(res)?;
        Ok(())
    }
}

fn check(res: Response) -> Result<Response, ApiError> {
    if res.status().is_success() {
        Ok(res)
    } else {
        Err(ApiError::Status(res.status()))
    }
}

#[cfg(test)]
mod tests {
    use mockito::Matcher;
    use serde_json::json;

    use super::*;

    fn client(server: &mockito::ServerGuard) -> ApiClient {
        ApiClient::new(ClientConfig::new("/api/guestbook", &server.url()).unwrap())
    }

    #[tokio::test]
    async fn create_sends_json_body() {
        let mut server = mockito::Server::new_async().await;
        let id = Uuid::new_v4();
        let mock = server
            .mock("POST", "/api/guestbook")
            .match_header("content-type", "application/json")
            .match_body(Matcher::Json(json!({ "name": "Alice", "message": "Hi" })))
            .with_status(201)
            .with_body(
                json!({
                    "id": id,
                    "name": "Alice",
                    "message": "Hi",
                    "created_at": "2026-10-19T12:00:00.000Z"
                })
                .to_string(),
            )
            .create_async()
            .await;

        let entry = client(&server).create(&EntryRequest::new("Alice", "Hi")).await.unwrap();
        mock.assert_async().await;
        assert_eq!(entry.id, id);
        assert_eq!(entry.name, "Alice");
    }

    #[tokio::test]
    async fn not_found_is_an_error() {
        let mut server = mockito::Server::new_async().await;
        let id = Uuid::new_v4();
        let path = format!("/api/guestbook/{}", id);
        let _delete = server.mock("DELETE", path.as_str()).with_status(404).create_async().await;

        let err = client(&server).delete(id).await.unwrap_err();
        assert!(matches!(err, ApiError::Status(s) if s == reqwest::StatusCode::NOT_FOUND));
    }

    #[tokio::test]
    async fn garbage_body_is_an_error() {
        let mut server = mockito::Server::new_async().await;
        let _list = server
            .mock("GET", "/api/guestbook")
            .with_status(200)
            .with_body("<html>oops</html>")
            .create_async()
            .await;

        assert!(matches!(client(&server).list().await, Err(ApiError::Http(_))));
    }
}
