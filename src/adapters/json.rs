use async_trait::async_trait;
use serde_json::Value;
use tracing::info;

#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn get_json(&self, url: &str) -> anyhow::Result<Value>;
}

pub struct ReqwestClient {
    client: reqwest::Client,
}

impl ReqwestClient {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for ReqwestClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpClient for ReqwestClient {
    async fn get_json(&self, url: &str) -> anyhow::Result<Value> {
        let response = self.client.get(url).send().await?.error_for_status()?;
        Ok(response.json().await?)
    }
}

/// Issues a single GET to `url` and returns the decoded payload.
pub async fn get_json<H: HttpClient + ?Sized>(client: &H, url: &str) -> anyhow::Result<Value> {
    info!(url, "Fetching JSON");
    client.get_json(url).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::mock;
    use mockall::predicate::eq;
    use rstest::rstest;
    use serde_json::json;

    mock! {
        pub Client {}

        #[async_trait]
        impl HttpClient for Client {
            async fn get_json(&self, url: &str) -> anyhow::Result<Value>;
        }
    }

    #[rstest]
    #[case("http://example.com", json!({"payload": true}))]
    #[case("http://holberton.io", json!({"payload": false}))]
    #[tokio::test]
    async fn returns_the_client_payload(#[case] url: &'static str, #[case] payload: Value) {
        let mut client = MockClient::new();
        let expected = payload.clone();
        client
            .expect_get_json()
            .with(eq(url))
            .times(1)
            .returning(move |_| Ok(payload.clone()));

        let result = get_json(&client, url).await.unwrap();
        assert_eq!(result, expected);
    }

    #[tokio::test]
    async fn propagates_client_errors() {
        let mut client = MockClient::new();
        client
            .expect_get_json()
            .times(1)
            .returning(|_| Err(anyhow::anyhow!("connection refused")));

        assert!(get_json(&client, "http://example.com").await.is_err());
    }
}
