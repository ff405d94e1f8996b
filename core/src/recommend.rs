use tracing::debug;

use crate::client::ApiClient;
use crate::errors::{ClientError, ClientResult};
use crate::schema;
use crate::session::Session;
use crate::types::{Endpoint, RecommendRequest};
use crate::view::AI_PLACEHOLDER;

/// Asks the assistant for a recommendation.
///
/// A missing or blank `recommendation` comes back as [`AI_PLACEHOLDER`].
pub async fn recommend(
    client: &ApiClient,
    session: &Session,
    query: &str,
    mood: &str,
) -> ClientResult<String> {
    let query = query.trim();
    if query.is_empty() {
        return Err(ClientError::validation("Type a question first"));
    }

    let request = RecommendRequest {
        mood: mood.to_string(),
        places_list: query.to_string(),
    };
    let body = client
        .call(session, Endpoint::Recommend, Some(&request))
        .await?;

    Ok(schema::parse_recommendation(&body).unwrap_or_else(|| {
        debug!("Recommendation missing or empty, using placeholder");
        AI_PLACEHOLDER.to_string()
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;
    use crate::credential::MemoryCredentialStore;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn setup(body: serde_json::Value) -> (MockServer, ApiClient, Session) {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/ai/recommend"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&server)
            .await;
        let client = ApiClient::new(&ClientConfig {
            api_base: Some(server.uri()),
            ..ClientConfig::default()
        })
        .unwrap();
        let session = Session::restore(Box::new(MemoryCredentialStore::with_token("tok")));
        (server, client, session)
    }

    #[tokio::test]
    async fn sends_mood_and_query() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/ai/recommend"))
            .and(body_json(json!({"mood": "neutral", "places_list": "quiet cafes"})))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"recommendation": "Try Koregaon Park"})),
            )
            .expect(1)
            .mount(&server)
            .await;
        let client = ApiClient::new(&ClientConfig {
            api_base: Some(server.uri()),
            ..ClientConfig::default()
        })
        .unwrap();
        let session = Session::restore(Box::new(MemoryCredentialStore::with_token("tok")));

        let text = recommend(&client, &session, "  quiet cafes ", "neutral")
            .await
            .unwrap();
        assert_eq!(text, "Try Koregaon Park");
    }

    #[tokio::test]
    async fn empty_recommendation_becomes_placeholder() {
        for body in [json!({"recommendation": ""}), json!({}), json!({"recommendation": null})] {
            let (_server, client, session) = setup(body).await;
            let text = recommend(&client, &session, "anything", "neutral")
                .await
                .unwrap();
            assert_eq!(text, AI_PLACEHOLDER);
        }
    }

    #[tokio::test]
    async fn blank_query_is_rejected_locally() {
        let (server, client, session) = setup(json!({"recommendation": "x"})).await;
        let err = recommend(&client, &session, "   ", "neutral")
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::ValidationError(_)));
        assert!(server.received_requests().await.unwrap().is_empty());
    }
}
