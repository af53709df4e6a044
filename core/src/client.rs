use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::NoorConfig;
use crate::errors::{NoorError, NoorResult};
use crate::types::*;

/// Client for interacting with the Gemini API
#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: Client,
    model: GeminiModel,
    base_url: String,
    temperature: f32,
}

impl GeminiClient {
    /// Create a new Gemini API client
    pub fn new(config: &NoorConfig) -> NoorResult<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                NoorError::ConfigError(
                    "API key is required to initialize the Gemini client (set GEMINI_API_KEY)"
                        .to_string(),
                )
            })?;

        let model = GeminiModel::new(api_key, config.model_name.clone());

        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| NoorError::ConfigError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            model,
            base_url: config.api_base_url().to_string(),
            temperature: config.temperature(),
        })
    }

    pub fn model_name(&self) -> &str {
        &self.model.model_name
    }

    fn generate_url(&self) -> String {
        format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, self.model.model_name, self.model.api_key
        )
    }

    /// Generate content using the Gemini API
    pub async fn generate_content(
        &self,
        request: &GenerateContentRequest,
    ) -> NoorResult<GenerateContentResponse> {
        let response = self
            .client
            .post(self.generate_url())
            .json(request)
            .send()
            .await
            .map_err(|e| transport_error("Failed to send request", e))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.map_err(|e| {
                NoorError::ResponseError(format!("Failed to read error response: {}", e.without_url()))
            })?;
            warn!(status = status.as_u16(), "Gemini returned an error status");

            return Err(NoorError::HttpError {
                status_code: status.as_u16(),
                message: format!("API request failed: {}", error_body),
            });
        }

        // The timeout also covers reading the body
        let body = response
            .bytes()
            .await
            .map_err(|e| transport_error("Failed to read response", e))?;

        serde_json::from_slice::<GenerateContentResponse>(&body)
            .map_err(|e| NoorError::ParsingError(format!("Failed to parse response: {}", e)))
    }

    /// Builds a single-prompt request whose answer must be JSON matching `schema`.
    pub fn create_prompt_request(&self, prompt: String, schema: Value) -> GenerateContentRequest {
        GenerateContentRequest {
            contents: vec![Content::user_text(prompt)],
            generation_config: Some(GenerationConfig {
                temperature: Some(self.temperature),
                response_mime_type: Some("application/json".to_string()),
                response_schema: Some(schema),
            }),
        }
    }

    /// Helper method to extract text from a response
    pub fn extract_text_from_response(response: &GenerateContentResponse) -> NoorResult<String> {
        let candidate = response.candidates.first().ok_or_else(|| {
            match response
                .prompt_feedback
                .as_ref()
                .and_then(|f| f.block_reason.as_deref())
            {
                Some(reason) => NoorError::ResponseError(format!("Prompt was blocked: {}", reason)),
                None => NoorError::ResponseError("No candidates in response".to_string()),
            }
        })?;

        let content = candidate.content.as_ref().ok_or_else(|| {
            NoorError::ResponseError(format!(
                "No content in candidate (finish reason: {})",
                candidate.finish_reason.as_deref().unwrap_or("unknown")
            ))
        })?;

        let text: String = content
            .parts
            .iter()
            .filter_map(|part| part.text.as_deref())
            .collect();

        if text.trim().is_empty() {
            return Err(NoorError::ResponseError("No text in response".to_string()));
        }

        Ok(text)
    }

    /// Sends `prompt` asking for JSON shaped by `schema` and decodes it into `T`.
    ///
    /// A reply that is not valid JSON, or lacks a field `T` requires, is an error.
    pub async fn generate_json<T: DeserializeOwned>(&self, prompt: String, schema: Value) -> NoorResult<T> {
        let request = self.create_prompt_request(prompt, schema);
        let response = self.generate_content(&request).await?;
        let text = Self::extract_text_from_response(&response)?;
        debug!(response_len = text.len(), "Received structured output");

        serde_json::from_str(&text)
            .map_err(|e| NoorError::ParsingError(format!("Malformed structured output: {}", e)))
    }
}

/// reqwest errors carry the URL, which carries the key
fn transport_error(context: &str, e: reqwest::Error) -> NoorError {
    let e = e.without_url();
    if e.is_timeout() {
        NoorError::RequestError(format!("Request timed out: {}", e))
    } else {
        NoorError::RequestError(format!("{}: {}", context, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde::Deserialize;
    use serde_json::json;
    use crate::errors::GuidanceError;
    use std::io::Write;
    use std::time::Duration;

    fn test_config(base_url: String) -> NoorConfig {
        NoorConfig {
            api_key: Some("test-key".to_string()),
            model_name: Some("test-model".to_string()),
            api_base_url: Some(base_url),
            ..Default::default()
        }
    }

    fn text_body(text: &str) -> String {
        json!({
            "candidates": [{
                "content": {"parts": [{"text": text}], "role": "model"},
                "finishReason": "STOP"
            }]
        })
        .to_string()
    }

    #[derive(Debug, Deserialize)]
    struct Answer {
        advice: String,
    }

    #[test]
    fn test_missing_api_key_is_config_error() {
        let config = NoorConfig::default();
        let err = GeminiClient::new(&config).unwrap_err();
        assert!(matches!(err, NoorError::ConfigError(_)));
    }

    #[tokio::test]
    async fn test_generate_json_sends_prompt_and_key() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", Matcher::Regex("^/models/test-model:generateContent".to_string()))
            .match_query(Matcher::UrlEncoded("key".into(), "test-key".into()))
            .match_body(Matcher::PartialJson(json!({
                "contents": [{"role": "user", "parts": [{"text": "Say salaam"}]}],
                "generationConfig": {"temperature": 0.7}
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(text_body(r#"{"advice": "Assalamu alaikum"}"#))
            .create_async()
            .await;

        let client = GeminiClient::new(&test_config(server.url())).unwrap();
        let answer: Answer = client
            .generate_json("Say salaam".to_string(), json!({"type": "object"}))
            .await
            .unwrap();

        assert_eq!(answer.advice, "Assalamu alaikum");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_generate_json_decodes_structured_output() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", Matcher::Regex("^/models/test-model:generateContent".to_string()))
            .match_query(Matcher::Any)
            .match_body(Matcher::PartialJson(json!({
                "generationConfig": {"responseMimeType": "application/json"}
            })))
            .with_status(200)
            .with_body(text_body(r#"{"advice": "Be patient."}"#))
            .create_async()
            .await;

        let client = GeminiClient::new(&test_config(server.url())).unwrap();
        let answer: Answer = client
            .generate_json("prompt".to_string(), json!({"type": "object"}))
            .await
            .unwrap();

        assert_eq!(answer.advice, "Be patient.");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_missing_field_is_parsing_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", Matcher::Any)
            .with_status(200)
            .with_body(text_body(r#"{"guidance": "wrong field"}"#))
            .create_async()
            .await;

        let client = GeminiClient::new(&test_config(server.url())).unwrap();
        let err = client
            .generate_json::<Answer>("prompt".to_string(), json!({"type": "object"}))
            .await
            .unwrap_err();

        assert!(matches!(err, NoorError::ParsingError(_)));
    }

    #[tokio::test]
    async fn test_error_status_is_http_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", Matcher::Any)
            .with_status(429)
            .with_body(r#"{"error": {"message": "quota"}}"#)
            .create_async()
            .await;

        let client = GeminiClient::new(&test_config(server.url())).unwrap();
        let err = client
            .generate_json::<Answer>("prompt".to_string(), json!({"type": "object"}))
            .await
            .unwrap_err();

        match err {
            NoorError::HttpError { status_code, message } => {
                assert_eq!(status_code, 429);
                assert!(message.contains("quota"));
            }
            other => panic!("expected http error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_stalled_upstream_times_out() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", Matcher::Any)
            .with_status(200)
            .with_chunked_body(|w| {
                std::thread::sleep(Duration::from_secs(3));
                w.write_all(text_body(r#"{"advice": "too late"}"#).as_bytes())
            })
            .create_async()
            .await;

        let config = NoorConfig {
            request_timeout_secs: Some(1),
            ..test_config(server.url())
        };
        let client = GeminiClient::new(&config).unwrap();
        let err = client
            .generate_json::<Answer>("prompt".to_string(), json!({"type": "object"}))
            .await
            .unwrap_err();

        match &err {
            NoorError::RequestError(message) => {
                assert!(message.contains("timed out"), "{}", message);
                assert!(!message.contains("test-key"));
            }
            other => panic!("expected request error, got {:?}", other),
        }
        assert!(matches!(GuidanceError::from(err), GuidanceError::Upstream(_)));
    }

    #[test]
    fn test_extract_text_joins_parts() {
        let response: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{"content": {"parts": [{"text": "Peace "}, {"text": "be upon you"}]}}]
        }))
        .unwrap();

        assert_eq!(
            GeminiClient::extract_text_from_response(&response).unwrap(),
            "Peace be upon you"
        );
    }

    #[test]
    fn test_extract_text_reports_block_reason() {
        let response: GenerateContentResponse =
            serde_json::from_value(json!({"promptFeedback": {"blockReason": "SAFETY"}})).unwrap();

        let err = GeminiClient::extract_text_from_response(&response).unwrap_err();
        assert!(err.to_string().contains("SAFETY"));
    }

    #[test]
    fn test_extract_text_rejects_candidate_without_content() {
        let response: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{"finishReason": "RECITATION"}]
        }))
        .unwrap();

        let err = GeminiClient::extract_text_from_response(&response).unwrap_err();
        assert!(err.to_string().contains("RECITATION"));
    }
}
