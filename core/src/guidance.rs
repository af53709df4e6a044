//! The NoorAI flows: multi-turn guidance, Hadith insights and personalized advice.
//!
//! Each flow renders one prompt, makes exactly one call to Gemini and decodes the
//! structured answer. There is no retry. Any failure after validation is reported
//! as [`GuidanceError::Upstream`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{error, info};

use crate::client::GeminiClient;
use crate::config::NoorConfig;
use crate::errors::{GuidanceError, GuidanceResult, NoorResult};
use crate::prompt::{PromptKind, PromptTemplates};
use crate::request::{validate_input, GuidanceRequest};

/// Answer to a guidance request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuidanceResponse {
    pub advice: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HadithInsightsInput {
    pub hadith_text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HadithInsightsOutput {
    pub insights: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalAdviceInput {
    pub situation: String,
    pub personal_values: String,
    pub cultural_context: String,
    pub age: u32,
    pub gender: String,
}

impl PersonalAdviceInput {
    pub fn validate(&self) -> GuidanceResult<()> {
        validate_input("situation", &self.situation)?;
        if !(1..=120).contains(&self.age) {
            return Err(GuidanceError::Validation(format!(
                "age must be between 1 and 120, got {}",
                self.age
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalAdviceOutput {
    pub advice: String,
    pub relevant_quranic_verses: String,
    pub relevant_hadith: String,
    pub explanation: String,
}

/// Gemini response schema: an object whose listed string fields are all required.
fn string_object_schema(fields: &[&str]) -> Value {
    let properties: serde_json::Map<String, Value> = fields
        .iter()
        .map(|field| (field.to_string(), json!({"type": "STRING"})))
        .collect();

    json!({
        "type": "OBJECT",
        "properties": properties,
        "required": fields,
    })
}

/// Produces one answer for one assembled request.
#[async_trait]
pub trait GuidanceClient: Send + Sync {
    async fn generate(&self, request: &GuidanceRequest) -> GuidanceResult<GuidanceResponse>;
}

#[async_trait]
impl<T: GuidanceClient + ?Sized> GuidanceClient for Arc<T> {
    async fn generate(&self, request: &GuidanceRequest) -> GuidanceResult<GuidanceResponse> {
        (**self).generate(request).await
    }
}

/// Gemini-backed implementation of every NoorAI flow
#[derive(Debug)]
pub struct NoorAi {
    gemini: GeminiClient,
    templates: PromptTemplates,
}

impl NoorAi {
    pub fn new(gemini: GeminiClient, templates: PromptTemplates) -> Self {
        Self { gemini, templates }
    }

    /// Builds the client and templates described by `config`.
    pub fn from_config(config: &NoorConfig) -> NoorResult<Self> {
        let gemini = GeminiClient::new(config)?;
        let templates = PromptTemplates::with_overrides(&config.templates)?;
        info!(model = gemini.model_name(), "NoorAI initialized");
        Ok(Self::new(gemini, templates))
    }

    async fn run<I, O>(&self, flow: &'static str, kind: PromptKind, input: &I, fields: &[&str]) -> GuidanceResult<O>
    where
        I: Serialize + Sync,
        O: serde::de::DeserializeOwned,
    {
        let prompt = self.templates.render(kind, input)?;
        info!(flow, prompt_len = prompt.len(), "Calling Gemini");

        self.gemini
            .generate_json(prompt, string_object_schema(fields))
            .await
            .map_err(|e| {
                error!(flow, error = %e, "Gemini call failed");
                GuidanceError::from(e)
            })
    }

    /// Explains a Hadith.
    pub async fn extract_hadith_insights(&self, input: &HadithInsightsInput) -> GuidanceResult<HadithInsightsOutput> {
        validate_input("hadithText", &input.hadith_text)?;
        self.run("hadith_insights", PromptKind::HadithInsights, input, &["insights"])
            .await
    }

    /// Advice tailored to the user's situation and background.
    pub async fn personalize_advice(&self, input: &PersonalAdviceInput) -> GuidanceResult<PersonalAdviceOutput> {
        input.validate()?;
        self.run(
            "personal_advice",
            PromptKind::PersonalAdvice,
            input,
            &["advice", "relevantQuranicVerses", "relevantHadith", "explanation"],
        )
        .await
    }
}

#[async_trait]
impl GuidanceClient for NoorAi {
    async fn generate(&self, request: &GuidanceRequest) -> GuidanceResult<GuidanceResponse> {
        self.run("guidance", PromptKind::Guidance, request, &["advice"]).await
    }
}
