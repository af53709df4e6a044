//! Prompt templates for the NoorAI flows.
//!
//! Templates are plain minijinja sources. The bundled ones are compiled into the
//! binary and any of them can be replaced from configuration. Every piece of user
//! text must go through the `quote` filter, which prefixes each line with `> ` so
//! that user content can never line up with the template's own markers.

use minijinja::{Environment, UndefinedBehavior};
use serde::Serialize;
use std::fs;
use tracing::info;

use crate::config::TemplatePaths;
use crate::errors::{NoorError, NoorResult};

const GUIDANCE_TEMPLATE: &str = include_str!("../templates/guidance.j2");
const HADITH_INSIGHTS_TEMPLATE: &str = include_str!("../templates/hadith_insights.j2");
const PERSONAL_ADVICE_TEMPLATE: &str = include_str!("../templates/personal_advice.j2");

/// The prompts NoorAI knows how to render
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    Guidance,
    HadithInsights,
    PersonalAdvice,
}

impl PromptKind {
    pub const ALL: [PromptKind; 3] = [
        PromptKind::Guidance,
        PromptKind::HadithInsights,
        PromptKind::PersonalAdvice,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            PromptKind::Guidance => "guidance",
            PromptKind::HadithInsights => "hadith_insights",
            PromptKind::PersonalAdvice => "personal_advice",
        }
    }

    fn bundled_source(&self) -> &'static str {
        match self {
            PromptKind::Guidance => GUIDANCE_TEMPLATE,
            PromptKind::HadithInsights => HADITH_INSIGHTS_TEMPLATE,
            PromptKind::PersonalAdvice => PERSONAL_ADVICE_TEMPLATE,
        }
    }
}

/// Prefixes every line of `value` with `> `.
pub fn quote(value: String) -> String {
    if value.is_empty() {
        return "> ".to_string();
    }
    value
        .lines()
        .map(|line| format!("> {}", line))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Compiled set of prompt templates
#[derive(Debug)]
pub struct PromptTemplates {
    env: Environment<'static>,
}

impl PromptTemplates {
    /// Templates shipped with the crate.
    pub fn bundled() -> NoorResult<Self> {
        Self::with_overrides(&TemplatePaths::default())
    }

    /// Bundled templates, with any configured file replacing its counterpart.
    pub fn with_overrides(paths: &TemplatePaths) -> NoorResult<Self> {
        let mut env = Environment::new();
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        env.set_trim_blocks(true);
        env.set_lstrip_blocks(true);
        env.add_filter("quote", quote);

        for kind in PromptKind::ALL {
            let override_path = match kind {
                PromptKind::Guidance => paths.guidance.as_ref(),
                PromptKind::HadithInsights => paths.hadith_insights.as_ref(),
                PromptKind::PersonalAdvice => paths.personal_advice.as_ref(),
            };

            let source = match override_path {
                Some(path) => {
                    info!(template = kind.name(), path = %path.display(), "Loading prompt template override");
                    fs::read_to_string(path).map_err(|e| {
                        NoorError::ConfigError(format!(
                            "Failed to read template {}: {}",
                            path.display(),
                            e
                        ))
                    })?
                }
                None => kind.bundled_source().to_string(),
            };

            env.add_template_owned(kind.name(), source)?;
        }

        Ok(Self { env })
    }

    /// Renders `kind` with the serialized fields of `ctx` as template variables.
    pub fn render<S: Serialize>(&self, kind: PromptKind, ctx: &S) -> NoorResult<String> {
        let template = self.env.get_template(kind.name())?;
        Ok(template.render(ctx)?)
    }
}
