//! Prompt construction for summaries and translations.
//!
//! Pure functions over the [`Prompts`] templates: no I/O, no provider calls.

use crate::config::Prompts;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Requested summary length and structure.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SummaryType {
    /// Exactly 4-5 lines, no markdown, executive tone.
    Short,
    /// 3-4 paragraphs, 150-250 words, three-part structure.
    #[default]
    Medium,
    /// Full coverage of every major point.
    Detailed,
}

impl SummaryType {
    /// Parse a summary type, falling back to `Medium` for unknown values.
    pub fn parse_lenient(value: &str) -> Self {
        value.parse().unwrap_or_default()
    }
}

impl std::str::FromStr for SummaryType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "short" => Ok(SummaryType::Short),
            "medium" => Ok(SummaryType::Medium),
            "detailed" => Ok(SummaryType::Detailed),
            _ => Err(format!("Unknown summary type: {}", s)),
        }
    }
}

impl std::fmt::Display for SummaryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SummaryType::Short => write!(f, "short"),
            SummaryType::Medium => write!(f, "medium"),
            SummaryType::Detailed => write!(f, "detailed"),
        }
    }
}

/// Builds instruction strings from the configured templates.
#[derive(Debug, Clone, Default)]
pub struct PromptBuilder {
    prompts: Prompts,
}

impl PromptBuilder {
    pub fn new(prompts: Prompts) -> Self {
        Self { prompts }
    }

    /// Language clause for a summary, e.g. "Summarize in Spanish.".
    pub fn language_instruction(&self, language: &str) -> &str {
        let summary = &self.prompts.summary;
        summary
            .language_instructions
            .get(language)
            .unwrap_or(&summary.default_language_instruction)
    }

    /// Human-readable name of a translation target language.
    pub fn language_name(&self, code: &str) -> &str {
        let translation = &self.prompts.translation;
        translation
            .language_names
            .get(code)
            .unwrap_or(&translation.default_language)
    }

    /// Build the summary prompt; the transcript is embedded verbatim.
    pub fn build_summary_prompt(
        &self,
        summary_type: SummaryType,
        transcript: &str,
        language: &str,
    ) -> String {
        let template = match summary_type {
            SummaryType::Short => &self.prompts.summary.short,
            SummaryType::Medium => &self.prompts.summary.medium,
            SummaryType::Detailed => &self.prompts.summary.detailed,
        };

        let mut vars = HashMap::new();
        vars.insert(
            "language_instruction".to_string(),
            self.language_instruction(language).to_string(),
        );

        self.render_with_payloads(template, &vars, &[("transcript", transcript)])
    }

    /// Build the translation prompt, asking for continuity when a previous
    /// translation is supplied.
    pub fn build_translation_prompt(
        &self,
        text: &str,
        target_language: &str,
        previous_translation: Option<&str>,
    ) -> String {
        let mut vars = HashMap::new();
        vars.insert(
            "language".to_string(),
            self.language_name(target_language).to_string(),
        );

        match previous_translation.filter(|p| !p.is_empty()) {
            Some(previous) => self.render_with_payloads(
                &self.prompts.translation.continuation,
                &vars,
                &[("text", text), ("previous_translation", previous)],
            ),
            None => self.render_with_payloads(&self.prompts.translation.direct, &vars, &[("text", text)]),
        }
    }

    /// Render `vars` first, then substitute the user payloads in one pass so
    /// payload text that looks like a placeholder is left untouched.
    fn render_with_payloads(
        &self,
        template: &str,
        vars: &HashMap<String, String>,
        payloads: &[(&str, &str)],
    ) -> String {
        let rendered = self.prompts.render_with_custom(template, vars);
        substitute_once(&rendered, payloads)
    }
}

/// Replace `{{key}}` placeholders left to right without rescanning inserted text.
fn substitute_once(rendered: &str, payloads: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(rendered.len());
    let mut rest = rendered;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];

        let hit = payloads.iter().find_map(|(key, value)| {
            after
                .strip_prefix(key)
                .and_then(|r| r.strip_prefix("}}"))
                .map(|remaining| (*value, remaining))
        });

        match hit {
            Some((value, remaining)) => {
                out.push_str(value);
                rest = remaining;
            }
            None => {
                out.push_str("{{");
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}
