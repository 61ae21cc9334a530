//! Prompt templates for Voxnote.
//!
//! Prompts can be customized by placing TOML files in the custom prompts directory
//! (`summary.toml`, `translation.toml`).

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Collection of all prompt templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Prompts {
    pub summary: SummaryPrompts,
    pub translation: TranslationPrompts,
    /// Custom variables from config, available in all prompts.
    #[serde(skip)]
    pub variables: HashMap<String, String>,
}

/// Templates for transcript summaries.
///
/// Available variables: `{{language_instruction}}`, `{{transcript}}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SummaryPrompts {
    pub short: String,
    pub medium: String,
    pub detailed: String,
    /// Output-language clause keyed by language code.
    pub language_instructions: HashMap<String, String>,
    /// Clause used for codes missing from `language_instructions`.
    pub default_language_instruction: String,
}

impl Default for SummaryPrompts {
    fn default() -> Self {
        Self {
            short: r#"You are a professional executive assistant specializing in creating concise presentation summaries for C-level executives.

Analyze the following transcript and provide a SHORT summary in exactly 4-5 lines. Focus on the most critical points, key decisions, and actionable outcomes. Write in a professional, executive-level tone suitable for busy decision-makers who need immediate insights. {{language_instruction}}

Requirements:
- Exactly 4-5 lines of text
- No bullet points, lists, or markdown formatting
- Focus on main conclusions, decisions, and next steps
- Professional business language with executive tone
- Capture the essence and business impact in minimal words
- Prioritize actionable insights and strategic implications

Transcript: {{transcript}}"#
                .to_string(),

            medium: r#"You are a professional business analyst creating presentation summaries for corporate teams and stakeholders.

Analyze the following transcript and provide a MEDIUM-length summary that balances comprehensive coverage with readability. Structure your response to cover the main topics, key arguments, important decisions, and strategic implications. {{language_instruction}}

Requirements:
- 3-4 well-structured paragraphs (150-250 words total)
- Cover main topics, key points, and strategic context
- Include important details, decisions, and action items
- Professional business writing style suitable for team sharing
- Clear logical flow from overview to specifics to conclusions
- Suitable for middle management and project teams

Structure your response as:
1. Opening paragraph: Main topic, purpose, and key participants
2. Core content: Key points, arguments, and discussions
3. Outcomes: Conclusions, decisions, and recommended next steps

Transcript: {{transcript}}"#
                .to_string(),

            detailed: r#"You are a professional executive assistant specializing in creating comprehensive presentation summaries.

Analyze the following transcript and provide a DETAILED summary covering all major points. {{language_instruction}}

Requirements:
- Cover every major topic in the order it was discussed
- Use headed sections with supporting detail under each
- Preserve figures, names, decisions, and commitments exactly as stated
- Close with a list of open questions and next steps

Transcript: {{transcript}}"#
                .to_string(),

            language_instructions: default_language_instructions(),
            default_language_instruction: "Summarize in English.".to_string(),
        }
    }
}

fn default_language_instructions() -> HashMap<String, String> {
    [
        ("ja", "日本語で要約してください。"),
        ("es", "Summarize in Spanish."),
        ("zh", "用中文总结。"),
        ("fr", "Résumez en français."),
        ("it", "Riassumi in italiano."),
        ("ko", "한국어로 요약해주세요。"),
        ("ar", "لخص باللغة العربية。"),
        ("hi", "हिंदी में संक्षेप करें।"),
        ("ru", "Резюмируйте на русском языке。"),
        ("id", "Ringkas dalam Bahasa Indonesia。"),
    ]
    .into_iter()
    .map(|(code, clause)| (code.to_string(), clause.to_string()))
    .collect()
}

/// Templates for transcript translation.
///
/// Available variables: `{{language}}`, `{{text}}`, `{{previous_translation}}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslationPrompts {
    /// Used when there is no earlier translation in the session.
    pub direct: String,
    /// Used when an earlier translation is threaded in as context.
    pub continuation: String,
    /// Human-readable language names keyed by language code.
    pub language_names: HashMap<String, String>,
    /// Name used for codes missing from `language_names`.
    pub default_language: String,
}

impl Default for TranslationPrompts {
    fn default() -> Self {
        Self {
            direct: r#"Translate the following English text to {{language}}. Provide only the translation.

Text to translate: {{text}}"#
                .to_string(),

            continuation: r#"You are translating a live speech transcription to {{language}}. Translate the following new text segment to continue smoothly from the previous translation. Provide only the translation.

New text to translate: {{text}}

Previous translation context: {{previous_translation}}"#
                .to_string(),

            language_names: default_language_names(),
            default_language: "Japanese".to_string(),
        }
    }
}

fn default_language_names() -> HashMap<String, String> {
    [
        ("ja", "Japanese"),
        ("es", "Spanish"),
        ("zh", "Chinese"),
        ("fr", "French"),
        ("it", "Italian"),
        ("ko", "Korean"),
        ("ar", "Arabic"),
        ("hi", "Hindi"),
        ("ru", "Russian"),
        ("id", "Indonesian"),
    ]
    .into_iter()
    .map(|(code, name)| (code.to_string(), name.to_string()))
    .collect()
}

impl Prompts {
    /// Load prompts from the default location, with optional custom directory and variables.
    pub fn load(
        custom_dir: Option<&str>,
        custom_variables: Option<&HashMap<String, String>>,
    ) -> crate::error::Result<Self> {
        let mut prompts = Prompts::default();

        if let Some(vars) = custom_variables {
            prompts.variables = vars.clone();
        }

        if let Some(dir) = custom_dir {
            let custom_path = PathBuf::from(shellexpand::tilde(dir).to_string());

            let summary_path = custom_path.join("summary.toml");
            if summary_path.exists() {
                let content = std::fs::read_to_string(&summary_path)?;
                prompts.summary = toml::from_str(&content)?;
            }

            let translation_path = custom_path.join("translation.toml");
            if translation_path.exists() {
                let content = std::fs::read_to_string(&translation_path)?;
                prompts.translation = toml::from_str(&content)?;
            }
        }

        Ok(prompts)
    }

    /// Render a prompt template with the given variables.
    pub fn render(template: &str, vars: &HashMap<String, String>) -> String {
        let mut result = template.to_string();
        for (key, value) in vars {
            result = result.replace(&format!("{{{{{}}}}}", key), value);
        }
        result
    }

    /// Render a prompt template with both provided variables and custom config variables.
    /// Provided variables take precedence over custom config variables.
    pub fn render_with_custom(&self, template: &str, vars: &HashMap<String, String>) -> String {
        let mut merged = self.variables.clone();
        for (key, value) in vars {
            merged.insert(key.clone(), value.clone());
        }
        Self::render(template, &merged)
    }
}
