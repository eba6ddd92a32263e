//! Prompt templates for Quizly.
//!
//! Prompts can be customized by placing a `quiz.toml` file in the custom prompts directory.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Collection of all prompt templates.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Prompts {
    pub quiz: QuizPrompts,
    /// Custom variables from config, available in all prompts.
    #[serde(skip)]
    pub variables: std::collections::HashMap<String, String>,
}

/// Prompts for quiz synthesis.
///
/// Available placeholders: `{{title}}`, `{{transcript}}`,
/// `{{question_count}}` and `{{option_count}}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QuizPrompts {
    pub system: String,
    pub user: String,
}

impl Default for QuizPrompts {
    fn default() -> Self {
        Self {
            system: r#"You are a teacher who writes multiple-choice quizzes from video transcripts.

You always reply with exactly one JSON object and nothing else:
- No explanations, comments or greetings before or after the JSON
- No markdown and no code fences
- The JSON must be parseable as-is"#
                .to_string(),

            user: r#"Based on the following transcript, generate a quiz in valid JSON format.

Video title: {{title}}

The quiz must follow this exact structure:

{
  "title": "A concise quiz title based on the topic of the transcript.",
  "description": "A summary of the transcript in no more than 150 characters. No questions or answers.",
  "questions": [
    {
      "question_title": "The question goes here.",
      "question_options": ["Option A", "Option B", "Option C", "Option D"],
      "answer": "The correct answer, copied exactly from question_options"
    }
  ]
}

Requirements:
- "questions" must contain exactly {{question_count}} questions.
- Each question must have exactly {{option_count}} distinct answer options.
- Exactly one option is correct, and "answer" must repeat it character for character.
- Use only the field names shown above.
- Output only the JSON object. Do not include explanations, comments, or any text outside the JSON.

Transcript:
{{transcript}}"#
                .to_string(),
        }
    }
}

impl Prompts {
    /// Load prompts from the default location, with optional custom directory and variables.
    pub fn load(
        custom_dir: Option<&str>,
        custom_variables: Option<&std::collections::HashMap<String, String>>,
    ) -> crate::error::Result<Self> {
        let mut prompts = Prompts::default();

        if let Some(vars) = custom_variables {
            prompts.variables = vars.clone();
        }

        if let Some(dir) = custom_dir {
            let custom_path = PathBuf::from(shellexpand::tilde(dir).to_string());

            let quiz_path = custom_path.join("quiz.toml");
            if quiz_path.exists() {
                let content = std::fs::read_to_string(&quiz_path)?;
                prompts.quiz = toml::from_str(&content)?;
            }
        }

        Ok(prompts)
    }

    /// Render a prompt template with the given variables.
    pub fn render(template: &str, vars: &std::collections::HashMap<String, String>) -> String {
        let mut result = template.to_string();
        for (key, value) in vars {
            result = result.replace(&format!("{{{{{}}}}}", key), value);
        }
        result
    }

    /// Render a prompt template with both provided variables and custom config variables.
    /// Provided variables take precedence over custom config variables.
    pub fn render_with_custom(
        &self,
        template: &str,
        vars: &std::collections::HashMap<String, String>,
    ) -> String {
        let mut merged = self.variables.clone();
        for (key, value) in vars {
            merged.insert(key.clone(), value.clone());
        }
        Self::render(template, &merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_prompts() {
        let prompts = Prompts::default();
        assert!(!prompts.quiz.system.is_empty());
        assert!(prompts.quiz.user.contains("{{transcript}}"));
        assert!(prompts.quiz.user.contains("{{question_count}}"));
    }

    #[test]
    fn test_render_template() {
        let template = "Hello {{name}}, you have {{count}} messages.";
        let mut vars = HashMap::new();
        vars.insert("name".to_string(), "Alice".to_string());
        vars.insert("count".to_string(), "5".to_string());

        let result = Prompts::render(template, &vars);
        assert_eq!(result, "Hello Alice, you have 5 messages.");
    }

    #[test]
    fn test_provided_variables_override_custom() {
        let mut custom = HashMap::new();
        custom.insert("audience".to_string(), "beginners".to_string());
        custom.insert("title".to_string(), "from config".to_string());
        let prompts = Prompts::load(None, Some(&custom)).unwrap();

        let mut vars = HashMap::new();
        vars.insert("title".to_string(), "from request".to_string());

        let rendered = prompts.render_with_custom("{{title}} for {{audience}}", &vars);
        assert_eq!(rendered, "from request for beginners");
    }

    #[test]
    fn test_load_custom_quiz_prompts() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("quiz.toml"),
            "system = \"Be terse.\"\nuser = \"{{transcript}}\"\n",
        )
        .unwrap();

        let prompts = Prompts::load(dir.path().to_str(), None).unwrap();
        assert_eq!(prompts.quiz.system, "Be terse.");
        assert_eq!(prompts.quiz.user, "{{transcript}}");
    }
}
