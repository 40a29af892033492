//! Prompt templates for subtrans.
//!
//! Prompts can be customized by placing a `translation.toml` file in the custom prompts directory.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Collection of all prompt templates.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Prompts {
    pub translation: TranslationPrompts,
    /// Custom variables from config, available in all prompts.
    #[serde(skip)]
    pub variables: HashMap<String, String>,
}

/// Prompts for the translator gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslationPrompts {
    pub system: String,
    pub user: String,
}

impl Default for TranslationPrompts {
    fn default() -> Self {
        Self {
            system: "You are a translator. Translate the given text from English to {{language}}. \
                     Do not provide any additional explanation other than the translation."
                .to_string(),
            user: "Translate the following text to {{language}}: {{text}}".to_string(),
        }
    }
}

impl Prompts {
    /// Load prompts, with optional custom directory and variables.
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

    /// Render the system and user messages for one chunk.
    ///
    /// The chunk text is substituted last so placeholders inside it are left alone.
    pub fn translation_messages(&self, language: &str, text: &str) -> (String, String) {
        let mut vars = HashMap::new();
        vars.insert("language".to_string(), language.to_string());

        let system = self.render_with_custom(&self.translation.system, &vars);
        let user = self
            .render_with_custom(&self.translation.user, &vars)
            .replace("{{text}}", text);
        (system, user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_translation_messages() {
        let prompts = Prompts::default();
        let (system, user) = prompts.translation_messages("Korean", "Hello there");

        assert_eq!(
            system,
            "You are a translator. Translate the given text from English to Korean. \
             Do not provide any additional explanation other than the translation."
        );
        assert_eq!(user, "Translate the following text to Korean: Hello there");
    }

    #[test]
    fn test_chunk_text_is_not_rendered() {
        let prompts = Prompts::default();
        let (_, user) = prompts.translation_messages("Korean", "literal {{language}} braces");
        assert!(user.ends_with("literal {{language}} braces"));
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
    fn test_custom_prompt_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("translation.toml"),
            "system = \"Translate into {{language}} for {{audience}}.\"\nuser = \"{{text}}\"\n",
        )
        .unwrap();

        let mut vars = HashMap::new();
        vars.insert("audience".to_string(), "students".to_string());
        let prompts = Prompts::load(dir.path().to_str(), Some(&vars)).unwrap();

        let (system, user) = prompts.translation_messages("Korean", "abc");
        assert_eq!(system, "Translate into Korean for students.");
        assert_eq!(user, "abc");
    }
}
