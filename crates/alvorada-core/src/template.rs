//! Prompt template store.
//!
//! Three templates are compiled into the binary. A directory of `<name>.md`
//! files can be layered on top to add new templates or shadow built-ins.

use std::collections::BTreeSet;
use std::path::PathBuf;

use crate::error::EvalError;

const BUILTIN_TEMPLATES: &[(&str, &str)] = &[
    ("zero_shot", include_str!("../prompts/zero_shot.md")),
    ("chain_of_thought", include_str!("../prompts/chain_of_thought.md")),
    ("role_playing", include_str!("../prompts/role_playing.md")),
];

/// Name of the template used when none is requested.
pub const DEFAULT_TEMPLATE: &str = "zero_shot";

/// A named prompt pattern with `{question}` and `{options}` placeholders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    name: String,
    text: String,
}

impl PromptTemplate {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

/// Looks up prompt templates by name.
#[derive(Debug, Clone, Default)]
pub struct TemplateStore {
    dir: Option<PathBuf>,
}

impl TemplateStore {
    /// A store backed only by the built-in templates.
    pub fn builtin() -> Self {
        Self { dir: None }
    }

    /// A store that checks `dir/<name>.md` before the built-ins.
    pub fn with_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: Some(dir.into()),
        }
    }

    /// Load the template called `name`.
    pub fn load(&self, name: &str) -> Result<PromptTemplate, EvalError> {
        if let Some(path) = self.dir_path(name) {
            if path.is_file() {
                tracing::debug!("loading prompt template {name} from {}", path.display());
                let text = std::fs::read_to_string(&path).map_err(|source| {
                    EvalError::TemplateRead {
                        name: name.to_string(),
                        source,
                    }
                })?;
                return Ok(PromptTemplate::new(name, text));
            }
        }

        BUILTIN_TEMPLATES
            .iter()
            .find(|(builtin, _)| *builtin == name)
            .map(|(builtin, text)| PromptTemplate::new(*builtin, *text))
            .ok_or_else(|| EvalError::TemplateNotFound {
                name: name.to_string(),
                available: self.available(),
            })
    }

    /// All template names this store can serve, sorted.
    pub fn available(&self) -> Vec<String> {
        let mut names: BTreeSet<String> = BUILTIN_TEMPLATES
            .iter()
            .map(|(name, _)| name.to_string())
            .collect();

        if let Some(dir) = &self.dir {
            if let Ok(entries) = std::fs::read_dir(dir) {
                for entry in entries.flatten() {
                    let path = entry.path();
                    if path.extension().is_some_and(|ext| ext == "md") {
                        if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                            names.insert(stem.to_string());
                        }
                    }
                }
            }
        }

        names.into_iter().collect()
    }

    fn dir_path(&self, name: &str) -> Option<PathBuf> {
        // Names are plain identifiers; anything path-like never leaves the dir.
        if name.is_empty() || name.contains(['/', '\\']) || name.starts_with('.') {
            return None;
        }
        self.dir.as_deref().map(|dir| dir.join(format!("{name}.md")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtins_are_available() {
        let store = TemplateStore::builtin();
        assert_eq!(
            store.available(),
            vec!["chain_of_thought", "role_playing", "zero_shot"]
        );
        for name in store.available() {
            let template = store.load(&name).unwrap();
            assert_eq!(template.name(), name);
            assert!(template.text().contains("{question}"));
            assert!(template.text().contains("{options}"));
        }
    }

    #[test]
    fn unknown_template_is_an_error() {
        let err = TemplateStore::builtin().load("few_shot").unwrap_err();
        assert!(matches!(err, EvalError::TemplateNotFound { ref name, .. } if name == "few_shot"));
    }

    #[test]
    fn directory_templates_shadow_and_extend_builtins() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("zero_shot.md"), "Q: {question}\n{options}").unwrap();
        std::fs::write(dir.path().join("terse.md"), "{question} {options}").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let store = TemplateStore::with_dir(dir.path());
        assert_eq!(store.load("zero_shot").unwrap().text(), "Q: {question}\n{options}");
        assert_eq!(store.load("terse").unwrap().text(), "{question} {options}");
        assert!(store.load("chain_of_thought").is_ok());
        assert!(store.load("notes").is_err());
        assert_eq!(
            store.available(),
            vec!["chain_of_thought", "role_playing", "terse", "zero_shot"]
        );
    }

    #[test]
    fn path_like_names_are_not_resolved_against_the_directory() {
        let dir = tempfile::tempdir().unwrap();
        let store = TemplateStore::with_dir(dir.path());
        assert!(matches!(
            store.load("../zero_shot"),
            Err(EvalError::TemplateNotFound { .. })
        ));
    }
}
