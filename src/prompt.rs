use crate::request::InferenceKind;

/// Placeholder replaced by the caller's instruction in the navigation template.
pub const INSTRUCTION_PLACEHOLDER: &str = "{instruction}";

pub const DEFAULT_EXPLORE_PROMPT: &str = "Describe the scene in this image with spatial context. \
Keep it concise (2-3 sentences) and speak directly to the user.";

pub const DEFAULT_NAV_PROMPT_TEMPLATE: &str = "You are a navigation assistant. \
The core instruction is: '{instruction}'. Use the image only to provide safety/contextual \
information (obstacles, clear path). Be concise and give a single direct command.";

/// Prompt text per request kind, fixed for the lifetime of the process.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PromptTemplates {
    explore: String,
    navigate: String,
}

impl Default for PromptTemplates {
    fn default() -> Self {
        Self {
            explore: DEFAULT_EXPLORE_PROMPT.to_string(),
            navigate: DEFAULT_NAV_PROMPT_TEMPLATE.to_string(),
        }
    }
}

impl PromptTemplates {
    /// Returns `None` if the navigation template lacks the placeholder.
    pub fn new(explore: impl Into<String>, navigate: impl Into<String>) -> Option<Self> {
        let navigate = navigate.into();
        if !navigate.contains(INSTRUCTION_PLACEHOLDER) {
            return None;
        }
        Some(Self {
            explore: explore.into(),
            navigate,
        })
    }

    /// Builds the prompt sent to the model.
    ///
    /// The instruction is inserted verbatim, without escaping.
    pub fn build(&self, kind: InferenceKind, instruction: Option<&str>) -> String {
        match kind {
            InferenceKind::Analyze => self.explore.clone(),
            InferenceKind::Navigate => self
                .navigate
                .replace(INSTRUCTION_PLACEHOLDER, instruction.unwrap_or_default()),
        }
    }
}
