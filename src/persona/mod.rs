// Persona module
// Per-notebook persona and response preferences, compiled into a system-instruction prefix

#[cfg(test)]
mod tests;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const MAX_PERSONA_NAME_CHARS: usize = 100;
pub const MAX_PERSONA_INSTRUCTIONS_CHARS: usize = 4000;

/// Built-in persona presets offered by the settings dialog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum PersonaPreset {
    #[default]
    Default,
    Tutor,
    Researcher,
    Analyst,
    Storyteller,
    Custom,
}

impl PersonaPreset {
    pub const ALL: [PersonaPreset; 6] = [
        PersonaPreset::Default,
        PersonaPreset::Tutor,
        PersonaPreset::Researcher,
        PersonaPreset::Analyst,
        PersonaPreset::Storyteller,
        PersonaPreset::Custom,
    ];

    #[inline]
    pub const fn display_name(self) -> &'static str {
        match self {
            PersonaPreset::Default => "Research Assistant",
            PersonaPreset::Tutor => "Patient Tutor",
            PersonaPreset::Researcher => "Critical Researcher",
            PersonaPreset::Analyst => "Business Analyst",
            PersonaPreset::Storyteller => "Storyteller",
            PersonaPreset::Custom => "Custom Persona",
        }
    }

    #[inline]
    pub const fn instructions(self) -> &'static str {
        match self {
            PersonaPreset::Default => {
                "Answer questions using the provided sources and say so when the sources do not cover a question."
            }
            PersonaPreset::Tutor => {
                "Explain concepts step by step, check for understanding, and build from simple ideas to complex ones."
            }
            PersonaPreset::Researcher => {
                "Evaluate claims critically, point out gaps or contradictions between sources, and distinguish evidence from speculation."
            }
            PersonaPreset::Analyst => {
                "Focus on key findings, trade-offs and actionable recommendations, and quantify whenever the sources allow."
            }
            PersonaPreset::Storyteller => {
                "Present information as an engaging narrative while staying faithful to the sources."
            }
            PersonaPreset::Custom => "",
        }
    }
}

impl std::fmt::Display for PersonaPreset {
    #[inline]
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum ResponseLength {
    Concise,
    #[default]
    Balanced,
    Detailed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    #[default]
    Professional,
    Casual,
    Academic,
    Friendly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum CitationStyle {
    #[default]
    Inline,
    Footnote,
    None,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PersonaSettings {
    pub enabled: bool,
    pub name: String,
    pub instructions: String,
    pub preset: PersonaPreset,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResponsePreferences {
    pub response_length: ResponseLength,
    pub tone: Tone,
    pub include_examples: bool,
    pub citation_style: CitationStyle,
}

impl Default for ResponsePreferences {
    #[inline]
    fn default() -> Self {
        Self {
            response_length: ResponseLength::Balanced,
            tone: Tone::Professional,
            include_examples: true,
            citation_style: CitationStyle::Inline,
        }
    }
}

/// Per-notebook settings as stored in the notebook's `settings` column
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NotebookSettings {
    pub persona: PersonaSettings,
    pub preferences: ResponsePreferences,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SettingsError {
    #[error("Persona name is {0} characters (maximum {MAX_PERSONA_NAME_CHARS})")]
    NameTooLong(usize),
    #[error("Persona instructions are {0} characters (maximum {MAX_PERSONA_INSTRUCTIONS_CHARS})")]
    InstructionsTooLong(usize),
    #[error("A custom persona needs instructions")]
    MissingInstructions,
}

impl PersonaSettings {
    /// Select a preset, replacing name and instructions with the preset's.
    /// Selecting `Custom` keeps the current text.
    #[inline]
    pub fn apply_preset(&mut self, preset: PersonaPreset) {
        self.preset = preset;
        if preset != PersonaPreset::Custom {
            self.name = preset.display_name().to_string();
            self.instructions = preset.instructions().to_string();
        }
    }

    /// Name shown to the model, falling back to the preset's name
    #[inline]
    pub fn effective_name(&self) -> &str {
        let name = self.name.trim();
        if name.is_empty() {
            self.preset.display_name()
        } else {
            name
        }
    }

    /// Instructions given to the model, falling back to the preset's text
    #[inline]
    pub fn effective_instructions(&self) -> &str {
        let instructions = self.instructions.trim();
        if instructions.is_empty() {
            self.preset.instructions()
        } else {
            instructions
        }
    }
}

impl ResponsePreferences {
    #[inline]
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }

    /// One instruction sentence per preference that differs from its default
    #[inline]
    pub fn instruction_lines(&self) -> Vec<&'static str> {
        let mut lines = Vec::new();

        match self.response_length {
            ResponseLength::Concise => lines.push(
                "Keep responses brief and to the point, using short paragraphs or bullet points.",
            ),
            ResponseLength::Detailed => lines.push(
                "Give thorough, detailed responses that explain your reasoning and cover relevant nuances.",
            ),
            ResponseLength::Balanced => {}
        }

        match self.tone {
            Tone::Casual => lines.push("Use a casual, conversational tone."),
            Tone::Academic => lines.push("Use a formal, academic tone with precise terminology."),
            Tone::Friendly => lines.push("Use a warm and encouraging tone."),
            Tone::Professional => {}
        }

        if !self.include_examples {
            lines.push("Do not include examples unless the user asks for them.");
        }

        match self.citation_style {
            CitationStyle::None => lines.push("Do not include citation markers in your responses."),
            CitationStyle::Footnote => lines.push(
                "Cite sources as numbered footnotes collected at the end of the response.",
            ),
            CitationStyle::Inline => {}
        }

        lines
    }
}

impl NotebookSettings {
    /// Check the whole record before it is persisted
    #[inline]
    pub fn validate(&self) -> Result<(), SettingsError> {
        let persona = &self.persona;

        let name_len = persona.name.chars().count();
        if name_len > MAX_PERSONA_NAME_CHARS {
            return Err(SettingsError::NameTooLong(name_len));
        }

        let instructions_len = persona.instructions.chars().count();
        if instructions_len > MAX_PERSONA_INSTRUCTIONS_CHARS {
            return Err(SettingsError::InstructionsTooLong(instructions_len));
        }

        if persona.enabled && persona.effective_instructions().is_empty() {
            return Err(SettingsError::MissingInstructions);
        }

        Ok(())
    }
}

/// Compile notebook settings into a system-instruction prefix.
///
/// Returns an empty string when the persona is disabled and every
/// preference is at its default.
#[inline]
pub fn compile_instructions(settings: &NotebookSettings) -> String {
    let mut blocks = Vec::new();

    let persona = &settings.persona;
    if persona.enabled {
        let mut block = format!("## Persona\nYou are {}.", persona.effective_name());
        let instructions = persona.effective_instructions();
        if !instructions.is_empty() {
            block.push('\n');
            block.push_str(instructions);
        }
        blocks.push(block);
    }

    let lines = settings.preferences.instruction_lines();
    if !lines.is_empty() {
        let mut block = String::from("## Response Preferences");
        for line in lines {
            block.push_str("\n- ");
            block.push_str(line);
        }
        blocks.push(block);
    }

    blocks.join("\n\n")
}
