use super::*;
use serde_json::json;

#[test]
fn defaults_compile_to_empty() {
    assert_eq!(compile_instructions(&NotebookSettings::default()), "");
}

#[test]
fn disabled_persona_is_ignored() {
    let mut settings = NotebookSettings::default();
    settings.persona.name = "Ignored".to_string();
    settings.persona.instructions = "Never shown.".to_string();

    assert_eq!(compile_instructions(&settings), "");
}

#[test]
fn enabled_persona_block() {
    let mut settings = NotebookSettings::default();
    settings.persona.enabled = true;
    settings.persona.name = "  Rusty  ".to_string();
    settings.persona.instructions = "Answer like a crab.".to_string();

    assert_eq!(
        compile_instructions(&settings),
        "## Persona\nYou are Rusty.\nAnswer like a crab."
    );
}

#[test]
fn preset_fills_blank_fields() {
    let mut settings = NotebookSettings::default();
    settings.persona.enabled = true;
    settings.persona.preset = PersonaPreset::Tutor;

    let compiled = compile_instructions(&settings);
    assert!(compiled.starts_with("## Persona\nYou are Patient Tutor.\n"));
    assert!(compiled.contains(PersonaPreset::Tutor.instructions()));
}

#[test]
fn only_non_default_preferences_appear() {
    let mut settings = NotebookSettings::default();
    settings.preferences.tone = Tone::Academic;
    settings.preferences.include_examples = false;

    assert_eq!(
        compile_instructions(&settings),
        "## Response Preferences\n\
         - Use a formal, academic tone with precise terminology.\n\
         - Do not include examples unless the user asks for them."
    );
}

#[test]
fn every_preference_in_fixed_order() {
    let mut settings = NotebookSettings::default();
    settings.persona.enabled = true;
    settings.persona.apply_preset(PersonaPreset::Analyst);
    settings.preferences = ResponsePreferences {
        response_length: ResponseLength::Concise,
        tone: Tone::Casual,
        include_examples: false,
        citation_style: CitationStyle::Footnote,
    };

    let compiled = compile_instructions(&settings);
    let blocks: Vec<&str> = compiled.split("\n\n").collect();
    assert_eq!(blocks.len(), 2);
    assert!(blocks[0].starts_with("## Persona\nYou are Business Analyst."));

    let lines: Vec<&str> = blocks[1].lines().collect();
    assert_eq!(lines.len(), 5);
    assert_eq!(lines[0], "## Response Preferences");
    assert!(lines[1].contains("brief"));
    assert!(lines[2].contains("casual"));
    assert!(lines[3].contains("examples"));
    assert!(lines[4].contains("footnotes"));
}

#[test]
fn citation_none_and_detailed_lines() {
    let preferences = ResponsePreferences {
        response_length: ResponseLength::Detailed,
        citation_style: CitationStyle::None,
        ..ResponsePreferences::default()
    };

    let lines = preferences.instruction_lines();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].contains("detailed"));
    assert!(lines[1].contains("citation markers"));
    assert!(!preferences.is_default());
    assert!(ResponsePreferences::default().is_default());
}

#[test]
fn compile_is_deterministic() {
    let mut settings = NotebookSettings::default();
    settings.persona.enabled = true;
    settings.persona.apply_preset(PersonaPreset::Storyteller);
    settings.preferences.tone = Tone::Friendly;

    assert_eq!(compile_instructions(&settings), compile_instructions(&settings.clone()));
}

#[test]
fn apply_preset_keeps_custom_text() {
    let mut persona = PersonaSettings {
        name: "Mine".to_string(),
        instructions: "My rules.".to_string(),
        ..PersonaSettings::default()
    };

    persona.apply_preset(PersonaPreset::Custom);
    assert_eq!(persona.name, "Mine");
    assert_eq!(persona.instructions, "My rules.");

    persona.apply_preset(PersonaPreset::Researcher);
    assert_eq!(persona.name, "Critical Researcher");
    assert_eq!(persona.instructions, PersonaPreset::Researcher.instructions());
}

#[test]
fn every_preset_but_custom_has_instructions() {
    for preset in PersonaPreset::ALL {
        assert!(!preset.display_name().is_empty());
        assert_eq!(
            preset.instructions().is_empty(),
            preset == PersonaPreset::Custom,
            "{:?}",
            preset
        );
    }
}

#[test]
fn validation_limits() {
    let mut settings = NotebookSettings::default();
    assert_eq!(settings.validate(), Ok(()));

    settings.persona.name = "n".repeat(MAX_PERSONA_NAME_CHARS + 1);
    assert_eq!(
        settings.validate(),
        Err(SettingsError::NameTooLong(MAX_PERSONA_NAME_CHARS + 1))
    );

    settings.persona.name = "Fine".to_string();
    settings.persona.instructions = "i".repeat(MAX_PERSONA_INSTRUCTIONS_CHARS + 1);
    assert_eq!(
        settings.validate(),
        Err(SettingsError::InstructionsTooLong(
            MAX_PERSONA_INSTRUCTIONS_CHARS + 1
        ))
    );

    settings.persona.instructions = String::new();
    settings.persona.preset = PersonaPreset::Custom;
    settings.persona.enabled = true;
    assert_eq!(settings.validate(), Err(SettingsError::MissingInstructions));
}

#[test]
fn settings_json_shape() {
    let value = serde_json::to_value(NotebookSettings::default()).expect("settings serialize");
    assert_eq!(
        value,
        json!({
            "persona": {
                "enabled": false,
                "name": "",
                "instructions": "",
                "preset": "default"
            },
            "preferences": {
                "response_length": "balanced",
                "tone": "professional",
                "include_examples": true,
                "citation_style": "inline"
            }
        })
    );
}

#[test]
fn partial_settings_fill_defaults() {
    let settings: NotebookSettings = serde_json::from_value(json!({
        "persona": {"enabled": true, "preset": "tutor"},
        "preferences": {"tone": "casual"}
    }))
    .expect("partial settings parse");

    assert!(settings.persona.enabled);
    assert_eq!(settings.persona.preset, PersonaPreset::Tutor);
    assert_eq!(settings.preferences.tone, Tone::Casual);
    assert!(settings.preferences.include_examples);
    assert_eq!(settings.preferences.response_length, ResponseLength::Balanced);
}
