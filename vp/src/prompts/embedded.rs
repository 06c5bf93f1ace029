//! Embedded fallback prompts
//!
//! These are compiled into the binary and used when template files are not found.

/// Full-brief generation
pub const BRIEF: &str = r#"You are an expert AI video director. Your task is to create a detailed shot list for a short-form video for platforms like TikTok, YouTube Shorts or Reels, designed for AI video generators like Sora and Veo.
The final output must be JSON that adheres to the provided schema.
All text in the JSON output (title, overall_prompt, shot descriptions, camera angles) must be written in {{language}}.

User's Video Concept:
- Main Subject: {{subject}}
- Visual Style: {{style}}
- Setting/Background: {{setting}}
- Color Palette: {{color_palette}}
- Music/Soundtrack: {{music}}
- Key Sound Effects: {{sound_effects}}
- Dialogue/Narration:
{{dialogue}}
- Total Video Length: {{duration_seconds}} seconds
- Aspect Ratio: {{aspect_ratio}}
- Shot List ({{shot_count}} cuts): {{camera_angles}}

Instructions:
1. Create a compelling, coherent narrative or visual sequence across exactly {{shot_count}} shots, numbered 1 to {{shot_count}}.
2. The 'overall_prompt' must be a single, powerful paragraph that synthesizes all elements (visuals, audio, story) into one master prompt. It is the most information-dense field of the output.
3. The durations of all shots combined must equal exactly {{duration_seconds}} seconds. Distribute the time logically across the {{shot_count}} shots.
4. The output must conform exactly to the declared JSON schema, with no extra text.
"#;

pub const SUGGEST_SUBJECT: &str = "Suggest a visually interesting and creative subject for a 10-second viral video. Be concise. Example: 'A cat riding a skateboard'. Respond in {{language}} with only the subject text, without any labels or quotes.";

pub const SUGGEST_STYLE: &str = "Suggest a single, specific, and visually descriptive art style for an AI-generated video. Example: 'cinematic hyperrealism'. Respond in {{language}} with only the style name, without any labels or quotes.";

pub const SUGGEST_SETTING: &str = "Suggest a creative and vivid setting for a 10-second viral video. Be concise. Example: 'Streets of Neo-Seoul at night'. Respond in {{language}} with only the setting text, without any labels or quotes.";

pub const SUGGEST_COLOR_PALETTE: &str = "Suggest a compelling and descriptive color palette for an AI-generated video. Be concise. Example: 'Vibrant neon and cyberpunk blues'. Respond in {{language}} with only the color palette text, without any labels or quotes.";

pub const SUGGEST_MUSIC: &str = "Suggest a music style or soundtrack for a 10-second viral video. Be concise. Example: 'Epic orchestral score'. Respond in {{language}} with only the music text, without any labels or quotes.";

pub const SUGGEST_SOUND_EFFECTS: &str = "Suggest key sound effects for a 10-second viral video. Be concise. Example: 'City ambiance, cat meow'. Respond in {{language}} with only the sound effects text, without any labels or quotes.";

pub const SUGGEST_DIALOGUE: &str = r#"Suggest a short, 2-3 line dialogue for a 10-second viral video. It can be a one-on-one or multi-person conversation. Respond ONLY with a valid JSON array of objects in this format: [{"speaker": "string", "line": "string"}]. The language of the 'speaker' and 'line' values must be {{language}}. Do not include any other text or markdown formatting."#;

/// Re-expression of an existing result in another language
pub const TRANSLATE: &str = r#"You are a professional localizer for video production scripts.
Below is a structured shot-by-shot video prompt in JSON. Re-express every natural-language field (title, overall_prompt, and each shot's description and camera_angle) in {{language}}.
Keep the structure identical: the same keys and the same {{shot_count}} shots in the same order.
Do not change any numeric field (total_duration_seconds, shot_number, duration_seconds) and keep aspect_ratio exactly "{{aspect_ratio}}".
Return only JSON that conforms to the declared schema.

{{result_json}}
"#;

/// Get an embedded template by name
pub fn get_embedded(name: &str) -> Option<&'static str> {
    match name {
        "brief" => Some(BRIEF),
        "suggest-subject" => Some(SUGGEST_SUBJECT),
        "suggest-style" => Some(SUGGEST_STYLE),
        "suggest-setting" => Some(SUGGEST_SETTING),
        "suggest-color-palette" => Some(SUGGEST_COLOR_PALETTE),
        "suggest-music" => Some(SUGGEST_MUSIC),
        "suggest-sound-effects" => Some(SUGGEST_SOUND_EFFECTS),
        "suggest-dialogue" => Some(SUGGEST_DIALOGUE),
        "translate" => Some(TRANSLATE),
        _ => None,
    }
}
