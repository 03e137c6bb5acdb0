//! Prompt assembly for generation requests
//!
//! Known style presets expand into a leading art direction; anything
//! else is appended as a free-form style hint.

/// Baseline negative prompt for backends that honor one
pub const DEFAULT_NEGATIVE_PROMPT: &str = "lowres, bad anatomy, blurry, watermark";

pub fn build_prompt(prompt: &str, style: Option<&str>) -> String {
    let subject = prompt.trim();
    match style.map(str::trim) {
        Some("photo") => format!("A photorealistic, highly detailed photograph. {subject}"),
        Some("anime") => format!("An anime illustration with clean line work. {subject}"),
        Some("sketch") => format!("A loose monochrome pencil sketch. {subject}"),
        Some("painting") => format!("An expressive oil painting with visible brushwork. {subject}"),
        Some(other) if !other.is_empty() => format!("{subject}, in the style of {other}"),
        _ => subject.to_string(),
    }
}
