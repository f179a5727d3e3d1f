//! Instructions sent to the completion service

use stockmeta_core::{Language, Platform};

fn platform_note(platform: Platform) -> &'static str {
    match platform {
        Platform::Adobe => "Adobe Stock (max 49 keywords, broad to specific)",
        Platform::Shutterstock => "Shutterstock (max 50 keywords, high commercial value)",
        Platform::Istock => "iStock/Getty (max 50 keywords, Getty controlled vocabulary preferred)",
    }
}

/// Title and description request. The reply must be one JSON object.
pub fn metadata(hint: &str) -> String {
    let hint = hint.trim();
    let hint_text = if hint.is_empty() {
        String::new()
    } else {
        format!("\n\nAdditional reference from the photographer (take it into account): {}", hint)
    };

    format!(
        r#"You are a stock photography metadata specialist.
Study this image and write metadata for microstock marketplaces.{hint_text}

Think about what buyers search for on Adobe Stock, Shutterstock and iStock and what gives the image commercial appeal.

Reply with ONLY valid JSON and nothing else:
{{"title_en":"...","title_tr":"...","description_en":"...","description_tr":"..."}}

Title (title_en / title_tr):
- Follow "who, what, where, when": one clear sentence saying who is doing what, where, and when if it matters.
- Keep it between 5 and 10 words without decoration.
- Write a natural sentence, never a stack of keywords. Good: "Woman working on laptop in bright modern office". Bad: "Woman laptop office business".
- The English and Turkish titles must both read naturally.

Description (description_en / description_tr):
- More detailed than the title: mood, setting, light and likely uses.
- 150 to 200 characters. It must differ from the title and never repeat it."#
    )
}

/// Keyword request for one platform. The reply must be one comma-separated line.
pub fn keywords(platform: Platform, hint: &str) -> String {
    let hint = hint.trim();
    let hint_text = if hint.is_empty() {
        String::new()
    } else {
        format!("\nExtra context (important): {}", hint)
    };
    let max = platform.max_keywords();

    format!(
        r#"You are a microstock SEO specialist. Write English keywords for {note}.{hint_text}

First read the image as a story for yourself only: who, what, why, when, where and which concept. Never output that story.

Then list keywords that follow it: the specific subject first, then its category, then place and time, then concepts. The 10 terms most critical to the story come first.

Rules:
- Order by importance. Early positions rank higher on Adobe Stock and Getty.
- Go from specific to general: specific subject (Golden Retriever), then category (Dog, Pet), then concept (Loyalty, Friendship).
- Singular forms only ("dog", not "dogs"); plural variants waste the limit.
- Include conceptual tags for mood or message such as Loneliness, Success, Sustainability.
- Tag only what is clearly visible and central. Skip small background objects.

Output format: exactly one line of comma-separated keywords. No introduction, no sentences, no bullets, no numbering. Example: wind turbine, power line, renewable energy, sustainability, outdoor, sunset.
Write exactly {max} keywords."#,
        note = platform_note(platform),
    )
}

/// Free-text translation request
pub fn translation(text: &str, target: Language) -> String {
    format!(
        "Translate to {}. Keep it natural and professional. Return ONLY the translation:\n\n{}",
        target.prompt_name(),
        text
    )
}
