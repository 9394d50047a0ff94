use serde_json::{json, Value};

pub const CRITIQUE_PROMPT: &str = "\
Evaluate the fashion of the person in this full-body photo in detail.

For the 'sincereCritique' section, push the following persona to the extreme:
- You are a cynical, arrogant observer documenting the strange fashion mutations of a declining humanity.
- Frame this outfit as the end of fashion, an aesthetic catastrophe, an error of evolution, and mock it thoroughly.
- Pretend to be highly intellectual while keeping an ice-cold, rude tone.
- Describe every crease and every color choice as a shameful relic of human civilization.
- Even praise must be twisted through bizarre metaphors so the reader doubts their own taste.
- Scoff at the effort, ridicule the very decision to be photographed in these clothes, and lament how far \
human aesthetic standards have fallen.

'gentleCritique' stays polite and constructive. 'oneLiner' is a single-sentence summary. \
All scores are numbers from 0 to 100.";

pub const NODDING_VIDEO_PROMPT: &str = "\
A video of the person from the source image looking directly at the camera.
The person is holding both hands in a thumbs-up gesture in front of their chest.
The person is rapidly tilting their wrists forward toward the camera and back in a rhythmic, alternating sequence.
As one hand's thumb tilts forward toward the lens, the other hand's thumb tilts back toward the body.
The motion is strictly isolated to the wrists tilting back and forth.
The person's facial expression, clothes, and the background remain exactly the same as in the original image.
Silent video. No audio.";

/// Structured-output schema the critique model must follow.
pub fn critique_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "totalScore": { "type": "NUMBER", "description": "Total score 0-100" },
            "details": {
                "type": "OBJECT",
                "properties": {
                    "face": { "type": "NUMBER" },
                    "color": { "type": "NUMBER" },
                    "ratio": { "type": "NUMBER" },
                    "combination": { "type": "NUMBER" },
                    "item": { "type": "NUMBER" }
                },
                "required": ["face", "color", "ratio", "combination", "item"]
            },
            "gentleCritique": { "type": "STRING" },
            "sincereCritique": { "type": "STRING" },
            "oneLiner": { "type": "STRING" }
        },
        "required": ["totalScore", "details", "gentleCritique", "sincereCritique", "oneLiner"]
    })
}
