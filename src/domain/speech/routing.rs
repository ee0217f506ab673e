//! Voice pre-routing based on the script of the input text

use serde::{Deserialize, Serialize};

/// Writing system detected in the text to synthesize
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Script {
    Arabic,
    Other,
}

fn is_arabic(c: char) -> bool {
    matches!(
        c,
        '\u{0600}'..='\u{06FF}' | '\u{0750}'..='\u{077F}' | '\u{08A0}'..='\u{08FF}'
    )
}

/// Arabic if any character falls in the Arabic blocks
pub fn detect_script(text: &str) -> Script {
    if text.chars().any(is_arabic) {
        Script::Arabic
    } else {
        Script::Other
    }
}

/// Voice variants of the primary provider and language codes for the fallback
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VoiceRouting {
    pub default_voice: String,
    pub arabic_voice: String,
    pub default_language: String,
    pub arabic_language: String,
}

impl Default for VoiceRouting {
    fn default() -> Self {
        Self {
            default_voice: "fr-FR".to_string(),
            arabic_voice: "ar-SA".to_string(),
            default_language: "fr".to_string(),
            arabic_language: "ar".to_string(),
        }
    }
}

/// Speech request after routing, as seen by every provider in the chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutedSpeech {
    pub text: String,
    pub voice: String,
    pub language: String,
    pub script: Script,
}

impl VoiceRouting {
    /// Picks the voice variant before the chain starts. An explicit voice wins.
    pub fn route(&self, text: &str, requested_voice: Option<&str>) -> RoutedSpeech {
        let script = detect_script(text);

        let (variant, language) = match script {
            Script::Arabic => (&self.arabic_voice, &self.arabic_language),
            Script::Other => (&self.default_voice, &self.default_language),
        };

        let voice = requested_voice
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .unwrap_or(variant);

        RoutedSpeech {
            text: text.to_string(),
            voice: voice.to_string(),
            language: language.clone(),
            script,
        }
    }
}
