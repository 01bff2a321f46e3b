/*!
 * Run-wide style profile.
 *
 * A short description of the source's narrative voice, generated by the
 * oracle once per run from a mid-document sample and reused verbatim in
 * every batch's instructions. The profile is cached on disk so resumed
 * runs keep the exact same guidance.
 */

use log::{info, warn};

use crate::translation::artifacts::ArtifactStore;
use crate::translation::dispatcher::Dispatcher;

/// Guidance used when the oracle cannot produce a profile.
pub const FALLBACK_PROFILE: &str =
    "Preserve the source's narrative pacing, tone and emotional register.";

// Sample size for style analysis. Taken from the middle of the text to
// avoid front matter and closing boilerplate.
const SAMPLE_CHARS: usize = 5000;

const CRITIC_INSTRUCTIONS: &str =
    "You are a literary critic. Analyze the writing style concisely.";

/// Immutable per-run style description.
#[derive(Debug, Clone)]
pub struct StyleProfile {
    text: String,
}

impl StyleProfile {
    /// The descriptive text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Load the cached profile, or generate one from a sample of the
    /// given text and cache it. Oracle failure degrades to a fixed
    /// fallback profile, which is not cached.
    pub async fn load_or_generate(
        dispatcher: &Dispatcher,
        store: &ArtifactStore,
        sample_source: &str,
    ) -> Self {
        if let Some(cached) = store.load_style() {
            return Self { text: cached };
        }

        let sample = Self::sample_window(sample_source);
        let prompt = format!(
            "Summarize the narrative voice, tone, humor level and sentence rhythm \
of the following text in 80 words:\n\n{sample}"
        );

        match dispatcher.dispatch(CRITIC_INSTRUCTIONS, &prompt).await {
            Ok(text) if !text.trim().is_empty() => {
                let text = text.trim().to_string();
                if let Err(error) = store.save_style(&text) {
                    warn!("Failed to cache style profile: {error}");
                }
                info!("Style profile generated and cached");
                Self { text }
            }
            Ok(_) => {
                warn!("Style analysis returned nothing, using fallback profile");
                Self {
                    text: FALLBACK_PROFILE.to_string(),
                }
            }
            Err(error) => {
                warn!("Style analysis failed ({error}), using fallback profile");
                Self {
                    text: FALLBACK_PROFILE.to_string(),
                }
            }
        }
    }

    /// Middle window of at most `SAMPLE_CHARS` characters, char-boundary
    /// safe.
    fn sample_window(text: &str) -> &str {
        let total = text.chars().count();
        if total <= SAMPLE_CHARS {
            return text;
        }

        let skip = (total - SAMPLE_CHARS) / 2;
        let start = text
            .char_indices()
            .nth(skip)
            .map(|(offset, _)| offset)
            .unwrap_or(0);
        let end = text
            .char_indices()
            .nth(skip + SAMPLE_CHARS)
            .map(|(offset, _)| offset)
            .unwrap_or(text.len());
        &text[start..end]
    }
}
