//! Word-by-word disclosure of an already complete reply.

use std::time::Duration;

use rand::Rng;

use crate::config::RevealSettings;

/// One visible growth step of a revealed message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevealStep {
    /// Text shown after this step.
    pub prefix: String,
    /// Text added by this step.
    pub chunk: String,
    /// Pause taken after the step is shown.
    pub delay: Duration,
}

/// Splits `text` on single spaces and yields the prefixes the reader sees.
///
/// Every prefix is strictly longer than the one before it and the last one equals
/// `text`. Runs of spaces produce empty words, which are folded into the next step.
pub fn reveal_steps(text: &str, settings: &RevealSettings) -> Vec<RevealStep> {
    let mut rng = rand::thread_rng();
    let mut steps = Vec::new();
    let mut shown = 0;
    let mut end = 0;

    for (i, word) in text.split(' ').enumerate() {
        if i > 0 {
            end += 1;
        }
        end += word.len();
        if word.is_empty() && end < text.len() {
            continue;
        }
        if end > shown {
            steps.push(RevealStep {
                prefix: text[..end].to_string(),
                chunk: text[shown..end].to_string(),
                delay: word_delay(settings, &mut rng),
            });
            shown = end;
        }
    }

    steps
}

fn word_delay(settings: &RevealSettings, rng: &mut impl Rng) -> Duration {
    if settings.is_instant() {
        return Duration::ZERO;
    }
    let min = settings.min_delay.as_millis() as u64;
    let max = settings.max_delay.as_millis() as u64;
    Duration::from_millis(rng.gen_range(min..=max))
}
