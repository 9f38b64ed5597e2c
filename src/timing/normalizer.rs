use crate::config::TimingConfig;

const EXCLAIM_PAUSE: f64 = 0.5;
const QUESTION_PAUSE: f64 = 0.4;
const PERIOD_PAUSE: f64 = 0.3;
const CLAUSE_PAUSE: f64 = 0.15;
const ELLIPSIS_PAUSE: f64 = 0.6;

/// Speaking-time estimate for a piece of narration text
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeechEstimate {
    pub word_count: usize,
    pub base_seconds: f64,
    pub pause_padding: f64,
}

impl SpeechEstimate {
    pub fn total(&self) -> f64 {
        self.base_seconds + self.pause_padding
    }
}

/// Whitespace-delimited tokens; attached punctuation stays part of the word
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Extra seconds implied by the text's punctuation.
///
/// A trailing run of `.`/`!`/`?` earns one terminal pause chosen by priority
/// `!` > `?` > `.`. Every `,`, `;` and `:` adds a clause pause and every `...`
/// adds an ellipsis pause on top, so a text ending in `...` collects both the
/// ellipsis and the terminal period.
pub fn pause_padding(text: &str) -> f64 {
    let trimmed = text.trim();
    let terminal: String = trimmed
        .chars()
        .rev()
        .take_while(|c| matches!(c, '.' | '!' | '?'))
        .collect();

    let mut padding = if terminal.contains('!') {
        EXCLAIM_PAUSE
    } else if terminal.contains('?') {
        QUESTION_PAUSE
    } else if !terminal.is_empty() {
        PERIOD_PAUSE
    } else {
        0.0
    };

    let clauses = trimmed
        .chars()
        .filter(|c| matches!(c, ',' | ';' | ':'))
        .count();
    padding += clauses as f64 * CLAUSE_PAUSE;
    padding += trimmed.matches("...").count() as f64 * ELLIPSIS_PAUSE;
    padding
}

pub fn estimate_speech(text: &str, config: &TimingConfig) -> SpeechEstimate {
    let word_count = word_count(text);
    SpeechEstimate {
        word_count,
        base_seconds: word_count as f64 * config.seconds_per_word(),
        pause_padding: pause_padding(text),
    }
}
