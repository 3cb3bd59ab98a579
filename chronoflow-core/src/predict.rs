//! Guess duration/energy for a task from keywords in its title.

use regex::Regex;
use std::sync::LazyLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Prediction {
    pub duration: u32,
    pub energy: u32,
}

/// Energy used when nothing else is known.
pub const DEFAULT_ENERGY: u32 = 10;

struct Rule {
    pattern: Regex,
    prediction: Prediction,
}

fn rule(keywords: &[&str], duration: u32, energy: u32) -> Rule {
    // Keywords are plain words; substring match, case-insensitive.
    let alternation = keywords
        .iter()
        .map(|k| regex::escape(k))
        .collect::<Vec<_>>()
        .join("|");
    Rule {
        pattern: Regex::new(&format!("(?i){alternation}")).expect("keyword regex"),
        prediction: Prediction { duration, energy },
    }
}

static RULES: LazyLock<Vec<Rule>> = LazyLock::new(|| {
    vec![
        rule(&["gym", "workout", "exercise", "run", "fitness"], 90, 15),
        rule(&["read", "book", "study", "learn"], 45, 8),
        rule(&["cook", "dinner", "lunch", "meal"], 45, 8),
        rule(&["clean", "chore", "laundry", "tidy"], 60, 10),
        rule(&["meeting", "call", "zoom", "sync"], 30, 5),
        rule(&["code", "program", "dev", "work"], 120, 20),
        rule(&["nap", "relax", "tv", "movie", "game"], 60, 2),
        rule(&["shop", "grocer", "store"], 60, 10),
    ]
});

/// First matching rule wins.
pub fn predict(title: &str) -> Option<Prediction> {
    RULES
        .iter()
        .find(|r| r.pattern.is_match(title))
        .map(|r| r.prediction)
}

/// Duration fallback when the caller gives none: six minutes per energy point.
pub fn default_duration(energy: u32) -> u32 {
    energy.saturating_mul(6)
}

/// Fill whichever of duration/energy is missing: prediction first, then
/// defaults.
pub fn resolve(title: &str, duration: Option<u32>, energy: Option<u32>) -> Prediction {
    let guess = predict(title);
    let energy = energy
        .or(guess.map(|p| p.energy))
        .unwrap_or(DEFAULT_ENERGY);
    let duration = duration
        .or(guess.map(|p| p.duration))
        .unwrap_or_else(|| default_duration(energy));
    Prediction { duration, energy }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn predicts_gym() {
        assert_eq!(
            predict("Morning GYM session"),
            Some(Prediction {
                duration: 90,
                energy: 15
            })
        );
    }

    #[test]
    fn substring_match_and_rule_order() {
        // "bookstore" hits the reading rule before the shopping rule.
        assert_eq!(predict("bookstore trip").unwrap().duration, 45);
        // "homework" contains "work".
        assert_eq!(predict("homework").unwrap().energy, 20);
    }

    #[test]
    fn unknown_title() {
        assert_eq!(predict("pay taxes"), None);
    }

    #[test]
    fn resolve_prefers_explicit_values() {
        let p = resolve("gym", Some(30), None);
        assert_eq!(p, Prediction { duration: 30, energy: 15 });

        let p = resolve("pay taxes", None, Some(5));
        assert_eq!(p, Prediction { duration: 30, energy: 5 });

        let p = resolve("pay taxes", None, None);
        assert_eq!(p, Prediction { duration: 60, energy: 10 });
    }

    #[test]
    fn default_duration_saturates() {
        assert_eq!(default_duration(u32::MAX), u32::MAX);
    }
}
