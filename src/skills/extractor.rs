use super::taxonomy::{MatchStrategy, Taxonomy};

/// Canonical skills mentioned in `text`, in taxonomy order, each at most once.
pub fn extract_skills(text: &str) -> Vec<String> {
    Taxonomy::global().extract(text)
}

/// A posting counts as software work when it mentions at least one known skill.
pub fn is_software_job(text: &str) -> bool {
    Taxonomy::global().matches_any(text)
}

impl Taxonomy {
    pub fn extract(&self, text: &str) -> Vec<String> {
        let text = text.to_lowercase();
        let mut found: Vec<String> = Vec::new();

        for entry in self.entries() {
            if found.iter().any(|c| c == entry.canonical) {
                continue;
            }
            if variant_present(&text, &entry.variant, entry.strategy) {
                found.push(entry.canonical.to_string());
            }
        }
        found
    }

    pub fn matches_any(&self, text: &str) -> bool {
        let text = text.to_lowercase();
        self.entries()
            .iter()
            .any(|e| variant_present(&text, &e.variant, e.strategy))
    }
}

fn variant_present(text: &str, variant: &str, strategy: MatchStrategy) -> bool {
    match strategy {
        MatchStrategy::Contains => text.contains(variant),
        MatchStrategy::Bounded => has_bounded(text, variant),
    }
}

/// True when `variant` occurs with a delimiter on both sides.
///
/// Left of the match: start of text, whitespace, `/` or `(`.
/// Right of the match: end of text, whitespace, `/`, `)` or `,`.
/// This is a delimiter check rather than a tokenizer, so "go." at the end of
/// a sentence does not count.
fn has_bounded(text: &str, variant: &str) -> bool {
    text.match_indices(variant).any(|(start, m)| {
        let before = text[..start].chars().next_back();
        let after = text[start + m.len()..].chars().next();

        let left_ok = match before {
            None => true,
            Some(c) => c.is_whitespace() || c == '/' || c == '(',
        };
        let right_ok = match after {
            None => true,
            Some(c) => c.is_whitespace() || c == '/' || c == ')' || c == ',',
        };
        left_ok && right_ok
    })
}
