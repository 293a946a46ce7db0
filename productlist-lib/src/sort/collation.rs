//! Locale-aware string collation.
//!
//! A small subset of the Unicode Collation Algorithm: a primary level that
//! folds case and common Latin diacritics (with German, Nordic, Spanish and
//! Turkish tailorings), a tertiary level where lowercase sorts before
//! uppercase, and finally code-point order so distinct strings never tie.

use std::cmp::Ordering;

/// Compares strings under a language's rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collator {
    language: String,
}

impl Default for Collator {
    fn default() -> Self {
        Self::new("en")
    }
}

impl Collator {
    /// Creates a collator for a locale tag such as `"de"`, `"sv-SE"` or `"en_US"`.
    ///
    /// Only the language subtag matters.
    pub fn new(locale: &str) -> Self {
        let language = locale
            .split(['-', '_'])
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();
        Self { language }
    }

    /// Returns the language subtag in use.
    pub fn language(&self) -> &str {
        &self.language
    }

    /// Compares two strings.
    ///
    /// # Example
    ///
    /// ```
    /// use std::cmp::Ordering;
    /// use productlist_lib::sort::Collator;
    ///
    /// let en = Collator::new("en");
    /// assert_eq!(en.compare("apple", "Banana"), Ordering::Less);
    /// assert_eq!(en.compare("a", "A"), Ordering::Less);
    /// assert_eq!(en.compare("éclair", "eclairs"), Ordering::Less);
    /// ```
    pub fn compare(&self, left: &str, right: &str) -> Ordering {
        self.primary_key(left)
            .cmp(&self.primary_key(right))
            .then_with(|| tertiary_key(left).cmp(&tertiary_key(right)))
            .then_with(|| left.cmp(right))
    }

    fn primary_key(&self, s: &str) -> Vec<u32> {
        s.chars()
            .flat_map(|ch| char_weights(ch, &self.language))
            .collect()
    }
}

/// Case marks per character: lowercase (and caseless) 0, uppercase 1.
fn tertiary_key(s: &str) -> Vec<u8> {
    s.chars().map(|ch| u8::from(ch.is_uppercase())).collect()
}

/// Primary weight of a letter. Leaves room below the next letter for
/// tailored letters that sort right after it.
fn weight(ch: char) -> u32 {
    u32::from(ch.to_lowercase().next().unwrap_or(ch)) << 8
}

fn char_weights(ch: char, language: &str) -> Vec<u32> {
    match language {
        "de" => match ch {
            'ä' | 'Ä' => vec![weight('a'), weight('e')],
            'ö' | 'Ö' => vec![weight('o'), weight('e')],
            'ü' | 'Ü' => vec![weight('u'), weight('e')],
            'ß' => vec![weight('s'), weight('s')],
            _ => vec![weight(strip_diacritic(ch))],
        },
        "sv" | "fi" => match ch {
            'å' | 'Å' => vec![weight('z') + 1],
            'ä' | 'Ä' => vec![weight('z') + 2],
            'ö' | 'Ö' => vec![weight('z') + 3],
            _ => vec![weight(strip_diacritic(ch))],
        },
        "es" => match ch {
            'ñ' | 'Ñ' => vec![weight('n') + 1],
            _ => vec![weight(strip_diacritic(ch))],
        },
        "tr" | "az" => match ch {
            // dotless ı and plain I sort between h and i
            'ı' | 'I' => vec![weight('h') + 1],
            'i' | 'İ' => vec![weight('i')],
            _ => vec![weight(strip_diacritic(ch))],
        },
        _ => vec![weight(strip_diacritic(ch))],
    }
}

/// Maps Latin-1 accented letters to their base letter, keeping case.
fn strip_diacritic(ch: char) -> char {
    let base = match ch.to_lowercase().next().unwrap_or(ch) {
        'à'..='å' | 'æ' => 'a',
        'ç' => 'c',
        'è'..='ë' => 'e',
        'ì'..='ï' => 'i',
        'ñ' => 'n',
        'ò'..='ö' | 'ø' => 'o',
        'ù'..='ü' => 'u',
        'ý' | 'ÿ' => 'y',
        _ => return ch,
    };
    if ch.is_uppercase() {
        base.to_ascii_uppercase()
    } else {
        base
    }
}
