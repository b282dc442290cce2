//! URL-safe identifiers derived from display names.
//!
//! The canonical form is lowercase ASCII alphanumeric words joined by single
//! hyphens, with no leading or trailing hyphen. Latin letters with diacritics
//! are transliterated (`"Tokaj Aszú"` → `"tokaj-aszu"`), other non-ASCII
//! characters are dropped. Whitespace, hyphens and underscores separate words;
//! remaining punctuation is removed without splitting (`"don't"` → `"dont"`).

/// Derive a slug from `name`.
///
/// Pure and deterministic. Returns an empty string when `name` contains
/// nothing sluggable; callers decide whether that is acceptable.
pub fn generate(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_separator = false;

    for ch in name.chars() {
        if ch.is_whitespace() || ch == '-' || ch == '_' {
            pending_separator = true;
            continue;
        }

        for lower in ch.to_lowercase() {
            let folded = match lower {
                'a'..='z' | '0'..='9' => Some(Folded::Char(lower)),
                '@' => Some(Folded::Str("at")),
                _ if lower.is_ascii() => None,
                _ => transliterate(lower).map(Folded::Str),
            };

            let Some(folded) = folded else { continue };

            if pending_separator && !slug.is_empty() {
                slug.push('-');
            }
            pending_separator = false;

            match folded {
                Folded::Char(c) => slug.push(c),
                Folded::Str(s) => slug.push_str(s),
            }
        }
    }

    slug
}

/// Whether `candidate` is already in canonical slug form.
pub fn is_canonical(candidate: &str) -> bool {
    !candidate.is_empty()
        && !candidate.starts_with('-')
        && !candidate.ends_with('-')
        && !candidate.contains("--")
        && candidate
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

enum Folded {
    Char(char),
    Str(&'static str),
}

fn transliterate(ch: char) -> Option<&'static str> {
    let ascii = match ch {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' | 'ā' | 'ă' | 'ą' => "a",
        'æ' => "ae",
        'ç' | 'ć' | 'č' | 'ĉ' | 'ċ' => "c",
        'ď' | 'đ' | 'ð' => "d",
        'è' | 'é' | 'ê' | 'ë' | 'ē' | 'ė' | 'ę' | 'ě' => "e",
        'ğ' | 'ģ' => "g",
        'ì' | 'í' | 'î' | 'ï' | 'ī' | 'į' | 'ı' => "i",
        'ķ' => "k",
        'ł' | 'ľ' | 'ĺ' | 'ļ' => "l",
        'ñ' | 'ń' | 'ň' | 'ņ' => "n",
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' | 'ō' | 'ő' => "o",
        'œ' => "oe",
        'ŕ' | 'ř' => "r",
        'ś' | 'š' | 'ş' | 'ș' => "s",
        'ß' => "ss",
        'ť' | 'ţ' | 'ț' => "t",
        'þ' => "th",
        'ù' | 'ú' | 'û' | 'ü' | 'ū' | 'ů' | 'ű' | 'ų' => "u",
        'ý' | 'ÿ' => "y",
        'ź' | 'ż' | 'ž' => "z",
        _ => return None,
    };
    Some(ascii)
}
