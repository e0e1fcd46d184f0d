//! URL slug generation, also registered as the `slugify` template function.

/// Turn arbitrary text into a URL slug.
///
/// Latin-1 accented letters are folded to ASCII (`é` → `e`, `æ` → `ae`,
/// `ß` → `sz`), every run of characters outside `[0-9a-z]` and `extra`
/// becomes a single `separator`, separators are trimmed from both ends and
/// the result is lower-cased.
///
/// ```
/// use trellis::slug::slugify;
///
/// assert_eq!(slugify("Crème Brûlée!", "-", ""), "creme-brulee");
/// assert_eq!(slugify("v1.2 release", "-", "."), "v1.2-release");
/// ```
#[must_use]
pub fn slugify(input: &str, separator: &str, extra: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut pending_separator = false;

    let push = |out: &mut String, piece: &str, pending: &mut bool| {
        if *pending && !out.is_empty() {
            out.push_str(separator);
        }
        *pending = false;
        out.push_str(piece);
    };

    for ch in input.chars() {
        for lower in ch.to_lowercase() {
            if lower.is_ascii_alphanumeric() || extra.contains(ch) || extra.contains(lower) {
                let mut buf = [0u8; 4];
                push(&mut out, lower.encode_utf8(&mut buf), &mut pending_separator);
            } else if let Some(folded) = fold_latin1(lower) {
                push(&mut out, folded, &mut pending_separator);
            } else {
                pending_separator = true;
            }
        }
    }
    trim_separator(out, separator)
}

/// Strip `separator` from both ends, including copies kept through `extra`.
fn trim_separator(mut out: String, separator: &str) -> String {
    if separator.is_empty() {
        return out;
    }
    while out.ends_with(separator) {
        out.truncate(out.len() - separator.len());
    }
    let leading = out.len() - out.trim_start_matches(separator).len();
    out.replace_range(..leading, "");
    out
}

fn fold_latin1(c: char) -> Option<&'static str> {
    let folded = match c {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' => "a",
        'æ' => "ae",
        'ç' => "c",
        'è' | 'é' | 'ê' | 'ë' => "e",
        'ì' | 'í' | 'î' | 'ï' => "i",
        'ñ' => "n",
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' => "o",
        'œ' => "oe",
        'ß' => "sz",
        'þ' => "th",
        'ù' | 'ú' | 'û' | 'ü' => "u",
        'ý' | 'ÿ' => "y",
        _ => return None,
    };
    Some(folded)
}

#[cfg(test)]
mod tests {
    use super::slugify;

    #[test]
    fn test_basic_slug() {
        assert_eq!(slugify("Hello, World!", "-", ""), "hello-world");
    }

    #[test]
    fn test_accents_are_folded() {
        assert_eq!(slugify("Ça va très bien", "-", ""), "ca-va-tres-bien");
        assert_eq!(slugify("Œuvre façade", "_", ""), "oeuvre_facade");
    }

    #[test]
    fn test_separators_are_trimmed_and_collapsed() {
        assert_eq!(slugify("  --a   b--  ", "-", ""), "a-b");
        assert_eq!(slugify("!!!", "-", ""), "");
    }

    #[test]
    fn test_extra_characters_are_kept() {
        assert_eq!(slugify("file_name.TXT", "-", "._"), "file_name.txt");
    }

    #[test]
    fn test_separator_listed_in_extra_is_still_trimmed() {
        assert_eq!(slugify("a-", "-", "-"), "a");
        assert_eq!(slugify("--a-b--", "-", "-"), "a-b");
    }

    #[test]
    fn test_unknown_scripts_become_separators() {
        assert_eq!(slugify("abc日本def", "-", ""), "abc-def");
    }
}
