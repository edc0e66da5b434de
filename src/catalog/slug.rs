/// URL slug: lowercase, whitespace runs become `-`, anything outside
/// `[A-Za-z0-9_-]` is dropped.
pub fn slugify(text: &str) -> String {
    let lowered = text.to_lowercase();
    let mut slug = String::with_capacity(lowered.len());
    let mut in_whitespace = false;

    for c in lowered.chars() {
        if c.is_whitespace() {
            if !in_whitespace {
                slug.push('-');
            }
            in_whitespace = true;
            continue;
        }
        in_whitespace = false;
        if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
            slug.push(c);
        }
    }

    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowercases_and_hyphenates() {
        assert_eq!(slugify("My Great Store"), "my-great-store");
        assert_eq!(slugify("Tabs\tand  spaces"), "tabs-and-spaces");
    }

    #[test]
    fn drops_punctuation_but_keeps_word_chars() {
        assert_eq!(slugify("Rock & Roll!"), "rock--roll");
        assert_eq!(slugify("snake_case-ok"), "snake_case-ok");
        assert_eq!(slugify("Café"), "caf");
    }

    #[test]
    fn empty_input_gives_empty_slug() {
        assert_eq!(slugify(""), "");
        assert_eq!(slugify("   "), "-");
    }
}
