/// Lower-case ASCII slug used for team ids and match ids.
pub fn slugify(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut last_dash = true;
    for ch in value.chars() {
        let lower = ch.to_ascii_lowercase();
        if lower.is_ascii_alphanumeric() {
            out.push(lower);
            last_dash = false;
        } else if !last_dash {
            out.push('-');
            last_dash = true;
        }
    }
    while out.ends_with('-') {
        out.pop();
    }
    if out.is_empty() {
        out.push_str("item");
    }
    out
}

pub fn slugify_with_prefix(value: &str, prefix: &str) -> String {
    format!("{}-{}", prefix, slugify(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_collapses_non_alphanumerics() {
        assert_eq!(slugify("Test FC"), "test-fc");
        assert_eq!(slugify("  AIK / Solna  "), "aik-solna");
    }

    #[test]
    fn slugify_never_returns_empty() {
        assert_eq!(slugify("ÅÄÖ"), "item");
    }

    #[test]
    fn prefix_is_applied() {
        assert_eq!(slugify_with_prefix("Test FC", "t"), "t-test-fc");
    }
}
