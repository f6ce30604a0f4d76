pub fn separated_by<T, F>(
    out: &mut String,
    values: impl IntoIterator<Item = T>,
    mut f: F,
    separator: &str,
) where
    F: FnMut(&mut String, T),
{
    let mut len = out.len();
    for v in values {
        if out.len() > len {
            out.push_str(separator);
        }
        len = out.len();
        f(out, v);
    }
}

/// Largest char boundary of `value` not exceeding `index`.
pub fn char_boundary(value: &str, index: usize) -> usize {
    if index >= value.len() {
        return value.len();
    }
    (0..=index)
        .rev()
        .find(|i| value.is_char_boundary(*i))
        .unwrap_or_default()
}

#[macro_export]
macro_rules! truncate_long {
    ($query:expr) => {
        format_args!(
            "{}{}",
            &$query[..$crate::char_boundary(&$query, 497)].trim_end(),
            if $query.len() > 497 { "..." } else { "" },
        )
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn separated_by_skips_empty_entries() {
        let mut out = String::from("(");
        separated_by(
            &mut out,
            ["a", "", "b"],
            |out, v| out.push_str(v),
            ", ",
        );
        out.push(')');
        assert_eq!(out, "(a, b)");
    }

    #[test]
    fn truncate_long_keeps_char_boundaries() {
        let long = "é".repeat(300);
        let truncated = format!("{}", truncate_long!(long));
        assert!(truncated.ends_with("..."));
        assert!(truncated.len() <= 500);
        let short = "CREATE TABLE A";
        assert_eq!(format!("{}", truncate_long!(short)), "CREATE TABLE A");
    }
}
