use crate::levenshtein::levenshtein;

/// Distance below which a registered name is offered as a suggestion.
pub const SIMILAR_THRESHOLD: usize = 5;

/// Distance of a registered `name` from what the user `requested`.
///
/// A registered name that starts with the request is treated as an exact hit.
pub fn distance(requested: &str, name: &str) -> usize {
    if name.starts_with(requested) {
        0
    } else {
        levenshtein(requested, name)
    }
}

/// Registered names similar enough to `requested`, sorted and deduplicated.
pub fn similar<'a, I>(requested: &str, names: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut out: Vec<String> = names
        .into_iter()
        .filter(|name| distance(requested, name) < SIMILAR_THRESHOLD)
        .map(str::to_string)
        .collect();
    out.sort();
    out.dedup();
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_counts_as_zero() {
        assert_eq!(distance("ver", "version"), 0);
        assert_eq!(distance("", "anything"), 0);
        assert_eq!(distance("version", "ver"), 4);
    }

    #[test]
    fn close_names_are_sorted() {
        let names = ["status", "stash", "start", "build"];
        assert_eq!(
            similar("stat", names),
            vec!["start".to_string(), "stash".to_string(), "status".to_string()]
        );
    }

    #[test]
    fn threshold_is_exclusive() {
        // distance("abcde", "vwxyz") == 5
        assert!(similar("abcde", ["vwxyz"]).is_empty());
        // distance("abcd", "vwxy") == 4
        assert_eq!(similar("abcd", ["vwxy"]), vec!["vwxy".to_string()]);
    }

    #[test]
    fn duplicates_collapse() {
        assert_eq!(similar("hep", ["help", "help"]), vec!["help".to_string()]);
    }
}
