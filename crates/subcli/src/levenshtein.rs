/// Levenshtein distance between `s` and `t`.
///
/// Operates on bytes, so a multi-byte character counts as several edits.
pub fn levenshtein(s: &str, t: &str) -> usize {
    if s == t {
        return 0;
    }
    let (s, t) = (s.as_bytes(), t.as_bytes());
    if s.is_empty() {
        return t.len();
    }
    if t.is_empty() {
        return s.len();
    }

    let mut prev: Vec<usize> = (0..=t.len()).collect();
    let mut curr = vec![0usize; t.len() + 1];
    for (i, &sc) in s.iter().enumerate() {
        curr[0] = i + 1;
        for (j, &tc) in t.iter().enumerate() {
            let cost = usize::from(sc != tc);
            curr[j + 1] = (curr[j] + 1).min(prev[j + 1] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[t.len()]
}
