/// Token-overlap name comparison tolerant of middle names and ordering.
///
/// Both names are lower-cased and reduced to ASCII letters and spaces before splitting into
/// tokens, so accented letters are dropped rather than folded. Two tokens must overlap when
/// both names have several parts; a single shared token is enough when either side is a lone
/// name. Single-letter initials count as tokens.
pub fn is_name_match(left: &str, right: &str) -> bool {
    let left = name_tokens(left);
    let right = name_tokens(right);

    if left.is_empty() || right.is_empty() {
        return false;
    }

    let overlap = left.iter().filter(|token| right.contains(token)).count();
    let required = if left.len() == 1 || right.len() == 1 {
        1
    } else {
        2
    };

    overlap >= required
}

fn name_tokens(name: &str) -> Vec<String> {
    let cleaned: String = name
        .to_lowercase()
        .chars()
        .filter(|ch| ch.is_ascii_lowercase() || *ch == ' ')
        .collect();

    cleaned.split_whitespace().map(str::to_string).collect()
}
