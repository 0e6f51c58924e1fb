use std::collections::BTreeSet;

/// Outcome of resolving a selection expression against `n` candidates.
///
/// Display indices are 1-based; everything returned here is 0-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// The user typed `q` or `Q`.
    Abort,
    /// The user typed `0` on a prompt that accepts it.
    All(usize),
    /// Non-empty, ascending, deduplicated indices.
    Indices(Vec<usize>),
    /// Anything else. The caller re-prompts.
    Invalid,
}

impl Selection {
    /// Resolves `input` against `count` candidates.
    ///
    /// Tokens are comma-separated single numbers or inclusive `a-b` ranges.
    /// Validation is all-or-nothing: one malformed or out-of-range token
    /// rejects the whole expression. `allow_all` enables the bare `0`
    /// shorthand; without it `0` is just an out-of-range index.
    pub fn resolve(input: &str, count: usize, allow_all: bool) -> Self {
        let trimmed = input.trim();

        if trimmed.eq_ignore_ascii_case("q") {
            return Selection::Abort;
        }
        if allow_all && trimmed == "0" && count > 0 {
            return Selection::All(count);
        }

        match collect_indices(trimmed, count) {
            Some(indices) if !indices.is_empty() => {
                Selection::Indices(indices.into_iter().map(|i| i - 1).collect())
            }
            _ => Selection::Invalid,
        }
    }

    /// 0-based indices this selection stands for. Empty for `Abort` and `Invalid`.
    pub fn indices(&self) -> Vec<usize> {
        match self {
            Selection::All(count) => (0..*count).collect(),
            Selection::Indices(indices) => indices.clone(),
            Selection::Abort | Selection::Invalid => Vec::new(),
        }
    }

    /// Maps the selection onto `items`, preserving ascending order.
    pub fn pick<'a, T>(&self, items: &'a [T]) -> Vec<&'a T> {
        self.indices()
            .into_iter()
            .filter_map(|i| items.get(i))
            .collect()
    }

    pub fn is_invalid(&self) -> bool {
        matches!(self, Selection::Invalid)
    }
}

/// Expands every token into 1-based display indices, or `None` on the first bad token.
fn collect_indices(expression: &str, count: usize) -> Option<BTreeSet<usize>> {
    let mut selected = BTreeSet::new();

    for token in expression.split(',').map(str::trim) {
        let (start, end) = parse_token(token)?;
        if start > end || start < 1 || end > count {
            return None;
        }
        selected.extend(start..=end);
    }

    Some(selected)
}

/// Parses `a-b` or `a` into an inclusive pair.
fn parse_token(token: &str) -> Option<(usize, usize)> {
    if token.matches('-').count() == 1 {
        let (start, end) = token.split_once('-')?;
        let start = parse_number(start)?;
        let end = parse_number(end)?;
        return Some((start, end));
    }

    let value = parse_number(token)?;
    Some((value, value))
}

fn parse_number(text: &str) -> Option<usize> {
    let text = text.trim();
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    // Overflow lands here as well.
    text.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_selects_everything_when_allowed() {
        assert_eq!(Selection::resolve("0", 4, true), Selection::All(4));
        assert_eq!(Selection::resolve(" 0 ", 1, true).indices(), vec![0]);
        assert_eq!(Selection::resolve("0", 4, false), Selection::Invalid);
    }

    #[test]
    fn test_quit() {
        assert_eq!(Selection::resolve("q", 5, true), Selection::Abort);
        assert_eq!(Selection::resolve("Q", 5, false), Selection::Abort);
        assert_eq!(Selection::resolve("  q\n", 5, false), Selection::Abort);
        assert_eq!(Selection::resolve("quit", 5, false), Selection::Invalid);
    }

    #[test]
    fn test_single_numbers_and_ranges() {
        let cases = vec![
            ("1,3,5", vec![0, 2, 4]),
            ("2-4", vec![1, 2, 3]),
            ("1-3,1,2", vec![0, 1, 2]),
            ("5, 1", vec![0, 4]),
            ("3-3", vec![2]),
            (" 4 - 5 ,1", vec![0, 3, 4]),
        ];

        for (input, expected) in cases {
            assert_eq!(
                Selection::resolve(input, 5, true),
                Selection::Indices(expected),
                "input {:?}",
                input
            );
        }
    }

    #[test]
    fn test_rejects_whole_expression() {
        let cases = ["0-3", "5-2", "abc", "", "   ", "6", "1,6", "1,,2", "1-", "-3", "1-2-3", "+2", "2.0", "1,x"];

        for input in cases {
            assert_eq!(Selection::resolve(input, 5, true), Selection::Invalid, "input {:?}", input);
        }
    }

    #[test]
    fn test_overflow_is_invalid() {
        assert!(Selection::resolve("99999999999999999999999", 5, false).is_invalid());
        assert!(Selection::resolve("1-99999999999999999999999", 5, false).is_invalid());
    }

    #[test]
    fn test_huge_range_is_rejected_without_expanding() {
        assert!(Selection::resolve(&format!("1-{}", usize::MAX), 3, false).is_invalid());
    }

    #[test]
    fn test_pick_translates_to_items() {
        let items = ["a", "b", "c", "d"];
        let selection = Selection::resolve("4,2", items.len(), false);
        assert_eq!(selection.pick(&items), vec![&"b", &"d"]);

        assert!(Selection::Abort.pick(&items).is_empty());
        assert_eq!(Selection::All(4).pick(&items).len(), 4);
    }
}
