//! Natural ordering of strings
//!
//! Strings are compared in alternating runs: text runs compare as plain
//! text, digit runs compare by numeric value. `file2` sorts before `file10`.

use std::cmp::Ordering;

/// Compares two strings in natural order
///
/// Runs of ASCII digits are compared by magnitude, with no upper bound on
/// their length. Runs of equal magnitude but different length (`7` and
/// `007`) are ordered by length, the shorter one first. A string that has
/// no digits left sorts after a string whose text up to its next number is
/// the same. Two strings compare equal only when they are identical.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let (mut rest_a, mut rest_b) = (a, b);

    loop {
        let digit_a = rest_a.find(|c: char| c.is_ascii_digit());
        let digit_b = rest_b.find(|c: char| c.is_ascii_digit());

        let (pos_a, pos_b) = match (digit_a, digit_b) {
            (None, None) => return rest_a.cmp(rest_b),
            (None, Some(pos_b)) => {
                return rest_a.cmp(&rest_b[..pos_b]).then(Ordering::Greater);
            }
            (Some(pos_a), None) => {
                return rest_a[..pos_a].cmp(rest_b).then(Ordering::Less);
            }
            (Some(pos_a), Some(pos_b)) => (pos_a, pos_b),
        };

        let ordering = rest_a[..pos_a].cmp(&rest_b[..pos_b]);
        if ordering != Ordering::Equal {
            return ordering;
        }

        let (number_a, tail_a) = split_digits(&rest_a[pos_a..]);
        let (number_b, tail_b) = split_digits(&rest_b[pos_b..]);

        let ordering = compare_magnitude(number_a, number_b)
            .then_with(|| number_a.len().cmp(&number_b.len()));
        if ordering != Ordering::Equal {
            return ordering;
        }

        rest_a = tail_a;
        rest_b = tail_b;
    }
}

/// Returns true when `a` sorts strictly before `b` in natural order
pub fn natural_less(a: &str, b: &str) -> bool {
    natural_cmp(a, b) == Ordering::Less
}

/// Splits a string that starts with a digit into the digit run and the rest
fn split_digits(s: &str) -> (&str, &str) {
    let end = s
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(s.len());
    s.split_at(end)
}

/// Compares two digit runs by numeric value
fn compare_magnitude(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    // Without leading zeros, more digits means a larger number
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}
