//! Peg name sequencing for continuous placement.

use once_cell::sync::Lazy;
use regex::Regex;

static TRAILING_NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(.*?)(\d+)$").unwrap());

/// Name following `name` in a placement sequence.
///
/// Only the trailing run of digits is incremented, keeping its zero padding
/// (`P09` → `P10`, `A1B2` → `A1B3`). A name without trailing digits gets `1`
/// appended.
pub fn next_peg_name(name: &str) -> String {
    match TRAILING_NUMBER.captures(name) {
        Some(caps) => {
            let prefix = &caps[1];
            let digits = &caps[2];
            match digits.parse::<u64>() {
                Ok(n) => format!("{}{:0width$}", prefix, n + 1, width = digits.len()),
                Err(_) => format!("{}1", name),
            }
        }
        None => format!("{}1", name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn increments_trailing_number() {
        assert_eq!(next_peg_name("P1"), "P2");
        assert_eq!(next_peg_name("P9"), "P10");
        assert_eq!(next_peg_name("BM007"), "BM008");
        assert_eq!(next_peg_name("A1B2"), "A1B3");
        assert_eq!(next_peg_name("42"), "43");
    }

    #[test]
    fn appends_when_no_number() {
        assert_eq!(next_peg_name("NE"), "NE1");
        assert_eq!(next_peg_name(""), "1");
    }
}
