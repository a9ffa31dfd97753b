//! Birth/survival rulestring parsing module.
//!
//! Rulestrings follow the `B<digits>/S<digits>` notation of Life-like automata: `B3/S1234` means a
//! dead cell with exactly three alive neighbors is born, and an alive cell with one to four alive
//! neighbors survives. Digits may come in any order and may repeat.

use std::{collections::BTreeSet, fmt, str::FromStr};

use color_eyre::{
    eyre::{bail, eyre, OptionExt as _},
    Report,
};
use log::warn;

/// Parsed birth and survival conditions.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Rules {
    /// Alive neighbor counts that bring a dead cell to life.
    born: BTreeSet<usize>,
    /// Alive neighbor counts that keep an alive cell alive.
    survive: BTreeSet<usize>,
}

impl Rules {
    /// Parses a rulestring, falling back to empty rules when it is malformed.
    ///
    /// Empty rules kill every cell on the next generation. The failure is logged as a warning rather
    /// than returned, so a bad rulestring degrades the automaton instead of aborting it.
    #[must_use]
    pub fn parse_lenient(rulestring: &str) -> Self {
        rulestring.parse().unwrap_or_else(|err: Report| {
            warn!("ignoring rulestring {rulestring:?}: {err}");
            Self::default()
        })
    }

    /// Returns the neighbor counts that bring a dead cell to life.
    #[must_use]
    pub const fn born(&self) -> &BTreeSet<usize> {
        &self.born
    }

    /// Returns the neighbor counts that keep an alive cell alive.
    #[must_use]
    pub const fn survive(&self) -> &BTreeSet<usize> {
        &self.survive
    }

    /// Returns whether a cell is alive in the next generation.
    #[must_use]
    pub fn next_state(&self, alive: bool, alive_neighbors: usize) -> bool {
        if alive {
            self.survive.contains(&alive_neighbors)
        } else {
            self.born.contains(&alive_neighbors)
        }
    }
}

/// Parses the digits following a rule letter into a set of neighbor counts.
fn parse_counts(digits: &str) -> Result<BTreeSet<usize>, Report> {
    digits
        .chars()
        .map(|digit| {
            digit
                .to_digit(10)
                .and_then(|count| usize::try_from(count).ok())
                .ok_or_else(|| eyre!("{digit:?} is not a neighbor count digit"))
        })
        .collect()
}

impl FromStr for Rules {
    type Err = Report;

    fn from_str(rulestring: &str) -> Result<Self, Self::Err> {
        let Some((first, second)) = rulestring.trim().split_once('/') else {
            bail!("rulestring {rulestring:?} is missing the '/' separator");
        };

        let mut born = None;
        let mut survive = None;
        for part in [first, second] {
            let mut chars = part.chars();
            let slot = match chars.next().map(|letter| letter.to_ascii_uppercase()) {
                Some('B') => &mut born,
                Some('S') => &mut survive,
                _ => bail!("rule {part:?} must start with 'B' or 'S'"),
            };
            if slot.is_some() {
                bail!("rulestring {rulestring:?} repeats the rule {part:?}");
            }
            *slot = Some(parse_counts(chars.as_str())?);
        }

        Ok(Self {
            born: born.ok_or_eyre("rulestring has no birth rule")?,
            survive: survive.ok_or_eyre("rulestring has no survival rule")?,
        })
    }
}

impl fmt::Display for Rules {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "B")?;
        for count in &self.born {
            write!(formatter, "{count}")?;
        }
        write!(formatter, "/S")?;
        for count in &self.survive {
            write!(formatter, "{count}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Collects counts into a set for comparisons.
    fn set(counts: &[usize]) -> BTreeSet<usize> {
        counts.iter().copied().collect()
    }

    #[test]
    fn test_parse_maze_rule() {
        let rules: Rules = "B3/S1234".parse().expect("valid rulestring");

        assert_eq!(rules.born(), &set(&[3]));
        assert_eq!(rules.survive(), &set(&[1, 2, 3, 4]));
    }

    #[test]
    fn test_parse_is_order_independent_and_ignores_duplicates() {
        let rules: Rules = "S3221/B33".parse().expect("valid rulestring");

        assert_eq!(rules.born(), &set(&[3]));
        assert_eq!(rules.survive(), &set(&[1, 2, 3]));
        assert_eq!(rules.to_string(), "B3/S123");
    }

    #[test]
    fn test_parse_empty_counts() {
        let rules: Rules = "B/S".parse().expect("valid rulestring");

        assert!(rules.born().is_empty());
        assert!(rules.survive().is_empty());
    }

    #[test]
    fn test_parse_lowercase_and_whitespace() {
        let rules: Rules = " b36/s23 ".parse().expect("valid rulestring");

        assert_eq!(rules.to_string(), "B36/S23");
    }

    #[test]
    fn test_strict_parse_rejects_malformed_input() {
        for rulestring in ["B3S23", "B3/X23", "B3/S2a", "B3/B3", "", "/"] {
            assert!(
                rulestring.parse::<Rules>().is_err(),
                "{rulestring:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_lenient_parse_degenerates_to_empty_rules() {
        let rules = Rules::parse_lenient("B3S23");

        assert_eq!(rules, Rules::default());
        assert!(!rules.next_state(true, 2));
        assert!(!rules.next_state(false, 3));
    }

    #[test]
    fn test_next_state() {
        let rules = Rules::parse_lenient("B3/S23");

        assert!(rules.next_state(false, 3));
        assert!(!rules.next_state(false, 2));
        assert!(rules.next_state(true, 2));
        assert!(rules.next_state(true, 3));
        assert!(!rules.next_state(true, 4));
        assert!(!rules.next_state(true, 0));
    }
}
