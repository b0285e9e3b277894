//! Number extraction from observed text

use serde::{Deserialize, Serialize};

/// The integer read from the observed text in one cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Observation {
    Value(i32),
    #[default]
    Absent,
}

impl Observation {
    pub fn value(self) -> Option<i32> {
        match self {
            Observation::Value(v) => Some(v),
            Observation::Absent => None,
        }
    }

    pub fn is_absent(self) -> bool {
        matches!(self, Observation::Absent)
    }
}

impl From<Option<i32>> for Observation {
    fn from(value: Option<i32>) -> Self {
        value.map_or(Observation::Absent, Observation::Value)
    }
}

/// Extract the first run of ASCII digits in `text`.
///
/// Signs are not recognised. A run that does not fit in an `i32` yields
/// [`Observation::Absent`].
pub fn extract_number(text: &str) -> Observation {
    let Some(start) = text.find(|c: char| c.is_ascii_digit()) else {
        return Observation::Absent;
    };

    let digits = &text[start..];
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());

    digits[..end].parse::<i32>().ok().into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_number() {
        assert_eq!(extract_number("102"), Observation::Value(102));
    }

    #[test]
    fn test_first_run_wins() {
        assert_eq!(extract_number("Gold: 1500 / 9999"), Observation::Value(1500));
        assert_eq!(extract_number("HP 0042"), Observation::Value(42));
    }

    #[test]
    fn test_no_digits() {
        assert_eq!(extract_number(""), Observation::Absent);
        assert_eq!(extract_number("loading..."), Observation::Absent);
    }

    #[test]
    fn test_sign_ignored() {
        assert_eq!(extract_number("-17"), Observation::Value(17));
    }

    #[test]
    fn test_overflow_is_absent() {
        assert_eq!(extract_number("2147483647"), Observation::Value(i32::MAX));
        assert_eq!(extract_number("2147483648"), Observation::Absent);
        assert_eq!(extract_number("99999999999999999999 5"), Observation::Absent);
    }

    #[test]
    fn test_non_ascii_digits_skipped() {
        // Arabic-Indic digits are not ASCII
        assert_eq!(extract_number("\u{0663}\u{0664} 7"), Observation::Value(7));
    }

    #[test]
    fn test_option_conversion() {
        assert_eq!(Observation::from(Some(3)).value(), Some(3));
        assert!(Observation::from(None).is_absent());
    }
}
