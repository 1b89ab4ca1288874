//! Letter grades assigned to a requirement against one criterion.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ReqcheckError;

/// Quality grade, `A` best and `F` worst.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Grade {
    A,
    B,
    C,
    D,
    E,
    F,
}

impl Grade {
    /// Default failing threshold: everything below `D` fails.
    pub const DEFAULT_THRESHOLD: Grade = Grade::D;

    pub fn letter(self) -> char {
        match self {
            Grade::A => 'A',
            Grade::B => 'B',
            Grade::C => 'C',
            Grade::D => 'D',
            Grade::E => 'E',
            Grade::F => 'F',
        }
    }

    /// True when this grade is strictly worse than `threshold`.
    pub fn is_failing(self, threshold: Grade) -> bool {
        self > threshold
    }

    /// Normalise a loosely formatted grade (`" b+ "`, `"\"C\""`, `"d-"`).
    pub fn normalize(raw: &str) -> Option<Grade> {
        let cleaned = raw.trim().trim_matches(|c| c == '"' || c == '\'').trim();
        let mut chars = cleaned.chars();
        let grade = match chars.next()?.to_ascii_uppercase() {
            'A' => Grade::A,
            'B' => Grade::B,
            'C' => Grade::C,
            'D' => Grade::D,
            'E' => Grade::E,
            'F' => Grade::F,
            _ => return None,
        };
        if chars.all(|c| c == '+' || c == '-') {
            Some(grade)
        } else {
            None
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

impl FromStr for Grade {
    type Err = ReqcheckError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Grade::normalize(s).ok_or_else(|| ReqcheckError::Schema(format!("invalid grade: {s:?}")))
    }
}

impl Serialize for Grade {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Grade {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Grade::normalize(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid grade: {raw:?}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn below_d_is_failing() {
        let t = Grade::DEFAULT_THRESHOLD;
        assert!(!Grade::A.is_failing(t));
        assert!(!Grade::D.is_failing(t));
        assert!(Grade::E.is_failing(t));
        assert!(Grade::F.is_failing(t));
    }

    #[test]
    fn custom_threshold() {
        assert!(Grade::C.is_failing(Grade::B));
        assert!(!Grade::B.is_failing(Grade::B));
    }

    #[test]
    fn normalizes_loose_input() {
        assert_eq!(Grade::normalize(" b+ "), Some(Grade::B));
        assert_eq!(Grade::normalize("\"E\""), Some(Grade::E));
        assert_eq!(Grade::normalize("c-"), Some(Grade::C));
        assert_eq!(Grade::normalize("A"), Some(Grade::A));
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(Grade::normalize(""), None);
        assert_eq!(Grade::normalize("G"), None);
        assert_eq!(Grade::normalize("Bad"), None);
        assert!("excellent".parse::<Grade>().is_err());
    }

    #[test]
    fn serializes_as_letter() {
        assert_eq!(serde_json::to_string(&Grade::E).unwrap(), "\"E\"");
        let g: Grade = serde_json::from_str("\"f\"").unwrap();
        assert_eq!(g, Grade::F);
        assert!(serde_json::from_str::<Grade>("\"Z\"").is_err());
    }
}
