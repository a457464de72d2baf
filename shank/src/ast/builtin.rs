//! Signatures of the built-in functions

use serde::{Deserialize, Serialize};

/// Functions every program can call without defining them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Builtin {
    Read,
    Write,
    Left,
    Right,
    Substring,
    SquareRoot,
    GetRandom,
    IntegerToReal,
    RealToInteger,
    Start,
    End,
}

impl Builtin {
    /// Every built-in, in registration order
    pub const ALL: [Builtin; 11] = [
        Builtin::Read,
        Builtin::Write,
        Builtin::Left,
        Builtin::Right,
        Builtin::Substring,
        Builtin::SquareRoot,
        Builtin::GetRandom,
        Builtin::IntegerToReal,
        Builtin::RealToInteger,
        Builtin::Start,
        Builtin::End,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Builtin::Read => "Read",
            Builtin::Write => "Write",
            Builtin::Left => "Left",
            Builtin::Right => "Right",
            Builtin::Substring => "Substring",
            Builtin::SquareRoot => "SquareRoot",
            Builtin::GetRandom => "GetRandom",
            Builtin::IntegerToReal => "IntegerToReal",
            Builtin::RealToInteger => "RealToInteger",
            Builtin::Start => "Start",
            Builtin::End => "End",
        }
    }

    pub fn from_name(name: &str) -> Option<Builtin> {
        Self::ALL.into_iter().find(|b| b.name() == name)
    }

    /// Number of arguments, or `None` for the variadic `Read` and `Write`.
    pub fn arity(self) -> Option<usize> {
        match self {
            Builtin::Read | Builtin::Write => None,
            Builtin::GetRandom => Some(1),
            Builtin::SquareRoot
            | Builtin::IntegerToReal
            | Builtin::RealToInteger
            | Builtin::Start
            | Builtin::End => Some(2),
            Builtin::Left | Builtin::Right => Some(3),
            Builtin::Substring => Some(4),
        }
    }

    /// Whether argument `index` is an output the built-in writes to.
    pub fn is_output(self, index: usize) -> bool {
        match self {
            Builtin::Read => true,
            Builtin::Write => false,
            other => other.arity().is_some_and(|n| index + 1 == n),
        }
    }
}

impl std::fmt::Display for Builtin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_round_trip() {
        for builtin in Builtin::ALL {
            assert_eq!(Builtin::from_name(builtin.name()), Some(builtin));
        }
        assert_eq!(Builtin::from_name("write"), None);
    }

    #[test]
    fn test_output_positions() {
        assert!(Builtin::Read.is_output(0));
        assert!(Builtin::Read.is_output(5));
        assert!(!Builtin::Write.is_output(0));
        assert!(Builtin::Substring.is_output(3));
        assert!(!Builtin::Substring.is_output(2));
        assert!(Builtin::GetRandom.is_output(0));
        assert!(Builtin::End.is_output(1));
        assert!(!Builtin::End.is_output(0));
    }
}
