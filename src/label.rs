//! Evaluation of transition labels under partial valuations.

use std::fmt;
use std::ops::{BitAnd, BitOr, Not};

use hoa::{Aliases, ApIndex, Expr};

/// A truth value of Kleene's strong three-valued logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Ternary {
    False,
    Unknown,
    True,
}

impl From<bool> for Ternary {
    fn from(value: bool) -> Self {
        if value {
            Self::True
        } else {
            Self::False
        }
    }
}

impl Not for Ternary {
    type Output = Self;

    fn not(self) -> Self::Output {
        match self {
            Self::False => Self::True,
            Self::Unknown => Self::Unknown,
            Self::True => Self::False,
        }
    }
}

impl BitAnd for Ternary {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self::Output {
        match (self, rhs) {
            (Self::False, _) | (_, Self::False) => Self::False,
            (Self::Unknown, _) | (_, Self::Unknown) => Self::Unknown,
            (Self::True, Self::True) => Self::True,
        }
    }
}

impl BitOr for Ternary {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        !(!self & !rhs)
    }
}

impl fmt::Display for Ternary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let string = match self {
            Self::False => "false",
            Self::Unknown => "unknown",
            Self::True => "true",
        };
        write!(f, "{}", string)
    }
}

/// An assignment of truth values to some of the atomic propositions.
///
/// Bit `k` of the valuation gives the value of the `k`-th relevant proposition.
#[derive(Debug, Clone, Copy)]
pub struct PartialValuation<'a> {
    relevant: &'a [ApIndex],
    bits: u64,
}

impl<'a> PartialValuation<'a> {
    /// Creates a valuation over the given propositions, of which there may be at most 64.
    pub fn new(relevant: &'a [ApIndex], bits: u64) -> Self {
        assert!(relevant.len() <= 64, "too many relevant propositions");
        Self { relevant, bits }
    }

    /// The value of the given proposition, which is unknown if it is not relevant.
    pub fn value(&self, ap: ApIndex) -> Ternary {
        match self.relevant.iter().position(|&i| i == ap) {
            Some(k) => Ternary::from((self.bits >> k) & 1 == 1),
            None => Ternary::Unknown,
        }
    }
}

/// Evaluates a label under a partial valuation.
///
/// # Panics
///
/// Panics if the label references an undefined alias, or contains
/// a part of an acceptance condition.
pub fn evaluate(label: &Expr, aliases: &Aliases, valuation: &PartialValuation<'_>) -> Ternary {
    match label {
        Expr::Bool(b) => Ternary::from(*b),
        Expr::And(l, r) => evaluate(l, aliases, valuation) & evaluate(r, aliases, valuation),
        Expr::Or(l, r) => evaluate(l, aliases, valuation) | evaluate(r, aliases, valuation),
        Expr::Not(e) => !evaluate(e, aliases, valuation),
        Expr::Ap(i) => valuation.value(*i),
        Expr::Alias(name) => match aliases.lookup(name) {
            Some(expr) => evaluate(expr, aliases, valuation),
            None => panic!("undefined alias @{} in label", name),
        },
        Expr::Fin(_) | Expr::Inf(_) | Expr::Set(_) => {
            panic!("acceptance condition {} in label", label)
        }
    }
}
