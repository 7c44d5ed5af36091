//! Boolean expressions for labels and acceptance conditions.

use std::fmt;

use crate::{AccSet, ApIndex};

/// A node of a label or acceptance expression.
///
/// Labels only use [`Expr::Bool`], [`Expr::And`], [`Expr::Or`], [`Expr::Not`],
/// [`Expr::Ap`] and [`Expr::Alias`], while acceptance conditions use
/// [`Expr::Fin`], [`Expr::Inf`] and [`Expr::Set`] instead of propositions.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub enum Expr {
    /// The constant true or false.
    Bool(bool),
    /// Conjunction of two expressions.
    And(Box<Expr>, Box<Expr>),
    /// Disjunction of two expressions.
    Or(Box<Expr>, Box<Expr>),
    /// Negation of an expression.
    Not(Box<Expr>),
    /// Acceptance condition requiring that the acceptance set in the
    /// inner expression is only seen finitely often.
    Fin(Box<Expr>),
    /// Acceptance condition requiring that the acceptance set in the
    /// inner expression is seen infinitely often.
    Inf(Box<Expr>),
    /// Reference to an acceptance set.
    Set(AccSet),
    /// Reference to an atomic proposition.
    Ap(ApIndex),
    /// Reference to an alias by its name, without the leading `@`.
    Alias(String),
}

impl Expr {
    pub fn and(left: Self, right: Self) -> Self {
        Self::And(Box::new(left), Box::new(right))
    }

    pub fn or(left: Self, right: Self) -> Self {
        Self::Or(Box::new(left), Box::new(right))
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(inner: Self) -> Self {
        Self::Not(Box::new(inner))
    }

    pub fn fin(set: Self) -> Self {
        Self::Fin(Box::new(set))
    }

    pub fn inf(set: Self) -> Self {
        Self::Inf(Box::new(set))
    }

    pub fn alias<S: Into<String>>(name: S) -> Self {
        Self::Alias(name.into())
    }

    /// Returns the largest atomic proposition index occuring in
    /// the expression, without following aliases.
    pub fn max_ap(&self) -> Option<ApIndex> {
        match self {
            Self::Ap(i) => Some(*i),
            Self::And(l, r) | Self::Or(l, r) => l.max_ap().max(r.max_ap()),
            Self::Not(e) | Self::Fin(e) | Self::Inf(e) => e.max_ap(),
            Self::Bool(_) | Self::Set(_) | Self::Alias(_) => None,
        }
    }

    /// Returns the first alias name referenced in the expression
    /// for which the predicate holds.
    pub fn find_alias<P>(&self, predicate: &mut P) -> Option<&str>
    where
        P: FnMut(&str) -> bool,
    {
        match self {
            Self::Alias(name) if predicate(name) => Some(name.as_str()),
            Self::And(l, r) | Self::Or(l, r) => l
                .find_alias(predicate)
                .or_else(|| r.find_alias(predicate)),
            Self::Not(e) | Self::Fin(e) | Self::Inf(e) => e.find_alias(predicate),
            Self::Bool(_) | Self::Set(_) | Self::Ap(_) | Self::Alias(_) => None,
        }
    }

    /// Binding strength used to decide on parentheses when writing.
    fn precedence(&self) -> u8 {
        match self {
            Self::Or(_, _) => 0,
            Self::And(_, _) => 1,
            _ => 2,
        }
    }

    fn fmt_child(&self, f: &mut fmt::Formatter<'_>, min_precedence: u8) -> fmt::Result {
        if self.precedence() < min_precedence {
            write!(f, "({})", self)
        } else {
            write!(f, "{}", self)
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(true) => write!(f, "t"),
            Self::Bool(false) => write!(f, "f"),
            Self::And(l, r) => {
                l.fmt_child(f, 1)?;
                write!(f, " & ")?;
                r.fmt_child(f, 1)
            }
            Self::Or(l, r) => {
                l.fmt_child(f, 0)?;
                write!(f, " | ")?;
                r.fmt_child(f, 0)
            }
            Self::Not(e) => {
                write!(f, "!")?;
                e.fmt_child(f, 2)
            }
            Self::Fin(e) => write!(f, "Fin({})", e),
            Self::Inf(e) => write!(f, "Inf({})", e),
            Self::Set(i) | Self::Ap(i) => write!(f, "{}", i),
            Self::Alias(name) => write!(f, "@{}", name),
        }
    }
}
