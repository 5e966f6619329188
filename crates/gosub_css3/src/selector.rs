//! Internal selector form the matcher works on.
//!
//! This is plain data: a [`SelectorList`] is an ordered choice of [`ComplexSelector`]s, which are
//! chains of [`CompoundSelector`]s joined by [`Combinator`]s. Each compound is a conjunction of
//! [`SimpleSelector`]s.

use core::fmt::{Display, Formatter};

/// Comma separated list of selectors, matching when any of them matches
#[derive(Debug, PartialEq, Clone, Default)]
pub struct SelectorList(pub Vec<ComplexSelector>);

impl SelectorList {
    pub fn iter(&self) -> std::slice::Iter<'_, ComplexSelector> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// One step in a complex selector: `unit` followed by `combinator` towards the next unit
#[derive(Debug, PartialEq, Clone)]
pub struct ChainLink {
    pub unit: CompoundSelector,
    pub combinator: Combinator,
}

/// `a > b c`: chain `[a >, b ' ']`, subject `c`
#[derive(Debug, PartialEq, Clone)]
pub struct ComplexSelector {
    /// Links from left to right
    pub chain: Vec<ChainLink>,
    /// The rightmost compound, which is matched against the element itself
    pub subject: CompoundSelector,
}

impl ComplexSelector {
    /// Selector consisting of only a compound
    pub fn compound(subject: CompoundSelector) -> Self {
        Self {
            chain: Vec::new(),
            subject,
        }
    }
}

/// All simple selectors must match
#[derive(Debug, PartialEq, Clone, Default)]
pub struct CompoundSelector(pub Vec<SimpleSelector>);

#[derive(Debug, PartialEq, Clone)]
pub enum SimpleSelector {
    Universal,
    Type(String),
    Id(String),
    Class(String),
    Attribute(AttributeSelector),
    PseudoClass(PseudoClassSelector),
    PseudoElement(String),
}

#[derive(Debug, PartialEq, Clone)]
pub struct AttributeSelector {
    pub name: String,
    pub operator: AttributeOperator,
    /// `None` for a presence test like `[hidden]`
    pub value: Option<String>,
    pub case: CaseSensitivity,
}

#[derive(Debug, PartialEq, Clone, Copy)]
pub enum AttributeOperator {
    /// `=`
    ExactEq,
    /// `~=`, whitespace separated token
    OneOf,
    /// `|=`, equal or followed by `-`
    HyphenOf,
    /// `^=`
    StartWith,
    /// `$=`
    EndWith,
    /// `*=`
    PartOf,
    /// Anything else. Matching against it is an error.
    Unknown,
}

#[derive(Debug, PartialEq, Clone, Copy, Default)]
pub enum CaseSensitivity {
    #[default]
    Unset,
    /// `i` flag
    Insensitive,
    /// `s` flag
    Sensitive,
}

#[derive(Debug, PartialEq, Clone)]
pub struct PseudoClassSelector {
    /// Lowercased name without the colon
    pub name: String,
    /// Raw text between the parentheses of a functional pseudo-class
    pub argument: Option<String>,
    /// Argument of `:not()`, `:is()` and `:where()`
    pub selectors: Option<Vec<CompoundSelector>>,
    /// Parsed `An+B` argument of the `:nth-*()` pseudo-classes
    pub nth: Option<(i32, i32)>,
}

#[derive(Debug, PartialEq, Clone, Copy)]
pub enum Combinator {
    /// `a b`
    Descendant,
    /// `a > b`
    Child,
    /// `a + b`
    AdjacentSibling,
    /// `a ~ b`
    GeneralSibling,
}

impl Display for Combinator {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Combinator::Descendant => write!(f, " "),
            Combinator::Child => write!(f, " > "),
            Combinator::AdjacentSibling => write!(f, " + "),
            Combinator::GeneralSibling => write!(f, " ~ "),
        }
    }
}

impl Display for AttributeOperator {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let op = match self {
            AttributeOperator::ExactEq => "=",
            AttributeOperator::OneOf => "~=",
            AttributeOperator::HyphenOf => "|=",
            AttributeOperator::StartWith => "^=",
            AttributeOperator::EndWith => "$=",
            AttributeOperator::PartOf => "*=",
            AttributeOperator::Unknown => "?=",
        };
        write!(f, "{op}")
    }
}

impl Display for SimpleSelector {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            SimpleSelector::Universal => write!(f, "*"),
            SimpleSelector::Type(name) => write!(f, "{name}"),
            SimpleSelector::Id(id) => write!(f, "#{id}"),
            SimpleSelector::Class(class) => write!(f, ".{class}"),
            SimpleSelector::Attribute(attr) => {
                write!(f, "[{}", attr.name)?;
                if let Some(value) = &attr.value {
                    write!(f, "{}\"{}\"", attr.operator, value)?;
                }
                match attr.case {
                    CaseSensitivity::Unset => {}
                    CaseSensitivity::Insensitive => write!(f, " i")?,
                    CaseSensitivity::Sensitive => write!(f, " s")?,
                }
                write!(f, "]")
            }
            SimpleSelector::PseudoClass(pseudo) => match &pseudo.argument {
                Some(arg) => write!(f, ":{}({})", pseudo.name, arg),
                None => write!(f, ":{}", pseudo.name),
            },
            SimpleSelector::PseudoElement(name) => write!(f, "::{name}"),
        }
    }
}

impl Display for CompoundSelector {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        self.0.iter().try_for_each(|simple| write!(f, "{simple}"))
    }
}

impl Display for ComplexSelector {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for link in &self.chain {
            write!(f, "{}{}", link.unit, link.combinator)?;
        }
        write!(f, "{}", self.subject)
    }
}

impl Display for SelectorList {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for (idx, selector) in self.0.iter().enumerate() {
            if idx > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{selector}")?;
        }
        Ok(())
    }
}
