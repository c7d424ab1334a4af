// Copyright (c) 2024-2025 Jesse Morgan / Morgan Forge
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Version values and version requirements.
//!
//! A [`Version`] is a dot-separated list of non-negative integers. Missing
//! trailing components compare as zero, so `1.2` and `1.2.0` are the same
//! version for ordering purposes.
//!
//! A [`VersionRequirement`] is a comma-separated list of clauses, all of which
//! must hold:
//!
//! ```
//! use bento_mirror::version::{Version, VersionRequirement};
//!
//! let req = VersionRequirement::parse("~> 5.0").unwrap();
//! assert!(req.satisfied_by(&Version::parse("5.9.9").unwrap()));
//! assert!(!req.satisfied_by(&Version::parse("6.0").unwrap()));
//! ```

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::error::VersionError;

/// A dotted numeric version such as `6.5` or `14.04`.
#[derive(Debug, Clone)]
pub struct Version {
    components: Vec<u64>,
    literal: String,
}

impl Version {
    /// Parse a dotted numeric version. Every segment must be non-empty and
    /// consist only of ASCII digits.
    pub fn parse(input: &str) -> Result<Self, VersionError> {
        let literal = input.trim();
        let malformed = || VersionError::MalformedVersion(input.to_string());

        if literal.is_empty() {
            return Err(malformed());
        }

        let components = literal
            .split('.')
            .map(|segment| {
                if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(malformed());
                }
                segment.parse::<u64>().map_err(|_| malformed())
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            components,
            literal: literal.to_string(),
        })
    }

    /// Numeric components, as written.
    pub fn components(&self) -> &[u64] {
        &self.components
    }

    /// Number of segments in the literal (`5.0.1` has three).
    pub fn segment_count(&self) -> usize {
        self.components.len()
    }

    /// Component-wise comparison, padding the shorter version with zeros.
    pub fn compare(&self, other: &Version) -> Ordering {
        let len = self.components.len().max(other.components.len());
        (0..len)
            .map(|i| {
                let a = self.components.get(i).copied().unwrap_or(0);
                let b = other.components.get(i).copied().unwrap_or(0);
                a.cmp(&b)
            })
            .find(|ord| *ord != Ordering::Equal)
            .unwrap_or(Ordering::Equal)
    }

    /// Exclusive upper bound for `~>`: drop the last explicit segment and
    /// increment the one before it. A single segment is incremented itself.
    fn pessimistic_bound(&self) -> Version {
        let mut components = if self.components.len() > 1 {
            self.components[..self.components.len() - 1].to_vec()
        } else {
            self.components.clone()
        };
        if let Some(last) = components.last_mut() {
            *last = last.saturating_add(1);
        }
        let literal = components
            .iter()
            .map(u64::to_string)
            .collect::<Vec<_>>()
            .join(".");
        Version { components, literal }
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.compare(other) == Ordering::Equal
    }
}

impl Eq for Version {}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.compare(other)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.literal)
    }
}

impl FromStr for Version {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Comparison operator of a single requirement clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    /// `=`
    Exact,
    /// `!=`
    NotEqual,
    /// `>`
    Greater,
    /// `<`
    Less,
    /// `>=`
    GreaterOrEqual,
    /// `<=`
    LessOrEqual,
    /// `~>`
    Pessimistic,
}

impl Operator {
    // Two-character operators first so `>=` is not read as `>`.
    const TOKENS: [(&'static str, Operator); 7] = [
        ("~>", Operator::Pessimistic),
        (">=", Operator::GreaterOrEqual),
        ("<=", Operator::LessOrEqual),
        ("!=", Operator::NotEqual),
        ("=", Operator::Exact),
        (">", Operator::Greater),
        ("<", Operator::Less),
    ];

    /// Split a leading operator off a clause. A clause without one is an
    /// exact match.
    fn split(clause: &str) -> (Operator, &str) {
        Self::TOKENS
            .iter()
            .find_map(|(token, op)| clause.strip_prefix(token).map(|rest| (*op, rest)))
            .unwrap_or((Operator::Exact, clause))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Exact => "=",
            Self::NotEqual => "!=",
            Self::Greater => ">",
            Self::Less => "<",
            Self::GreaterOrEqual => ">=",
            Self::LessOrEqual => "<=",
            Self::Pessimistic => "~>",
        }
    }
}

/// One `(operator, target)` clause.
#[derive(Debug, Clone)]
pub struct Clause {
    pub operator: Operator,
    pub target: Version,
}

impl Clause {
    pub fn satisfied_by(&self, version: &Version) -> bool {
        let target = &self.target;
        match self.operator {
            Operator::Exact => version == target,
            Operator::NotEqual => version != target,
            Operator::Greater => version > target,
            Operator::Less => version < target,
            Operator::GreaterOrEqual => version >= target,
            Operator::LessOrEqual => version <= target,
            Operator::Pessimistic => version >= target && *version < target.pessimistic_bound(),
        }
    }
}

impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.operator.as_str(), self.target)
    }
}

/// A conjunction of version clauses.
#[derive(Debug, Clone)]
pub struct VersionRequirement {
    clauses: Vec<Clause>,
}

impl VersionRequirement {
    /// Parse a constraint string such as `~> 6.0`, `>= 1, < 2` or `14.04`.
    ///
    /// A blank string yields the default requirement (`>= 0`).
    pub fn parse(constraint: &str) -> Result<Self, VersionError> {
        if constraint.trim().is_empty() {
            return Ok(Self::default());
        }

        let clauses = constraint
            .split(',')
            .map(|raw| {
                let clause = raw.trim();
                let malformed = || VersionError::MalformedConstraint {
                    constraint: constraint.to_string(),
                    clause: clause.to_string(),
                };
                if clause.is_empty() {
                    return Err(malformed());
                }
                let (operator, rest) = Operator::split(clause);
                let target = Version::parse(rest).map_err(|_| malformed())?;
                Ok(Clause { operator, target })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { clauses })
    }

    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    /// True iff `version` satisfies every clause.
    pub fn satisfied_by(&self, version: &Version) -> bool {
        self.clauses.iter().all(|clause| clause.satisfied_by(version))
    }
}

impl Default for VersionRequirement {
    fn default() -> Self {
        Self {
            clauses: vec![Clause {
                operator: Operator::GreaterOrEqual,
                target: Version {
                    components: vec![0],
                    literal: "0".to_string(),
                },
            }],
        }
    }
}

impl fmt::Display for VersionRequirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self.clauses.iter().map(Clause::to_string).collect();
        f.write_str(&rendered.join(", "))
    }
}

impl FromStr for VersionRequirement {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
