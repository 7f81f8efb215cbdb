//! Stochastic L-System grammar: production rules, their text format and the
//! string rewriter.
//!
//! # Text format
//!
//! One rule per line, `predecessor=successor[,probability]`. Whitespace is
//! ignored. Both sides may only contain uppercase letters, the six rotation
//! symbols `+ - / \ & ^` and brackets. A missing probability means `1.0`; any
//! other value is clamped to `[0, 1]`.
//!
//! ```text
//! A=[+FA][-FA]
//! A=[&FA],0.4
//! ```

use crate::error::GrammarError;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::warn;

/// Rotation symbols understood by the growth turtle.
pub const ROTATION_SYMBOLS: [char; 6] = ['+', '-', '/', '\\', '&', '^'];

/// A single `(predecessor, successor, probability)` substitution.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProductionRule {
    /// The symbols to be replaced. May be longer than one character.
    pub predecessor: String,
    /// The replacement text.
    pub successor: String,
    /// Chance that a matching predecessor is replaced, in `[0, 1]`.
    pub probability: f32,
}

impl ProductionRule {
    /// Creates a rule, clamping `probability` into `[0, 1]`.
    pub fn new(
        predecessor: impl Into<String>,
        successor: impl Into<String>,
        probability: f32,
    ) -> Self {
        Self {
            predecessor: predecessor.into(),
            successor: successor.into(),
            probability: clamp_probability(probability),
        }
    }

    /// Creates a rule that always fires.
    pub fn deterministic(predecessor: impl Into<String>, successor: impl Into<String>) -> Self {
        Self::new(predecessor, successor, 1.0)
    }

    /// Number of branches the successor introduces.
    pub fn new_branches(&self) -> usize {
        count_branches(&self.successor)
    }

    fn fires<R: Rng>(&self, rng: &mut R) -> bool {
        // Certain rules never consume a draw.
        self.probability >= 1.0 || rng.random::<f32>() < self.probability
    }
}

fn clamp_probability(p: f32) -> f32 {
    if p.is_nan() { 0.0 } else { p.clamp(0.0, 1.0) }
}

fn is_grammar_symbol(c: char) -> bool {
    c.is_ascii_uppercase() || ROTATION_SYMBOLS.contains(&c) || c == '[' || c == ']'
}

fn validate(text: &str, part: &'static str) -> Result<(), GrammarError> {
    match text.chars().find(|c| !is_grammar_symbol(*c)) {
        Some(symbol) => Err(GrammarError::InvalidSymbol { symbol, part }),
        None => Ok(()),
    }
}

impl FromStr for ProductionRule {
    type Err = GrammarError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line: String = line.chars().filter(|c| !c.is_whitespace()).collect();

        let (predecessor, rest) = line
            .split_once('=')
            .ok_or(GrammarError::MissingSeparator)?;
        let (successor, probability) = match rest.split_once(',') {
            Some((successor, probability)) => (successor, Some(probability)),
            None => (rest, None),
        };

        if predecessor.is_empty() {
            return Err(GrammarError::EmptyPredecessor);
        }
        if successor.is_empty() {
            return Err(GrammarError::EmptySuccessor);
        }
        validate(predecessor, "predecessor")?;
        validate(successor, "successor")?;

        let probability = match probability {
            Some(text) => text
                .parse::<f32>()
                .map_err(|_| GrammarError::InvalidProbability(text.to_string()))?,
            None => 1.0,
        };

        Ok(Self::new(predecessor, successor, probability))
    }
}

/// Parses one rule per line, skipping (and logging) malformed lines.
///
/// Blank lines are ignored silently.
pub fn parse_rules(text: &str) -> Vec<ProductionRule> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .filter_map(|(n, line)| match line.parse::<ProductionRule>() {
            Ok(rule) => Some(rule),
            Err(e) => {
                warn!(line_number = n + 1, "skipping grammar line {line:?}: {e}");
                None
            }
        })
        .collect()
}

/// Parses a grammar file whose first line is the axiom and whose remaining
/// lines are production rules.
///
/// `=` and `,` are stripped from the axiom line and the axiom is
/// bracket-wrapped when necessary.
pub fn parse_grammar(text: &str) -> (String, Vec<ProductionRule>) {
    let mut lines = text.splitn(2, '\n');
    let axiom: String = lines
        .next()
        .unwrap_or_default()
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '=' && *c != ',')
        .collect();
    let rules = parse_rules(lines.next().unwrap_or_default());
    (wrap_axiom(&axiom), rules)
}

/// Wraps an axiom in brackets unless it already opens a branch, so the whole
/// plant always starts as one root branch.
pub fn wrap_axiom(axiom: &str) -> String {
    if axiom.starts_with('[') {
        axiom.to_string()
    } else {
        format!("[{axiom}]")
    }
}

/// Counts the `[` tokens in `s`.
pub fn count_branches(s: &str) -> usize {
    s.bytes().filter(|&b| b == b'[').count()
}

/// `count` new branches must be inserted at branch index `position`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BranchInsertion {
    pub count: usize,
    pub position: usize,
}

/// The output of one generation of rewriting.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Rewrite {
    /// The rewritten symbol string.
    pub string: String,
    /// Where new branch records belong, in application order.
    pub insertions: Vec<BranchInsertion>,
    /// Number of predecessors replaced this generation.
    pub substitutions: usize,
}

impl Rewrite {
    /// Total number of branches introduced by this generation.
    pub fn new_branches(&self) -> usize {
        self.insertions.iter().map(|i| i.count).sum()
    }
}

/// Applies one generation of `rules` to `current`.
///
/// Scans left to right. At each position the first rule (in declaration order)
/// whose predecessor matches is the only candidate; if its probability draw
/// fails the character is copied unchanged. Replaced predecessors are consumed
/// whole. Insertion positions are the number of `[` already emitted, so new
/// branches land after every branch that precedes them in the output.
pub fn rewrite<R: Rng>(current: &str, rules: &[ProductionRule], rng: &mut R) -> Rewrite {
    let mut out = Rewrite {
        string: String::with_capacity(current.len() * 2),
        ..Default::default()
    };
    let mut emitted_branches = 0;
    let mut i = 0;

    while i < current.len() {
        let rest = &current[i..];
        let candidate = rules
            .iter()
            .find(|r| !r.predecessor.is_empty() && rest.starts_with(r.predecessor.as_str()));

        match candidate {
            Some(rule) if rule.fires(rng) => {
                let count = rule.new_branches();
                if count > 0 {
                    out.insertions.push(BranchInsertion {
                        count,
                        position: emitted_branches,
                    });
                }
                out.string.push_str(&rule.successor);
                emitted_branches += count;
                out.substitutions += 1;
                i += rule.predecessor.len();
            }
            _ => {
                let Some(c) = rest.chars().next() else { break };
                out.string.push(c);
                if c == '[' {
                    emitted_branches += 1;
                }
                i += c.len_utf8();
            }
        }
    }

    out
}
