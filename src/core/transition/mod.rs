pub mod arc_eager;
pub mod arc_standard;
pub mod label;
pub mod stack_projective;

use crate::core::config::Configuration;
use crate::core::error::PreconditionViolation;

/// The closed set of moves any transition system may admit. Not every system uses every
/// variant (arc-standard has no `Reduce`); a system's `possible` implementation is the
/// single source of truth for which variants it ever produces.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Transition {
    Shift,
    LeftArc(String),
    RightArc(String),
    Reduce,
}

impl Transition {
    /// Canonical descriptor text, e.g. `LEFT_ARC(nsubj)`. This is the string a
    /// `LabelNumberer` encodes/decodes and the form a transitions file persists, one per
    /// line.
    pub fn descriptor(&self) -> String {
        match self {
            Transition::Shift => "SHIFT".to_string(),
            Transition::LeftArc(label) => format!("LEFT_ARC({})", label),
            Transition::RightArc(label) => format!("RIGHT_ARC({})", label),
            Transition::Reduce => "REDUCE".to_string(),
        }
    }

    /// Parses a descriptor produced by `descriptor`. Used when reading a transitions
    /// file back into a `LabelNumberer`.
    pub fn parse_descriptor(text: &str) -> Option<Transition> {
        if text == "SHIFT" {
            Some(Transition::Shift)
        } else if text == "REDUCE" {
            Some(Transition::Reduce)
        } else if let Some(label) = strip_wrapped(text, "LEFT_ARC(", ")") {
            Some(Transition::LeftArc(label.to_string()))
        } else if let Some(label) = strip_wrapped(text, "RIGHT_ARC(", ")") {
            Some(Transition::RightArc(label.to_string()))
        } else {
            None
        }
    }
}

fn strip_wrapped<'a>(text: &'a str, prefix: &str, suffix: &str) -> Option<&'a str> {
    text.strip_prefix(prefix).and_then(|rest| rest.strip_suffix(suffix))
}

/// A transition system: the set of legal moves from a configuration, how to apply one,
/// and when a parse is done. Implemented by `arc_standard`, `arc_eager`, and
/// `stack_projective`.
pub trait TransitionSystem {
    /// All transitions whose preconditions currently hold, in an arbitrary but
    /// deterministic order (callers that need a specific priority re-rank via the
    /// guide's `LabelNumberer` ids, per the tie-breaking rule in the spec).
    fn possible(&self, config: &Configuration) -> Vec<Transition>;

    /// Applies `transition`, mutating `config`. Returns `PreconditionViolation` if
    /// `transition` was not actually legal -- a defensive check, not a normal control
    /// flow path, since `possible` should already have filtered it out upstream.
    fn apply(&self, transition: &Transition, config: &mut Configuration) -> Result<(), PreconditionViolation>;

    fn is_terminal(&self, config: &Configuration) -> bool;

    /// Returns the single transition that makes progress towards `gold_arcs` from the
    /// current configuration. Used by training and by test harnesses that replay a gold
    /// derivation; not exercised by the greedy inference parser.
    fn oracle(&self, config: &Configuration, gold_arcs: &[crate::core::config::Arc]) -> Option<Transition>;

    fn name(&self) -> &'static str;
}
