use std::fmt;
use super::expression::{Expression, ExpressionTree};
use super::predicate::{Param, typed_list};

#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct Action {
    pub name: String,
    pub parameters: Vec<Param>,
    pub preconditions: ExpressionTree,
    pub effects: ExpressionTree,
}

#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct DurativeAction {
    pub name: String,
    pub parameters: Vec<Param>,
    /// Normalized `:duration` form, e.g. `(= ?duration 5)`. Empty when not declared.
    pub duration: String,
    pub at_start_requirements: ExpressionTree,
    pub over_all_requirements: ExpressionTree,
    pub at_end_requirements: ExpressionTree,
    pub at_start_effects: ExpressionTree,
    pub at_end_effects: ExpressionTree,
}

/// Temporal phase wrapper of a durative action body item, `(at start ...)` and friends.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TimeSpec {
    AtStart,
    OverAll,
    AtEnd,
}

impl TimeSpec {
    pub fn from_words(first: &str, second: &str) -> Option<Self> {
        match (first.to_lowercase().as_str(), second.to_lowercase().as_str()) {
            ("at", "start") => Some(TimeSpec::AtStart),
            ("over", "all") => Some(TimeSpec::OverAll),
            ("at", "end") => Some(TimeSpec::AtEnd),
            _ => None,
        }
    }
}

impl fmt::Display for TimeSpec {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TimeSpec::AtStart => write!(f, "at start"),
            TimeSpec::OverAll => write!(f, "over all"),
            TimeSpec::AtEnd => write!(f, "at end"),
        }
    }
}

fn timed_body(phases: &[(TimeSpec, &ExpressionTree)]) -> String {
    let mut items = String::new();
    for (phase, tree) in phases {
        match &tree.root {
            Some(Expression::And(v)) => v.iter().for_each(|e| items += &format!("({} {})", phase, e)),
            Some(e) => items += &format!("({} {})", phase, e),
            None => (),
        }
    }
    format!("(and {})", items)
}

impl DurativeAction {
    pub fn condition(&self) -> String {
        timed_body(&[
            (TimeSpec::AtStart, &self.at_start_requirements),
            (TimeSpec::OverAll, &self.over_all_requirements),
            (TimeSpec::AtEnd, &self.at_end_requirements),
        ])
    }

    pub fn effect(&self) -> String {
        timed_body(&[
            (TimeSpec::AtStart, &self.at_start_effects),
            (TimeSpec::AtEnd, &self.at_end_effects),
        ])
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "(:action {}", self.name)?;
        writeln!(f, "    :parameters ({})", typed_list(&self.parameters))?;
        if !self.preconditions.is_empty() {
            writeln!(f, "    :precondition {}", self.preconditions)?;
        }
        if !self.effects.is_empty() {
            writeln!(f, "    :effect {}", self.effects)?;
        }
        write!(f, ")")
    }
}

impl fmt::Display for DurativeAction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "(:durative-action {}", self.name)?;
        writeln!(f, "    :parameters ({})", typed_list(&self.parameters))?;
        if !self.duration.is_empty() {
            writeln!(f, "    :duration {}", self.duration)?;
        }
        writeln!(f, "    :condition {}", self.condition())?;
        writeln!(f, "    :effect {}", self.effect())?;
        write!(f, ")")
    }
}
