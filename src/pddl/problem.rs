use std::fmt;
use log::warn;
use serde::{Deserialize, Serialize};

use super::domain::Domain;
use super::expression::Goal;
use super::predicate::Predicate;
use super::utils::build_name_string;

pub const PROBLEM_NAME: &str = "problem_1";

#[derive(Clone, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Instance {
    pub name: String,
    pub kind: String,
}

impl Instance {
    pub fn new(name: &str, kind: &str) -> Self {
        Instance { name: name.to_owned(), kind: kind.to_owned() }
    }
}

/// Knowledge base of one planning session: typed instances, ground facts and a goal,
/// all validated against the borrowed domain.
///
/// Checks are check-then-act: a `Problem` shared between threads must sit behind a
/// single writer lock.
#[derive(Debug, Clone)]
pub struct Problem<'a> {
    domain: &'a Domain,
    instances: Vec<Instance>,
    predicates: Vec<Predicate>,
    goal: Goal,
}

impl<'a> Problem<'a> {
    pub fn new(domain: &'a Domain) -> Self {
        Self { domain, instances: Vec::new(), predicates: Vec::new(), goal: Goal::new() }
    }

    pub fn domain(&self) -> &'a Domain {
        self.domain
    }

    pub fn add_instance(&mut self, instance: Instance) -> bool {
        if self.get_instance(&instance.name).is_some() {
            warn!("Instance {} already exists", instance.name);
            false
        } else if !self.domain.has_type(&instance.kind) {
            warn!("Instance {} has unknown type {}", instance.name, instance.kind);
            false
        } else {
            self.instances.push(instance);
            true
        }
    }

    /// Facts that mention the instance are left in place.
    pub fn remove_instance(&mut self, name: &str) -> bool {
        match self.instances.iter().position(|i| i.name == name) {
            Some(idx) => { self.instances.remove(idx); true },
            None => false,
        }
    }

    pub fn get_instance(&self, name: &str) -> Option<Instance> {
        self.instances.iter().find(|i| i.name == name).cloned()
    }

    pub fn get_instances(&self) -> Vec<Instance> {
        self.instances.clone()
    }

    /// Accepts a fact of a declared predicate with the declared number of parameters
    /// that is not already known. Parameter types are not compared.
    pub fn add_predicate(&mut self, predicate: Predicate) -> bool {
        match self.domain.get_predicate(&predicate.name) {
            None => {
                warn!("Predicate {} is not declared in domain {}", predicate.name, self.domain.name());
                false
            }
            Some(signature) if signature.arity() != predicate.arity() => {
                warn!("Predicate {} takes {} parameters, got {}", predicate.name, signature.arity(), predicate.arity());
                false
            }
            Some(_) if self.exist_predicate(&predicate) => {
                warn!("Predicate {} already exists", predicate);
                false
            }
            Some(_) => {
                self.predicates.push(predicate);
                true
            }
        }
    }

    pub fn remove_predicate(&mut self, predicate: &Predicate) -> bool {
        match self.predicates.iter().position(|p| p.matches(predicate)) {
            Some(idx) => { self.predicates.remove(idx); true },
            None => false,
        }
    }

    pub fn exist_predicate(&self, predicate: &Predicate) -> bool {
        self.predicates.iter().any(|p| p.matches(predicate))
    }

    pub fn get_predicates(&self) -> Vec<Predicate> {
        self.predicates.clone()
    }

    pub fn set_goal(&mut self, goal: Goal) -> bool {
        self.goal = goal;
        true
    }

    pub fn get_goal(&self) -> &Goal {
        &self.goal
    }

    pub fn clear_goal(&mut self) -> bool {
        self.goal.clear();
        true
    }

    /// Drops instances, facts and goal, ready for the next planning episode.
    pub fn clear(&mut self) {
        self.instances.clear();
        self.predicates.clear();
        self.goal.clear();
    }

    /// Problem text for the planner. Spacing and tabs are part of the format.
    pub fn get_problem(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Problem<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "( define ( problem {} )", PROBLEM_NAME)?;
        writeln!(f, "( :domain {} )", self.domain.name())?;

        writeln!(f, "( :objects")?;
        for kind in self.domain.get_types() {
            let names = build_name_string(self.instances.iter().filter(|i| i.kind == kind).map(|i| i.name.as_str()));
            if !names.is_empty() {
                writeln!(f, "\t{} - {}", names, kind)?;
            }
        }
        writeln!(f, ")")?;

        writeln!(f, "( :init")?;
        for p in &self.predicates {
            if p.parameters.is_empty() {
                writeln!(f, "\t( {} )", p.name)?;
            } else {
                writeln!(f, "\t( {} {} )", p.name, p.param_names())?;
            }
        }
        writeln!(f, ")")?;

        if !self.goal.is_empty() {
            writeln!(f, "( :goal")?;
            write!(f, "{}", self.goal.to_pretty(1))?;
            writeln!(f, ")")?;
        }
        writeln!(f, ")")
    }
}
