//! Request/response façades over the domain model and the problem knowledge base.
//!
//! Every query answers with a [`Response`]: either a payload or a human readable
//! `error_info`. Nothing here returns `Err` or panics on bad input.

use log::warn;
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::pddl::domain::Domain;
use crate::pddl::expression::Goal;
use crate::pddl::predicate::{Param, Predicate};
use crate::pddl::problem::{Instance, Problem};
use crate::pddl::Error;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<T>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub error_info: String,
}

impl<T> Response<T> {
    pub fn ok(payload: T) -> Self {
        Response { success: true, payload: Some(payload), error_info: String::new() }
    }

    pub fn fail(error_info: impl Into<String>) -> Self {
        Response { success: false, payload: None, error_info: error_info.into() }
    }
}

impl<T> From<Result<T, Error>> for Response<T> {
    fn from(result: Result<T, Error>) -> Self {
        match result {
            Ok(payload) => Response::ok(payload),
            Err(e) => Response::fail(e.to_string()),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionEntry {
    pub name: String,
    pub kind: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ActionDetails {
    pub name: String,
    pub kind: String,
    pub param_names: Vec<String>,
    pub param_types: Vec<String>,
    pub at_start_requirements: String,
    pub over_all_requirements: String,
    pub at_end_requirements: String,
    pub at_start_effects: String,
    pub at_end_effects: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PredicateDetails {
    pub name: String,
    pub param_names: Vec<String>,
    pub param_types: Vec<String>,
}

fn split_params(params: &[Param]) -> (Vec<String>, Vec<String>) {
    params.iter().map(|p| (p.name.clone(), p.kind.clone())).unzip()
}

pub struct DomainExpert {
    domain: Domain,
}

impl DomainExpert {
    pub fn new(pddl: &str) -> Result<Self, Error> {
        Ok(DomainExpert { domain: pddl.parse()? })
    }

    pub fn from_domain(domain: Domain) -> Self {
        DomainExpert { domain }
    }

    pub fn from_config(config: &Config) -> Result<Self, Error> {
        Ok(DomainExpert { domain: Domain::from_files(&config.model_files())? })
    }

    pub fn domain(&self) -> &Domain {
        &self.domain
    }

    pub fn extend(&mut self, pddl: &str) -> Result<(), Error> {
        self.domain.extend(pddl)
    }

    pub fn get_domain_types(&self) -> Response<Vec<String>> {
        Response::ok(self.domain.get_types())
    }

    /// Simple actions first, then durative actions.
    pub fn get_domain_actions(&self) -> Response<Vec<ActionEntry>> {
        let simple = self.domain.get_actions().into_iter()
            .map(|name| ActionEntry { name, kind: "action".to_owned() });
        let durative = self.domain.get_durative_actions().into_iter()
            .map(|name| ActionEntry { name, kind: "durative-action".to_owned() });
        Response::ok(simple.chain(durative).collect())
    }

    /// A simple action reports its precondition and effect in the `at_start` slots.
    pub fn get_domain_action_details(&self, name: &str) -> Response<ActionDetails> {
        if let Some(action) = self.domain.get_action(name) {
            let (param_names, param_types) = split_params(&action.parameters);
            Response::ok(ActionDetails {
                name: action.name.clone(),
                kind: "action".to_owned(),
                param_names,
                param_types,
                at_start_requirements: action.preconditions.to_string(),
                at_start_effects: action.effects.to_string(),
                ..Default::default()
            })
        } else if let Some(action) = self.domain.get_durative_action(name) {
            let (param_names, param_types) = split_params(&action.parameters);
            Response::ok(ActionDetails {
                name: action.name.clone(),
                kind: "durative-action".to_owned(),
                param_names,
                param_types,
                at_start_requirements: action.at_start_requirements.to_string(),
                over_all_requirements: action.over_all_requirements.to_string(),
                at_end_requirements: action.at_end_requirements.to_string(),
                at_start_effects: action.at_start_effects.to_string(),
                at_end_effects: action.at_end_effects.to_string(),
            })
        } else {
            warn!("Requesting a non-existing action [{}]", name);
            Response::fail("Action not found")
        }
    }

    pub fn get_domain_predicates(&self) -> Response<Vec<String>> {
        Response::ok(self.domain.get_predicates())
    }

    pub fn get_domain_predicate_details(&self, name: &str) -> Response<PredicateDetails> {
        match self.domain.get_predicate(name) {
            Some(predicate) => {
                let (param_names, param_types) = split_params(&predicate.parameters);
                Response::ok(PredicateDetails { name: predicate.name, param_names, param_types })
            }
            None => {
                warn!("Requesting a non-existing predicate [{}]", name);
                Response::fail("Predicate not found")
            }
        }
    }

    pub fn get_domain(&self) -> Response<String> {
        Response::ok(self.domain.render())
    }
}

pub struct ProblemExpert<'a> {
    problem: Problem<'a>,
}

fn status(accepted: bool, error_info: &str) -> Response<()> {
    if accepted { Response::ok(()) } else { Response::fail(error_info) }
}

impl<'a> ProblemExpert<'a> {
    pub fn new(domain: &'a Domain) -> Self {
        ProblemExpert { problem: Problem::new(domain) }
    }

    pub fn problem(&self) -> &Problem<'a> {
        &self.problem
    }

    pub fn add_instance(&mut self, instance: Instance) -> Response<()> {
        status(self.problem.add_instance(instance), "Instance not valid")
    }

    pub fn remove_instance(&mut self, name: &str) -> Response<()> {
        status(self.problem.remove_instance(name), "Instance not found")
    }

    pub fn get_instances(&self) -> Response<Vec<Instance>> {
        Response::ok(self.problem.get_instances())
    }

    pub fn get_instance(&self, name: &str) -> Response<Instance> {
        match self.problem.get_instance(name) {
            Some(instance) => Response::ok(instance),
            None => Response::fail("Instance not found"),
        }
    }

    pub fn add_predicate(&mut self, predicate: Predicate) -> Response<()> {
        status(self.problem.add_predicate(predicate), "Predicate not valid")
    }

    pub fn remove_predicate(&mut self, predicate: &Predicate) -> Response<()> {
        status(self.problem.remove_predicate(predicate), "Predicate not found")
    }

    pub fn get_predicates(&self) -> Response<Vec<Predicate>> {
        Response::ok(self.problem.get_predicates())
    }

    pub fn exist_predicate(&self, predicate: &Predicate) -> Response<bool> {
        Response::ok(self.problem.exist_predicate(predicate))
    }

    pub fn set_goal(&mut self, goal: Goal) -> Response<()> {
        status(self.problem.set_goal(goal), "Goal not valid")
    }

    /// Parses `goal` from its wire form first; a malformed goal leaves the current one untouched.
    pub fn set_goal_str(&mut self, goal: &str) -> Response<()> {
        match Goal::parse(goal) {
            Ok(goal) => self.set_goal(goal),
            Err(e) => {
                warn!("Rejected goal {}: {}", goal, e);
                Response::fail(e.to_string())
            }
        }
    }

    /// Wire form of the goal, empty when no goal is set.
    pub fn get_goal(&self) -> Response<String> {
        Response::ok(self.problem.get_goal().to_string())
    }

    pub fn clear_goal(&mut self) -> Response<()> {
        status(self.problem.clear_goal(), "Goal not cleared")
    }

    pub fn clear(&mut self) -> Response<()> {
        self.problem.clear();
        Response::ok(())
    }

    pub fn get_problem(&self) -> Response<String> {
        Response::ok(self.problem.get_problem())
    }
}
