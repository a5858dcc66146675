pub mod pddl;
pub mod config;
pub mod expert;

pub use config::Config;
pub use expert::{DomainExpert, ProblemExpert, Response};
pub use pddl::{domain::Domain, problem::Problem, Error};
