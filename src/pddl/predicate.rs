use std::fmt;
use serde::{Deserialize, Serialize};
use super::utils::build_name_string;

/// A named, typed slot. `name` is either a `?variable` or a concrete object name.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Param {
    pub name: String,
    pub kind: String,
}

impl Param {
    pub fn new(name: &str, kind: &str) -> Self {
        Param { name: name.to_owned(), kind: kind.to_owned() }
    }

    pub fn untyped(name: &str) -> Self {
        Param { name: name.to_owned(), kind: String::new() }
    }

    pub fn is_variable(&self) -> bool {
        self.name.starts_with('?')
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Predicate {
    pub name: String,
    pub parameters: Vec<Param>,
}

impl Predicate {
    pub fn new(name: &str, parameters: Vec<Param>) -> Self {
        Predicate { name: name.to_owned(), parameters }
    }

    pub fn arity(&self) -> usize {
        self.parameters.len()
    }

    /// Same name (ignoring case, folded like domain lookups) and same parameter names
    /// in the same order.
    /// Parameter types do not take part in the comparison.
    pub fn matches(&self, other: &Predicate) -> bool {
        self.name.to_lowercase() == other.name.to_lowercase()
            && self.parameters.len() == other.parameters.len()
            && self.parameters.iter().zip(&other.parameters).all(|(l, r)| l.name == r.name)
    }

    pub fn param_names(&self) -> String {
        build_name_string(self.parameters.iter().map(|p| p.name.as_str()))
    }

    /// Declaration form used in `(:predicates ...)`, `(robot_at ?robot0 - robot ?room1 - room)`.
    pub fn signature(&self) -> String {
        if self.parameters.is_empty() {
            format!("({})", self.name)
        } else {
            format!("({} {})", self.name, typed_list(&self.parameters))
        }
    }
}

/// `?0 - robot ?1 - room`; parameters without type are written bare.
pub fn typed_list(params: &[Param]) -> String {
    let typed: Vec<String> = params.iter().map(|p| {
        if p.kind.is_empty() { p.name.clone() } else { format!("{} - {}", p.name, p.kind) }
    }).collect();
    build_name_string(typed.iter().map(|s| s.as_str()))
}

pub fn matches(left: &Predicate, right: &Predicate) -> bool {
    left.matches(right)
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({} {})", self.name, self.param_names())
    }
}

#[cfg(test)]
mod tests {
    use super::{Param, Predicate, matches, typed_list};

    fn robot_at(robot: &str, room: &str) -> Predicate {
        Predicate::new("robot_at", vec![Param::new(robot, "robot"), Param::new(room, "room")])
    }

    #[test]
    fn test_display() {
        assert_eq!(robot_at("r2d2", "bedroom").to_string(), "(robot_at r2d2 bedroom)");
        assert_eq!(Predicate::new("ready", vec![]).to_string(), "(ready )");
    }

    #[test]
    fn test_matches() {
        let p = robot_at("r2d2", "bedroom");
        let mut upper = robot_at("r2d2", "bedroom");
        upper.name = "ROBOT_AT".to_owned();
        upper.parameters[0].kind = String::new();
        assert!(matches(&p, &upper));
        assert!(!matches(&p, &robot_at("r2d2", "kitchen")));
        assert!(!matches(&p, &robot_at("bedroom", "r2d2")));
        assert!(!matches(&p, &Predicate::new("robot_at", vec![Param::untyped("r2d2")])));
    }

    #[test]
    fn test_matches_non_ascii() {
        let lower = Predicate::new("état_libre", vec![Param::untyped("a")]);
        let upper = Predicate::new("ÉTAT_LIBRE", vec![Param::untyped("a")]);
        assert!(matches(&lower, &upper));
        assert_eq!(lower.name.to_lowercase(), upper.name.to_lowercase());
    }

    #[test]
    fn test_signature() {
        let signature = Predicate::new("robot_at", vec![Param::new("?robot0", "robot"), Param::new("?room1", "room")]);
        assert_eq!(signature.signature(), "(robot_at ?robot0 - robot ?room1 - room)");
        assert_eq!(Predicate::new("ready", vec![]).signature(), "(ready)");
        assert_eq!(typed_list(&[Param::untyped("?x"), Param::new("?y", "room")]), "?x ?y - room");
    }

    #[test]
    fn test_variable() {
        assert!(Param::new("?r", "robot").is_variable());
        assert!(!Param::new("r2d2", "robot").is_variable());
    }
}
