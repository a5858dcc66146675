use std::fs;
use serde::{Deserialize, Serialize};

use crate::pddl::Error;

/// Startup settings of a domain expert.
///
/// `model_file` holds one or more domain file paths separated by `:`. The first file is
/// the base domain and the rest extend it in order.
#[derive(Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub model_file: String,
}

impl Config {
    pub fn new(model_file: &str) -> Self {
        Config { model_file: model_file.to_owned() }
    }

    pub fn from_json(json: &str) -> Result<Self, Error> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: &str) -> Result<Self, Error> {
        let json = fs::read_to_string(path).map_err(|source| Error::Io { path: path.to_owned(), source })?;
        Self::from_json(&json).map_err(|e| Error::FromFile(path.to_owned(), Box::new(e)))
    }

    /// Empty segments (`a::b`, trailing `:`) are skipped.
    pub fn model_files(&self) -> Vec<&str> {
        self.model_file.split(':').filter(|s| !s.is_empty()).collect()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use super::Config;
    use crate::pddl::Error;

    #[test]
    fn test_model_files() {
        assert_eq!(Config::new("a.pddl:b.pddl").model_files(), vec!["a.pddl", "b.pddl"]);
        assert_eq!(Config::new(":a.pddl::b.pddl:").model_files(), vec!["a.pddl", "b.pddl"]);
        assert!(Config::default().model_files().is_empty());
    }

    #[test]
    fn test_from_json() {
        let config = Config::from_json(r#"{"model_file": "pddl-problems/simple/domain.pddl"}"#).unwrap();
        assert_eq!(config.model_files(), vec!["pddl-problems/simple/domain.pddl"]);
        assert_eq!(Config::from_json("{}").unwrap(), Config::default());
        assert!(matches!(Config::from_json("{\"model_file\": 3}"), Err(Error::Config(_))));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{\"model_file\": \"one.pddl:two.pddl\"}}").unwrap();
        let config = Config::from_file(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.model_files(), vec!["one.pddl", "two.pddl"]);

        assert!(matches!(Config::from_file("no/such/config.json"), Err(Error::Io { .. })));
    }
}
