use std::fmt;
use std::fs;
use std::str::FromStr;
use enumset::{EnumSet, EnumSetType};
use indexmap::{IndexMap, IndexSet};
use log::{debug, info};

use super::action::{Action, DurativeAction};
use super::parser::{DomainSource, Parser, TypedList, DEFAULT_TYPE};
use super::predicate::Predicate;
use super::Error;

#[derive(EnumSetType, Debug)]
pub enum Requirement {
    Strips,
    Typing,
    NegativePreconditions,
    DisjunctivePreconditions,
    Equality,
    ExistentialPreconditions,
    UniversalPreconditions,
    QuantifiedPreconditions,
    ConditionalEffects,
    Fluents,
    NumericFluents,
    ADL,
    DurativeActions,
    DerivedPredicates,
    TimedInitialLiterals,
    Preferences,
    Constraints,
    ActionCosts,
}

impl Requirement {
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        use Requirement::*;
        match keyword.to_lowercase().trim_start_matches(':') {
            "strips" => Some(Strips),
            "typing" => Some(Typing),
            "negative-preconditions" => Some(NegativePreconditions),
            "disjunctive-preconditions" => Some(DisjunctivePreconditions),
            "equality" => Some(Equality),
            "existential-preconditions" => Some(ExistentialPreconditions),
            "universal-preconditions" => Some(UniversalPreconditions),
            "quantified-preconditions" => Some(QuantifiedPreconditions),
            "conditional-effects" => Some(ConditionalEffects),
            "fluents" => Some(Fluents),
            "numeric-fluents" => Some(NumericFluents),
            "adl" => Some(ADL),
            "durative-actions" => Some(DurativeActions),
            "derived-predicates" => Some(DerivedPredicates),
            "timed-initial-literals" => Some(TimedInitialLiterals),
            "preferences" => Some(Preferences),
            "constraints" => Some(Constraints),
            "action-costs" => Some(ActionCosts),
            _ => None,
        }
    }

    pub fn keyword(&self) -> &'static str {
        use Requirement::*;
        match self {
            Strips => ":strips",
            Typing => ":typing",
            NegativePreconditions => ":negative-preconditions",
            DisjunctivePreconditions => ":disjunctive-preconditions",
            Equality => ":equality",
            ExistentialPreconditions => ":existential-preconditions",
            UniversalPreconditions => ":universal-preconditions",
            QuantifiedPreconditions => ":quantified-preconditions",
            ConditionalEffects => ":conditional-effects",
            Fluents => ":fluents",
            NumericFluents => ":numeric-fluents",
            ADL => ":adl",
            DurativeActions => ":durative-actions",
            DerivedPredicates => ":derived-predicates",
            TimedInitialLiterals => ":timed-initial-literals",
            Preferences => ":preferences",
            Constraints => ":constraints",
            ActionCosts => ":action-costs",
        }
    }
}

/// Symbolic model of a planning domain, built from one or more PDDL domain sources.
///
/// Predicates, functions and actions are keyed by their lower-cased name so lookups
/// ignore case, while the stored definitions keep the declared spelling. All maps keep
/// first-seen order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Domain {
    name: String,
    requirements: EnumSet<Requirement>,
    types: IndexSet<String>,
    supertypes: IndexMap<String, String>,
    predicates: IndexMap<String, Predicate>,
    functions: IndexMap<String, Predicate>,
    actions: IndexMap<String, Action>,
    durative_actions: IndexMap<String, DurativeAction>,
}

impl FromStr for Domain {
    type Err = Error;
    fn from_str(pddl: &str) -> Result<Self, Self::Err> {
        let source = Parser::new(pddl).parse()?;
        if source.predicates.is_none() {
            return Err(Error::domain(format!("Domain {} has no :predicates section.", source.name)));
        }
        let mut domain = Domain { name: source.name.clone(), ..Default::default() };
        domain.merge(source);
        Ok(domain)
    }
}

impl Domain {
    /// Parses `pddl` as an additional domain fragment and merges it in place.
    /// Definitions whose name is already known are replaced by the new ones.
    pub fn extend(&mut self, pddl: &str) -> Result<(), Error> {
        let source = Parser::new(pddl).parse()?;
        self.merge(source);
        Ok(())
    }

    fn merge(&mut self, source: DomainSource) {
        debug!("Merging domain {} into {}", source.name, self.name);
        self.requirements |= source.requirements;
        for TypedList { identifiers, kind } in source.types {
            for identifier in identifiers {
                self.types.insert(identifier.clone());
                if kind != DEFAULT_TYPE {
                    self.supertypes.insert(identifier, kind.clone());
                }
            }
            if kind != DEFAULT_TYPE {
                self.types.insert(kind);
            }
        }
        for predicate in source.predicates.unwrap_or_default() {
            self.predicates.insert(predicate.name.to_lowercase(), predicate);
        }
        for function in source.functions {
            self.functions.insert(function.name.to_lowercase(), function);
        }
        for action in source.actions {
            self.actions.insert(action.name.to_lowercase(), action);
        }
        for action in source.durative_actions {
            self.durative_actions.insert(action.name.to_lowercase(), action);
        }
    }

    pub fn from_file(path: &str) -> Result<Self, Error> {
        Self::from_files(&[path])
    }

    /// Builds the domain from the first file and extends it with the others, in order.
    pub fn from_files<S: AsRef<str>>(paths: &[S]) -> Result<Self, Error> {
        let mut paths = paths.iter().map(|p| p.as_ref());
        let first = paths.next().ok_or_else(|| Error::domain("No domain file given."))?;
        let mut domain = Self::from_str(&read_source(first)?)
            .map_err(|e| Error::FromFile(first.to_owned(), Box::new(e)))?;
        info!("Loaded domain {} from {}", domain.name, first);
        for path in paths {
            domain.extend(&read_source(path)?)
                .map_err(|e| Error::FromFile(path.to_owned(), Box::new(e)))?;
            info!("Extended domain {} with {}", domain.name, path);
        }
        Ok(domain)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn requirements(&self) -> EnumSet<Requirement> {
        self.requirements
    }

    pub fn get_types(&self) -> Vec<String> {
        self.types.iter().cloned().collect()
    }

    pub fn has_type(&self, kind: &str) -> bool {
        self.types.contains(kind)
    }

    pub fn get_supertype(&self, kind: &str) -> Option<&str> {
        self.supertypes.get(kind).map(|s| s.as_str())
    }

    pub fn get_predicates(&self) -> Vec<String> {
        self.predicates.values().map(|p| p.name.clone()).collect()
    }

    pub fn get_predicate(&self, name: &str) -> Option<Predicate> {
        self.predicates.get(&name.to_lowercase()).cloned()
    }

    pub fn get_functions(&self) -> Vec<String> {
        self.functions.values().map(|p| p.name.clone()).collect()
    }

    pub fn get_function(&self, name: &str) -> Option<Predicate> {
        self.functions.get(&name.to_lowercase()).cloned()
    }

    pub fn get_actions(&self) -> Vec<String> {
        self.actions.values().map(|a| a.name.clone()).collect()
    }

    pub fn get_action(&self, name: &str) -> Option<Action> {
        self.actions.get(&name.to_lowercase()).cloned()
    }

    pub fn get_durative_actions(&self) -> Vec<String> {
        self.durative_actions.values().map(|a| a.name.clone()).collect()
    }

    pub fn get_durative_action(&self, name: &str) -> Option<DurativeAction> {
        self.durative_actions.get(&name.to_lowercase()).cloned()
    }

    /// Domain text equivalent to the merged sources.
    pub fn render(&self) -> String {
        self.to_string()
    }
}

fn read_source(path: &str) -> Result<String, Error> {
    fs::read_to_string(path).map_err(|source| Error::Io { path: path.to_owned(), source })
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "(define (domain {})", self.name)?;
        if !self.requirements.is_empty() {
            let requirements: Vec<&str> = self.requirements.iter().map(|r| r.keyword()).collect();
            writeln!(f, "(:requirements {})", requirements.join(" "))?;
        }
        writeln!(f, "(:types")?;
        for kind in &self.types {
            match self.supertypes.get(kind) {
                Some(parent) => writeln!(f, "{} - {}", kind, parent)?,
                None => writeln!(f, "{}", kind)?,
            }
        }
        writeln!(f, ")")?;
        writeln!(f, "(:predicates")?;
        self.predicates.values().try_for_each(|p| writeln!(f, "{}", p.signature()))?;
        writeln!(f, ")")?;
        if !self.functions.is_empty() {
            writeln!(f, "(:functions")?;
            self.functions.values().try_for_each(|p| writeln!(f, "{}", p.signature()))?;
            writeln!(f, ")")?;
        }
        self.actions.values().try_for_each(|a| writeln!(f, "{}", a))?;
        self.durative_actions.values().try_for_each(|a| writeln!(f, "{}", a))?;
        writeln!(f, ")")
    }
}
