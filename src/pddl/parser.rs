use std::collections::HashMap;
use enumset::EnumSet;
use log::{debug, warn};

use super::action::{Action, DurativeAction, TimeSpec};
use super::domain::Requirement;
use super::expression::{Expression, ExpressionTree};
use super::predicate::{Param, Predicate};
use super::utils::{flatten_layout, normalize, split_top_level, strip_comments, unwrap_form, is_form};
use super::Error;

const EXPECTED_DEFINE: &str = "Expected '(define (domain NAME) ...)'.";
const EXPECTED_TIMED: &str = "Expected '(at start EXPR)', '(over all EXPR)' or '(at end EXPR)'";
pub const DEFAULT_TYPE: &str = "object";

/// Names sharing one type, as in `?r1 ?r2 - room`.
#[derive(PartialEq, Debug, Clone)]
pub struct TypedList {
    pub identifiers: Vec<String>,
    pub kind: String,
}

/// Sections read out of one domain source, before they are merged into a `Domain`.
#[derive(PartialEq, Debug, Default)]
pub struct DomainSource {
    pub name: String,
    pub requirements: EnumSet<Requirement>,
    pub types: Vec<TypedList>,
    pub predicates: Option<Vec<Predicate>>,
    pub functions: Vec<Predicate>,
    pub actions: Vec<Action>,
    pub durative_actions: Vec<DurativeAction>,
}

/// Reads the PDDL domain subset: requirements, types, predicates, functions,
/// actions and durative actions.
pub struct Parser {
    code: String,
}

impl Parser {
    pub fn new(code: &str) -> Self {
        Self { code: normalize(&flatten_layout(&strip_comments(code))) }
    }

    pub fn parse(&self) -> Result<DomainSource, Error> {
        if self.code.trim().is_empty() {
            return Err(Error::domain("Empty domain definition."));
        }
        let elements = split_top_level(unwrap_form(&self.code)?)?;
        let (header, sections) = match elements.as_slice() {
            [define, header, sections @ ..] if define.eq_ignore_ascii_case("define") && is_form(header) => (header, sections),
            _ => return Err(Error::domain(EXPECTED_DEFINE)),
        };
        let header = split_top_level(unwrap_form(header)?)?;
        let name = match header.as_slice() {
            [domain, name] if domain.eq_ignore_ascii_case("domain") && !is_form(name) => name.clone(),
            _ => return Err(Error::domain(EXPECTED_DEFINE)),
        };

        let mut source = DomainSource { name, ..Default::default() };
        for section in sections {
            let items = split_top_level(unwrap_form(section)?)?;
            let (keyword, body) = match items.split_first() {
                Some((keyword, body)) if !is_form(keyword) => (keyword.to_lowercase(), body),
                _ => return Err(Error::malformed(format!("Expected section keyword in {}", section))),
            };
            match keyword.as_str() {
                ":requirements" => source.requirements |= self.requirements(body),
                ":types" => source.types.extend(self.typed_lists(body)?),
                ":predicates" => source.predicates.get_or_insert_with(Vec::new).extend(self.predicates(body)?),
                ":functions" => source.functions.extend(self.functions(body)?),
                ":action" => source.actions.push(self.action(body)?),
                ":durative-action" => source.durative_actions.push(self.durative_action(body)?),
                other => return Err(Error::malformed(format!("Unknown section keyword {}", other))),
            }
            debug!("Parsed {} section of domain {}", keyword, source.name);
        }
        Ok(source)
    }

    fn requirements(&self, body: &[String]) -> EnumSet<Requirement> {
        let mut r = EnumSet::empty();
        for keyword in body {
            match Requirement::from_keyword(keyword) {
                Some(requirement) => { r.insert(requirement); },
                None => warn!("Ignoring unsupported requirement {}", keyword),
            }
        }
        r
    }

    fn typed_lists(&self, tokens: &[String]) -> Result<Vec<TypedList>, Error> {
        let mut lists = Vec::new();
        let mut identifiers = Vec::new();
        let mut it = tokens.iter();
        while let Some(token) = it.next() {
            if is_form(token) {
                return Err(Error::malformed(format!("Unexpected form {} in typed list", token)));
            }
            if token == "-" {
                let kind = match it.next() {
                    Some(kind) if !is_form(kind) => kind.clone(),
                    _ => return Err(Error::malformed("Expected type name after '-'.")),
                };
                if identifiers.is_empty() {
                    return Err(Error::malformed(format!("Type {} does not follow any name", kind)));
                }
                lists.push(TypedList { identifiers: std::mem::take(&mut identifiers), kind });
            } else {
                identifiers.push(token.clone());
            }
        }
        if !identifiers.is_empty() {
            lists.push(TypedList { identifiers, kind: DEFAULT_TYPE.to_owned() });
        }
        Ok(lists)
    }

    fn parameters(&self, form: &str) -> Result<Vec<Param>, Error> {
        let tokens = split_top_level(unwrap_form(form)?)?;
        Ok(self.typed_lists(&tokens)?
            .into_iter()
            .flat_map(|TypedList { identifiers, kind }| identifiers.into_iter().map(move |name| Param { name, kind: kind.clone() }))
            .collect())
    }

    /// `(robot_at ?r - robot ?ro - room)` becomes `robot_at(?robot0 - robot, ?room1 - room)`.
    fn signature(&self, form: &str) -> Result<Predicate, Error> {
        let body = unwrap_form(form)?;
        let name_end = body.find(|c: char| c.is_whitespace() || c == '(').unwrap_or(body.len());
        let name = &body[..name_end];
        if name.is_empty() {
            return Err(Error::malformed(format!("Expected predicate name in {}", form)));
        }
        let parameters = self.parameters(&format!("({})", &body[name_end..]))?
            .into_iter()
            .enumerate()
            .map(|(i, p)| Param { name: format!("?{}{}", p.kind, i), kind: p.kind })
            .collect();
        Ok(Predicate::new(name, parameters))
    }

    fn predicates(&self, body: &[String]) -> Result<Vec<Predicate>, Error> {
        body.iter().map(|form| self.signature(form)).collect()
    }

    /// Function declarations may carry a `- number` result type, which is skipped.
    fn functions(&self, body: &[String]) -> Result<Vec<Predicate>, Error> {
        let mut functions = Vec::new();
        let mut it = body.iter();
        while let Some(token) = it.next() {
            if token == "-" {
                it.next();
            } else {
                functions.push(self.signature(token)?);
            }
        }
        Ok(functions)
    }

    /// Splits `NAME :key value :key value ...`.
    fn keyed<'b>(&self, body: &'b [String]) -> Result<(&'b str, Vec<(String, &'b str)>), Error> {
        let (name, rest) = match body.split_first() {
            Some((name, rest)) if !is_form(name) => (name.as_str(), rest),
            _ => return Err(Error::malformed("Expected action name.")),
        };
        let mut pairs = Vec::new();
        for pair in rest.chunks(2) {
            match pair {
                [key, value] if key.starts_with(':') => pairs.push((key.to_lowercase(), value.as_str())),
                _ => return Err(Error::malformed(format!("Expected ':key value' pairs in action {}", name))),
            }
        }
        Ok((name, pairs))
    }

    fn action(&self, body: &[String]) -> Result<Action, Error> {
        let (name, pairs) = self.keyed(body)?;
        let mut action = Action { name: name.to_owned(), ..Default::default() };
        for (key, value) in pairs {
            match key.as_str() {
                ":parameters" => action.parameters = self.parameters(value)?,
                ":precondition" => action.preconditions = ExpressionTree::parse(value)?,
                ":effect" => action.effects = ExpressionTree::parse(value)?,
                other => return Err(Error::malformed(format!("Unknown key {} in action {}", other, name))),
            }
        }
        let binding = canonical_names(&mut action.parameters);
        action.preconditions = action.preconditions.substitute(&binding);
        action.effects = action.effects.substitute(&binding);
        Ok(action)
    }

    fn durative_action(&self, body: &[String]) -> Result<DurativeAction, Error> {
        let (name, pairs) = self.keyed(body)?;
        let mut action = DurativeAction { name: name.to_owned(), ..Default::default() };
        for (key, value) in pairs {
            match key.as_str() {
                ":parameters" => action.parameters = self.parameters(value)?,
                ":duration" => action.duration = value.to_owned(),
                ":condition" => {
                    let mut phases = self.timed(value)?;
                    action.at_start_requirements = phases.remove(&TimeSpec::AtStart).unwrap_or_default();
                    action.over_all_requirements = phases.remove(&TimeSpec::OverAll).unwrap_or_default();
                    action.at_end_requirements = phases.remove(&TimeSpec::AtEnd).unwrap_or_default();
                },
                ":effect" => {
                    let mut phases = self.timed(value)?;
                    if phases.contains_key(&TimeSpec::OverAll) {
                        return Err(Error::malformed(format!("'over all' is not allowed in effects of {}", name)));
                    }
                    action.at_start_effects = phases.remove(&TimeSpec::AtStart).unwrap_or_default();
                    action.at_end_effects = phases.remove(&TimeSpec::AtEnd).unwrap_or_default();
                },
                other => return Err(Error::malformed(format!("Unknown key {} in durative action {}", other, name))),
            }
        }
        let binding = canonical_names(&mut action.parameters);
        for tree in [
            &mut action.at_start_requirements,
            &mut action.over_all_requirements,
            &mut action.at_end_requirements,
            &mut action.at_start_effects,
            &mut action.at_end_effects,
        ] {
            *tree = tree.substitute(&binding);
        }
        Ok(action)
    }

    /// Groups the items of a durative body by phase, each phase becoming one `and` tree.
    fn timed(&self, form: &str) -> Result<HashMap<TimeSpec, ExpressionTree>, Error> {
        let items = split_top_level(unwrap_form(form)?)?;
        let timed_items = match items.split_first() {
            Some((head, rest)) if head.eq_ignore_ascii_case("and") => rest.to_vec(),
            Some(_) => vec![form.to_owned()],
            None => return Err(Error::malformed("Empty expression \"()\"")),
        };
        let mut phases: HashMap<TimeSpec, Vec<Expression>> = HashMap::new();
        for item in timed_items {
            let parts = split_top_level(unwrap_form(&item)?)?;
            let (phase, expr) = match parts.as_slice() {
                [first, second, expr] if is_form(expr) => match TimeSpec::from_words(first, second) {
                    Some(phase) => (phase, expr),
                    None => return Err(Error::malformed(format!("{}, got {}", EXPECTED_TIMED, item))),
                },
                _ => return Err(Error::malformed(format!("{}, got {}", EXPECTED_TIMED, item))),
            };
            if let Some(root) = ExpressionTree::parse(expr)?.root {
                phases.entry(phase).or_default().push(root);
            }
        }
        Ok(phases.into_iter().map(|(k, v)| (k, ExpressionTree::from(Expression::And(v)))).collect())
    }
}

/// Renames action parameters to `?0`, `?1`, ... and returns the old-to-new binding.
fn canonical_names(parameters: &mut [Param]) -> HashMap<String, String> {
    let mut binding = HashMap::new();
    for (i, param) in parameters.iter_mut().enumerate() {
        let canonical = format!("?{}", i);
        binding.insert(std::mem::replace(&mut param.name, canonical.clone()), canonical);
    }
    binding
}
