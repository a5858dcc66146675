use std::fmt;
use std::str::FromStr;
use std::collections::HashMap;
use super::predicate::{Param, Predicate};
use super::utils::{normalize, split_top_level, unwrap_form, is_form};
use super::Error;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Expression {
    And(Vec<Expression>),
    Or(Vec<Expression>),
    Not(Box<Expression>),
    Predicate(Predicate),
}

#[macro_export]
macro_rules! exp_not {
    ( $e: expr ) => {
        $crate::pddl::expression::Expression::Not(Box::new($e))
    };
}

#[macro_export]
macro_rules! exp_and {
    ( $($e: expr), * ) => {
        {
            let mut temp_vec = Vec::new();
            $(
                temp_vec.push($e);
            )*
            $crate::pddl::expression::Expression::And(temp_vec)
        }
    };
}

#[macro_export]
macro_rules! exp_or {
    ( $($e: expr), * ) => {
        {
            let mut temp_vec = Vec::new();
            $(
                temp_vec.push($e);
            )*
            $crate::pddl::expression::Expression::Or(temp_vec)
        }
    };
}

/// Compact wire form. Boolean operands are concatenated without separator:
/// `(and (robot_at r2d2 bedroom)(not (robot_at r2d2 kitchen)))`.
impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Expression::Or(v) => { write!(f, "(or ")?; v.iter().try_for_each(|item| write!(f, "{}", item))?; write!(f, ")") },
            Expression::And(v) => { write!(f, "(and ")?; v.iter().try_for_each(|item| write!(f, "{}", item))?; write!(f, ")") },
            Expression::Not(item) => write!(f, "(not {})", item),
            Expression::Predicate(p) => write!(f, "{}", p),
        }
    }
}

impl Expression {
    /// Leaf built from bare parameter names, types left empty.
    pub fn predicate(name: &str, params: &[&str]) -> Self {
        Expression::Predicate(Predicate::new(name, params.iter().map(|p| Param::untyped(p)).collect()))
    }

    /// Parses one already normalized form.
    fn parse_form(text: &str) -> Result<Self, Error> {
        let body = unwrap_form(text)?;
        let elements = split_top_level(body)?;
        let (head, operands) = match elements.split_first() {
            Some((head, operands)) if !is_form(head) => (head, operands),
            Some((head, _)) => return Err(Error::malformed(format!("Expected operator or predicate name, got \"{}\"", head))),
            None => return Err(Error::malformed("Empty expression \"()\"")),
        };
        match head.to_lowercase().as_str() {
            "and" => Ok(Expression::And(Self::parse_operands(operands)?)),
            "or" => Ok(Expression::Or(Self::parse_operands(operands)?)),
            "not" => match operands {
                [operand] => Ok(Expression::Not(Box::new(Self::parse_form(operand)?))),
                _ => Err(Error::malformed(format!("'not' takes exactly one operand, got {} in \"{}\"", operands.len(), text))),
            },
            _ => {
                let mut parameters = Vec::with_capacity(operands.len());
                for operand in operands {
                    if is_form(operand) {
                        return Err(Error::malformed(format!("Unexpected form {} as argument of predicate {}", operand, head)));
                    }
                    parameters.push(Param::untyped(operand));
                }
                Ok(Expression::Predicate(Predicate { name: head.clone(), parameters }))
            }
        }
    }

    fn parse_operands(operands: &[String]) -> Result<Vec<Self>, Error> {
        operands.iter().map(|operand| Self::parse_form(operand)).collect()
    }

    pub fn substitute(&self, binding: &HashMap<String, String>) -> Self {
        match self {
            Expression::And(v) => Expression::And(v.iter().map(|e| e.substitute(binding)).collect()),
            Expression::Or(v) => Expression::Or(v.iter().map(|e| e.substitute(binding)).collect()),
            Expression::Not(e) => Expression::Not(Box::new(e.substitute(binding))),
            Expression::Predicate(p) => {
                let parameters = p.parameters.iter().map(|param| Param {
                    name: binding.get(&param.name).cloned().unwrap_or_else(|| param.name.clone()),
                    kind: param.kind.clone(),
                }).collect();
                Expression::Predicate(Predicate { name: p.name.clone(), parameters })
            }
        }
    }

    pub fn predicates(&self) -> Vec<&Predicate> {
        fn rec_collect<'e>(e: &'e Expression, leaves: &mut Vec<&'e Predicate>) {
            match e {
                Expression::Or(v) |
                Expression::And(v) => v.iter().for_each(|e| rec_collect(e, leaves)),
                Expression::Not(e) => rec_collect(e, leaves),
                Expression::Predicate(p) => leaves.push(p),
            }
        }
        let mut leaves = Vec::new();
        rec_collect(self, &mut leaves);
        leaves
    }

    fn write_pretty(&self, depth: usize, out: &mut String) {
        let tabs = "\t".repeat(depth);
        match self {
            Expression::And(v) => write_group("and", v.iter(), depth, out),
            Expression::Or(v) => write_group("or", v.iter(), depth, out),
            Expression::Not(e) => write_group("not", std::iter::once(e.as_ref()), depth, out),
            Expression::Predicate(p) if p.parameters.is_empty() => out.push_str(&format!("{}( {} )\n", tabs, p.name)),
            Expression::Predicate(p) => out.push_str(&format!("{}( {} {} )\n", tabs, p.name, p.param_names())),
        }
    }
}

fn write_group<'e, I: Iterator<Item = &'e Expression>>(keyword: &str, children: I, depth: usize, out: &mut String) {
    let tabs = "\t".repeat(depth);
    out.push_str(&format!("{}( {}\n", tabs, keyword));
    children.for_each(|child| child.write_pretty(depth + 1, out));
    out.push_str(&format!("{})\n", tabs));
}

/// Boolean expression used for action conditions, effects and goals.
/// A tree without root is valid and renders as `""`.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct ExpressionTree {
    pub root: Option<Expression>,
}

pub type Goal = ExpressionTree;

impl ExpressionTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn parse(text: &str) -> Result<Self, Error> {
        let text = normalize(text);
        let text = text.trim();
        if text.is_empty() {
            Ok(Self::default())
        } else {
            Ok(Self { root: Some(Expression::parse_form(text)?) })
        }
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    pub fn clear(&mut self) {
        self.root = None;
    }

    pub fn substitute(&self, binding: &HashMap<String, String>) -> Self {
        Self { root: self.root.as_ref().map(|root| root.substitute(binding)) }
    }

    pub fn predicates(&self) -> Vec<&Predicate> {
        self.root.as_ref().map(|root| root.predicates()).unwrap_or_default()
    }

    /// Multi-line layout of the problem text: one node per line, children one tab deeper.
    pub fn to_pretty(&self, depth: usize) -> String {
        let mut out = String::new();
        if let Some(root) = &self.root {
            root.write_pretty(depth, &mut out);
        }
        out
    }
}

impl From<Expression> for ExpressionTree {
    fn from(root: Expression) -> Self {
        Self { root: Some(root) }
    }
}

impl FromStr for ExpressionTree {
    type Err = Error;
    fn from_str(text: &str) -> Result<Self, Self::Err> {
        Self::parse(text)
    }
}

impl fmt::Display for ExpressionTree {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.root {
            Some(root) => write!(f, "{}", root),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use proptest::prelude::*;
    use super::{Expression, ExpressionTree};
    use super::super::Error;

    const TREE_STR: &str = "(and (robot_at r2d2 bedroom)(not (robot_at r2d2 kitchen))(or (person_at paco bedroom)(person_at paco kitchen)))";

    #[test]
    fn test_to_string() {
        let tree = ExpressionTree::from(exp_and!(
            Expression::predicate("robot_at", &["r2d2", "bedroom"]),
            exp_not!(Expression::predicate("robot_at", &["r2d2", "kitchen"])),
            exp_or!(
                Expression::predicate("person_at", &["paco", "bedroom"]),
                Expression::predicate("person_at", &["paco", "kitchen"])
            )
        ));
        assert_eq!(tree.to_string(), TREE_STR);
        assert_eq!(ExpressionTree::new().to_string(), "");
    }

    #[test]
    fn test_from_string() {
        let tree: ExpressionTree = TREE_STR.parse().unwrap();
        assert_eq!(tree.to_string(), TREE_STR);
        let tree2 = ExpressionTree::parse("(and (person_at ?0 ?2)(not (person_at ?0 ?1)))").unwrap();
        assert_eq!(tree2.to_string(), "(and (person_at ?0 ?2)(not (person_at ?0 ?1)))");
        let goal = ExpressionTree::parse("(and (robot_at r2d2 bedroom)(not(person_at paco kitchen)))").unwrap();
        assert_eq!(goal.to_string(), "(and (robot_at r2d2 bedroom)(not (person_at paco kitchen)))");
        let spaced = ExpressionTree::parse("( and\n\t( robot_at r2d2 bedroom )\n\t( person_at paco kitchen )\n)").unwrap();
        assert_eq!(spaced.to_string(), "(and (robot_at r2d2 bedroom)(person_at paco kitchen))");
    }

    #[test]
    fn test_parse_structure() {
        let tree = ExpressionTree::parse("(OR (a x)(NOT (b)))").unwrap();
        assert_eq!(tree.root, Some(exp_or!(
            Expression::predicate("a", &["x"]),
            exp_not!(Expression::predicate("b", &[]))
        )));
        assert_eq!(ExpressionTree::parse("(and)").unwrap().root, Some(Expression::And(vec![])));
        assert!(ExpressionTree::parse("  \n").unwrap().is_empty());
    }

    #[test]
    fn test_malformed() {
        let bad = ["(not)", "(not (a)(b))", "(and (a x)", "(and (a x)))", "()", "((a) b)", "(and a)", "(p (q))", "(a)(b)"];
        for text in bad {
            assert!(matches!(ExpressionTree::parse(text), Err(Error::MalformedExpression(_))), "{}", text);
        }
    }

    #[test]
    fn test_substitute() {
        let tree = ExpressionTree::parse("(and (robot_at ?r ?from)(not (robot_at ?r ?to)))").unwrap();
        let binding = HashMap::from([("?r".to_owned(), "r2d2".to_owned()), ("?from".to_owned(), "bedroom".to_owned())]);
        let grounded = tree.substitute(&binding);
        assert_eq!(grounded.to_string(), "(and (robot_at r2d2 bedroom)(not (robot_at r2d2 ?to)))");
        assert_eq!(tree.to_string(), "(and (robot_at ?r ?from)(not (robot_at ?r ?to)))");
        assert!(ExpressionTree::new().substitute(&binding).is_empty());
    }

    #[test]
    fn test_predicates() {
        let tree: ExpressionTree = TREE_STR.parse().unwrap();
        let names: Vec<String> = tree.predicates().iter().map(|p| p.to_string()).collect();
        assert_eq!(names, vec!["(robot_at r2d2 bedroom)", "(robot_at r2d2 kitchen)", "(person_at paco bedroom)", "(person_at paco kitchen)"]);
    }

    #[test]
    fn test_pretty() {
        let goal = ExpressionTree::parse("(and (robot_at r2d2 bedroom)(not (person_at paco kitchen)))").unwrap();
        assert_eq!(goal.to_pretty(1), "\t( and\n\t\t( robot_at r2d2 bedroom )\n\t\t( not\n\t\t\t( person_at paco kitchen )\n\t\t)\n\t)\n");
        assert_eq!(ExpressionTree::new().to_pretty(1), "");
    }

    fn arb_expression() -> impl Strategy<Value = Expression> {
        let name = "[a-z][a-z0-9_]{0,6}".prop_filter("operator keyword", |n| !matches!(n.as_str(), "and" | "or" | "not"));
        let param = "\\??[a-z0-9][a-z0-9_]{0,4}";
        let leaf = (name, prop::collection::vec(param, 0..4))
            .prop_map(|(n, ps)| Expression::predicate(&n, &ps.iter().map(|p| p.as_str()).collect::<Vec<_>>()));
        leaf.prop_recursive(4, 32, 4, |inner| {
            prop_oneof![
                inner.clone().prop_map(|e| exp_not!(e)),
                prop::collection::vec(inner.clone(), 0..4).prop_map(Expression::And),
                prop::collection::vec(inner, 0..4).prop_map(Expression::Or),
            ]
        })
    }

    proptest! {
        #[test]
        fn round_trip(e in arb_expression()) {
            let tree = ExpressionTree::from(e);
            let text = tree.to_string();
            let parsed = ExpressionTree::parse(&text).unwrap();
            prop_assert_eq!(&parsed, &tree);
            prop_assert_eq!(parsed.to_string(), text);
        }
    }
}
