use super::Error;

/// Compacts a PDDL fragment: drops line breaks and tabs, and the spaces glued to the
/// inside of parentheses. `"( and\n\t)"` becomes `"(and)"`.
pub fn normalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars().filter(|c| !matches!(c, '\n' | '\r' | '\t')) {
        match c {
            ' ' if out.ends_with('(') => (),
            ')' => {
                while out.ends_with(' ') {
                    out.pop();
                }
                out.push(c);
            }
            _ => out.push(c),
        }
    }
    out
}

/// Turns every whitespace run (line breaks and tabs included) into a single space, so
/// tokens laid out one per line stay apart once the text is compacted.
pub fn flatten_layout(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if !c.is_whitespace() {
            out.push(c);
        } else if !out.ends_with(' ') {
            out.push(' ');
        }
    }
    out
}

/// Removes `;` comments up to the end of their line.
pub fn strip_comments(text: &str) -> String {
    text.lines()
        .map(|line| match line.find(';') {
            Some(idx) => &line[..idx],
            None => line,
        })
        .fold(String::new(), |acc, line| acc + line + "\n")
}

/// Splits the body of a parenthesized form into its top level elements.
/// Any `(...)` run is kept as one element: `"a (b c)"` gives `["a", "(b c)"]`.
pub fn split_top_level(body: &str) -> Result<Vec<String>, Error> {
    let mut elements = Vec::new();
    let mut current = String::new();
    let mut depth: usize = 0;
    for c in body.chars() {
        match c {
            '(' => {
                if depth == 0 && !current.is_empty() {
                    elements.push(std::mem::take(&mut current));
                }
                depth += 1;
                current.push(c);
            }
            ')' => {
                if depth == 0 {
                    return Err(Error::malformed(format!("Unmatched ')' in \"{}\"", body)));
                }
                depth -= 1;
                current.push(c);
                if depth == 0 {
                    elements.push(std::mem::take(&mut current));
                }
            }
            c if c.is_whitespace() && depth == 0 => {
                if !current.is_empty() {
                    elements.push(std::mem::take(&mut current));
                }
            }
            _ => current.push(c),
        }
    }
    if depth > 0 {
        return Err(Error::malformed(format!("Unclosed '(' in \"{}\"", body)));
    }
    if !current.is_empty() {
        elements.push(current);
    }
    Ok(elements)
}

/// Returns the body of a single parenthesized form, `"(a (b))"` gives `"a (b)"`.
pub fn unwrap_form(text: &str) -> Result<&str, Error> {
    let text = text.trim();
    if !text.starts_with('(') {
        return Err(Error::malformed(format!("Expected '(' at the start of \"{}\"", text)));
    }
    let mut depth: usize = 0;
    for (idx, c) in text.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return if idx + 1 == text.len() {
                        Ok(&text[1..idx])
                    } else {
                        Err(Error::malformed(format!("Expected a single form, got \"{}\"", text)))
                    };
                }
            }
            _ => (),
        }
    }
    Err(Error::malformed(format!("Expected matched ')' in \"{}\"", text)))
}

pub fn is_form(element: &str) -> bool {
    element.starts_with('(')
}

pub fn build_name_string<'a, I: IntoIterator<Item = &'a str>>(names: I) -> String {
    let mut it = names.into_iter();
    let first = it.by_ref().take(1).fold(String::new(), |acc, item| acc + item);
    it.fold(first, |acc, item| acc + " " + item)
}

#[cfg(test)]
mod tests {
    use super::{normalize, flatten_layout, split_top_level, strip_comments, unwrap_form, build_name_string};

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("(and)"), "(and)");
        assert_eq!(normalize("( and)"), "(and)");
        assert_eq!(normalize("( \tand)"), "(and)");
        assert_eq!(normalize("( \tand\t)"), "(and)");
        assert_eq!(normalize("( and\n)"), "(and)");
        assert_eq!(normalize("( and\n\t)"), "(and)");
        assert_eq!(normalize("( ( and\n\t ) )"), "((and))");
        assert_eq!(normalize("(robot_at  r2d2 bedroom)"), "(robot_at  r2d2 bedroom)");
    }

    #[test]
    fn test_flatten_layout() {
        assert_eq!(flatten_layout("(:types\nperson\r\nrobot\n)"), "(:types person robot )");
        assert_eq!(flatten_layout("(:action a\n\t:parameters  (?x))"), "(:action a :parameters (?x))");
        assert_eq!(normalize(&flatten_layout("(:types\n\tperson\n)")), "(:types person)");
    }

    #[test]
    fn test_normalize_idempotent() {
        for text in ["(  a  )", "( ( and\n\t ) )", "(at start(robot_at ?r ?r1))", "( = ?duration 5)"] {
            let once = normalize(text);
            assert_eq!(normalize(&once), once);
        }
    }

    #[test]
    fn test_split() {
        assert_eq!(split_top_level("a (b c)").unwrap(), vec!["a", "(b c)"]);
        assert_eq!(split_top_level("at start(robot_at ?r ?r1)").unwrap(), vec!["at", "start", "(robot_at ?r ?r1)"]);
        assert_eq!(split_top_level("and (a)(b (c))").unwrap(), vec!["and", "(a)", "(b (c))"]);
        assert_eq!(split_top_level("").unwrap(), Vec::<String>::new());
        assert!(split_top_level("a (b c").is_err());
        assert!(split_top_level("a b) c").is_err());
    }

    #[test]
    fn test_unwrap_form() {
        assert_eq!(unwrap_form("(a (b c))").unwrap(), "a (b c)");
        assert_eq!(unwrap_form(" (and) ").unwrap(), "and");
        assert!(unwrap_form("(a)(b)").is_err());
        assert!(unwrap_form("a").is_err());
        assert!(unwrap_form("((a)").is_err());
    }

    #[test]
    fn test_strip_comments() {
        assert_eq!(strip_comments("(:types ;; end\nrobot)"), "(:types \nrobot)\n");
    }

    #[test]
    fn test_build_name_string() {
        assert_eq!(build_name_string(vec!["r2d2", "bedroom"]), "r2d2 bedroom");
        assert_eq!(build_name_string(Vec::<&str>::new()), "");
    }
}
