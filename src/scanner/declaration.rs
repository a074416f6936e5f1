//! Turns one retained line of code into the lexical pieces of a declaration.

use once_cell::sync::Lazy;
use regex::Regex;

use shimgen_ffi::types::tidy_type;

static DEFAULT_VALUE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s*=\s*[^,)]+").expect("default value pattern is valid"));

static DELETED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"=\s*delete\s*;").expect("deleted pattern is valid"));

static CLASS_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bclass\s+([A-Za-z_]\w*)").expect("class pattern is valid"));

const DROPPED_KEYWORDS: &[&str] = &["static", "virtual", "inline"];

/// Pieces of a declaration line before any class handling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclarationParts {
    pub is_static: bool,
    pub return_type: String,
    pub name: String,
    pub raw_parameters: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineShape {
    Declaration(DeclarationParts),
    /// Not a function declaration: constructors, destructors and the like.
    Ignored,
    /// No parameter list could be located.
    Malformed,
}

/// Name introduced by `class Foo`, ignoring friend and template parameter
/// uses of the keyword.
pub fn class_name(code: &str) -> Option<&str> {
    if code.contains("friend class") || code.contains("template") {
        return None;
    }
    CLASS_NAME
        .captures(code)
        .and_then(|captures| captures.get(1))
        .map(|name| name.as_str())
}

pub fn is_deleted(code: &str) -> bool {
    DELETED.is_match(code)
}

/// Removes nested parentheses after the first `(` until only the outermost
/// parameter list remains, so `f(int a = g(1, 2))` becomes `f(int a = g)`.
pub fn collapse_nested_parens(code: &str) -> Option<String> {
    let open = code.find('(')?;
    let (head, tail) = code.split_at(open + 1);
    let mut tail = tail.to_string();

    while let Some(left) = tail.find('(') {
        let Some(right) = tail[left..].find(')') else {
            break;
        };
        tail.replace_range(left..=left + right, "");
    }

    Some(format!("{head}{tail}"))
}

pub fn strip_default_values(code: &str) -> String {
    DEFAULT_VALUE.replace_all(code, "").into_owned()
}

pub fn parse_line(code: &str) -> LineShape {
    let Some(collapsed) = collapse_nested_parens(code) else {
        return LineShape::Malformed;
    };
    let cleaned = strip_default_values(&collapsed);

    let Some(open) = cleaned.find('(') else {
        return LineShape::Malformed;
    };
    let Some(close) = cleaned[open..].find(')') else {
        return LineShape::Malformed;
    };
    let raw_parameters = cleaned[open + 1..open + close].to_string();

    let mut is_static = false;
    let mut tokens: Vec<&str> = Vec::new();
    for token in cleaned[..open].split_whitespace() {
        if token == "static" {
            is_static = true;
        }
        if !DROPPED_KEYWORDS.contains(&token) {
            tokens.push(token);
        }
    }

    let Some((name, return_tokens)) = tokens.split_last() else {
        return LineShape::Ignored;
    };
    if return_tokens.is_empty() {
        return LineShape::Ignored;
    }

    let mut return_type = tidy_type(&return_tokens.join(" "));
    let marks = name.len() - name.trim_start_matches(['*', '&']).len();
    return_type.push_str(&name[..marks]);
    let name = name[marks..].to_string();
    if name.is_empty() {
        return LineShape::Ignored;
    }

    LineShape::Declaration(DeclarationParts {
        is_static,
        return_type,
        name,
        raw_parameters,
    })
}
