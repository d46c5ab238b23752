//! Utility Functions
//!
//! Name conversions and module path arithmetic shared by the code
//! generator and the program evaluator.

use once_cell::sync::Lazy;
use regex::Regex;

/// Regex for dash-case to camelCase conversion
static DASH_CASE_REGEXP: Lazy<Regex> = Lazy::new(|| Regex::new(r"-+([a-z0-9])").unwrap());

/// Slot-context binding attribute on a `template` wrapper: `let-local="key"`.
pub static LET_ATTRIBUTE_REGEXP: Lazy<Regex> = Lazy::new(|| Regex::new(r"^let-(\w+)$").unwrap());

/// Convert dash-case to camelCase
pub fn dash_case_to_camel_case(input: &str) -> String {
    DASH_CASE_REGEXP
        .replace_all(input, |caps: &regex::Captures| caps[1].to_uppercase())
        .to_string()
}

/// Variable name a component tag is imported under: `app-todo-list` becomes
/// `AppTodoList`.
pub fn tag_name_to_var_name(tag: &str) -> String {
    let camel = dash_case_to_camel_case(tag);
    let mut chars = camel.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Local variable introduced by a `let-*` attribute, if `name` is one.
pub fn let_binding_name(name: &str) -> Option<&str> {
    LET_ATTRIBUTE_REGEXP
        .captures(name)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Collapses `.` and `..` segments and duplicate separators.
pub fn normalize_path(path: &str) -> String {
    let absolute = path.starts_with('/');
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if matches!(segments.last(), Some(last) if *last != "..") {
                    segments.pop();
                } else if !absolute {
                    segments.push("..");
                }
            }
            _ => segments.push(segment),
        }
    }
    let joined = segments.join("/");
    if absolute {
        format!("/{}", joined)
    } else if joined.is_empty() {
        ".".to_string()
    } else {
        joined
    }
}

pub fn join_path(dir: &str, path: &str) -> String {
    if path.starts_with('/') {
        normalize_path(path)
    } else {
        normalize_path(&format!("{}/{}", dir, path))
    }
}

pub fn dirname(path: &str) -> String {
    let normalized = normalize_path(path);
    match normalized.rfind('/') {
        Some(0) => "/".to_string(),
        Some(index) => normalized[..index].to_string(),
        None => ".".to_string(),
    }
}

/// Path of `to` relative to the directory `from`, always starting with `.`
/// so it reads as a relative module specifier.
pub fn relative_path(from: &str, to: &str) -> String {
    let from = normalize_path(from);
    let to = normalize_path(to);
    let from_segments: Vec<&str> = from.split('/').filter(|s| !s.is_empty() && *s != ".").collect();
    let to_segments: Vec<&str> = to.split('/').filter(|s| !s.is_empty() && *s != ".").collect();

    let common = from_segments
        .iter()
        .zip(&to_segments)
        .take_while(|(a, b)| a == b)
        .count();

    let mut parts: Vec<&str> = vec![".."; from_segments.len() - common];
    parts.extend(&to_segments[common..]);
    let rel = parts.join("/");

    if rel.starts_with('.') {
        rel
    } else {
        format!("./{}", rel)
    }
}
