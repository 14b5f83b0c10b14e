use regex::{Captures, Regex};
use std::collections::HashMap;
use std::sync::OnceLock;

fn placeholder_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\{\{\{(\w+)\}\}\}").expect("placeholder pattern is valid"))
}

/// 替換模板中所有 `{{{key}}}`；沒有對應值的保留原樣
pub fn render(template: &str, substitutions: &HashMap<String, String>) -> String {
    placeholder_pattern()
        .replace_all(template, |caps: &Captures| match substitutions.get(&caps[1]) {
            Some(value) => value.clone(),
            None => caps[0].to_string(),
        })
        .into_owned()
}
