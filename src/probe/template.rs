use anyhow::{anyhow, Result};
use regex::Regex;
use std::collections::HashMap;
use std::sync::OnceLock;

fn placeholder_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{\s*([a-zA-Z0-9_]+)\s*\}").expect("placeholder regex is valid"))
}

/// Render an endpoint template
/// template: "/core/v1/items/{item_id}/messages"
/// vars: { "item_id" => "7464870989" }
pub fn render_endpoint(template: &str, vars: &HashMap<String, String>) -> Result<String> {
    let mut missing = Vec::new();
    let result = placeholder_regex().replace_all(template, |caps: &regex::Captures| {
        let name = &caps[1];
        match vars.get(name) {
            Some(val) => val.clone(),
            None => {
                missing.push(name.to_owned());
                String::new()
            }
        }
    });

    if !missing.is_empty() {
        return Err(anyhow!("endpoint '{}' has unresolved placeholders: {}", template, missing.join(", ")));
    }

    Ok(result.to_string())
}

/// Names of every `{placeholder}` in a template, in order of appearance.
pub fn placeholders(template: &str) -> Vec<String> {
    placeholder_regex()
        .captures_iter(template)
        .map(|caps| caps[1].to_owned())
        .collect()
}
