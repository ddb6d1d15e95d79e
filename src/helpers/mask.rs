const VISIBLE_PREFIX: usize = 6;

/// Short, log-safe rendition of a secret or bearer token.
pub fn mask_secret(value: &str) -> String {
    if value.is_empty() {
        return "<empty>".to_owned();
    }
    let prefix: String = value.chars().take(VISIBLE_PREFIX).collect();
    if prefix.len() == value.len() {
        "***".to_owned()
    } else {
        format!("{}***", prefix)
    }
}
