use anyhow::{Context, Result};
use regex::Regex;
use std::env;
use tracing::{debug, warn};

const ENV_VAR_PATTERN: &str = r"\$\{(\w+)\}|\$(\w+)";

fn env_var_regex() -> Result<Regex> {
    Regex::new(ENV_VAR_PATTERN).context("Invalid environment variable pattern")
}

/// Substitute environment variables in the format ${VAR_NAME} or $VAR_NAME
///
/// Unset variables keep their placeholder; numeric fields holding one then
/// fail to parse with a message naming the field.
pub fn substitute_env_vars(content: &str) -> Result<String> {
    let re = env_var_regex()?;
    let mut missing_vars = Vec::new();

    let result = re.replace_all(content, |caps: &regex::Captures<'_>| {
        let placeholder = caps.get(0).map(|m| m.as_str()).unwrap_or_default();
        let Some(var_name) = caps.get(1).or_else(|| caps.get(2)).map(|m| m.as_str()) else {
            return placeholder.to_string();
        };

        match env::var(var_name) {
            Ok(value) => {
                debug!("Substituting environment variable: {} = \"{}\"", var_name, value);
                value
            }
            Err(_) => {
                warn!("Environment variable '{}' not set", var_name);
                missing_vars.push(var_name.to_string());
                placeholder.to_string()
            }
        }
    });

    if !missing_vars.is_empty() {
        debug!(?missing_vars, "Environment variables left unresolved");
    }

    Ok(result.into_owned())
}

/// Check if a string contains unresolved environment variable placeholders
pub fn has_unresolved_env_vars(content: &str) -> bool {
    env_var_regex()
        .map(|re| re.is_match(content))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_substitutes_braced_and_bare() {
        env::set_var("OPENETS_TEST_PRICE_MAX", "42");
        let out = substitute_env_vars("price_max: ${OPENETS_TEST_PRICE_MAX}\nx: $OPENETS_TEST_PRICE_MAX").unwrap();
        assert_eq!(out, "price_max: 42\nx: 42");
    }

    #[test]
    fn test_missing_var_keeps_placeholder() {
        let out = substitute_env_vars("fx_rate: ${OPENETS_TEST_SURELY_UNSET}").unwrap();
        assert_eq!(out, "fx_rate: ${OPENETS_TEST_SURELY_UNSET}");
        assert!(has_unresolved_env_vars(&out));
    }

    #[test]
    fn test_plain_content_untouched() {
        assert!(!has_unresolved_env_vars("smoothing: 0.5"));
    }
}
