pub mod prompt;

/// Environment variable name for providing an API token without signing in
pub const ENV_TOKEN_VAR: &str = "EXAM_RESULTS_TOKEN";

pub use prompt::{prompt_for_login, sign_in_interactive};

/// Check for an API token in the EXAM_RESULTS_TOKEN environment variable.
/// Returns Some(token) if the env var is set and non-empty, None otherwise.
pub fn get_token_from_env() -> Option<String> {
    token_from_value(std::env::var(ENV_TOKEN_VAR).ok())
}

fn token_from_value(value: Option<String>) -> Option<String> {
    value
        .map(|val| val.trim().to_string())
        .filter(|val| !val.is_empty())
}
