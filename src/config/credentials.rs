use tracing::debug;

/// Resolves a config value of the form `$VAR` through `env`. Any other
/// value, or a reference to an unset variable, is returned unchanged.
pub fn resolve_credential<E>(value: &str, env: E) -> String
where
    E: Fn(&str) -> Option<String>,
{
    if let Some(var_name) = value.strip_prefix('$') {
        match env(var_name) {
            Some(resolved) => {
                debug!(var = %var_name, "Resolved credential from environment");
                resolved
            }
            None => {
                debug!(var = %var_name, "Environment variable not set, using literal");
                value.to_string()
            }
        }
    } else {
        value.to_string()
    }
}

/// Masks an access token for display, keeping its last four characters.
pub fn mask_token(token: &str) -> String {
    let chars: Vec<char> = token.chars().collect();
    if chars.len() <= 8 {
        return "****".to_string();
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("****{}", tail)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(key: &str) -> Option<String> {
        (key == "BD_SECRET").then(|| "secret123".to_string())
    }

    #[test]
    fn test_resolve_credential_literal() {
        assert_eq!(resolve_credential("NjE2ZGE0YmYtNzQ0", env), "NjE2ZGE0YmYtNzQ0");
    }

    #[test]
    fn test_resolve_credential_env_var() {
        assert_eq!(resolve_credential("$BD_SECRET", env), "secret123");
    }

    #[test]
    fn test_resolve_credential_missing_env_var() {
        assert_eq!(resolve_credential("$BD_OTHER", env), "$BD_OTHER");
    }

    #[test]
    fn test_mask_token() {
        assert_eq!(mask_token("abcdefghijkl"), "****ijkl");
        assert_eq!(mask_token("short"), "****");
    }
}
