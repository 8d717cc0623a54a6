use core_config::{ConfigError, FromEnv, env_required};

/// JWT signing configuration.
#[derive(Clone, Debug)]
pub struct JwtConfig {
    /// HMAC signing secret (HS256)
    pub secret: String,
}

impl JwtConfig {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }
}

impl FromEnv for JwtConfig {
    /// Reads `JWT_SECRET` (required, minimum 32 bytes).
    fn from_env() -> Result<Self, ConfigError> {
        let secret = env_required("JWT_SECRET")?;

        if secret.len() < 32 {
            return Err(ConfigError::ParseError {
                key: "JWT_SECRET".to_string(),
                details: "must be at least 32 bytes".to_string(),
            });
        }

        Ok(Self { secret })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_env_requires_secret() {
        temp_env::with_var_unset("JWT_SECRET", || {
            assert!(JwtConfig::from_env().is_err());
        });
    }

    #[test]
    fn test_from_env_rejects_short_secret() {
        temp_env::with_var("JWT_SECRET", Some("too-short"), || {
            assert!(JwtConfig::from_env().is_err());
        });
    }

    #[test]
    fn test_from_env_accepts_long_secret() {
        temp_env::with_var(
            "JWT_SECRET",
            Some("0123456789abcdef0123456789abcdef"),
            || {
                let config = JwtConfig::from_env().unwrap();
                assert_eq!(config.secret.len(), 32);
            },
        );
    }
}
