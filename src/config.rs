/*
 * Responsibility
 * - 環境変数や設定の読み込み (resolver 種別, policy file, wildcard token など)
 * - 設定値のバリデーション (不正なら起動失敗)
 * - development / production で既定値を切り替える
 */
use std::fmt;
use std::path::PathBuf;

use crate::claims::PartyId;
use crate::services::policy::PolicyError;
use crate::services::resolver::{DEFAULT_MAX_CREDENTIAL_LENGTH, is_token_byte};

/// Clock skew tolerance above one day is a misconfiguration.
pub const MAX_EXPIRY_LEEWAY_SECONDS: u64 = 86_400;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    fn parse(value: Option<&str>) -> Self {
        match value
            .unwrap_or("development")
            .to_ascii_lowercase()
            .as_str()
        {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolverKind {
    Policy,
    Wildcard,
    Fixed(PartyId),
}

#[derive(Debug)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid(&'static str),
    Policy(PolicyError),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "missing configuration: {}", key),
            ConfigError::Invalid(key) => write!(f, "invalid configuration: {}", key),
            ConfigError::Policy(e) => write!(f, "invalid policy: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Policy(e) => Some(e),
            _ => None,
        }
    }
}

impl From<PolicyError> for ConfigError {
    fn from(e: PolicyError) -> Self {
        Self::Policy(e)
    }
}

#[derive(Clone)]
pub struct Config {
    pub app_env: AppEnv,
    pub resolver: ResolverKind,

    pub policy_path: Option<PathBuf>,
    pub wildcard_tokens: Vec<String>,

    pub party_token_suffix: Option<String>,
    pub accept_unsigned_payloads: bool,

    pub expiry_leeway_seconds: u64,
    pub max_credential_length: usize,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // wildcard token は credential そのものなので件数だけ
        f.debug_struct("Config")
            .field("app_env", &self.app_env)
            .field("resolver", &self.resolver)
            .field("policy_path", &self.policy_path)
            .field("wildcard_tokens", &self.wildcard_tokens.len())
            .field("party_token_suffix", &self.party_token_suffix)
            .field("accept_unsigned_payloads", &self.accept_unsigned_payloads)
            .field("expiry_leeway_seconds", &self.expiry_leeway_seconds)
            .field("max_credential_length", &self.max_credential_length)
            .finish()
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup (tests pass a map here).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let app_env = AppEnv::parse(lookup("APP_ENV").as_deref());
        let dev = !app_env.is_production();

        let resolver = match lookup("AUTHZ_RESOLVER")
            .unwrap_or_else(|| "policy".to_string())
            .to_ascii_lowercase()
            .as_str()
        {
            "policy" => ResolverKind::Policy,
            "wildcard" => ResolverKind::Wildcard,
            "fixed" => {
                let party = lookup("AUTHZ_FIXED_PARTY")
                    .ok_or(ConfigError::Missing("AUTHZ_FIXED_PARTY"))?;
                let party = PartyId::parse(party.trim())
                    .map_err(|_| ConfigError::Invalid("AUTHZ_FIXED_PARTY"))?;
                ResolverKind::Fixed(party)
            }
            _ => return Err(ConfigError::Invalid("AUTHZ_RESOLVER")),
        };

        let policy_path = lookup("AUTHZ_POLICY_PATH")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .map(PathBuf::from);

        let wildcard_tokens = match lookup("AUTHZ_WILDCARD_TOKENS") {
            Some(raw) => raw
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect::<Vec<_>>(),
            None if dev => vec!["wildcard-token".to_string()],
            None => Vec::new(),
        };

        let party_token_suffix = match lookup("AUTHZ_PARTY_TOKEN_SUFFIX") {
            Some(s) => Some(s.trim().to_string()).filter(|s| !s.is_empty()),
            None if dev => Some("-token".to_string()),
            None => None,
        };

        let accept_unsigned_payloads = match lookup("AUTHZ_ACCEPT_UNSIGNED_PAYLOADS") {
            Some(v) => parse_bool(&v).ok_or(ConfigError::Invalid("AUTHZ_ACCEPT_UNSIGNED_PAYLOADS"))?,
            None => dev,
        };

        let expiry_leeway_seconds = match lookup("AUTHZ_EXPIRY_LEEWAY_SECONDS") {
            Some(v) => v
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|n| *n <= MAX_EXPIRY_LEEWAY_SECONDS)
                .ok_or(ConfigError::Invalid("AUTHZ_EXPIRY_LEEWAY_SECONDS"))?,
            None => 60,
        };

        let max_credential_length = match lookup("AUTHZ_MAX_CREDENTIAL_LENGTH") {
            Some(v) => v
                .trim()
                .parse::<usize>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or(ConfigError::Invalid("AUTHZ_MAX_CREDENTIAL_LENGTH"))?,
            None => DEFAULT_MAX_CREDENTIAL_LENGTH,
        };

        // validate_credential が通さない token は policy に入れても一致しない
        let unmatchable = wildcard_tokens
            .iter()
            .any(|t| t.len() > max_credential_length || !t.bytes().all(is_token_byte));
        if unmatchable {
            return Err(ConfigError::Invalid("AUTHZ_WILDCARD_TOKENS"));
        }

        Ok(Self {
            app_env,
            resolver,
            policy_path,
            wildcard_tokens,
            party_token_suffix,
            accept_unsigned_payloads,
            expiry_leeway_seconds,
            max_credential_length,
        })
    }
}

fn parse_bool(v: &str) -> Option<bool> {
    match v.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
