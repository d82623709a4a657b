/// Factory: build a `ClaimsResolver` from application `Config`.
use std::sync::Arc;

use chrono::Duration;

use super::{
    ClaimsResolver, FixedGrantResolver, PolicyResolver, PolicyResolverOptions, WildcardResolver,
};
use crate::config::{Config, ConfigError, MAX_EXPIRY_LEEWAY_SECONDS, ResolverKind};
use crate::services::policy::{Policy, PolicyFile};

pub fn build_resolver(config: &Config) -> Result<Arc<dyn ClaimsResolver>, ConfigError> {
    let resolver: Arc<dyn ClaimsResolver> = match &config.resolver {
        ResolverKind::Wildcard => {
            tracing::warn!(
                app_env = ?config.app_env,
                "wildcard resolver selected: every credential is granted full access"
            );
            Arc::new(
                WildcardResolver::new().with_max_credential_length(config.max_credential_length),
            )
        }
        ResolverKind::Fixed(party) => {
            tracing::info!(party = %party, "fixed-grant resolver selected");
            Arc::new(
                FixedGrantResolver::for_party(party.clone())
                    .with_max_credential_length(config.max_credential_length),
            )
        }
        ResolverKind::Policy => Arc::new(build_policy_resolver(config)?),
    };

    if config.app_env.is_production() && !matches!(config.resolver, ResolverKind::Policy) {
        tracing::warn!(resolver = ?config.resolver, "stub resolver in production");
    }

    Ok(resolver)
}

fn build_policy_resolver(config: &Config) -> Result<PolicyResolver, ConfigError> {
    let mut builder = Policy::builder();

    for token in &config.wildcard_tokens {
        builder = builder.wildcard_token(token)?;
    }

    if let Some(path) = &config.policy_path {
        let file = PolicyFile::load(path).inspect_err(|err| {
            tracing::error!(path = %path.display(), error = %err, "failed to load policy file");
        })?;
        builder = builder.file(file)?;
    }

    let policy = builder.build();

    // Config は pub field なので from_lookup を経由しない値もここで弾く
    let expiry_leeway = Some(config.expiry_leeway_seconds)
        .filter(|secs| *secs <= MAX_EXPIRY_LEEWAY_SECONDS)
        .and_then(|secs| i64::try_from(secs).ok())
        .and_then(Duration::try_seconds)
        .ok_or(ConfigError::Invalid("AUTHZ_EXPIRY_LEEWAY_SECONDS"))?;

    let options = PolicyResolverOptions {
        party_token_suffix: config.party_token_suffix.clone(),
        accept_unsigned_payloads: config.accept_unsigned_payloads,
        expiry_leeway,
        max_credential_length: config.max_credential_length,
    };

    tracing::info!(
        wildcard = policy.wildcard_count(),
        grants = policy.grant_count(),
        party_tokens = options.party_token_suffix.is_some(),
        unsigned_payloads = options.accept_unsigned_payloads,
        "policy resolver ready"
    );

    if config.app_env.is_production()
        && (policy.wildcard_count() > 0
            || options.party_token_suffix.is_some()
            || options.accept_unsigned_payloads)
    {
        tracing::warn!("test credentials are enabled in production");
    }

    Ok(PolicyResolver::new(policy, options))
}
