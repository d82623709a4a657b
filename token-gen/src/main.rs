use anyhow::{Context, Result, bail};
use chrono::Utc;
use clap::{Parser, Subcommand};

use authz_claims::services::payload::UnsignedPayload;
use authz_claims::services::policy::CredentialDigest;
use authz_claims::{Config, PartyId, build_resolver, telemetry};

/// Developer tool for authz-claims credentials.
///
/// - `payload`: mint an unsigned `claims:` credential
/// - `digest`: print the sha256 used in policy files (`{"sha256": "..."}`)
/// - `check`: decode a credential with the resolver configured from the environment
#[derive(Parser, Debug)]
#[command(name = "token-gen", version, about)]
struct Args {
    /// Print only the value (no extra lines)
    #[arg(long, global = true, default_value_t = false)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build a `claims:` credential
    Payload {
        #[arg(long)]
        admin: bool,
        #[arg(long)]
        public: bool,
        #[arg(long)]
        act_as_any_party: bool,
        /// Party allowed to read (repeatable)
        #[arg(long, value_name = "PARTY")]
        read_as: Vec<String>,
        /// Party allowed to act (repeatable)
        #[arg(long, value_name = "PARTY")]
        act_as: Vec<String>,
        #[arg(long)]
        application_id: Option<String>,
        #[arg(long)]
        identity_provider: Option<String>,
        /// Expire N seconds from now. Default: never.
        #[arg(long, value_name = "N")]
        exp_in_seconds: Option<i64>,
    },
    /// Hex sha256 of a credential
    Digest { credential: String },
    /// Decode a credential and print the resulting claims as JSON
    Check { credential: String },
}

fn parse_parties(names: &[String]) -> Result<Vec<PartyId>> {
    names
        .iter()
        .map(|n| PartyId::parse(n).with_context(|| format!("invalid party name {:?}", n)))
        .collect()
}

// `now + n` as unix seconds; overflow is an error rather than a wrapped past timestamp
fn expiration_from(now: i64, exp_in_seconds: Option<i64>) -> Result<Option<i64>> {
    match exp_in_seconds {
        Some(n) => match now.checked_add(n) {
            Some(exp) => Ok(Some(exp)),
            None => bail!("--exp-in-seconds {} overflows the expiration timestamp", n),
        },
        None => Ok(None),
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    telemetry::init();

    match args.command {
        Command::Payload {
            admin,
            public,
            act_as_any_party,
            read_as,
            act_as,
            application_id,
            identity_provider,
            exp_in_seconds,
        } => {
            let exp = expiration_from(Utc::now().timestamp(), exp_in_seconds)?;
            let payload = UnsignedPayload {
                admin,
                public,
                act_as_any_party,
                read_as: parse_parties(&read_as)?,
                act_as: parse_parties(&act_as)?,
                application_id,
                identity_provider,
                exp,
            };
            let credential = payload.encode()?;

            if args.quiet {
                println!("{}", credential);
                return Ok(());
            }
            println!("credential: {}", credential);
            println!("payload: {}", serde_json::to_string(&payload)?);
            println!("sha256: {}", CredentialDigest::of(credential.as_bytes()).to_hex());
        }
        Command::Digest { credential } => {
            let digest = CredentialDigest::of(credential.as_bytes()).to_hex();
            if args.quiet {
                println!("{}", digest);
            } else {
                println!("sha256: {}", digest);
                println!("policy entry: {}", serde_json::json!({ "sha256": digest }));
            }
        }
        Command::Check { credential } => {
            let config = Config::from_env()?;
            let resolver = build_resolver(&config)?;

            match resolver.decode(Some(credential.as_bytes())) {
                Ok(claims) => {
                    if args.quiet {
                        println!("{}", serde_json::to_string(&claims)?);
                    } else {
                        println!("wildcard: {}", claims.is_wildcard());
                        println!("{}", serde_json::to_string_pretty(&claims)?);
                    }
                }
                Err(err) => {
                    tracing::warn!(code = err.code(), error = %err, "credential rejected");
                    bail!("{}: {}", err.code(), err);
                }
            }
        }
    }

    Ok(())
}
