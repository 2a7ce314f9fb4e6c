use accesstoken::{Issuer, Role, TokenConfig};
use accesstoken_auth::AccessToken;
use accesstoken_observability::init_logging;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use serde_json::json;

#[derive(Parser)]
#[command(name = "accesstoken")]
#[command(about = "Issue and inspect signed channel access tokens", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Issue an RTC token (reads TOKEN_APP_ID / TOKEN_APP_CERTIFICATE)
    Issue {
        /// Channel the token grants access to
        #[arg(short, long)]
        channel: String,

        /// Numeric user id; 0 lets any user join
        #[arg(short, long, default_value_t = 0, conflicts_with = "account")]
        uid: u32,

        /// String user account instead of a numeric uid
        #[arg(short, long)]
        account: Option<String>,

        /// Canned privilege set to grant
        #[arg(short, long, default_value_t = Role::Publisher, conflicts_with = "privileges")]
        role: Role,

        /// Explicit privilege id to grant instead of a role (repeatable)
        #[arg(short, long = "privilege")]
        privileges: Vec<u16>,

        /// Token lifetime in seconds (default: TOKEN_EXPIRE_SECONDS)
        #[arg(short, long)]
        expire: Option<u32>,
    },
    /// Decode a token without checking its signature
    Parse {
        token: String,
    },
    /// Decode a token and check signature, app id and expiry
    Verify {
        token: String,
    },
}

fn main() {
    dotenv().ok();
    init_logging();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Issue {
            channel,
            uid,
            account,
            role,
            privileges,
            expire,
        } => handle_issue(&channel, uid, account.as_deref(), role, &privileges, expire),
        Commands::Parse { token } => handle_parse(&token),
        Commands::Verify { token } => handle_verify(&token),
    };

    if let Err(e) = result {
        eprintln!("❌ {:#}", e);
        std::process::exit(1);
    }
}

fn load_issuer() -> Result<Issuer> {
    let config = TokenConfig::from_env().context("Failed to load token configuration")?;
    Ok(Issuer::new(config))
}

fn handle_issue(
    channel: &str,
    uid: u32,
    account: Option<&str>,
    role: Role,
    privileges: &[u16],
    expire: Option<u32>,
) -> Result<()> {
    let issuer = load_issuer()?;
    let expire = expire.unwrap_or(issuer.config().token_expire);
    let privileges = if privileges.is_empty() {
        role.privileges()
    } else {
        privileges
    };

    let issued = match account {
        Some(account) => issuer.issue_for_account(channel, account, privileges, expire),
        None => issuer.issue(channel, uid, privileges, expire),
    }
    .context("Failed to build token")?;

    println!("{}", serde_json::to_string_pretty(&issued)?);
    Ok(())
}

fn handle_parse(token: &str) -> Result<()> {
    let parsed = AccessToken::parse(token).context("Failed to parse token")?;
    let expires_at = DateTime::<Utc>::from_timestamp(parsed.expires_at() as i64, 0);

    let output = json!({
        "token": parsed,
        "expires_at": expires_at.map(|t| t.to_rfc3339()),
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn handle_verify(token: &str) -> Result<()> {
    let issuer = load_issuer()?;
    let now = Utc::now().timestamp().max(0) as u64;
    let parsed = issuer.check(token, now).context("Token rejected")?;

    println!("✅ Token valid for app {}", parsed.app_id);
    if let Some(rtc) = parsed.rtc() {
        println!("   Channel: {}", rtc.channel_name);
        println!("   Uid: {}", if rtc.uid.is_empty() { "*" } else { rtc.uid.as_str() });
    }
    Ok(())
}
