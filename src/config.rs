use crate::filter::ContentFilter;
use crate::nostr::Keys;
use crate::render::{Template, DEFAULT_FORMAT};
use anyhow::{Context, Result};
use clap::Parser;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Command-line flags. Secrets and connection settings can also come from
/// the environment (or a `.env` file loaded before parsing).
#[derive(Debug, Default, Parser)]
#[command(name = "feed2nostr", about = "Post new feed items to Nostr relays")]
pub struct Cli {
    /// Feed URL
    #[arg(long, env = "FEED2NOSTR_FEED")]
    pub feed: Option<String>,

    /// Database source (Postgres DSN)
    #[arg(long, env = "FEED2NOSTR_DSN", hide_env_values = true)]
    pub dsn: Option<String>,

    /// Post format
    #[arg(long)]
    pub format: Option<String>,

    /// Only post items whose rendered text matches this regex
    #[arg(long)]
    pub pattern: Option<String>,

    /// Nostr secret key (nsec1... or hex)
    #[arg(long, env = "FEED2NOSTR_NSEC", hide_env_values = true)]
    pub nsec: Option<String>,

    /// Comma-separated relay URLs
    #[arg(long, env = "FEED2NOSTR_RELAYS")]
    pub relays: Option<String>,

    /// Log posts instead of publishing them
    #[arg(long)]
    pub skip: bool,

    /// TOML file with defaults for any of the options above
    #[arg(long, env = "FEED2NOSTR_CONFIG")]
    pub config: Option<PathBuf>,

    /// Show version
    #[arg(short = 'v')]
    pub show_version: bool,
}

/// `relays` in the config file may be a list or a comma-separated string.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum RelaysValue {
    List(Vec<String>),
    Joined(String),
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub feed: Option<String>,
    pub dsn: Option<String>,
    pub format: Option<String>,
    pub pattern: Option<String>,
    pub nsec: Option<String>,
    pub relays: Option<RelaysValue>,
    pub skip: Option<bool>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: FileConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config TOML: {}", path.display()))?;
        Ok(config)
    }
}

/// Everything one run needs, resolved and validated up front.
#[derive(Debug)]
pub struct Config {
    pub feed_url: String,
    pub dsn: Option<String>,
    pub template: Template,
    pub filter: ContentFilter,
    pub relays: Vec<String>,
    /// Absent only in dry-run mode when no key was supplied.
    pub keys: Option<Keys>,
    pub dry_run: bool,
}

impl Config {
    /// Resolve flags, environment and the optional config file.
    pub fn load(cli: Cli) -> Result<Self> {
        let file = match &cli.config {
            Some(path) => FileConfig::load(path)?,
            None => FileConfig::default(),
        };
        Self::from_sources(cli, file)
    }

    /// Flag/env values win over the file. Template, pattern, relays and key
    /// are all checked here so a bad setting fails before any work is done.
    pub fn from_sources(cli: Cli, file: FileConfig) -> Result<Self> {
        let feed_url = cli
            .feed
            .or(file.feed)
            .map(|f| f.trim().to_string())
            .filter(|f| !f.is_empty())
            .context("must specify a feed URL (--feed)")?;

        let dry_run = cli.skip || file.skip.unwrap_or(false);

        let format = cli.format.or(file.format);
        let template = Template::compile(format.as_deref().unwrap_or(DEFAULT_FORMAT))
            .context("invalid post format")?;

        let pattern = cli.pattern.or(file.pattern);
        let filter = ContentFilter::new(pattern.as_deref()).context("invalid match pattern")?;

        let relays = match (cli.relays, file.relays) {
            (Some(joined), _) | (None, Some(RelaysValue::Joined(joined))) => parse_relays(&joined),
            (None, Some(RelaysValue::List(list))) => clean_relays(list),
            (None, None) => Vec::new(),
        };
        if relays.is_empty() {
            anyhow::bail!("must specify relays (--relays)");
        }

        let keys = match cli.nsec.or(file.nsec).map(|k| sanitize_key(&k)) {
            Some(nsec) if !nsec.is_empty() => {
                Some(Keys::parse(&nsec).context("invalid nsec")?)
            }
            _ if dry_run => None,
            _ => anyhow::bail!("must specify a secret key (--nsec)"),
        };

        Ok(Self {
            feed_url,
            dsn: cli.dsn.or(file.dsn),
            template,
            filter,
            relays,
            keys,
            dry_run,
        })
    }
}

/// Split a comma-separated relay list, dropping blanks.
pub fn parse_relays(joined: &str) -> Vec<String> {
    clean_relays(joined.split(','))
}

fn clean_relays<I, S>(relays: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    relays
        .into_iter()
        .map(|r| r.as_ref().trim().to_string())
        .filter(|r| !r.is_empty())
        .collect()
}

/// Strip carriage returns, BOM, and other invisible chars from a key value.
fn sanitize_key(raw: &str) -> String {
    raw.replace(['\r', '\u{feff}', '\u{200b}'], "")
        .trim()
        .to_string()
}
