use crate::common::EMAIL_REGEX_PATTERN;
use crate::error::SmokeError;

use clap::{Arg, ArgAction, ArgMatches, Command};
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8081/api";
pub const DEFAULT_EMAIL: &str = "test1@example.com";
pub const DEFAULT_PASSWORD: &str = "password123";
pub const DEFAULT_USERNAME: &str = "testuser1";
pub const BIO: &str = "Smoke test user";

pub const XDG_PREFIX: &str = "api-smoke";
pub const CONFIG_FILE: &str = "config.ini";

static EMAIL_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(EMAIL_REGEX_PATTERN).expect("Email pattern doesn't compile"));

pub fn cli() -> Command {
    Command::new("api-smoke")
        .about("Smoke test a users/posts REST API: signup, login, create and list posts")
        .arg(
            Arg::new("base-url")
                .long("base-url")
                .short('u')
                .env("SMOKE_BASE_URL")
                .help("Base URL every path is appended to. Default: http://localhost:8081/api"),
        )
        .arg(
            Arg::new("email")
                .long("email")
                .short('e')
                .env("SMOKE_EMAIL")
                .help("Email used for signup and login. Default: test1@example.com"),
        )
        .arg(
            Arg::new("password")
                .long("password")
                .short('p')
                .env("SMOKE_PASSWORD")
                .hide_env_values(true)
                .help("Password used for signup and login. Default: password123"),
        )
        .arg(
            Arg::new("username")
                .long("username")
                .help("Username used for signup. Default: testuser1"),
        )
        .arg(
            Arg::new("timeout")
                .long("timeout")
                .short('t')
                .env("SMOKE_TIMEOUT")
                .help("Optional per request timeout, e.g. 5s or 1500ms. Default: no timeout"),
        )
        .arg(
            Arg::new("unique")
                .long("unique")
                .action(ArgAction::SetTrue)
                .help("Add a random tag to the email so every run signs up a fresh user"),
        )
        .arg(
            Arg::new("strict")
                .long("strict")
                .action(ArgAction::SetTrue)
                .help("Exit with status 1 when any step doesn't meet its expectation"),
        )
        .arg(
            Arg::new("extended")
                .long("extended")
                .action(ArgAction::SetTrue)
                .help("Also fetch the created user and post, and create and list a comment"),
        )
}

/// `key = value` lines read from `config.ini`.
#[derive(Debug, Default, Clone)]
pub struct ConfigFile {
    entries: Vec<(String, String)>,
}

impl ConfigFile {
    pub fn parse(contents: &str) -> Self {
        let entries = contents
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty() && !l.starts_with('#') && !l.starts_with(';'))
            .filter_map(|l| l.split_once('='))
            .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
            .filter(|(k, _)| !k.is_empty())
            .collect();

        Self { entries }
    }

    pub fn read(path: &Path) -> Result<Self, SmokeError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| SmokeError::Config(format!("{}: {}", path.display(), e)))?;
        Ok(Self::parse(&contents))
    }

    /// Looks for `config.ini` in the XDG config folder. No file means no values.
    pub fn load() -> Result<Self, SmokeError> {
        let xdg_dirs = xdg::BaseDirectories::with_prefix(XDG_PREFIX)
            .map_err(|e| SmokeError::Config(e.to_string()))?;

        match xdg_dirs.find_config_file(CONFIG_FILE) {
            Some(path) => {
                tracing::debug!("reading config from {}", path.display());
                Self::read(&path)
            }
            None => Ok(Self::default()),
        }
    }

    // Last assignment wins
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub base_url: String,
    pub email: String,
    pub password: String,
    pub username: String,
    pub timeout: Option<Duration>,
    pub strict: bool,
    pub extended: bool,
}

impl Config {
    /// Flag (or its env variable) first, then the config file, then the default.
    pub fn from_matches(matches: &ArgMatches, file: &ConfigFile) -> Result<Self, SmokeError> {
        let pick = |id: &str, key: &str, default: &str| -> String {
            matches
                .get_one::<String>(id)
                .map(String::as_str)
                .or_else(|| file.get(key))
                .unwrap_or(default)
                .to_string()
        };

        let base_url = normalize_base_url(&pick("base-url", "base_url", DEFAULT_BASE_URL))?;

        let mut email = pick("email", "email", DEFAULT_EMAIL);
        if !EMAIL_REGEX.is_match(&email) {
            return Err(SmokeError::InvalidEmail(email));
        }
        if matches.get_flag("unique") {
            let tag: String = uuid::Uuid::new_v4().simple().to_string().chars().take(8).collect();
            email = tag_email(&email, &tag);
        }

        let timeout = match matches
            .get_one::<String>("timeout")
            .map(String::as_str)
            .or_else(|| file.get("timeout"))
        {
            Some(t) => Some(parse_timeout(t)?),
            None => None,
        };

        Ok(Self {
            base_url,
            email,
            password: pick("password", "password", DEFAULT_PASSWORD),
            username: pick("username", "username", DEFAULT_USERNAME),
            timeout,
            strict: matches.get_flag("strict"),
            extended: matches.get_flag("extended"),
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            email: DEFAULT_EMAIL.to_string(),
            password: DEFAULT_PASSWORD.to_string(),
            username: DEFAULT_USERNAME.to_string(),
            timeout: None,
            strict: false,
            extended: false,
        }
    }
}

pub fn normalize_base_url(url: &str) -> Result<String, SmokeError> {
    let url = url.trim();
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(SmokeError::InvalidBaseUrl(url.to_string()));
    }
    Ok(url.trim_end_matches('/').to_string())
}

/// `name@host` becomes `name+tag@host`.
pub fn tag_email(email: &str, tag: &str) -> String {
    match email.split_once('@') {
        Some((local, host)) => format!("{}+{}@{}", local, tag, host),
        None => email.to_string(),
    }
}

pub fn parse_timeout(value: &str) -> Result<Duration, SmokeError> {
    humantime::parse_duration(value.trim()).map_err(|e| SmokeError::InvalidTimeout {
        value: value.to_string(),
        reason: e.to_string(),
    })
}
