//! Configuration loading and management.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use anyhow::{Context, Result, bail};
use bounty_core::{FlexBalanceOptions, Holiday, Workdays, parse_hhmm};
use bounty_core::{DEFAULT_HOURS_ON_HOLIDAYS, DEFAULT_HOURS_ON_WORKDAYS};
use bounty_integrations::{Integration, clockify, harvest, xledger};
use chrono::NaiveDate;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};

static PLACEHOLDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").unwrap());

/// Which backend supplies worked hours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntegrationKind {
    Harvest,
    Clockify,
    XLedger,
}

impl IntegrationKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Harvest => "harvest",
            Self::Clockify => "clockify",
            Self::XLedger => "xledger",
        }
    }
}

impl fmt::Display for IntegrationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `[harvest]` section.
///
/// Without `entries_to_ignore`, entries registered as absence are ignored.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HarvestConfig {
    pub token: String,
    pub account_id: String,
    pub entries_to_ignore: Vec<harvest::EntryFilter>,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            account_id: String::new(),
            entries_to_ignore: harvest::default_entries_to_ignore(),
        }
    }
}

impl fmt::Debug for HarvestConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HarvestConfig")
            .field("token", &"[REDACTED]")
            .field("account_id", &self.account_id)
            .field("entries_to_ignore", &self.entries_to_ignore)
            .finish()
    }
}

/// `[clockify]` section.
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClockifyConfig {
    pub api_key: String,
    pub workspace_id: String,
    pub entries_to_ignore: Vec<clockify::EntryFilter>,
}

impl fmt::Debug for ClockifyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClockifyConfig")
            .field("api_key", &"[REDACTED]")
            .field("workspace_id", &self.workspace_id)
            .field("entries_to_ignore", &self.entries_to_ignore)
            .finish()
    }
}

/// `[xledger]` section.
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct XLedgerConfig {
    pub api_key: String,
    pub employee_id: Option<i64>,
}

impl fmt::Debug for XLedgerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("XLedgerConfig")
            .field("api_key", &"[REDACTED]")
            .field("employee_id", &self.employee_id)
            .finish()
    }
}

/// An hour amount written either as a number or as `"HH:MM"`.
#[derive(Deserialize)]
#[serde(untagged)]
enum Hours {
    Decimal(f64),
    Clock(String),
}

impl Hours {
    fn into_f64(self) -> bounty_core::Result<f64> {
        match self {
            Self::Decimal(hours) => Ok(hours),
            Self::Clock(text) => parse_hhmm(&text),
        }
    }
}

fn deserialize_hours<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    Hours::deserialize(deserializer)?
        .into_f64()
        .map_err(serde::de::Error::custom)
}

fn deserialize_holiday_hours<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<BTreeMap<Holiday, f64>, D::Error> {
    BTreeMap::<Holiday, Hours>::deserialize(deserializer)?
        .into_iter()
        .map(|(holiday, hours)| hours.into_f64().map(|hours| (holiday, hours)))
        .collect::<bounty_core::Result<_>>()
        .map_err(serde::de::Error::custom)
}

/// Application configuration.
///
/// Hour amounts accept `7.5` as well as `"07:30"`; `reference_balance` may be
/// negative in either form.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Backend used when `balance` is run without `--hours`.
    pub integration: Option<IntegrationKind>,
    /// Day whose end-of-day balance is `reference_balance`.
    pub reference_date: Option<NaiveDate>,
    #[serde(deserialize_with = "deserialize_hours")]
    pub reference_balance: f64,
    pub workdays: Workdays,
    #[serde(deserialize_with = "deserialize_hours")]
    pub hours_on_workdays: f64,
    #[serde(deserialize_with = "deserialize_hours")]
    pub hours_on_holidays: f64,
    #[serde(deserialize_with = "deserialize_holiday_hours")]
    pub hours_on_specific_holidays: BTreeMap<Holiday, f64>,
    pub harvest: Option<HarvestConfig>,
    pub clockify: Option<ClockifyConfig>,
    pub xledger: Option<XLedgerConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            integration: None,
            reference_date: None,
            reference_balance: 0.0,
            workdays: Workdays::default(),
            hours_on_workdays: DEFAULT_HOURS_ON_WORKDAYS,
            hours_on_holidays: DEFAULT_HOURS_ON_HOLIDAYS,
            hours_on_specific_holidays: BTreeMap::new(),
            harvest: None,
            clockify: None,
            xledger: None,
        }
    }
}

impl Config {
    /// Loads configuration, optionally from a specific file.
    pub fn load_from(config_path: Option<&Path>) -> Result<Self> {
        Self::from_figment(&Self::figment(config_path))
    }

    /// Layers defaults, the platform config file, `config_path` and `BOUNTY_*`
    /// environment variables, later layers winning.
    pub fn figment(config_path: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Load from default config location
        if let Some(path) = default_config_file() {
            figment = figment.merge(Toml::file(path));
        }

        // Load from specified config file
        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // Load from environment variables (BOUNTY_*), `__` separating nested keys
        figment.merge(Env::prefixed("BOUNTY_").split("__"))
    }

    /// Extracts the configuration and expands `${VAR}` placeholders in
    /// integration credentials.
    pub fn from_figment(figment: &Figment) -> Result<Self> {
        let mut config: Self = figment
            .extract()
            .context("failed to parse configuration")?;
        config.expand_placeholders(|name| std::env::var(name).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Checks what deserialization cannot express on its own.
    fn validate(&self) -> Result<()> {
        if let Some(xledger) = &self.xledger {
            match xledger.employee_id {
                None => bail!("xledger.employee_id is not configured"),
                Some(id) if id <= 0 => bail!("xledger.employee_id must be positive, got {id}"),
                Some(_) => {}
            }
        }
        Ok(())
    }

    fn expand_placeholders(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(harvest) = &mut self.harvest {
            harvest.token = expand_placeholders(&harvest.token, &lookup)?;
            harvest.account_id = expand_placeholders(&harvest.account_id, &lookup)?;
        }
        if let Some(clockify) = &mut self.clockify {
            clockify.api_key = expand_placeholders(&clockify.api_key, &lookup)?;
            clockify.workspace_id = expand_placeholders(&clockify.workspace_id, &lookup)?;
        }
        if let Some(xledger) = &mut self.xledger {
            xledger.api_key = expand_placeholders(&xledger.api_key, &lookup)?;
        }
        Ok(())
    }

    /// Balance engine options for a period ending at `to`.
    pub fn balance_options(&self, to: NaiveDate) -> FlexBalanceOptions {
        FlexBalanceOptions {
            to: Some(to),
            workdays: self.workdays.clone(),
            holidays: None,
            hours_on_workdays: self.hours_on_workdays,
            hours_on_holidays: self.hours_on_holidays,
            hours_on_specific_holidays: self.hours_on_specific_holidays.clone(),
        }
    }

    /// Builds the client for the selected integration.
    pub fn integration(&self) -> Result<Integration> {
        let Some(kind) = self.integration else {
            bail!("no integration configured; set `integration` or pass --hours");
        };
        let missing = || format!("integration `{kind}` selected but the [{kind}] section is missing");

        let integration = match kind {
            IntegrationKind::Harvest => {
                let section = self.harvest.as_ref().with_context(missing)?;
                Integration::Harvest(harvest::Client::new(
                    section.token.clone(),
                    section.account_id.clone(),
                    section.entries_to_ignore.clone(),
                )?)
            }
            IntegrationKind::Clockify => {
                let section = self.clockify.as_ref().with_context(missing)?;
                Integration::Clockify(clockify::Client::new(
                    section.api_key.clone(),
                    section.workspace_id.clone(),
                    section.entries_to_ignore.clone(),
                )?)
            }
            IntegrationKind::XLedger => {
                let section = self.xledger.as_ref().with_context(missing)?;
                let employee_id = section
                    .employee_id
                    .context("xledger.employee_id is not configured")?;
                Integration::XLedger(xledger::Client::new(section.api_key.clone(), employee_id)?)
            }
        };
        Ok(integration)
    }
}

/// Replaces every `${NAME}` with the value `lookup` returns for `NAME`.
pub fn expand_placeholders(value: &str, lookup: impl Fn(&str) -> Option<String>) -> Result<String> {
    let mut expanded = String::with_capacity(value.len());
    let mut last = 0;
    for caps in PLACEHOLDER_RE.captures_iter(value) {
        let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let Some(replacement) = lookup(name.as_str()) else {
            bail!(
                "environment variable `{}` referenced in configuration is not set",
                name.as_str()
            );
        };
        expanded.push_str(&value[last..whole.start()]);
        expanded.push_str(&replacement);
        last = whole.end();
    }
    expanded.push_str(&value[last..]);
    Ok(expanded)
}

/// Returns the platform-specific config directory for bounty.
///
/// On Linux: `~/.config/bounty`
pub fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("bounty"))
}

/// Returns the platform-specific config file path.
pub fn default_config_file() -> Option<PathBuf> {
    dirs_config_path().map(|p| p.join("config.toml"))
}
