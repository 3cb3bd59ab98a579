use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use chronoflow_core::{week_start_of, ScheduleConfig};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::state::{ensure_chronoflow_home, state_store};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub week: WeekSection,
    pub schedule: ScheduleConfig,
    pub log: LogSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WeekSection {
    /// "reference" (the built-in week), "current" (Monday of this week) or a
    /// YYYY-MM-DD date whose week is scheduled.
    pub anchor: String,
}

impl Default for WeekSection {
    fn default() -> Self {
        Self {
            anchor: "reference".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSection {
    /// Fallback filter when CHRONOFLOW_LOG is unset.
    pub level: String,
}

impl Default for LogSection {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
        }
    }
}

impl Config {
    /// Schedule config with the `[week]` anchor applied.
    pub fn schedule_for(&self, today: NaiveDate) -> Result<ScheduleConfig> {
        let anchor = resolve_anchor(&self.week.anchor, today, self.schedule.anchor)?;
        Ok(self.schedule.clone().with_anchor(anchor))
    }
}

pub fn resolve_anchor(anchor: &str, today: NaiveDate, reference: NaiveDate) -> Result<NaiveDate> {
    match anchor.trim() {
        "" | "reference" => Ok(reference),
        "current" => Ok(week_start_of(today)),
        other => {
            let Ok(date) = NaiveDate::parse_from_str(other, "%Y-%m-%d") else {
                bail!("invalid week anchor '{other}' (expected reference, current or YYYY-MM-DD)");
            };
            Ok(week_start_of(date))
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    Ok(ensure_chronoflow_home()?.join("config.toml"))
}

pub fn load_config() -> Result<Config> {
    let p = config_path()?;
    if !p.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
    toml::from_str(&s).context("parse config.toml")
}

pub fn save_config(cfg: &Config) -> Result<()> {
    let p = config_path()?;
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(&p, s).with_context(|| format!("write {}", p.display()))?;
    Ok(())
}

/// Write defaults unless a config exists, then report where state lives and
/// which week is being scheduled.
pub fn init_config(today: NaiveDate) -> Result<()> {
    let p = config_path()?;
    let cfg = if p.exists() {
        println!("Config already exists: {}", p.display());
        load_config()?
    } else {
        let cfg = Config::default();
        save_config(&cfg)?;
        println!("Wrote {}", p.display());
        cfg
    };

    let store = state_store()?;
    println!("{}", describe_setup(&cfg, today, store.dir())?);
    Ok(())
}

fn describe_setup(cfg: &Config, today: NaiveDate, state_dir: &Path) -> Result<String> {
    let anchor = cfg.schedule_for(today)?.anchor;
    Ok(format!(
        "State directory: {}\nScheduling week of {} ({})",
        state_dir.display(),
        anchor.format("%a %b %-d %Y"),
        cfg.week.anchor
    ))
}
