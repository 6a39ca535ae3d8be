// src/config.rs

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};
use url::Url;

pub const POLICE_URL: &str = "https://policja.pl/pol/form/1,Informacja-dzienna.html?page=0";
pub const POLICE_TABLE: &str = "table.table-listing.table-striped.margin_b20";
pub const HOLIDAYS_URL: &str = "https://www.timeanddate.com/holidays/poland/{year}";
pub const HOLIDAYS_TABLE: &str = "table#holidays-table";
pub const WEATHER_URL: &str = "https://danepubliczne.imgw.pl/data/dane_pomiarowo_obserwacyjne/dane_meteorologiczne/dobowe/klimat/{year}/{year}_{month}_k.zip";
pub const WEATHER_STATION: &str = "PSZCZYNA";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub fetch: FetchConfig,
    pub police: PoliceConfig,
    pub holidays: HolidaysConfig,
    pub weather: WeatherConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Pause before every request; the source throttles bursts.
    pub request_delay_ms: u64,
    pub request_timeout_secs: u64,
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            request_delay_ms: 700,
            request_timeout_secs: 5,
            user_agent: format!("crashscraper/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl FetchConfig {
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PoliceConfig {
    pub url: String,
    pub table_selector: String,
}

impl Default for PoliceConfig {
    fn default() -> Self {
        Self {
            url: POLICE_URL.to_string(),
            table_selector: POLICE_TABLE.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HolidaysConfig {
    /// `{year}` is substituted per request.
    pub url_template: String,
    pub table_selector: String,
}

impl Default for HolidaysConfig {
    fn default() -> Self {
        Self {
            url_template: HOLIDAYS_URL.to_string(),
            table_selector: HOLIDAYS_TABLE.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WeatherConfig {
    /// `{year}` and `{month}` (zero padded) are substituted per archive.
    pub url_template: String,
    /// Station name as written in the daily files, e.g. `PSZCZYNA`, `ŁÓDŹ-LUBLINEK`.
    pub station: String,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            url_template: WEATHER_URL.to_string(),
            station: WEATHER_STATION.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub data_dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
        }
    }
}

impl Config {
    /// Defaults, optionally overlaid with a YAML file.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let cfg = match path {
            Some(p) => {
                let text = fs::read_to_string(p)
                    .with_context(|| format!("reading config {}", p.display()))?;
                Self::from_yaml(&text).with_context(|| format!("parsing config {}", p.display()))?
            }
            None => Self::default(),
        };
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_yaml(text: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(text)?)
    }

    pub fn validate(&self) -> Result<()> {
        if self.fetch.request_delay_ms == 0 {
            bail!("fetch.request_delay_ms must be positive");
        }
        if self.fetch.request_timeout_secs == 0 {
            bail!("fetch.request_timeout_secs must be positive");
        }
        Url::parse(&self.police.url)
            .with_context(|| format!("police.url {:?}", self.police.url))?;
        for (name, template) in [
            ("holidays.url_template", &self.holidays.url_template),
            ("weather.url_template", &self.weather.url_template),
        ] {
            if !template.contains("{year}") {
                bail!("{} has no {{year}} placeholder", name);
            }
        }
        if !self.weather.url_template.contains("{month}") {
            bail!("weather.url_template has no {{month}} placeholder");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults_are_valid() {
        let cfg = Config::load(None).unwrap();
        assert_eq!(cfg.fetch.delay(), Duration::from_millis(700));
        assert_eq!(cfg.fetch.timeout(), Duration::from_secs(5));
        assert_eq!(cfg.police.url, POLICE_URL);
        assert_eq!(cfg.output.data_dir, PathBuf::from("data"));
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let cfg = Config::from_yaml(
            r#"
fetch:
  request_delay_ms: 250
weather:
  station: KATOWICE
"#,
        )
        .unwrap();
        assert_eq!(cfg.fetch.request_delay_ms, 250);
        assert_eq!(cfg.fetch.request_timeout_secs, 5);
        assert_eq!(cfg.weather.station, "KATOWICE");
        assert_eq!(cfg.weather.url_template, WEATHER_URL);
        assert_eq!(cfg.police.table_selector, POLICE_TABLE);
    }

    #[test]
    fn test_zero_delay_rejected() {
        let cfg = Config::from_yaml("fetch:\n  request_delay_ms: 0\n").unwrap();
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_load_from_file() -> Result<()> {
        let mut f = NamedTempFile::new()?;
        writeln!(f, "output:\n  data_dir: /tmp/crashes")?;
        let cfg = Config::load(Some(f.path()))?;
        assert_eq!(cfg.output.data_dir, PathBuf::from("/tmp/crashes"));
        Ok(())
    }

    #[test]
    fn test_weather_template_without_month_rejected() {
        let cfg = Config::from_yaml(
            "weather:\n  url_template: https://example.com/{year}/all_k.zip\n",
        )
        .unwrap();
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("{month}"));

        let cfg = Config::from_yaml(
            "weather:\n  url_template: https://example.com/{year}/{year}_{month}_k.zip\n",
        )
        .unwrap();
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_template_without_year_rejected() {
        let cfg = Config::from_yaml("holidays:\n  url_template: https://example.com/\n").unwrap();
        assert!(cfg.validate().is_err());
    }
}
