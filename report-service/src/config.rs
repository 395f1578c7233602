use serde::Deserialize;
use std::{fs, path::PathBuf};

use crate::pipeline::ReportSettings;
use crate::sinks::DEFAULT_SHEET_NAME;
use crate::transform::PumpSettings;

const DEFAULT_CONFIG_PATH: &str = "report-config.toml";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Granted daily withdrawal (m³).
    pub daily_allowance_m3: f64,
    pub output_path: PathBuf,
    pub sheet_name: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            daily_allowance_m3: 9600.0,
            output_path: PathBuf::from("resumo_mensal.xlsx"),
            sheet_name: DEFAULT_SHEET_NAME.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
    /// Prometheus exposition file written after each run.
    pub textfile_path: PathBuf,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub report: ReportConfig,
    pub pump: PumpSettings,
    pub metrics: Option<MetricsConfig>,
}

impl AppConfig {
    /// Load from `REPORT_CONFIG`, else `report-config.toml` if present, else defaults.
    pub fn load() -> anyhow::Result<Self> {
        use std::env;

        let cfg = match env::var("REPORT_CONFIG") {
            Ok(path) => Self::from_toml_str(&fs::read_to_string(&path)?)?,
            Err(_) => match fs::read_to_string(DEFAULT_CONFIG_PATH) {
                Ok(contents) => Self::from_toml_str(&contents)?,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Self::default(),
                Err(e) => return Err(e.into()),
            },
        };
        Ok(cfg)
    }

    pub fn from_toml_str(contents: &str) -> anyhow::Result<Self> {
        let cfg: AppConfig = toml::from_str(contents)?;
        cfg.settings().validate()?;
        Ok(cfg)
    }

    pub fn settings(&self) -> ReportSettings {
        ReportSettings {
            daily_allowance: self.report.daily_allowance_m3,
            pump: self.pump,
        }
    }
}
