use std::{fs, path::PathBuf};

use serde::Deserialize;
use tracing::warn;

const SETTINGS_FILE: &str = "server.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub server_bind: String,
    pub frontend_dir: PathBuf,
    pub prediction_csv_path: PathBuf,
    pub data_csv_path: PathBuf,
    pub predictor_program: String,
    pub predictor_args: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_bind: "0.0.0.0:5000".into(),
            frontend_dir: "frontend".into(),
            prediction_csv_path: "real_time_prediction.csv".into(),
            data_csv_path: "data/traffic_data.csv".into(),
            predictor_program: "python".into(),
            predictor_args: vec!["predict/real_time_predict.py".into()],
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    bind_addr: Option<String>,
    frontend_dir: Option<PathBuf>,
    prediction_csv_path: Option<PathBuf>,
    data_csv_path: Option<PathBuf>,
    predictor_program: Option<String>,
    predictor_args: Option<Vec<String>>,
}

/// Defaults, then `server.toml` in the working directory, then environment.
pub fn load_settings() -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string(SETTINGS_FILE) {
        match toml::from_str::<FileSettings>(&raw) {
            Ok(file_cfg) => apply_file(&mut settings, file_cfg),
            Err(error) => warn!(%error, file = SETTINGS_FILE, "ignoring unparsable settings file"),
        }
    }

    apply_env(&mut settings, |key| std::env::var(key).ok());
    settings
}

fn apply_file(settings: &mut Settings, file_cfg: FileSettings) {
    if let Some(v) = file_cfg.bind_addr {
        settings.server_bind = v;
    }
    if let Some(v) = file_cfg.frontend_dir {
        settings.frontend_dir = v;
    }
    if let Some(v) = file_cfg.prediction_csv_path {
        settings.prediction_csv_path = v;
    }
    if let Some(v) = file_cfg.data_csv_path {
        settings.data_csv_path = v;
    }
    if let Some(v) = file_cfg.predictor_program {
        settings.predictor_program = v;
    }
    if let Some(v) = file_cfg.predictor_args {
        settings.predictor_args = v;
    }
}

fn apply_env(settings: &mut Settings, var: impl Fn(&str) -> Option<String>) {
    if let Some(v) = var("SERVER_BIND") {
        settings.server_bind = v;
    }
    if let Some(v) = var("APP__BIND_ADDR") {
        settings.server_bind = v;
    }

    if let Some(v) = var("APP__FRONTEND_DIR") {
        settings.frontend_dir = v.into();
    }
    if let Some(v) = var("APP__PREDICTION_CSV_PATH") {
        settings.prediction_csv_path = v.into();
    }
    if let Some(v) = var("APP__DATA_CSV_PATH") {
        settings.data_csv_path = v.into();
    }

    if let Some(v) = var("APP__PREDICTOR_PROGRAM") {
        settings.predictor_program = v;
    }
    if let Some(v) = var("APP__PREDICTOR_ARGS") {
        settings.predictor_args = v.split_whitespace().map(str::to_string).collect();
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
