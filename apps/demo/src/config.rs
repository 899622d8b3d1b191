use std::collections::HashMap;
use std::fs;

#[derive(Debug, Clone)]
pub struct Settings {
    /// Which flow the demo walks: "checkout" or "linking".
    pub flow: String,
    pub institution: String,
    pub username: String,
    pub password: String,
    pub mfa_code: String,
    /// Skip the artificial gateway delays.
    pub instant_delays: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            flow: "checkout".into(),
            institution: "Chase".into(),
            username: "user".into(),
            password: "pass".into(),
            mfa_code: "123456".into(),
            instant_delays: false,
        }
    }
}

pub fn load_settings() -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string("demo.toml") {
        if let Ok(file_cfg) = toml::from_str::<HashMap<String, String>>(&raw) {
            if let Some(v) = file_cfg.get("flow") {
                settings.flow = v.clone();
            }
            if let Some(v) = file_cfg.get("institution") {
                settings.institution = v.clone();
            }
            if let Some(v) = file_cfg.get("username") {
                settings.username = v.clone();
            }
            if let Some(v) = file_cfg.get("password") {
                settings.password = v.clone();
            }
            if let Some(v) = file_cfg.get("mfa_code") {
                settings.mfa_code = v.clone();
            }
            if let Some(v) = file_cfg.get("instant_delays") {
                settings.instant_delays = v == "true";
            }
        }
    }

    if let Ok(v) = std::env::var("APP__FLOW") {
        settings.flow = v;
    }
    if let Ok(v) = std::env::var("APP__INSTITUTION") {
        settings.institution = v;
    }
    if let Ok(v) = std::env::var("APP__USERNAME") {
        settings.username = v;
    }
    if let Ok(v) = std::env::var("APP__PASSWORD") {
        settings.password = v;
    }
    if let Ok(v) = std::env::var("APP__MFA_CODE") {
        settings.mfa_code = v;
    }
    if let Ok(v) = std::env::var("APP__INSTANT_DELAYS") {
        settings.instant_delays = v == "true" || v == "1";
    }

    settings
}
