use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub motion: MotionConfig,
    #[serde(default)]
    pub swipe: SwipeConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Data directory path (log file lives here while the TUI runs)
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            log_level: default_log_level(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the subscription backend
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_secs: default_timeout(),
        }
    }
}

/// Easing curve selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EasingType {
    /// Constant speed
    Linear,
    /// Accelerate first half, decelerate second half
    #[default]
    EaseInOutQuad,
    /// Fast start with a long decelerating tail
    EaseOutCubic,
}

/// Durations and curves of the animated subjects
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MotionConfig {
    /// Bar chart tween duration in milliseconds
    #[serde(default = "default_bar_duration")]
    pub bar_duration_ms: u64,
    /// Donut reveal duration in milliseconds
    #[serde(default = "default_donut_duration")]
    pub donut_duration_ms: u64,
    /// Stats sheet open/close duration in milliseconds
    #[serde(default = "default_sheet_duration")]
    pub sheet_duration_ms: u64,
    /// Target frames per second while something is animating
    #[serde(default = "default_frame_rate")]
    pub frame_rate: u32,
    #[serde(default = "default_ease_in_out")]
    pub bar_easing: EasingType,
    #[serde(default = "default_ease_out")]
    pub donut_easing: EasingType,
    #[serde(default = "default_ease_in_out")]
    pub sheet_easing: EasingType,
    /// Sheet progress above which secondary chrome is revealed
    #[serde(default = "default_fully_open_threshold")]
    pub fully_open_threshold: f64,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            bar_duration_ms: default_bar_duration(),
            donut_duration_ms: default_donut_duration(),
            sheet_duration_ms: default_sheet_duration(),
            frame_rate: default_frame_rate(),
            bar_easing: default_ease_in_out(),
            donut_easing: default_ease_out(),
            sheet_easing: default_ease_in_out(),
            fully_open_threshold: default_fully_open_threshold(),
        }
    }
}

/// Swipe row geometry, in pointer pixels
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwipeConfig {
    /// Width of the fully revealed action rail
    #[serde(default = "default_max_offset")]
    pub max_offset: f64,
    /// Drag fraction at which the rail is shown as provisionally open
    #[serde(default = "default_preview_ratio")]
    pub preview_ratio: f64,
    /// Drag fraction at which a release commits to open
    #[serde(default = "default_commit_ratio")]
    pub commit_ratio: f64,
}

impl Default for SwipeConfig {
    fn default() -> Self {
        Self {
            max_offset: default_max_offset(),
            preview_ratio: default_preview_ratio(),
            commit_ratio: default_commit_ratio(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// Idle tick rate in milliseconds
    #[serde(default = "default_tick_rate")]
    pub tick_rate_ms: u64,
    /// Pointer pixels represented by one terminal column
    #[serde(default = "default_cell_width")]
    pub cell_width_px: f64,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            tick_rate_ms: default_tick_rate(),
            cell_width_px: default_cell_width(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("subtrack")
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_base_url() -> String {
    "http://127.0.0.1:5000".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_bar_duration() -> u64 {
    620
}

fn default_donut_duration() -> u64 {
    620
}

fn default_sheet_duration() -> u64 {
    420
}

fn default_frame_rate() -> u32 {
    60
}

fn default_ease_in_out() -> EasingType {
    EasingType::EaseInOutQuad
}

fn default_ease_out() -> EasingType {
    EasingType::EaseOutCubic
}

fn default_fully_open_threshold() -> f64 {
    0.9
}

fn default_max_offset() -> f64 {
    204.0
}

fn default_preview_ratio() -> f64 {
    0.6
}

fn default_commit_ratio() -> f64 {
    0.4
}

fn default_tick_rate() -> u64 {
    100
}

fn default_cell_width() -> f64 {
    12.0
}

/// Expand tilde (~) in path to user's home directory
fn expand_tilde(path: &std::path::Path) -> PathBuf {
    if let Some(path_str) = path.to_str() {
        if let Some(stripped) = path_str.strip_prefix("~/") {
            if let Some(home) = dirs::home_dir() {
                return home.join(stripped);
            }
        } else if path_str == "~" {
            if let Some(home) = dirs::home_dir() {
                return home;
            }
        }
    }
    path.to_path_buf()
}

impl AppConfig {
    /// Load configuration from file or return defaults
    pub fn load() -> crate::Result<Self> {
        let config_path = Self::config_path();

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            Self::from_toml(&content)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> crate::Result<Self> {
        toml::from_str(content).map_err(|e| crate::Error::Config(e.to_string()))
    }

    /// Save configuration to file
    pub fn save(&self) -> crate::Result<()> {
        let config_path = Self::config_path();

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = self.to_toml()?;
        std::fs::write(&config_path, content)?;

        Ok(())
    }

    pub fn to_toml(&self) -> crate::Result<String> {
        toml::to_string_pretty(self).map_err(|e| crate::Error::Config(e.to_string()))
    }

    /// Get the configuration file path
    /// Always uses ~/.config/subtrack/config.toml on all platforms
    pub fn config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
            .join("subtrack")
            .join("config.toml")
    }

    /// Get the data directory (with tilde expansion)
    pub fn data_dir(&self) -> PathBuf {
        expand_tilde(&self.general.data_dir)
    }

    /// Log file used while the terminal UI owns stdout
    pub fn log_path(&self) -> PathBuf {
        self.data_dir().join("subtrack.log")
    }
}
