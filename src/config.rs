use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:5000/medsam";
pub const DEFAULT_MIN_BOX_SIDE: f64 = 10.0;
pub const DEFAULT_MIN_LEAVE_PATH: usize = 5;
pub const DEFAULT_ERASE_RADIUS: f64 = 6.0;

/// Settings shared by the command-line tools, read from YAML.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Settings {
    /// Base URL of the segmentation service
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Outline masks in yellow on top of the tint
    #[serde(default)]
    pub draw_contours: bool,

    /// Draw points and box prompts onto the overlay
    #[serde(default = "default_draw_prompts")]
    pub draw_prompts: bool,

    /// Boxes need both sides longer than this to segment on release
    #[serde(default = "default_min_box_side")]
    pub min_box_side: f64,

    /// Freehand paths cut short by leaving the canvas need more points than this
    #[serde(default = "default_min_leave_path")]
    pub min_leave_path: usize,

    #[serde(default = "default_erase_radius")]
    pub erase_radius: f64,
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_draw_prompts() -> bool {
    true
}

fn default_min_box_side() -> f64 {
    DEFAULT_MIN_BOX_SIDE
}

fn default_min_leave_path() -> usize {
    DEFAULT_MIN_LEAVE_PATH
}

fn default_erase_radius() -> f64 {
    DEFAULT_ERASE_RADIUS
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            draw_contours: false,
            draw_prompts: true,
            min_box_side: DEFAULT_MIN_BOX_SIDE,
            min_leave_path: DEFAULT_MIN_LEAVE_PATH,
            erase_radius: DEFAULT_ERASE_RADIUS,
        }
    }
}

impl Settings {
    /// On Linux: ~/.config/segment-overlay/settings.yaml
    pub fn settings_path() -> PathBuf {
        let config_dir = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        config_dir.join("segment-overlay").join("settings.yaml")
    }

    /// Load settings from `custom_path`, or the default location.
    ///
    /// A missing or unreadable file yields the defaults.
    pub fn load(custom_path: Option<&Path>) -> Self {
        let path = match custom_path {
            Some(p) => {
                info!("Using custom settings path: {:?}", p);
                p.to_path_buf()
            }
            None => Self::settings_path(),
        };

        if !path.exists() {
            info!("Settings file not found at {:?}, using defaults", path);
            return Self::default();
        }

        match fs::read_to_string(&path) {
            Ok(contents) => match serde_yaml::from_str::<Settings>(&contents) {
                Ok(settings) => {
                    info!("Loaded settings from {:?}", path);
                    debug!("Settings: {:?}", settings);
                    settings
                }
                Err(e) => {
                    error!("Failed to parse settings file at {:?}: {}", path, e);
                    warn!("Using default settings");
                    Self::default()
                }
            },
            Err(e) => {
                error!("Failed to read settings file at {:?}: {}", path, e);
                warn!("Using default settings");
                Self::default()
            }
        }
    }
}
