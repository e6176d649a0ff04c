//! # Configuration Module
//!
//! Handles loading and validating configuration from TOML files.
//!
//! Every section and every field is optional. A missing field falls back to
//! the node's built-in default, so an empty file (or no file at all) gives
//! the stock Rovio joystick layout.

use serde::de::Error;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

use crate::error::Result;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub teleop: TeleopConfig,

    #[serde(default)]
    pub transport: TransportConfig,
}

/// Axis, scale and button parameters of the input mapper
///
/// Output frame is right handed: X+ forward, Y+ right, Z+ down, and a
/// positive rotation about Z turns the robot right. The negative default
/// scales on `scale_lineary` and `scale_angular` bring raw joystick axes
/// into that frame.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct TeleopConfig {
    #[serde(default = "default_axis_linearx")]
    pub axis_linearx: usize,

    #[serde(default = "default_axis_lineary")]
    pub axis_lineary: usize,

    #[serde(default = "default_axis_angular")]
    pub axis_angular: usize,

    #[serde(default = "default_scale_linearx")]
    pub scale_linearx: f64,

    #[serde(default = "default_scale_lineary")]
    pub scale_lineary: f64,

    #[serde(default = "default_scale_angular")]
    pub scale_angular: f64,

    #[serde(default = "default_button_head_down")]
    pub button_head_down: usize,

    #[serde(default = "default_button_head_mid")]
    pub button_head_mid: usize,

    #[serde(default = "default_button_head_up")]
    pub button_head_up: usize,
}

/// Channel names and head service endpoint
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct TransportConfig {
    #[serde(default = "default_cmd_vel_topic")]
    pub cmd_vel_topic: String,

    #[serde(default = "default_joy_topic")]
    pub joy_topic: String,

    #[serde(default = "default_head_service")]
    pub head_service: String,

    #[serde(default = "default_queue_size")]
    pub queue_size: usize,

    /// `host:port` of the head-position responder. `None` leaves the
    /// service unavailable and every head request fails.
    #[serde(default)]
    pub head_service_addr: Option<String>,

    /// `None` blocks until the responder answers.
    #[serde(default)]
    pub head_timeout_ms: Option<u64>,
}

// Default value functions
fn default_axis_linearx() -> usize { 1 }
fn default_axis_lineary() -> usize { 0 }
fn default_axis_angular() -> usize { 2 }

fn default_scale_linearx() -> f64 { 1.0 }
fn default_scale_lineary() -> f64 { -1.0 }
fn default_scale_angular() -> f64 { -1.0 }

fn default_button_head_down() -> usize { 1 }
fn default_button_head_mid() -> usize { 2 }
fn default_button_head_up() -> usize { 3 }

fn default_cmd_vel_topic() -> String { "cmd_vel".to_string() }
fn default_joy_topic() -> String { "joy".to_string() }
fn default_head_service() -> String { "head_position".to_string() }
fn default_queue_size() -> usize { 10 }

impl Default for TeleopConfig {
    fn default() -> Self {
        Self {
            axis_linearx: default_axis_linearx(),
            axis_lineary: default_axis_lineary(),
            axis_angular: default_axis_angular(),
            scale_linearx: default_scale_linearx(),
            scale_lineary: default_scale_lineary(),
            scale_angular: default_scale_angular(),
            button_head_down: default_button_head_down(),
            button_head_mid: default_button_head_mid(),
            button_head_up: default_button_head_up(),
        }
    }
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            cmd_vel_topic: default_cmd_vel_topic(),
            joy_topic: default_joy_topic(),
            head_service: default_head_service(),
            queue_size: default_queue_size(),
            head_service_addr: None,
            head_timeout_ms: None,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration file
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - TOML parsing fails (including negative indices)
    /// - Validation fails
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use rovio_teleop::config::Config;
    ///
    /// let config = Config::load("config/rovio.toml")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Parse and validate configuration from a TOML string
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns error if any configuration value is out of valid range
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("scale_linearx", self.teleop.scale_linearx),
            ("scale_lineary", self.teleop.scale_lineary),
            ("scale_angular", self.teleop.scale_angular),
        ] {
            if !value.is_finite() {
                return Err(crate::error::TeleopError::Config(
                    toml::de::Error::custom(format!("{} must be a finite number", name))
                ));
            }
        }

        for (name, value) in [
            ("cmd_vel_topic", &self.transport.cmd_vel_topic),
            ("joy_topic", &self.transport.joy_topic),
            ("head_service", &self.transport.head_service),
        ] {
            if value.is_empty() {
                return Err(crate::error::TeleopError::Config(
                    toml::de::Error::custom(format!("{} cannot be empty", name))
                ));
            }
        }

        if self.transport.queue_size == 0 || self.transport.queue_size > 1000 {
            return Err(crate::error::TeleopError::Config(
                toml::de::Error::custom("queue_size must be between 1 and 1000")
            ));
        }

        if let Some(addr) = &self.transport.head_service_addr {
            if addr.is_empty() {
                return Err(crate::error::TeleopError::Config(
                    toml::de::Error::custom("head_service_addr cannot be empty when set")
                ));
            }
        }

        if let Some(timeout) = self.transport.head_timeout_ms {
            if timeout == 0 || timeout > 60000 {
                return Err(crate::error::TeleopError::Config(
                    toml::de::Error::custom("head_timeout_ms must be between 1 and 60000")
                ));
            }
        }

        // Priority order makes a repeated index shadow the later binding
        let t = &self.teleop;
        if t.button_head_down == t.button_head_mid
            || t.button_head_down == t.button_head_up
            || t.button_head_mid == t.button_head_up
        {
            warn!(
                "Head buttons share an index (down={}, mid={}, up={}); lower priority positions are unreachable",
                t.button_head_down, t.button_head_mid, t.button_head_up
            );
        }

        Ok(())
    }

    /// Log every effective parameter at debug level
    pub fn log_parameters(&self) {
        let t = &self.teleop;
        debug!("axis_linearx: {}", t.axis_linearx);
        debug!("axis_lineary: {}", t.axis_lineary);
        debug!("axis_angular: {}", t.axis_angular);
        debug!("scale_linearx: {:.2}", t.scale_linearx);
        debug!("scale_lineary: {:.2}", t.scale_lineary);
        debug!("scale_angular: {:.2}", t.scale_angular);
        debug!("button_head_down: {}", t.button_head_down);
        debug!("button_head_mid: {}", t.button_head_mid);
        debug!("button_head_up: {}", t.button_head_up);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TeleopError;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_functions() {
        assert_eq!(default_axis_linearx(), 1);
        assert_eq!(default_axis_lineary(), 0);
        assert_eq!(default_axis_angular(), 2);
        assert_eq!(default_scale_linearx(), 1.0);
        assert_eq!(default_scale_lineary(), -1.0);
        assert_eq!(default_scale_angular(), -1.0);
        assert_eq!(default_button_head_down(), 1);
        assert_eq!(default_button_head_mid(), 2);
        assert_eq!(default_button_head_up(), 3);
        assert_eq!(default_cmd_vel_topic(), "cmd_vel");
        assert_eq!(default_joy_topic(), "joy");
        assert_eq!(default_head_service(), "head_position");
        assert_eq!(default_queue_size(), 10);
    }

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_partial_override() {
        let config = Config::from_toml(
            r#"
[teleop]
axis_angular = 3
scale_linearx = 0.5
button_head_up = 7
"#,
        )
        .unwrap();

        assert_eq!(config.teleop.axis_angular, 3);
        assert_eq!(config.teleop.scale_linearx, 0.5);
        assert_eq!(config.teleop.button_head_up, 7);

        // Untouched fields keep their defaults
        assert_eq!(config.teleop.axis_linearx, 1);
        assert_eq!(config.teleop.scale_angular, -1.0);
        assert_eq!(config.transport, TransportConfig::default());
    }

    #[test]
    fn test_load_config_from_file() {
        use std::io::Write;
        use tempfile::NamedTempFile;

        let toml_content = r#"
[teleop]
axis_linearx = 4
button_head_down = 0

[transport]
head_service_addr = "127.0.0.1:9000"
head_timeout_ms = 250
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(toml_content.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let config = Config::load(temp_file.path()).unwrap();
        assert_eq!(config.teleop.axis_linearx, 4);
        assert_eq!(config.teleop.button_head_down, 0);
        assert_eq!(config.transport.head_service_addr.as_deref(), Some("127.0.0.1:9000"));
        assert_eq!(config.transport.head_timeout_ms, Some(250));
    }

    #[test]
    fn test_load_missing_file() {
        let result = Config::load("/nonexistent/rovio_teleop.toml");
        assert!(matches!(result, Err(TeleopError::Io(_))));
    }

    #[test]
    fn test_negative_index_rejected() {
        let result = Config::from_toml("[teleop]\naxis_linearx = -1\n");
        assert!(matches!(result, Err(TeleopError::Config(_))));
    }

    #[test]
    fn test_integer_scale_accepted() {
        let config = Config::from_toml("[teleop]\nscale_angular = 2\n").unwrap();
        assert_eq!(config.teleop.scale_angular, 2.0);
    }

    #[test]
    fn test_non_finite_scale() {
        let mut config = Config::default();
        config.teleop.scale_lineary = f64::NAN;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.teleop.scale_angular = f64::INFINITY;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_topic_names() {
        let mut config = Config::default();
        config.transport.cmd_vel_topic = String::new();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.transport.head_service = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_queue_size_bounds() {
        let mut config = Config::default();
        config.transport.queue_size = 0;
        assert!(config.validate().is_err());

        config.transport.queue_size = 1001;
        assert!(config.validate().is_err());

        config.transport.queue_size = 1;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_head_timeout_bounds() {
        let mut config = Config::default();
        config.transport.head_timeout_ms = Some(0);
        assert!(config.validate().is_err());

        config.transport.head_timeout_ms = Some(60001);
        assert!(config.validate().is_err());

        config.transport.head_timeout_ms = Some(500);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_head_service_addr() {
        let mut config = Config::default();
        config.transport.head_service_addr = Some(String::new());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_duplicate_head_buttons_allowed() {
        let mut config = Config::default();
        config.teleop.button_head_mid = config.teleop.button_head_down;
        assert!(config.validate().is_ok());
    }
}
