//! Page behavior configuration.
//!
//! Every selector, delay and color the behaviors use is configurable; the
//! defaults match the markup of the hostel portal pages. Configuration can be
//! deserialized from any serde format with missing fields filled from
//! [`Default`].

use pk_core::PageError;
use pk_core::PageResult;
use serde::Deserialize;
use std::time::Duration;

/// Characters a captcha code is drawn from: ASCII letters and digits minus
/// `I`, `O`, `0` and `1`. Lowercase `l` stays in; existing pages already
/// issue codes containing it.
pub const CAPTCHA_ALPHABET: &str = "ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz23456789";

const MAX_CAPTCHA_LENGTH: usize = 64;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PageConfig {
    pub carousel: CarouselConfig,
    pub captcha: CaptchaConfig,
    pub reactions: ReactionConfig,
    pub flash: FlashConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CarouselConfig {
    pub track_id: String,
    pub total_slides: usize,
    /// Auto-advance period. The markup this was written for documents five
    /// seconds but has always rotated every two.
    pub interval_ms: u64,
}

impl Default for CarouselConfig {
    fn default() -> Self {
        Self {
            track_id: "imgSlider".to_owned(),
            total_slides: 4,
            interval_ms: 2000,
        }
    }
}

impl CarouselConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CaptchaConfig {
    pub display_id: String,
    pub input_id: String,
    pub alphabet: String,
    pub code_length: usize,
    pub failure_message: String,
}

impl Default for CaptchaConfig {
    fn default() -> Self {
        Self {
            display_id: "captcha-code".to_owned(),
            input_id: "captcha-input".to_owned(),
            alphabet: CAPTCHA_ALPHABET.to_owned(),
            code_length: 5,
            failure_message: "Invalid Security Code! Please try again.".to_owned(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReactionConfig {
    pub control_class: String,
    pub count_class: String,
    pub active_class: String,
    pub active_color: String,
    pub inactive_color: String,
}

impl Default for ReactionConfig {
    fn default() -> Self {
        Self {
            control_class: "reaction-btn".to_owned(),
            count_class: "count".to_owned(),
            active_class: "active".to_owned(),
            active_color: "#3498db".to_owned(),
            inactive_color: "#333".to_owned(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FlashConfig {
    pub message_class: String,
    pub delay_ms: u64,
}

impl Default for FlashConfig {
    fn default() -> Self {
        Self {
            message_class: "flash-message".to_owned(),
            delay_ms: 3000,
        }
    }
}

impl FlashConfig {
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

impl PageConfig {
    pub fn validate(&self) -> PageResult<()> {
        if self.carousel.total_slides == 0 {
            return Err(PageError::invalid_config(
                "carousel.total_slides must be at least 1",
            ));
        }
        if self.carousel.interval_ms == 0 {
            return Err(PageError::invalid_config(
                "carousel.interval_ms must be at least 1",
            ));
        }
        if self.captcha.alphabet.is_empty() {
            return Err(PageError::invalid_config("captcha.alphabet must not be empty"));
        }
        if !(1..=MAX_CAPTCHA_LENGTH).contains(&self.captcha.code_length) {
            return Err(PageError::invalid_config(format!(
                "captcha.code_length must be between 1 and {MAX_CAPTCHA_LENGTH}"
            )));
        }

        let names = [
            ("carousel.track_id", &self.carousel.track_id),
            ("captcha.display_id", &self.captcha.display_id),
            ("captcha.input_id", &self.captcha.input_id),
            ("reactions.control_class", &self.reactions.control_class),
            ("reactions.count_class", &self.reactions.count_class),
            ("reactions.active_class", &self.reactions.active_class),
            ("flash.message_class", &self.flash.message_class),
        ];
        for (field, value) in names {
            if value.trim().is_empty() || value.contains(char::is_whitespace) {
                return Err(PageError::invalid_config(format!(
                    "{field} must be a single non-empty name"
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::CAPTCHA_ALPHABET;
    use super::PageConfig;

    #[test]
    fn defaults_match_portal_markup() {
        let config = PageConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.carousel.track_id, "imgSlider");
        assert_eq!(config.carousel.total_slides, 4);
        assert_eq!(config.carousel.interval_ms, 2000);
        assert_eq!(config.captcha.code_length, 5);
        assert_eq!(config.flash.delay_ms, 3000);
    }

    #[test]
    fn alphabet_excludes_ambiguous_characters() {
        assert_eq!(CAPTCHA_ALPHABET.chars().count(), 58);
        for ambiguous in ['I', 'O', '0', '1'] {
            assert!(!CAPTCHA_ALPHABET.contains(ambiguous));
        }
    }

    #[test]
    fn rejects_degenerate_values() {
        let mut config = PageConfig::default();
        config.carousel.total_slides = 0;
        assert!(config.validate().is_err());

        let mut config = PageConfig::default();
        config.captcha.alphabet.clear();
        assert!(config.validate().is_err());

        let mut config = PageConfig::default();
        config.reactions.count_class = "two words".to_owned();
        let Err(error) = config.validate() else {
            panic!("class names with spaces should be rejected");
        };
        assert_eq!(error.code, "config.invalid");
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let parsed: Result<PageConfig, _> = toml::from_str(
            r##"
            [carousel]
            total_slides = 6

            [reactions]
            active_color = "#e74c3c"
            "##,
        );
        let config = match parsed {
            Ok(config) => config,
            Err(error) => panic!("partial config should parse: {error}"),
        };
        assert_eq!(config.carousel.total_slides, 6);
        assert_eq!(config.carousel.interval_ms, 2000);
        assert_eq!(config.reactions.active_color, "#e74c3c");
        assert_eq!(config.reactions.inactive_color, "#333");
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let parsed: Result<PageConfig, _> = toml::from_str("[flash]\ndelay = 10\n");
        assert!(parsed.is_err());
    }
}
