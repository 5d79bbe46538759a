//! Interactive behaviors for the community portal pages: the image carousel,
//! the form captcha, reaction toggles and flash-message dismissal.

pub mod captcha;
pub mod carousel;
pub mod config;
pub mod dialogs;
pub mod events;
pub mod flash;
pub mod page;
pub mod reactions;

pub use captcha::Captcha;
pub use captcha::generate_code;
pub use carousel::Carousel;
pub use carousel::CarouselState;
pub use config::CAPTCHA_ALPHABET;
pub use config::CaptchaConfig;
pub use config::CarouselConfig;
pub use config::FlashConfig;
pub use config::PageConfig;
pub use config::ReactionConfig;
pub use dialogs::Dialogs;
pub use dialogs::RecordingDialogs;
pub use events::DomEvent;
pub use events::DomEventKind;
pub use events::EventOutcome;
pub use flash::FlashDismissal;
pub use page::PageScript;
pub use page::PageTask;
pub use reactions::ReactionControl;
pub use reactions::ReactionState;
pub use reactions::Reactions;
