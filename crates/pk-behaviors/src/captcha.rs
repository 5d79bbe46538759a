//! Client-side captcha: a random code shown on the page that the user must
//! type back before submitting a form.
//!
//! This is a nuisance filter, not a security control. The expected code sits
//! in the page's own text, so anything that can read the DOM can pass it. It
//! only stops accidental double submissions.

use crate::config::CaptchaConfig;
use crate::dialogs::Dialogs;
use pk_core::PageError;
use pk_core::PageResult;
use pk_dom::Document;
use rand::Rng;

/// Draws `length` characters from `alphabet`, uniformly and with replacement.
pub fn generate_code<R: Rng>(rng: &mut R, alphabet: &[char], length: usize) -> String {
    if alphabet.is_empty() {
        return String::new();
    }
    (0..length)
        .map(|_| alphabet[rng.random_range(0..alphabet.len())])
        .collect()
}

#[derive(Debug, Clone)]
pub struct Captcha<R> {
    rng: R,
    alphabet: Vec<char>,
    config: CaptchaConfig,
}

impl<R: Rng> Captcha<R> {
    pub fn new(config: CaptchaConfig, rng: R) -> Self {
        Self {
            rng,
            alphabet: config.alphabet.chars().collect(),
            config,
        }
    }

    /// Writes a fresh code into the display element and returns it. The code
    /// is still returned when the page has no display element.
    pub fn generate(&mut self, document: &mut Document) -> PageResult<String> {
        let code = generate_code(&mut self.rng, &self.alphabet, self.config.code_length);
        if let Some(display) = document.get_element_by_id(&self.config.display_id) {
            document.set_text_content(display, code.clone())?;
        }
        Ok(code)
    }

    /// The code currently shown on the page, if it has a display element.
    /// Surrounding whitespace in the markup is not part of the code.
    pub fn displayed(&self, document: &Document) -> Option<String> {
        document
            .get_element_by_id(&self.config.display_id)
            .map(|display| document.text_content(display).trim().to_owned())
    }

    /// Compares the typed input with the displayed code, case-sensitively.
    /// On mismatch the user is alerted and a new code replaces the old one,
    /// so a failed attempt cannot be retried with the same input.
    pub fn validate(
        &mut self,
        document: &mut Document,
        dialogs: &mut dyn Dialogs,
    ) -> PageResult<bool> {
        let expected = self.displayed(document).ok_or_else(|| {
            PageError::missing_element("captcha.missing_element", &self.config.display_id)
        })?;
        let typed = document
            .get_element_by_id(&self.config.input_id)
            .and_then(|node| document.element(node))
            .map(|input| input.value().to_owned())
            .ok_or_else(|| {
                PageError::missing_element("captcha.missing_element", &self.config.input_id)
            })?;

        if typed == expected {
            tracing::debug!("captcha accepted");
            return Ok(true);
        }

        tracing::warn!(typed_len = typed.chars().count(), "captcha rejected");
        dialogs.alert(&self.config.failure_message);
        self.generate(document)?;
        Ok(false)
    }
}
