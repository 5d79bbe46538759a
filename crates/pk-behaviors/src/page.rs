//! Page host: owns the document, the timer queue and every behavior, and
//! routes content-loaded, timer and user events to them.

use crate::captcha::Captcha;
use crate::carousel::Carousel;
use crate::carousel::CarouselState;
use crate::config::PageConfig;
use crate::dialogs::Dialogs;
use crate::events::DomEvent;
use crate::events::DomEventKind;
use crate::events::EventOutcome;
use crate::events::InlineCall;
use crate::events::parse_inline_handler;
use crate::flash::FlashDismissal;
use crate::reactions::Reactions;
use pk_core::PageError;
use pk_core::PageResult;
use pk_dom::Document;
use pk_dom::NodeId;
use pk_timers::TimerQueue;
use rand::Rng;
use rand::rngs::ThreadRng;
use std::time::Duration;

/// Work scheduled on the page's timer queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageTask {
    AdvanceCarousel,
    DismissFlashes,
}

pub struct PageScript<D, R = ThreadRng> {
    document: Document,
    timers: TimerQueue<PageTask>,
    carousel: Carousel,
    captcha: Captcha<R>,
    reactions: Reactions,
    flash: FlashDismissal,
    dialogs: D,
    loaded: bool,
}

impl<D: Dialogs> PageScript<D, ThreadRng> {
    pub fn new(document: Document, config: PageConfig, dialogs: D) -> PageResult<Self> {
        Self::with_rng(document, config, dialogs, rand::rng())
    }
}

impl<D: Dialogs, R: Rng> PageScript<D, R> {
    pub fn with_rng(
        document: Document,
        config: PageConfig,
        dialogs: D,
        rng: R,
    ) -> PageResult<Self> {
        config.validate()?;
        Ok(Self {
            document,
            timers: TimerQueue::new(),
            carousel: Carousel::new(config.carousel),
            captcha: Captcha::new(config.captcha, rng),
            reactions: Reactions::new(config.reactions),
            flash: FlashDismissal::new(config.flash),
            dialogs,
            loaded: false,
        })
    }

    /// Content-ready hook. Generates the captcha, starts the carousel, wires
    /// reaction controls and schedules flash dismissal. Later calls are
    /// no-ops.
    pub fn on_content_loaded(&mut self) -> PageResult<()> {
        if self.loaded {
            return Ok(());
        }
        self.loaded = true;

        self.captcha.generate(&mut self.document)?;
        let carousel_timer = self.carousel.start(&mut self.timers);
        let reactions = self.reactions.wire(&self.document);
        let flash_timer = self.flash.schedule(&mut self.timers);

        tracing::info!(
            title = %self.document.title,
            reactions,
            %carousel_timer,
            flash_timer = ?flash_timer,
            "page behaviors initialized"
        );
        Ok(())
    }

    /// Moves the page clock forward, running every timer that comes due.
    /// Returns how many timer callbacks ran.
    pub fn advance_time(&mut self, delta: Duration) -> usize {
        let document = &mut self.document;
        let carousel = &mut self.carousel;
        let flash = &mut self.flash;
        let mut fired = 0;

        self.timers.run_for(delta, |_, timer| {
            fired += 1;
            match timer.task {
                PageTask::AdvanceCarousel => {
                    carousel.advance(document, 1);
                }
                PageTask::DismissFlashes => {
                    flash.dismiss(document);
                }
            }
        });
        fired
    }

    pub fn now(&self) -> Duration {
        self.timers.now()
    }

    pub fn next_timer_deadline(&self) -> Option<Duration> {
        self.timers.next_deadline()
    }

    /// Dispatches an event at `target` and lets it bubble to the root. Wired
    /// reaction controls and inline `onclick`/`onsubmit` handlers along the
    /// path run in order.
    pub fn dispatch(&mut self, event: DomEvent) -> PageResult<EventOutcome> {
        if !self.document.is_connected(event.target) {
            return Err(PageError::new(
                "page.event_target",
                format!("node {} is not part of the document", event.target),
            ));
        }

        let path: Vec<NodeId> = self.document.self_and_ancestors(event.target).collect();
        let mut outcome = EventOutcome::default();

        for node in path {
            if event.kind == DomEventKind::Click
                && self.reactions.click(&mut self.document, node)?.is_some()
            {
                outcome.handled = true;
            }

            let statements = self
                .document
                .element(node)
                .and_then(|element| element.attribute(event.kind.handler_attribute()))
                .map(parse_inline_handler)
                .unwrap_or_default();
            for statement in statements {
                outcome.handled = true;
                let result = self.run_inline(statement.call)?;
                if statement.returns {
                    if !result {
                        outcome.default_prevented = true;
                    }
                    break;
                }
            }
        }

        Ok(outcome)
    }

    fn run_inline(&mut self, call: InlineCall) -> PageResult<bool> {
        match call {
            InlineCall::PlusSlides(delta) => {
                self.plus_slides(delta);
                Ok(true)
            }
            InlineCall::GenerateCaptcha => {
                self.generate_captcha()?;
                Ok(true)
            }
            InlineCall::ValidateCaptcha => self.validate_captcha(),
        }
    }

    pub fn click_by_id(&mut self, id: &str) -> PageResult<EventOutcome> {
        let target = self.require_element(id)?;
        self.dispatch(DomEvent::click(target))
    }

    pub fn submit_by_id(&mut self, id: &str) -> PageResult<EventOutcome> {
        let target = self.require_element(id)?;
        self.dispatch(DomEvent::submit(target))
    }

    /// Sets the value of a form field as if the user typed it.
    pub fn type_into(&mut self, id: &str, text: &str) -> PageResult<()> {
        let node = self.require_element(id)?;
        if let Some(element) = self.document.element_mut(node) {
            element.set_value(text);
        }
        Ok(())
    }

    fn require_element(&self, id: &str) -> PageResult<NodeId> {
        self.document
            .get_element_by_id(id)
            .ok_or_else(|| PageError::missing_element("page.missing_element", id))
    }

    pub fn plus_slides(&mut self, delta: i64) -> usize {
        self.carousel.advance(&mut self.document, delta)
    }

    pub fn generate_captcha(&mut self) -> PageResult<String> {
        self.captcha.generate(&mut self.document)
    }

    /// Gate for form submission: a false result means the submission must
    /// be abandoned.
    pub fn validate_captcha(&mut self) -> PageResult<bool> {
        self.captcha.validate(&mut self.document, &mut self.dialogs)
    }

    pub fn captcha_code(&self) -> Option<String> {
        self.captcha.displayed(&self.document)
    }

    /// Re-scans the document for reaction controls added since load.
    pub fn rewire_reactions(&mut self) -> usize {
        self.reactions.wire(&self.document)
    }

    /// Cancels every pending page timer.
    pub fn teardown(&mut self) {
        let carousel = self.carousel.stop(&mut self.timers);
        let flash = self.flash.cancel(&mut self.timers);
        tracing::debug!(carousel, flash, "page behaviors torn down");
    }

    pub fn carousel_state(&self) -> CarouselState {
        self.carousel.state()
    }

    pub fn is_carousel_running(&self) -> bool {
        self.carousel.is_running(&self.timers)
    }

    pub fn flash_dismissed(&self) -> bool {
        self.flash.is_dismissed()
    }

    pub fn reactions(&self) -> &Reactions {
        &self.reactions
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    pub fn dialogs(&self) -> &D {
        &self.dialogs
    }
}

#[cfg(test)]
mod tests {
    use super::PageScript;
    use crate::config::PageConfig;
    use crate::dialogs::RecordingDialogs;
    use pk_html::HtmlParser;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::time::Duration;

    fn page(html: &str) -> PageScript<RecordingDialogs, StdRng> {
        match PageScript::with_rng(
            HtmlParser.parse(html),
            PageConfig::default(),
            RecordingDialogs::default(),
            StdRng::seed_from_u64(42),
        ) {
            Ok(page) => page,
            Err(error) => panic!("page should build: {error}"),
        }
    }

    #[test]
    fn content_loaded_is_idempotent() {
        let mut page = page(r#"<div id="imgSlider"></div><span id="captcha-code"></span>"#);
        assert!(page.on_content_loaded().is_ok());
        let code = page.document().clone();
        assert!(page.on_content_loaded().is_ok());
        assert_eq!(page.document(), &code);
        assert!(page.is_carousel_running());
        assert_eq!(page.next_timer_deadline(), Some(Duration::from_secs(2)));
    }

    #[test]
    fn invalid_config_is_rejected() {
        let mut config = PageConfig::default();
        config.captcha.code_length = 0;
        let built = PageScript::with_rng(
            HtmlParser.parse(""),
            config,
            RecordingDialogs::default(),
            StdRng::seed_from_u64(1),
        );
        assert!(built.is_err_and(|error| error.code == "config.invalid"));
    }

    #[test]
    fn inline_arrows_move_the_carousel() {
        let mut page = page(
            r#"<div id="imgSlider"></div>
            <a id="prev" onclick="plusSlides(-1)">&#10094;</a>
            <a id="next" onclick="plusSlides(1)">&#10095;</a>"#,
        );
        assert!(page.click_by_id("prev").is_ok_and(|outcome| outcome.handled));
        assert_eq!(page.carousel_state().index(), 3);
        assert!(page.click_by_id("next").is_ok());
        assert!(page.click_by_id("next").is_ok());
        assert_eq!(page.carousel_state().index(), 1);
    }

    #[test]
    fn teardown_stops_all_timers() {
        let mut page = page(r#"<div class="flash-message">hi</div>"#);
        assert!(page.on_content_loaded().is_ok());
        page.teardown();
        assert!(!page.is_carousel_running());
        assert_eq!(page.advance_time(Duration::from_secs(30)), 0);
        assert!(!page.flash_dismissed());
    }

    #[test]
    fn events_on_detached_nodes_are_rejected() {
        let mut page = page(r#"<button id="b" class="reaction-btn"><span class="count">1</span></button>"#);
        let Some(button) = page.document().get_element_by_id("b") else {
            panic!("button should exist");
        };
        page.document_mut().detach(button);
        assert!(
            page.dispatch(crate::events::DomEvent::click(button))
                .is_err_and(|error| error.code == "page.event_target")
        );
    }

    #[test]
    fn missing_ids_are_reported() {
        let mut page = page("<p>empty</p>");
        assert!(
            page.click_by_id("nope")
                .is_err_and(|error| error.code == "page.missing_element")
        );
        assert!(page.type_into("captcha-input", "abc").is_err());
    }
}
