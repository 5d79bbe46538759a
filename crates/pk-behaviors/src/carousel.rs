//! Round-robin image carousel.
//!
//! The slide index lives in [`CarouselState`], owned by the [`Carousel`]
//! rather than by the page. Rendering translates the track element so the
//! current slide is in view; a missing track is not an error because most
//! pages carry no carousel.

use crate::config::CarouselConfig;
use crate::page::PageTask;
use pk_dom::Document;
use pk_timers::TimerId;
use pk_timers::TimerQueue;

/// Slide index plus slide count. `index < total` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CarouselState {
    index: usize,
    total: usize,
}

impl CarouselState {
    /// `total` is clamped to at least one slide.
    pub fn new(total: usize) -> Self {
        Self {
            index: 0,
            total: total.max(1),
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn total(&self) -> usize {
        self.total
    }

    /// Moves by `delta` slides, wrapping in both directions.
    pub fn advance(&mut self, delta: i64) -> usize {
        let total = self.total as i64;
        let step = delta.rem_euclid(total) as usize;
        self.index = (self.index + step) % self.total;
        self.index
    }

    /// CSS transform placing the current slide in view.
    pub fn translation(&self) -> String {
        if self.index == 0 {
            return "translateX(0%)".to_owned();
        }
        let offset = self.index as f64 * 100.0 / self.total as f64;
        format!("translateX(-{offset}%)")
    }
}

#[derive(Debug, Clone)]
pub struct Carousel {
    state: CarouselState,
    config: CarouselConfig,
    timer: Option<TimerId>,
}

impl Carousel {
    pub fn new(config: CarouselConfig) -> Self {
        Self {
            state: CarouselState::new(config.total_slides),
            config,
            timer: None,
        }
    }

    pub fn state(&self) -> CarouselState {
        self.state
    }

    pub fn advance(&mut self, document: &mut Document, delta: i64) -> usize {
        let index = self.state.advance(delta);
        self.render(document);
        index
    }

    /// Applies the current translation to the track. Returns false when the
    /// page has no track element.
    pub fn render(&self, document: &mut Document) -> bool {
        let Some(track) = document
            .get_element_by_id(&self.config.track_id)
            .and_then(|node| document.element_mut(node))
        else {
            return false;
        };

        track.set_style_property("transform", self.state.translation());
        tracing::debug!(slide = self.state.index, "Moving to slide");
        true
    }

    /// Arms the auto-advance interval. Starting twice keeps the first timer.
    pub fn start(&mut self, timers: &mut TimerQueue<PageTask>) -> TimerId {
        if let Some(timer) = self.timer.filter(|timer| timers.is_active(*timer)) {
            return timer;
        }
        let timer = timers.set_interval(self.config.interval(), PageTask::AdvanceCarousel);
        tracing::debug!(%timer, interval_ms = self.config.interval_ms, "carousel rotation started");
        self.timer = Some(timer);
        timer
    }

    /// Cancels the auto-advance interval. Returns false if it was not running.
    pub fn stop(&mut self, timers: &mut TimerQueue<PageTask>) -> bool {
        match self.timer.take() {
            Some(timer) => {
                tracing::debug!(%timer, "carousel rotation stopped");
                timers.clear(timer)
            }
            None => false,
        }
    }

    pub fn is_running(&self, timers: &TimerQueue<PageTask>) -> bool {
        self.timer.is_some_and(|timer| timers.is_active(timer))
    }
}
