//! Timed dismissal of flash notices.

use crate::config::FlashConfig;
use crate::page::PageTask;
use pk_dom::Document;
use pk_timers::TimerId;
use pk_timers::TimerQueue;

#[derive(Debug, Clone)]
pub struct FlashDismissal {
    config: FlashConfig,
    timer: Option<TimerId>,
    dismissed: bool,
}

impl FlashDismissal {
    pub fn new(config: FlashConfig) -> Self {
        Self {
            config,
            timer: None,
            dismissed: false,
        }
    }

    /// Arms the one-shot dismissal. Never re-arms after it has fired.
    pub fn schedule(&mut self, timers: &mut TimerQueue<PageTask>) -> Option<TimerId> {
        if self.dismissed {
            return None;
        }
        if let Some(timer) = self.timer {
            return Some(timer);
        }
        let timer = timers.set_timeout(self.config.delay(), PageTask::DismissFlashes);
        self.timer = Some(timer);
        Some(timer)
    }

    pub fn is_dismissed(&self) -> bool {
        self.dismissed
    }

    /// Hides every notice present right now. Returns how many were hidden.
    pub fn dismiss(&mut self, document: &mut Document) -> usize {
        self.timer = None;
        self.dismissed = true;

        let notices = document.get_elements_by_class_name(&self.config.message_class);
        for notice in &notices {
            if let Some(element) = document.element_mut(*notice) {
                element.set_style_property("display", "none");
            }
        }
        tracing::debug!(hidden = notices.len(), "flash messages dismissed");
        notices.len()
    }

    /// Drops a pending dismissal without hiding anything.
    pub fn cancel(&mut self, timers: &mut TimerQueue<PageTask>) -> bool {
        self.timer.take().is_some_and(|timer| timers.clear(timer))
    }
}
