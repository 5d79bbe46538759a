use pk_behaviors::PageScript;
use pk_behaviors::RecordingDialogs;
use std::fmt;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReactionLine {
    pub label: String,
    pub count: i64,
    pub active: bool,
}

/// Behavior state printed after a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSummary {
    pub title: String,
    pub nodes: usize,
    pub clock: Duration,
    pub slide: usize,
    pub slides: usize,
    pub transform: String,
    pub carousel_running: bool,
    pub captcha: Option<String>,
    pub submitted: Option<bool>,
    pub reactions: Vec<ReactionLine>,
    pub flash_dismissed: bool,
    pub alerts: Vec<String>,
}

impl PageSummary {
    pub fn capture(page: &PageScript<RecordingDialogs>, submitted: Option<bool>) -> Self {
        let document = page.document();
        let carousel = page.carousel_state();
        let reactions = page
            .reactions()
            .controls()
            .iter()
            .map(|control| ReactionLine {
                label: document
                    .element(control.node)
                    .and_then(|element| element.id())
                    .map(|id| format!("#{id}"))
                    .unwrap_or_else(|| format!("node {}", control.node)),
                count: control.state.count(),
                active: control.state.active,
            })
            .collect();

        Self {
            title: document.title.clone(),
            nodes: document.node_count(),
            clock: page.now(),
            slide: carousel.index(),
            slides: carousel.total(),
            transform: carousel.translation(),
            carousel_running: page.is_carousel_running(),
            captcha: page.captcha_code(),
            submitted,
            reactions,
            flash_dismissed: page.flash_dismissed(),
            alerts: page.dialogs().alerts.clone(),
        }
    }
}

impl fmt::Display for PageSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "page:      {}", display_or(&self.title, "(untitled)"))?;
        writeln!(f, "nodes:     {}", self.nodes)?;
        writeln!(f, "clock:     {} ms", self.clock.as_millis())?;
        writeln!(
            f,
            "carousel:  slide {}/{} {}{}",
            self.slide + 1,
            self.slides,
            self.transform,
            if self.carousel_running { "" } else { " (stopped)" }
        )?;
        writeln!(
            f,
            "captcha:   {}",
            self.captcha.as_deref().unwrap_or("(no display)")
        )?;
        if let Some(submitted) = self.submitted {
            writeln!(
                f,
                "submit:    {}",
                if submitted { "accepted" } else { "blocked" }
            )?;
        }
        for reaction in &self.reactions {
            writeln!(
                f,
                "reaction:  {} count={}{}",
                reaction.label,
                reaction.count,
                if reaction.active { " active" } else { "" }
            )?;
        }
        writeln!(
            f,
            "flash:     {}",
            if self.flash_dismissed { "dismissed" } else { "visible" }
        )?;
        for alert in &self.alerts {
            writeln!(f, "alert:     {alert}")?;
        }
        Ok(())
    }
}

fn display_or<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.is_empty() { fallback } else { value }
}

#[cfg(test)]
mod tests {
    use super::PageSummary;
    use super::ReactionLine;
    use std::time::Duration;

    #[test]
    fn renders_every_section() {
        let summary = PageSummary {
            title: String::new(),
            nodes: 37,
            clock: Duration::from_millis(4000),
            slide: 2,
            slides: 4,
            transform: "translateX(-50%)".to_owned(),
            carousel_running: true,
            captcha: Some("Xk9mQ".to_owned()),
            submitted: Some(false),
            reactions: vec![ReactionLine {
                label: "#like-1".to_owned(),
                count: 4,
                active: true,
            }],
            flash_dismissed: true,
            alerts: vec!["Invalid Security Code! Please try again.".to_owned()],
        };
        let text = summary.to_string();
        assert!(text.contains("page:      (untitled)"));
        assert!(text.contains("nodes:     37\n"));
        assert!(text.contains("carousel:  slide 3/4 translateX(-50%)\n"));
        assert!(text.contains("submit:    blocked"));
        assert!(text.contains("reaction:  #like-1 count=4 active"));
        assert!(text.contains("flash:     dismissed"));
        assert!(text.contains("alert:     Invalid Security Code!"));
    }
}
