//! Click handling: which site is highlighted, and double-click detection.
//!
//! The machine has two states, idle and highlighted. A click on a marker
//! highlights its site. A second click on the same site strictly inside the
//! double-click window returns to idle. Any later click is a fresh single
//! click. Timestamps are monotonic milliseconds supplied by the caller.

use log::debug;
use serde::Serialize;

/// Default double-click window.
pub const DOUBLE_CLICK_WINDOW_MS: u64 = 1000;

/// Monotonic click timestamp in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct ClickInstant(pub u64);

impl ClickInstant {
    pub fn from_millis(ms: u64) -> Self {
        ClickInstant(ms)
    }

    /// Milliseconds since `earlier`, zero if `earlier` is in the future.
    pub fn since(&self, earlier: ClickInstant) -> u64 {
        self.0.saturating_sub(earlier.0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HighlightState {
    pub active_site: Option<String>,
    pub last_click: Option<ClickInstant>,
    pub last_clicked_site: Option<String>,
}

impl HighlightState {
    pub fn is_idle(&self) -> bool {
        self.active_site.is_none()
    }

    pub fn is_active(&self, site: &str) -> bool {
        self.active_site.as_deref() == Some(site)
    }
}

/// What a click did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Transition {
    /// A site became active; `previous` was active before, if any.
    Highlighted {
        site: String,
        previous: Option<String>,
    },
    /// The already active site was clicked again outside the window.
    Reconfirmed { site: String },
    /// Double click: back to idle.
    Reset { site: String },
}

impl Transition {
    /// Whether the trace must be rebuilt for the new active site.
    pub fn needs_trace(&self) -> bool {
        !matches!(self, Transition::Reset { .. })
    }
}

#[derive(Debug, Clone)]
pub struct HighlightMachine {
    state: HighlightState,
    window_ms: u64,
}

impl Default for HighlightMachine {
    fn default() -> Self {
        Self::new(DOUBLE_CLICK_WINDOW_MS)
    }
}

impl HighlightMachine {
    pub fn new(window_ms: u64) -> Self {
        Self {
            state: HighlightState::default(),
            window_ms,
        }
    }

    pub fn state(&self) -> &HighlightState {
        &self.state
    }

    fn is_double_click(&self, site: &str, at: ClickInstant) -> bool {
        match (&self.state.last_clicked_site, self.state.last_click) {
            (Some(last_site), Some(last_at)) => {
                last_site == site && at.since(last_at) < self.window_ms
            }
            _ => false,
        }
    }

    /// Feed a click on a marker of `site`.
    pub fn click(&mut self, site: &str, at: ClickInstant) -> Transition {
        if self.is_double_click(site, at) {
            debug!("double click on {}, resetting highlight", site);
            self.reset();
            return Transition::Reset {
                site: site.to_string(),
            };
        }

        let previous = self.state.active_site.replace(site.to_string());
        self.state.last_click = Some(at);
        self.state.last_clicked_site = Some(site.to_string());

        if previous.as_deref() == Some(site) {
            Transition::Reconfirmed {
                site: site.to_string(),
            }
        } else {
            debug!("highlight {:?} -> {}", previous, site);
            Transition::Highlighted {
                site: site.to_string(),
                previous,
            }
        }
    }

    /// Back to idle with no click history.
    pub fn reset(&mut self) {
        self.state = HighlightState::default();
    }
}
