use std::time::{Duration, Instant};

use crate::api::ApiError;
use crate::model::Place;

/// Only the last keystroke within this window triggers a request.
pub const DEBOUNCE: Duration = Duration::from_millis(350);

/// Dropdown lifecycle per input change: Idle → Pending (timer armed) →
/// Loading → Populated | Empty | Idle-on-error. `Searching` is the
/// interim row shown while an explicit search is in flight.
#[derive(Debug, Clone, PartialEq)]
pub enum SuggestState {
    Idle,
    Pending { query: String, deadline: Instant },
    Loading { query: String },
    Populated,
    Empty,
    Searching { query: String },
}

/// A suggestion fetch to dispatch. The generation stamp lets the
/// controller discard completions that were superseded by later
/// keystrokes — a suggestion request already in flight is never
/// cancelled, only ignored.
#[derive(Debug, Clone, PartialEq)]
pub struct SuggestRequest {
    pub query: String,
    pub generation: u64,
}

#[derive(Debug)]
pub struct SuggestController {
    state: SuggestState,
    places: Vec<Place>,
    cursor: Option<usize>,
    generation: u64,
}

impl Default for SuggestController {
    fn default() -> Self {
        Self::new()
    }
}

impl SuggestController {
    pub fn new() -> Self {
        Self {
            state: SuggestState::Idle,
            places: Vec::new(),
            cursor: None,
            generation: 0,
        }
    }

    pub fn state(&self) -> &SuggestState {
        &self.state
    }

    /// Rows currently backing the dropdown. Retained through Pending and
    /// Loading so the list does not flicker between keystrokes.
    pub fn places(&self) -> &[Place] {
        &self.places
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    pub fn is_visible(&self) -> bool {
        match self.state {
            SuggestState::Idle => false,
            SuggestState::Pending { .. } | SuggestState::Loading { .. } => !self.places.is_empty(),
            SuggestState::Populated | SuggestState::Empty | SuggestState::Searching { .. } => true,
        }
    }

    /// A keystroke. Re-arms the debounce deadline; empty input hides the
    /// dropdown immediately, bypassing the timer.
    pub fn input_changed(&mut self, text: &str, now: Instant) {
        self.generation += 1;
        self.cursor = None;

        let query = text.trim();
        if query.is_empty() {
            self.state = SuggestState::Idle;
            self.places.clear();
            return;
        }

        self.state = SuggestState::Pending {
            query: query.to_string(),
            deadline: now + DEBOUNCE,
        };
    }

    /// Called on every tick; fires the armed request once the debounce
    /// window has passed without further keystrokes.
    pub fn poll(&mut self, now: Instant) -> Option<SuggestRequest> {
        let SuggestState::Pending { query, deadline } = &self.state else {
            return None;
        };
        if now < *deadline {
            return None;
        }

        let query = query.clone();
        self.state = SuggestState::Loading {
            query: query.clone(),
        };
        Some(SuggestRequest {
            query,
            generation: self.generation,
        })
    }

    pub fn on_response(&mut self, generation: u64, result: Result<Vec<Place>, ApiError>) {
        if generation != self.generation {
            tracing::debug!(generation, current = self.generation, "stale suggestion response discarded");
            return;
        }

        match result {
            Ok(places) if places.is_empty() => {
                self.state = SuggestState::Empty;
                self.places.clear();
                self.cursor = None;
            }
            Ok(places) => {
                self.state = SuggestState::Populated;
                self.places = places;
                self.cursor = None;
            }
            Err(error) => {
                // Suggestion failures are never surfaced; the dropdown
                // just goes away.
                tracing::warn!(%error, "suggestion fetch failed");
                self.state = SuggestState::Idle;
                self.places.clear();
                self.cursor = None;
            }
        }
    }

    /// Replace the dropdown with a single "searching…" row while an
    /// explicit query search runs.
    pub fn show_searching(&mut self, query: impl Into<String>) {
        self.generation += 1;
        self.state = SuggestState::Searching {
            query: query.into(),
        };
        self.places.clear();
        self.cursor = None;
    }

    pub fn dismiss(&mut self) {
        self.generation += 1;
        self.state = SuggestState::Idle;
        self.places.clear();
        self.cursor = None;
    }

    pub fn move_cursor(&mut self, delta: i32) {
        if !matches!(self.state, SuggestState::Populated) || self.places.is_empty() {
            return;
        }

        let last = self.places.len() - 1;
        self.cursor = Some(match (self.cursor, delta.is_negative()) {
            (None, false) => 0,
            (None, true) => last,
            (Some(index), false) => index.saturating_add(delta.unsigned_abs() as usize).min(last),
            (Some(index), true) => index.saturating_sub(delta.unsigned_abs() as usize),
        });
    }

    pub fn highlighted(&self) -> Option<&Place> {
        self.cursor.and_then(|index| self.places.get(index))
    }
}
