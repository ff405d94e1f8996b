//! Visible application state and the loading indicator seam.

use std::sync::atomic::{AtomicUsize, Ordering};

use crate::schema::{DayPlan, SavedItinerary};
use crate::session::AuthView;

pub const AI_PLACEHOLDER: &str = "No response";
pub const SAVED_FAILURE_NOTICE: &str = "Failed to load saved itineraries";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub sender: Sender,
    pub text: String,
    pub is_error: bool,
}

/// One rendered day of the current plan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayCard {
    pub day: u32,
    pub summary: String,
    pub place_names: Vec<String>,
}

impl From<&DayPlan> for DayCard {
    fn from(day: &DayPlan) -> Self {
        Self {
            day: day.day,
            summary: day.summary.clone(),
            place_names: day.places.iter().map(|p| p.name.clone()).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum SavedPanel {
    #[default]
    NotLoaded,
    Loaded(Vec<SavedItinerary>),
    Failed(String),
}

/// Everything the front-end shows; renderers read it, flows write it
#[derive(Debug, Clone, PartialEq)]
pub struct View {
    pub auth: AuthView,
    pub messages: Vec<Message>,
    pub plan_destination: Option<String>,
    pub plan: Vec<DayCard>,
    pub saved: SavedPanel,
    pub map_url: Option<String>,
    pub map_notice: Option<String>,
}

impl View {
    pub fn new(auth: AuthView) -> Self {
        Self {
            auth,
            messages: Vec::new(),
            plan_destination: None,
            plan: Vec::new(),
            saved: SavedPanel::NotLoaded,
            map_url: None,
            map_notice: None,
        }
    }

    pub fn push_user(&mut self, text: impl Into<String>) {
        self.messages.push(Message {
            sender: Sender::User,
            text: text.into(),
            is_error: false,
        });
    }

    pub fn push_assistant(&mut self, text: impl Into<String>) {
        self.messages.push(Message {
            sender: Sender::Assistant,
            text: text.into(),
            is_error: false,
        });
    }

    pub fn push_error(&mut self, text: impl Into<String>) {
        self.messages.push(Message {
            sender: Sender::Assistant,
            text: text.into(),
            is_error: true,
        });
    }

    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }
}

/// Busy indicator shown while a request is in flight
pub trait Indicator: Send + Sync {
    fn show(&self, label: &str);
    fn hide(&self);
}

/// Indicator that draws nothing, for headless use
#[derive(Debug, Default)]
pub struct NoopIndicator;

impl Indicator for NoopIndicator {
    fn show(&self, _label: &str) {}
    fn hide(&self) {}
}

/// Counts show/hide calls; handy for asserting the indicator is always released
#[derive(Debug, Default)]
pub struct CountingIndicator {
    shown: AtomicUsize,
    hidden: AtomicUsize,
}

impl CountingIndicator {
    pub fn shown(&self) -> usize {
        self.shown.load(Ordering::SeqCst)
    }

    pub fn hidden(&self) -> usize {
        self.hidden.load(Ordering::SeqCst)
    }

    pub fn is_active(&self) -> bool {
        self.shown() > self.hidden()
    }
}

impl Indicator for CountingIndicator {
    fn show(&self, _label: &str) {
        self.shown.fetch_add(1, Ordering::SeqCst);
    }

    fn hide(&self) {
        self.hidden.fetch_add(1, Ordering::SeqCst);
    }
}
