//! View seam between the presenter/controller and whatever draws the card.

use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ElementId {
    LevelText,
    Emoji,
    Timestamp,
    StatusCard,
    PredictedFlow,
    AvgSpeed,
    GreenTime,
    Temperature,
    RainFlag,
    MotoCount,
    CarCount,
    EventFlag,
    IsHoliday,
    RefreshBtn,
}

impl ElementId {
    /// Document identifier of the element.
    pub fn as_str(self) -> &'static str {
        match self {
            ElementId::LevelText => "level-text",
            ElementId::Emoji => "emoji",
            ElementId::Timestamp => "timestamp",
            ElementId::StatusCard => "status-card",
            ElementId::PredictedFlow => "predicted-flow",
            ElementId::AvgSpeed => "avg-speed",
            ElementId::GreenTime => "green-time",
            ElementId::Temperature => "temperature",
            ElementId::RainFlag => "rain-flag",
            ElementId::MotoCount => "moto-count",
            ElementId::CarCount => "car-count",
            ElementId::EventFlag => "event-flag",
            ElementId::IsHoliday => "is-holiday",
            ElementId::RefreshBtn => "refresh-btn",
        }
    }
}

/// Mutations a dashboard surface must accept. Implementations never read the
/// state back into the presenter.
pub trait DashboardView {
    fn set_text(&mut self, element: ElementId, text: &str);
    fn set_markup(&mut self, element: ElementId, markup: &str);
    /// Replaces the element's class list with the single `base` class.
    fn reset_classes(&mut self, element: ElementId, base: &str);
    fn add_class(&mut self, element: ElementId, class: &str);
    fn set_disabled(&mut self, element: ElementId, disabled: bool);
    /// Blocking user-facing notification.
    fn notify(&mut self, message: &str);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewCommand {
    SetText { element: ElementId, text: String },
    SetMarkup { element: ElementId, markup: String },
    ResetClasses { element: ElementId, base: String },
    AddClass { element: ElementId, class: String },
}

impl ViewCommand {
    pub fn text(element: ElementId, text: impl Into<String>) -> Self {
        Self::SetText {
            element,
            text: text.into(),
        }
    }

    pub fn markup(element: ElementId, markup: impl Into<String>) -> Self {
        Self::SetMarkup {
            element,
            markup: markup.into(),
        }
    }

    pub fn element(&self) -> ElementId {
        match self {
            Self::SetText { element, .. }
            | Self::SetMarkup { element, .. }
            | Self::ResetClasses { element, .. }
            | Self::AddClass { element, .. } => *element,
        }
    }

    pub fn apply<V: DashboardView + ?Sized>(&self, view: &mut V) {
        match self {
            Self::SetText { element, text } => view.set_text(*element, text),
            Self::SetMarkup { element, markup } => view.set_markup(*element, markup),
            Self::ResetClasses { element, base } => view.reset_classes(*element, base),
            Self::AddClass { element, class } => view.add_class(*element, class),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ElementState {
    pub content: String,
    pub is_markup: bool,
    pub classes: Vec<String>,
    pub disabled: bool,
}

/// In-memory document: element state keyed by id plus the notifications
/// raised so far.
#[derive(Debug, Clone, Default)]
pub struct MemoryView {
    elements: BTreeMap<ElementId, ElementState>,
    notifications: Vec<String>,
}

impl MemoryView {
    pub fn element(&self, element: ElementId) -> Option<&ElementState> {
        self.elements.get(&element)
    }

    pub fn content(&self, element: ElementId) -> Option<&str> {
        self.elements.get(&element).map(|e| e.content.as_str())
    }

    pub fn classes(&self, element: ElementId) -> &[String] {
        self.elements
            .get(&element)
            .map(|e| e.classes.as_slice())
            .unwrap_or_default()
    }

    pub fn is_disabled(&self, element: ElementId) -> bool {
        self.elements.get(&element).is_some_and(|e| e.disabled)
    }

    pub fn notifications(&self) -> &[String] {
        &self.notifications
    }

    fn entry(&mut self, element: ElementId) -> &mut ElementState {
        self.elements.entry(element).or_default()
    }
}

impl DashboardView for MemoryView {
    fn set_text(&mut self, element: ElementId, text: &str) {
        let state = self.entry(element);
        state.content = text.to_string();
        state.is_markup = false;
    }

    fn set_markup(&mut self, element: ElementId, markup: &str) {
        let state = self.entry(element);
        state.content = markup.to_string();
        state.is_markup = true;
    }

    fn reset_classes(&mut self, element: ElementId, base: &str) {
        self.entry(element).classes = vec![base.to_string()];
    }

    fn add_class(&mut self, element: ElementId, class: &str) {
        let classes = &mut self.entry(element).classes;
        if !classes.iter().any(|c| c == class) {
            classes.push(class.to_string());
        }
    }

    fn set_disabled(&mut self, element: ElementId, disabled: bool) {
        self.entry(element).disabled = disabled;
    }

    fn notify(&mut self, message: &str) {
        self.notifications.push(message.to_string());
    }
}
