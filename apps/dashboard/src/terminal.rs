//! Text rendering of the dashboard card.

use client_core::{controller::TRIGGER_IDLE_LABEL, DashboardView, ElementId, MemoryView};

const FIELDS: [(&str, ElementId); 9] = [
    ("Predicted flow", ElementId::PredictedFlow),
    ("Average speed", ElementId::AvgSpeed),
    ("Green time", ElementId::GreenTime),
    ("Temperature", ElementId::Temperature),
    ("Weather", ElementId::RainFlag),
    ("Motorbikes", ElementId::MotoCount),
    ("Cars", ElementId::CarCount),
    ("Event", ElementId::EventFlag),
    ("Holiday", ElementId::IsHoliday),
];

/// Keeps element state in memory and prints alerts to stderr as they arrive.
#[derive(Default)]
pub struct TerminalView {
    state: MemoryView,
}

impl TerminalView {
    fn field(&self, element: ElementId) -> String {
        self.state
            .content(element)
            .map(strip_tags)
            .filter(|text| !text.is_empty())
            .unwrap_or_else(|| "-".to_string())
    }

    pub fn render(&self, refreshed_at: &str) -> String {
        let mut out = String::new();
        let classes = self.state.classes(ElementId::StatusCard).join(" ");
        out.push_str(&format!("┌─ {classes}\n"));
        out.push_str(&format!(
            "│ {} {}\n",
            self.field(ElementId::Emoji),
            self.field(ElementId::LevelText)
        ));
        out.push_str(&format!("│ {}\n", self.field(ElementId::Timestamp)));
        out.push_str("│\n");
        for (label, element) in FIELDS {
            out.push_str(&format!("│ {label:<15} {}\n", self.field(element)));
        }
        let button = self
            .state
            .content(ElementId::RefreshBtn)
            .unwrap_or(TRIGGER_IDLE_LABEL);
        let hint = if self.state.is_disabled(ElementId::RefreshBtn) {
            "busy"
        } else {
            "Enter to refresh, q to quit"
        };
        out.push_str(&format!("└─ [{button}] ({hint}) last refresh {refreshed_at}\n"));
        out
    }
}

impl DashboardView for TerminalView {
    fn set_text(&mut self, element: ElementId, text: &str) {
        self.state.set_text(element, text);
    }

    fn set_markup(&mut self, element: ElementId, markup: &str) {
        self.state.set_markup(element, markup);
    }

    fn reset_classes(&mut self, element: ElementId, base: &str) {
        self.state.reset_classes(element, base);
    }

    fn add_class(&mut self, element: ElementId, class: &str) {
        self.state.add_class(element, class);
    }

    fn set_disabled(&mut self, element: ElementId, disabled: bool) {
        self.state.set_disabled(element, disabled);
    }

    fn notify(&mut self, message: &str) {
        eprintln!("[alert] {message}");
        self.state.notify(message);
    }
}

/// Drops anything between `<` and `>`.
pub fn strip_tags(markup: &str) -> String {
    let mut text = String::with_capacity(markup.len());
    let mut in_tag = false;
    for c in markup.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => text.push(c),
            _ => {}
        }
    }
    text
}
