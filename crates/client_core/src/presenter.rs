//! Maps a prediction record onto dashboard element updates.

use shared::{domain::SEVERE_MARKER, protocol::PredictionRecord};

use crate::{
    format::{coerce_f64, display_value, is_one, to_fixed},
    view::{DashboardView, ElementId, ViewCommand},
};

pub const NO_DATA_LEVEL: &str = "No data";
pub const NO_DATA_EMOJI: &str = "⚠️";
pub const NO_DATA_TIMESTAMP: &str = "Error or no prediction yet.";
pub const STATUS_CARD_BASE_CLASS: &str = "status-card-base";

const RAIN_ON: &str = "Raining 🌧️";
const RAIN_OFF: &str = "Dry ☀️";
const EVENT_ON: &str = "Incident/Event ⚠️";
const EVENT_ON_COLOR: &str = "#e74c3c";
const EVENT_OFF: &str = "Normal ✅";
const HOLIDAY_ON: &str = "Holiday/Day off 🎉";
const HOLIDAY_ON_COLOR: &str = "#f39c12";
const HOLIDAY_OFF: &str = "Weekday 💼";

/// Builds the update set for the newest record. Only the first record is
/// rendered; an absent or empty slice yields the "no data" state, which
/// touches the level, emoji and timestamp elements only.
pub fn present(records: Option<&[PredictionRecord]>) -> Vec<ViewCommand> {
    let Some(row) = records.and_then(|r| r.first()) else {
        return vec![
            ViewCommand::text(ElementId::LevelText, NO_DATA_LEVEL),
            ViewCommand::text(ElementId::Emoji, NO_DATA_EMOJI),
            ViewCommand::text(ElementId::Timestamp, NO_DATA_TIMESTAMP),
        ];
    };

    let label = row.level_label();

    vec![
        ViewCommand::text(
            ElementId::Timestamp,
            format!("Time: {}", display_value(&row.timestamp)),
        ),
        ViewCommand::text(ElementId::Emoji, row.level().emoji()),
        ViewCommand::text(ElementId::LevelText, display_level(label)),
        ViewCommand::text(
            ElementId::PredictedFlow,
            to_fixed(coerce_f64(&row.flow_weighted_pred), 2),
        ),
        ViewCommand::ResetClasses {
            element: ElementId::StatusCard,
            base: STATUS_CARD_BASE_CLASS.to_string(),
        },
        ViewCommand::AddClass {
            element: ElementId::StatusCard,
            class: status_class(label),
        },
        ViewCommand::text(
            ElementId::AvgSpeed,
            format!("{} km/h", to_fixed(coerce_f64(&row.avg_speed), 1)),
        ),
        ViewCommand::text(
            ElementId::GreenTime,
            format!("{} s", display_value(&row.green_time)),
        ),
        ViewCommand::text(
            ElementId::Temperature,
            format!("{}°C", display_value(&row.temp)),
        ),
        ViewCommand::text(
            ElementId::RainFlag,
            if is_one(&row.rain) { RAIN_ON } else { RAIN_OFF },
        ),
        ViewCommand::text(ElementId::MotoCount, display_value(&row.motorbike_count)),
        ViewCommand::text(ElementId::CarCount, display_value(&row.car_count)),
        flag_command(
            ElementId::EventFlag,
            is_one(&row.event_flag),
            (EVENT_ON, EVENT_ON_COLOR),
            EVENT_OFF,
        ),
        flag_command(
            ElementId::IsHoliday,
            is_one(&row.is_holiday),
            (HOLIDAY_ON, HOLIDAY_ON_COLOR),
            HOLIDAY_OFF,
        ),
    ]
}

/// Applies [`present`] to a live view.
pub fn update_ui<V: DashboardView + ?Sized>(view: &mut V, records: Option<&[PredictionRecord]>) {
    for command in present(records) {
        command.apply(view);
    }
}

/// Label text with the severe marker stripped.
pub fn display_level(label: &str) -> String {
    label.replacen(SEVERE_MARKER, "", 1).trim().to_string()
}

/// `status-<label>` with the marker stripped and spaces turned into `_`.
pub fn status_class(label: &str) -> String {
    format!("status-{}", display_level(label).replace(' ', "_"))
}

fn flag_command(
    element: ElementId,
    active: bool,
    (on_text, on_color): (&str, &str),
    off_text: &str,
) -> ViewCommand {
    if active {
        ViewCommand::markup(
            element,
            format!(r#"<span style="color: {on_color}; font-weight: bold;">{on_text}</span>"#),
        )
    } else {
        ViewCommand::text(element, off_text)
    }
}

#[cfg(test)]
#[path = "tests/presenter_tests.rs"]
mod tests;
