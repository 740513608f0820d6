use super::*;
use crate::view::MemoryView;
use async_trait::async_trait;
use serde_json::json;
use std::sync::{
    atomic::{AtomicUsize, Ordering as AtomicOrdering},
    Arc,
};
use tokio::sync::Notify;

enum Trigger {
    Ok,
    Rejected(&'static str),
}

struct ScriptedSource {
    trigger: Trigger,
    realtime: Value,
    runs: AtomicUsize,
    fetches: AtomicUsize,
}

impl ScriptedSource {
    fn new(trigger: Trigger, realtime: Value) -> Self {
        Self {
            trigger,
            realtime,
            runs: AtomicUsize::new(0),
            fetches: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl PredictionSource for ScriptedSource {
    async fn run_prediction(&self) -> Result<(), FetchError> {
        self.runs.fetch_add(1, AtomicOrdering::SeqCst);
        match self.trigger {
            Trigger::Ok => Ok(()),
            Trigger::Rejected(message) => Err(FetchError::Server {
                status: 500,
                message: message.to_string(),
            }),
        }
    }

    async fn fetch_realtime(&self) -> Result<Value, FetchError> {
        self.fetches.fetch_add(1, AtomicOrdering::SeqCst);
        Ok(self.realtime.clone())
    }
}

fn assert_trigger_restored(view: &MemoryView) {
    assert!(!view.is_disabled(ElementId::RefreshBtn));
    assert_eq!(view.content(ElementId::RefreshBtn), Some(TRIGGER_IDLE_LABEL));
}

#[tokio::test]
async fn rejected_trigger_notifies_and_skips_fetch() {
    let controller = RefreshController::new(ScriptedSource::new(
        Trigger::Rejected("boom"),
        json!([{ "congestion_level": "Low" }]),
    ));
    let mut view = MemoryView::default();

    let outcome = controller.refresh(&mut view).await;

    assert!(matches!(outcome, RefreshOutcome::Failed(ref m) if m.contains("boom")));
    assert_eq!(controller.source().fetches.load(AtomicOrdering::SeqCst), 0);
    assert_eq!(view.notifications().len(), 1);
    assert!(view.notifications()[0].starts_with("Could not update: "));
    assert!(view.notifications()[0].contains("boom"));
    assert!(view.element(ElementId::LevelText).is_none());
    assert_trigger_restored(&view);
    assert!(!controller.is_in_flight());
}

#[tokio::test]
async fn payload_error_is_reported_without_rendering() {
    let controller = RefreshController::new(ScriptedSource::new(
        Trigger::Ok,
        json!([{ "error": "real_time_prediction.csv not found" }]),
    ));
    let mut view = MemoryView::default();

    let outcome = controller.refresh(&mut view).await;

    assert_eq!(
        outcome,
        RefreshOutcome::ServerReported("real_time_prediction.csv not found".to_string())
    );
    assert_eq!(
        view.notifications(),
        ["Server error: real_time_prediction.csv not found"]
    );
    assert!(view.element(ElementId::StatusCard).is_none());
    assert_trigger_restored(&view);
}

#[tokio::test]
async fn successful_cycle_renders_first_record() {
    let controller = RefreshController::new(ScriptedSource::new(
        Trigger::Ok,
        json!([{ "congestion_level": "High", "flow_weighted_pred": 812.004 }]),
    ));
    let mut view = MemoryView::default();

    let outcome = controller.refresh(&mut view).await;

    assert_eq!(outcome, RefreshOutcome::Rendered { records: 1 });
    assert_eq!(view.content(ElementId::Emoji), Some("🟠"));
    assert_eq!(view.content(ElementId::PredictedFlow), Some("812.00"));
    assert!(view.notifications().is_empty());
    assert_eq!(controller.source().runs.load(AtomicOrdering::SeqCst), 1);
    assert_eq!(controller.source().fetches.load(AtomicOrdering::SeqCst), 1);
    assert_trigger_restored(&view);
}

#[tokio::test]
async fn trailing_elements_are_not_decoded() {
    let controller = RefreshController::new(ScriptedSource::new(
        Trigger::Ok,
        json!([{ "congestion_level": "Low" }, null, "junk"]),
    ));
    let mut view = MemoryView::default();

    let outcome = controller.refresh(&mut view).await;

    assert_eq!(outcome, RefreshOutcome::Rendered { records: 3 });
    assert_eq!(view.content(ElementId::LevelText), Some("Low"));
    assert_eq!(view.content(ElementId::Emoji), Some("🟢"));
    assert!(view.notifications().is_empty());
    assert_trigger_restored(&view);
}

#[test]
fn interpret_keeps_only_the_first_record() {
    let payload = RealtimePayload::interpret(json!([
        { "congestion_level": "High" },
        { "congestion_level": "Low" }
    ]))
    .expect("records");

    match payload {
        RealtimePayload::Records { latest, count } => {
            assert_eq!(count, 2);
            assert_eq!(latest.expect("first record").level_label(), "High");
        }
        other => panic!("unexpected payload: {other:?}"),
    }
}

#[tokio::test]
async fn empty_array_and_null_render_no_data() {
    for payload in [json!([]), Value::Null] {
        let controller = RefreshController::new(ScriptedSource::new(Trigger::Ok, payload));
        let mut view = MemoryView::default();

        let outcome = controller.refresh(&mut view).await;

        assert_eq!(outcome, RefreshOutcome::Rendered { records: 0 });
        assert_eq!(view.content(ElementId::LevelText), Some("No data"));
        assert!(view.notifications().is_empty());
    }
}

#[tokio::test]
async fn falsy_error_field_is_treated_as_a_record() {
    let controller = RefreshController::new(ScriptedSource::new(
        Trigger::Ok,
        json!([{ "error": "", "congestion_level": "Low" }]),
    ));
    let mut view = MemoryView::default();

    let outcome = controller.refresh(&mut view).await;

    assert_eq!(outcome, RefreshOutcome::Rendered { records: 1 });
    assert_eq!(view.content(ElementId::LevelText), Some("Low"));
}

#[tokio::test]
async fn non_array_payload_fails_the_cycle() {
    let controller = RefreshController::new(ScriptedSource::new(
        Trigger::Ok,
        json!({ "congestion_level": "Low" }),
    ));
    let mut view = MemoryView::default();

    let outcome = controller.refresh(&mut view).await;

    assert!(matches!(outcome, RefreshOutcome::Failed(_)));
    assert_eq!(view.notifications().len(), 1);
    assert!(view.notifications()[0].contains("an object"));
    assert!(view.element(ElementId::LevelText).is_none());
    assert_trigger_restored(&view);
}

struct BlockingSource {
    started: Arc<Notify>,
    release: Arc<Notify>,
}

#[async_trait]
impl PredictionSource for BlockingSource {
    async fn run_prediction(&self) -> Result<(), FetchError> {
        self.started.notify_one();
        self.release.notified().await;
        Ok(())
    }

    async fn fetch_realtime(&self) -> Result<Value, FetchError> {
        Ok(json!([{ "congestion_level": "Low" }]))
    }
}

#[tokio::test]
async fn second_trigger_while_in_flight_is_busy() {
    let started = Arc::new(Notify::new());
    let release = Arc::new(Notify::new());
    let controller = Arc::new(RefreshController::new(BlockingSource {
        started: started.clone(),
        release: release.clone(),
    }));

    let first = {
        let controller = controller.clone();
        tokio::spawn(async move {
            let mut view = MemoryView::default();
            let outcome = controller.refresh(&mut view).await;
            (outcome, view)
        })
    };
    started.notified().await;
    assert!(controller.is_in_flight());

    let mut second_view = MemoryView::default();
    assert_eq!(
        controller.refresh(&mut second_view).await,
        RefreshOutcome::Busy
    );
    assert!(second_view.element(ElementId::RefreshBtn).is_none());

    release.notify_one();
    let (outcome, view) = first.await.expect("first cycle");
    assert_eq!(outcome, RefreshOutcome::Rendered { records: 1 });
    assert_trigger_restored(&view);
    assert!(!controller.is_in_flight());
}

#[tokio::test]
async fn dropping_a_cycle_mid_flight_restores_the_trigger() {
    let started = Arc::new(Notify::new());
    let release = Arc::new(Notify::new());
    let controller = RefreshController::new(BlockingSource {
        started: started.clone(),
        release,
    });
    let mut view = MemoryView::default();

    {
        let cycle = controller.refresh(&mut view);
        tokio::pin!(cycle);
        tokio::select! {
            _ = &mut cycle => panic!("cycle should still be blocked"),
            _ = started.notified() => {}
        }
    }

    assert_trigger_restored(&view);
    assert!(!controller.is_in_flight());
}
