#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;
use problemkit::{ErrorSink, IdGenerator, ProblemTranslator, UncaughtError};

/// Owned copy of one `uncaught error` record.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub event: String,
    pub error: String,
    pub correlation_id: String,
    pub token: Option<String>,
    pub body: String,
}

#[derive(Clone, Default)]
pub struct RecordingSink {
    records: Arc<Mutex<Vec<Recorded>>>,
}

impl RecordingSink {
    pub fn records(&self) -> Vec<Recorded> {
        self.records.lock().clone()
    }
}

impl ErrorSink for RecordingSink {
    fn log_error(&self, record: &UncaughtError<'_>) {
        self.records.lock().push(Recorded {
            event: record.event.to_owned(),
            error: record.error.clone(),
            correlation_id: record.correlation_id.to_owned(),
            token: record.token.map(ToOwned::to_owned),
            body: record.body.to_string(),
        });
    }
}

/// Deterministic identifiers: `id-1`, `id-2`, ...
#[derive(Clone, Default)]
pub struct SequentialIds {
    next: Arc<AtomicUsize>,
}

impl SequentialIds {
    pub fn issued(&self) -> usize {
        self.next.load(Ordering::SeqCst)
    }
}

impl IdGenerator for SequentialIds {
    fn new_short_id(&self) -> String {
        let n = self.next.fetch_add(1, Ordering::SeqCst) + 1;
        format!("id-{n}")
    }
}

pub struct Harness {
    pub translator: ProblemTranslator,
    pub sink: RecordingSink,
    pub ids: SequentialIds,
}

pub fn harness(verbose: bool) -> Harness {
    let sink = RecordingSink::default();
    let ids = SequentialIds::default();
    let translator = ProblemTranslator::new(verbose)
        .with_sink(sink.clone())
        .with_id_generator(ids.clone());
    Harness {
        translator,
        sink,
        ids,
    }
}
