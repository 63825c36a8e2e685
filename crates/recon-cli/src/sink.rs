//! Delivery to every configured sink.

use recon_model::{CanonicalField, NotificationPayload};
use recon_report::{NotificationSink, Result};
use tracing::{trace, warn};

use crate::logging::redact_value;

/// Hands the payload to each sink in turn.
///
/// Every sink is tried; the first failure is returned.
#[derive(Default)]
pub struct FanoutSink {
    sinks: Vec<Box<dyn NotificationSink>>,
}

impl FanoutSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, sink: impl NotificationSink + 'static) {
        self.sinks.push(Box::new(sink));
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }
}

impl NotificationSink for FanoutSink {
    fn name(&self) -> String {
        let names: Vec<String> = self.sinks.iter().map(|sink| sink.name()).collect();
        names.join(", ")
    }

    fn deliver(&self, payload: &NotificationPayload) -> Result<()> {
        let records = payload
            .new_records
            .iter()
            .chain(&payload.updated_records)
            .chain(&payload.unchanged_records);
        for record in records {
            trace!(
                row = record.original_index,
                app_name = %redact_value(record.get(CanonicalField::AppName)),
                root_domain = %redact_value(&record.root_domain),
                outcome = %record.outcome,
                "final record"
            );
        }

        let mut first_error = None;
        for sink in &self.sinks {
            if let Err(err) = sink.deliver(payload) {
                warn!(sink = %sink.name(), error = %err, "delivery failed");
                first_error.get_or_insert(err);
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}
