//! Final record set, summary and notification delivery.
//!
//! After both resolution stages every surviving row lands in one bucket:
//!
//! - **new**: no remote duplicate
//! - **updated**: remote duplicate resolved with replace or merge
//! - **unchanged**: remote duplicate kept as is
//!
//! The buckets and their summary are wrapped in a
//! [`NotificationPayload`](recon_model::NotificationPayload) and handed to a
//! [`NotificationSink`].

mod domain;
mod error;
mod finalize;
mod payload;
mod sink;

pub use domain::extract_root_domain;
pub use error::{Result, SubmissionError};
pub use finalize::{FinalizedImport, finalize};
pub use payload::{build_payload, import_outcome};
pub use sink::{JsonFileSink, NotificationSink, WebhookSink};
