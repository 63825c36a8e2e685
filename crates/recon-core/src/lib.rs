//! Import session for the CSV reconciler.
//!
//! [`ImportSession`] owns every piece of wizard state and moves through the
//! [`Stage`]s in order:
//!
//! upload → map → intra-file dedupe → validate → remote dedupe → resolve →
//! finalize
//!
//! Going back discards everything computed downstream of the target stage.
//! [`analyze`] runs the whole pipeline without interaction and always
//! produces an [`AnalysisResult`](recon_model::AnalysisResult).

mod analyze;
mod session;
mod stage;

pub use analyze::{AnalyzeOptions, CsvInput, analyze, analyze_with_progress};
pub use session::ImportSession;
pub use stage::Stage;
