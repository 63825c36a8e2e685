//! Interactive import session.

use std::path::Path;

use recon_dedupe::{
    CollapseStats, CsvResolutions, DedupeError, GroupCache, collapse_stats, resolve_survivors,
};
use recon_ingest::{CsvTable, parse_csv_str, read_csv};
use recon_map::MappingState;
use recon_model::{
    AnalysisCounts, CanonicalField, CsvAction, DuplicateGroup, FieldSource, MatchFieldSet,
    NotificationPayload, ReconError, RemoteAction, RemoteMatch, Result, Row,
};
use recon_remote::{LookupFailure, LookupMode, LookupOutcome, RemoteResolutions, RemoteStore, run_lookups};
use recon_report::{FinalizedImport, NotificationSink, build_payload, import_outcome};
use recon_validate::{Issue, ValidationReport, validate_rows};
use tracing::{info, warn};

use crate::stage::Stage;

/// All state of one import, from the uploaded file to the submitted payload.
///
/// Operations belong to a stage. Calling one before its stage is reached is
/// a [`ReconError::StageOrder`]. Calling one that belongs to an earlier
/// stage first discards everything downstream of that stage.
#[derive(Debug)]
pub struct ImportSession {
    stage: Stage,
    table: Option<CsvTable>,
    mapping: MappingState,
    rows: Vec<Row>,
    rows_revision: u64,
    match_fields: MatchFieldSet,
    bulk_action: CsvAction,
    groups: GroupCache,
    csv_resolutions: CsvResolutions,
    survivors: Vec<Row>,
    collapse: CollapseStats,
    validation: Option<ValidationReport>,
    scope_id: Option<String>,
    lookup: Option<LookupOutcome>,
    remote_resolutions: RemoteResolutions,
    finalized: Option<FinalizedImport>,
    delivery_error: Option<String>,
}

impl Default for ImportSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ImportSession {
    /// Empty session. Duplicates are matched on App Name until changed.
    pub fn new() -> Self {
        Self {
            stage: Stage::Upload,
            table: None,
            mapping: MappingState::default(),
            rows: Vec::new(),
            rows_revision: 0,
            match_fields: [CanonicalField::AppName].into_iter().collect(),
            bulk_action: CsvAction::default(),
            groups: GroupCache::new(),
            csv_resolutions: CsvResolutions::new(),
            survivors: Vec::new(),
            collapse: CollapseStats::default(),
            validation: None,
            scope_id: None,
            lookup: None,
            remote_resolutions: RemoteResolutions::new(),
            finalized: None,
            delivery_error: None,
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    // ------------------------------------------------------------------
    // Upload and mapping
    // ------------------------------------------------------------------

    /// Parse CSV text and auto-map its headers.
    pub fn load_csv_str(&mut self, text: &str) -> Result<()> {
        let table = parse_csv_str(text)?;
        self.load_table(table);
        Ok(())
    }

    /// Read a CSV file and auto-map its headers.
    pub fn load_csv_path(&mut self, path: &Path) -> Result<()> {
        let table = read_csv(path)?;
        self.load_table(table);
        Ok(())
    }

    fn load_table(&mut self, table: CsvTable) {
        self.rewind(Stage::Upload);
        info!(
            columns = table.headers.len(),
            rows = table.row_count(),
            "csv loaded"
        );
        self.mapping = MappingState::auto_map(&table.headers);
        self.table = Some(table);
        self.stage = Stage::Map;
    }

    pub fn table(&self) -> Option<&CsvTable> {
        self.table.as_ref()
    }

    pub fn mapping(&self) -> &MappingState {
        &self.mapping
    }

    /// Edit the mapping. Discards rows and everything after them.
    pub fn mapping_mut(&mut self) -> Result<&mut MappingState> {
        self.require(Stage::Map, "mapping_mut")?;
        self.rewind(Stage::Map);
        Ok(&mut self.mapping)
    }

    /// Build rows from the mapping once every required field has a column.
    pub fn confirm_mapping(&mut self) -> Result<&[Row]> {
        self.require(Stage::Map, "confirm_mapping")?;
        self.rewind(Stage::Map);
        self.mapping.ensure_required()?;
        let table = self
            .table
            .as_ref()
            .ok_or_else(|| ReconError::stage_order("confirm_mapping", "no file loaded"))?;
        self.rows = self.mapping.apply(table);
        self.rows_revision += 1;
        self.stage = Stage::Dedupe;
        info!(rows = self.rows.len(), "mapping confirmed");
        Ok(&self.rows)
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    // ------------------------------------------------------------------
    // Intra-file duplicates
    // ------------------------------------------------------------------

    pub fn match_fields(&self) -> &MatchFieldSet {
        &self.match_fields
    }

    pub fn set_match_fields(&mut self, fields: MatchFieldSet) -> Result<()> {
        self.require(Stage::Dedupe, "set_match_fields")?;
        self.rewind(Stage::Dedupe);
        self.match_fields = fields;
        Ok(())
    }

    /// Current duplicate groups. Groups seen for the first time get the
    /// bulk action as their resolution.
    pub fn duplicate_groups(&mut self) -> Result<Vec<DuplicateGroup>> {
        self.require(Stage::Dedupe, "duplicate_groups")?;
        if self.match_fields.is_empty() {
            return Err(DedupeError::NoMatchFields.into());
        }
        Ok(self.current_groups())
    }

    /// Groups for the current inputs; none when no match field is selected.
    fn current_groups(&mut self) -> Vec<DuplicateGroup> {
        let groups = self
            .groups
            .get(
                &self.rows,
                &self.match_fields,
                self.rows_revision,
                self.mapping.revision(),
            )
            .map(<[DuplicateGroup]>::to_vec)
            .unwrap_or_default();
        self.csv_resolutions
            .ensure_defaults(&groups, self.bulk_action);
        groups
    }

    pub fn bulk_action(&self) -> CsvAction {
        self.bulk_action
    }

    pub fn csv_resolutions(&self) -> &CsvResolutions {
        &self.csv_resolutions
    }

    /// Give every group the same action.
    pub fn apply_bulk_action(&mut self, action: CsvAction) -> Result<()> {
        self.enter(Stage::Dedupe, "apply_bulk_action")?;
        self.bulk_action = action;
        let groups = self.current_groups();
        self.csv_resolutions.apply_bulk_action(&groups, action);
        Ok(())
    }

    pub fn set_group_action(&mut self, key: &str, action: CsvAction) -> Result<()> {
        self.enter(Stage::Dedupe, "set_group_action")?;
        let groups = self.current_groups();
        self.csv_resolutions
            .set_group_action(&groups, key, action)?;
        Ok(())
    }

    pub fn select_member(&mut self, key: &str, original_index: usize) -> Result<()> {
        self.enter(Stage::Dedupe, "select_member")?;
        let groups = self.current_groups();
        self.csv_resolutions
            .select_member(&groups, key, original_index)?;
        Ok(())
    }

    pub fn set_merge_field(
        &mut self,
        key: &str,
        field: CanonicalField,
        member_position: usize,
    ) -> Result<()> {
        self.enter(Stage::Dedupe, "set_merge_field")?;
        let groups = self.current_groups();
        self.csv_resolutions
            .set_merge_field(&groups, key, field, member_position)?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Validation
    // ------------------------------------------------------------------

    /// Collapse duplicate groups and validate the survivors.
    pub fn validate(&mut self) -> Result<&ValidationReport> {
        self.enter(Stage::Dedupe, "validate")?;
        let groups = self.current_groups();
        self.survivors = resolve_survivors(&self.rows, &groups, &self.csv_resolutions);
        self.collapse = collapse_stats(&self.rows, &groups, &self.csv_resolutions);
        info!(
            rows = self.rows.len(),
            survivors = self.survivors.len(),
            collapsed = self.collapse.collapsed,
            skipped = self.collapse.skipped,
            "duplicate groups collapsed"
        );
        let report = validate_rows(&self.survivors);
        self.stage = Stage::Validate;
        Ok(self.validation.insert(report))
    }

    pub fn validation(&self) -> Option<&ValidationReport> {
        self.validation.as_ref()
    }

    pub fn survivors(&self) -> &[Row] {
        &self.survivors
    }

    pub fn collapse_stats(&self) -> CollapseStats {
        self.collapse
    }

    /// Fix one field of a surviving row and re-validate it.
    ///
    /// The value is also written to the raw row the survivor took `field`
    /// from, so it is kept when the groups are collapsed again. For a merged
    /// survivor that is the member its merge choice points at. Changing that
    /// merge choice afterwards discards the correction.
    pub fn correct_field(
        &mut self,
        original_index: usize,
        field: CanonicalField,
        value: impl Into<String>,
    ) -> Result<Vec<Issue>> {
        self.enter(Stage::Validate, "correct_field")?;
        let value = value.into();
        let issues =
            recon_validate::correct_field(&mut self.survivors, original_index, field, value.clone())?;
        let source = self.source_row_index(original_index, field);
        if let Some(row) = self
            .rows
            .iter_mut()
            .find(|row| row.original_index == source)
        {
            row.set(field, value);
            self.rows_revision += 1;
        }
        if let Some(report) = self.validation.as_mut() {
            report.record(original_index, issues.clone());
        }
        Ok(issues)
    }

    /// Original index of the raw row a survivor's `field` comes from.
    fn source_row_index(&self, original_index: usize, field: CanonicalField) -> usize {
        self.groups
            .cached()
            .and_then(|groups| {
                groups
                    .iter()
                    .find(|group| group.first() == Some(original_index))
            })
            .and_then(|group| {
                let resolution = self.csv_resolutions.get(&group.key)?;
                if resolution.action != CsvAction::Merge {
                    return None;
                }
                group
                    .members
                    .get(resolution.merge_position(field))
                    .copied()
            })
            .unwrap_or(original_index)
    }

    /// Survivors without validation errors.
    pub fn accepted_rows(&self) -> Vec<Row> {
        match &self.validation {
            Some(report) => report.accepted_rows(&self.survivors),
            None => Vec::new(),
        }
    }

    pub fn rejected_count(&self) -> usize {
        self.validation
            .as_ref()
            .map_or(0, ValidationReport::rejected_count)
    }

    // ------------------------------------------------------------------
    // Remote duplicates
    // ------------------------------------------------------------------

    /// Look up accepted rows in the remote store.
    ///
    /// Without a scope id nothing is queried and every row becomes new.
    /// Choices made for records seen in an earlier lookup are kept.
    pub fn check_remote<S, P>(
        &mut self,
        store: &S,
        scope_id: Option<&str>,
        mode: LookupMode,
        progress: P,
    ) -> Result<&LookupOutcome>
    where
        S: RemoteStore + Sync + ?Sized,
        P: Fn(usize, usize) + Sync,
    {
        self.enter(Stage::Validate, "check_remote")?;
        let accepted = self.accepted_rows();
        let outcome = run_lookups(store, &accepted, scope_id, mode, progress);
        self.remote_resolutions.register(&outcome.matches);
        self.scope_id = scope_id.map(str::to_string);
        self.stage = Stage::Resolve;
        Ok(self.lookup.insert(outcome))
    }

    pub fn scope_id(&self) -> Option<&str> {
        self.scope_id.as_deref()
    }

    pub fn remote_matches(&self) -> &[RemoteMatch] {
        self.lookup
            .as_ref()
            .map_or(&[][..], |outcome| outcome.matches.as_slice())
    }

    pub fn lookup_failures(&self) -> &[LookupFailure] {
        self.lookup
            .as_ref()
            .map_or(&[][..], |outcome| outcome.failures.as_slice())
    }

    pub fn remote_resolutions(&self) -> &RemoteResolutions {
        &self.remote_resolutions
    }

    pub fn set_remote_action(&mut self, record_id: &str, action: RemoteAction) -> Result<()> {
        self.enter(Stage::Resolve, "set_remote_action")?;
        self.remote_resolutions.set_action(record_id, action)?;
        Ok(())
    }

    /// Same action for every matched remote record.
    pub fn set_all_remote_actions(&mut self, action: RemoteAction) -> Result<()> {
        self.enter(Stage::Resolve, "set_all_remote_actions")?;
        self.remote_resolutions.set_all(action);
        Ok(())
    }

    pub fn set_remote_field_source(
        &mut self,
        record_id: &str,
        field: CanonicalField,
        source: FieldSource,
    ) -> Result<()> {
        self.enter(Stage::Resolve, "set_remote_field_source")?;
        self.remote_resolutions
            .set_field_source(record_id, field, source)?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Finalize and submit
    // ------------------------------------------------------------------

    pub fn finalize(&mut self) -> Result<&FinalizedImport> {
        self.enter(Stage::Resolve, "finalize")?;
        let accepted = self.accepted_rows();
        let matches = self
            .lookup
            .as_ref()
            .map_or(&[][..], |outcome| outcome.matches.as_slice());
        let finalized = recon_report::finalize(
            &accepted,
            matches,
            &self.remote_resolutions,
            self.mapping.mapping(),
        );
        self.stage = Stage::Finalize;
        Ok(self.finalized.insert(finalized))
    }

    pub fn finalized(&self) -> Option<&FinalizedImport> {
        self.finalized.as_ref()
    }

    /// Payload for the finalized import.
    pub fn payload(&self, success: bool, message: &str) -> Result<NotificationPayload> {
        let finalized = self
            .finalized
            .as_ref()
            .ok_or_else(|| ReconError::stage_order("payload", "import is not finalized"))?;
        let outcome = import_outcome(
            success,
            message,
            self.rejected_count(),
            self.lookup_failures().len(),
        );
        Ok(build_payload(self.scope_id.as_deref(), finalized, outcome))
    }

    /// Hand the payload to a sink.
    ///
    /// Delivery failure is logged and reported as `false`; the finalized
    /// data is left as is.
    pub fn submit(&mut self, sink: &dyn NotificationSink, message: &str) -> Result<bool> {
        self.require(Stage::Finalize, "submit")?;
        let payload = self.payload(true, message)?;
        match sink.deliver(&payload) {
            Ok(()) => {
                self.delivery_error = None;
                self.stage = Stage::Submitted;
                info!(sink = %sink.name(), "import submitted");
                Ok(true)
            }
            Err(err) => {
                warn!(sink = %sink.name(), error = %err, "notification delivery failed");
                self.delivery_error = Some(err.to_string());
                Ok(false)
            }
        }
    }

    /// Error of the last failed delivery.
    pub fn delivery_error(&self) -> Option<&str> {
        self.delivery_error.as_deref()
    }

    /// Counts gathered so far.
    pub fn counts(&self) -> AnalysisCounts {
        AnalysisCounts {
            parsed_rows: self.table.as_ref().map_or(0, CsvTable::row_count),
            duplicate_groups: self.collapse.groups,
            collapsed_rows: self.collapse.removed(),
            rejected_rows: self.rejected_count(),
            lookup_failures: self.lookup_failures().len(),
            summary: self
                .finalized
                .as_ref()
                .map(|finalized| finalized.summary)
                .unwrap_or_default(),
        }
    }

    // ------------------------------------------------------------------
    // Navigation
    // ------------------------------------------------------------------

    /// Return to an earlier stage, discarding everything after it.
    pub fn go_back(&mut self, stage: Stage) -> Result<()> {
        if stage > self.stage {
            return Err(ReconError::stage_order(
                "go_back",
                format!("cannot move forward from {} to {stage}", self.stage),
            ));
        }
        self.rewind(stage);
        Ok(())
    }

    fn require(&self, stage: Stage, operation: &'static str) -> Result<()> {
        if self.stage < stage {
            return Err(ReconError::stage_order(
                operation,
                format!("session is at {}, needs {stage}", self.stage),
            ));
        }
        Ok(())
    }

    /// Require `stage` and drop everything computed after it.
    fn enter(&mut self, stage: Stage, operation: &'static str) -> Result<()> {
        self.require(stage, operation)?;
        self.rewind(stage);
        Ok(())
    }

    fn rewind(&mut self, stage: Stage) {
        if self.stage <= stage {
            return;
        }
        if stage < Stage::Submitted {
            self.delivery_error = None;
        }
        if stage < Stage::Finalize {
            self.finalized = None;
        }
        if stage < Stage::Resolve {
            self.lookup = None;
            self.scope_id = None;
        }
        if stage < Stage::Validate {
            self.survivors.clear();
            self.collapse = CollapseStats::default();
            self.validation = None;
            self.remote_resolutions.clear();
        }
        if stage < Stage::Dedupe {
            self.rows.clear();
            self.rows_revision += 1;
            self.groups.invalidate();
            self.csv_resolutions.clear();
        }
        if stage < Stage::Map {
            self.table = None;
            self.mapping = MappingState::default();
        }
        self.stage = stage;
    }
}
