use serde::Serialize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PhaseCounts {
    pub teams: usize,
    pub matches: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PhaseErrors {
    pub teams: Option<String>,
    pub matches: Option<String>,
}

/// Outcome of one league refresh.
#[derive(Debug, Clone, Serialize)]
pub struct RefreshSummary {
    pub league_id: String,
    pub season: i32,
    pub counts: PhaseCounts,
    pub errors: PhaseErrors,
}

/// A single payload item that could not be written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemFailure {
    pub external_id: Option<String>,
    pub error: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ProcessFixturesSummary {
    pub teams_added: usize,
    pub teams_existing: usize,
    pub matches_added: usize,
    pub matches_existing: usize,
    pub matches_skipped: usize,
    pub errors: Vec<ItemFailure>,
}
