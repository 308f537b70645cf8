use thiserror::Error;

// ---------------------------------------------------------------------------
// Core analysis errors
// ---------------------------------------------------------------------------

/// Failures of the numeric pipeline and the comparison session.
///
/// Recoverable situations (incomplete cycles, empty skeleton curves, energy
/// that is not applicable) are plain data states, not errors; only malformed
/// input and invariant violations surface here.
#[derive(Debug, Error, PartialEq)]
pub enum AnalysisError {
    /// Fewer than two valid samples survived preprocessing.
    #[error("insufficient data: {valid} valid sample(s) remain, at least 2 required")]
    InsufficientData { valid: usize },

    /// A zero-amplitude cycle reached the stiffness stage. The detector
    /// filters these out, so a well-formed pipeline never returns this.
    #[error("degenerate cycle at samples {start}..={end}: |d_max| + |d_min| is zero")]
    DegenerateCycle { start: usize, end: usize },

    /// `add_case` was called with a label that is already present.
    #[error("duplicate case label: '{0}'")]
    DuplicateLabel(String),

    /// `remove_case` (or a lookup) named a label that is not present.
    #[error("case not found: '{0}'")]
    CaseNotFound(String),

    /// Displacement and force series handed to the pipeline have different
    /// lengths (channel resolution upstream went wrong).
    #[error("channel length mismatch: displacement has {displacement} samples, force has {force}")]
    ChannelMismatch { displacement: usize, force: usize },
}
