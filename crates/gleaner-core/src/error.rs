use crate::ast::AssetKind;

/// Core error type for the gleaner extraction pipeline.
///
/// Every variant is fatal: a malformed shape means the scanned source no
/// longer matches the call signatures this extractor assumes, and partial
/// output would be misleading. Builders abort their whole scan on the first
/// error rather than skipping records.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("unsupported node reached the evaluator: {node}")]
    UnsupportedNode { node: String },

    #[error("unbound variable: {name}")]
    UnboundVariable { name: String },

    #[error("index {index} out of range for {name} (length {len})")]
    IndexOutOfRange {
        name: String,
        index: i64,
        len: usize,
    },

    #[error("unsupported asset kind: {kind:?}")]
    UnsupportedAssetKind { kind: AssetKind },

    #[error("asset resolution requested but no resolver was supplied")]
    MissingAssetResolver,

    #[error("unknown asset: {kind:?} id {id}")]
    UnknownAsset { kind: AssetKind, id: i64 },

    #[error("extended call at position {position} does not correlate: expected id {expected}, found {found}")]
    CorrelationMismatch {
        position: usize,
        expected: i64,
        found: i64,
    },

    #[error("no extended call for record {id} at position {position}")]
    MissingExtendedCall { position: usize, id: i64 },

    #[error("record {id} is missing required field {field}")]
    IncompleteAggregate { id: i64, field: &'static str },

    #[error("call to {call} has {found} arguments, expected {expected}")]
    ArityMismatch {
        call: String,
        expected: usize,
        found: usize,
    },

    #[error("invalid value for {field}: {detail}")]
    InvalidField { field: &'static str, detail: String },

    #[error("division by zero")]
    DivisionByZero,

    #[error("routine not present in dump: {name}")]
    MissingRoutine { name: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}
