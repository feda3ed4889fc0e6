use std::fmt;

#[derive(Debug)]
pub enum DetectError {
    /// Snapshot file could not be read from disk
    SnapshotRead { path: String, source: std::io::Error },

    /// Snapshot JSON failed to parse (from file or serde)
    SnapshotParse { context: String, source: serde_json::Error },

    /// Snapshot had an unexpected shape (missing dom root, bad url)
    SnapshotStructure(String),

    /// A candidate index requested by the caller does not exist
    CandidateIndex { index: usize, count: usize },

    /// Outbound message could not be serialized
    MessageSerialize { context: String, source: serde_json::Error },
}

impl fmt::Display for DetectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DetectError::SnapshotRead { path, source } => {
                write!(f, "Failed to read snapshot '{}': {}", path, source)
            }
            DetectError::SnapshotParse { context, source } => {
                write!(f, "Snapshot parse error ({}): {}", context, source)
            }
            DetectError::SnapshotStructure(msg) => {
                write!(f, "Unexpected snapshot structure: {}", msg)
            }
            DetectError::CandidateIndex { index, count } => {
                write!(f, "Candidate {} out of range ({} candidates)", index, count)
            }
            DetectError::MessageSerialize { context, source } => {
                write!(f, "Message serialize error ({}): {}", context, source)
            }
        }
    }
}

impl std::error::Error for DetectError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DetectError::SnapshotRead { source, .. } => Some(source),
            DetectError::SnapshotParse { source, .. } => Some(source),
            DetectError::MessageSerialize { source, .. } => Some(source),
            _ => None,
        }
    }
}
