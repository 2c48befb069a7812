//! Domain error types.
//!
//! These errors represent validation failures in the domain layer: a line
//! that cannot be a line, or a route whose segments do not join up. They
//! are distinct from data-loading errors.

/// Domain-level errors for validation and data consistency.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DomainError {
    /// A railway line needs at least two distinct stations
    #[error("line {line} has fewer than 2 distinct stations")]
    TooFewStations { line: String },

    /// A route must contain at least one segment
    #[error("route must have at least one segment")]
    EmptyRoute,

    /// Consecutive segments don't share a station
    #[error("segment {index} ends at {ends_at} but the next segment starts at {starts_at}")]
    NotContiguous {
        index: usize,
        ends_at: String,
        starts_at: String,
    },

    /// The segments don't start or end where the route claims
    #[error("route endpoint mismatch: expected {expected}, found {found}")]
    EndpointMismatch { expected: String, found: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = DomainError::TooFewStations {
            line: "Test Line".into(),
        };
        assert_eq!(err.to_string(), "line Test Line has fewer than 2 distinct stations");

        let err = DomainError::EmptyRoute;
        assert_eq!(err.to_string(), "route must have at least one segment");

        let err = DomainError::NotContiguous {
            index: 0,
            ends_at: "Reading".into(),
            starts_at: "Didcot Parkway".into(),
        };
        assert_eq!(
            err.to_string(),
            "segment 0 ends at Reading but the next segment starts at Didcot Parkway"
        );

        let err = DomainError::EndpointMismatch {
            expected: "Woking".into(),
            found: "Guildford".into(),
        };
        assert_eq!(
            err.to_string(),
            "route endpoint mismatch: expected Woking, found Guildford"
        );
    }
}
