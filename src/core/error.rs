use thiserror::Error;

/// Root cause attached to every error the geometry core raises.
///
/// Public operations return [`anyhow::Result`]; callers that need to branch on the failure
/// class can `downcast_ref::<GeomError>()`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeomError {
    /// Malformed input: a fixed-size array of the wrong length, a binding point out of range,
    /// a vertex payload larger than a buffer can hold.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// An operation that needs prior initialisation was called before it happened, e.g.
    /// rotating a shape with no vertices.
    #[error("illegal state: {0}")]
    IllegalState(String),
}

impl GeomError {
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }
    pub fn illegal_state(msg: impl Into<String>) -> Self {
        Self::IllegalState(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    fn fails() -> Result<()> {
        Err(GeomError::illegal_state("no vertices"))?;
        Ok(())
    }

    #[test]
    fn survives_anyhow_round_trip() {
        let err = fails().unwrap_err();
        assert_eq!(err.to_string(), "illegal state: no vertices");
        assert_eq!(
            err.downcast_ref::<GeomError>(),
            Some(&GeomError::IllegalState("no vertices".to_string()))
        );
    }
}
