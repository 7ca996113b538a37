use super::LayoutError;

/// Register wrapper kinds a layout is expressed in
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AccessKind {
    ReadWrite,
    ReadOnly,
    WriteOnly,
}

impl AccessKind {
    /// Maps an SVD access tag. A register without one usually mixes read-only and
    /// read-write fields, so it gets both operations.
    pub fn parse(register: &str, access: Option<&str>) -> Result<Self, LayoutError> {
        Ok(match access {
            None | Some("read-write") => Self::ReadWrite,
            Some("read-only") => Self::ReadOnly,
            Some("write-only") => Self::WriteOnly,
            Some(other) => {
                return Err(LayoutError::UnsupportedAccess {
                    register: register.to_string(),
                    access: other.to_string(),
                })
            }
        })
    }
}
