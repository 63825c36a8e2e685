use std::fmt;

/// Pipeline stage, in order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stage {
    /// Nothing loaded yet.
    #[default]
    Upload,
    /// File parsed; columns are being mapped.
    Map,
    /// Rows built; duplicate groups within the file are being resolved.
    Dedupe,
    /// Groups collapsed; survivors validated and open to correction.
    Validate,
    /// Remote lookup done; remote duplicates are being resolved.
    Resolve,
    /// Final record set built.
    Finalize,
    /// Payload handed to a sink.
    Submitted,
}

impl Stage {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Upload => "upload",
            Self::Map => "map",
            Self::Dedupe => "dedupe",
            Self::Validate => "validate",
            Self::Resolve => "resolve",
            Self::Finalize => "finalize",
            Self::Submitted => "submitted",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
