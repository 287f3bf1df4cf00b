//! Type definitions for the main application

/// Which set of endpoints a process serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ServeMode {
    /// `filter`, `route`, `log-to-sheet` and `query`.
    #[default]
    Full,
    /// Only `filter`, as the stand-alone filter deployment.
    FilterOnly,
}

impl ServeMode {
    pub fn from_args(args: &[String]) -> Self {
        if args.iter().any(|a| a == "--filter-only") {
            Self::FilterOnly
        } else {
            Self::Full
        }
    }
}
