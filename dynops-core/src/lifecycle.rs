use core::fmt;

/// Trust tag attached to every [`DataResult`](crate::DataResult).
///
/// Lifecycles combine conservatively: once an operation touches an
/// experimental or deprecated codec, the combined result can never be
/// reported as more trusted than that.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Lifecycle {
    /// Fully supported.
    #[default]
    Stable,
    /// Subject to change without notice.
    Experimental,
    /// Scheduled for removal.
    Deprecated {
        /// Data version this lifecycle was deprecated in.
        since: u32,
    },
}

impl Lifecycle {
    /// The stable lifecycle.
    pub const fn stable() -> Self {
        Lifecycle::Stable
    }

    /// The experimental lifecycle.
    pub const fn experimental() -> Self {
        Lifecycle::Experimental
    }

    /// A lifecycle deprecated since the given data version.
    pub const fn deprecated(since: u32) -> Self {
        Lifecycle::Deprecated { since }
    }

    /// Combine two lifecycles, keeping the least trusted one.
    ///
    /// Experimental dominates everything. Between two deprecations the
    /// earlier `since` wins.
    pub fn add(self, other: Lifecycle) -> Lifecycle {
        match (self, other) {
            (Lifecycle::Experimental, _) | (_, Lifecycle::Experimental) => Lifecycle::Experimental,
            (Lifecycle::Deprecated { since: a }, Lifecycle::Deprecated { since: b }) => {
                Lifecycle::Deprecated { since: a.min(b) }
            }
            (deprecated @ Lifecycle::Deprecated { .. }, Lifecycle::Stable)
            | (Lifecycle::Stable, deprecated @ Lifecycle::Deprecated { .. }) => deprecated,
            (Lifecycle::Stable, Lifecycle::Stable) => Lifecycle::Stable,
        }
    }

    /// Returns `true` for [`Lifecycle::Stable`].
    pub fn is_stable(&self) -> bool {
        matches!(self, Lifecycle::Stable)
    }

    /// Returns `true` for [`Lifecycle::Experimental`].
    pub fn is_experimental(&self) -> bool {
        matches!(self, Lifecycle::Experimental)
    }

    /// Returns `true` for [`Lifecycle::Deprecated`].
    pub fn is_deprecated(&self) -> bool {
        matches!(self, Lifecycle::Deprecated { .. })
    }
}

impl fmt::Display for Lifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Lifecycle::Stable => f.write_str("stable"),
            Lifecycle::Experimental => f.write_str("experimental"),
            Lifecycle::Deprecated { since } => write!(f, "deprecated since {since}"),
        }
    }
}
