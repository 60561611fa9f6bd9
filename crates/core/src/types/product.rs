//! Product classification enums.

use serde::{Deserialize, Serialize};

/// Sample tier shown as a badge on product cards.
///
/// Anything the backend doesn't mark as premium is sold as prime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProductTier {
    Premium,
    #[default]
    #[serde(other)]
    Prime,
}

impl ProductTier {
    /// Badge label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Premium => "Premium",
            Self::Prime => "Prime",
        }
    }
}
