//! Error type for the analyses.

use thiserror::Error;
use transitdb_core::DaoError;

/// Errors raised while computing frequencies.
#[derive(Debug, Error)]
pub enum FrequencyError {
    /// Reading from the store failed.
    #[error("failed to read {stage} from the store")]
    Store {
        /// What was being read.
        stage: &'static str,
        /// Store error that interrupted the read.
        #[source]
        source: DaoError,
    },
}

impl FrequencyError {
    pub(crate) fn store(stage: &'static str) -> impl FnOnce(DaoError) -> Self {
        move |source| Self::Store { stage, source }
    }
}
