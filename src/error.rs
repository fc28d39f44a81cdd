use thiserror::Error;

use crate::data::source::SourceFormat;

/// Why a player sheet could not be loaded.
///
/// Filtering and classification never fail; every error the dashboard can
/// show originates here, from the fetch or the parse of the source.
#[derive(Error, Debug)]
pub enum LoadError {
    /// Transport failure, timeout, non-success status, or an unreadable local file.
    #[error("could not fetch {source_ref}: {reason}")]
    Network { source_ref: String, reason: String },

    /// The source answered with something that is not a sheet (usually an
    /// HTML sign-in page served in place of a private sheet).
    #[error("{source_ref} returned {content_type} instead of a spreadsheet; is the sheet shared publicly?")]
    Format {
        source_ref: String,
        content_type: String,
    },

    /// The bytes do not decode as the declared format.
    #[error("could not parse {format} data: {reason}")]
    Parse { format: SourceFormat, reason: String },
}

impl LoadError {
    pub(crate) fn network(source_ref: &str, reason: impl ToString) -> Self {
        LoadError::Network {
            source_ref: source_ref.to_string(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn parse(format: SourceFormat, reason: impl ToString) -> Self {
        LoadError::Parse {
            format,
            reason: reason.to_string(),
        }
    }
}
