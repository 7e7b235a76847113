//! CLI subcommands.

pub mod admin;
pub mod books;
pub mod checkout;
pub mod orders;

use std::path::PathBuf;

use paperback_core::PriceError;
use paperback_storefront::StorefrontError;
use thiserror::Error;

/// Errors that can end a CLI command.
#[derive(Debug, Error)]
pub enum CliError {
    /// Storefront operation failed.
    #[error(transparent)]
    Storefront(#[from] StorefrontError),

    /// Input file could not be read.
    #[error("Could not read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Input file is not valid YAML for the expected shape.
    #[error("Invalid form file: {0}")]
    Form(#[from] serde_yaml::Error),

    /// A price argument does not parse.
    #[error(transparent)]
    Price(#[from] PriceError),

    /// No password on the command line or in the environment.
    #[error("No password given; pass --password or set PAPERBACK_ADMIN_PASSWORD")]
    MissingPassword,
}

macro_rules! via_storefront {
    ($($source:ty),+ $(,)?) => {
        $(
            impl From<$source> for CliError {
                fn from(err: $source) -> Self {
                    Self::Storefront(err.into())
                }
            }
        )+
    };
}

via_storefront!(
    paperback_storefront::ApiError,
    paperback_storefront::AuthError,
    paperback_storefront::SubmitError,
    paperback_core::EmailError,
    paperback_core::ValidationErrors,
);

/// Log the failure and show the user-facing notice.
#[allow(clippy::print_stderr)]
pub fn report(err: &CliError) {
    match err {
        CliError::Storefront(e) => {
            e.report();
            eprintln!("{}", e.notice());
            if let StorefrontError::Validation(errors) = e {
                for (field, message) in errors.iter() {
                    eprintln!("  {field}: {message}");
                }
            }
        }
        other => {
            tracing::error!("Command failed: {other}");
            eprintln!("{other}");
        }
    }
}
