//! CLI-level errors (wraps infrastructure errors)

use thiserror::Error;

use crate::application::ApplicationError;
use crate::domain::DomainError;
use crate::infrastructure::InfraError;

/// CLI errors are the top-level error type.
/// These are what get displayed to the user.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Infra(#[from] InfraError),

    #[error("{0}")]
    Usage(String),
}

impl From<ApplicationError> for CliError {
    fn from(e: ApplicationError) -> Self {
        CliError::Infra(InfraError::Application(e))
    }
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

impl CliError {
    /// Get the appropriate exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Usage(_) => crate::exitcode::USAGE,
            CliError::Infra(e) => match e {
                InfraError::Io { .. } => crate::exitcode::IOERR,
                InfraError::Application(e) => application_exit_code(e),
            },
        }
    }
}

fn application_exit_code(e: &ApplicationError) -> i32 {
    match e {
        ApplicationError::Config { .. } => crate::exitcode::CONFIG,
        ApplicationError::Domain(DomainError::MalformedDocument { .. }) => crate::exitcode::DATAERR,
        ApplicationError::Domain(
            DomainError::DuplicateLeaf(_) | DomainError::InvalidText { .. } | DomainError::NotALeaf,
        ) => crate::exitcode::DATAERR,
        ApplicationError::Domain(DomainError::NoSuchSubject(_) | DomainError::NoDefinition(_)) => {
            crate::exitcode::NOINPUT
        }
        ApplicationError::Domain(DomainError::AllocationFailure { .. }) => crate::exitcode::SOFTWARE,
        ApplicationError::OperationFailed { source, .. } => match source.downcast_ref::<std::io::Error>() {
            Some(io) if io.kind() == std::io::ErrorKind::NotFound => crate::exitcode::NOINPUT,
            Some(io) if io.kind() == std::io::ErrorKind::InvalidData => crate::exitcode::DATAERR,
            Some(_) => crate::exitcode::IOERR,
            None => crate::exitcode::SOFTWARE,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn io_failure(kind: std::io::ErrorKind) -> CliError {
        ApplicationError::OperationFailed {
            context: "read knowledge base: kb.txt".to_string(),
            source: Box::new(std::io::Error::new(kind, "boom")),
        }
        .into()
    }

    #[rstest]
    #[case(io_failure(std::io::ErrorKind::NotFound), crate::exitcode::NOINPUT)]
    #[case(io_failure(std::io::ErrorKind::InvalidData), crate::exitcode::DATAERR)]
    #[case(io_failure(std::io::ErrorKind::PermissionDenied), crate::exitcode::IOERR)]
    #[case(CliError::Usage("no".into()), crate::exitcode::USAGE)]
    #[case(
        ApplicationError::from(DomainError::malformed(3, "expected '('")).into(),
        crate::exitcode::DATAERR
    )]
    #[case(
        ApplicationError::Config { message: "bad".into() }.into(),
        crate::exitcode::CONFIG
    )]
    #[case(
        ApplicationError::from(DomainError::DuplicateLeaf("cat".into())).into(),
        crate::exitcode::DATAERR
    )]
    #[case(
        ApplicationError::from(DomainError::NotALeaf).into(),
        crate::exitcode::DATAERR
    )]
    #[case(
        ApplicationError::from(DomainError::InvalidText {
            text: "\"cat\"".into(),
            reason: "double quotes cannot be stored".into(),
        })
        .into(),
        crate::exitcode::DATAERR
    )]
    #[case(
        ApplicationError::from(DomainError::NoSuchSubject("cat".into())).into(),
        crate::exitcode::NOINPUT
    )]
    #[case(
        ApplicationError::from(DomainError::NoDefinition("void".into())).into(),
        crate::exitcode::NOINPUT
    )]
    #[case(
        ApplicationError::from(DomainError::AllocationFailure { requested: 64 }).into(),
        crate::exitcode::SOFTWARE
    )]
    fn given_error_when_mapping_then_uses_sysexits_code(#[case] error: CliError, #[case] expected: i32) {
        assert_eq!(error.exit_code(), expected);
    }
}
