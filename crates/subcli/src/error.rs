use thiserror::Error as ThisError;

/// Errors produced while parsing and dispatching a single invocation.
#[derive(Debug, ThisError)]
pub enum Error {
    /// A flag token whose first character after the hyphens is not a letter.
    #[error("Flag '{0}' is syntactically incorrect.")]
    FlagSyntax(String),

    /// An unrecognized flag under the strict policy.
    #[error("Flag '{0}' is undefined.")]
    UndefinedFlag(String),

    /// An argument-taking flag with no value after it.
    #[error("Flag '{0}' requires an argument.")]
    RequiresArg(String),

    /// The first positional token names no registered command.
    #[error("unknown command '{name}'")]
    CommandNotFound {
        name: String,
        suggestions: Vec<String>,
    },

    /// The renderer has no usage text for a topic.
    #[error("usage topic '{0}' not found")]
    UsageNotFound(String),

    /// Returned by handlers to have the dispatcher print the command usage.
    ///
    /// The dispatcher rewrites it to [`Error::ExitFailure`] once the usage
    /// has been written.
    #[error("cli: usage")]
    Usage,

    /// Exit with failure status. Everything worth saying has already been
    /// written to the output streams.
    #[error("exit failure")]
    ExitFailure,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    /// Whether the dispatcher already wrote a message for this error.
    pub fn is_reported(&self) -> bool {
        matches!(self, Self::ExitFailure | Self::CommandNotFound { .. })
    }

    /// Whether the error was caused by what the user typed rather than by
    /// the command itself.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::FlagSyntax(_)
                | Self::UndefinedFlag(_)
                | Self::RequiresArg(_)
                | Self::CommandNotFound { .. }
                | Self::Usage
        )
    }

    /// Process exit status used by the default resolver.
    pub fn exit_status(&self) -> u8 {
        if self.is_user_error() { 2 } else { 1 }
    }
}

/// Programmer errors detected while the application is being set up.
///
/// These are configuration defects, not runtime conditions. There is no
/// conversion into [`Error`], so a setup failure cannot travel through the
/// dispatch path by accident.
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub enum SetupError {
    #[error("flag '{0}' is defined more than once in the same scope")]
    DuplicateFlag(String),

    #[error("command name or alias '{0}' is already registered")]
    DuplicateCommand(String),

    #[error("invalid name '{0}': names must start with a letter")]
    InvalidName(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
