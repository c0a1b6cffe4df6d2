// Flag parsing for the expense programs.
//
// The accepted syntax is deliberately small: `--flag value` pairs matched
// exactly and case-sensitively. There is no `--flag=value` form, no short
// flags and no repetition; the first occurrence of a flag wins.

use std::ffi::OsString;
use thiserror::Error;

/// Token that short-circuits every program into printing its help text.
pub const HELP_FLAG: &str = "--help";

/// Raised when one or more required flags have no usable value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Missing required arguments: {}", .missing.join(", "))]
pub struct UsageError {
    pub missing: Vec<String>,
}

/// The raw argument list of one invocation, program name excluded.
#[derive(Debug, Clone, Default)]
pub struct FlagArgs {
    tokens: Vec<String>,
}

impl FlagArgs {
    pub fn new<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        FlagArgs {
            tokens: tokens.into_iter().map(Into::into).collect(),
        }
    }

    /// Build from OS-encoded tokens. Invalid UTF-8 is replaced with U+FFFD
    /// instead of being rejected.
    pub fn from_os<I>(tokens: I) -> Self
    where
        I: IntoIterator<Item = OsString>,
    {
        Self::new(
            tokens
                .into_iter()
                .map(|t| t.to_string_lossy().into_owned()),
        )
    }

    /// Build from the current process arguments, skipping the program name.
    pub fn from_env() -> Self {
        Self::from_os(std::env::args_os().skip(1))
    }

    /// True when a bare `--help` token appears anywhere in the arguments.
    pub fn help_requested(&self) -> bool {
        self.tokens.iter().any(|t| t == HELP_FLAG)
    }

    /// Value following the first occurrence of `flag`.
    ///
    /// Returns `None` when the flag is absent, is the last token, or is
    /// followed by an empty string. The following token is taken as-is, even
    /// when it looks like another flag.
    pub fn value(&self, flag: &str) -> Option<&str> {
        let index = self.tokens.iter().position(|t| t == flag)?;
        self.tokens
            .get(index + 1)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    /// Resolve every flag in `flags`, in order, or report all the missing
    /// ones at once.
    pub fn require(&self, flags: &[&str]) -> Result<Vec<String>, UsageError> {
        let mut values = Vec::with_capacity(flags.len());
        let mut missing = Vec::new();
        for flag in flags {
            match self.value(flag) {
                Some(v) => values.push(v.to_string()),
                None => missing.push(flag.to_string()),
            }
        }
        if missing.is_empty() {
            Ok(values)
        } else {
            Err(UsageError { missing })
        }
    }
}
