// SPDX-License-Identifier: Unlicense

/// Deepest nesting of parentheses and prefix operators the default grammar
/// accepts before failing with `ParseError::TooDeep`.
pub const DEFAULT_MAX_NESTING: usize = 256;

/// How the lexical bridge treats numeric lexemes that do not convert cleanly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NumericPolicy {
    /// Reject the lexeme with `ParseError::MalformedNumber`.
    #[default]
    Strict,
    /// Convert the longest valid numeric prefix, `0` when there is none.
    /// Integer overflow saturates.
    Permissive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DriverOptions {
    pub numeric_policy: NumericPolicy,
    pub max_nesting: usize,
}

impl DriverOptions {
    pub fn with_numeric_policy(mut self, policy: NumericPolicy) -> Self {
        self.numeric_policy = policy;
        self
    }

    pub fn with_max_nesting(mut self, max_nesting: usize) -> Self {
        self.max_nesting = max_nesting;
        self
    }
}

impl Default for DriverOptions {
    fn default() -> Self {
        Self {
            numeric_policy: NumericPolicy::default(),
            max_nesting: DEFAULT_MAX_NESTING,
        }
    }
}
