use std::fmt;

/// Machine-readable error codes shared by the library and the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    NotSignedIn,
    NameTooShort,
    ConfigParseError,
    UnknownScreen,
    EmptyValueSet,
    DuplicateValue,
    InvalidDeck,
    StoreReadFailed,
    StoreWriteFailed,
    LockContention,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::NotSignedIn => "E1001",
            Self::NameTooShort => "E1002",
            Self::ConfigParseError => "E1003",
            Self::UnknownScreen => "E2001",
            Self::EmptyValueSet => "E2002",
            Self::DuplicateValue => "E2003",
            Self::InvalidDeck => "E2004",
            Self::StoreReadFailed => "E5001",
            Self::StoreWriteFailed => "E5002",
            Self::LockContention => "E5003",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::NotSignedIn => "No player signed in",
            Self::NameTooShort => "Player name too short",
            Self::ConfigParseError => "Config file parse error",
            Self::UnknownScreen => "Unknown screen",
            Self::EmptyValueSet => "Round has no values",
            Self::DuplicateValue => "Round has duplicate values",
            Self::InvalidDeck => "Invalid deck definition",
            Self::StoreReadFailed => "Profile store read failed",
            Self::StoreWriteFailed => "Profile store write failed",
            Self::LockContention => "Lock contention",
        }
    }

    /// Optional remediation hint.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::NotSignedIn => Some("Run `matchup login <name>` first."),
            Self::NameTooShort => Some("Use a name with at least 3 letters."),
            Self::ConfigParseError => Some("Fix syntax in matchup/config.toml and retry."),
            Self::UnknownScreen => Some("Run `matchup screens` to list available screens."),
            Self::EmptyValueSet | Self::DuplicateValue => None,
            Self::InvalidDeck => {
                Some("Give every [[screens]] pair two non-empty labels and unique keys.")
            }
            Self::StoreReadFailed => Some("Delete the profile file to start fresh."),
            Self::StoreWriteFailed => Some("Check disk space and write permissions."),
            Self::LockContention => Some("Retry after the other `matchup` process exits."),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::ErrorCode;
    use std::collections::HashSet;

    const ALL: [ErrorCode; 10] = [
        ErrorCode::NotSignedIn,
        ErrorCode::NameTooShort,
        ErrorCode::ConfigParseError,
        ErrorCode::UnknownScreen,
        ErrorCode::EmptyValueSet,
        ErrorCode::DuplicateValue,
        ErrorCode::InvalidDeck,
        ErrorCode::StoreReadFailed,
        ErrorCode::StoreWriteFailed,
        ErrorCode::LockContention,
    ];

    #[test]
    fn all_codes_are_unique() {
        let mut seen = HashSet::new();
        for code in ALL {
            assert!(seen.insert(code.code()), "duplicate code {}", code.code());
        }
    }

    #[test]
    fn code_format_is_machine_friendly() {
        for code in ALL {
            let code = code.code();
            assert_eq!(code.len(), 5);
            assert!(code.starts_with('E'));
            assert!(code.chars().skip(1).all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn display_is_the_code() {
        assert_eq!(ErrorCode::UnknownScreen.to_string(), "E2001");
    }
}
