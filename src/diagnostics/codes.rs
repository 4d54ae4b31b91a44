//! The stable `RCLnnn` code space.
//!
//! Codes are never renumbered. The numeric band of a code determines its
//! category, so a bare code string is enough to recover the category.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    Syntax,
    Semantic,
    Reference,
    Type,
    Validation,
    IO,
    Internal,
}

impl Category {
    /// Maps a code number to its band.
    pub const fn from_number(number: u16) -> Option<Category> {
        match number {
            1..=99 => Some(Category::Syntax),
            101..=199 => Some(Category::Semantic),
            201..=299 => Some(Category::Reference),
            301..=399 => Some(Category::Type),
            401..=499 => Some(Category::Validation),
            501..=599 => Some(Category::IO),
            901..=999 => Some(Category::Internal),
            _ => None,
        }
    }

    /// Recovers the category from a code string such as `"RCL201"`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use rcl_compiler::diagnostics::Category;
    /// assert_eq!(Category::from_code("RCL201"), Some(Category::Reference));
    /// assert_eq!(Category::from_code("RCL950"), Some(Category::Internal));
    /// assert_eq!(Category::from_code("E42"), None);
    /// ```
    pub fn from_code(code: &str) -> Option<Category> {
        let number = code.strip_prefix("RCL")?.parse::<u16>().ok()?;
        Self::from_number(number)
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Category::Syntax => "Syntax",
            Category::Semantic => "Semantic",
            Category::Reference => "Reference",
            Category::Type => "Type",
            Category::Validation => "Validation",
            Category::IO => "IO",
            Category::Internal => "Internal",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

macro_rules! error_codes {
    ($($variant:ident = $number:literal, $code:literal, $name:literal;)*) => {
        /// Every diagnostic code the compiler and its collaborators may emit.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum ErrorCode {
            $(#[serde(rename = $code)] $variant,)*
        }

        impl ErrorCode {
            pub const ALL: &'static [ErrorCode] = &[$(ErrorCode::$variant,)*];

            pub const fn number(&self) -> u16 {
                match self {
                    $(ErrorCode::$variant => $number,)*
                }
            }

            /// The `RCLnnn` token.
            pub const fn as_str(&self) -> &'static str {
                match self {
                    $(ErrorCode::$variant => $code,)*
                }
            }

            /// The SCREAMING_CASE name used in reports.
            pub const fn name(&self) -> &'static str {
                match self {
                    $(ErrorCode::$variant => $name,)*
                }
            }
        }
    };
}

error_codes! {
    // Syntax
    MissingIdentifier = 1, "RCL001", "MISSING_IDENTIFIER";
    InvalidIndentation = 2, "RCL002", "INVALID_INDENTATION";
    UnexpectedToken = 3, "RCL003", "UNEXPECTED_TOKEN";
    MissingColon = 4, "RCL004", "MISSING_COLON";
    InvalidSectionType = 5, "RCL005", "INVALID_SECTION_TYPE";
    MalformedMatchStatement = 6, "RCL006", "MALFORMED_MATCH_STATEMENT";

    // Semantic
    MissingRequiredField = 101, "RCL101", "MISSING_REQUIRED_FIELD";
    DuplicateDefinition = 102, "RCL102", "DUPLICATE_DEFINITION";
    InvalidAgentName = 103, "RCL103", "INVALID_AGENT_NAME";
    MissingDisplayName = 104, "RCL104", "MISSING_DISPLAY_NAME";
    EmptyFlowSection = 105, "RCL105", "EMPTY_FLOW_SECTION";
    MissingFlowStart = 106, "RCL106", "MISSING_FLOW_START";
    EmptyMessagesSection = 107, "RCL107", "EMPTY_MESSAGES_SECTION";

    // Reference
    UndefinedStateReference = 201, "RCL201", "UNDEFINED_STATE_REFERENCE";
    UndefinedMessageReference = 202, "RCL202", "UNDEFINED_MESSAGE_REFERENCE";
    UndefinedFlowReference = 203, "RCL203", "UNDEFINED_FLOW_REFERENCE";
    CircularReference = 204, "RCL204", "CIRCULAR_REFERENCE";

    // Type
    InvalidTypeTag = 301, "RCL301", "INVALID_TYPE_TAG";
    TypeMismatch = 302, "RCL302", "TYPE_MISMATCH";
    InvalidTypeTagValue = 303, "RCL303", "INVALID_TYPE_TAG_VALUE";

    // Validation
    InvalidPropertyName = 401, "RCL401", "INVALID_PROPERTY_NAME";
    ValueOutOfRange = 402, "RCL402", "VALUE_OUT_OF_RANGE";
    InvalidMessageType = 403, "RCL403", "INVALID_MESSAGE_TYPE";
    MalformedMessageContent = 404, "RCL404", "MALFORMED_MESSAGE_CONTENT";
    NamingConvention = 405, "RCL405", "NAMING_CONVENTION";
    DuplicateMatchCase = 406, "RCL406", "DUPLICATE_MATCH_CASE";

    // IO
    FileNotFound = 501, "RCL501", "FILE_NOT_FOUND";
    FileReadError = 502, "RCL502", "FILE_READ_ERROR";

    // Internal
    InternalError = 901, "RCL901", "INTERNAL_ERROR";
    ParserInitializationError = 902, "RCL902", "PARSER_INITIALIZATION_ERROR";
}

impl ErrorCode {
    pub fn category(&self) -> Category {
        // Every declared number sits inside a band; the fallback is unreachable.
        Category::from_number(self.number()).unwrap_or(Category::Internal)
    }

    /// Looks up a code from its `RCLnnn` token.
    pub fn from_code(code: &str) -> Option<ErrorCode> {
        Self::ALL.iter().copied().find(|c| c.as_str() == code)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_code_category_matches_its_prefix() {
        for code in ErrorCode::ALL {
            assert_eq!(
                Category::from_code(code.as_str()),
                Some(code.category()),
                "{} has a category outside its band",
                code.name()
            );
        }
    }

    #[test]
    fn codes_are_unique_and_round_trip() {
        for code in ErrorCode::ALL {
            assert_eq!(ErrorCode::from_code(code.as_str()), Some(*code));
        }
        let mut numbers: Vec<_> = ErrorCode::ALL.iter().map(|c| c.number()).collect();
        numbers.sort_unstable();
        numbers.dedup();
        assert_eq!(numbers.len(), ErrorCode::ALL.len());
    }

    #[test]
    fn code_serializes_as_token() {
        let json = serde_json::to_string(&ErrorCode::UndefinedStateReference).unwrap();
        assert_eq!(json, "\"RCL201\"");
        let back: ErrorCode = serde_json::from_str("\"RCL104\"").unwrap();
        assert_eq!(back, ErrorCode::MissingDisplayName);
    }
}
