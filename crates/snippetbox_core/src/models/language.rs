//! The fixed set of programming languages a snippet may declare.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

macro_rules! programming_languages {
    ($($variant:ident => $wire:literal),+ $(,)?) => {
        /// Programming language of a snippet, serialized by its wire name.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum ProgrammingLanguage {
            $(
                #[serde(rename = $wire)]
                $variant,
            )+
        }

        impl ProgrammingLanguage {
            /// Every supported language, in declaration order.
            pub const ALL: &'static [ProgrammingLanguage] = &[$(ProgrammingLanguage::$variant),+];

            /// Wire name used in requests, responses, and query filters.
            pub fn as_str(self) -> &'static str {
                match self {
                    $(ProgrammingLanguage::$variant => $wire,)+
                }
            }
        }
    };
}

programming_languages! {
    Javascript => "javascript",
    Python => "python",
    Java => "java",
    Csharp => "csharp",
    Php => "php",
    Ruby => "ruby",
    Html => "html",
    Css => "css",
    Sql => "sql",
    Bash => "bash",
    Typescript => "typescript",
    Swift => "swift",
    Go => "go",
    Kotlin => "kotlin",
    Rust => "rust",
    Dart => "dart",
    Scala => "scala",
    Elixir => "elixir",
    Haskell => "haskell",
    Clojure => "clojure",
    Groovy => "groovy",
    Lua => "lua",
    Perl => "perl",
    R => "r",
    ObjectiveC => "objective-c",
    Assembly => "assembly",
    Matlab => "matlab",
    Powershell => "powershell",
    VisualBasic => "visual-basic",
    Fortran => "fortran",
    Cobol => "cobol",
    Pascal => "pascal",
    FSharp => "f#",
    Julia => "julia",
}

/// Returned when a language name is not in the supported set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownLanguage(pub String);

impl fmt::Display for UnknownLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unsupported programming language '{}'", self.0)
    }
}

impl std::error::Error for UnknownLanguage {}

impl FromStr for ProgrammingLanguage {
    type Err = UnknownLanguage;

    /// Parse a wire name. Matching ignores case and surrounding whitespace.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|language| language.as_str() == normalized)
            .ok_or_else(|| UnknownLanguage(value.trim().to_string()))
    }
}

impl fmt::Display for ProgrammingLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
