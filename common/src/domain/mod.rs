use std::fmt;
use std::sync::LazyLock;

use nutype::nutype;
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod testcase;

pub use testcase::{
    Comparator, ReferenceSolution, RunnerConfig, TestCase, TestFramework, normalize_test_cases,
};

macro_rules! uuid_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(pub Uuid);

        impl $name {
            pub fn generate() -> Self {
                Self(Uuid::new_v4())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl From<Uuid> for $name {
            fn from(value: Uuid) -> Self {
                Self(value)
            }
        }
    };
}

uuid_id!(
    /// Identity of a lab aggregate.
    LabId
);
uuid_id!(
    /// Identity of one content snapshot of a lab.
    VersionId
);
uuid_id!(
    /// Identity of an embed reference inside a workshop document.
    EmbedId
);
uuid_id!(
    /// Owning workshop of a lab.
    WorkshopId
);
uuid_id!(WorkshopDocumentId);
uuid_id!(DocumentGroupId);

/// Actor performing a mutation. Kept opaque; the identity provider lives
/// outside this service.
#[nutype(
    sanitize(trim),
    validate(not_empty),
    derive(
        Clone,
        Debug,
        Display,
        FromStr,
        AsRef,
        PartialEq,
        Eq,
        Hash,
        Serialize,
        Deserialize
    )
)]
pub struct ActorId(String);

// Lowercase words separated by single hyphens, e.g. "two-sum" or "binary-search-1".
pub const SLUG_REGEX: &str = r"^[a-z0-9]+(-[a-z0-9]+)*$";

static SLUG_REGEX_COMPILED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(SLUG_REGEX).expect("SLUG_REGEX must be a valid regex"));

/// Human-readable lab identifier, unique within a workshop.
#[nutype(
    sanitize(trim, lowercase),
    validate(not_empty, len_char_max = 64, regex = SLUG_REGEX_COMPILED),
    derive(
        Clone,
        Debug,
        Display,
        FromStr,
        AsRef,
        PartialEq,
        Eq,
        PartialOrd,
        Ord,
        Hash,
        Serialize,
        Deserialize
    )
)]
pub struct Slug(String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LabStatus {
    Draft,
    Published,
    Archived,
}

impl LabStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LabStatus::Draft => "draft",
            LabStatus::Published => "published",
            LabStatus::Archived => "archived",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "draft" => Some(LabStatus::Draft),
            "published" => Some(LabStatus::Published),
            "archived" => Some(LabStatus::Archived),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Intro,
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Intro => "intro",
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "intro" => Some(Difficulty::Intro),
            "easy" => Some(Difficulty::Easy),
            "medium" => Some(Difficulty::Medium),
            "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }
}

/// Languages the runner infrastructure currently supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LabLanguage {
    Typescript,
    Javascript,
}

impl LabLanguage {
    pub fn as_str(&self) -> &'static str {
        match self {
            LabLanguage::Typescript => "typescript",
            LabLanguage::Javascript => "javascript",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "typescript" => Some(LabLanguage::Typescript),
            "javascript" => Some(LabLanguage::Javascript),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_is_sanitized_and_validated() {
        let slug = Slug::try_new("  Two-Sum ").unwrap();
        assert_eq!(slug.as_ref(), "two-sum");

        assert!(Slug::try_new("two sum").is_err());
        assert!(Slug::try_new("-leading").is_err());
        assert!(Slug::try_new("").is_err());
    }

    #[test]
    fn actor_id_rejects_blank() {
        assert!(ActorId::try_new("   ").is_err());
        assert_eq!(ActorId::try_new(" u1 ").unwrap().as_ref(), "u1");
    }

    #[test]
    fn status_round_trips_through_text() {
        for status in [LabStatus::Draft, LabStatus::Published, LabStatus::Archived] {
            assert_eq!(LabStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(LabStatus::parse("deleted"), None);
    }
}
