//! Classification result types.

use serde::Serialize;

/// Why an artifact stays attached to the deployment.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "type", content = "detail")]
pub enum KeepReason {
    /// Type tag is not in the allow-list at all.
    #[serde(rename = "NOT_ALLOW_LISTED")]
    NotAllowListed,

    /// Type tag equals an allow-listed tag ignoring ASCII case.
    #[serde(rename = "CASE_MISMATCH")]
    CaseMismatch { allowed: String },

    /// Type tag equals an allow-listed tag once surrounding whitespace is removed.
    #[serde(rename = "SURROUNDING_WHITESPACE")]
    SurroundingWhitespace { allowed: String },
}

impl KeepReason {
    /// Machine-readable code.
    pub fn to_code(&self) -> String {
        match self {
            KeepReason::NotAllowListed => "NOT_ALLOW_LISTED".to_string(),
            KeepReason::CaseMismatch { allowed } => format!("CASE_MISMATCH:{}", allowed),
            KeepReason::SurroundingWhitespace { allowed } => {
                format!("SURROUNDING_WHITESPACE:{}", allowed)
            }
        }
    }
}

/// Decision for one type tag.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "decision", rename_all = "lowercase")]
pub enum Decision {
    Detach { type_tag: String },
    Keep { type_tag: String, reason: KeepReason },
}

impl Decision {
    pub fn is_detach(&self) -> bool {
        matches!(self, Decision::Detach { .. })
    }

    pub fn type_tag(&self) -> &str {
        match self {
            Decision::Detach { type_tag } | Decision::Keep { type_tag, .. } => type_tag,
        }
    }

    /// Keep reason, `None` for detached artifacts.
    pub fn reason(&self) -> Option<&KeepReason> {
        match self {
            Decision::Detach { .. } => None,
            Decision::Keep { reason, .. } => Some(reason),
        }
    }
}

/// Partition of a list of items into detached and kept views.
///
/// Both views borrow from the classified slice and keep its order;
/// `decisions` holds one entry per input item, in input order.
#[derive(Debug)]
pub struct Classification<'a, T> {
    pub detached: Vec<&'a T>,
    pub kept: Vec<&'a T>,
    pub decisions: Vec<Decision>,
}

impl<T> Default for Classification<'_, T> {
    fn default() -> Self {
        Self {
            detached: Vec::new(),
            kept: Vec::new(),
            decisions: Vec::new(),
        }
    }
}

impl<T> Classification<'_, T> {
    /// True when nothing is detached.
    pub fn is_empty(&self) -> bool {
        self.detached.is_empty()
    }
}
