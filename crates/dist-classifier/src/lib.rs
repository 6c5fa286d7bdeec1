//! Allow-list classifier for distribution archive artifacts.
//!
//! Decides which build artifacts are distribution archives (source/binary
//! zip and tar.gz packages plus their detached PGP signatures) that must
//! be detached from the build's deployment set. Matching is exact and
//! case-sensitive against a fixed allow-list; there is no prefix,
//! wildcard or case-folded match.

mod result;

pub use result::{Classification, Decision, KeepReason};

/// Artifact type tags that are detached from the deployment.
pub const DETACHED_TYPES: &[&str] = &["zip", "tar.gz", "zip.asc", "tar.gz.asc"];

/// Anything that carries a type tag can be classified.
pub trait TypeTagged {
    fn type_tag(&self) -> &str;
}

impl TypeTagged for str {
    fn type_tag(&self) -> &str {
        self
    }
}

impl TypeTagged for String {
    fn type_tag(&self) -> &str {
        self.as_str()
    }
}

impl<T: TypeTagged + ?Sized> TypeTagged for &T {
    fn type_tag(&self) -> &str {
        (**self).type_tag()
    }
}

/// Returns true when the type tag is an exact allow-list member.
pub fn is_detached_type(type_tag: &str) -> bool {
    DETACHED_TYPES.contains(&type_tag)
}

/// Decide a single type tag, explaining near misses when it is kept.
pub fn decide(type_tag: &str) -> Decision {
    if is_detached_type(type_tag) {
        return Decision::Detach {
            type_tag: type_tag.to_string(),
        };
    }

    let reason = if let Some(allowed) = DETACHED_TYPES
        .iter()
        .find(|t| t.eq_ignore_ascii_case(type_tag))
    {
        KeepReason::CaseMismatch {
            allowed: (*allowed).to_string(),
        }
    } else if let Some(allowed) = DETACHED_TYPES.iter().find(|t| **t == type_tag.trim()) {
        KeepReason::SurroundingWhitespace {
            allowed: (*allowed).to_string(),
        }
    } else {
        KeepReason::NotAllowListed
    };

    Decision::Keep {
        type_tag: type_tag.to_string(),
        reason,
    }
}

/// Partition items into detached and kept, preserving input order in both.
pub fn classify<T: TypeTagged>(items: &[T]) -> Classification<'_, T> {
    let mut classification = Classification::default();

    for item in items {
        let decision = decide(item.type_tag());
        if decision.is_detach() {
            classification.detached.push(item);
        } else {
            classification.kept.push(item);
        }
        classification.decisions.push(decision);
    }

    classification
}
