use crate::{ContentKey, LiteralKind};

/// Contract violations in generated constant tables.
///
/// Every variant means the upstream compiler emitted inconsistent data, so
/// none of them is recoverable at runtime; callers route them through
/// [`fatal`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ConstError {
    #[error("{kind} constant {key} referenced before registration")]
    UnresolvedRef { kind: LiteralKind, key: ContentKey },
    #[error("conflicting content registered for {kind} constant {key}")]
    KeyCollision { kind: LiteralKind, key: ContentKey },
    #[error("cyclic reference while materializing {kind} constant {key}")]
    CyclicRef { kind: LiteralKind, key: ContentKey },
}

/// Abort with a diagnostic naming the offending constant.
pub fn fatal(err: ConstError) -> ! {
    panic!("generated constant tables are corrupt: {err}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_kind_and_key() {
        let err = ConstError::UnresolvedRef {
            kind: LiteralKind::Text,
            key: ContentKey::from_raw(0xabcd),
        };
        assert_eq!(
            err.to_string(),
            "text constant 000000000000abcd referenced before registration"
        );
    }

    #[test]
    #[should_panic(expected = "cyclic reference while materializing array constant")]
    fn fatal_panics_with_diagnostic() {
        fatal(ConstError::CyclicRef {
            kind: LiteralKind::Array,
            key: ContentKey::from_raw(1),
        });
    }
}
