use crate::types::{CHANNEL_SEPARATOR, PubSubError, Result};

/// Physical channel name: the logical name followed by its addressing
/// segments, joined with `:`.
///
/// Realtime and REST callers both go through this function, which keeps the
/// names they address identical.
pub fn physical_channel_name<S: AsRef<str>>(logical: &str, segments: &[S]) -> String {
    let mut name = String::from(logical);
    for segment in segments {
        name.push_str(CHANNEL_SEPARATOR);
        name.push_str(segment.as_ref());
    }
    name
}

/// Logical channel names must be non-empty and free of the separator, so a
/// physical name always starts with exactly one logical name.
pub(crate) fn validate_logical_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(PubSubError::Schema("channel name must not be empty".to_string()));
    }
    if name.contains(CHANNEL_SEPARATOR) {
        return Err(PubSubError::Schema(format!(
            "channel name '{}' must not contain '{}'",
            name, CHANNEL_SEPARATOR
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_with_segments() {
        assert_eq!(physical_channel_name("chat", &["c1"]), "chat:c1");
        assert_eq!(physical_channel_name("dm", &["u1", "u2"]), "dm:u1:u2");
    }

    #[test]
    fn test_no_segments_is_bare_name() {
        let empty: [&str; 0] = [];
        assert_eq!(physical_channel_name("lobby", &empty), "lobby");
    }

    #[test]
    fn test_empty_segments_are_kept() {
        assert_eq!(physical_channel_name("chat", &[""]), "chat:");
    }

    #[test]
    fn test_logical_name_validation() {
        assert!(validate_logical_name("chat").is_ok());
        assert!(matches!(validate_logical_name(""), Err(PubSubError::Schema(_))));
        assert!(matches!(validate_logical_name("chat:x"), Err(PubSubError::Schema(_))));
    }
}
