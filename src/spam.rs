//! Anti-spam gate for public forms
//!
//! Public forms carry a decoy field that is hidden from people and left
//! empty by them. Bots that fill every input give themselves away.

/// Whether the decoy field was filled in.
///
/// Any non-empty value trips the gate, whitespace included.
pub fn is_tripped(honeypot: Option<&str>) -> bool {
    honeypot.map_or(false, |value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_or_empty_passes() {
        assert!(!is_tripped(None));
        assert!(!is_tripped(Some("")));
    }

    #[test]
    fn test_any_value_trips() {
        assert!(is_tripped(Some("http://spam.example")));
        assert!(is_tripped(Some(" ")));
    }
}
