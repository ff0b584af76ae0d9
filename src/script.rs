use regex::Regex;
use std::sync::LazyLock;

static SCRIPT_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"for\s+(\S+)").expect("script pattern compiles"));

/// Pulls the instrument label out of a narration such as
/// "MTM update for RELIANCE on settlement". Only the first "for <token>"
/// counts; anything that doesn't match yields `None`.
pub fn extract_script(narration: Option<&str>) -> Option<String> {
    let text = narration?;
    SCRIPT_PATTERN
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_token_after_for() {
        assert_eq!(
            extract_script(Some("MTM update for RELIANCE on settlement")),
            Some("RELIANCE".to_string())
        );
        assert_eq!(
            extract_script(Some("Brokerage for NIFTY24JANFUT")),
            Some("NIFTY24JANFUT".to_string())
        );
    }

    #[test]
    fn test_first_occurrence_wins() {
        assert_eq!(
            extract_script(Some("MTM for TCS adjusted for INFY")),
            Some("TCS".to_string())
        );
    }

    #[test]
    fn test_no_match_is_none() {
        assert_eq!(extract_script(Some("General adjustment")), None);
        assert_eq!(extract_script(Some("paid for")), None);
        assert_eq!(extract_script(Some("")), None);
        assert_eq!(extract_script(None), None);
    }

    #[test]
    fn test_is_case_sensitive_and_deterministic() {
        assert_eq!(extract_script(Some("MTM FOR TCS")), None);
        let narration = Some("Bill for  SBIN\tsettled");
        assert_eq!(extract_script(narration), extract_script(narration));
        assert_eq!(extract_script(narration), Some("SBIN".to_string()));
    }
}
