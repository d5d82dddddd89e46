//! Title derivation from the passenger name

use crate::error::TransformResult;
use regex::Regex;

const TITLE_PATTERN: &str =
    r"\b(Mrs|Mr|Miss|Master|Dr|Rev|Don|Mlle|Col|Capt|Countess|Jonkheer|Mme|Ms|Major)\b";

/// Extracts the honorific from a free-text name
#[derive(Debug, Clone)]
pub struct TitleExtractor {
    pattern: Regex,
}

impl TitleExtractor {
    pub fn new() -> TransformResult<Self> {
        Ok(Self {
            pattern: Regex::new(TITLE_PATTERN)?,
        })
    }

    /// First recognised title in `name`, if any
    pub fn extract(&self, name: &str) -> Option<String> {
        self.pattern.find(name).map(|m| m.as_str().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_common_titles() {
        let titles = TitleExtractor::new().unwrap();
        assert_eq!(titles.extract("Braund, Mr. Owen Harris").as_deref(), Some("Mr"));
        assert_eq!(
            titles.extract("Cumings, Mrs. John Bradley").as_deref(),
            Some("Mrs")
        );
        assert_eq!(titles.extract("Heikkinen, Miss. Laina").as_deref(), Some("Miss"));
        assert_eq!(
            titles.extract("Palsson, Master. Gosta Leonard").as_deref(),
            Some("Master")
        );
    }

    #[test]
    fn test_extract_rare_titles() {
        let titles = TitleExtractor::new().unwrap();
        assert_eq!(
            titles
                .extract("Rothes, the Countess. of (Lucy Noel Martha Dyer-Edwards)")
                .as_deref(),
            Some("Countess")
        );
        assert_eq!(
            titles.extract("Reuchlin, Jonkheer. John George").as_deref(),
            Some("Jonkheer")
        );
    }

    #[test]
    fn test_extract_requires_word_boundary() {
        let titles = TitleExtractor::new().unwrap();
        // "Mrsomething" and "Drake" must not match
        assert_eq!(titles.extract("Mrsomething Drake"), None);
        assert_eq!(titles.extract(""), None);
    }

    #[test]
    fn test_extract_takes_first_match() {
        let titles = TitleExtractor::new().unwrap();
        assert_eq!(titles.extract("Dr. Rev Smith").as_deref(), Some("Dr"));
    }
}
