//! Offline rule-based checker.
//!
//! A handful of high-confidence regex rules for common Korean misspellings.
//! Used as the last resort when every remote service is down, and as a
//! deterministic provider in tests.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::check::{char_offset, CheckError, CheckProvider, Finding};

struct Rule {
    pattern: Regex,
    /// Replacement template applied to the matched text (`$1` etc.).
    replacement: &'static str,
    help: &'static str,
    category: &'static str,
}

static RULES: Lazy<Vec<Rule>> = Lazy::new(|| {
    let rule = |pattern: &str, replacement, help, category| Rule {
        pattern: Regex::new(pattern).expect("valid rule pattern"),
        replacement,
        help,
        category,
    };
    vec![
        rule(r"되요\b", "돼요", "'되다'의 활용형은 '돼요'입니다", "TYPO"),
        rule(
            r"(갈|할|올|먹을)께요\b",
            "${1}게요",
            "'-ㄹ게요'가 올바른 표현입니다",
            "TYPO",
        ),
        rule(r"\b왠만하면\b", "웬만하면", "'웬만하면'이 맞습니다", "TYPO"),
        rule(r"\b금새\b", "금세", "'금세'가 맞습니다", "TYPO"),
        rule(r"\b안(되|될|된)", "안 $1", "'안 되다'는 띄어 씁니다", "SPACING"),
        rule(r"할수(있|없)", "할 수 $1", "'수 있다'는 띄어 씁니다", "SPACING"),
    ]
});

/// Regex rules, no network.
#[derive(Debug, Default, Clone, Copy)]
pub struct RulesProvider;

impl RulesProvider {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Run every rule over `text`, results ordered by position.
    #[must_use]
    pub fn scan(text: &str) -> Vec<Finding> {
        let mut findings: Vec<Finding> = RULES
            .iter()
            .flat_map(|rule| {
                rule.pattern.find_iter(text).filter_map(move |m| {
                    let wrong = m.as_str();
                    let start = char_offset(text, m.start())?;
                    Some(Finding {
                        start,
                        end: start + wrong.chars().count(),
                        wrong: wrong.to_string(),
                        correct: rule.pattern.replace(wrong, rule.replacement).into_owned(),
                        help: Some(rule.help.to_string()),
                        category: Some(rule.category.to_string()),
                    })
                })
            })
            .collect();
        findings.sort_by_key(|f| (f.start, f.end));
        findings
    }
}

#[async_trait]
impl CheckProvider for RulesProvider {
    fn name(&self) -> &'static str {
        "rules"
    }

    async fn check(&self, text: &str) -> Result<Vec<Finding>, CheckError> {
        Ok(Self::scan(text))
    }
}
