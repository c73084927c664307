use crate::domain::model::Classification;
use crate::domain::ports::NumberClassifier;
use crate::utils::error::{AppError, Result};
use regex::Regex;

/// Uncompiled description of a country rule.
///
/// `pattern` must match the whole `(code) digits` string, with the calling code
/// in capture group 1 and the subscriber number in capture group 2.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountryRuleDef {
    pub name: String,
    pub calling_code: String,
    pub pattern: String,
}

impl CountryRuleDef {
    pub fn new(name: &str, calling_code: &str, pattern: &str) -> Self {
        Self {
            name: name.to_string(),
            calling_code: calling_code.to_string(),
            pattern: pattern.to_string(),
        }
    }
}

pub fn builtin_rules() -> Vec<CountryRuleDef> {
    vec![
        CountryRuleDef::new("Cameroon", "237", r"\((237)\) ?([2368]\d{7,8})$"),
        CountryRuleDef::new("Ethiopia", "251", r"\((251)\) ?([1-59]\d{8})$"),
        CountryRuleDef::new("Morocco", "212", r"\((212)\) ?([5-9]\d{8})$"),
        CountryRuleDef::new("Mozambique", "258", r"\((258)\) ?([28]\d{7,8})$"),
        CountryRuleDef::new("Uganda", "256", r"\((256)\) ?(\d{9})$"),
    ]
}

#[derive(Debug, Clone)]
struct CountryRule {
    name: String,
    calling_code: String,
    prefix: String,
    pattern: Regex,
}

impl CountryRule {
    fn compile(def: &CountryRuleDef) -> Result<Self> {
        let pattern = Regex::new(&def.pattern)?;
        if pattern.captures_len() < 3 {
            return Err(AppError::InvalidConfigValueError {
                field: "countries.pattern".to_string(),
                value: def.pattern.clone(),
                reason: "Pattern needs a calling code group and a subscriber number group"
                    .to_string(),
            });
        }

        Ok(Self {
            name: def.name.clone(),
            calling_code: def.calling_code.clone(),
            prefix: format!("({})", def.calling_code),
            pattern,
        })
    }
}

/// Attributes raw phone numbers to a country and checks them against its rule.
///
/// The registry is fixed at construction. Rules are matched by their
/// `(calling code)` prefix first so a malformed number is still attributed to
/// the right country.
#[derive(Debug, Clone)]
pub struct Classifier {
    rules: Vec<CountryRule>,
}

impl Classifier {
    pub fn new() -> Result<Self> {
        Self::from_rules(&builtin_rules())
    }

    pub fn from_rules(defs: &[CountryRuleDef]) -> Result<Self> {
        let rules = defs
            .iter()
            .map(CountryRule::compile)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { rules })
    }

    /// Built-in rules followed by `extra`.
    pub fn with_extra_rules(extra: &[CountryRuleDef]) -> Result<Self> {
        let mut defs = builtin_rules();
        defs.extend_from_slice(extra);
        Self::from_rules(&defs)
    }

    pub fn country_names(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(|rule| rule.name.as_str())
    }
}

impl NumberClassifier for Classifier {
    fn classify(&self, raw: &str) -> Classification {
        let phone = raw.trim();

        let Some(rule) = self.rules.iter().find(|rule| phone.starts_with(&rule.prefix)) else {
            return Classification::unrecognized();
        };

        if let Some(caps) = rule.pattern.captures(phone) {
            if let (Some(code), Some(number)) = (caps.get(1), caps.get(2)) {
                return Classification {
                    country: rule.name.clone(),
                    calling_code: format!("+{}", code.as_str()),
                    subscriber_number: number.as_str().to_string(),
                    valid: true,
                };
            }
        }

        // prefix always contains ')', so the slice start is in bounds
        let sanitized = phone
            .find(')')
            .map(|idx| phone[idx + 1..].trim())
            .unwrap_or_default();

        Classification {
            country: rule.name.clone(),
            calling_code: format!("+{}", rule.calling_code),
            subscriber_number: sanitized.to_string(),
            valid: false,
        }
    }

    fn calling_code_for(&self, country: &str) -> Result<&str> {
        let wanted = country.to_lowercase();
        self.rules
            .iter()
            .find(|rule| rule.name.to_lowercase() == wanted)
            .map(|rule| rule.calling_code.as_str())
            .ok_or_else(|| AppError::not_found(format!("unknown country '{}'", country)))
    }
}
