//! Manual exclusion of known-bad dataset entries.

use chrono::Weekday;
use serde::{Deserialize, Deserializer, de};
use tracing::{debug, info};

use crate::model::{StreetSegment, weekday_from_code};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
/// One entry to drop from every loaded dataset.
pub struct ExclusionRule {
    /// Exact street name of the entry.
    pub street_name: String,
    /// Weekday of the entry's cleaning rule.
    ///
    /// Accepts the dataset's day codes (`LU` to `DO`, also under the key
    /// `day_code`) as well as English names such as `Mon` or `monday`.
    #[serde(alias = "day_code", deserialize_with = "deserialize_weekday")]
    pub weekday: Weekday,
    /// When set, the entry's section must match as well.
    #[serde(default)]
    pub section: Option<String>,
    /// Why the entry is excluded, for the logs.
    #[serde(default)]
    pub reason: Option<String>,
}

impl ExclusionRule {
    /// Whether this rule drops `street`.
    #[must_use]
    pub fn matches(&self, street: &StreetSegment) -> bool {
        if self.street_name != street.name || street.rule.weekday != Some(self.weekday) {
            return false;
        }

        match &self.section {
            Some(section) => street.rule.section.as_deref() == Some(section.as_str()),
            None => true,
        }
    }
}

fn deserialize_weekday<'de, D>(deserializer: D) -> Result<Weekday, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    weekday_from_code(&raw)
        .or_else(|| raw.trim().parse::<Weekday>().ok())
        .ok_or_else(|| de::Error::custom(format!("unknown weekday `{raw}`")))
}

#[derive(Debug, Clone, Default)]
/// Set of exclusion rules applied on every dataset refresh.
pub struct ExclusionList {
    rules: Vec<ExclusionRule>,
}

impl ExclusionList {
    /// Build a list from configured rules.
    #[must_use]
    pub fn new(rules: Vec<ExclusionRule>) -> Self {
        Self { rules }
    }

    /// Whether no rule is configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// First rule dropping `street`, if any.
    #[must_use]
    pub fn matching_rule(&self, street: &StreetSegment) -> Option<&ExclusionRule> {
        self.rules.iter().find(|rule| rule.matches(street))
    }

    /// Remove every excluded street, keeping the order of the rest.
    #[must_use]
    pub fn filter(&self, streets: Vec<StreetSegment>) -> Vec<StreetSegment> {
        if self.rules.is_empty() {
            return streets;
        }

        let before = streets.len();
        let kept: Vec<StreetSegment> = streets
            .into_iter()
            .filter(|street| match self.matching_rule(street) {
                Some(rule) => {
                    debug!(
                        street = %street.name,
                        reason = rule.reason.as_deref().unwrap_or("matched exclusion rule"),
                        "excluding street entry"
                    );
                    false
                }
                None => true,
            })
            .collect();

        let excluded = before - kept.len();
        if excluded > 0 {
            info!(excluded, "filtered street entries by exclusion rules");
        }
        kept
    }
}
