//! Parsing of the attribute table embedded in placemark descriptions.

use std::collections::{BTreeSet, HashMap};

use regex::Regex;

use strada_core::model::{CleaningRule, DayParity, TimeWindow, weekday_from_code};

/// Attribute names flagging the first to fifth week of the month.
const WEEK_FIELDS: [(&str, u8); 5] = [
    ("prima_settimana", 1),
    ("seconda_settimana", 2),
    ("terza_settimana", 3),
    ("quarta_settimana", 4),
    ("quinta_settimana", 5),
];

/// Name/value span pairs of the exported attribute table.
const ATTRIBUTE_PATTERN: &str =
    r#"(?s)<span class="atr-name">\s*([^<]*?)\s*</span>.*?<span class="atr-value">([^<]*)</span>"#;

/// Decoded description of one placemark.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ParsedDescription {
    /// Street name from the `indirizzo` attribute, if present.
    pub(crate) street_name: Option<String>,
    pub(crate) rule: CleaningRule,
}

/// Parser for the description markup; holds the compiled attribute pattern.
pub(crate) struct DescriptionParser {
    attribute: Regex,
}

impl DescriptionParser {
    pub(crate) fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            attribute: Regex::new(ATTRIBUTE_PATTERN)?,
        })
    }

    /// Attribute name/value pairs, names lowercased. The first occurrence of a name wins.
    fn attributes<'a>(&self, description: &'a str) -> HashMap<String, &'a str> {
        let mut attributes = HashMap::new();
        for captures in self.attribute.captures_iter(description) {
            let (_, [name, value]) = captures.extract();
            attributes
                .entry(name.to_lowercase())
                .or_insert_with(|| value.trim());
        }
        attributes
    }

    pub(crate) fn parse(&self, description: &str) -> ParsedDescription {
        let attributes = self.attributes(description);
        let text = |key: &str| {
            attributes
                .get(key)
                .copied()
                .filter(|value| !value.is_empty())
                .map(str::to_owned)
        };
        let flag = |key: &str| attributes.get(key).is_some_and(|value| *value == "1");

        let week_ordinals: BTreeSet<u8> = WEEK_FIELDS
            .iter()
            .filter(|&&(field, _)| flag(field))
            .map(|&(_, ordinal)| ordinal)
            .collect();

        let day_parity = if flag("pari") {
            DayParity::Even
        } else if flag("dispari") {
            DayParity::Odd
        } else {
            DayParity::Any
        };

        let time_window = match (text("ora_inizio"), text("ora_fine")) {
            (Some(start), Some(end)) => Some(TimeWindow { start, end }),
            _ => None,
        };

        ParsedDescription {
            street_name: text("indirizzo"),
            rule: CleaningRule {
                weekday: attributes
                    .get("giorno_settimana")
                    .copied()
                    .and_then(weekday_from_code),
                week_ordinals,
                weekly: flag("settimanale"),
                day_parity,
                time_window,
                section: text("tratto_strada"),
            },
        }
    }
}
