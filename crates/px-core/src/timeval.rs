//! TIMEVAL synthesis for the time classification.
//!
//! Granularity is inferred from the time codes by a small rule table. Each
//! rule matches a four-digit year optionally followed by a period letter and
//! a bounded period number; the time token is the code with its letters
//! stripped.
//!
//! ```text
//! 2019     A1  "2019"
//! 2019H2   H1  "20192"
//! 2019Q3   Q1  "20193"
//! 2019M07  M1  "201907"
//! 2019W05  W1  "201905"
//! ```

use std::fmt;

/// Time cadence of a TIMEVAL list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeGranularity {
    Annual,
    HalfYear,
    Quarterly,
    Monthly,
    Weekly,
}

struct TimeRule {
    granularity: TimeGranularity,
    letter: Option<char>,
    digits: usize,
    max: u32,
}

const RULES: &[TimeRule] = &[
    TimeRule {
        granularity: TimeGranularity::Annual,
        letter: None,
        digits: 0,
        max: 0,
    },
    TimeRule {
        granularity: TimeGranularity::HalfYear,
        letter: Some('H'),
        digits: 1,
        max: 2,
    },
    TimeRule {
        granularity: TimeGranularity::Quarterly,
        letter: Some('Q'),
        digits: 1,
        max: 4,
    },
    TimeRule {
        granularity: TimeGranularity::Monthly,
        letter: Some('M'),
        digits: 2,
        max: 12,
    },
    TimeRule {
        granularity: TimeGranularity::Weekly,
        letter: Some('W'),
        digits: 2,
        max: 53,
    },
];

impl TimeGranularity {
    /// Token used inside `TLIST(...)`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Annual => "A1",
            Self::HalfYear => "H1",
            Self::Quarterly => "Q1",
            Self::Monthly => "M1",
            Self::Weekly => "W1",
        }
    }
}

impl fmt::Display for TimeGranularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify one time code, returning its granularity and time token.
pub fn classify(code: &str) -> Option<(TimeGranularity, String)> {
    let code = code.trim();
    let year = code.get(..4)?;
    if !year.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let rest = code.get(4..)?;
    RULES.iter().find_map(|rule| {
        let matches = match rule.letter {
            None => rest.is_empty(),
            Some(letter) => {
                let mut chars = rest.chars();
                let head = chars.next()?;
                let period = chars.as_str();
                head.eq_ignore_ascii_case(&letter)
                    && period.len() == rule.digits
                    && period.bytes().all(|b| b.is_ascii_digit())
                    && period
                        .parse::<u32>()
                        .is_ok_and(|number| (1..=rule.max).contains(&number))
            }
        };
        matches.then(|| {
            let token = code.chars().filter(|c| !c.is_alphabetic()).collect();
            (rule.granularity, token)
        })
    })
}

/// Granularity shared by every code, or `None` if they disagree or any
/// code fits no rule.
pub fn infer_granularity<'a>(codes: impl IntoIterator<Item = &'a str>) -> Option<TimeGranularity> {
    let mut granularity = None;
    for code in codes {
        let (found, _) = classify(code)?;
        match granularity {
            None => granularity = Some(found),
            Some(known) if known != found => return None,
            Some(_) => {}
        }
    }
    granularity
}

/// Build a TIMEVAL value: the `TLIST(...)` head followed by the time tokens.
///
/// A contiguous ascending run of years collapses to the range form
/// `TLIST(A1,"2018"-"2020")` with no trailing tokens; anything else keeps
/// the list form `TLIST(Q1)` followed by one token per code.
pub fn timeval_value(codes: &[&str]) -> Option<Vec<String>> {
    let granularity = infer_granularity(codes.iter().copied())?;
    let tokens: Vec<String> = codes
        .iter()
        .filter_map(|code| classify(code).map(|(_, token)| token))
        .collect();

    if granularity == TimeGranularity::Annual && is_contiguous_run(&tokens) {
        let first = tokens.first()?;
        let last = tokens.last()?;
        return Some(vec![format!(
            "TLIST({granularity},\"{first}\"-\"{last}\")"
        )]);
    }

    let mut value = Vec::with_capacity(tokens.len() + 1);
    value.push(format!("TLIST({granularity})"));
    value.extend(tokens);
    Some(value)
}

fn is_contiguous_run(tokens: &[String]) -> bool {
    if tokens.len() < 2 {
        return false;
    }
    let years: Option<Vec<u32>> = tokens.iter().map(|token| token.parse().ok()).collect();
    years.is_some_and(|years| years.windows(2).all(|pair| pair[1] == pair[0] + 1))
}
