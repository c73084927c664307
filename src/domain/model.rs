use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Validity of a phone number against its country's formatting rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum State {
    #[serde(rename = "OK")]
    Ok,
    #[serde(rename = "NOK")]
    Nok,
}

impl State {
    pub fn from_validity(valid: bool) -> Self {
        if valid {
            State::Ok
        } else {
            State::Nok
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            State::Ok => "OK",
            State::Nok => "NOK",
        }
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Exact, case-sensitive parse: only `OK` and `NOK` are states.
impl FromStr for State {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "OK" => Ok(State::Ok),
            "NOK" => Ok(State::Nok),
            _ => Err(()),
        }
    }
}

/// What the classifier learned from one raw row.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Classification {
    pub country: String,
    pub calling_code: String,
    pub subscriber_number: String,
    pub valid: bool,
}

impl Classification {
    pub fn unrecognized() -> Self {
        Self::default()
    }

    pub fn into_record(self) -> PhoneRecord {
        PhoneRecord {
            country: self.country,
            state: State::from_validity(self.valid),
            country_code: self.calling_code,
            phone_number: self.subscriber_number,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhoneRecord {
    pub country: String,
    pub state: State,
    pub country_code: String,
    pub phone_number: String,
}

/// A normalized page request. Built by `core::params::normalize`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub page: usize,
    pub limit: usize,
    pub state: Option<State>,
    /// The page token as the client sent it, after defaulting.
    pub page_token: String,
}

impl PageRequest {
    /// Storage offset of the first row on this page.
    pub fn offset(&self) -> usize {
        self.limit.saturating_mul(self.page.saturating_sub(1))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PageMeta {
    #[serde(rename = "page")]
    pub current_page: String,
    #[serde(rename = "next")]
    pub has_next: bool,
    #[serde(rename = "prev")]
    pub has_prev: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PageResult {
    #[serde(rename = "data")]
    pub records: Vec<PhoneRecord>,
    pub meta: PageMeta,
}

impl PageResult {
    /// An empty page never has navigable neighbours, whatever the flags say.
    pub fn new(records: Vec<PhoneRecord>, mut meta: PageMeta) -> Self {
        if records.is_empty() {
            meta.has_next = false;
            meta.has_prev = false;
        }
        Self { records, meta }
    }
}
