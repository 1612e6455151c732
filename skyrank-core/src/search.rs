use serde::{Deserialize, Serialize};

use crate::{CoreError, CoreResult};

/// Raw search payload as sent by the client. Every field is optional on the
/// wire so that a missing field is reported as a validation error instead of a
/// decoding failure.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SearchRequest {
    pub origin: String,
    pub destination: String,
    pub date: String,
    pub airline: Option<String>,
}

/// Validated, immutable search criteria.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchCriteria {
    pub origin: String,
    pub destination: String,
    /// Calendar date as submitted (`YYYY-MM-DD`). Kept verbatim: an
    /// unparseable date is handled by the offer generator, not rejected here.
    pub date: String,
    pub airline: Option<String>,
}

impl SearchRequest {
    pub fn validate(self) -> CoreResult<SearchCriteria> {
        let origin = self.origin.trim();
        let destination = self.destination.trim();
        let date = self.date.trim();

        if origin.is_empty() || destination.is_empty() || date.is_empty() {
            return Err(CoreError::ValidationError(
                "Please provide an origin, a destination and a date".to_string(),
            ));
        }

        Ok(SearchCriteria::new(origin, destination, date, self.airline.as_deref()))
    }
}

impl SearchCriteria {
    pub fn new(origin: &str, destination: &str, date: &str, airline: Option<&str>) -> Self {
        Self {
            origin: origin.to_string(),
            destination: destination.to_string(),
            date: date.to_string(),
            airline: airline
                .map(str::trim)
                .filter(|a| !a.is_empty())
                .map(str::to_string),
        }
    }

    pub fn preferred_airline(&self) -> Option<&str> {
        self.airline.as_deref()
    }
}
