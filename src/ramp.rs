use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;

use crate::year::{UNKNOWN_YEAR, YEAR_ATTRIBUTE};

/// A single threshold in a ramp: features built in `year` or later take `color`
/// until the next stop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearColorStop {
    pub year: i32,
    pub color: String,
}

impl YearColorStop {
    pub fn new(year: i32, color: impl Into<String>) -> Self {
        Self {
            year,
            color: color.into(),
        }
    }
}

/// Treatment for features whose construction year is not known.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnknownYear {
    #[serde(default = "default_sentinel")]
    pub sentinel: i32,
    pub color: String,
}

fn default_sentinel() -> i32 {
    UNKNOWN_YEAR
}

impl UnknownYear {
    pub fn new(sentinel: i32, color: impl Into<String>) -> Self {
        Self {
            sentinel,
            color: color.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RampError {
    #[error("ramp must define at least one stop")]
    Empty,
    #[error("ramp stops must be strictly increasing, found {previous} followed by {next}")]
    Unsorted { previous: i32, next: i32 },
    #[error("'{0}' is not a usable color")]
    InvalidColor(String),
}

/// Step ramp over `year_built`. Stops are strictly increasing and non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Ramp {
    stops: Vec<YearColorStop>,
    unknown: UnknownYear,
}

impl Ramp {
    pub fn new(stops: Vec<YearColorStop>, unknown: UnknownYear) -> Result<Self, RampError> {
        if stops.is_empty() {
            return Err(RampError::Empty);
        }
        for pair in stops.windows(2) {
            if pair[1].year <= pair[0].year {
                return Err(RampError::Unsorted {
                    previous: pair[0].year,
                    next: pair[1].year,
                });
            }
        }
        for color in stops
            .iter()
            .map(|stop| stop.color.as_str())
            .chain(std::iter::once(unknown.color.as_str()))
        {
            validate_color(color)?;
        }
        Ok(Self { stops, unknown })
    }

    /// Franklin County palette: pre-war red, mid-century green, current blue.
    pub fn columbus(unknown_color: &str) -> Result<Self, RampError> {
        Self::new(
            vec![
                YearColorStop::new(1800, "#e41a1c"),
                YearColorStop::new(1925, "#4daf4a"),
                YearColorStop::new(2019, "#377eb8"),
            ],
            UnknownYear::new(UNKNOWN_YEAR, unknown_color),
        )
    }

    pub fn stops(&self) -> &[YearColorStop] {
        &self.stops
    }

    pub fn unknown(&self) -> &UnknownYear {
        &self.unknown
    }

    pub fn resolve(&self, year: i32) -> &str {
        if year == self.unknown.sentinel {
            return &self.unknown.color;
        }
        self.dated_color(year)
    }

    /// Color of the greatest stop not after `year`, or the lowest stop when
    /// `year` precedes them all.
    pub fn dated_color(&self, year: i32) -> &str {
        let index = self.stops.partition_point(|stop| stop.year <= year);
        let stop = &self.stops[index.saturating_sub(1)];
        &stop.color
    }

    /// Step expression without the unknown-year case.
    pub fn dated_expression(&self) -> Value {
        let mut expression = vec![
            json!("step"),
            json!(["get", YEAR_ATTRIBUTE]),
            json!(self.stops[0].color),
        ];
        // The first stop only supplies the base output.
        for stop in &self.stops[1..] {
            expression.push(json!(stop.year));
            expression.push(json!(stop.color));
        }
        Value::Array(expression)
    }

    pub fn step_expression(&self) -> Value {
        json!([
            "case",
            ["==", ["get", YEAR_ATTRIBUTE], self.unknown.sentinel],
            self.unknown.color,
            self.dated_expression()
        ])
    }
}

fn validate_color(color: &str) -> Result<(), RampError> {
    let valid = match color.strip_prefix('#') {
        Some(hex) => matches!(hex.len(), 3 | 6) && hex.chars().all(|c| c.is_ascii_hexdigit()),
        None => !color.is_empty() && color.chars().all(|c| c.is_ascii_alphabetic()),
    };
    if valid {
        Ok(())
    } else {
        Err(RampError::InvalidColor(color.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dated_expression_skips_first_threshold() {
        let ramp = Ramp::columbus("gray").unwrap();
        assert_eq!(
            ramp.dated_expression(),
            json!([
                "step",
                ["get", "year_built"],
                "#e41a1c",
                1925,
                "#4daf4a",
                2019,
                "#377eb8"
            ])
        );
    }

    #[test]
    fn rejects_malformed_colors() {
        for color in ["", "#12", "#gggggg", "rgb(1,2,3)"] {
            let err = Ramp::new(
                vec![YearColorStop::new(1900, color)],
                UnknownYear::new(0, "gray"),
            )
            .unwrap_err();
            assert_eq!(err, RampError::InvalidColor(color.to_string()));
        }
    }
}
