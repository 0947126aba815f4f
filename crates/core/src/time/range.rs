use crate::domain::contract::DateRangeRequest;
use crate::error::ReportError;
use chrono::NaiveDate;

const DATE_FORMAT: &str = "%Y-%m-%d";
const PICKER_SEPARATOR: &str = " - ";

pub const MSG_INVALID_RANGE: &str = "Please select a valid start and end date.";
pub const MSG_MISSING_FISH_COUNT: &str = "Please enter the fish count.";

/// Validated input for one prediction run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PredictionRequest {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub fish_count: u32,
}

impl PredictionRequest {
    pub fn validate(
        start_date: &str,
        end_date: &str,
        fish_count: &str,
        max_range_days: Option<u32>,
    ) -> anyhow::Result<Self> {
        let start = parse_date(start_date)?;
        let end = parse_date(end_date)?;
        if start > end {
            return Err(invalid(format!(
                "{MSG_INVALID_RANGE} Start {start} is after end {end}."
            )));
        }

        if let Some(max) = max_range_days {
            let days = (end - start).num_days() + 1;
            if days > i64::from(max) {
                return Err(invalid(format!(
                    "{MSG_INVALID_RANGE} The range covers {days} days; at most {max} are allowed."
                )));
            }
        }

        Ok(Self {
            start_date: start,
            end_date: end,
            fish_count: parse_fish_count(fish_count)?,
        })
    }

    /// Accepts the date picker's `"YYYY-MM-DD - YYYY-MM-DD"` form.
    pub fn validate_picker_range(
        range: &str,
        fish_count: &str,
        max_range_days: Option<u32>,
    ) -> anyhow::Result<Self> {
        let (start, end) = split_picker_range(range)?;
        Self::validate(start, end, fish_count, max_range_days)
    }

    /// Inclusive number of days covered.
    pub fn days(&self) -> i64 {
        (self.end_date - self.start_date).num_days() + 1
    }

    pub fn to_wire(&self) -> DateRangeRequest {
        DateRangeRequest {
            start_date: self.start_date.format(DATE_FORMAT).to_string(),
            end_date: self.end_date.format(DATE_FORMAT).to_string(),
            fish_count: self.fish_count.to_string(),
        }
    }
}

pub fn split_picker_range(range: &str) -> anyhow::Result<(&str, &str)> {
    let parts: Vec<&str> = range.trim().split(PICKER_SEPARATOR).collect();
    match parts.as_slice() {
        [start, end] if !start.trim().is_empty() && !end.trim().is_empty() => {
            Ok((start.trim(), end.trim()))
        }
        _ => Err(invalid(MSG_INVALID_RANGE.to_string())),
    }
}

fn parse_date(s: &str) -> anyhow::Result<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        return Err(invalid(MSG_INVALID_RANGE.to_string()));
    }
    NaiveDate::parse_from_str(s, DATE_FORMAT)
        .map_err(|_| invalid(format!("{MSG_INVALID_RANGE} {s:?} is not a YYYY-MM-DD date.")))
}

fn parse_fish_count(s: &str) -> anyhow::Result<u32> {
    let s = s.trim();
    if s.is_empty() {
        return Err(invalid(MSG_MISSING_FISH_COUNT.to_string()));
    }
    match s.parse::<u32>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(invalid(format!(
            "Fish count must be a positive whole number (got {s:?})."
        ))),
    }
}

fn invalid(msg: String) -> anyhow::Error {
    ReportError::Validation(msg).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validation_message(err: &anyhow::Error) -> String {
        match ReportError::of(err) {
            Some(ReportError::Validation(msg)) => msg.clone(),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn accepts_ordered_range() {
        let req = PredictionRequest::validate("2024-06-01", "2024-06-03", "500", Some(5)).unwrap();
        assert_eq!(req.start_date, NaiveDate::from_ymd_opt(2024, 6, 1).unwrap());
        assert_eq!(req.fish_count, 500);
        assert_eq!(req.days(), 3);

        let wire = req.to_wire();
        assert_eq!(wire.start_date, "2024-06-01");
        assert_eq!(wire.end_date, "2024-06-03");
        assert_eq!(wire.fish_count, "500");
    }

    #[test]
    fn single_day_range_is_valid() {
        let req = PredictionRequest::validate("2024-06-01", "2024-06-01", " 12 ", None).unwrap();
        assert_eq!(req.days(), 1);
        assert_eq!(req.fish_count, 12);
    }

    #[test]
    fn rejects_missing_or_reversed_dates() {
        let err = PredictionRequest::validate("", "2024-06-03", "500", None).unwrap_err();
        assert_eq!(validation_message(&err), MSG_INVALID_RANGE);

        let err = PredictionRequest::validate("2024-06-04", "2024-06-03", "500", None).unwrap_err();
        assert!(validation_message(&err).contains("after end"));

        let err = PredictionRequest::validate("06/01/2024", "2024-06-03", "500", None).unwrap_err();
        assert!(validation_message(&err).contains("not a YYYY-MM-DD date"));
    }

    #[test]
    fn rejects_bad_fish_counts() {
        let err = PredictionRequest::validate("2024-06-01", "2024-06-03", "", None).unwrap_err();
        assert_eq!(validation_message(&err), MSG_MISSING_FISH_COUNT);

        for bad in ["0", "-3", "12.5", "lots"] {
            let err = PredictionRequest::validate("2024-06-01", "2024-06-03", bad, None).unwrap_err();
            assert!(validation_message(&err).contains("positive whole number"), "{bad}");
        }
    }

    #[test]
    fn enforces_max_range_days() {
        assert!(PredictionRequest::validate("2024-06-01", "2024-06-05", "1", Some(5)).is_ok());
        let err = PredictionRequest::validate("2024-06-01", "2024-06-06", "1", Some(5)).unwrap_err();
        assert!(validation_message(&err).contains("6 days"));
        assert!(PredictionRequest::validate("2024-06-01", "2024-06-30", "1", None).is_ok());
    }

    #[test]
    fn parses_picker_range() {
        let req =
            PredictionRequest::validate_picker_range("2024-06-01 - 2024-06-03", "500", Some(5)).unwrap();
        assert_eq!(req.end_date, NaiveDate::from_ymd_opt(2024, 6, 3).unwrap());

        for bad in ["2024-06-01", "2024-06-01 - ", " - 2024-06-03", ""] {
            let err = PredictionRequest::validate_picker_range(bad, "500", None).unwrap_err();
            assert_eq!(validation_message(&err), MSG_INVALID_RANGE, "{bad:?}");
        }
    }
}
