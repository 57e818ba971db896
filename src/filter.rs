//! Filter predicate evaluation over raw persona records.

use crate::constants::fields;
use crate::data::PersonaRecord;
use crate::errors::PersonaError;
use crate::normalize::{is_canonical_sex, normalize_sex};

/// Optional criteria a record must satisfy to be accepted.
///
/// Every criterion is independent and `None` means "no constraint". Age
/// bounds are inclusive, and `Some(0)` is an enforced bound rather than
/// an absent one.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    /// Case-sensitive substring of `occupation`.
    pub occupation_substring: Option<String>,
    /// Exact `prefecture`.
    pub prefecture_exact: Option<String>,
    /// Exact `region`.
    pub region_exact: Option<String>,
    /// Inclusive lower bound on `age`.
    pub age_min: Option<i64>,
    /// Inclusive upper bound on `age`.
    pub age_max: Option<i64>,
    /// Requested sex, normalized before comparison.
    pub sex_exact: Option<String>,
    /// Case-sensitive substring of `education_level`.
    pub education_substring: Option<String>,
    /// Case-sensitive substring of `marital_status`.
    pub marital_status_substring: Option<String>,
}

impl FilterCriteria {
    /// Criteria that accept every record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Require `occupation` to contain `value`.
    pub fn with_occupation(mut self, value: impl Into<String>) -> Self {
        self.occupation_substring = Some(value.into());
        self
    }

    /// Require `prefecture` to equal `value`.
    pub fn with_prefecture(mut self, value: impl Into<String>) -> Self {
        self.prefecture_exact = Some(value.into());
        self
    }

    /// Require `region` to equal `value`.
    pub fn with_region(mut self, value: impl Into<String>) -> Self {
        self.region_exact = Some(value.into());
        self
    }

    /// Inclusive lower age bound.
    pub fn with_age_min(mut self, value: i64) -> Self {
        self.age_min = Some(value);
        self
    }

    /// Inclusive upper age bound.
    pub fn with_age_max(mut self, value: i64) -> Self {
        self.age_max = Some(value);
        self
    }

    /// Require the given sex; English tokens are normalized.
    pub fn with_sex(mut self, value: impl Into<String>) -> Self {
        self.sex_exact = Some(value.into());
        self
    }

    /// Require `education_level` to contain `value`.
    pub fn with_education(mut self, value: impl Into<String>) -> Self {
        self.education_substring = Some(value.into());
        self
    }

    /// Require `marital_status` to contain `value`.
    pub fn with_marital_status(mut self, value: impl Into<String>) -> Self {
        self.marital_status_substring = Some(value.into());
        self
    }

    /// Reject criteria that can never be satisfied or name unknown values.
    pub fn validate(&self) -> Result<(), PersonaError> {
        if let Some(sex) = &self.sex_exact
            && !is_canonical_sex(&normalize_sex(sex))
        {
            return Err(PersonaError::InvalidArgument(format!(
                "unsupported sex value '{sex}' (expected one of: male, female, 男, 女)"
            )));
        }
        if let (Some(min), Some(max)) = (self.age_min, self.age_max)
            && min > max
        {
            return Err(PersonaError::InvalidArgument(format!(
                "age_min ({min}) must not exceed age_max ({max})"
            )));
        }
        Ok(())
    }

    /// Whether no criterion is set.
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Evaluate every present criterion against a raw record.
    ///
    /// List-valued fields are never inspected.
    pub fn matches(&self, record: &PersonaRecord) -> bool {
        contains_opt(record, fields::OCCUPATION, self.occupation_substring.as_deref())
            && equals_opt(record, fields::PREFECTURE, self.prefecture_exact.as_deref())
            && equals_opt(record, fields::REGION, self.region_exact.as_deref())
            && self.age_in_bounds(record)
            && self.sex_matches(record)
            && contains_opt(
                record,
                fields::EDUCATION_LEVEL,
                self.education_substring.as_deref(),
            )
            && contains_opt(
                record,
                fields::MARITAL_STATUS,
                self.marital_status_substring.as_deref(),
            )
    }

    fn age_in_bounds(&self, record: &PersonaRecord) -> bool {
        if self.age_min.is_none() && self.age_max.is_none() {
            return true;
        }
        let Some(age) = record.age() else {
            return false;
        };
        self.age_min.is_none_or(|min| age >= min) && self.age_max.is_none_or(|max| age <= max)
    }

    fn sex_matches(&self, record: &PersonaRecord) -> bool {
        match &self.sex_exact {
            None => true,
            Some(requested) => record.str_field(fields::SEX) == Some(normalize_sex(requested).as_str()),
        }
    }
}

fn contains_opt(record: &PersonaRecord, field: &str, needle: Option<&str>) -> bool {
    match needle {
        None => true,
        Some(needle) => record.str_field(field).unwrap_or("").contains(needle),
    }
}

/// An empty expected value places no constraint.
fn equals_opt(record: &PersonaRecord, field: &str, expected: Option<&str>) -> bool {
    match expected {
        None | Some("") => true,
        Some(expected) => record.str_field(field) == Some(expected),
    }
}
