//! Validation and normalization of [`StructuredRecord`]s into storable rows.
//!
//! Records that fail validation are not errors: [`normalize`] returns the [`DropReason`] and the
//! caller decides how to report it.

use std::fmt;

use crate::types::{NormalizedRow, RecordMap, RecordValue, StructuredRecord};

pub const NAME_KEY: &str = "name";
pub const AGE_KEY: &str = "age";
pub const ADDRESS_KEY: &str = "address";
pub const FIRST_NAME_KEY: &str = "firstName";
pub const LAST_NAME_KEY: &str = "lastName";

/// Inclusive bounds for a valid age.
pub const MIN_AGE: i64 = 0;
pub const MAX_AGE: i64 = 150;

/// How a numeric age of exactly zero is treated.
///
/// Only `age` is affected. A name is missing when it is absent, null or empty; a numeric name
/// such as `0` is stored as its text form (`"0"`) under either policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ZeroAgePolicy {
    /// Zero counts as a missing age and the record is dropped.
    #[default]
    TreatAsMissing,
    /// Zero is an ordinary valid age.
    Accept,
}

/// Options for [`normalize`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NormalizeOptions {
    pub zero_age: ZeroAgePolicy,
}

/// Why a record was excluded from output.
#[derive(Debug, Clone, PartialEq)]
pub enum DropReason {
    /// `name` is absent, null, or resolves to an empty string.
    MissingName,
    /// `age` is absent or null (or zero under [`ZeroAgePolicy::TreatAsMissing`]).
    MissingAge,
    /// `age` has no leading integer.
    InvalidAge { raw: String },
    /// `age` parsed but lies outside `[MIN_AGE, MAX_AGE]`.
    AgeOutOfRange { age: i64 },
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingName => f.write_str("missing name"),
            Self::MissingAge => f.write_str("missing age"),
            Self::InvalidAge { raw } => write!(f, "invalid age: {raw}"),
            Self::AgeOutOfRange { age } => write!(f, "age {age} outside [{MIN_AGE}, {MAX_AGE}]"),
        }
    }
}

/// Validate one record and split it into mandatory columns plus auxiliary data.
///
/// ```rust
/// use csv_user_ingest::ingestion::build;
/// use csv_user_ingest::processing::{normalize, NormalizeOptions};
///
/// let rec = build(&["name.firstName", "name.lastName", "age"], &["Jane", "Doe", "25"]);
/// let row = normalize(&rec, &NormalizeOptions::default()).unwrap();
/// assert_eq!(row.name, "Jane Doe");
/// assert_eq!(row.age, 25);
/// ```
pub fn normalize(record: &StructuredRecord, options: &NormalizeOptions) -> Result<NormalizedRow, DropReason> {
    let name_value = present(record.get(NAME_KEY)).ok_or(DropReason::MissingName)?;
    let age_value = present(record.get(AGE_KEY)).ok_or(DropReason::MissingAge)?;
    if options.zero_age == ZeroAgePolicy::TreatAsMissing && is_zero(age_value) {
        return Err(DropReason::MissingAge);
    }

    let name = resolve_name(name_value);
    if name.is_empty() {
        return Err(DropReason::MissingName);
    }
    let age = resolve_age(age_value)?;

    let address = present(record.get(ADDRESS_KEY)).cloned();
    let auxiliary: RecordMap = record
        .iter()
        .filter(|(k, _)| !matches!(k.as_str(), NAME_KEY | AGE_KEY | ADDRESS_KEY))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();

    Ok(NormalizedRow {
        name,
        age,
        address,
        auxiliary: (!auxiliary.is_empty()).then_some(auxiliary),
    })
}

fn present(v: Option<&RecordValue>) -> Option<&RecordValue> {
    v.filter(|v| !v.is_null())
}

fn is_zero(v: &RecordValue) -> bool {
    match v {
        RecordValue::Int(n) => *n == 0,
        RecordValue::Float(n) => *n == 0.0,
        _ => false,
    }
}

fn resolve_name(v: &RecordValue) -> String {
    match v {
        RecordValue::Map(parts) => {
            let part = |key: &str| parts.get(key).and_then(RecordValue::text_form).unwrap_or_default();
            format!("{} {}", part(FIRST_NAME_KEY), part(LAST_NAME_KEY))
                .trim()
                .to_owned()
        }
        other => other.text_form().unwrap_or_default(),
    }
}

fn resolve_age(v: &RecordValue) -> Result<i64, DropReason> {
    let raw = v.text_form().unwrap_or_else(|| v.to_string());
    let age = parse_int_prefix(&raw).ok_or(DropReason::InvalidAge { raw })?;
    if (MIN_AGE..=MAX_AGE).contains(&age) {
        Ok(age)
    } else {
        Err(DropReason::AgeOutOfRange { age })
    }
}

/// Leading base-10 integer of `s`: optional whitespace and sign, then at least one digit.
/// Anything after the digits is ignored. Saturates instead of overflowing.
pub fn parse_int_prefix(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let (negative, rest) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let digits: &str = {
        let end = rest.find(|c: char| !c.is_ascii_digit()).unwrap_or(rest.len());
        &rest[..end]
    };
    if digits.is_empty() {
        return None;
    }

    let mut value: i64 = 0;
    for d in digits.bytes() {
        let d = i64::from(d - b'0');
        value = value.saturating_mul(10).saturating_add(d);
    }
    Some(if negative { -value } else { value })
}

#[cfg(test)]
mod tests {
    use super::{normalize, parse_int_prefix, DropReason, NormalizeOptions, ZeroAgePolicy};
    use crate::ingestion::build;
    use crate::types::{RecordMap, RecordValue};

    fn defaults() -> NormalizeOptions {
        NormalizeOptions::default()
    }

    fn age_row(age: &str) -> Result<i64, DropReason> {
        normalize(&build(&["name", "age"], &["Al", age]), &defaults()).map(|r| r.age)
    }

    #[test]
    fn simple_row_has_no_optional_parts() {
        let row = normalize(&build(&["name", "age"], &["Alice", "30"]), &defaults()).unwrap();
        assert_eq!(row.name, "Alice");
        assert_eq!(row.age, 30);
        assert_eq!(row.address, None);
        assert_eq!(row.auxiliary, None);
    }

    #[test]
    fn nested_name_is_joined() {
        let rec = build(&["name.firstName", "name.lastName", "age"], &["Jane", "Doe", "25"]);
        assert_eq!(normalize(&rec, &defaults()).unwrap().name, "Jane Doe");
    }

    #[test]
    fn nested_name_with_one_part_is_trimmed() {
        let rec = build(&["name.firstName", "name.lastName", "age"], &["", "Doe", "25"]);
        assert_eq!(normalize(&rec, &defaults()).unwrap().name, "Doe");
    }

    #[test]
    fn nested_name_with_no_parts_is_dropped() {
        let rec = build(&["name.firstName", "name.lastName", "age"], &["", "", "25"]);
        assert_eq!(normalize(&rec, &defaults()), Err(DropReason::MissingName));
    }

    #[test]
    fn numeric_scalar_name_uses_text_form() {
        let rec = build(&["name", "age"], &["42", "30"]);
        assert_eq!(normalize(&rec, &defaults()).unwrap().name, "42");
    }

    #[test]
    fn numeric_zero_name_is_kept_under_both_policies() {
        let rec = build(&["name", "age"], &["0", "30"]);
        assert_eq!(normalize(&rec, &defaults()).unwrap().name, "0");
        let accept = NormalizeOptions {
            zero_age: ZeroAgePolicy::Accept,
        };
        assert_eq!(normalize(&rec, &accept).unwrap().name, "0");
    }

    #[test]
    fn missing_mandatory_fields_drop() {
        assert_eq!(
            normalize(&build(&["name", "age"], &["", "30"]), &defaults()),
            Err(DropReason::MissingName)
        );
        assert_eq!(
            normalize(&build(&["name", "age"], &["Al", ""]), &defaults()),
            Err(DropReason::MissingAge)
        );
        assert_eq!(
            normalize(&build(&["name"], &["Al"]), &defaults()),
            Err(DropReason::MissingAge)
        );
    }

    #[test]
    fn age_bounds() {
        assert_eq!(age_row("150"), Ok(150));
        assert_eq!(age_row("-1"), Err(DropReason::AgeOutOfRange { age: -1 }));
        assert_eq!(age_row("151"), Err(DropReason::AgeOutOfRange { age: 151 }));
        assert_eq!(age_row("old"), Err(DropReason::InvalidAge { raw: "old".into() }));
    }

    #[test]
    fn zero_age_is_missing_by_default() {
        assert_eq!(age_row("0"), Err(DropReason::MissingAge));
    }

    #[test]
    fn zero_age_is_valid_when_accepted() {
        let opts = NormalizeOptions {
            zero_age: ZeroAgePolicy::Accept,
        };
        let row = normalize(&build(&["name", "age"], &["Al", "0"]), &opts).unwrap();
        assert_eq!(row.age, 0);
    }

    #[test]
    fn fractional_and_suffixed_ages_use_leading_integer() {
        assert_eq!(age_row("3.7"), Ok(3));
        assert_eq!(age_row("30 years"), Ok(30));
    }

    #[test]
    fn nested_age_is_invalid() {
        let rec = build(&["name", "age.years"], &["Al", "30"]);
        assert!(matches!(
            normalize(&rec, &defaults()),
            Err(DropReason::InvalidAge { .. })
        ));
    }

    #[test]
    fn address_and_auxiliary_are_split_out() {
        let rec = build(
            &["name", "age", "address.city", "address.zip", "gender", "meta.source"],
            &["Al", "30", "Pune", "411001", "", "import"],
        );
        let row = normalize(&rec, &defaults()).unwrap();

        let mut address = RecordMap::new();
        address.insert("city".into(), RecordValue::Text("Pune".into()));
        address.insert("zip".into(), RecordValue::Int(411001));
        assert_eq!(row.address, Some(RecordValue::Map(address)));

        let aux = row.auxiliary.unwrap();
        assert_eq!(aux.len(), 2);
        assert_eq!(aux.get("gender"), Some(&RecordValue::Null));
        assert!(aux.get("meta").and_then(RecordValue::as_map).is_some());
    }

    #[test]
    fn parse_int_prefix_follows_leading_digits() {
        assert_eq!(parse_int_prefix("  42abc"), Some(42));
        assert_eq!(parse_int_prefix("-7"), Some(-7));
        assert_eq!(parse_int_prefix("+8"), Some(8));
        assert_eq!(parse_int_prefix("abc"), None);
        assert_eq!(parse_int_prefix("-"), None);
        assert_eq!(parse_int_prefix(""), None);
        assert_eq!(parse_int_prefix("99999999999999999999999"), Some(i64::MAX));
    }
}
