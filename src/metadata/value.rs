//! Rendering of CQL values as display text.
//!
//! Scalars become their plain textual form; collections, tuples and UDTs become
//! compact JSON so the details pane can re-indent them.

use chrono::{DateTime, NaiveDate, NaiveTime, SecondsFormat, TimeDelta};
use scylla::frame::response::result::CqlValue;
use scylla::frame::value::{CqlDate, CqlDecimal, CqlDuration, CqlTime, CqlTimestamp, CqlVarint};
use serde_json::Value;
use std::fmt::Write as _;

/// Day number of 1970-01-01 in the CQL `date` encoding.
const CQL_DATE_EPOCH: i64 = 1 << 31;

/// Render a column value as the raw text shown in the details pane.
#[must_use]
pub fn cql_value_to_text(v: &CqlValue) -> String {
    match v {
        CqlValue::Ascii(s) | CqlValue::Text(s) => s.clone(),
        CqlValue::Boolean(b) => b.to_string(),
        CqlValue::Int(i) => i.to_string(),
        CqlValue::BigInt(i) => i.to_string(),
        CqlValue::SmallInt(i) => i.to_string(),
        CqlValue::TinyInt(i) => i.to_string(),
        CqlValue::Float(f) => f.to_string(),
        CqlValue::Double(f) => f.to_string(),
        CqlValue::Counter(c) => c.0.to_string(),
        CqlValue::Uuid(u) => u.to_string(),
        CqlValue::Timeuuid(u) => u.to_string(),
        CqlValue::Timestamp(ts) => timestamp_text(ts),
        CqlValue::Date(d) => date_text(d),
        CqlValue::Time(t) => time_text(t),
        CqlValue::Duration(d) => duration_text(d),
        CqlValue::Varint(v) => varint_text(v),
        CqlValue::Decimal(d) => decimal_text(d),
        CqlValue::Inet(ip) => ip.to_string(),
        CqlValue::Blob(bytes) => hex(bytes),
        CqlValue::Empty => String::new(),
        CqlValue::List(_)
        | CqlValue::Set(_)
        | CqlValue::Map(_)
        | CqlValue::Tuple(_)
        | CqlValue::UserDefinedType { .. } => cql_value_to_json(v).to_string(),
    }
}

/// Convert a CQL value into JSON, recursing through collections.
#[must_use]
pub fn cql_value_to_json(v: &CqlValue) -> Value {
    match v {
        CqlValue::Boolean(b) => Value::Bool(*b),
        CqlValue::Int(i) => Value::from(*i),
        CqlValue::BigInt(i) => Value::from(*i),
        CqlValue::SmallInt(i) => Value::from(*i),
        CqlValue::TinyInt(i) => Value::from(*i),
        CqlValue::Float(f) => Value::from(*f),
        CqlValue::Double(f) => Value::from(*f),
        CqlValue::Ascii(s) | CqlValue::Text(s) => Value::from(s.clone()),
        CqlValue::List(items) | CqlValue::Set(items) => {
            Value::Array(items.iter().map(cql_value_to_json).collect())
        }
        CqlValue::Map(entries) => Value::Object(
            entries
                .iter()
                .map(|(k, v)| (map_key(k), cql_value_to_json(v)))
                .collect(),
        ),
        CqlValue::Tuple(values) => Value::Array(
            values
                .iter()
                .map(|opt| opt.as_ref().map_or(Value::Null, cql_value_to_json))
                .collect(),
        ),
        CqlValue::UserDefinedType { fields, .. } => Value::Object(
            fields
                .iter()
                .map(|(name, opt)| {
                    (
                        name.clone(),
                        opt.as_ref().map_or(Value::Null, cql_value_to_json),
                    )
                })
                .collect(),
        ),
        other => Value::from(cql_value_to_text(other)),
    }
}

fn map_key(k: &CqlValue) -> String {
    match k {
        CqlValue::Ascii(s) | CqlValue::Text(s) => s.clone(),
        other => cql_value_to_text(other),
    }
}

/// Milliseconds since the epoch as RFC 3339 UTC, raw millis when out of range.
fn timestamp_text(&CqlTimestamp(millis): &CqlTimestamp) -> String {
    DateTime::from_timestamp_millis(millis).map_or_else(
        || millis.to_string(),
        |dt| dt.to_rfc3339_opts(SecondsFormat::Millis, true),
    )
}

fn date_text(&CqlDate(days): &CqlDate) -> String {
    let offset = i64::from(days) - CQL_DATE_EPOCH;
    NaiveDate::from_ymd_opt(1970, 1, 1)
        .zip(TimeDelta::try_days(offset))
        .and_then(|(epoch, delta)| epoch.checked_add_signed(delta))
        .map_or_else(|| offset.to_string(), |d| d.to_string())
}

fn time_text(&CqlTime(nanos): &CqlTime) -> String {
    let secs = u32::try_from(nanos.div_euclid(1_000_000_000)).ok();
    let frac = u32::try_from(nanos.rem_euclid(1_000_000_000)).ok();
    secs.zip(frac)
        .and_then(|(s, n)| NaiveTime::from_num_seconds_from_midnight_opt(s, n))
        .map_or_else(|| nanos.to_string(), |t| t.to_string())
}

/// CQL duration literal form, e.g. `1mo2d3000000000ns`.
fn duration_text(d: &CqlDuration) -> String {
    let mut out = String::new();
    for (amount, unit) in [
        (i64::from(d.months), "mo"),
        (i64::from(d.days), "d"),
        (d.nanoseconds, "ns"),
    ] {
        if amount != 0 {
            let _ = write!(out, "{amount}{unit}");
        }
    }
    if out.is_empty() {
        out.push_str("0ns");
    }
    out
}

/// Big-endian two's complement bytes as an integer, when they fit in 128 bits.
fn signed_be_to_i128(bytes: &[u8]) -> Option<i128> {
    if bytes.len() > 16 {
        return None;
    }
    let fill = if bytes.first().is_some_and(|b| b & 0x80 != 0) {
        0xff
    } else {
        0x00
    };
    let mut buf = [fill; 16];
    buf[16 - bytes.len()..].copy_from_slice(bytes);
    Some(i128::from_be_bytes(buf))
}

fn varint_text(v: &CqlVarint) -> String {
    let bytes = v.as_signed_bytes_be_slice();
    signed_be_to_i128(bytes).map_or_else(|| hex(bytes), |n| n.to_string())
}

fn decimal_text(d: &CqlDecimal) -> String {
    let (bytes, scale) = d.as_signed_be_bytes_slice_and_exponent();
    let Some(unscaled) = signed_be_to_i128(bytes) else {
        return format!("{}e{}", hex(bytes), -scale);
    };
    if scale <= 0 {
        let zeros = usize::try_from(scale.unsigned_abs()).unwrap_or(0);
        return if unscaled == 0 {
            "0".to_string()
        } else {
            format!("{unscaled}{}", "0".repeat(zeros))
        };
    }

    let scale = usize::try_from(scale.unsigned_abs()).unwrap_or(0);
    let digits = unscaled.unsigned_abs().to_string();
    let padded = format!("{digits:0>width$}", width = scale + 1);
    let (int_part, frac_part) = padded.split_at(padded.len() - scale);
    let sign = if unscaled < 0 { "-" } else { "" };
    format!("{sign}{int_part}.{frac_part}")
}

fn hex(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(2 + bytes.len() * 2);
    out.push_str("0x");
    for b in bytes {
        let _ = write!(out, "{b:02x}");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalars() {
        assert_eq!(cql_value_to_text(&CqlValue::Text("hi".into())), "hi");
        assert_eq!(cql_value_to_text(&CqlValue::Int(-4)), "-4");
        assert_eq!(cql_value_to_text(&CqlValue::Boolean(true)), "true");
        assert_eq!(cql_value_to_text(&CqlValue::Blob(vec![0xde, 0xad])), "0xdead");
    }

    #[test]
    fn test_collections_render_as_json() {
        let map = CqlValue::Map(vec![(
            CqlValue::Text("tags".into()),
            CqlValue::List(vec![CqlValue::Int(1), CqlValue::Int(2)]),
        )]);
        assert_eq!(cql_value_to_text(&map), r#"{"tags":[1,2]}"#);

        let tuple = CqlValue::Tuple(vec![Some(CqlValue::Text("a".into())), None]);
        assert_eq!(cql_value_to_text(&tuple), r#"["a",null]"#);
    }

    #[test]
    fn test_timestamp_as_rfc3339() {
        let ts = CqlValue::Timestamp(CqlTimestamp(1_700_000_000_000));
        assert_eq!(cql_value_to_text(&ts), "2023-11-14T22:13:20.000Z");

        let before_epoch = CqlValue::Timestamp(CqlTimestamp(-1));
        assert_eq!(cql_value_to_text(&before_epoch), "1969-12-31T23:59:59.999Z");
    }

    #[test]
    fn test_date_and_time() {
        assert_eq!(cql_value_to_text(&CqlValue::Date(CqlDate(1 << 31))), "1970-01-01");
        assert_eq!(
            cql_value_to_text(&CqlValue::Date(CqlDate((1 << 31) + 19_675))),
            "2023-11-14"
        );
        assert_eq!(
            cql_value_to_text(&CqlValue::Date(CqlDate((1 << 31) - 1))),
            "1969-12-31"
        );

        let half_past_one = (13 * 3600 + 30 * 60) * 1_000_000_000;
        assert_eq!(
            cql_value_to_text(&CqlValue::Time(CqlTime(half_past_one))),
            "13:30:00"
        );
        assert_eq!(
            cql_value_to_text(&CqlValue::Time(CqlTime(half_past_one + 500_000_000))),
            "13:30:00.500"
        );
    }

    #[test]
    fn test_timeuuid_uses_hyphenated_form() {
        let raw = "8e14e760-7fa8-11eb-bc66-000000000001";
        let uuid = uuid::Uuid::parse_str(raw).unwrap();
        let value = CqlValue::Timeuuid(uuid.into());
        assert_eq!(cql_value_to_text(&value), raw);
        assert_eq!(cql_value_to_json(&value), Value::from(raw));
    }

    #[test]
    fn test_duration() {
        let d = CqlDuration {
            months: 1,
            days: 2,
            nanoseconds: 3_000_000_000,
        };
        assert_eq!(cql_value_to_text(&CqlValue::Duration(d)), "1mo2d3000000000ns");

        let zero = CqlDuration {
            months: 0,
            days: 0,
            nanoseconds: 0,
        };
        assert_eq!(cql_value_to_text(&CqlValue::Duration(zero)), "0ns");
    }

    #[test]
    fn test_varint_as_integer() {
        let v = CqlVarint::from_signed_bytes_be(vec![0x01, 0x00]);
        assert_eq!(cql_value_to_text(&CqlValue::Varint(v)), "256");

        let neg = CqlVarint::from_signed_bytes_be(vec![0xff]);
        assert_eq!(cql_value_to_text(&CqlValue::Varint(neg)), "-1");

        let huge = CqlVarint::from_signed_bytes_be(vec![0x01; 17]);
        assert!(cql_value_to_text(&CqlValue::Varint(huge)).starts_with("0x0101"));
    }

    #[test]
    fn test_decimal_places_point_by_scale() {
        let price = CqlDecimal::from_signed_be_bytes_and_exponent(vec![0x04, 0xd2], 2);
        assert_eq!(cql_value_to_text(&CqlValue::Decimal(price)), "12.34");

        let small = CqlDecimal::from_signed_be_bytes_and_exponent(vec![0xfb], 3);
        assert_eq!(cql_value_to_text(&CqlValue::Decimal(small)), "-0.005");

        let whole = CqlDecimal::from_signed_be_bytes_and_exponent(vec![0x07], -2);
        assert_eq!(cql_value_to_text(&CqlValue::Decimal(whole)), "700");
    }
}
