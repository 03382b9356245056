//! Field schema and normalization.
//!
//! Canonical forms:
//! - RBC, SBC, CLOC: trimmed, ASCII upper-case
//! - RAN, SAN, CID: trimmed
//! - ITN, CTYPE: trimmed, ASCII upper-case, checked against the configured domain
//! - TAMT: see [`Amount`]
//! - TTC: converted to UTC

use chrono::{DateTime, Utc};

use crate::Amount;
use crate::config::{Config, canonical_code};
use crate::model::{Field, PaymentAttributes, RawAmount, RawAttributes};

use super::NormalizeError;

/// Validate raw attributes and bring every field to its canonical form.
pub fn normalize(raw: &RawAttributes, config: &Config) -> Result<PaymentAttributes, NormalizeError> {
    Ok(PaymentAttributes {
        rbc: required(Field::Rbc, raw.rbc.as_deref())?.to_ascii_uppercase(),
        ran: required(Field::Ran, raw.ran.as_deref())?.to_string(),
        sbc: required(Field::Sbc, raw.sbc.as_deref())?.to_ascii_uppercase(),
        san: required(Field::San, raw.san.as_deref())?.to_string(),
        ttc: parse_timestamp(required(Field::Ttc, raw.ttc.as_deref())?)?,
        tamt: amount(raw.tamt.as_ref())?,
        itn: enumerated(Field::Itn, raw.itn.as_deref(), config)?,
        ctype: enumerated(Field::Ctype, raw.ctype.as_deref(), config)?,
        cid: optional(raw.cid.as_deref()).to_string(),
        cloc: required(Field::Cloc, raw.cloc.as_deref())?.to_ascii_uppercase(),
    })
}

/// Parse an RFC 3339 timestamp carrying an explicit offset and convert it to UTC.
pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, NormalizeError> {
    DateTime::parse_from_rfc3339(value.trim())
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| NormalizeError::InvalidTimestamp {
            value: value.to_string(),
            reason: e.to_string(),
        })
}

fn required(field: Field, value: Option<&str>) -> Result<&str, NormalizeError> {
    match optional(value) {
        "" => Err(NormalizeError::MissingField(field)),
        value => Ok(value),
    }
}

/// Absent and blank optional fields both become the empty string.
fn optional(value: Option<&str>) -> &str {
    value.map(str::trim).unwrap_or_default()
}

fn amount(value: Option<&RawAmount>) -> Result<Amount, NormalizeError> {
    let amount = match value {
        None => return Err(NormalizeError::MissingField(Field::Tamt)),
        Some(RawAmount::Text(text)) if text.trim().is_empty() => {
            return Err(NormalizeError::MissingField(Field::Tamt));
        }
        Some(RawAmount::Text(text)) => text.parse::<Amount>()?,
        Some(RawAmount::Number(number)) => Amount::from_float(*number)?,
    };
    Ok(amount)
}

fn enumerated(field: Field, value: Option<&str>, config: &Config) -> Result<String, NormalizeError> {
    let code = canonical_code(optional(value));
    let domain = match field {
        Field::Itn => &config.itn_domain,
        _ => &config.ctype_domain,
    };
    if code.is_empty() {
        return if field.is_required() {
            Err(NormalizeError::MissingField(field))
        } else {
            Ok(code)
        };
    }
    if !domain.contains(&code) {
        return Err(NormalizeError::InvalidEnum { field, value: code });
    }
    Ok(code)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::amount::AmountError;
    use chrono::TimeZone;

    fn config() -> Config {
        Config {
            itn_domain: ["TRANSFER".to_string()].into(),
            ..Config::default()
        }
    }

    fn raw() -> RawAttributes {
        let mut raw = RawAttributes::default();
        raw.set(Field::Rbc, "001")
            .set(Field::Ran, "1000000010")
            .set(Field::Sbc, "002")
            .set(Field::San, "2000000020")
            .set(Field::Ttc, "2024-01-01T10:07:00Z")
            .set(Field::Tamt, "500.00")
            .set(Field::Ctype, "WEB_APP")
            .set(Field::Cloc, "LAGOS-NG");
        raw
    }

    #[test]
    fn normalize_valid_input() {
        let attrs = normalize(&raw(), &config()).unwrap();
        assert_eq!(attrs.rbc, "001");
        assert_eq!(attrs.ran, "1000000010");
        assert_eq!(attrs.ttc, Utc.with_ymd_and_hms(2024, 1, 1, 10, 7, 0).unwrap());
        assert_eq!(attrs.tamt, Amount::from_scaled(50_000));
        assert_eq!(attrs.itn, "");
        assert_eq!(attrs.ctype, "WEB_APP");
        assert_eq!(attrs.cid, "");
        assert_eq!(attrs.cloc, "LAGOS-NG");
    }

    #[test]
    fn casing_and_whitespace_are_canonicalized() {
        let mut messy = raw();
        messy
            .set(Field::Rbc, "  gtb ")
            .set(Field::Ran, " 1000000010\t")
            .set(Field::Ctype, " web_app")
            .set(Field::Itn, "transfer ")
            .set(Field::Cid, " Device-1 ")
            .set(Field::Cloc, "lagos-ng");

        let attrs = normalize(&messy, &config()).unwrap();
        assert_eq!(attrs.rbc, "GTB");
        assert_eq!(attrs.ran, "1000000010");
        assert_eq!(attrs.ctype, "WEB_APP");
        assert_eq!(attrs.itn, "TRANSFER");
        // Device ids keep their case
        assert_eq!(attrs.cid, "Device-1");
        assert_eq!(attrs.cloc, "LAGOS-NG");
    }

    #[test]
    fn offset_timestamps_are_converted_to_utc() {
        let mut lagos = raw();
        lagos.set(Field::Ttc, "2024-01-01T11:07:00+01:00");
        let attrs = normalize(&lagos, &config()).unwrap();
        assert_eq!(attrs.ttc, Utc.with_ymd_and_hms(2024, 1, 1, 10, 7, 0).unwrap());
    }

    #[test]
    fn missing_required_fields_are_reported() {
        for field in Field::ALL.into_iter().filter(|f| f.is_required()) {
            let mut absent = raw();
            absent.clear(field);
            assert_eq!(
                normalize(&absent, &config()),
                Err(NormalizeError::MissingField(field)),
                "{field} absent"
            );

            let mut blank = raw();
            blank.set(field, "   ");
            assert_eq!(
                normalize(&blank, &config()),
                Err(NormalizeError::MissingField(field)),
                "{field} blank"
            );
        }
    }

    #[test]
    fn optional_fields_default_to_empty() {
        let mut explicit = raw();
        explicit.set(Field::Itn, "").set(Field::Cid, "  ");
        assert_eq!(
            normalize(&explicit, &config()).unwrap(),
            normalize(&raw(), &config()).unwrap()
        );
    }

    #[test]
    fn unknown_ctype_is_rejected() {
        let mut input = raw();
        input.set(Field::Ctype, "kiosk");
        assert_eq!(
            normalize(&input, &config()),
            Err(NormalizeError::InvalidEnum {
                field: Field::Ctype,
                value: "KIOSK".to_string()
            })
        );
    }

    #[test]
    fn unknown_itn_is_rejected() {
        let mut input = raw();
        input.set(Field::Itn, "refund");
        let err = normalize(&input, &config()).unwrap_err();
        assert!(matches!(err, NormalizeError::InvalidEnum { field: Field::Itn, .. }));
        assert_eq!(err.field(), Field::Itn);
    }

    #[test]
    fn any_itn_is_rejected_when_domain_is_empty() {
        let mut input = raw();
        input.set(Field::Itn, "TRANSFER");
        assert!(matches!(
            normalize(&input, &Config::default()),
            Err(NormalizeError::InvalidEnum { field: Field::Itn, .. })
        ));
    }

    #[test]
    fn negative_amount_is_rejected() {
        let mut input = raw();
        input.set(Field::Tamt, "-500.00");
        let err = normalize(&input, &config()).unwrap_err();
        assert_eq!(
            err,
            NormalizeError::InvalidAmount(AmountError::Negative("-500.00".to_string()))
        );
        assert_eq!(err.field(), Field::Tamt);
    }

    #[test]
    fn unparsable_amount_is_rejected() {
        let mut input = raw();
        input.set(Field::Tamt, "five hundred");
        assert!(matches!(
            normalize(&input, &config()),
            Err(NormalizeError::InvalidAmount(AmountError::Malformed(_)))
        ));
    }

    #[test]
    fn numeric_amount_matches_text_amount() {
        let mut numeric = raw();
        numeric.tamt = Some(RawAmount::Number(500.0));
        assert_eq!(
            normalize(&numeric, &config()).unwrap(),
            normalize(&raw(), &config()).unwrap()
        );
    }

    #[test]
    fn zero_amount_is_accepted() {
        let mut input = raw();
        input.set(Field::Tamt, "0");
        assert_eq!(normalize(&input, &config()).unwrap().tamt, Amount::default());
    }

    #[test]
    fn invalid_timestamps_are_rejected() {
        for ttc in ["yesterday", "2024-01-01T10:07:00", "2024-13-01T10:07:00Z"] {
            let mut input = raw();
            input.set(Field::Ttc, ttc);
            let err = normalize(&input, &config()).unwrap_err();
            assert!(
                matches!(err, NormalizeError::InvalidTimestamp { .. }),
                "{ttc} should be invalid"
            );
            assert_eq!(err.field(), Field::Ttc);
        }
    }
}
