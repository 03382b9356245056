//! Core domain types for key derivation.

use std::borrow::Cow;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::Amount;
use crate::ik::TimeBand;

/// One attribute of a payment, named by its schema code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    /// Receiver bank code.
    Rbc,
    /// Receiver account number.
    Ran,
    /// Sender bank code.
    Sbc,
    /// Sender account number.
    San,
    /// Transaction timestamp.
    Ttc,
    /// Transaction amount.
    Tamt,
    /// Internal transaction narration.
    Itn,
    /// Client type.
    Ctype,
    /// Client device id.
    Cid,
    /// Client location.
    Cloc,
}

impl Field {
    pub const ALL: [Field; 10] = [
        Field::Rbc,
        Field::Ran,
        Field::Sbc,
        Field::San,
        Field::Ttc,
        Field::Tamt,
        Field::Itn,
        Field::Ctype,
        Field::Cid,
        Field::Cloc,
    ];

    pub fn code(self) -> &'static str {
        match self {
            Field::Rbc => "RBC",
            Field::Ran => "RAN",
            Field::Sbc => "SBC",
            Field::San => "SAN",
            Field::Ttc => "TTC",
            Field::Tamt => "TAMT",
            Field::Itn => "ITN",
            Field::Ctype => "CTYPE",
            Field::Cid => "CID",
            Field::Cloc => "CLOC",
        }
    }

    /// Optional fields default to the empty string.
    pub fn is_required(self) -> bool {
        !matches!(self, Field::Itn | Field::Cid)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Transaction amount as submitted: either a decimal string or a number.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawAmount {
    Number(f64),
    Text(String),
}

impl From<&str> for RawAmount {
    fn from(value: &str) -> Self {
        RawAmount::Text(value.to_string())
    }
}

impl From<String> for RawAmount {
    fn from(value: String) -> Self {
        RawAmount::Text(value)
    }
}

impl From<f64> for RawAmount {
    fn from(value: f64) -> Self {
        RawAmount::Number(value)
    }
}

/// Payment attributes as received from the submission layer, before any validation.
///
/// Every field is optional at this stage so that an absent required field
/// surfaces as a normalization error instead of a deserialization failure.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "UPPERCASE", default)]
pub struct RawAttributes {
    pub rbc: Option<String>,
    pub ran: Option<String>,
    pub sbc: Option<String>,
    pub san: Option<String>,
    /// RFC 3339 timestamp with an explicit offset.
    pub ttc: Option<String>,
    pub tamt: Option<RawAmount>,
    pub itn: Option<String>,
    pub ctype: Option<String>,
    pub cid: Option<String>,
    pub cloc: Option<String>,
}

impl RawAttributes {
    /// Set a field from its textual form.
    pub fn set(&mut self, field: Field, value: impl Into<String>) -> &mut Self {
        let value = Some(value.into());
        match field {
            Field::Rbc => self.rbc = value,
            Field::Ran => self.ran = value,
            Field::Sbc => self.sbc = value,
            Field::San => self.san = value,
            Field::Ttc => self.ttc = value,
            Field::Tamt => self.tamt = value.map(RawAmount::Text),
            Field::Itn => self.itn = value,
            Field::Ctype => self.ctype = value,
            Field::Cid => self.cid = value,
            Field::Cloc => self.cloc = value,
        }
        self
    }

    /// Remove a field entirely.
    pub fn clear(&mut self, field: Field) -> &mut Self {
        match field {
            Field::Rbc => self.rbc = None,
            Field::Ran => self.ran = None,
            Field::Sbc => self.sbc = None,
            Field::San => self.san = None,
            Field::Ttc => self.ttc = None,
            Field::Tamt => self.tamt = None,
            Field::Itn => self.itn = None,
            Field::Ctype => self.ctype = None,
            Field::Cid => self.cid = None,
            Field::Cloc => self.cloc = None,
        }
        self
    }
}

/// A validated transaction with every attribute in canonical form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentAttributes {
    pub rbc: String,
    pub ran: String,
    pub sbc: String,
    pub san: String,
    pub ttc: DateTime<Utc>,
    pub tamt: Amount,
    /// Empty when not supplied.
    pub itn: String,
    pub ctype: String,
    /// Empty when not supplied.
    pub cid: String,
    pub cloc: String,
}

/// Sender-side hash input: SBC, SAN, band, TAMT, ITN, CTYPE, CID, CLOC.
#[derive(Debug, Clone, Copy)]
pub struct SenderHashInput<'a> {
    attrs: &'a PaymentAttributes,
    band: TimeBand,
}

impl<'a> SenderHashInput<'a> {
    pub fn new(attrs: &'a PaymentAttributes, band: TimeBand) -> Self {
        Self { attrs, band }
    }

    /// Canonical field values in schema order.
    pub fn fields(&self) -> Vec<Cow<'a, str>> {
        let a = self.attrs;
        vec![
            Cow::Borrowed(a.sbc.as_str()),
            Cow::Borrowed(a.san.as_str()),
            Cow::Owned(self.band.id().to_string()),
            Cow::Owned(a.tamt.to_string()),
            Cow::Borrowed(a.itn.as_str()),
            Cow::Borrowed(a.ctype.as_str()),
            Cow::Borrowed(a.cid.as_str()),
            Cow::Borrowed(a.cloc.as_str()),
        ]
    }
}

/// Receiver-side hash input: RBC, RAN.
#[derive(Debug, Clone, Copy)]
pub struct ReceiverHashInput<'a> {
    attrs: &'a PaymentAttributes,
}

impl<'a> ReceiverHashInput<'a> {
    pub fn new(attrs: &'a PaymentAttributes) -> Self {
        Self { attrs }
    }

    /// Canonical field values in schema order.
    pub fn fields(&self) -> Vec<Cow<'a, str>> {
        vec![
            Cow::Borrowed(self.attrs.rbc.as_str()),
            Cow::Borrowed(self.attrs.ran.as_str()),
        ]
    }
}
