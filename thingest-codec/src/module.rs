use thingest_types::RawMeasurement;

use crate::DecodeError;

/// Numeric semantics of one packed-hex field. Sign and scale are declared
/// properties of the module's field table, never inferred from payloads.
#[derive(Clone, Copy, Debug, PartialEq)]
enum HexKind {
    /// Unsigned integer.
    Unsigned,
    /// Signed two's-complement over the field's nibble width.
    Signed,
    /// Raw flag bits, passed through as lowercased hex.
    Bits,
}

struct HexField {
    name: &'static str,
    nibbles: usize,
    kind: HexKind,
    /// Decimal divisor applied to numeric fields, 1 for none.
    scale: u32,
}

const P1_FIELDS: &[&str] = &["mcc", "mnc", "lac", "cell_id", "dbm"];

const B_FIELDS: &[&str] = &[
    "voltage",
    "state",
    "charger",
    "charging",
    "mode",
    "disconnection",
];
const B_EXTENDED_FIELDS: &[&str] = &["battery_level", "temperature"];

const C1_FIELDS: &[HexField] = &[
    HexField { name: "mcc", nibbles: 4, kind: HexKind::Unsigned, scale: 1 },
    HexField { name: "mnc", nibbles: 4, kind: HexKind::Unsigned, scale: 1 },
    HexField { name: "lac", nibbles: 4, kind: HexKind::Bits, scale: 1 },
    HexField { name: "cell_id", nibbles: 4, kind: HexKind::Bits, scale: 1 },
];

const T1_FIELDS: &[HexField] = &[
    HexField { name: "temperature", nibbles: 4, kind: HexKind::Signed, scale: 10 },
    HexField { name: "humidity", nibbles: 4, kind: HexKind::Unsigned, scale: 1 },
];

/// The closed set of supported device-side measurement formats. Adding a
/// module is adding a variant together with its field table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Module {
    /// GSM cell report as a comma separated token list:
    /// `214,7,d22,b00,-64,`.
    P1,
    /// Battery report as a token list with a 6 field mandatory variant and
    /// an 8 field extended variant: `4.70,1,1,1,1,0[,9,18]`.
    B,
    /// GSM cell report packed into 16 hex digits: `00D600070d220b00`.
    C1,
    /// Temperature/humidity report packed into 8 hex digits.
    T1,
}

impl Module {
    /// Resolve a raw key to a module identifier.
    pub fn from_key(key: &str) -> Option<Module> {
        match key {
            "P1" => Some(Module::P1),
            "B" => Some(Module::B),
            "C1" => Some(Module::C1),
            "T1" => Some(Module::T1),
            _ => None,
        }
    }

    pub fn id(&self) -> &'static str {
        match self {
            Module::P1 => "P1",
            Module::B => "B",
            Module::C1 => "C1",
            Module::T1 => "T1",
        }
    }

    /// Decode one module sub-value string into raw measurements, one per
    /// field in field-table order. Raw keys are `<module>_<field>`.
    pub fn decode(&self, raw: &str) -> Result<Vec<RawMeasurement>, DecodeError> {
        match self {
            Module::P1 => decode_token_list(self.id(), P1_FIELDS, &[], raw),
            Module::B => decode_token_list(self.id(), B_FIELDS, B_EXTENDED_FIELDS, raw),
            Module::C1 => decode_packed_hex(self.id(), C1_FIELDS, raw),
            Module::T1 => decode_packed_hex(self.id(), T1_FIELDS, raw),
        }
    }
}

fn field_key(module: &str, field: &str) -> String {
    format!("{module}_{field}")
}

fn decode_token_list(
    module: &'static str,
    mandatory: &[&'static str],
    extended: &[&'static str],
    raw: &str,
) -> Result<Vec<RawMeasurement>, DecodeError> {
    let mut tokens: Vec<&str> = raw.split(',').collect();
    /* A trailing delimiter produces empty tokens that are never counted as fields */
    while tokens.last() == Some(&"") {
        tokens.pop();
    }

    let fields: Vec<&'static str> = if tokens.len() == mandatory.len() {
        mandatory.to_vec()
    } else if !extended.is_empty() && tokens.len() == mandatory.len() + extended.len() {
        mandatory.iter().chain(extended.iter()).copied().collect()
    } else {
        return Err(DecodeError::UnknownVariant {
            module,
            count: tokens.len(),
        });
    };

    Ok(fields
        .iter()
        .zip(tokens)
        .map(|(field, token)| RawMeasurement::new(field_key(module, field), token))
        .collect())
}

fn decode_packed_hex(
    module: &'static str,
    fields: &[HexField],
    raw: &str,
) -> Result<Vec<RawMeasurement>, DecodeError> {
    let expected: usize = fields.iter().map(|f| f.nibbles).sum();
    if raw.len() != expected {
        return Err(DecodeError::LengthMismatch {
            module,
            expected,
            actual: raw.len(),
        });
    }
    if !raw.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(DecodeError::InvalidHexDigit {
            module,
            payload: raw.to_string(),
        });
    }

    let mut out = Vec::with_capacity(fields.len());
    let mut pos = 0;
    for field in fields {
        let slice = &raw[pos..pos + field.nibbles];
        pos += field.nibbles;

        let value = match field.kind {
            HexKind::Bits => slice.to_ascii_lowercase(),
            HexKind::Unsigned => {
                let v = u64::from_str_radix(slice, 16).map_err(|_| {
                    DecodeError::InvalidHexDigit {
                        module,
                        payload: raw.to_string(),
                    }
                })?;
                scale_value(v as f64, field.scale)
            }
            HexKind::Signed => {
                let v = i64::from_str_radix(slice, 16).map_err(|_| {
                    DecodeError::InvalidHexDigit {
                        module,
                        payload: raw.to_string(),
                    }
                })?;
                let bits = field.nibbles as u32 * 4;
                let signed = if v >= 1 << (bits - 1) { v - (1 << bits) } else { v };
                scale_value(signed as f64, field.scale)
            }
        };
        out.push(RawMeasurement::new(field_key(module, field.name), value));
    }
    Ok(out)
}

fn scale_value(value: f64, scale: u32) -> String {
    if scale == 1 {
        format!("{}", value as i64)
    } else {
        format!("{}", value / scale as f64)
    }
}
