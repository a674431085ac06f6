//! Converters that normalize raw nvidia-smi values

use super::error::{NvsmiError, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use std::str::FromStr;

static PSTATE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^P(\d+)").expect("valid regex"));

/// Closed set of value conversions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Converter {
    /// Base-16 numeral (optionally `0x` prefixed) to base-10
    HexToDecimal,
    /// "Enabled" -> "1", anything else -> "0"
    Enabled,
    /// "Active" -> "1", anything else (e.g. "Not Active") -> "0"
    Active,
    /// "P8" -> "8"
    PState,
    /// Pass-through
    Identity,
}

impl Converter {
    pub const ALL: [Converter; 5] = [
        Converter::HexToDecimal,
        Converter::Enabled,
        Converter::Active,
        Converter::PState,
        Converter::Identity,
    ];

    /// Registered name of this converter
    pub fn name(&self) -> &'static str {
        match self {
            Converter::HexToDecimal => "hex_to_dec",
            Converter::Enabled => "enabled",
            Converter::Active => "active",
            Converter::PState => "pstate",
            Converter::Identity => "identity",
        }
    }

    /// Look up a converter by its registered name
    pub fn from_name(name: &str) -> Result<Self> {
        match name.to_ascii_lowercase().as_str() {
            "hex_to_dec" | "hex_to_decimal" => Ok(Converter::HexToDecimal),
            "enabled" => Ok(Converter::Enabled),
            "active" => Ok(Converter::Active),
            "pstate" => Ok(Converter::PState),
            "identity" => Ok(Converter::Identity),
            _ => Err(NvsmiError::UnknownConverter(name.to_string())),
        }
    }

    /// Normalize one raw value
    pub fn apply(&self, raw: &str) -> Result<String> {
        match self {
            Converter::HexToDecimal => hex_to_decimal(raw),
            Converter::Enabled => Ok(flag(raw, "enabled")),
            Converter::Active => Ok(flag(raw, "active")),
            Converter::PState => pstate(raw),
            Converter::Identity => Ok(raw.to_string()),
        }
    }
}

impl fmt::Display for Converter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Converter {
    type Err = NvsmiError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_name(s)
    }
}

/// Convert `raw` with the converter registered as `name`
pub fn convert(name: &str, raw: &str) -> Result<String> {
    Converter::from_name(name)?.apply(raw)
}

fn hex_to_decimal(raw: &str) -> Result<String> {
    let trimmed = raw.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);

    // from_str_radix accepts a leading sign, hex numerals never carry one
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(malformed(Converter::HexToDecimal, raw));
    }

    u128::from_str_radix(digits, 16)
        .map(|v| v.to_string())
        .map_err(|_| malformed(Converter::HexToDecimal, raw))
}

fn flag(raw: &str, on: &str) -> String {
    if raw.eq_ignore_ascii_case(on) {
        "1".to_string()
    } else {
        "0".to_string()
    }
}

fn pstate(raw: &str) -> Result<String> {
    PSTATE_RE
        .captures(raw)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| malformed(Converter::PState, raw))
}

fn malformed(converter: Converter, raw: &str) -> NvsmiError {
    NvsmiError::MalformedInput {
        converter: converter.name(),
        raw: raw.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_to_decimal() {
        assert_eq!(Converter::HexToDecimal.apply("1a").unwrap(), "26");
        assert_eq!(Converter::HexToDecimal.apply("0x01").unwrap(), "1");
        assert_eq!(Converter::HexToDecimal.apply("0X1A").unwrap(), "26");
        assert_eq!(Converter::HexToDecimal.apply("00000000").unwrap(), "0");
        assert_eq!(
            Converter::HexToDecimal.apply("0x00000000000001FF").unwrap(),
            "511"
        );
    }

    #[test]
    fn test_hex_to_decimal_rejects_garbage() {
        for raw in ["", "0x", "zz", "-1a", "+1a", "[N/A]", "1a 2b"] {
            let err = Converter::HexToDecimal.apply(raw).unwrap_err();
            assert!(
                matches!(err, NvsmiError::MalformedInput { converter: "hex_to_dec", .. }),
                "{raw:?} gave {err:?}"
            );
        }
    }

    #[test]
    fn test_enabled_flag() {
        assert_eq!(Converter::Enabled.apply("Enabled").unwrap(), "1");
        assert_eq!(Converter::Enabled.apply("enabled").unwrap(), "1");
        assert_eq!(Converter::Enabled.apply("Disabled").unwrap(), "0");
        assert_eq!(Converter::Enabled.apply("anything else").unwrap(), "0");
    }

    #[test]
    fn test_active_flag() {
        assert_eq!(Converter::Active.apply("Active").unwrap(), "1");
        assert_eq!(Converter::Active.apply("ACTIVE").unwrap(), "1");
        assert_eq!(Converter::Active.apply("Not Active").unwrap(), "0");
    }

    #[test]
    fn test_pstate() {
        assert_eq!(Converter::PState.apply("P8").unwrap(), "8");
        assert_eq!(Converter::PState.apply("P12").unwrap(), "12");

        for raw in ["8", "p8", "P", "Unknown"] {
            assert!(matches!(
                Converter::PState.apply(raw),
                Err(NvsmiError::MalformedInput { converter: "pstate", .. })
            ));
        }
    }

    #[test]
    fn test_identity_passes_through() {
        assert_eq!(Converter::Identity.apply(" 45 ").unwrap(), " 45 ");
    }

    #[test]
    fn test_convert_by_name() {
        assert_eq!(convert("hex_to_dec", "a0").unwrap(), "160");
        assert_eq!(convert("hex_to_decimal", "a0").unwrap(), "160");
        assert!(matches!(
            convert("celsius", "45"),
            Err(NvsmiError::UnknownConverter(name)) if name == "celsius"
        ));
    }

    #[test]
    fn test_names_round_trip() {
        for converter in Converter::ALL {
            assert_eq!(converter.name().parse::<Converter>().unwrap(), converter);
        }
    }
}
