//! Condition-code normalization.
//!
//! Every provider ships its own closed vocabulary of condition codes; the
//! converter maps each of them onto the two destination vocabularies
//! ("yahoo" numeric codes and "meteo" glyph codes) that downstream UIs
//! render against. A code the tables don't know degrades to the sentinel
//! pair instead of failing the whole reduction.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use tracing::warn;

use crate::error::ConversionError;
use crate::provider::ProviderId;

pub mod tables;

use self::tables::{CodeRow, DescRow};

/// Destination vocabulary names, in display order.
pub const DESTINATIONS: &[&str] = &["yahoo", "meteo"];

/// msn codes are looked up by their fixed 4-character prefix; anything
/// beyond that is the windy-flag modifier.
const MSN_CODE_LEN: usize = 4;

/// The pair of destination codes for one source code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IconPair {
    pub yahoo: &'static str,
    pub meteo: &'static str,
}

/// Sentinel returned when a code is not present in the conversion table.
/// `")"` is the meteo na-glyph.
pub const NA_PAIR: IconPair = IconPair { yahoo: "NA", meteo: ")" };

impl IconPair {
    /// True for the sentinel produced by a table miss.
    pub fn is_na(&self) -> bool {
        self.yahoo == "NA"
    }
}

static MSN_INDEX: Lazy<HashMap<&'static str, (&'static str, &'static str)>> =
    Lazy::new(|| tables::MSN_CODES.iter().copied().collect());

static OPENMETEO_INDEX: Lazy<HashMap<&'static str, (&'static str, &'static str)>> =
    Lazy::new(|| tables::OPENMETEO_CODES.iter().copied().collect());

static OPENWEATHER_INDEX: Lazy<HashMap<&'static str, (&'static str, &'static str)>> =
    Lazy::new(|| tables::OPENWEATHER_CODES.iter().copied().collect());

fn index(provider: ProviderId) -> &'static HashMap<&'static str, (&'static str, &'static str)> {
    match provider {
        ProviderId::Msn => &MSN_INDEX,
        ProviderId::OpenMeteo => &OPENMETEO_INDEX,
        ProviderId::OpenWeather => &OPENWEATHER_INDEX,
    }
}

/// The ordered conversion table of a source vocabulary.
pub fn source_codes(source: &str) -> Result<&'static [CodeRow], ConversionError> {
    match source.to_lowercase().as_str() {
        "msn" => Ok(tables::MSN_CODES),
        "openmeteo" => Ok(tables::OPENMETEO_CODES),
        "openweather" => Ok(tables::OPENWEATHER_CODES),
        other => Err(ConversionError::UnknownSource(other.to_string())),
    }
}

/// The ordered description table of any vocabulary, source or destination.
pub fn descriptions(vocab: &str) -> Result<&'static [DescRow], ConversionError> {
    match vocab.to_lowercase().as_str() {
        "msn" => Ok(tables::MSN_DESCS),
        "openmeteo" => Ok(tables::OPENMETEO_DESCS),
        "openweather" => Ok(tables::OPENWEATHER_DESCS),
        "yahoo" => Ok(tables::YAHOO_DESCS),
        "meteo" => Ok(tables::METEO_DESCS),
        other => Err(ConversionError::UnknownSource(other.to_string())),
    }
}

/// Description of one code within a vocabulary, if the vocabulary knows it.
pub fn description_of(vocab: &str, code: &str) -> Option<&'static str> {
    descriptions(vocab)
        .ok()?
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, desc)| *desc)
}

/// Convert a raw provider code into its destination pair, keyed by the
/// vocabulary name.
///
/// A missing code or an unknown vocabulary is an error; a known
/// vocabulary with an unmapped code is not — it yields [`NA_PAIR`] and a
/// warning, and processing continues.
pub fn convert(source: &str, code: Option<&str>) -> Result<IconPair, ConversionError> {
    let code = code.ok_or(ConversionError::MissingCode)?;
    let provider = match source.to_lowercase().as_str() {
        "msn" => ProviderId::Msn,
        "openmeteo" => ProviderId::OpenMeteo,
        "openweather" => ProviderId::OpenWeather,
        other => return Err(ConversionError::UnknownSource(other.to_string())),
    };
    Ok(convert_code(provider, code))
}

/// Typed-provider conversion used by the reducers. Never fails: a table
/// miss returns the sentinel pair.
pub fn convert_code(provider: ProviderId, code: &str) -> IconPair {
    let code = code.trim();
    let code = match provider {
        // Strip the windy-flag modifier down to the fixed prefix.
        ProviderId::Msn if code.len() > MSN_CODE_LEN => code.get(..MSN_CODE_LEN).unwrap_or(code),
        _ => code,
    };
    match index(provider).get(code) {
        Some(&(yahoo, meteo)) => IconPair { yahoo, meteo },
        None => {
            warn!(provider = %provider, code, "condition code not found in conversion table");
            NA_PAIR
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOURCES: &[&str] = &["msn", "openmeteo", "openweather"];

    #[test]
    fn every_table_code_converts_and_is_described() {
        for source in SOURCES {
            for (code, (yahoo, meteo)) in source_codes(source).unwrap() {
                let pair = convert(source, Some(code)).expect("known code must convert");
                assert!(!pair.is_na(), "{source} code {code} must not hit the sentinel");
                assert_eq!(pair.yahoo, *yahoo);
                assert_eq!(pair.meteo, *meteo);

                // Closure: the source code and both destination codes have
                // descriptions in their vocabularies.
                assert!(
                    description_of(source, code).is_some(),
                    "{source} code {code} has no description"
                );
                assert!(
                    description_of("yahoo", yahoo).is_some(),
                    "yahoo code {yahoo} (from {source} {code}) has no description"
                );
                assert!(
                    description_of("meteo", meteo).is_some(),
                    "meteo code {meteo} (from {source} {code}) has no description"
                );
            }
        }
    }

    #[test]
    fn every_described_source_code_is_mapped() {
        for source in SOURCES {
            for (code, _) in descriptions(source).unwrap() {
                assert!(
                    !convert(source, Some(code)).unwrap().is_na(),
                    "{source} description entry {code} has no conversion"
                );
            }
        }
    }

    #[test]
    fn unknown_code_degrades_to_sentinel() {
        let pair = convert("openmeteo", Some("12345")).unwrap();
        assert_eq!(pair, NA_PAIR);
        assert_eq!(pair.yahoo, "NA");
        assert_eq!(pair.meteo, ")");
    }

    #[test]
    fn missing_code_is_an_error() {
        assert_eq!(convert("msn", None).unwrap_err(), ConversionError::MissingCode);
    }

    #[test]
    fn unknown_source_is_an_error() {
        let err = convert("accuweather", Some("1")).unwrap_err();
        assert_eq!(err, ConversionError::UnknownSource("accuweather".into()));
    }

    #[test]
    fn msn_codes_truncate_to_fixed_prefix() {
        // Both the bare code and the windy-flagged variant resolve the same.
        let bare = convert("msn", Some("d000")).unwrap();
        let windy = convert("msn", Some("d0001")).unwrap();
        assert_eq!(bare, windy);
        assert_eq!(bare.yahoo, "32");
        assert_eq!(bare.meteo, "B");
    }

    #[test]
    fn codes_are_trimmed_before_lookup() {
        let pair = convert("openmeteo", Some(" 3 ")).unwrap();
        assert_eq!(pair.yahoo, "28");
        assert_eq!(pair.meteo, "N");
    }

    #[test]
    fn source_is_case_insensitive() {
        assert!(!convert("MSN", Some("d000")).unwrap().is_na());
        assert!(!convert("OpenMeteo", Some("3")).unwrap().is_na());
    }
}
