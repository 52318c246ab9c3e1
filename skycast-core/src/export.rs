//! Output surfaces: reduced/raw JSON files, the msn XML markup tree, and
//! the operator-facing diagnostic tables.

use std::fs::File;
use std::io::Write as _;
use std::path::Path;

use anyhow::{Context, Result};
use quick_xml::Writer;
use quick_xml::events::{BytesStart, Event};
use serde_json::Value;

use crate::error::ConversionError;
use crate::icons::{self, DESTINATIONS};
use crate::model::{Query, ReducedReport};
use crate::provider::msn;

/// Write the reduced report as JSON.
pub fn write_reduced_json(path: impl AsRef<Path>, report: &ReducedReport) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path)
        .with_context(|| format!("Failed to create file: {}", path.display()))?;
    serde_json::to_writer(file, report)
        .with_context(|| format!("Failed to write reduced JSON to {}", path.display()))?;
    Ok(())
}

/// Write the provider's raw payload verbatim.
pub fn write_raw_json(path: impl AsRef<Path>, payload: &Value) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path)
        .with_context(|| format!("Failed to create file: {}", path.display()))?;
    serde_json::to_writer(file, payload)
        .with_context(|| format!("Failed to write raw JSON to {}", path.display()))?;
    Ok(())
}

// ---------------------------------------------------------------------------
// msn markup export.

/// Render the msn payload as an attribute-based XML tree. Only the msn
/// payload shape is supported.
pub fn msn_xml(payload: &Value, query: &Query) -> Result<String> {
    let doc = msn::markup_document(payload, query)?;

    let mut writer = Writer::new(Vec::new());

    let mut root = BytesStart::new("weatherdata");
    root.push_attribute(("xmlns:xsd", "http://www.w3.org/2001/XMLSchema"));
    root.push_attribute(("xmlns:xsi", "http://www.w3.org/2001/XMLSchema-instance"));
    writer.write_event(Event::Start(root))?;

    let mut weather = BytesStart::new("weather");
    weather.push_attribute(("weatherlocationname", doc.location_name.as_str()));
    weather.push_attribute(("degreetype", doc.degree_type.as_str()));
    weather.push_attribute(("long", doc.longitude.as_str()));
    weather.push_attribute(("lat", doc.latitude.as_str()));
    weather.push_attribute(("timezone", doc.timezone.as_str()));
    weather.push_attribute(("alert", doc.alert.as_str()));
    weather.push_attribute(("encodedlocationname", encode_location(&doc.location_name).as_str()));
    writer.write_event(Event::Start(weather))?;

    let mut current = BytesStart::new("current");
    current.push_attribute(("temperature", doc.current.temperature.as_str()));
    current.push_attribute(("yahoocode", doc.current.yahoo_code.as_str()));
    current.push_attribute(("meteocode", doc.current.meteo_code.as_str()));
    current.push_attribute(("skytext", doc.current.sky_text.as_str()));
    current.push_attribute(("date", doc.current.date.as_str()));
    current.push_attribute(("observationtime", doc.current.observation_time.as_str()));
    current.push_attribute(("observationpoint", doc.current.observation_point.as_str()));
    current.push_attribute(("feelslike", doc.current.feels_like.as_str()));
    current.push_attribute(("humidity", doc.current.humidity.as_str()));
    current.push_attribute(("winddisplay", doc.current.wind_display.as_str()));
    current.push_attribute(("day", doc.current.day.as_str()));
    current.push_attribute(("shortday", doc.current.short_day.as_str()));
    current.push_attribute(("windspeed", doc.current.wind_speed.as_str()));
    current.push_attribute(("precip", doc.current.precip.as_str()));
    writer.write_event(Event::Empty(current))?;

    for day in &doc.forecast {
        let mut forecast = BytesStart::new("forecast");
        forecast.push_attribute(("low", day.low.as_str()));
        forecast.push_attribute(("high", day.high.as_str()));
        forecast.push_attribute(("yahoocodeday", day.yahoo_code.as_str()));
        forecast.push_attribute(("meteocodeday", day.meteo_code.as_str()));
        forecast.push_attribute(("skytextday", day.sky_text.as_str()));
        forecast.push_attribute(("date", day.date.as_str()));
        forecast.push_attribute(("day", day.day.as_str()));
        forecast.push_attribute(("shortday", day.short_day.as_str()));
        forecast.push_attribute(("precip", day.precip.as_str()));
        writer.write_event(Event::Empty(forecast))?;
    }

    writer.write_event(Event::End(quick_xml::events::BytesEnd::new("weather")))?;
    writer.write_event(Event::End(quick_xml::events::BytesEnd::new("weatherdata")))?;

    String::from_utf8(writer.into_inner()).context("markup is not valid UTF-8")
}

pub fn write_msn_xml(path: impl AsRef<Path>, payload: &Value, query: &Query) -> Result<()> {
    let xml = msn_xml(payload, query)?;
    let path = path.as_ref();
    let mut file = File::create(path)
        .with_context(|| format!("Failed to create file: {}", path.display()))?;
    file.write_all(xml.as_bytes())
        .with_context(|| format!("Failed to write markup to {}", path.display()))?;
    Ok(())
}

/// Non-ASCII characters become XML character references; spaces become
/// `%20`, matching what the legacy consumers of this attribute expect.
fn encode_location(name: &str) -> String {
    name.chars()
        .filter(|c| *c != '\n')
        .map(|c| {
            if c == ' ' {
                "%20".to_string()
            } else if c.is_ascii() {
                c.to_string()
            } else {
                format!("&#{};", c as u32)
            }
        })
        .collect::<String>()
        .trim()
        .to_string()
}

// ---------------------------------------------------------------------------
// Diagnostic listings. Operator-facing only; nothing parses these.

/// Fixed-width code→description dump for one vocabulary.
pub fn describe_table(vocab: &str) -> Result<String, ConversionError> {
    let descs = icons::descriptions(vocab)?;

    let border = format!("+{}+", "-".repeat(39));
    let mut out = String::new();
    out.push_str(&border);
    out.push('\n');
    out.push_str(&format!(
        "| {:<5}{:<32} |\n",
        "CODE",
        format!("DESCRIPTION_{} (COMPLETE)", vocab.to_uppercase())
    ));
    out.push_str(&border);
    out.push('\n');
    for (code, desc) in descs {
        out.push_str(&format!("| {code:<5}{desc:<32} |\n"));
    }
    out.push_str(&border);
    out.push('\n');
    Ok(out)
}

/// Fixed-width code→code conversion dump for one (source, destination)
/// vocabulary pair.
pub fn conversion_rules(source: &str, dest: &str) -> Result<String, ConversionError> {
    let codes = icons::source_codes(source)?;
    let dest_idx = DESTINATIONS
        .iter()
        .position(|d| *d == dest.to_lowercase())
        .ok_or_else(|| ConversionError::UnknownDestination(dest.to_string()))?;

    let border = format!("+{}+{}+", "-".repeat(39), "-".repeat(32));
    let mut out = String::new();
    out.push_str(&border);
    out.push('\n');
    out.push_str(&format!(
        "| {:<5}{:<32} | {:<5}{:<25} |\n",
        "CODE",
        format!("DESCRIPTION_{} (CONVERTER)", source.to_uppercase()),
        "CODE",
        format!("DESCRIPTION_{}", dest.to_uppercase())
    ));
    out.push_str(&border);
    out.push('\n');
    for (code, pair) in codes {
        let dcode = if dest_idx == 0 { pair.0 } else { pair.1 };
        let sdesc = icons::description_of(source, code).unwrap_or("");
        let ddesc = icons::description_of(dest, dcode).unwrap_or("");
        out.push_str(&format!("| {code:<5}{sdesc:<32} | {dcode:<5}{ddesc:<25} |\n"));
    }
    out.push_str(&border);
    out.push('\n');
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::msn::tests as msn_tests;

    #[test]
    fn describe_table_lists_every_code() {
        let table = describe_table("openmeteo").unwrap();
        assert!(table.contains("DESCRIPTION_OPENMETEO (COMPLETE)"));
        assert!(table.contains("| 95   slight or moderate thunderstorm"));
        assert_eq!(
            table.lines().count(),
            icons::descriptions("openmeteo").unwrap().len() + 4
        );
    }

    #[test]
    fn describe_table_rejects_unknown_vocabulary() {
        assert!(describe_table("noaa").is_err());
    }

    #[test]
    fn conversion_rules_show_both_destinations() {
        let yahoo = conversion_rules("openmeteo", "yahoo").unwrap();
        assert!(yahoo.contains("DESCRIPTION_OPENMETEO (CONVERTER)"));
        assert!(yahoo.contains("| 3    overcast"));
        assert!(yahoo.contains("| 28   mostly cloudy (day)"));

        let meteo = conversion_rules("openmeteo", "meteo").unwrap();
        assert!(meteo.contains("| N    cloud"));

        assert!(conversion_rules("openmeteo", "noaa").is_err());
    }

    #[test]
    fn msn_xml_mirrors_current_and_forecast() {
        let payload = msn_tests::fixture();
        let query = msn_tests::query();

        let xml = msn_xml(&payload, &query).unwrap();
        assert!(xml.starts_with("<weatherdata"));
        assert!(xml.contains("weatherlocationname=\"Berlin, Deutschland\""));
        assert!(xml.contains("encodedlocationname=\"Berlin,%20Deutschland\""));
        // The current block uses the current symbol, not the hourly one.
        assert!(xml.contains("yahoocode=\"32\""));
        assert!(xml.contains("winddisplay=\"14 km/h W\""));
        assert_eq!(xml.matches("<forecast").count(), 6);
        assert!(xml.contains("yahoocodeday=\"30\""));
        assert!(xml.contains("timezone=\"2\""));
    }

    #[test]
    fn location_encoding_handles_non_ascii() {
        assert_eq!(encode_location("München, Bayern"), "M&#252;nchen,%20Bayern");
        assert_eq!(encode_location("Oslo"), "Oslo");
    }
}
