//! Static condition-code tables.
//!
//! One conversion table per source vocabulary, mapping a provider code to
//! its `(yahoo, meteo)` destination pair, plus one human-readable
//! description table per vocabulary (source and destination alike).
//!
//! The slices are insertion-ordered on purpose: the diagnostic listing
//! prints them in this order. Lookups go through the lazily built hash
//! indexes in the parent module.

/// A source code and its `(yahoo, meteo)` destination pair.
pub type CodeRow = (&'static str, (&'static str, &'static str));

/// A code and its human-readable description.
pub type DescRow = (&'static str, &'static str);

/// msn -> (yahoo, meteo). Keys are the 4-character compound day/night
/// codes; a trailing "1" on the wire marks the windy variant and is
/// stripped before lookup.
pub const MSN_CODES: &[CodeRow] = &[
    ("d000", ("32", "B")), ("d100", ("34", "B")), ("d200", ("30", "H")), ("d210", ("12", "Q")),
    ("d211", ("5", "W")), ("d212", ("14", "V")), ("d220", ("11", "Q")), ("d221", ("42", "V")),
    ("d222", ("16", "W")), ("d240", ("4", "0")), ("d300", ("28", "H")), ("d310", ("11", "Q")),
    ("d311", ("5", "W")), ("d312", ("14", "V")), ("d320", ("39", "R")), ("d321", ("5", "W")),
    ("d322", ("16", "W")), ("d340", ("4", "0")), ("d400", ("26", "Y")), ("d410", ("9", "Q")),
    ("d411", ("5", "W")), ("d412", ("14", "V")), ("d420", ("9", "Q")), ("d421", ("5", "W")),
    ("d422", ("16", "W")), ("d430", ("12", "Q")), ("d431", ("5", "W")), ("d432", ("15", "W")),
    ("d440", ("4", "0")), ("d500", ("28", "H")), ("d600", ("20", "E")), ("d603", ("10", "U")),
    ("d605", ("17", "X")), ("d705", ("17", "X")), ("d900", ("21", "M")), ("d905", ("17", "X")),
    ("d907", ("21", "M")),
    ("n000", ("31", "C")), ("n100", ("33", "C")), ("n200", ("29", "I")), ("n210", ("45", "Q")),
    ("n211", ("5", "W")), ("n212", ("46", "W")), ("n220", ("45", "Q")), ("n221", ("5", "W")),
    ("n222", ("46", "W")), ("n240", ("47", "Z")), ("n300", ("27", "I")), ("n310", ("45", "Q")),
    ("n311", ("11", "Q")), ("n312", ("46", "W")), ("n320", ("45", "R")), ("n321", ("5", "W")),
    ("n322", ("46", "W")), ("n340", ("47", "Z")), ("n400", ("26", "Y")), ("n410", ("9", "Q")),
    ("n411", ("5", "W")), ("n412", ("14", "V")), ("n420", ("9", "Q")), ("n421", ("5", "W")),
    ("n422", ("14", "W")), ("n430", ("12", "Q")), ("n431", ("5", "W")), ("n432", ("15", "W")),
    ("n440", ("4", "0")), ("n500", ("29", "I")), ("n600", ("20", "E")), ("n603", ("10", "U")),
    ("n605", ("17", "X")), ("n705", ("17", "X")), ("n900", ("21", "M")), ("n905", ("17", "X")),
    ("n907", ("21", "M")),
];

/// openmeteo (WMO weather codes) -> (yahoo, meteo).
pub const OPENMETEO_CODES: &[CodeRow] = &[
    ("0", ("32", "B")), ("1", ("34", "B")), ("2", ("30", "H")), ("3", ("28", "N")),
    ("45", ("20", "M")), ("48", ("21", "J")), ("51", ("9", "Q")), ("53", ("9", "Q")),
    ("55", ("9", "R")), ("56", ("8", "V")), ("57", ("10", "U")), ("61", ("11", "Q")),
    ("63", ("12", "R")), ("65", ("12", "R")), ("66", ("8", "R")), ("67", ("7", "W")),
    ("71", ("42", "V")), ("73", ("14", "U")), ("75", ("41", "W")), ("77", ("35", "X")),
    ("80", ("11", "Q")), ("81", ("12", "R")), ("82", ("12", "R")), ("85", ("42", "V")),
    ("86", ("43", "W")), ("95", ("38", "P")), ("96", ("4", "O")), ("99", ("4", "Z")),
];

/// openweather -> (yahoo, meteo).
pub const OPENWEATHER_CODES: &[CodeRow] = &[
    ("200", ("37", "O")), ("201", ("4", "O")), ("202", ("3", "P")), ("210", ("37", "O")),
    ("211", ("4", "O")), ("212", ("3", "P")), ("221", ("3", "O")), ("230", ("37", "O")),
    ("231", ("38", "O")), ("232", ("38", "O")), ("300", ("9", "Q")), ("301", ("9", "Q")),
    ("302", ("9", "Q")), ("310", ("9", "Q")), ("311", ("9", "Q")), ("312", ("9", "R")),
    ("313", ("11", "R")), ("314", ("12", "R")), ("321", ("11", "R")), ("500", ("9", "Q")),
    ("501", ("11", "Q")), ("502", ("11", "R")), ("503", ("12", "R")), ("504", ("12", "R")),
    ("511", ("10", "W")), ("520", ("11", "Q")), ("521", ("11", "R")), ("522", ("12", "R")),
    ("531", ("40", "Q")), ("600", ("42", "U")), ("601", ("16", "V")), ("602", ("15", "V")),
    ("611", ("18", "X")), ("612", ("10", "W")), ("613", ("17", "X")), ("615", ("6", "W")),
    ("616", ("5", "W")), ("620", ("14", "U")), ("621", ("42", "U")), ("622", ("13", "V")),
    ("701", ("20", "M")), ("711", ("22", "J")), ("721", ("21", "E")), ("731", ("19", "J")),
    ("741", ("20", "E")), ("751", ("19", "J")), ("761", ("19", "J")), ("762", ("22", "J")),
    ("771", ("23", "F")), ("781", ("0", "F")), ("800", ("32", "B")), ("801", ("34", "B")),
    ("802", ("30", "H")), ("803", ("26", "H")), ("804", ("28", "N")),
];

/// Cleartext descriptions of the msn weathercodes.
pub const MSN_DESCS: &[DescRow] = &[
    ("d000", "SunnyDayV3"), ("d100", "MostlySunnyDay"), ("d200", "D200PartlySunnyV2"),
    ("d210", "D210LightRainShowersV2"), ("d211", "D211LightRainSowShowersV2"),
    ("d212", "D212LightSnowShowersV2"), ("d220", "LightRainShowerDay"),
    ("d221", "D221RainSnowShowersV2"), ("d222", "SnowShowersDayV2"), ("d240", "D240TstormsV2"),
    ("d300", "MostlyCloudyDayV2"), ("d310", "D310LightRainShowersV2"),
    ("d311", "D311LightRainSnowShowersV2"), ("d312", "LightSnowShowersDay"),
    ("d320", "RainShowersDayV2"), ("d321", "D321RainSnowShowersV2"), ("d322", "SnowShowersDayV2"),
    ("d340", "D340TstormsV2"), ("d400", "CloudyV3"), ("d410", "LightRainV3"),
    ("d411", "RainSnowV2"), ("d412", "LightSnowV2"), ("d420", "HeavyDrizzle"),
    ("d421", "RainSnowV2"), ("d422", "Snow"), ("d430", "ModerateRainV2"), ("d431", "RainSnowV2"),
    ("d432", "HeavySnowV2"), ("d440", "ThunderstormsV2"), ("d500", "MostlyCloudyDayV2"),
    ("d600", "FogV2"), ("d603", "FreezingRainV2"), ("d605", "IcePelletsV2"),
    ("d705", "BlowingHailV2"), ("d900", "Haze"), ("d905", "BlowingHailV2"), ("d907", "Haze"),
    ("n000", "ClearNightV3"), ("n100", "MostlyClearNight"), ("n200", "PartlyCloudyNightV2"),
    ("n210", "N210LightRainShowersV2"), ("n211", "N211LightRainSnowShowersV2"),
    ("n212", "N212LightSnowShowersV2"), ("n220", "LightRainShowerNight"),
    ("n221", "N221RainSnowShowersV2"), ("n222", "N222SnowShowersV2"), ("n240", "N240TstormsV2"),
    ("n300", "MostlyCloudyNightV2"), ("n310", "N310LightRainShowersV2"),
    ("n311", "N311LightRainSnowShowersV2"), ("n312", "LightSnowShowersNight"),
    ("n320", "RainShowersNightV2"), ("n321", "N321RainSnowShowersV2"),
    ("n322", "N322SnowShowersV2"), ("n340", "N340TstormsV2"), ("n400", "CloudyV3"),
    ("n410", "LightRainV3"), ("n411", "RainSnowV2"), ("n412", "LightSnowV2"),
    ("n420", "HeavyDrizzle"), ("n421", "RainSnowShowersNightV2"), ("n422", "N422SnowV2"),
    ("n430", "ModerateRainV2"), ("n431", "RainSnowV2"), ("n432", "HeavySnowV2"),
    ("n440", "ThunderstormsV2"), ("n500", "PartlyCloudyNightV2"), ("n600", "FogV2"),
    ("n603", "FreezingRainV2"), ("n605", "BlowingHailV2"), ("n705", "BlowingHailV2"),
    ("n905", "BlowingHailV2"), ("n907", "Haze"), ("n900", "Haze"),
];

/// Cleartext descriptions of the openmeteo weathercodes.
pub const OPENMETEO_DESCS: &[DescRow] = &[
    ("0", "clear sky"), ("1", "mainly clear"), ("2", "partly cloudy"), ("3", "overcast"),
    ("45", "fog"), ("48", "depositing rime fog"), ("51", "light drizzle"),
    ("53", "moderate drizzle"), ("55", "dense intensity drizzle"),
    ("56", "light freezing drizzle"), ("57", "dense intensity freezing drizzle"),
    ("61", "slight rain"), ("63", "moderate rain"), ("65", "heavy intensity rain"),
    ("66", "light freezing rain"), ("67", "heavy intensity freezing rain"),
    ("71", "slight snow fall"), ("73", "moderate snow fall"), ("75", "heavy intensity snow fall"),
    ("77", "snow grains"), ("80", "slight rain showers"), ("81", "moderate rain showers"),
    ("82", "violent rain showers"), ("85", "slight snow showers"), ("86", "heavy snow showers"),
    ("95", "slight or moderate thunderstorm"), ("96", "thunderstorm with slight hail"),
    ("99", "thunderstorm with heavy hail"),
];

/// Cleartext descriptions of the openweather weathercodes.
pub const OPENWEATHER_DESCS: &[DescRow] = &[
    ("200", "thunderstorm with light rain"), ("201", "thunderstorm with rain"),
    ("202", "thunderstorm with heavy rain"), ("210", "light thunderstorm"),
    ("211", "thunderstorm"), ("212", "heavy thunderstorm"), ("221", "ragged thunderstorm"),
    ("230", "thunderstorm with light drizzle"), ("231", "thunderstorm with drizzle"),
    ("232", "thunderstorm with heavy drizzle"), ("300", "light intensity drizzle"),
    ("301", "drizzle"), ("302", "heavy intensity drizzle"),
    ("310", "light intensity drizzle rain"), ("311", "drizzle rain"),
    ("312", "heavy intensity drizzle rain"), ("313", "shower rain and drizzle"),
    ("314", "heavy shower rain and drizzle"), ("321", "shower drizzle"), ("500", "light rain"),
    ("501", "moderate rain"), ("502", "heavy intensity rain"), ("503", "very heavy rain"),
    ("504", "extreme rain"), ("511", "freezing rain"), ("520", "light intensity shower rain"),
    ("521", "shower rain"), ("522", "heavy intensity shower rain"), ("531", "ragged shower rain"),
    ("600", "light snow"), ("601", "Snow"), ("602", "Heavy snow"), ("611", "Sleet"),
    ("612", "Light shower sleet"), ("613", "Shower sleet"), ("615", "Light rain and snow"),
    ("616", "Rain and snow"), ("620", "Light shower snow"), ("621", "Shower snow"),
    ("622", "Heavy shower snow"), ("701", "mist"), ("711", "Smoke"), ("721", "Haze"),
    ("731", "sand/ dust whirls"), ("741", "fog"), ("751", "sand"), ("761", "dust"),
    ("762", "volcanic ash"), ("771", "squalls"), ("781", "tornado"), ("800", "clear sky"),
    ("801", "few clouds: 11-25%"), ("802", "scattered clouds: 25-50%"),
    ("803", "broken clouds: 51-84%"), ("804", "overcast clouds: 85-100%"),
];

/// Cleartext descriptions of the yahoo iconcodes.
pub const YAHOO_DESCS: &[DescRow] = &[
    ("0", "tornado"), ("1", "tropical storm"), ("2", "hurricane"), ("3", "severe thunderstorms"),
    ("4", "thunderstorms"), ("5", "mixed rain and snow"), ("6", "mixed rain and sleet"),
    ("7", "mixed snow and sleet"), ("8", "freezing drizzle"), ("9", "drizzle"),
    ("10", "freezing rain"), ("11", "showers"), ("12", "showers"), ("13", "snow flurries"),
    ("14", "light snow showers"), ("15", "blowing snow"), ("16", "snow"), ("17", "hail"),
    ("18", "sleet"), ("19", "dust"), ("20", "foggy"), ("21", "haze"), ("22", "smoky"),
    ("23", "blustery"), ("24", "windy"), ("25", "cold"), ("26", "cloudy"),
    ("27", "mostly cloudy (night)"), ("28", "mostly cloudy (day)"),
    ("29", "partly cloudy (night)"), ("30", "partly cloudy (day)"), ("31", "clear (night)"),
    ("32", "sunny (day)"), ("33", "fair (night)"), ("34", "fair (day)"),
    ("35", "mixed rain and hail"), ("36", "hot"), ("37", "isolated thunderstorms"),
    ("38", "scattered thunderstorms"), ("39", "capricious weather"), ("40", "scattered showers"),
    ("41", "heavy snow"), ("42", "scattered snow showers"), ("43", "heavy snow"),
    ("44", "partly cloudy"), ("45", "rain showers (night)"), ("46", "snow showers (night)"),
    ("47", "thundershowers (night)"), ("NA", "not available"),
];

/// Cleartext descriptions of the meteo iconcodes (glyph font codepoints).
pub const METEO_DESCS: &[DescRow] = &[
    ("!", "windy_rain_inv"), ("\"", "snow_inv"), ("#", "snow_heavy_inv"), ("$", "hail_inv"),
    ("%", "clouds_inv"), ("&", "clouds_flash_inv"), ("'", "temperature"), ("(", "compass"),
    (")", "na"), ("*", "celcius"), ("+", "fahrenheit"), ("0", "clouds_flash_alt"),
    ("1", "sun_inv"), ("2", "moon_inv"), ("3", "cloud_sun_inv"), ("4", "cloud_moon_inv"),
    ("5", "cloud_inv"), ("6", "cloud_flash_inv"), ("7", "drizzle_inv"), ("8", "rain_inv"),
    ("9", "windy_inv"), ("A", "sunrise"), ("B", "sun"), ("C", "moon"), ("D", "eclipse"),
    ("E", "mist"), ("F", "wind"), ("G", "snowflake"), ("H", "cloud_sun"), ("I", "cloud_moon"),
    ("J", "fog_sun"), ("K", "fog_moon"), ("L", "fog_cloud"), ("M", "fog"), ("N", "cloud"),
    ("O", "cloud_flash"), ("P", "cloud_flash_alt"), ("Q", "drizzle"), ("R", "rain"),
    ("S", "windy"), ("T", "windy_rain"), ("U", "snow"), ("V", "snow_alt"), ("W", "snow_heavy"),
    ("X", "hail"), ("Y", "clouds"), ("Z", "clouds_flash"),
];
