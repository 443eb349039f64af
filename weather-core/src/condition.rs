//! Mapping from WeatherAPI condition codes to display icons.
//!
//! Codes come from <https://www.weatherapi.com/docs/weather_conditions.json>.
//! Three extra sentinel codes, never sent by the service, pick special icons
//! for temperature and wind highlights.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Sentinel code for the hot-temperature icon.
pub const SENTINEL_HOT: u32 = 9001;
/// Sentinel code for the cold-temperature icon.
pub const SENTINEL_COLD: u32 = 9002;
/// Sentinel code for the high-wind icon.
pub const SENTINEL_WINDY: u32 = 9003;

pub const CLEAR: u32 = 1000;
pub const LIGHT_RAIN: u32 = 1183;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Icon {
    Sun,
    Moon,
    CloudSun,
    CloudMoon,
    Cloud,
    Cloudy,
    CloudFog,
    CloudSunRain,
    CloudMoonRain,
    CloudDrizzle,
    CloudRain,
    CloudRainWind,
    CloudSnow,
    CloudHail,
    CloudLightning,
    Snowflake,
    ThermometerSun,
    ThermometerSnowflake,
    Wind,
}

impl Icon {
    pub fn as_str(&self) -> &'static str {
        match self {
            Icon::Sun => "sun",
            Icon::Moon => "moon",
            Icon::CloudSun => "cloud-sun",
            Icon::CloudMoon => "cloud-moon",
            Icon::Cloud => "cloud",
            Icon::Cloudy => "cloudy",
            Icon::CloudFog => "cloud-fog",
            Icon::CloudSunRain => "cloud-sun-rain",
            Icon::CloudMoonRain => "cloud-moon-rain",
            Icon::CloudDrizzle => "cloud-drizzle",
            Icon::CloudRain => "cloud-rain",
            Icon::CloudRainWind => "cloud-rain-wind",
            Icon::CloudSnow => "cloud-snow",
            Icon::CloudHail => "cloud-hail",
            Icon::CloudLightning => "cloud-lightning",
            Icon::Snowflake => "snowflake",
            Icon::ThermometerSun => "thermometer-sun",
            Icon::ThermometerSnowflake => "thermometer-snowflake",
            Icon::Wind => "wind",
        }
    }
}

impl fmt::Display for Icon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of the condition table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConditionIcon {
    Single(Icon),
    DayNight { day: Icon, night: Icon },
}

impl ConditionIcon {
    pub fn select(self, is_day: bool) -> Icon {
        match self {
            ConditionIcon::Single(icon) => icon,
            ConditionIcon::DayNight { day, night } => {
                if is_day {
                    day
                } else {
                    night
                }
            }
        }
    }
}

const fn day_night(day: Icon, night: Icon) -> ConditionIcon {
    ConditionIcon::DayNight { day, night }
}

/// Table lookup for a service-issued code. Sentinels are not in the table.
pub fn table_entry(code: u32) -> Option<ConditionIcon> {
    use ConditionIcon::Single;

    let entry = match code {
        1000 => day_night(Icon::Sun, Icon::Moon),
        1003 => day_night(Icon::CloudSun, Icon::CloudMoon),
        1006 => Single(Icon::Cloud),
        1009 => Single(Icon::Cloudy),
        1030 | 1135 | 1147 => Single(Icon::CloudFog),
        1063 | 1180 | 1240 => day_night(Icon::CloudSunRain, Icon::CloudMoonRain),
        1066 | 1210 | 1216 | 1222 => Single(Icon::CloudSnow),
        1069 | 1204 | 1207 | 1249 | 1252 => Single(Icon::CloudHail),
        1072 | 1150 | 1153 | 1168 | 1171 => Single(Icon::CloudDrizzle),
        1087 | 1273 | 1276 | 1279 | 1282 => Single(Icon::CloudLightning),
        1114 | 1117 | 1213 | 1219 | 1225 | 1255 | 1258 => Single(Icon::Snowflake),
        1183 | 1186 | 1189 | 1198 | 1201 => Single(Icon::CloudRain),
        1192 | 1195 | 1243 | 1246 => Single(Icon::CloudRainWind),
        1237 | 1261 | 1264 => Single(Icon::CloudHail),
        _ => return None,
    };

    Some(entry)
}

fn sentinel_icon(code: u32) -> Option<Icon> {
    match code {
        SENTINEL_HOT => Some(Icon::ThermometerSun),
        SENTINEL_COLD => Some(Icon::ThermometerSnowflake),
        SENTINEL_WINDY => Some(Icon::Wind),
        _ => None,
    }
}

/// Resolve the icon for a condition code and day/night flag.
///
/// Sentinels win over the table and ignore `is_day`. Unknown codes fall back
/// to the plain sun or moon.
pub fn resolve_icon(code: u32, is_day: bool) -> Icon {
    if let Some(icon) = sentinel_icon(code) {
        return icon;
    }

    match table_entry(code) {
        Some(entry) => entry.select(is_day),
        None if is_day => Icon::Sun,
        None => Icon::Moon,
    }
}
