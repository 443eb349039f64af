use chrono::Local;
use weather_core::{
    CitySuggestion, Notification, NotificationSink, WeatherView, resolve_icon,
};

/// Prints notifications to stderr.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalSink;

impl NotificationSink for TerminalSink {
    fn notify(&self, n: Notification) {
        eprintln!("[{}] {}: {}", n.severity, n.title, n.message);
    }
}

pub fn describe_city(city: &CitySuggestion) -> String {
    if city.region.is_empty() || city.region == city.name {
        city.label()
    } else {
        format!("{} ({}), {}", city.name, city.region, city.country)
    }
}

pub fn print_suggestions(cities: &[CitySuggestion]) {
    if cities.is_empty() {
        println!("No matching cities.");
        return;
    }

    for (i, city) in cities.iter().enumerate() {
        println!("{:>2}. {}  [{:.2}, {:.2}]", i + 1, describe_city(city), city.lat, city.lon);
    }
}

pub fn print_weather(city: &CitySuggestion, view: &WeatherView) {
    let (snapshot, icon) = match view {
        WeatherView::Ready { snapshot, icon } => (snapshot, icon),
        WeatherView::Failed { message } => {
            println!("Could not load weather for {}:", city.label());
            println!("  {message}");
            return;
        }
    };

    let loc = &snapshot.location;
    let now = &snapshot.current;

    println!("{}, {}  ({})", loc.name, loc.country, loc.localtime);
    println!("  {icon}  {}", now.condition_text);
    println!("  Temperature: {:.1} °C (feels like {:.1} °C)", now.temp_c, now.feels_like_c);
    println!("  Humidity:    {}%", now.humidity_pct);
    println!("  Wind:        {:.1} kph {}", now.wind_kph, now.wind_dir);
    println!("  Pressure:    {:.0} mb", now.pressure_mb);
    println!("  Visibility:  {:.1} km", now.vis_km);
    println!("  Cloud cover: {}%", now.cloud_pct);

    if let Some(today) = snapshot.today() {
        println!("  Today:       {:.1} .. {:.1} °C", today.min_temp_c, today.max_temp_c);
        println!("  Sunrise:     {}   Sunset: {}", today.sunrise, today.sunset);
    }

    if snapshot.days.len() > 1 {
        println!();
        println!("Forecast:");
        for day in &snapshot.days {
            println!(
                "  {}  {:<16} {:>5.1} .. {:>5.1} °C  rain {:>3}%  {}",
                day.date.format("%a %d %b"),
                resolve_icon(day.condition_code, true).as_str(),
                day.min_temp_c,
                day.max_temp_c,
                day.chance_of_rain_pct,
                day.condition_text,
            );
        }
    }

    println!();
    println!("Updated {}", now.last_updated.with_timezone(&Local).format("%Y-%m-%d %H:%M"));
}
