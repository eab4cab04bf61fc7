//! Server-side HTML assembly for the dashboard page.
//!
//! Every fragment is a pure function from data to markup so the rendered
//! output can be asserted on directly in tests. All user- and
//! provider-supplied text passes through [`escape`].

use serde::Serialize;
use weathercheck_core::{CurrentWeather, ForecastEntry, WeatherReport};

const PLOTLY_CDN: &str = "https://cdn.plot.ly/plotly-2.32.0.min.js";
const LEAFLET_CSS_CDN: &str = "https://unpkg.com/leaflet@1.9.4/dist/leaflet.css";
const LEAFLET_JS_CDN: &str = "https://unpkg.com/leaflet@1.9.4/dist/leaflet.js";

const RADAR_ZOOM: u8 = 8;

/// What the single page shows for one request.
#[derive(Debug)]
pub enum PageState {
    /// No city submitted yet.
    Idle,
    /// Submitted city was empty or whitespace-only; no fetch happened.
    EmptyCity { city: String },
    /// Fetch failed; `message` is the notification body.
    Failed { city: String, message: String },
    /// Fetch succeeded.
    Report { city: String, report: WeatherReport },
}

impl PageState {
    /// Value echoed back into the city input.
    fn city(&self) -> &str {
        match self {
            PageState::Idle => "",
            PageState::EmptyCity { city }
            | PageState::Failed { city, .. }
            | PageState::Report { city, .. } => city,
        }
    }
}

/// Render the full dashboard document.
pub fn page(state: &PageState, api_key: &str) -> String {
    let mut body = String::new();
    body.push_str(&header_banner());
    body.push_str(&search_form(state.city()));

    match state {
        PageState::Idle => {}
        PageState::EmptyCity { .. } => {
            body.push_str(&warning_banner("Please enter a valid city name."));
        }
        PageState::Failed { message, .. } => {
            body.push_str(&error_banner(message));
        }
        PageState::Report { report, .. } => {
            body.push_str(&dashboard(report, api_key));
        }
    }

    let with_widgets = matches!(state, PageState::Report { .. });
    document(&body, with_widgets)
}

fn document(body: &str, with_widgets: bool) -> String {
    let widget_assets = if with_widgets {
        format!(
            "<link rel=\"stylesheet\" href=\"{LEAFLET_CSS_CDN}\">\n\
             <script src=\"{LEAFLET_JS_CDN}\"></script>\n\
             <script src=\"{PLOTLY_CDN}\"></script>\n"
        )
    } else {
        String::new()
    };

    format!(
        "<!DOCTYPE html>\n\
         <html lang=\"en\">\n\
         <head>\n\
         <meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         <title>Weather Check</title>\n\
         {widget_assets}\
         <style>{STYLESHEET}</style>\n\
         </head>\n\
         <body>\n{body}</body>\n\
         </html>\n"
    )
}

fn header_banner() -> String {
    "<div class=\"header\">\n\
     <h1>\u{1f326}\u{fe0f} Weather Check</h1>\n\
     <p>Interactive weather insights with dynamic, mobile-friendly design.</p>\n\
     </div>\n"
        .to_string()
}

fn search_form(city: &str) -> String {
    format!(
        "<form class=\"search\" method=\"get\" action=\"/\" \
         onsubmit=\"document.getElementById('loading').style.display='block'\">\n\
         <input type=\"text\" name=\"city\" value=\"{}\" placeholder=\"E.g., London, Tokyo\">\n\
         <button type=\"submit\">Get Weather</button>\n\
         </form>\n\
         <div id=\"loading\" class=\"loading\" style=\"display:none\">Fetching weather data...</div>\n",
        escape(city)
    )
}

fn warning_banner(text: &str) -> String {
    format!("<div class=\"notice warning\">{}</div>\n", escape(text))
}

fn error_banner(text: &str) -> String {
    format!("<div class=\"notice error\">{}</div>\n", escape(text))
}

fn dashboard(report: &WeatherReport, api_key: &str) -> String {
    let mut out = String::new();
    out.push_str("<h3 class=\"section\">Weather Overview</h3>\n");
    out.push_str(&summary_card(&report.current));
    out.push_str("<div class=\"tiles\">\n");
    out.push_str(&conditions_tile(&report.current));
    out.push_str(&sun_tile(&report.current));
    out.push_str(&wind_tile(&report.current));
    out.push_str("</div>\n");
    out.push_str("<h3 class=\"section\">5-Day Forecast and Radar</h3>\n");
    out.push_str("<div class=\"columns\">\n<div class=\"col wide\">\n");
    out.push_str(&forecast_chart(&report.forecast));
    out.push_str("</div>\n<div class=\"col narrow\">\n");
    out.push_str(&radar_map(&report.current, api_key));
    out.push_str("</div>\n</div>\n");
    out
}

pub fn summary_card(current: &CurrentWeather) -> String {
    format!(
        "<div class=\"card\">\n\
         <h2>\u{1f30d} {city}</h2>\n\
         <p>Today's weather is <b>{description}</b> with a temperature of <b>{temperature}\u{b0}C</b>.</p>\n\
         <p>Wind speed is <b>{wind_speed} m/s</b>, and humidity is <b>{humidity}%</b>.</p>\n\
         </div>\n",
        city = escape(&current.city),
        description = escape(&current.description),
        temperature = current.temperature,
        wind_speed = current.wind_speed,
        humidity = current.humidity,
    )
}

fn conditions_tile(current: &CurrentWeather) -> String {
    format!(
        "<div class=\"tile\">\n\
         <h2>{city}</h2>\n\
         <img src=\"{icon}\" alt=\"{description}\">\n\
         <p><b>{description}</b></p>\n\
         <p><b>Temperature:</b> {temperature}\u{b0}C</p>\n\
         </div>\n",
        city = escape(&current.city),
        icon = escape(&current.icon),
        description = escape(&current.description),
        temperature = current.temperature,
    )
}

fn sun_tile(current: &CurrentWeather) -> String {
    format!(
        "<div class=\"tile\">\n\
         <h2>Sunrise &amp; Sunset</h2>\n\
         <p><b>Sunrise:</b> {sunrise} \u{1f305}</p>\n\
         <p><b>Sunset:</b> {sunset} \u{1f307}</p>\n\
         </div>\n",
        sunrise = escape(&current.sunrise),
        sunset = escape(&current.sunset),
    )
}

fn wind_tile(current: &CurrentWeather) -> String {
    format!(
        "<div class=\"tile\">\n\
         <h2>Wind &amp; Humidity</h2>\n\
         <p><b>Wind Speed:</b> {wind_speed} m/s</p>\n\
         <p><b>Humidity:</b> {humidity}%</p>\n\
         </div>\n",
        wind_speed = current.wind_speed,
        humidity = current.humidity,
    )
}

/// Temperature-over-date line chart; point labels carry the condition text.
fn forecast_chart(forecast: &[ForecastEntry]) -> String {
    let dates: Vec<&str> = forecast.iter().map(|e| e.date.as_str()).collect();
    let temps: Vec<f64> = forecast.iter().map(|e| e.temp).collect();
    let labels: Vec<&str> = forecast.iter().map(|e| e.description.as_str()).collect();

    format!(
        "<div id=\"forecast-chart\"></div>\n\
         <script>\n\
         Plotly.newPlot(\"forecast-chart\", [{{\n\
             x: {dates},\n\
             y: {temps},\n\
             text: {labels},\n\
             type: \"scatter\",\n\
             mode: \"lines+markers+text\",\n\
             textposition: \"top center\"\n\
         }}], {{\n\
             title: \"5-Day Temperature Forecast\",\n\
             xaxis: {{ title: \"Date\" }},\n\
             yaxis: {{ title: \"Temperature (\u{b0}C)\" }}\n\
         }});\n\
         </script>\n",
        dates = js_value(&dates),
        temps = js_value(&temps),
        labels = js_value(&labels),
    )
}

/// Map centered on the reported coordinates with the provider's temperature
/// tile overlay, keyed by the same credential as the forecast request.
fn radar_map(current: &CurrentWeather, api_key: &str) -> String {
    format!(
        "<div class=\"tile\"><h2>Weather Radar</h2></div>\n\
         <div id=\"radar-map\"></div>\n\
         <script>\n\
         var radarMap = L.map(\"radar-map\").setView([{lat}, {lon}], {zoom});\n\
         L.tileLayer(\"https://tile.openstreetmap.org/{{z}}/{{x}}/{{y}}.png\", {{\n\
             attribution: \"&copy; OpenStreetMap contributors\"\n\
         }}).addTo(radarMap);\n\
         L.tileLayer(\"https://tile.openweathermap.org/map/temp_new/{{z}}/{{x}}/{{y}}.png?appid=\" + {key}, {{\n\
             attribution: \"OpenWeatherMap\"\n\
         }}).addTo(radarMap);\n\
         </script>\n",
        lat = current.latitude,
        lon = current.longitude,
        zoom = RADAR_ZOOM,
        key = js_value(&api_key),
    )
}

/// JSON-encode a value for embedding inside a `<script>` block. `<` is
/// escaped so provider text can never close the surrounding tag.
fn js_value<T: Serialize>(value: &T) -> String {
    match serde_json::to_string(value) {
        Ok(json) => json.replace('<', "\\u003c"),
        Err(_) => "null".to_string(),
    }
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

const STYLESHEET: &str = "\
body { margin: 0; padding: 0 20px; font-family: sans-serif; background-color: #f2f6ff; }
.header { text-align: center; padding: 20px; background-color: #005BEA; color: white; border-radius: 10px; }
.search { text-align: center; margin: 20px; }
.search input { padding: 10px; border-radius: 6px; border: 1px solid #ccc; min-width: 240px; }
.search button { padding: 10px 20px; border-radius: 6px; border: none; background-color: #005BEA; color: white; cursor: pointer; }
.loading { text-align: center; margin: 10px; color: #005BEA; }
.notice { border-radius: 6px; padding: 12px; margin: 10px auto; max-width: 95%; text-align: center; }
.notice.warning { background-color: #fff3cd; color: #664d03; }
.notice.error { background-color: #f8d7da; color: #58151c; }
.section { text-align: center; }
.card { background-color: white; color: black; border-radius: 10px; box-shadow: 0 4px 8px rgba(0, 0, 0, 0.2); padding: 15px; margin: 10px auto; max-width: 95%; text-align: center; }
.tiles { display: flex; justify-content: center; flex-wrap: wrap; }
.tile { background-color: #005BEA; color: white; border-radius: 10px; box-shadow: 0 4px 8px rgba(0, 0, 0, 0.2); padding: 20px; margin: 15px; text-align: center; transition: transform 0.2s; flex: 1 1 220px; }
.tile:hover { transform: scale(1.05); }
.columns { display: flex; flex-wrap: wrap; align-items: flex-start; }
.col.wide { flex: 2 1 400px; }
.col.narrow { flex: 1 1 260px; }
#forecast-chart { min-height: 360px; }
#radar-map { height: 300px; border-radius: 10px; margin: 15px; }
@media (max-width: 768px) {
    .tile { margin: 10px; padding: 15px; }
    .card { padding: 10px; font-size: 14px; }
}
";

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_current() -> CurrentWeather {
        CurrentWeather {
            city: "London".to_string(),
            temperature: 15.2,
            description: "Clear sky".to_string(),
            humidity: 68.0,
            wind_speed: 4.1,
            pressure: 1012.0,
            icon: "http://openweathermap.org/img/wn/01d@2x.png".to_string(),
            latitude: 51.5072,
            longitude: -0.1276,
            sunrise: "06:15:00".to_string(),
            sunset: "18:42:00".to_string(),
        }
    }

    fn sample_report() -> WeatherReport {
        let forecast = (0..5)
            .map(|day| ForecastEntry {
                date: format!("2025-03-0{}", day + 1),
                temp: 10.0 + day as f64,
                description: "Clear sky".to_string(),
                icon: "http://openweathermap.org/img/wn/01d@2x.png".to_string(),
            })
            .collect();

        WeatherReport {
            current: sample_current(),
            forecast,
        }
    }

    fn banner_count(html: &str, class: &str) -> usize {
        html.matches(&format!("class=\"notice {class}\"")).count()
    }

    #[test]
    fn summary_card_shows_description_and_temperature() {
        let card = summary_card(&sample_current());
        assert!(card.contains("Clear sky"));
        assert!(card.contains("15.2\u{b0}C"));
        assert!(card.contains("4.1 m/s"));
        assert!(card.contains("68%"));
    }

    #[test]
    fn idle_page_has_form_and_no_widgets() {
        let html = page(&PageState::Idle, "KEY");
        assert!(html.contains("name=\"city\""));
        assert!(html.contains("Get Weather"));
        assert!(!html.contains("class=\"card\""));
        assert!(!html.contains("id=\"forecast-chart\""));
        assert_eq!(banner_count(&html, "warning"), 0);
        assert_eq!(banner_count(&html, "error"), 0);
    }

    #[test]
    fn empty_city_page_has_exactly_one_warning() {
        let state = PageState::EmptyCity {
            city: "   ".to_string(),
        };
        let html = page(&state, "KEY");
        assert_eq!(banner_count(&html, "warning"), 1);
        assert_eq!(banner_count(&html, "error"), 0);
        assert!(html.contains("Please enter a valid city name."));
        assert!(!html.contains("class=\"card\""));
    }

    #[test]
    fn failed_page_has_exactly_one_error_with_message() {
        let state = PageState::Failed {
            city: "Nowhereville".to_string(),
            message: "Provider error 404: city not found".to_string(),
        };
        let html = page(&state, "KEY");
        assert_eq!(banner_count(&html, "error"), 1);
        assert_eq!(banner_count(&html, "warning"), 0);
        assert!(html.contains("city not found"));
        assert!(!html.contains("class=\"card\""));
    }

    #[test]
    fn report_page_renders_card_tiles_chart_and_map() {
        let state = PageState::Report {
            city: "London".to_string(),
            report: sample_report(),
        };
        let html = page(&state, "KEY");
        assert!(html.contains("Weather Overview"));
        assert!(html.contains("class=\"card\""));
        assert!(html.contains("Sunrise &amp; Sunset"));
        assert!(html.contains("06:15:00"));
        assert!(html.contains("Wind &amp; Humidity"));
        assert!(html.contains("id=\"forecast-chart\""));
        assert!(html.contains("id=\"radar-map\""));
        assert!(html.contains("tile.openweathermap.org/map/temp_new"));
        assert!(html.contains("\"KEY\""));
        assert!(html.contains("setView([51.5072, -0.1276], 8)"));
    }

    #[test]
    fn submitted_city_is_escaped_in_the_form() {
        let state = PageState::Failed {
            city: "<script>alert(1)</script>".to_string(),
            message: "Error fetching data: boom".to_string(),
        };
        let html = page(&state, "KEY");
        assert!(!html.contains("<script>alert"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn chart_labels_cannot_break_out_of_the_script_tag() {
        let mut report = sample_report();
        report.forecast[0].description = "</script><script>alert(1)".to_string();
        let state = PageState::Report {
            city: "London".to_string(),
            report,
        };
        let html = page(&state, "KEY");
        assert!(!html.contains("</script><script>alert"));
    }

    #[test]
    fn escape_covers_html_metacharacters() {
        assert_eq!(escape("a&b<c>\"d'"), "a&amp;b&lt;c&gt;&quot;d&#39;");
        assert_eq!(escape("plain"), "plain");
    }
}
