//! Pure HTML-to-structured-data transforms.
//!
//! No network access and no state: every function takes raw page text and
//! returns typed records or a [`DataParsing`](crate::Error::DataParsing)
//! error. Missing optional fields degrade into absent values; only a total
//! structural mismatch fails the parse. The provider's markup is
//! undocumented, so each function is testable against fixed fixtures.

use std::sync::LazyLock;

use chrono::{Datelike, NaiveDate};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use crate::error::{Error, Result};
use crate::model::{CityInfo, DayForecast, ForecastData, WeatherData, WeatherParameter};

const CURRENT_TABLE_MARKER: &str = "Past 24 Hours Weather Data";
const FORECAST_TABLE_MARKER: &str = "7 Day's Forecast";

/// Select-option markup on the city list page: a 4-6 digit id, an optional
/// encoded remainder, and the display label.
static CITY_OPTION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<option value='(\d{4,6})([^']*)'>(.*?)</option>").expect("valid regex")
});

/// The `Dated : <date>` header every city weather page carries.
static DATED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<b>\s*Dated\s*:\s*([^<]+)</b>").expect("valid regex"));

/// Forecast-row dates, e.g. `27-May` or `2-Jun`.
static DAY_DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{1,2})-([A-Za-z]{3})").expect("valid regex"));

/// Date formats observed in the `Dated` header over time.
const DATE_FORMATS: &[&str] = &[
    "%B %d, %Y",
    "%b %d, %Y",
    "%d %B %Y",
    "%d %b %Y",
    "%d-%m-%Y",
    "%d/%m/%Y",
    "%m/%d/%Y",
    "%Y-%m-%d",
    "%d-%m-%y",
    "%d/%m/%y",
    "%d %b %y",
    "%b %d %Y",
];

/// Extracts the city directory from the provider's main page.
///
/// Entries are sorted by id; duplicate ids keep the first occurrence.
pub fn parse_city_list(html: &str) -> Result<Vec<CityInfo>> {
    let mut cities: Vec<CityInfo> = Vec::new();
    for caps in CITY_OPTION_RE.captures_iter(html) {
        let Ok(city_id) = caps[1].parse::<u32>() else {
            continue;
        };
        let display_name = caps[3].trim().to_string();
        if display_name.is_empty() {
            continue;
        }
        let full_value = format!("{}{}", &caps[1], &caps[2]);
        cities.push(CityInfo::new(city_id, display_name, full_value));
    }
    if cities.is_empty() {
        return Err(Error::parsing(
            "city list",
            "no <option> entries with numeric city ids found",
        ));
    }
    cities.sort_by_key(|c| c.city_id);
    cities.dedup_by_key(|c| c.city_id);
    Ok(cities)
}

/// Extracts the "past 24 hours" observation block from a city weather page.
///
/// Rows with anything other than exactly two non-empty cells are skipped, so
/// a partial table degrades into fewer parameters rather than a failure.
pub fn parse_current_weather(html: &str, city_name: &str) -> Result<WeatherData> {
    let document = Html::parse_document(html);
    let table = find_table(&document, CURRENT_TABLE_MARKER).ok_or_else(|| {
        Error::parsing("current weather", "`Past 24 Hours Weather Data` table not found")
    })?;
    let date = parse_dated_header(html).ok_or_else(|| {
        Error::parsing("current weather", "no recognizable `Dated` header on the page")
    })?;

    let row_sel = row_selector();
    let cell_sel = cell_selector();
    let mut parameters = Vec::new();
    for row in table.select(&row_sel) {
        let cells: Vec<String> = row.select(&cell_sel).map(cell_text).collect();
        let [name, value] = cells.as_slice() else {
            continue;
        };
        if name.is_empty() || value.is_empty() || name.contains(CURRENT_TABLE_MARKER) {
            continue;
        }
        parameters.push(WeatherParameter {
            parameter: canonical_parameter_name(name),
            value: value.clone(),
        });
    }

    Ok(WeatherData {
        city: city_name.to_string(),
        city_id: None,
        date,
        parameters,
    })
}

/// Extracts the 7-day forecast block from a city weather page.
///
/// Rows without a recognizable `DD-Mon` date are skipped; duplicate dates are
/// dropped and the sequence is capped at seven days.
pub fn parse_forecast(html: &str, city_name: &str) -> Result<ForecastData> {
    let document = Html::parse_document(html);
    let table = find_table(&document, FORECAST_TABLE_MARKER)
        .ok_or_else(|| Error::parsing("forecast", "`7 Day's Forecast` table not found"))?;
    let forecast_date = parse_dated_header(html).ok_or_else(|| {
        Error::parsing("forecast", "no recognizable `Dated` header on the page")
    })?;

    let row_sel = row_selector();
    let cell_sel = cell_selector();
    let rows: Vec<ElementRef<'_>> = table.select(&row_sel).collect();
    let header_idx = rows
        .iter()
        .position(|row| {
            let text: String = row.text().collect();
            text.contains("Date") && (text.contains("Min Temp") || text.contains("Max Temp"))
        })
        .ok_or_else(|| Error::parsing("forecast", "header row not found in forecast table"))?;

    let mut days: Vec<DayForecast> = Vec::new();
    for row in &rows[header_idx + 1..] {
        let cells: Vec<String> = row.select(&cell_sel).map(cell_text).collect();
        // Layout: date, min, max, icon, forecast, warning icon, warnings,
        // RH at 0830, RH at 1730.
        if cells.len() < 9 {
            continue;
        }
        let Some(date) = parse_day_date(&cells[0], forecast_date) else {
            continue;
        };
        if days.iter().any(|d| d.date == date) {
            continue;
        }
        days.push(DayForecast {
            date,
            min_temp: cells[1].parse().ok(),
            max_temp: cells[2].parse().ok(),
            forecast: cells[4].clone(),
            warnings: non_empty(&cells[6]),
            rh_0830: non_empty(&cells[7]),
            rh_1730: non_empty(&cells[8]),
        });
        if days.len() == 7 {
            break;
        }
    }

    Ok(ForecastData {
        city: city_name.to_string(),
        city_id: None,
        forecast_date,
        days,
    })
}

/// First table whose text contains `marker`.
fn find_table<'a>(document: &'a Html, marker: &str) -> Option<ElementRef<'a>> {
    let table_sel = Selector::parse("table").expect("valid selector");
    document
        .select(&table_sel)
        .find(|table| table.text().collect::<String>().contains(marker))
}

fn row_selector() -> Selector {
    Selector::parse("tr").expect("valid selector")
}

fn cell_selector() -> Selector {
    Selector::parse("td, th").expect("valid selector")
}

/// Cell text with inner whitespace collapsed.
fn cell_text(cell: ElementRef<'_>) -> String {
    cell.text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn non_empty(s: &str) -> Option<String> {
    if s.is_empty() { None } else { Some(s.to_string()) }
}

fn parse_dated_header(html: &str) -> Option<NaiveDate> {
    let caps = DATED_RE.captures(html)?;
    parse_loose_date(&caps[1])
}

/// Tries each known provider date format against a cleaned-up date string.
fn parse_loose_date(raw: &str) -> Option<NaiveDate> {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| c.is_alphanumeric() || " /-,:".contains(*c))
        .collect();
    let cleaned = cleaned.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(cleaned, fmt).ok())
}

/// Resolves a `DD-Mon` forecast cell against the generation date's year.
/// A January entry on a late-December page rolls over to the next year.
fn parse_day_date(raw: &str, generated: NaiveDate) -> Option<NaiveDate> {
    let caps = DAY_DATE_RE.captures(raw.trim())?;
    let day: u32 = caps[1].parse().ok()?;
    let month = month_number(&caps[2])?;
    let date = NaiveDate::from_ymd_opt(generated.year(), month, day)?;
    if date < generated - chrono::Duration::days(30) {
        return NaiveDate::from_ymd_opt(generated.year() + 1, month, day);
    }
    Some(date)
}

fn month_number(abbr: &str) -> Option<u32> {
    match abbr.to_lowercase().as_str() {
        "jan" => Some(1),
        "feb" => Some(2),
        "mar" => Some(3),
        "apr" => Some(4),
        "may" => Some(5),
        "jun" => Some(6),
        "jul" => Some(7),
        "aug" => Some(8),
        "sep" => Some(9),
        "oct" => Some(10),
        "nov" => Some(11),
        "dec" => Some(12),
        _ => None,
    }
}

/// Maps the provider's row labels onto canonical parameter names, so lookups
/// are stable across the cosmetic variations seen on different city pages.
fn canonical_parameter_name(raw: &str) -> String {
    let flat = raw
        .replace(['(', ')'], " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let lower = flat.to_lowercase();
    if flat.contains("Maximum Temp") {
        "Maximum Temperature (°C)".to_string()
    } else if flat.contains("Minimum Temp") {
        "Minimum Temperature (°C)".to_string()
    } else if flat.contains("Departure from Normal") {
        if lower.contains("max") {
            "Max Temp Departure from Normal (°C)".to_string()
        } else if lower.contains("min") {
            "Min Temp Departure from Normal (°C)".to_string()
        } else {
            "Temperature Departure from Normal (°C)".to_string()
        }
    } else if flat.contains("24 Hours Rainfall") {
        "24 Hours Rainfall (mm)".to_string()
    } else if flat.contains("Relative Humidity at 0830") {
        "Relative Humidity at 08:30 (%)".to_string()
    } else if flat.contains("Relative Humidity at 1730") {
        "Relative Humidity at 17:30 (%)".to_string()
    } else if flat.contains("Sunset") {
        "Today's Sunset (IST)".to_string()
    } else if flat.contains("Sunrise") {
        "Tomorrow's Sunrise (IST)".to_string()
    } else if flat.contains("Moonset") {
        "Moonset (IST)".to_string()
    } else if flat.contains("Moonrise") {
        "Moonrise (IST)".to_string()
    } else {
        flat
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CITY_LIST_FIXTURE: &str = r#"
        <html><body>
        <select name="city" onchange="show(this.value)">
        <option value='42182'>New Delhi</option>
        <option value='12001MUM'>Mumbai (Santacruz)</option>
        <option value='43279'>Chennai (Nungambakkam)</option>
        <option value='42182'>New Delhi Duplicate</option>
        </select>
        </body></html>"#;

    const CURRENT_FIXTURE: &str = r#"
        <html><body>
        <b>Local Weather Report and Forecast For: </b><FONT color="blue">Chennai</Font>
        <B>Dated : May 27, 2025</B>
        <table border="1">
        <tr><th colspan="2">Past 24 Hours Weather Data</th></tr>
        <tr><td>Maximum Temp (&deg;C)</td><td>34</td></tr>
        <tr><td>Minimum Temp (&deg;C)</td><td>26.5</td></tr>
        <tr><td>24 Hours Rainfall (mm)</td><td>0.4</td></tr>
        <tr><td>Relative Humidity at 0830 hrs</td><td>74</td></tr>
        <tr><td>Todays Sunset (IST)</td><td>18:34</td></tr>
        <tr><td>Empty Value</td><td></td></tr>
        </table>
        </body></html>"#;

    fn forecast_row(date: &str, min: &str, max: &str, text: &str, warn: &str) -> String {
        format!(
            "<tr><td>{date}</td><td>{min}</td><td>{max}</td><td><img src='a.png'/></td>\
             <td>{text}</td><td><img src='w.png'/></td><td>{warn}</td><td>70</td><td>55</td></tr>"
        )
    }

    fn forecast_fixture(rows: &[String]) -> String {
        format!(
            "<html><body><B>Dated : May 27, 2025</B>\
             <table border=\"1\"><tr><th colspan=\"9\">7 Day's Forecast</th></tr>\
             <tr><td>Date</td><td>Min Temp</td><td>Max Temp</td><td></td><td>Forecast</td>\
             <td></td><td>Warnings</td><td>RH 0830</td><td>RH 1730</td></tr>{}</table>\
             </body></html>",
            rows.join("")
        )
    }

    #[test]
    fn city_list_yields_unique_sorted_ids() {
        let cities = parse_city_list(CITY_LIST_FIXTURE).unwrap();
        assert_eq!(cities.len(), 3);
        let ids: Vec<u32> = cities.iter().map(|c| c.city_id).collect();
        assert_eq!(ids, vec![12001, 42182, 43279]);
        // Duplicate id keeps the first occurrence (directory order after sort).
        assert_eq!(cities[1].display_name, "New Delhi");
    }

    #[test]
    fn city_list_derives_clean_name_and_full_value() {
        let cities = parse_city_list(CITY_LIST_FIXTURE).unwrap();
        let mumbai = cities.iter().find(|c| c.city_id == 12001).unwrap();
        assert_eq!(mumbai.display_name, "Mumbai (Santacruz)");
        assert_eq!(mumbai.clean_name, "mumbai santacruz");
        assert_eq!(mumbai.full_value, "12001MUM");
    }

    #[test]
    fn city_list_fails_on_unrecognized_markup() {
        let err = parse_city_list("<html><body>maintenance page</body></html>").unwrap_err();
        assert!(matches!(err, Error::DataParsing { .. }));
    }

    #[test]
    fn current_weather_extracts_parameters_in_source_order() {
        let weather = parse_current_weather(CURRENT_FIXTURE, "Chennai").unwrap();
        assert_eq!(weather.city, "Chennai");
        assert_eq!(weather.date, NaiveDate::from_ymd_opt(2025, 5, 27).unwrap());
        assert_eq!(weather.get_parameter("Maximum Temperature"), Some("34"));
        assert_eq!(weather.get_parameter("Minimum Temperature"), Some("26.5"));
        assert_eq!(weather.get_parameter("24 Hours Rainfall"), Some("0.4"));
        assert_eq!(
            weather.parameters[0].parameter,
            "Maximum Temperature (°C)"
        );
    }

    #[test]
    fn current_weather_skips_header_and_empty_rows() {
        let weather = parse_current_weather(CURRENT_FIXTURE, "Chennai").unwrap();
        // Header row, and the row with an empty value, are dropped.
        assert_eq!(weather.parameters.len(), 5);
        assert!(weather.get_parameter("Empty Value").is_none());
    }

    #[test]
    fn current_weather_tolerates_a_partial_table() {
        let html = r#"
            <B>Dated : 27-05-2025</B>
            <table><tr><td>Past 24 Hours Weather Data</td><td></td></tr>
            <tr><td>Maximum Temp (&deg;C)</td><td>34</td></tr></table>"#;
        let weather = parse_current_weather(html, "Chennai").unwrap();
        assert_eq!(weather.parameters.len(), 1);
        assert_eq!(weather.get_parameter("Maximum Temperature"), Some("34"));
    }

    #[test]
    fn current_weather_fails_without_the_table() {
        let err = parse_current_weather("<html><body>nothing here</body></html>", "X").unwrap_err();
        assert!(matches!(
            err,
            Error::DataParsing {
                context: "current weather",
                ..
            }
        ));
    }

    #[test]
    fn current_weather_fails_without_a_dated_header() {
        let html = r#"<table><tr><td>Past 24 Hours Weather Data</td><td></td></tr>
            <tr><td>Maximum Temp</td><td>34</td></tr></table>"#;
        let err = parse_current_weather(html, "X").unwrap_err();
        assert!(matches!(err, Error::DataParsing { .. }));
    }

    #[test]
    fn forecast_parses_full_week() {
        let rows: Vec<String> = vec![
            forecast_row("27-May", "26.0", "34.0", "Partly cloudy sky", ""),
            forecast_row("28-May", "26.0", "35.0", "Mainly clear sky", ""),
            forecast_row("29-May", "27.0", "35.0", "Partly cloudy sky", "Heat wave"),
            forecast_row("30-May", "27.0", "36.0", "Partly cloudy sky", ""),
            forecast_row("31-May", "26.0", "35.0", "Generally cloudy sky", ""),
            forecast_row("1-Jun", "26.0", "34.0", "Rain or thundershowers", ""),
            forecast_row("2-Jun", "25.0", "33.0", "Rain or thundershowers", ""),
        ];
        let forecast = parse_forecast(&forecast_fixture(&rows), "Chennai").unwrap();
        assert_eq!(forecast.city, "Chennai");
        assert_eq!(
            forecast.forecast_date,
            NaiveDate::from_ymd_opt(2025, 5, 27).unwrap()
        );
        assert_eq!(forecast.days.len(), 7);
        assert_eq!(
            forecast.days[0].date,
            NaiveDate::from_ymd_opt(2025, 5, 27).unwrap()
        );
        assert_eq!(
            forecast.days[6].date,
            NaiveDate::from_ymd_opt(2025, 6, 2).unwrap()
        );
        assert_eq!(forecast.days[0].min_temp, Some(26.0));
        assert_eq!(forecast.days[0].max_temp, Some(34.0));
        assert_eq!(forecast.days[2].warnings.as_deref(), Some("Heat wave"));
        assert_eq!(forecast.days[0].rh_0830.as_deref(), Some("70"));
    }

    #[test]
    fn forecast_with_five_days_yields_five_days() {
        let rows: Vec<String> = (27..=31)
            .map(|d| forecast_row(&format!("{d}-May"), "26.0", "34.0", "Clear sky", ""))
            .collect();
        let forecast = parse_forecast(&forecast_fixture(&rows), "Chennai").unwrap();
        assert_eq!(forecast.days.len(), 5);
    }

    #[test]
    fn forecast_skips_duplicate_dates_and_caps_at_seven() {
        let mut rows: Vec<String> = (1..=9)
            .map(|d| forecast_row(&format!("{d}-Jun"), "26.0", "34.0", "Clear sky", ""))
            .collect();
        rows.insert(1, forecast_row("1-Jun", "20.0", "30.0", "Duplicate", ""));
        let forecast = parse_forecast(&forecast_fixture(&rows), "Chennai").unwrap();
        assert_eq!(forecast.days.len(), 7);
        let dates: Vec<NaiveDate> = forecast.days.iter().map(|d| d.date).collect();
        let mut deduped = dates.clone();
        deduped.dedup();
        assert_eq!(dates, deduped);
        // First occurrence of 1-Jun wins.
        assert_eq!(forecast.days[0].min_temp, Some(26.0));
    }

    #[test]
    fn forecast_leaves_non_numeric_temperatures_unset() {
        let rows = vec![forecast_row("27-May", "NA", "34.0", "Clear sky", "")];
        let forecast = parse_forecast(&forecast_fixture(&rows), "Chennai").unwrap();
        assert_eq!(forecast.days[0].min_temp, None);
        assert_eq!(forecast.days[0].max_temp, Some(34.0));
    }

    #[test]
    fn forecast_fails_without_a_header_row() {
        let html = "<B>Dated : May 27, 2025</B>\
            <table><tr><td>7 Day's Forecast</td></tr></table>";
        let err = parse_forecast(html, "X").unwrap_err();
        assert!(matches!(
            err,
            Error::DataParsing {
                context: "forecast",
                ..
            }
        ));
    }

    #[test]
    fn forecast_fails_without_the_table() {
        let err = parse_forecast("<html><body>error page</body></html>", "X").unwrap_err();
        assert!(matches!(err, Error::DataParsing { .. }));
    }

    #[test]
    fn dated_header_accepts_known_formats() {
        for raw in ["May 27, 2025", "27-05-2025", "27/05/2025", "2025-05-27"] {
            let html = format!("<B>Dated : {raw}</B>");
            assert_eq!(
                parse_dated_header(&html),
                NaiveDate::from_ymd_opt(2025, 5, 27),
                "format {raw:?} should parse"
            );
        }
    }

    #[test]
    fn day_date_rolls_over_the_year_in_late_december() {
        let generated = NaiveDate::from_ymd_opt(2025, 12, 29).unwrap();
        assert_eq!(
            parse_day_date("2-Jan", generated),
            NaiveDate::from_ymd_opt(2026, 1, 2)
        );
        assert_eq!(
            parse_day_date("30-Dec", generated),
            NaiveDate::from_ymd_opt(2025, 12, 30)
        );
    }
}
