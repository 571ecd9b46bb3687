use clap::{Parser, Subcommand};

use imdfetch_core::{ClientOptions, Endpoints, WeatherClient};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "imdfetch", version, about = "IMD weather CLI")]
pub struct Cli {
    /// Use the provider's alternate test endpoint for weather pages.
    #[arg(long, global = true)]
    pub test: bool,

    /// Emit JSON instead of human-readable text.
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Search the city directory by name.
    Search {
        /// City name or fragment.
        name: String,

        /// Match the whole name instead of a substring.
        #[arg(long)]
        exact: bool,
    },

    /// Show the current observation for a city.
    Weather {
        /// City name or numeric id.
        city: String,
    },

    /// Show the 7-day forecast for a city.
    Forecast {
        /// City name or numeric id.
        city: String,

        /// Number of days to print.
        #[arg(long, default_value_t = 7)]
        days: usize,
    },

    /// List known cities.
    Cities {
        /// Maximum number of cities to print (0 = unlimited).
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let options = ClientOptions {
            endpoints: if self.test {
                Endpoints::test_endpoint()
            } else {
                Endpoints::default()
            },
            ..ClientOptions::default()
        };
        let mut client = WeatherClient::with_options(options)?;

        match self.command {
            Command::Search { name, exact } => {
                let cities = client.find_city(&name, exact).await?;
                if self.json {
                    println!("{}", serde_json::to_string_pretty(&cities)?);
                } else if cities.is_empty() {
                    println!("No cities found matching \"{name}\"");
                } else {
                    println!("Found {} cities matching \"{name}\":", cities.len());
                    for city in &cities {
                        println!("  {} (ID: {})", city.display_name, city.city_id);
                    }
                }
            }

            Command::Weather { city } => {
                let weather = client.get_current_weather(city.as_str()).await?;
                if self.json {
                    println!("{}", serde_json::to_string_pretty(&weather)?);
                } else {
                    println!("Current weather for {}", weather.city);
                    println!("Date: {}", weather.date);
                    for p in &weather.parameters {
                        println!("  {}: {}", p.parameter, p.value);
                    }
                }
            }

            Command::Forecast { city, days } => {
                let forecast = client.get_forecast(city.as_str()).await?;
                if self.json {
                    println!("{}", serde_json::to_string_pretty(&forecast)?);
                } else {
                    println!(
                        "7-day forecast for {} (issued {})",
                        forecast.city, forecast.forecast_date
                    );
                    for day in forecast.days.iter().take(days) {
                        let min = fmt_temp(day.min_temp);
                        let max = fmt_temp(day.max_temp);
                        println!("  {}  {min} .. {max}  {}", day.date, day.forecast);
                        if let Some(warnings) = &day.warnings {
                            println!("      Warning: {warnings}");
                        }
                    }
                }
            }

            Command::Cities { limit } => {
                let cities = client.get_cities(false).await?;
                let total = cities.len();
                let shown = if limit == 0 {
                    cities
                } else {
                    &cities[..limit.min(total)]
                };
                if self.json {
                    println!("{}", serde_json::to_string_pretty(&shown)?);
                } else {
                    println!("Showing {} of {} cities:", shown.len(), total);
                    for city in shown {
                        println!("  {} (ID: {})", city.display_name, city.city_id);
                    }
                }
            }
        }

        Ok(())
    }
}

fn fmt_temp(temp: Option<f64>) -> String {
    temp.map_or_else(|| "-".to_string(), |t| format!("{t}°C"))
}
