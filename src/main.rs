//! CLI entry point for the TransitLens analytics tool.
//!
//! Provides subcommands mirroring the analysis pages: overall summary,
//! travel patterns, routes and locations, spending insights, and filtered
//! export.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use serde_json::json;
use tracing::info;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

use transitlens::analyzers::aggregate::{
    bucketed_sum, cross_tabulate, cumulative, frequency_count, rank_by, time_bucket_aggregate,
    visit_history,
};
use transitlens::analyzers::filter::{self, TripFilter};
use transitlens::analyzers::sequences::extract_sequences;
use transitlens::model::{Field, Granularity, SortOrder, Statistic, Trip, ValueField};
use transitlens::output::{export_csv, print_json};
use transitlens::session::Session;
use transitlens::summary::UsageSummary;
use transitlens::loader;

#[derive(Parser)]
#[command(name = "transitlens")]
#[command(about = "Analyze a personal transit-card CSV export", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Filters shared by every analysis subcommand. All optional; an inverted
/// date range is reported as a usage error.
#[derive(Args)]
struct FilterArgs {
    /// Start of the date range (YYYY-MM-DD, inclusive)
    #[arg(long)]
    start: Option<NaiveDate>,

    /// End of the date range (YYYY-MM-DD, inclusive)
    #[arg(long)]
    end: Option<NaiveDate>,

    /// Keep only trips with this exact transit agency
    #[arg(long)]
    agency: Option<String>,

    /// Keep only trips whose location contains this text (case-insensitive)
    #[arg(long)]
    location: Option<String>,
}

impl FilterArgs {
    fn to_filter(&self) -> TripFilter {
        TripFilter {
            start: self.start,
            end: self.end,
            agency: self.agency.clone(),
            location_contains: self.location.clone(),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Overall usage and spending summary
    Summary {
        /// Path to the card export CSV
        #[arg(value_name = "CSV")]
        input: PathBuf,

        #[command(flatten)]
        filters: FilterArgs,

        /// Emit JSON instead of text
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Travel patterns: weekday, hour, heatmap, and monthly trip trends
    Patterns {
        #[arg(value_name = "CSV")]
        input: PathBuf,

        #[command(flatten)]
        filters: FilterArgs,

        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Routes and locations: top stops, same-day sequences, visit history
    Routes {
        #[arg(value_name = "CSV")]
        input: PathBuf,

        #[command(flatten)]
        filters: FilterArgs,

        /// Number of top locations and sequences to show
        #[arg(short = 'n', long, default_value_t = 10)]
        top: usize,

        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Spending insights: monthly trends, agency breakdown, projections
    Spending {
        #[arg(value_name = "CSV")]
        input: PathBuf,

        #[command(flatten)]
        filters: FilterArgs,

        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Apply filters and write the matching trips to a CSV file
    Export {
        #[arg(value_name = "CSV")]
        input: PathBuf,

        #[command(flatten)]
        filters: FilterArgs,

        /// Output file for the filtered subset
        #[arg(short, long, default_value = "filtered_trips.csv")]
        output: String,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/transitlens.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("transitlens.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("warn".parse().unwrap()));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse().unwrap()));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Summary {
            input,
            filters,
            json,
        } => {
            let trips = load_filtered(&input, &filters)?;
            run_summary(&trips, json)?;
        }
        Commands::Patterns {
            input,
            filters,
            json,
        } => {
            let trips = load_filtered(&input, &filters)?;
            run_patterns(&trips, json)?;
        }
        Commands::Routes {
            input,
            filters,
            top,
            json,
        } => {
            let trips = load_filtered(&input, &filters)?;
            run_routes(&trips, top, json)?;
        }
        Commands::Spending {
            input,
            filters,
            json,
        } => {
            let trips = load_filtered(&input, &filters)?;
            run_spending(&trips, json)?;
        }
        Commands::Export {
            input,
            filters,
            output,
        } => {
            let trips = load_filtered(&input, &filters)?;
            let rows = export_csv(&output, &trips)?;
            println!("Wrote {rows} trips to {output}.");
        }
    }

    Ok(())
}

/// Loads the export into a fresh session and applies the caller's filters.
#[tracing::instrument(skip(filters), fields(input = %input.display()))]
fn load_filtered(input: &PathBuf, filters: &FilterArgs) -> Result<Vec<Trip>> {
    let mut session = Session::new();
    let dataset = session.load(loader::load_csv(input)?);
    let trips = filter::apply(&dataset, &filters.to_filter())?;
    info!(total = dataset.len(), filtered = trips.len(), "dataset ready");
    Ok(trips)
}

fn run_summary(trips: &[Trip], json: bool) -> Result<()> {
    let summary = UsageSummary::from_trips(trips);

    if json {
        return print_json(&summary);
    }

    println!("Quick stats");
    println!("  Total trips:       {}", summary.total_trips);
    println!("  Unique locations:  {}", summary.unique_locations);
    println!("  Unique agencies:   {}", summary.unique_agencies);
    println!("  Days travelled:    {}", summary.days_travelled);
    if let (Some(first), Some(last)) = (summary.first_trip, summary.last_trip) {
        println!("  First trip:        {}", first.format("%Y-%m-%d %H:%M"));
        println!("  Last trip:         {}", last.format("%Y-%m-%d %H:%M"));
    }
    println!();
    println!("Spending");
    println!("  Total spent:       ${:.2}", summary.total_spent);
    println!("  Average fare:      ${:.2}", summary.avg_fare);
    println!("  Median fare:       ${:.2}", summary.median_fare);
    println!("  Max fare:          ${:.2}", summary.max_fare);
    println!("  Avg per day:       ${:.2}", summary.avg_daily_spend);
    println!("  Avg per month:     ${:.2}", summary.avg_monthly_spend);
    println!(
        "  Projected annual:  ${:.2}",
        summary.projected_annual_spend
    );

    Ok(())
}

fn run_patterns(trips: &[Trip], json: bool) -> Result<()> {
    let weekday_counts = bucketed_sum(trips, Field::DayOfWeek, ValueField::TripCount)?;
    let hour_counts = bucketed_sum(trips, Field::Hour, ValueField::TripCount)?;
    let heatmap = cross_tabulate(trips, Field::DayOfWeek, Field::Hour);
    let monthly_trips = time_bucket_aggregate(trips, Granularity::Month, Statistic::Count)?;

    // weekday rows 0-4 of the fixed Monday..Sunday domain
    let weekday_total: f64 = weekday_counts[..5].iter().map(|(_, c)| c).sum();
    let weekend_total: f64 = weekday_counts[5..].iter().map(|(_, c)| c).sum();

    let morning_rush: f64 = hour_counts[6..10].iter().map(|(_, c)| c).sum();
    let evening_rush: f64 = hour_counts[16..20].iter().map(|(_, c)| c).sum();
    let off_peak = trips.len() as f64 - morning_rush - evening_rush;

    if json {
        return print_json(&json!({
            "weekday_counts": weekday_counts,
            "weekday_trips": weekday_total,
            "weekend_trips": weekend_total,
            "hour_counts": hour_counts,
            "morning_rush": morning_rush,
            "evening_rush": evening_rush,
            "off_peak": off_peak,
            "heatmap": heatmap,
            "monthly_trips": monthly_trips,
        }));
    }

    println!("Trips by day of week");
    for (day, count) in &weekday_counts {
        println!("  {day:<10} {count:>5.0}");
    }
    if let Some((busiest, count)) = frequency_count(trips, Field::DayOfWeek, Some(1)).first() {
        println!("  Busiest day: {busiest} ({count} trips)");
    }
    println!("  Weekday trips: {weekday_total:.0}, weekend trips: {weekend_total:.0}");
    println!();

    println!("Trips by hour of day");
    for (hour, count) in &hour_counts {
        if *count > 0.0 {
            println!("  {hour:>2}:00  {count:>5.0}");
        }
    }
    println!("  Morning rush (6-10AM): {morning_rush:.0} trips");
    println!("  Evening rush (4-8PM):  {evening_rush:.0} trips");
    println!("  Off-peak:              {off_peak:.0} trips");
    println!();

    println!("Day x hour heatmap");
    for (row, label) in heatmap.row_labels.iter().enumerate() {
        let cells: Vec<String> = heatmap.counts[row].iter().map(|c| format!("{c:>3}")).collect();
        println!("  {label:<10} {}", cells.join(""));
    }
    println!();

    println!("Trips per month");
    for (month, count) in &monthly_trips {
        println!("  {month}  {count:>5.0}");
    }
    let monthly: Vec<f64> = monthly_trips.iter().map(|(_, c)| *c).collect();
    if !monthly.is_empty() {
        println!(
            "  Average: {:.1} trips per month",
            transitlens::analyzers::utility::mean(&monthly)
        );
    }

    Ok(())
}

fn run_routes(trips: &[Trip], top: usize, json: bool) -> Result<()> {
    let top_locations = frequency_count(trips, Field::Location, Some(top));
    let location_types = frequency_count(trips, Field::LocationType, None);
    let sequences = extract_sequences(trips);
    let agency_locations = rank_by(
        trips,
        Field::Agency,
        ValueField::Location,
        Statistic::Nunique,
        SortOrder::Descending,
    )?;
    let history: Vec<_> = visit_history(trips).into_iter().take(15).collect();

    if json {
        return print_json(&json!({
            "top_locations": top_locations,
            "location_types": location_types,
            "sequences": sequences.iter().take(top).collect::<Vec<_>>(),
            "unique_locations_by_agency": agency_locations,
            "visit_history": history,
        }));
    }

    println!("Top {top} most visited locations");
    for (location, count) in &top_locations {
        println!("  {count:>4}  {location}");
    }
    println!();

    println!("Trips by location type");
    for (kind, count) in &location_types {
        if *count > 0 {
            println!("  {count:>4}  {kind}");
        }
    }
    println!();

    println!("Common same-day trip sequences");
    if sequences.is_empty() {
        println!("  Not enough consecutive trips to identify routes.");
    }
    for seq in sequences.iter().take(top) {
        println!("  {:>3}x  {} -> {}", seq.count, seq.from, seq.to);
    }
    println!();

    println!("Unique locations by agency");
    for (agency, count) in &agency_locations {
        println!("  {count:>4.0}  {agency}");
    }
    println!();

    println!("Location visit history");
    for entry in &history {
        println!(
            "  {:>4}  {}  (first {}, last {})",
            entry.visits, entry.location, entry.first_visit, entry.last_visit
        );
    }

    Ok(())
}

fn run_spending(trips: &[Trip], json: bool) -> Result<()> {
    let monthly_spend = time_bucket_aggregate(trips, Granularity::Month, Statistic::Sum)?;
    let cumulative_spend = cumulative(&monthly_spend);
    let agency_spend = rank_by(
        trips,
        Field::Agency,
        ValueField::AmountClean,
        Statistic::Sum,
        SortOrder::Descending,
    )?;
    let agency_avg_fare = rank_by(
        trips,
        Field::Agency,
        ValueField::AmountClean,
        Statistic::Mean,
        SortOrder::Descending,
    )?;
    let weekday_spend = bucketed_sum(trips, Field::DayOfWeek, ValueField::AmountClean)?;
    let top_spend_locations: Vec<_> = rank_by(
        trips,
        Field::Location,
        ValueField::AmountClean,
        Statistic::Sum,
        SortOrder::Descending,
    )?
    .into_iter()
    .take(10)
    .collect();
    let summary = UsageSummary::from_trips(trips);

    if json {
        return print_json(&json!({
            "monthly_spend": monthly_spend,
            "cumulative_spend": cumulative_spend,
            "agency_spend": agency_spend,
            "agency_avg_fare": agency_avg_fare,
            "weekday_spend": weekday_spend,
            "top_spend_locations": top_spend_locations,
            "overview": summary,
        }));
    }

    println!("Monthly spending");
    for ((month, spent), (_, running)) in monthly_spend.iter().zip(&cumulative_spend) {
        println!("  {month}  ${spent:>8.2}  (cumulative ${running:.2})");
    }
    if let Some((high_month, high)) = monthly_spend
        .iter()
        .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
    {
        println!("  Highest month: {high_month} (${high:.2})");
    }
    println!();

    println!("Spending by agency");
    for (agency, spent) in &agency_spend {
        println!("  ${spent:>8.2}  {agency}");
    }
    println!();

    println!("Average fare by agency");
    for (agency, fare) in &agency_avg_fare {
        println!("  ${fare:>6.2}  {agency}");
    }
    println!();

    println!("Spending by day of week");
    for (day, spent) in &weekday_spend {
        println!("  {day:<10} ${spent:>8.2}");
    }
    println!();

    println!("Top spending locations");
    for (location, spent) in &top_spend_locations {
        println!("  ${spent:>8.2}  {location}");
    }
    println!();

    println!("Fare overview");
    println!("  Average fare:      ${:.2}", summary.avg_fare);
    println!("  Median fare:       ${:.2}", summary.median_fare);
    println!("  Max fare:          ${:.2}", summary.max_fare);
    println!("  Std deviation:     ${:.2}", summary.fare_stddev);
    println!(
        "  Projected annual:  ${:.2}",
        summary.projected_annual_spend
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_filters() {
        let cli = Cli::try_parse_from([
            "transitlens",
            "summary",
            "trips.csv",
            "--start",
            "2024-01-01",
            "--end",
            "2024-06-30",
            "--agency",
            "GO",
        ])
        .unwrap();

        match cli.command {
            Commands::Summary { filters, .. } => {
                let filter = filters.to_filter();
                assert_eq!(filter.start.unwrap().to_string(), "2024-01-01");
                assert_eq!(filter.end.unwrap().to_string(), "2024-06-30");
                assert_eq!(filter.agency.as_deref(), Some("GO"));
                assert!(filter.location_contains.is_none());
            }
            _ => panic!("expected summary subcommand"),
        }
    }

    #[test]
    fn test_cli_rejects_bad_date() {
        let result = Cli::try_parse_from(["transitlens", "export", "trips.csv", "--start", "soon"]);
        assert!(result.is_err());
    }
}
