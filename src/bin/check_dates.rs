//! Looks up holiday information for a list of dates from the command line.

use clap::Parser;
use rust_holiday_api::config::Config;
use rust_holiday_api::holiday_client::{HolidayClient, HolidaySource};
use rust_holiday_api::models::NormalizedHolidayRecord;

#[derive(Debug, Parser)]
#[command(name = "check-dates", about = "Check holiday status for one or more dates")]
struct Args {
    /// Dates in YYYY-MM-DD format.
    #[arg(required = true)]
    dates: Vec<String>,

    /// Print the normalized records as JSON instead of a summary.
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let config = Config::from_env()?;
    let client = HolidayClient::new(
        config.holiday_api_base_url.clone(),
        config.holiday_api_timeout(),
    )?;

    let mut records: Vec<NormalizedHolidayRecord> = Vec::new();
    for date in &args.dates {
        match client.fetch_holiday_info(date).await {
            Ok(record) => records.push(record),
            Err(e) => eprintln!("{}: {} ({})", date, e, e.kind()),
        }
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&records)?);
    } else {
        print_summary(&records);
    }

    client.close();
    Ok(())
}

fn print_summary(records: &[NormalizedHolidayRecord]) {
    for record in records {
        println!("{}", record);
        println!(
            "  Type: {} (code: {})",
            record.day_type.description(),
            record.day_type_code
        );
        println!("  Working Day: {}", record.is_working_day);
        println!("  Rest Day: {}", record.is_rest_day);
        if let Some(name) = &record.holiday_name {
            println!("  Holiday: {}", name);
            println!("  Wage Multiplier: {}x", record.wage_multiplier);
        }
        println!("{}", "-".repeat(50));
    }

    let holidays: Vec<_> = records.iter().filter(|r| r.is_holiday).collect();
    let workdays: Vec<_> = records.iter().filter(|r| r.is_working_day).collect();

    println!("\nFound {} holidays:", holidays.len());
    for record in holidays {
        println!("  - {}", record);
    }
    println!("\nFound {} working days:", workdays.len());
    for record in workdays {
        println!("  - {}", record);
    }
}
