use std::fs;
use std::path::PathBuf;

use sales_dash::app::pipeline::{forecast_report, run_dashboard};
use sales_dash::domain::{DashboardConfig, Delimiter, InputSource, Profile};

fn write_csv(name: &str, text: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("sdash-it-{}", std::process::id()));
    fs::create_dir_all(&dir).unwrap();
    let path = dir.join(name);
    fs::write(&path, text).unwrap();
    path
}

fn config(path: PathBuf, profile: Profile) -> DashboardConfig {
    DashboardConfig {
        profile,
        ..DashboardConfig::with_input(InputSource::File(path))
    }
}

#[test]
fn revenue_transactions_forecast_next_month() {
    let path = write_csv(
        "revenue.csv",
        "tanggal,kategori,jumlah,harga,pendapatan\n\
         2024-01-03,Elektronik,1,100,100\n\
         2024-01-20,Pakaian,2,50,100\n\
         2024-02-11,Elektronik,1,300,300\n\
         2024-03-05,Makanan,4,100,400\n\
         2024-03-28,Elektronik,1,100,100\n",
    );
    let run = run_dashboard(&config(path, Profile::Revenue)).unwrap();

    // Monthly totals 200, 300, 500.
    let values: Vec<f64> = run.series.as_ref().unwrap().observations.iter().map(|o| o.value).collect();
    assert_eq!(values, vec![200.0, 300.0, 500.0]);

    let fit = run.fit.as_ref().unwrap();
    assert!((fit.slope - 150.0).abs() < 1e-9);
    let next = run.next.unwrap();
    assert_eq!(next.period.to_string(), "2024-04");
    assert!((next.value - 633.333_333_333_3).abs() < 1e-6);

    let titles: Vec<&str> = run.charts.iter().map(|c| c.title.as_str()).collect();
    assert_eq!(titles.len(), 6);
    assert!(titles.contains(&"Transactions by category"));
    assert!(run.warnings.is_empty(), "unexpected warnings: {:?}", run.warnings);
}

#[test]
fn revenue_without_revenue_column_is_a_parse_error() {
    let path = write_csv("revenue-missing.csv", "tanggal,kategori\n2024-01-01,A\n");
    let err = run_dashboard(&config(path, Profile::Revenue)).unwrap_err();
    assert_eq!(err.exit_code(), 2);
    assert!(err.message().contains("`pendapatan` (numeric)"));
}

#[test]
fn monthly_semicolon_file_with_override_column() {
    let path = write_csv("monthly.csv", "Bulan;Omzet\n2024-01;1000\n2024-02;1100\n2024-03;1200\n");
    let cfg = DashboardConfig {
        delimiter: Delimiter::Semicolon,
        value_column: Some("Omzet".to_string()),
        ..config(path, Profile::Monthly)
    };
    let run = run_dashboard(&cfg).unwrap();
    let report = forecast_report(&run).unwrap();

    assert_eq!(report.value_column, "Omzet");
    assert_eq!(report.next_period.to_string(), "2024-04");
    assert!((report.next_value - 1300.0).abs() < 1e-9);
    assert!((report.r_squared - 1.0).abs() < 1e-12);
    assert!(report.mae.abs() < 1e-9);
}

#[test]
fn single_month_keeps_dashboard_and_warns() {
    let path = write_csv("one-month.csv", "month,value\n2024-05,10\n");
    let run = run_dashboard(&config(path, Profile::Monthly)).unwrap();

    assert!(run.fit.is_none());
    assert!(run.forecast_warning.as_deref().unwrap().contains("Insufficient data"));
    assert!(!run.charts.is_empty());
    assert_eq!(forecast_report(&run).unwrap_err().exit_code(), 3);
}

#[test]
fn demo_dataset_runs_end_to_end() {
    let cfg = DashboardConfig::with_input(InputSource::Demo {
        months: 12,
        rows_per_month: 30,
        seed: 11,
    });
    let run = run_dashboard(&cfg).unwrap();

    assert_eq!(run.ingest.dataset.len(), 360);
    assert_eq!(run.ingest.dataset.delimiter, Delimiter::Semicolon);
    assert_eq!(run.charts.len(), 8);
    assert!(run.warnings.is_empty(), "unexpected warnings: {:?}", run.warnings);

    // The generator drifts upwards every month.
    let fit = run.fit.as_ref().unwrap();
    assert!(fit.slope > 0.0);
    assert_eq!(run.next.unwrap().period.to_string(), "2025-01");
}

#[test]
fn exports_write_csv_and_json() {
    let path = write_csv("export-src.csv", "month,value\n2024-01,10\n2024-02,20\n");
    let run = run_dashboard(&config(path.clone(), Profile::Monthly)).unwrap();
    let report = forecast_report(&run).unwrap();

    let csv_path = path.with_file_name("export.csv");
    let json_path = path.with_file_name("export.json");
    sales_dash::io::export::write_forecast_csv(&csv_path, &report).unwrap();
    sales_dash::io::export::write_forecast_json(&json_path, &report).unwrap();

    let csv_text = fs::read_to_string(&csv_path).unwrap();
    assert_eq!(csv_text.lines().count(), 4);
    assert!(csv_text.ends_with("2024-03,2,,30.0000,\n"));

    let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(&json_path).unwrap()).unwrap();
    assert_eq!(json["tool"], "sdash");
    assert_eq!(json["periods"].as_array().unwrap().len(), 2);
}
