use emissions_classifier::config::PipelineConfig;
use emissions_classifier::prelude::*;
use emissions_classifier::split::split_by_label;
use emissions_classifier::table::csv::read_csv_from_reader;

const DROPPED: [&str; 13] = [
    "urban_metric",
    "extra_urban_metric",
    "urban_imperial",
    "extra_urban_imperial",
    "combined_imperial",
    "thc_nox_emissions",
    "fuel_cost_6000_miles",
    "standard_12_months",
    "standard_6_months",
    "first_year_12_months",
    "first_year_6_months",
    "model",
    "description",
];

const ROWS: usize = 32;

fn tax_band(co2: f64) -> &'static str {
    match co2 {
        c if c < 140.0 => "B",
        c if c < 190.0 => "F",
        _ => "K",
    }
}

/// A raw emissions extract with every column the default configuration uses.
fn raw_csv(rows: usize) -> String {
    let mut header = vec!["file", "date_of_change", "manufacturer", "model", "description"];
    header.extend(&DROPPED[..11]);
    header.extend([
        "year",
        "euro_standard",
        "noise_level",
        "engine_capacity",
        "combined_metric",
        "fuel_cost_12000_miles",
        "co2",
        "thc_emissions",
        "co_emissions",
        "nox_emissions",
        "particulates_emissions",
        "transmission",
        "transmission_type",
        "fuel_type",
        "tax_band",
    ]);

    let mut csv = header.join(",");
    csv.push('\n');
    for i in 0..rows {
        let manufacturer = match i {
            6 => "Ferrari",
            i if i % 3 == 0 => "Ford",
            i if i % 3 == 1 => "Vauxhall",
            _ => "BMW",
        };
        let transmission = ["M5", "A4", "ASM  ", "AM5"][i % 4];
        let transmission_type = if i % 2 == 0 { "Manual" } else { "Automatic" };
        let fuel_type = match i {
            5 => "",
            i if i % 3 == 0 => "Diesel",
            _ => "Petrol",
        };
        let co2 = 100.0 + ((i * 37) % 150) as f64;
        let band = if i % 8 == 7 { "" } else { tax_band(co2) };
        let nox = if i % 5 == 0 { String::new() } else { format!("{}", 20 + i) };
        let particulates = if i % 2 == 1 { String::new() } else { "0.01".to_string() };

        let mut cells = vec![
            format!("file_{}.csv", i % 2),
            "2012-06-01".to_string(),
            manufacturer.to_string(),
            format!("Model {}", i % 5),
            format!("\"Trim {}, {} door\"", i % 3, 3 + i % 2),
        ];
        cells.extend((0..11).map(|k| format!("{}", k * 10 + i)));
        cells.extend([
            format!("{}", 2000 + i % 10),
            format!("{}", 3 + i % 2),
            format!("{:.1}", 70.0 + (i % 6) as f64),
            format!("{}", 1000 + 100 * (i % 10)),
            format!("{:.1}", co2 / 25.0),
            format!("{}", 900 + 10 * i),
            format!("{}", co2),
            String::new(),
            format!("{}", 300 + i),
            nox,
            particulates,
            transmission.to_string(),
            transmission_type.to_string(),
            fuel_type.to_string(),
            band.to_string(),
        ]);
        csv.push_str(&cells.join(","));
        csv.push('\n');
    }
    csv
}

fn cleaned_table(rows: usize) -> Table {
    let mut table = read_csv_from_reader(raw_csv(rows).as_bytes()).unwrap();
    Cleaner::default().clean(&mut table).unwrap();
    table
}

#[test]
fn test_cleaning_drops_bookkeeping_columns_and_fixes_transmission() {
    let mut table = read_csv_from_reader(raw_csv(ROWS).as_bytes()).unwrap();
    assert_eq!(table.n_rows(), ROWS);

    let summary = Cleaner::default().clean(&mut table).unwrap();

    assert_eq!(summary.dropped, vec!["file".to_string(), "date_of_change".to_string()]);
    assert_eq!(summary.replaced, ROWS / 4);
    assert!(!table.has_column("file"));
    assert!(!table.has_column("date_of_change"));
    assert!(table
        .categorical("transmission")
        .unwrap()
        .iter()
        .flatten()
        .all(|t| t != "ASM  "));

    // Cleaning twice changes nothing.
    let again = Cleaner::default().clean(&mut table).unwrap();
    assert!(again.dropped.is_empty());
    assert_eq!(again.replaced, 0);
}

#[test]
fn test_default_encoder_produces_indicator_features() {
    let rows = 10;
    let mut table = cleaned_table(rows);
    table.remove_column("tax_band").unwrap();

    let encoder = FeatureEncoder::default().fit(&table).unwrap();
    let features = encoder.transform(&table).unwrap();

    assert!(features.categorical_columns().is_empty());
    for dropped in DROPPED {
        assert!(!features.has_column(dropped), "{} survived encoding", dropped);
    }

    let names = encoder.feature_names();
    let indicators = |prefix: &str| -> Vec<String> {
        names
            .iter()
            .filter_map(|n| n.strip_prefix(prefix))
            .filter(|rest| !rest.starts_with("type_"))
            .map(str::to_string)
            .collect()
    };
    // Ferrari and AM5 are rare; the missing fuel type lands in Other.
    assert_eq!(indicators("manufacturer_"), ["BMW", "Ford", "Other", "Vauxhall"]);
    assert_eq!(indicators("transmission_"), ["A4", "ASM", "M5", "Other"]);
    assert_eq!(indicators("transmission_type_"), ["Automatic", "Manual"]);
    assert_eq!(indicators("fuel_type_"), ["Diesel", "Other", "Petrol"]);
    assert_eq!(features.numeric("manufacturer_Other").unwrap()[6], Some(1.0));
    assert_eq!(features.numeric("fuel_type_Other").unwrap()[5], Some(1.0));

    let matrix = encoder.transform_to_matrix(&table).unwrap();
    assert_eq!(matrix.nrows(), rows);
    assert_eq!(matrix.ncols(), encoder.n_features_out());
    assert!(matrix.iter().all(|v| v.is_finite()));

    for prefix in ["manufacturer_", "transmission_", "transmission_type_", "fuel_type_"] {
        let columns: Vec<String> = indicators(prefix)
            .into_iter()
            .map(|value| format!("{}{}", prefix, value))
            .collect();
        for row in 0..rows {
            let sum: f64 = columns
                .iter()
                .map(|c| features.numeric(c).unwrap()[row].unwrap())
                .sum();
            assert_eq!(sum, 1.0, "row {} of {}", row, prefix);
        }
    }
}

#[test]
fn test_default_encoder_schema_is_stable() {
    let mut table = cleaned_table(ROWS);
    table.remove_column("tax_band").unwrap();
    let reversed: Vec<usize> = (0..ROWS).rev().collect();

    let first = FeatureEncoder::default().fit(&table).unwrap();
    let again = FeatureEncoder::default().fit(&table).unwrap();
    let shuffled = FeatureEncoder::default().fit(&table.take(&reversed)).unwrap();

    assert_eq!(first.feature_names(), again.feature_names());
    assert_eq!(first.feature_names(), shuffled.feature_names());
    assert_eq!(first.one_hot().categories(), shuffled.one_hot().categories());
}

#[tokio::test]
async fn test_pipeline_from_csv_to_predictions() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("emissions.db");

    let cleaned = cleaned_table(ROWS);
    let store = SqliteStore::open(&db).await.unwrap();
    store.write_table(EMISSIONS_TABLE, &cleaned).await.unwrap();
    store.close().await;

    let store = SqliteStore::open(&db).await.unwrap();
    let stored = store.read_table(EMISSIONS_TABLE).await.unwrap();
    store.close().await;
    assert_eq!(stored, cleaned);

    let mut config = PipelineConfig::default();
    config.search.cv_folds = 2;
    config.search.n_trees = vec![5];
    let outcome = Trainer::from_config(config).unwrap().fit(&stored).unwrap();

    assert_eq!(outcome.unlabelled.n_rows(), ROWS / 8);
    assert_eq!(outcome.train_rows + outcome.test_rows, ROWS - ROWS / 8);
    assert_eq!(outcome.model.search().candidates.len(), 2);
    assert!((0.0..=1.0).contains(&outcome.report.accuracy));

    let model_path = dir.path().join("classifier.bin");
    outcome.model.save_to_file(&model_path).unwrap();
    let loaded = TrainedModel::load_from_file(&model_path).unwrap();

    let (_, unlabelled) = split_by_label(&stored, "tax_band").unwrap();
    let predictions = loaded.predict(&unlabelled).unwrap();
    assert_eq!(predictions, outcome.model.predict(&unlabelled).unwrap());
    assert_eq!(predictions.len(), ROWS / 8);

    let classes = loaded.pipeline().classes();
    assert!(predictions.iter().all(|p| classes.contains(p)));
}
