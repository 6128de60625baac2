use std::fs::{self, File};
use std::path::{Path, PathBuf};

use arrow::datatypes::DataType as ArrowDataType;
use nhl_ingest::columnar::parquet_row_count;
use nhl_ingest::convert::raw_to_parquet;
use nhl_ingest::IngestConfig;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::basic::Compression;
use parquet::file::reader::FileReader;
use parquet::file::serialized_reader::SerializedFileReader;
use tempfile::TempDir;

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures").join(name)
}

fn project() -> (TempDir, IngestConfig) {
    let dir = tempfile::tempdir().unwrap();
    let config = IngestConfig::from_project_root(dir.path());
    fs::create_dir_all(&config.raw_dir).unwrap();
    fs::create_dir_all(&config.bronze_dir).unwrap();
    (dir, config)
}

#[test]
fn csv_becomes_one_snappy_artifact() {
    let (_dir, config) = project();
    let raw = config.raw_dir.join("games.csv");
    fs::copy(fixture("games.csv"), &raw).unwrap();

    let artifacts = raw_to_parquet(&raw, &config);
    assert_eq!(artifacts.len(), 1);
    let artifact = &artifacts[0];
    assert_eq!(artifact.path, config.bronze_dir.join("games.parquet"));
    assert_eq!(artifact.rows, 10);
    assert_eq!(artifact.columns, 3);
    assert_eq!(parquet_row_count(&artifact.path).unwrap(), 10);

    let reader = SerializedFileReader::try_from(artifact.path.as_path()).unwrap();
    let column = reader.metadata().row_group(0).column(0).compression();
    assert_eq!(column, Compression::SNAPPY);

    let builder = ParquetRecordBatchReaderBuilder::try_new(File::open(&artifact.path).unwrap()).unwrap();
    let schema = builder.schema().clone();
    let names: Vec<&str> = schema.fields().iter().map(|f| f.name().as_str()).collect();
    assert_eq!(names, vec!["game_id", "home_team", "home_goals"]);
    assert_eq!(schema.field(0).data_type(), &ArrowDataType::Int64);
    assert_eq!(schema.field(1).data_type(), &ArrowDataType::Utf8);
}

#[test]
fn missing_file_produces_nothing() {
    let (_dir, config) = project();
    let artifacts = raw_to_parquet(config.raw_dir.join("nope.csv"), &config);
    assert!(artifacts.is_empty());
}

#[test]
fn zero_byte_file_produces_nothing() {
    let (_dir, config) = project();
    let raw = config.raw_dir.join("empty.csv");
    fs::write(&raw, b"").unwrap();

    assert!(raw_to_parquet(&raw, &config).is_empty());
    assert!(!config.bronze_dir.join("empty.parquet").exists());
}

#[test]
fn header_only_csv_produces_nothing() {
    let (_dir, config) = project();
    let raw = config.raw_dir.join("schedule.csv");
    fs::write(&raw, "game_id,home_team\n").unwrap();

    assert!(raw_to_parquet(&raw, &config).is_empty());
    assert!(!config.bronze_dir.join("schedule.parquet").exists());
}

#[test]
fn corrupt_csv_produces_nothing() {
    let (_dir, config) = project();
    let raw = config.raw_dir.join("corrupt.csv");
    fs::copy(fixture("corrupt.csv"), &raw).unwrap();

    assert!(raw_to_parquet(&raw, &config).is_empty());
    assert!(!config.bronze_dir.join("corrupt.parquet").exists());
}

#[test]
fn short_rows_still_convert() {
    let (_dir, config) = project();
    let raw = config.raw_dir.join("shots.csv");
    fs::write(&raw, "period,team,shots\n1,EDM,12\n2,EDM\n").unwrap();

    let artifacts = raw_to_parquet(&raw, &config);
    assert_eq!(artifacts.len(), 1);
    assert_eq!(artifacts[0].rows, 2);
    assert_eq!(parquet_row_count(&artifacts[0].path).unwrap(), 2);
}

#[test]
fn rerun_overwrites_artifact() {
    let (_dir, config) = project();
    let raw = config.raw_dir.join("standings.csv");
    fs::write(&raw, "team,points\nEDM,104\nVAN,109\nDAL,113\n").unwrap();
    let first = raw_to_parquet(&raw, &config);
    assert_eq!(parquet_row_count(&first[0].path).unwrap(), 3);

    fs::write(&raw, "team,points\nFLA,110\n").unwrap();
    let second = raw_to_parquet(&raw, &config);
    assert_eq!(first[0].path, second[0].path);
    assert_eq!(parquet_row_count(&second[0].path).unwrap(), 1);
}

#[cfg(feature = "excel")]
#[test]
fn workbook_yields_one_artifact_per_non_empty_sheet() {
    use rust_xlsxwriter::Workbook;

    let (_dir, config) = project();
    let raw = config.raw_dir.join("stats.xlsx");

    let mut wb = Workbook::new();
    let sheets = [("Regular Season", 4u32), ("Blank", 0), ("Playoffs!", 2)];
    for (name, rows) in sheets {
        let ws = wb.add_worksheet();
        ws.set_name(name).unwrap();
        if rows > 0 {
            ws.write_string(0, 0, "player").unwrap();
            ws.write_string(0, 1, "points").unwrap();
            for r in 1..=rows {
                ws.write_string(r, 0, format!("player{r}")).unwrap();
                ws.write_number(r, 1, r * 10).unwrap();
            }
        }
    }
    wb.save(&raw).unwrap();

    let artifacts = raw_to_parquet(&raw, &config);
    let paths: Vec<PathBuf> = artifacts.iter().map(|a| a.path.clone()).collect();
    assert_eq!(
        paths,
        vec![
            config.bronze_dir.join("stats_regularseason.parquet"),
            config.bronze_dir.join("stats_playoffs.parquet"),
        ]
    );
    assert_eq!(parquet_row_count(&paths[0]).unwrap(), 4);
    assert_eq!(parquet_row_count(&paths[1]).unwrap(), 2);
    assert!(!config.bronze_dir.join("stats_blank.parquet").exists());
}
