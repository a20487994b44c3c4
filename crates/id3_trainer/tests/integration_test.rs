//! Integration tests for the ID3 trainer
//!
//! Drives the library entry points and the `id3` binary over files written
//! to temporary directories.

use anyhow::Result;
use id3_core::{BuildConfig, FallbackPolicy, Id3Error};
use id3_trainer::{
    cross_validate_files, inspect_csv, predict_from_csv, train_from_files, LoadedData,
    TrainerConfig, TrainerError,
};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::{NamedTempFile, TempDir};

fn write_file(dir: &Path, name: &str, lines: &[&str]) -> Result<PathBuf> {
    let path = dir.join(name);
    let mut file = std::fs::File::create(&path)?;
    for line in lines {
        writeln!(file, "{line}")?;
    }
    file.flush()?;
    Ok(path)
}

fn weather_files(dir: &Path) -> Result<(PathBuf, PathBuf)> {
    let schema = write_file(
        dir,
        "weather.schema",
        &["Weather:sun,rain", "Humid:y,n", "Play:yes,no"],
    )?;
    let data = write_file(
        dir,
        "weather.data",
        &["Weather,Humid,Play", "sun,n,yes", "sun,y,no", "rain,n,yes", "rain,y,yes"],
    )?;
    Ok((schema, data))
}

fn party_files(dir: &Path) -> Result<(PathBuf, PathBuf)> {
    let train = write_file(
        dir,
        "train.csv",
        &["A,B,party", "y,n,dem", "y,y,dem", "n,y,rep", "n,n,rep", "y,n,dem"],
    )?;
    let test = write_file(dir, "test.csv", &["A,B,party", "y,y,rep", "n,n,rep"])?;
    Ok((train, test))
}

#[test]
fn test_train_from_files() -> Result<()> {
    let dir = TempDir::new()?;
    let (schema, data) = weather_files(dir.path())?;

    let tree = train_from_files(&schema, &data, None, &TrainerConfig::default())?;
    assert_eq!(tree.classifier().name(), "Play");
    assert_eq!(
        tree.dump(),
        "[1 no / 3 yes]\n\
         | Humid = n: [0 no / 2 yes] -> yes\n\
         | Humid = y: [1 no / 1 yes]\n\
         | | Weather = rain: [0 no / 1 yes] -> yes\n\
         | | Weather = sun: [1 no / 0 yes] -> no\n"
    );

    // Same result when the classifier is named explicitly
    let named = train_from_files(&schema, &data, Some("Play"), &TrainerConfig::default())?;
    assert_eq!(named, tree);

    assert!(matches!(
        train_from_files(&schema, &data, Some("Wind"), &TrainerConfig::default()),
        Err(TrainerError::Core(_))
    ));
    Ok(())
}

#[test]
fn test_schema_error_carries_location() -> Result<()> {
    let dir = TempDir::new()?;
    let (schema, _) = weather_files(dir.path())?;
    let data = write_file(dir.path(), "bad.data", &["sun,n,yes", "hail,n,yes"])?;

    let err = LoadedData::load(&schema, &data).unwrap_err();
    assert!(matches!(err, TrainerError::Schema { line: 2, .. }));
    assert!(err.to_string().contains("bad.data:2"));
    Ok(())
}

#[test]
fn test_cross_validation_from_files() -> Result<()> {
    let dir = TempDir::new()?;
    let schema = write_file(
        dir.path(),
        "tennis.schema",
        &["Outlook:sunny,overcast,rain", "Wind:weak,strong", "Play:yes,no"],
    )?;
    let data = write_file(
        dir.path(),
        "tennis.data",
        &[
            "d1:sunny,weak,no",
            "d2:sunny,strong,no",
            "d3:overcast,weak,yes",
            "d4:rain,weak,yes",
            "d5:rain,strong,no",
            "d6:overcast,strong,yes",
        ],
    )?;

    let mut config = TrainerConfig::default();
    config.cross_validation.folds = 6;
    let report = cross_validate_files(&schema, &data, None, &config)?;
    assert_eq!(report.folds.len(), 6);
    assert!((report.mean_accuracy - 2.0 / 3.0).abs() < 1e-12);

    config.cross_validation.parallel = true;
    assert_eq!(cross_validate_files(&schema, &data, None, &config)?, report);
    Ok(())
}

#[test]
fn test_predict_from_csv() -> Result<()> {
    let dir = TempDir::new()?;
    let (train, test) = party_files(dir.path())?;

    let mut config = TrainerConfig::default();
    config.set_max_depth(0);
    let run = predict_from_csv(&train, &test, &config)?;

    assert_eq!(run.train_predictions, vec!["dem", "dem", "rep", "rep", "dem"]);
    assert_eq!(run.test_predictions, vec!["dem", "rep"]);
    assert_eq!(run.metrics.train_error, 0.0);
    assert_eq!(run.metrics.test_error, 0.5);
    assert_eq!(
        run.tree.dump(),
        "[3 dem / 2 rep]\n\
         | A = n: [0 dem / 2 rep] -> rep\n\
         | A = y: [3 dem / 0 rep] -> dem\n"
    );
    Ok(())
}

#[test]
fn test_predict_unseen_test_value_follows_unknown_policy() -> Result<()> {
    let dir = TempDir::new()?;
    let (train, _) = party_files(dir.path())?;
    let test = write_file(dir.path(), "unseen.csv", &["A,B,party", "maybe,y,rep", "y,y,dem"])?;

    let mut config = TrainerConfig::default();
    config.set_max_depth(0);
    let run = predict_from_csv(&train, &test, &config)?;
    assert_eq!(run.test_predictions, vec!["unknown", "dem"]);
    assert_eq!(run.metrics.test_error, 0.5);
    assert_eq!(run.train_predictions, vec!["dem", "dem", "rep", "rep", "dem"]);

    config.strict = true;
    let err = predict_from_csv(&train, &test, &config).unwrap_err();
    match err {
        TrainerError::Core(Id3Error::UnknownPath { attribute, value }) => {
            assert_eq!(attribute, "A");
            assert_eq!(value, "maybe");
        }
        other => panic!("unexpected error: {other}"),
    }
    Ok(())
}

#[test]
fn test_predict_rejects_mismatched_headers() -> Result<()> {
    let dir = TempDir::new()?;
    let (train, _) = party_files(dir.path())?;
    let other = write_file(dir.path(), "other.csv", &["A,C,party", "y,y,rep"])?;

    assert!(matches!(
        predict_from_csv(&train, &other, &TrainerConfig::default()),
        Err(TrainerError::Parse { .. })
    ));
    Ok(())
}

#[test]
fn test_inspect_csv() -> Result<()> {
    let mut file = NamedTempFile::new()?;
    writeln!(file, "A,label")?;
    writeln!(file, "y,dem")?;
    writeln!(file, "n,rep")?;
    writeln!(file, "y,dem")?;
    writeln!(file, "n,dem")?;
    file.flush()?;

    let report = inspect_csv(file.path())?;
    assert!((report.entropy - 0.811_278_124_459_132_8).abs() < 1e-12);
    assert_eq!(report.error, 0.25);
    Ok(())
}

#[test]
fn test_config_file_drives_builder() -> Result<()> {
    let mut file = NamedTempFile::new()?;
    writeln!(file, "[tree]")?;
    writeln!(file, "fallback = \"smallest_label\"")?;
    file.flush()?;

    let config = TrainerConfig::load(file.path())?;
    assert_eq!(
        config.tree,
        BuildConfig::multi_way().with_fallback(FallbackPolicy::SmallestLabel)
    );
    Ok(())
}

#[test]
fn test_cli_predict_writes_outputs() -> Result<()> {
    let dir = TempDir::new()?;
    let (train, test) = party_files(dir.path())?;
    let train_out = dir.path().join("train.labels");
    let test_out = dir.path().join("test.labels");
    let metrics_out = dir.path().join("metrics.txt");

    let output = Command::new(env!("CARGO_BIN_EXE_id3"))
        .arg("predict")
        .arg(&train)
        .arg(&test)
        .arg("--max-depth")
        .arg("-1")
        .arg("--train-out")
        .arg(&train_out)
        .arg("--test-out")
        .arg(&test_out)
        .arg("--metrics-out")
        .arg(&metrics_out)
        .output()?;
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    assert!(String::from_utf8(output.stdout)?.starts_with("[3 dem / 2 rep]\n"));
    assert_eq!(std::fs::read_to_string(&train_out)?, "dem\ndem\nrep\nrep\ndem\n");
    assert_eq!(std::fs::read_to_string(&test_out)?, "dem\nrep\n");
    assert_eq!(
        std::fs::read_to_string(&metrics_out)?,
        "error(train): 0\nerror(test): 0.5\n"
    );
    Ok(())
}

#[test]
fn test_cli_train_reports_accuracy() -> Result<()> {
    let dir = TempDir::new()?;
    let (schema, data) = weather_files(dir.path())?;
    let test = write_file(dir.path(), "weather.test", &["sun,y,no", "rain,y,no"])?;

    let output = Command::new(env!("CARGO_BIN_EXE_id3"))
        .args(["train", "--schema"])
        .arg(&schema)
        .arg("--data")
        .arg(&data)
        .arg("--test")
        .arg(&test)
        .output()?;
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let stdout = String::from_utf8(output.stdout)?;
    assert!(stdout.ends_with("1 of 2 (50.00%) of testing examples correctly identified\n"));
    Ok(())
}

#[test]
fn test_cli_inspect_and_missing_file() -> Result<()> {
    let dir = TempDir::new()?;
    let input = write_file(dir.path(), "labels.csv", &["A,label", "y,dem", "n,rep"])?;

    let output = Command::new(env!("CARGO_BIN_EXE_id3"))
        .arg("inspect")
        .arg(&input)
        .output()?;
    assert!(output.status.success());
    assert_eq!(String::from_utf8(output.stdout)?, "entropy: 1\nerror: 0.5\n");

    let missing = Command::new(env!("CARGO_BIN_EXE_id3"))
        .arg("inspect")
        .arg(dir.path().join("absent.csv"))
        .output()?;
    assert!(!missing.status.success());
    Ok(())
}
