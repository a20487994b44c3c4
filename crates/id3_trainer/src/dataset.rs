//! Attribute schema and example file loading
//!
//! Two input layouts are supported:
//!
//! - A schema file (`name:v1,v2,...` per line) plus a headerless data file
//!   whose columns follow the schema order.
//! - Headered CSV files whose first row names the columns and whose final
//!   column is the classifier. The catalog is inferred from the values
//!   observed across the given files.

use id3_core::{Attribute, AttributeCatalog, Example, ExampleTable};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::errors::TrainerError;

type Result<T> = std::result::Result<T, TrainerError>;

fn read(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|err| TrainerError::io(path, err))
}

/// Non-empty, non-comment lines with their 1-based line numbers
fn content_lines(content: &str) -> impl Iterator<Item = (usize, &str)> {
    content
        .lines()
        .enumerate()
        .map(|(idx, line)| (idx + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'))
}

fn split_fields(line: &str) -> Vec<String> {
    line.split(',').map(|s| s.trim().to_string()).collect()
}

/// Load an attribute schema file
pub fn load_attributes<P: AsRef<Path>>(path: P) -> Result<AttributeCatalog> {
    let path = path.as_ref();
    parse_attributes(&read(path)?, path)
}

/// Parse schema text, one `name:v1,v2,...` attribute per line
pub fn parse_attributes(content: &str, origin: &Path) -> Result<AttributeCatalog> {
    let mut catalog = AttributeCatalog::new();

    for (line, text) in content_lines(content) {
        let (name, values) = text.split_once(':').ok_or_else(|| TrainerError::Parse {
            path: origin.to_path_buf(),
            line,
            message: format!("expected name:value,... but got {text:?}"),
        })?;

        let schema_error = |source| TrainerError::Schema {
            path: origin.to_path_buf(),
            line,
            source,
        };
        let attribute = Attribute::new(name.trim(), split_fields(values)).map_err(schema_error)?;
        catalog.push(attribute).map_err(schema_error)?;
    }

    if catalog.is_empty() {
        return Err(TrainerError::Parse {
            path: origin.to_path_buf(),
            line: 0,
            message: "schema declares no attributes".to_string(),
        });
    }

    Ok(catalog)
}

/// Load a headerless (or catalog-headed) data file against `catalog`
pub fn load_examples<P: AsRef<Path>>(path: P, catalog: &AttributeCatalog) -> Result<ExampleTable> {
    let path = path.as_ref();
    parse_examples(&read(path)?, catalog, path)
}

/// Parse data rows in catalog column order
///
/// Anything up to the last `:` on a line is treated as a row tag and
/// dropped. A first row equal to the catalog's names is a header.
pub fn parse_examples(content: &str, catalog: &AttributeCatalog, origin: &Path) -> Result<ExampleTable> {
    let header: Vec<&str> = catalog.names().collect();
    let mut table = ExampleTable::new();

    for (position, (line, text)) in content_lines(content).enumerate() {
        let untagged = text.rsplit(':').next().unwrap_or(text);
        let fields = split_fields(untagged);

        if position == 0 && fields == header {
            continue;
        }

        let example = Example::new(fields, catalog).map_err(|source| TrainerError::Schema {
            path: origin.to_path_buf(),
            line,
            source,
        })?;
        table.push(example);
    }

    Ok(table)
}

/// Raw rows of a headered CSV file
#[derive(Clone, Debug)]
pub struct CsvFile {
    pub path: PathBuf,
    pub header: Vec<String>,
    pub rows: Vec<(usize, Vec<String>)>,
}

impl CsvFile {
    /// Read a CSV file whose first row names the columns
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        Self::parse(&read(path)?, path)
    }

    pub fn parse(content: &str, origin: &Path) -> Result<Self> {
        let mut lines = content_lines(content);
        let (_, header_line) = lines.next().ok_or_else(|| TrainerError::Parse {
            path: origin.to_path_buf(),
            line: 0,
            message: "file has no header row".to_string(),
        })?;
        let header = split_fields(header_line);
        if header.len() < 2 {
            return Err(TrainerError::Parse {
                path: origin.to_path_buf(),
                line: 1,
                message: "expected at least 2 columns".to_string(),
            });
        }

        let mut rows = Vec::new();
        for (line, text) in lines {
            let fields = split_fields(text);
            if fields.len() != header.len() {
                return Err(TrainerError::Parse {
                    path: origin.to_path_buf(),
                    line,
                    message: format!("expected {} columns, got {}", header.len(), fields.len()),
                });
            }
            rows.push((line, fields));
        }

        Ok(Self {
            path: origin.to_path_buf(),
            header,
            rows,
        })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Name of the final column
    pub fn classifier_name(&self) -> &str {
        self.header.last().map(String::as_str).unwrap_or_default()
    }

    /// Convert rows into examples of `catalog`
    pub fn to_table(&self, catalog: &AttributeCatalog) -> Result<ExampleTable> {
        let mut table = ExampleTable::new();
        for (line, fields) in &self.rows {
            let example = Example::new(fields.iter().cloned(), catalog).map_err(|source| {
                TrainerError::Schema {
                    path: self.path.clone(),
                    line: *line,
                    source,
                }
            })?;
            table.push(example);
        }
        Ok(table)
    }
}

/// Catalog whose domains are the sorted values observed across `files`
///
/// All files must share the same header.
pub fn infer_catalog(files: &[&CsvFile]) -> Result<AttributeCatalog> {
    let first = files
        .first()
        .ok_or_else(|| TrainerError::Config("no input files".to_string()))?;

    for file in &files[1..] {
        if file.header != first.header {
            return Err(TrainerError::Parse {
                path: file.path.clone(),
                line: 1,
                message: format!(
                    "header {:?} does not match {:?} from {}",
                    file.header,
                    first.header,
                    first.path.display()
                ),
            });
        }
    }

    let mut catalog = AttributeCatalog::new();
    for (column, name) in first.header.iter().enumerate() {
        let observed: BTreeSet<&str> = files
            .iter()
            .flat_map(|file| file.rows.iter().map(move |(_, fields)| fields[column].as_str()))
            .collect();

        let attribute = Attribute::new(name.as_str(), observed).map_err(|source| TrainerError::Schema {
            path: first.path.clone(),
            line: 1,
            source,
        })?;
        catalog.push(attribute).map_err(|source| TrainerError::Schema {
            path: first.path.clone(),
            line: 1,
            source,
        })?;
    }

    Ok(catalog)
}

#[cfg(test)]
mod tests {
    use super::*;
    use id3_core::Id3Error;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SCHEMA: &str = "# weather schema\nWeather:sun,rain\nHumid:y,n\n\nPlay:yes,no\n";

    fn schema() -> AttributeCatalog {
        parse_attributes(SCHEMA, Path::new("schema.txt")).unwrap()
    }

    #[test]
    fn test_parse_attributes() {
        let catalog = schema();
        assert_eq!(catalog.names().collect::<Vec<_>>(), vec!["Weather", "Humid", "Play"]);
        assert_eq!(
            catalog.require("Humid").unwrap().values(),
            &["y".to_string(), "n".to_string()]
        );
    }

    #[test]
    fn test_parse_attributes_errors() {
        let err = parse_attributes("Weather sun,rain\n", Path::new("s")).unwrap_err();
        assert!(matches!(err, TrainerError::Parse { line: 1, .. }));

        let err = parse_attributes("A:x\nA:y\n", Path::new("s")).unwrap_err();
        assert!(matches!(err, TrainerError::Schema { line: 2, .. }));

        assert!(parse_attributes("# nothing\n", Path::new("s")).is_err());

        let err = parse_attributes("B:b0,b1\nAux:end\n", Path::new("s")).unwrap_err();
        assert!(matches!(err, TrainerError::Schema { line: 2, .. }));
    }

    #[test]
    fn test_parse_examples_with_header_and_tags() {
        let catalog = schema();
        let content = "Weather,Humid,Play\nsun,n,yes\nrow2:rain,y,no\n";
        let table = parse_examples(content, &catalog, Path::new("data")).unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table.get(1).unwrap().value_of("Weather"), Some("rain"));
    }

    #[test]
    fn test_parse_examples_reports_line() {
        let catalog = schema();
        let err = parse_examples("sun,n,yes\n\nsun,n\n", &catalog, Path::new("data")).unwrap_err();
        match err {
            TrainerError::Schema { line, source, .. } => {
                assert_eq!(line, 3);
                assert!(matches!(source, Id3Error::Schema(_)));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_load_from_files() -> anyhow::Result<()> {
        let mut schema_file = NamedTempFile::new()?;
        write!(schema_file, "{SCHEMA}")?;
        let mut data_file = NamedTempFile::new()?;
        writeln!(data_file, "sun,n,yes")?;
        writeln!(data_file, "rain,y,no")?;
        data_file.flush()?;

        let catalog = load_attributes(schema_file.path())?;
        let table = load_examples(data_file.path(), &catalog)?;
        assert_eq!(table.len(), 2);

        assert!(matches!(
            load_examples(Path::new("/nonexistent/data.csv"), &catalog),
            Err(TrainerError::Io { .. })
        ));
        Ok(())
    }

    #[test]
    fn test_headered_csv_catalog_inference() {
        let train = CsvFile::parse("A,B,label\ny,n,dem\nn,n,rep\n", Path::new("train.csv")).unwrap();
        let test = CsvFile::parse("A,B,label\ny,y,dem\n", Path::new("test.csv")).unwrap();
        assert_eq!(train.classifier_name(), "label");

        let catalog = infer_catalog(&[&train, &test]).unwrap();
        assert_eq!(catalog.require("B").unwrap().values(), &["n".to_string(), "y".to_string()]);
        assert_eq!(
            catalog.require("label").unwrap().values(),
            &["dem".to_string(), "rep".to_string()]
        );

        let table = test.to_table(&catalog).unwrap();
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_headered_csv_errors() {
        assert!(CsvFile::parse("", Path::new("x")).is_err());
        assert!(matches!(
            CsvFile::parse("A,label\ny\n", Path::new("x")),
            Err(TrainerError::Parse { line: 2, .. })
        ));

        let a = CsvFile::parse("A,label\ny,dem\n", Path::new("a")).unwrap();
        let b = CsvFile::parse("B,label\ny,dem\n", Path::new("b")).unwrap();
        assert!(infer_catalog(&[&a, &b]).is_err());

        let empty = CsvFile::parse("A,label\n", Path::new("e")).unwrap();
        assert!(infer_catalog(&[&empty]).is_err());
    }
}
