//! Reading caption records and writing them back with their negatives.

use anyhow::{Context, Result};
use flate2::read::GzDecoder;
use log::{info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::{Map, Value};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use crate::generator::{NegativeGenerator, Outcome};
use crate::tagger::Tagger;

pub const CAPTION_FIELD: &str = "caption";
pub const NEGATIVES_FIELD: &str = "medium_negatives";

/// A JSON object with a string `caption`; every other field passes through untouched.
#[derive(Clone, Debug, PartialEq)]
pub struct Record {
    fields: Map<String, Value>,
}

impl Record {
    /// Wrap a parsed JSON value, checking it is an object with a string caption.
    pub fn from_value(value: Value) -> Result<Self> {
        let fields = match value {
            Value::Object(fields) => fields,
            other => anyhow::bail!("expected a JSON object, got {}", json_kind(&other)),
        };
        match fields.get(CAPTION_FIELD) {
            Some(Value::String(_)) => Ok(Self { fields }),
            Some(other) => anyhow::bail!("field `{CAPTION_FIELD}` is {}, not a string", json_kind(other)),
            None => anyhow::bail!("missing field `{CAPTION_FIELD}`"),
        }
    }

    pub fn caption(&self) -> &str {
        self.fields
            .get(CAPTION_FIELD)
            .and_then(Value::as_str)
            .unwrap_or_default()
    }

    pub fn set_negatives(&mut self, negatives: Vec<String>) {
        let values = negatives.into_iter().map(Value::String).collect();
        self.fields.insert(NEGATIVES_FIELD.to_string(), Value::Array(values));
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.fields)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// A line that was not turned into a record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SkippedLine {
    /// 1-based line number in the input.
    pub line: usize,
    pub reason: String,
}

/// Open `path` for line reading, decompressing `.gz` files.
pub fn open_lines(path: &Path) -> Result<Box<dyn BufRead>> {
    let file = File::open(path).with_context(|| format!("Failed to open input {}", path.display()))?;
    let reader: Box<dyn BufRead> = if path.extension().and_then(|s| s.to_str()) == Some("gz") {
        Box::new(BufReader::new(GzDecoder::new(file)))
    } else {
        Box::new(BufReader::new(file))
    };
    Ok(reader)
}

/// Parse newline-delimited JSON records.
///
/// Blank lines are ignored. Lines that are not UTF-8, not valid JSON, not objects, or
/// lack a string `caption` are skipped and reported; only I/O errors fail.
pub fn read_records<R: BufRead>(mut reader: R) -> Result<(Vec<Record>, Vec<SkippedLine>)> {
    let mut records = Vec::new();
    let mut skipped = Vec::new();

    let mut buf = Vec::new();
    let mut line_no = 0;
    loop {
        buf.clear();
        let read = reader
            .read_until(b'\n', &mut buf)
            .with_context(|| format!("Failed to read input line {}", line_no + 1))?;
        if read == 0 {
            break;
        }
        line_no += 1;

        // Bad encoding is a malformed line like any other, not a fatal read error.
        let parsed = std::str::from_utf8(&buf)
            .map_err(anyhow::Error::from)
            .map(str::trim)
            .and_then(|line| {
                if line.is_empty() {
                    return Ok(None);
                }
                let value = serde_json::from_str::<Value>(line)?;
                Record::from_value(value).map(Some)
            });
        match parsed {
            Ok(Some(record)) => records.push(record),
            Ok(None) => {}
            Err(e) => {
                warn!("Skipping line {}: {:#}", line_no, e);
                skipped.push(SkippedLine {
                    line: line_no,
                    reason: format!("{:#}", e),
                });
            }
        }
    }

    Ok((records, skipped))
}

/// Write records as one pretty-printed JSON array. Non-ASCII text is kept as is.
pub fn write_records<W: Write>(writer: W, records: Vec<Record>) -> Result<()> {
    let values: Vec<Value> = records.into_iter().map(Record::into_value).collect();
    let mut writer = BufWriter::new(writer);
    serde_json::to_writer_pretty(&mut writer, &values).context("Failed to serialize output")?;
    writer.flush().context("Failed to flush output")?;
    Ok(())
}

/// Counters for one run over a dataset.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub records: usize,
    pub skipped_lines: usize,
    pub negatives: usize,
    pub starved: usize,
    pub exhausted: usize,
}

/// Attach negatives to every record, in order.
///
/// With a seed, record `i` draws from `StdRng::seed_from_u64(seed + i)`, so
/// each record's negatives are reproducible on their own.
pub fn augment_records<T: Tagger>(
    generator: &NegativeGenerator<'_, T>,
    records: &mut [Record],
    seed: Option<u64>,
) -> RunSummary {
    let mut summary = RunSummary {
        records: records.len(),
        ..RunSummary::default()
    };

    for (i, record) in records.iter_mut().enumerate() {
        let mut rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(i as u64)),
            None => StdRng::from_rng(rand::thread_rng())
                .unwrap_or_else(|_| StdRng::seed_from_u64(rand::thread_rng().gen())),
        };

        let generation = generator.generate(record.caption(), &mut rng);
        match generation.outcome {
            Outcome::Enough => {}
            Outcome::Starved => summary.starved += 1,
            Outcome::Exhausted { .. } => summary.exhausted += 1,
        }
        summary.negatives += generation.negatives.len();
        record.set_negatives(generation.negatives);

        if (i + 1) % 1000 == 0 {
            info!("Processed {} / {} records", i + 1, summary.records);
        }
    }

    summary
}

/// Read `input`, generate negatives for every record, write `output`.
pub fn process_file<T: Tagger>(
    generator: &NegativeGenerator<'_, T>,
    input: &Path,
    output: &Path,
    seed: Option<u64>,
) -> Result<RunSummary> {
    let reader = open_lines(input)?;
    let (mut records, skipped) = read_records(reader)
        .with_context(|| format!("Failed to read records from {}", input.display()))?;
    info!(
        "Loaded {} records from {} ({} lines skipped)",
        records.len(),
        input.display(),
        skipped.len()
    );

    let mut summary = augment_records(generator, &mut records, seed);
    summary.skipped_lines = skipped.len();

    let file = File::create(output).with_context(|| format!("Failed to create output {}", output.display()))?;
    write_records(file, records).with_context(|| format!("Failed to write {}", output.display()))?;

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::GeneratorConfig;
    use crate::pools::WordPools;
    use crate::tagger::LexiconTagger;
    use std::io::Cursor;

    #[test]
    fn skips_blank_and_broken_lines() {
        let input = concat!(
            "{\"caption\": \"A red car\", \"id\": 1}\n",
            "\n",
            "   \n",
            "{not json}\n",
            "[1, 2]\n",
            "{\"id\": 4}\n",
            "{\"caption\": 5}\n",
            "{\"caption\": \"A blue van\"}\n",
        );
        let (records, skipped) = read_records(Cursor::new(input)).unwrap();

        let captions: Vec<&str> = records.iter().map(Record::caption).collect();
        assert_eq!(captions, vec!["A red car", "A blue van"]);
        let lines: Vec<usize> = skipped.iter().map(|s| s.line).collect();
        assert_eq!(lines, vec![4, 5, 6, 7]);
        assert!(skipped[2].reason.contains("missing field `caption`"));
    }

    #[test]
    fn invalid_utf8_line_is_skipped_not_fatal() {
        let mut input = Vec::new();
        input.extend_from_slice(b"{\"caption\": \"A red car\"}\n");
        input.extend_from_slice(b"{\"caption\": \"bad \xff\"}\n");
        input.extend_from_slice(b"{\"caption\": \"A blue van\"}");

        let (records, skipped) = read_records(Cursor::new(input)).unwrap();

        let captions: Vec<&str> = records.iter().map(Record::caption).collect();
        assert_eq!(captions, vec!["A red car", "A blue van"]);
        assert_eq!(skipped.len(), 1);
        assert_eq!(skipped[0].line, 2);
        assert!(skipped[0].reason.contains("utf-8"), "{}", skipped[0].reason);
    }

    #[test]
    fn output_is_pretty_array_with_unicode_kept() {
        let value = serde_json::json!({"caption": "Un coche rojo aparcado en la calle é", "id": 7});
        let mut record = Record::from_value(value).unwrap();
        record.set_negatives(vec!["Un coche azul".to_string()]);

        let mut out = Vec::new();
        write_records(&mut out, vec![record]).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.starts_with("[\n  {\n"));
        assert!(text.contains("calle é"));
        let parsed: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed[0]["id"], 7);
        assert_eq!(parsed[0][NEGATIVES_FIELD][0], "Un coche azul");
    }

    #[test]
    fn augments_every_record_reproducibly() {
        let pools = WordPools::default();
        let tagger = LexiconTagger::from_pools(&pools);
        let generator = NegativeGenerator::new(&tagger, &pools, GeneratorConfig::default()).unwrap();

        let make_records = || {
            vec![
                Record::from_value(serde_json::json!({"caption": "A red car is parked near the building"})).unwrap(),
                Record::from_value(serde_json::json!({"caption": "A car"})).unwrap(),
            ]
        };

        let mut first = make_records();
        let summary = augment_records(&generator, &mut first, Some(3));
        let mut second = make_records();
        augment_records(&generator, &mut second, Some(3));

        assert_eq!(first, second);
        assert_eq!(summary.records, 2);
        assert_eq!(summary.starved, 1);
        assert_eq!(summary.negatives, 10);
        let starved = first[1].clone().into_value();
        assert_eq!(starved[NEGATIVES_FIELD], serde_json::json!([]));
    }
}
