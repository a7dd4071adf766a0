//! `.Z-SCORE` result files.
//!
//! A header line `<name> <length> <from_din> <to_din>` followed by one line
//! per position: deficit, slope (degrees), probability and conformation.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::error::{Result, ZHuntError};
use crate::params::ModelParams;
use crate::scanner::{WindowRange, WindowResult};
use crate::sequence::Sequence;

/// `<input>.Z-SCORE` next to the input file.
pub fn zscore_path(input: &Path) -> PathBuf {
    let mut name = input.as_os_str().to_owned();
    name.push(".Z-SCORE");
    PathBuf::from(name)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZScoreHeader {
    pub name: String,
    pub seq_length: usize,
    pub from_din: usize,
    pub to_din: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ZScoreRecord {
    pub dl: f64,
    pub slope: f64,
    pub probability: f64,
    pub conformation: String,
}

pub struct ZScoreWriter<W: Write> {
    writer: BufWriter<W>,
}

impl<W: Write> ZScoreWriter<W> {
    pub fn new(inner: W, header: &ZScoreHeader) -> Result<Self> {
        let mut writer = BufWriter::with_capacity(64 * 1024, inner);
        writeln!(
            writer,
            "{} {} {} {}",
            header.name, header.seq_length, header.from_din, header.to_din
        )?;
        Ok(Self { writer })
    }

    pub fn write_results(&mut self, results: &[WindowResult]) -> Result<()> {
        for result in results {
            writeln!(
                self.writer,
                " {:7.3} {:7.3} {} {}",
                result.dl,
                result.slope,
                c_exp(result.probability),
                result.conformation
            )?;
        }
        Ok(())
    }

    pub fn finish(mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

/// `printf("%e")` rendering: six decimals, signed exponent of at least two
/// digits.
fn c_exp(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    let formatted = format!("{value:.6e}");
    match formatted.split_once('e') {
        Some((mantissa, exp)) => {
            let exp: i32 = exp.parse().unwrap_or(0);
            let sign = if exp < 0 { '-' } else { '+' };
            format!("{mantissa}e{sign}{:02}", exp.abs())
        }
        None => formatted,
    }
}

pub fn read_zscore<R: BufRead>(reader: R) -> Result<(ZScoreHeader, Vec<ZScoreRecord>)> {
    let mut lines = reader.lines();

    let header_line = lines
        .next()
        .ok_or_else(|| ZHuntError::parse(1, "missing header"))??;
    let header = parse_header(&header_line)?;

    let mut records = Vec::with_capacity(header.seq_length);
    for (i, line) in lines.enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        records.push(parse_record(&line, i + 2)?);
    }
    Ok((header, records))
}

fn parse_header(line: &str) -> Result<ZScoreHeader> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() < 4 {
        return Err(ZHuntError::parse(1, format!("expected 4 header fields, got {}", fields.len())));
    }
    let n = fields.len();
    let number = |s: &str| -> Result<usize> {
        s.parse()
            .map_err(|_| ZHuntError::parse(1, format!("invalid number {s:?}")))
    };

    Ok(ZScoreHeader {
        name: fields[..n - 3].join(" "),
        seq_length: number(fields[n - 3])?,
        from_din: number(fields[n - 2])?,
        to_din: number(fields[n - 1])?,
    })
}

fn parse_record(line: &str, line_no: usize) -> Result<ZScoreRecord> {
    let mut fields = line.split_whitespace();
    let mut number = |what: &str| -> Result<f64> {
        let field = fields
            .next()
            .ok_or_else(|| ZHuntError::parse(line_no, format!("missing {what}")))?;
        field
            .parse()
            .map_err(|_| ZHuntError::parse(line_no, format!("invalid {what} {field:?}")))
    };

    let dl = number("deficit")?;
    let slope = number("slope")?;
    let probability = number("probability")?;
    // an empty window leaves the conformation column blank
    let conformation = fields.next().unwrap_or_default().to_string();

    Ok(ZScoreRecord {
        dl,
        slope,
        probability,
        conformation,
    })
}

/// Totals reported by the re-parsing pass.
#[derive(Debug, Clone, PartialEq)]
pub struct ZScoreSummary {
    pub records: usize,
    /// 1-based position of the smallest deficit.
    pub best_position: Option<usize>,
    pub best_dl: f64,
    /// Positions whose deficit was solved below the search upper bound.
    pub solved: usize,
}

pub fn summarize(records: &[ZScoreRecord], params: &ModelParams) -> ZScoreSummary {
    let mut summary = ZScoreSummary {
        records: records.len(),
        best_position: None,
        best_dl: params.dl_upper,
        solved: 0,
    };
    for (i, record) in records.iter().enumerate() {
        if record.dl < params.dl_upper {
            summary.solved += 1;
        }
        if record.dl < summary.best_dl {
            summary.best_dl = record.dl;
            summary.best_position = Some(i + 1);
        }
    }
    summary
}

/// Write `results` for `input` to its `.Z-SCORE` file.
pub fn write_zscore(
    input: &Path,
    seq_length: usize,
    range: WindowRange,
    results: &[WindowResult],
) -> Result<PathBuf> {
    let path = zscore_path(input);
    let mut writer = ZScoreWriter::new(File::create(&path)?, &header_for(input, seq_length, range))?;
    writer.write_results(results)?;
    writer.finish()?;
    Ok(path)
}

pub fn header_for(input: &Path, seq_length: usize, range: WindowRange) -> ZScoreHeader {
    ZScoreHeader {
        name: input.display().to_string(),
        seq_length,
        from_din: range.from_din,
        to_din: range.to_din,
    }
}

/// Re-read the `.Z-SCORE` file of `input` and check it against the header
/// and the sequence it was computed from.
pub fn analyze_zscore(input: &Path, params: &ModelParams) -> Result<ZScoreSummary> {
    let path = zscore_path(input);
    info!("analyzing {}", path.display());

    let (header, records) = read_zscore(BufReader::new(File::open(&path)?))?;
    if records.len() != header.seq_length {
        return Err(ZHuntError::parse(
            records.len() + 1,
            format!("expected {} records, found {}", header.seq_length, records.len()),
        ));
    }

    let sequence = Sequence::load(input, 2 * header.to_din)?;
    if sequence.len() != header.seq_length {
        warn!(
            recorded = header.seq_length,
            current = sequence.len(),
            "sequence length changed since the scores were written"
        );
    }

    let summary = summarize(&records, params);
    info!(
        records = summary.records,
        solved = summary.solved,
        best_dl = summary.best_dl,
        best_position = ?summary.best_position,
        "analysis done"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::antisyn::Conformation;
    use std::io::Cursor;

    fn result(dl: f64, slope: f64, probability: f64, conf: &str) -> WindowResult {
        let conformation: Conformation = conf.parse().unwrap();
        WindowResult {
            position: 0,
            dinucleotides: conformation.len(),
            dl,
            slope,
            probability,
            conformation,
        }
    }

    #[test]
    fn printf_style_exponent() {
        assert_eq!(c_exp(1.597111332074519e-12), "1.597111e-12");
        assert_eq!(c_exp(2.5839816228864336), "2.583982e+00");
        assert_eq!(c_exp(57261621.8), "5.726162e+07");
        assert_eq!(c_exp(0.0), "0.000000e+00");
        assert_eq!(c_exp(1e-300), "1.000000e-300");
    }

    #[test]
    fn line_layout() {
        let header = ZScoreHeader {
            name: "seq.txt".into(),
            seq_length: 2,
            from_din: 6,
            to_din: 12,
        };
        let mut out = Vec::new();
        let mut writer = ZScoreWriter::new(&mut out, &header).unwrap();
        writer
            .write_results(&[
                result(28.8726806640625, 35.29394618992424, 2.5839816228864336, "SASA"),
                result(9.5, -3.25, 0.00031407925409066006, "ASSA"),
            ])
            .unwrap();
        writer.finish().unwrap();

        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text,
            "seq.txt 2 6 12\n  28.873  35.294 2.583982e+00 SASA\n   9.500  -3.250 3.140793e-04 ASSA\n"
        );
    }

    #[test]
    fn read_back() {
        let text = "my seq.txt 3 4 8\n  28.873  35.294 2.583982e+00 SASA\n  50.000 -89.674 1.597111e-12 ASAS\n  50.000   0.000 1.597111e-12\n";
        let (header, records) = read_zscore(Cursor::new(text)).unwrap();
        assert_eq!(
            header,
            ZScoreHeader {
                name: "my seq.txt".into(),
                seq_length: 3,
                from_din: 4,
                to_din: 8
            }
        );
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].dl, 28.873);
        assert_eq!(records[1].slope, -89.674);
        assert_eq!(records[1].probability, 1.597111e-12);
        assert_eq!(records[1].conformation, "ASAS");
        assert_eq!(records[2].conformation, "");

        let summary = summarize(&records, &ModelParams::default());
        assert_eq!(summary.records, 3);
        assert_eq!(summary.solved, 1);
        assert_eq!(summary.best_position, Some(1));
        assert_eq!(summary.best_dl, 28.873);
    }

    #[test]
    fn malformed_records() {
        let err = read_zscore(Cursor::new("x 1 2 3\n 12.0 abc 1e-3 AS\n")).unwrap_err();
        assert!(matches!(err, ZHuntError::Parse { line: 2, .. }));

        let err = read_zscore(Cursor::new("x 1 2\n")).unwrap_err();
        assert!(matches!(err, ZHuntError::Parse { line: 1, .. }));

        let err = read_zscore(Cursor::new("")).unwrap_err();
        assert!(matches!(err, ZHuntError::Parse { line: 1, .. }));
    }

    #[test]
    fn output_path() {
        assert_eq!(
            zscore_path(Path::new("data/chr1.txt")),
            PathBuf::from("data/chr1.txt.Z-SCORE")
        );
    }
}
