//! Writing rankings to disk and rendering the stdout summary.

use std::fmt;
use std::fs::{self, File};
use std::io::Write as _;
use std::path::{Path, PathBuf};

use chrono::prelude::*;
use clap::ValueEnum;
use log::info;
use serde::Serialize;

use crate::analysis::CollocationResult;
use crate::error::{CollocationError, Result};
use crate::trigram::TrigramCount;
use crate::types::Collocation;

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Txt,
    Csv,
    Tsv,
    Json,
}

impl ExportFormat {
    fn extension(self) -> &'static str {
        match self {
            ExportFormat::Txt => "txt",
            ExportFormat::Csv => "csv",
            ExportFormat::Tsv => "tsv",
            ExportFormat::Json => "json",
        }
    }

    fn delimiter(self) -> u8 {
        match self {
            ExportFormat::Tsv => b'\t',
            _ => b',',
        }
    }
}

/// Neutralize cells a spreadsheet would read as a formula.
pub fn csv_safe_cell(s: &str) -> String {
    match s.chars().next() {
        Some('=' | '+' | '-' | '@') => format!("'{s}"),
        _ => s.to_string(),
    }
}

/// Write every table of `result` for `stem` into `out_dir`; returns the paths written.
///
/// File names follow `<stem>_<YYYYMMDD_HHMMSS>_<table><suffix>.<ext>`. A window
/// sweep passes `_w<N>` as the suffix, a single run passes `""`.
pub fn export_result(
    stem: &str,
    table_suffix: &str,
    result: &CollocationResult,
    format: ExportFormat,
    out_dir: &Path,
) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(out_dir).map_err(|e| CollocationError::io(out_dir, e))?;
    let stamp = Local::now().format("%Y%m%d_%H%M%S").to_string();
    let target = |table: &str| {
        out_dir.join(format!(
            "{stem}_{stamp}_{table}{table_suffix}.{}",
            format.extension()
        ))
    };

    let mut written = Vec::new();
    match format {
        ExportFormat::Txt => {
            let path = target("collocations");
            write_text(&path, &render_text_report(result))?;
            written.push(path);
        }
        ExportFormat::Json => {
            let path = target("collocations");
            write_json(&path, &result.by_pmi)?;
            written.push(path);
            let path = target("pairfreq");
            write_json(&path, &result.by_count)?;
            written.push(path);
            if !result.trigrams.is_empty() {
                let path = target("trigrams");
                write_json(&path, &result.trigrams)?;
                written.push(path);
            }
        }
        ExportFormat::Csv | ExportFormat::Tsv => {
            let path = target("collocations");
            write_pairs_delimited(&path, &result.by_pmi, format.delimiter())?;
            written.push(path);
            let path = target("pairfreq");
            write_pairs_delimited(&path, &result.by_count, format.delimiter())?;
            written.push(path);
            if !result.trigrams.is_empty() {
                let path = target("trigrams");
                write_trigrams_delimited(&path, &result.trigrams, format.delimiter())?;
                written.push(path);
            }
        }
    }
    for p in &written {
        info!("Wrote {}", p.display());
    }
    Ok(written)
}

fn write_text(path: &Path, content: &str) -> Result<()> {
    let mut file = File::create(path).map_err(|e| CollocationError::io(path, e))?;
    file.write_all(content.as_bytes())
        .map_err(|e| CollocationError::io(path, e))
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let file = File::create(path).map_err(|e| CollocationError::io(path, e))?;
    serde_json::to_writer_pretty(file, value)?;
    Ok(())
}

fn write_pairs_delimited(path: &Path, rows: &[Collocation], delimiter: u8) -> Result<()> {
    let mut w = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_path(path)?;
    w.write_record(["lemma_a", "lemma_b", "pair_count", "pmi_score"])?;
    for r in rows {
        w.write_record([
            csv_safe_cell(&r.lemma_a),
            csv_safe_cell(&r.lemma_b),
            r.pair_count.to_string(),
            format!("{:.6}", r.pmi_score),
        ])?;
    }
    w.flush().map_err(|e| CollocationError::io(path, e))
}

fn write_trigrams_delimited(path: &Path, rows: &[TrigramCount], delimiter: u8) -> Result<()> {
    let mut w = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_path(path)?;
    w.write_record(["lemma_1", "lemma_2", "lemma_3", "count"])?;
    for r in rows {
        let [a, b, c] = &r.lemmas;
        w.write_record([
            csv_safe_cell(a),
            csv_safe_cell(b),
            csv_safe_cell(c),
            r.count.to_string(),
        ])?;
    }
    w.flush().map_err(|e| CollocationError::io(path, e))
}

/// Plain-text tables: PMI ranking, frequency ranking, then trigrams.
pub struct TextReport<'a>(pub &'a CollocationResult);

impl fmt::Display for TextReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let result = self.0;
        let rule = "=".repeat(60);
        let thin = "-".repeat(60);

        writeln!(f, "{rule}")?;
        writeln!(
            f,
            "COLLOCATIONS  window={}  min_count={}  top_k={}",
            result.config.window_size, result.config.min_count, result.config.top_k
        )?;
        writeln!(
            f,
            "tokens={}  pair events={}  lemmas={}  distinct pairs={}",
            result.total_tokens, result.total_pairs, result.distinct_lemmas, result.distinct_pairs
        )?;
        writeln!(
            f,
            "entropy={:.4} bits  type/token ratio={:.4}",
            result.diversity.entropy_bits, result.diversity.type_token_ratio
        )?;
        writeln!(f, "{rule}\n")?;

        writeln!(f, "TOP COLLOCATIONS (PAIRS) by PMI")?;
        writeln!(f, "{thin}")?;
        writeln!(f, "{:<30} | {:<10} | {:<5}", "Collocation", "PMI", "Count")?;
        writeln!(f, "{thin}")?;
        for c in &result.by_pmi {
            let pair = format!("({}, {})", c.lemma_a, c.lemma_b);
            writeln!(f, "{pair:<30} | {:>10.2} | {:>5}", c.pmi_score, c.pair_count)?;
        }

        writeln!(f, "\n{rule}")?;
        writeln!(f, "TOP PAIRS by FREQUENCY")?;
        writeln!(f, "{thin}")?;
        for c in &result.by_count {
            let pair = format!("({}, {})", c.lemma_a, c.lemma_b);
            writeln!(f, "{pair:<30} | {:>5}", c.pair_count)?;
        }

        if !result.trigrams.is_empty() {
            writeln!(f, "\n{rule}")?;
            writeln!(f, "TOP TRIGRAMS by FREQUENCY")?;
            writeln!(f, "{thin}")?;
            for t in &result.trigrams {
                let tri = format!("({}, {}, {})", t.lemmas[0], t.lemmas[1], t.lemmas[2]);
                writeln!(f, "{tri:<45} | {:>5}", t.count)?;
            }
        }
        Ok(())
    }
}

pub fn render_text_report(result: &CollocationResult) -> String {
    TextReport(result).to_string()
}

/// Short stdout block for one analyzed stem.
pub struct Summary<'a> {
    pub heading: &'a str,
    pub result: &'a CollocationResult,
}

impl fmt::Display for Summary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let result = self.result;
        writeln!(
            f,
            "== {}: {} tokens, {} pair events, {} distinct pairs",
            self.heading, result.total_tokens, result.total_pairs, result.distinct_pairs
        )?;
        writeln!(
            f,
            "Lemma entropy: {:.4} bits, type/token ratio: {:.4}",
            result.diversity.entropy_bits, result.diversity.type_token_ratio
        )?;
        writeln!(
            f,
            "Top {} collocations (by PMI, then count):",
            result.config.top_k
        )?;
        if result.by_pmi.is_empty() {
            writeln!(f, "  (none)")?;
        }
        for c in &result.by_pmi {
            writeln!(
                f,
                "  ({}, {})  count={}  PMI={:.4}",
                c.lemma_a, c.lemma_b, c.pair_count, c.pmi_score
            )?;
        }
        if !result.trigrams.is_empty() {
            writeln!(f, "Top {} trigrams:", result.trigrams.len())?;
            for t in &result.trigrams {
                writeln!(f, "  {} {} {}\t{}", t.lemmas[0], t.lemmas[1], t.lemmas[2], t.count)?;
            }
        }
        Ok(())
    }
}

pub fn format_summary(heading: &str, result: &CollocationResult) -> String {
    Summary { heading, result }.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_safe_cell_prefixes_formula_starts() {
        assert_eq!(csv_safe_cell("=SUM(A1)"), "'=SUM(A1)");
        assert_eq!(csv_safe_cell("-x"), "'-x");
        assert_eq!(csv_safe_cell("θεά"), "θεά");
        assert_eq!(csv_safe_cell(""), "");
    }

    fn sample() -> CollocationResult {
        let seq = crate::types::LemmaSequence::from_units(vec![
            vec!["a", "b", "c"],
            vec!["a", "b", "c"],
        ]);
        let config = crate::config::CollocationConfig {
            window_size: 2,
            min_count: 1,
            top_k: 10,
        };
        crate::analysis::analyze_sequence(&seq, &config, 2).unwrap()
    }

    #[test]
    fn summary_lists_diversity_and_rankings() {
        let text = format_summary("a", &sample());
        assert!(text.starts_with("== a: 6 tokens, 4 pair events, 2 distinct pairs\n"));
        // three equiprobable lemmas
        assert!(text.contains("Lemma entropy: 1.5850 bits, type/token ratio: 0.5000"));
        assert!(text.contains("  (a, b)  count=2"));
        assert!(text.contains("  a b c\t2"));
    }

    #[test]
    fn text_report_has_all_sections() {
        let text = render_text_report(&sample());
        assert!(text.contains("COLLOCATIONS  window=2  min_count=1  top_k=10"));
        assert!(text.contains("entropy=1.5850 bits"));
        assert!(text.contains("TOP PAIRS by FREQUENCY"));
        assert!(text.contains("TOP TRIGRAMS by FREQUENCY"));
    }

    #[test]
    fn window_suffix_lands_after_table_name() {
        let dir = tempfile::tempdir().unwrap();
        let written =
            export_result("s", "_w3", &sample(), ExportFormat::Csv, dir.path()).unwrap();
        let names: Vec<String> = written
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names.len(), 3);
        assert!(names[0].starts_with("s_") && names[0].ends_with("_collocations_w3.csv"));
        assert!(names[1].ends_with("_pairfreq_w3.csv"));
        assert!(names[2].ends_with("_trigrams_w3.csv"));
    }
}
