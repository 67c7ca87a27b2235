//! Ranking report: how often the expected entry comes out on top

use crate::catalog::PromptSet;
use crate::entry::Id;
use crate::error::Result;
use crate::query::QueryOptions;
use crate::store::VectorDb;
use clap::ValueEnum;
use std::fmt::{self, Write};
use std::time::{Duration, Instant};

/// Output format for a rendered report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    #[value(alias = "md")]
    Markdown,
}

/// Result of running one prompt against the store.
#[derive(Debug, Clone)]
pub struct PromptOutcome {
    pub expected: Id,
    pub prompt: String,
    /// `(score, id)` pairs, best first.
    pub ranking: Vec<(f32, Id)>,
}

impl PromptOutcome {
    /// 1-based rank of the expected id, if it was returned.
    pub fn rank_of_expected(&self) -> Option<usize> {
        self.ranking
            .iter()
            .position(|(_, id)| *id == self.expected)
            .map(|n| n + 1)
    }

    pub fn passed(&self) -> bool {
        self.rank_of_expected() == Some(1)
    }
}

/// Qualitative band for a success rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rating {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl Rating {
    pub fn from_rate(percent: f64) -> Self {
        if percent >= 90.0 {
            Rating::Excellent
        } else if percent >= 75.0 {
            Rating::Good
        } else if percent >= 50.0 {
            Rating::Fair
        } else {
            Rating::Poor
        }
    }

    fn describe(self) -> &'static str {
        match self {
            Rating::Excellent => "**Excellent** - The tool selection system is performing very well.",
            Rating::Good => "**Good** - The tool selection system is performing adequately but has room for improvement.",
            Rating::Fair => "**Fair** - The tool selection system needs significant improvement.",
            Rating::Poor => "**Poor** - The tool selection system requires major improvements.",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Report {
    pub entry_count: usize,
    pub outcomes: Vec<PromptOutcome>,
    pub elapsed: Duration,
}

impl Report {
    /// Query every prompt and record the top `top_k` ids.
    pub fn run<M: Send + Sync>(db: &VectorDb<M>, prompts: &PromptSet, top_k: usize) -> Result<Self> {
        let start = Instant::now();
        let options = QueryOptions::top_k(top_k);
        let mut outcomes = Vec::new();

        for (expected, cases) in prompts {
            for case in cases {
                let results = db.query(case.vector.as_slice(), &options)?;
                outcomes.push(PromptOutcome {
                    expected: expected.clone(),
                    prompt: case.prompt.clone(),
                    ranking: results
                        .into_iter()
                        .map(|r| (r.score, r.entry.id.clone()))
                        .collect(),
                });
            }
        }

        let report = Self {
            entry_count: db.len(),
            outcomes,
            elapsed: start.elapsed(),
        };
        tracing::info!(
            prompts = report.outcomes.len(),
            passed = report.successes(),
            elapsed = ?report.elapsed,
            "report complete"
        );
        Ok(report)
    }

    pub fn successes(&self) -> usize {
        self.outcomes.iter().filter(|o| o.passed()).count()
    }

    /// Percentage of prompts whose expected id ranked first.
    pub fn success_rate(&self) -> f64 {
        if self.outcomes.is_empty() {
            return 0.0;
        }
        self.successes() as f64 / self.outcomes.len() as f64 * 100.0
    }

    pub fn rating(&self) -> Rating {
        Rating::from_rate(self.success_rate())
    }

    pub fn render(&self, format: OutputFormat) -> String {
        Rendered {
            report: self,
            format,
        }
        .to_string()
    }

    fn write_text(&self, out: &mut impl Write) -> fmt::Result {
        for outcome in &self.outcomes {
            write!(
                out,
                "\nPrompt: {}\nExpected tool: {}",
                outcome.prompt, outcome.expected
            )?;
            for (score, id) in &outcome.ranking {
                let note = if *id == outcome.expected {
                    "*** EXPECTED ***"
                } else {
                    ""
                };
                write!(out, "\n   {:.6}   {:<50}     {}", score, id.as_str(), note)?;
            }
            out.write_char('\n')?;
        }
        writeln!(
            out,
            "\nPrompt count={}, Passed={}, Execution time={:?}",
            self.outcomes.len(),
            self.successes(),
            self.elapsed
        )
    }

    fn write_markdown(&self, out: &mut impl Write) -> fmt::Result {
        writeln!(out, "# Tool Selection Analysis Results\n")?;
        writeln!(out, "**Total Tools:** {}  \n", self.entry_count)?;
        writeln!(out, "## Table of Contents\n")?;
        for (i, outcome) in self.outcomes.iter().enumerate() {
            writeln!(
                out,
                "- [Test {n}: {}](#test-{n})",
                outcome.expected,
                n = i + 1
            )?;
        }
        writeln!(out, "\n---\n")?;

        for (i, outcome) in self.outcomes.iter().enumerate() {
            writeln!(out, "## Test {}\n", i + 1)?;
            writeln!(out, "**Expected Tool:** `{}`  ", outcome.expected)?;
            writeln!(out, "**Prompt:** {}  \n", outcome.prompt)?;
            writeln!(out, "### Results\n")?;
            writeln!(out, "| Rank | Score | Tool | Status |")?;
            writeln!(out, "|------|-------|------|--------|")?;
            for (rank, (score, id)) in outcome.ranking.iter().enumerate() {
                let status = if *id == outcome.expected {
                    "✅ **EXPECTED**"
                } else {
                    "❌"
                };
                writeln!(out, "| {} | {:.6} | `{}` | {} |", rank + 1, score, id, status)?;
            }
            writeln!(out, "\n---\n")?;
        }

        writeln!(out, "## Summary\n")?;
        writeln!(out, "**Total Prompts Tested:** {}  ", self.outcomes.len())?;
        writeln!(out, "**Execution Time:** {:?}  \n", self.elapsed)?;
        writeln!(
            out,
            "**Success Rate:** {:.1}% ({}/{} tests passed)  \n",
            self.success_rate(),
            self.successes(),
            self.outcomes.len()
        )?;
        writeln!(out, "### Success Rate Analysis\n")?;
        writeln!(out, "{}", self.rating().describe())
    }
}

struct Rendered<'a> {
    report: &'a Report,
    format: OutputFormat,
}

impl fmt::Display for Rendered<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.format {
            OutputFormat::Text => self.report.write_text(f),
            OutputFormat::Markdown => self.report.write_markdown(f),
        }
    }
}
