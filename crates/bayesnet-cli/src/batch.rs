//! Batch processing mode for the bayesnet CLI
//!
//! Input format: the first non-empty, non-comment line names the network
//! file; every following line is one query. Results come back in input
//! order regardless of how many worker threads evaluated them.

use anyhow::{bail, Context, Result};
use bayesnet_infer::{InferenceEngine, InferenceResult, NetworkStructure};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};

use crate::output::{format_failure, format_result, print_error, print_success};

/// One query line of a batch file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryLine {
    /// 1-based line number in the input file
    pub line_number: usize,
    pub text: String,
}

/// Parsed batch input file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchInput {
    pub network_path: PathBuf,
    pub queries: Vec<QueryLine>,
}

impl BatchInput {
    pub fn read(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read file: {}", path.display()))?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new(""));
        Self::parse(&content, base_dir)
            .with_context(|| format!("Invalid batch file: {}", path.display()))
    }

    /// A relative network path is resolved against `base_dir`.
    pub fn parse(content: &str, base_dir: &Path) -> Result<Self> {
        let mut lines = content
            .lines()
            .enumerate()
            .map(|(i, line)| (i + 1, line.trim()))
            .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'));

        let Some((_, network)) = lines.next() else {
            bail!("batch file is empty; expected a network path on the first line");
        };

        let network = Path::new(network);
        let network_path = if network.is_absolute() {
            network.to_path_buf()
        } else {
            base_dir.join(network)
        };

        let queries = lines
            .map(|(line_number, text)| QueryLine {
                line_number,
                text: text.to_string(),
            })
            .collect();

        Ok(Self {
            network_path,
            queries,
        })
    }
}

pub struct BatchProcessor<'a> {
    engine: InferenceEngine<'a>,
    jobs: usize,
    show_progress: bool,
}

impl<'a> BatchProcessor<'a> {
    pub fn new(network: &'a NetworkStructure) -> Self {
        Self {
            engine: InferenceEngine::new(network),
            jobs: 1,
            show_progress: false,
        }
    }

    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs.max(1);
        self
    }

    pub fn with_progress(mut self, enabled: bool) -> Self {
        self.show_progress = enabled;
        self
    }

    /// Evaluate every query. Failures are recorded per line and never stop
    /// the batch.
    pub fn process(&self, queries: &[QueryLine]) -> Result<BatchResult> {
        let pb = self.progress_bar(queries.len());

        let evaluate = |query: &QueryLine| {
            let outcome = QueryOutcome {
                line_number: query.line_number,
                query: query.text.clone(),
                result: self
                    .engine
                    .evaluate_line(&query.text)
                    .map_err(|e| e.to_string()),
            };
            if let Err(message) = &outcome.result {
                tracing::warn!(line = query.line_number, error = %message, "query failed");
            }
            pb.inc(1);
            outcome
        };

        let outcomes: Vec<QueryOutcome> = if self.jobs > 1 {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(self.jobs)
                .build()
                .context("Failed to build worker pool")?;
            pool.install(|| queries.par_iter().map(evaluate).collect())
        } else {
            queries.iter().map(evaluate).collect()
        };

        pb.finish_and_clear();
        tracing::debug!(
            queries = outcomes.len(),
            jobs = self.jobs,
            "batch finished"
        );

        Ok(BatchResult { outcomes })
    }

    fn progress_bar(&self, total: usize) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }
        let pb = ProgressBar::new(total as u64);
        let style = ProgressStyle::with_template(
            "[{elapsed_precise}] {bar:40.cyan/blue} {pos:>7}/{len:7} {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("##-");
        pb.set_style(style);
        pb.set_message("queries");
        pb
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct QueryOutcome {
    pub line_number: usize,
    pub query: String,
    pub result: std::result::Result<InferenceResult, String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BatchResult {
    pub outcomes: Vec<QueryOutcome>,
}

impl BatchResult {
    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    pub fn successes(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_ok()).count()
    }

    pub fn failures(&self) -> impl Iterator<Item = &QueryOutcome> {
        self.outcomes.iter().filter(|o| o.result.is_err())
    }

    /// One line per query, in input order, each terminated by a newline.
    pub fn render(&self, precision: usize) -> String {
        let mut out = String::new();
        for outcome in &self.outcomes {
            let line = match &outcome.result {
                Ok(result) => format_result(result, precision),
                Err(message) => format_failure(message),
            };
            out.push_str(&line);
            out.push('\n');
        }
        out
    }

    pub fn write_to(&self, path: &Path, precision: usize) -> Result<()> {
        fs::write(path, self.render(precision))
            .with_context(|| format!("Failed to write output file: {}", path.display()))
    }

    pub fn print_summary(&self) {
        eprintln!("\nBatch Processing Summary:");
        eprintln!("  Total: {}", self.total());
        print_success(&format!("Successes: {}", self.successes()));

        let failures: Vec<&QueryOutcome> = self.failures().collect();
        if !failures.is_empty() {
            print_error(&format!("Failures: {}", failures.len()));
            eprintln!("\nFailed queries:");
            for outcome in failures {
                eprintln!("  Line {}: {}", outcome.line_number, outcome.query);
                if let Err(error) = &outcome.result {
                    eprintln!("    Error: {}", error);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bayesnet_infer::NetworkBuilder;

    fn rain_network() -> NetworkStructure {
        let mut builder = NetworkBuilder::new();
        builder
            .variable("Rain", ["T", "F"])
            .variable("WetGrass", ["T", "F"])
            .cpt("Rain", Vec::<String>::new(), vec![0.2, 0.8])
            .cpt("WetGrass", ["Rain"], vec![0.9, 0.1, 0.1, 0.9]);
        builder.build().unwrap()
    }

    fn lines(queries: &[&str]) -> Vec<QueryLine> {
        queries
            .iter()
            .enumerate()
            .map(|(i, q)| QueryLine {
                line_number: i + 2,
                text: q.to_string(),
            })
            .collect()
    }

    #[test]
    fn test_parse_input() {
        let content = "\n# alarm queries\nnet.xml\nP(A=T|B=T),1\n\nP(A=T,B=F)\n";
        let input = BatchInput::parse(content, Path::new("/data")).unwrap();

        assert_eq!(input.network_path, PathBuf::from("/data/net.xml"));
        assert_eq!(input.queries.len(), 2);
        assert_eq!(input.queries[0].line_number, 4);
        assert_eq!(input.queries[0].text, "P(A=T|B=T),1");
        assert_eq!(input.queries[1].line_number, 6);
    }

    #[test]
    fn test_parse_absolute_network_path() {
        let input = BatchInput::parse("/nets/alarm.xml\n", Path::new("/data")).unwrap();
        assert_eq!(input.network_path, PathBuf::from("/nets/alarm.xml"));
        assert!(input.queries.is_empty());
    }

    #[test]
    fn test_parse_empty_input() {
        assert!(BatchInput::parse("\n# only a comment\n", Path::new(".")).is_err());
    }

    #[test]
    fn test_failures_do_not_abort() {
        let network = rain_network();
        let processor = BatchProcessor::new(&network);
        let result = processor
            .process(&lines(&[
                "P(Rain=T|WetGrass=T),1",
                "P(Rain=T|WetGrass=T),5",
                "P(Rain=T,WetGrass=T)",
            ]))
            .unwrap();

        assert_eq!(result.total(), 3);
        assert_eq!(result.successes(), 2);

        let rendered = result.render(5);
        let rendered: Vec<&str> = rendered.lines().collect();
        assert!(rendered[0].starts_with("0.69231,"));
        assert!(rendered[1].starts_with("ERROR: "));
        assert_eq!(rendered[2], "0.18000,0,1");
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let network = rain_network();
        let queries = lines(&[
            "P(Rain=T|WetGrass=T),1",
            "P(Rain=F|WetGrass=F),2",
            "P(WetGrass=T|),3",
            "P(WetGrass=T|Rain=F),2",
            "P(Rain=F,WetGrass=F)",
            "P(Rain=T|WetGrass=T),3",
        ]);

        let sequential = BatchProcessor::new(&network).process(&queries).unwrap();
        let parallel = BatchProcessor::new(&network)
            .with_jobs(4)
            .process(&queries)
            .unwrap();

        assert_eq!(sequential, parallel);
        assert_eq!(sequential.render(5), parallel.render(5));
    }
}
