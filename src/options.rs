//! Parsing Options.
//! Command-line flags override the values loaded from `--config FILE`.

use clap::{Arg, ArgAction, Command, value_parser};
use std::error::Error;
use std::path::PathBuf;

use crate::config::RunConfig;
use crate::validate::Backend;

fn make_options_parser() -> clap::Command {
    let parser = Command::new("gcv")
        .no_binary_name(true)
        .version("v0.1.0")
        .about("Validates a batch of candidate graph colorings in parallel")
        .args_override_self(true)
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .value_parser(value_parser!(PathBuf))
                .help("TOML run configuration"),
        )
        .arg(
            Arg::new("vertices")
                .short('n')
                .long("vertices")
                .value_parser(value_parser!(usize))
                .help("Vertex count of the random graph (1..=63)"),
        )
        .arg(
            Arg::new("probability")
                .short('p')
                .long("edge-probability")
                .value_parser(value_parser!(f64))
                .help("Probability of each edge in the random graph"),
        )
        .arg(
            Arg::new("seed")
                .short('s')
                .long("seed")
                .value_parser(value_parser!(u64)),
        )
        .arg(
            Arg::new("colors")
                .short('k')
                .long("colors")
                .value_parser(value_parser!(u32))
                .help("Number of colors used by the enumerator"),
        )
        .arg(
            Arg::new("prefix-depth")
                .short('d')
                .long("prefix-depth")
                .value_parser(value_parser!(usize)),
        )
        .arg(
            Arg::new("max-candidates")
                .short('m')
                .long("max-candidates")
                .value_parser(value_parser!(usize)),
        )
        .arg(
            Arg::new("backend")
                .short('b')
                .long("backend")
                .value_parser(Backend::NAMES),
        )
        .arg(
            Arg::new("threads")
                .short('t')
                .long("threads")
                .value_parser(value_parser!(usize)),
        )
        .arg(
            Arg::new("no-fallback")
                .long("no-fallback")
                .action(ArgAction::SetTrue)
                .help("Fail instead of rerunning sequentially when the backend fails"),
        )
        .arg(
            Arg::new("any")
                .long("any")
                .action(ArgAction::SetTrue)
                .help("Stop at any valid candidate (result may vary between runs)"),
        )
        .arg(
            Arg::new("graph")
                .long("graph")
                .value_name("FILE")
                .value_parser(value_parser!(PathBuf))
                .help("Load the graph from a JSON or RON file"),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("FILE")
                .value_parser(value_parser!(PathBuf))
                .help("Path to file where the JSON report will be stored"),
        );
    parser
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Options {
    pub config: Option<PathBuf>,
    pub vertices: Option<usize>,
    pub edge_probability: Option<f64>,
    pub seed: Option<u64>,
    pub colors: Option<u32>,
    pub prefix_depth: Option<usize>,
    pub max_candidates: Option<usize>,
    pub backend: Option<Backend>,
    pub threads: Option<usize>,
    pub no_fallback: bool,
    pub any_valid: bool,
    pub graph: Option<PathBuf>,
    pub output: Option<PathBuf>,
}

impl Options {
    pub fn parse_from_str(s: &str) -> Result<Self, Box<dyn Error>> {
        let flags = shellwords::split(s)?;
        Self::parse_from_args(&flags)
    }

    pub fn parse_from_args(flags: &[String]) -> Result<Self, Box<dyn Error>> {
        let app = make_options_parser();
        let matches = app.try_get_matches_from(flags.iter())?;
        let backend = match matches.get_one::<String>("backend") {
            Some(name) => Some(name.parse::<Backend>()?),
            None => None,
        };
        Ok(Options {
            config: matches.get_one::<PathBuf>("config").cloned(),
            vertices: matches.get_one::<usize>("vertices").copied(),
            edge_probability: matches.get_one::<f64>("probability").copied(),
            seed: matches.get_one::<u64>("seed").copied(),
            colors: matches.get_one::<u32>("colors").copied(),
            prefix_depth: matches.get_one::<usize>("prefix-depth").copied(),
            max_candidates: matches.get_one::<usize>("max-candidates").copied(),
            backend,
            threads: matches.get_one::<usize>("threads").copied(),
            no_fallback: matches.get_flag("no-fallback"),
            any_valid: matches.get_flag("any"),
            graph: matches.get_one::<PathBuf>("graph").cloned(),
            output: matches.get_one::<PathBuf>("output").cloned(),
        })
    }

    /// Overwrites every field of `config` that was given on the command line.
    pub fn apply(&self, config: &mut RunConfig) {
        if let Some(n) = self.vertices {
            config.vertices = n;
        }
        if let Some(p) = self.edge_probability {
            config.edge_probability = p;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if let Some(k) = self.colors {
            config.colors = k;
        }
        if let Some(depth) = self.prefix_depth {
            config.prefix_depth = depth;
        }
        if let Some(max) = self.max_candidates {
            config.max_candidates = max;
        }
        if let Some(backend) = self.backend {
            config.backend = backend;
        }
        if let Some(threads) = self.threads {
            config.threads = threads;
        }
        if self.no_fallback {
            config.fallback = false;
        }
        if self.any_valid {
            config.any_valid = true;
        }
        if let Some(graph) = &self.graph {
            config.graph = Some(graph.clone());
        }
        if let Some(output) = &self.output {
            config.output = Some(output.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_from_str_err() {
        let options = Options::parse_from_str("-b cuda -n 10");
        assert!(options.is_err());
        let options = Options::parse_from_str("-n many");
        assert!(options.is_err());
    }

    #[test]
    fn help_and_version_are_clap_display_errors() {
        use clap::error::ErrorKind;

        let err = Options::parse_from_str("--help").unwrap_err();
        let clap_err = err.downcast_ref::<clap::Error>().unwrap();
        assert_eq!(clap_err.kind(), ErrorKind::DisplayHelp);
        assert_eq!(clap_err.exit_code(), 0);

        let err = Options::parse_from_str("-n 12 --version").unwrap_err();
        let clap_err = err.downcast_ref::<clap::Error>().unwrap();
        assert_eq!(clap_err.kind(), ErrorKind::DisplayVersion);
        assert_eq!(clap_err.exit_code(), 0);

        let err = Options::parse_from_str("--vertices").unwrap_err();
        let clap_err = err.downcast_ref::<clap::Error>().unwrap();
        assert_eq!(clap_err.exit_code(), 2);
    }

    #[test]
    fn test_parse_from_args() {
        let options = Options::parse_from_args(&[
            "-n".to_owned(),
            "12".to_owned(),
            "--backend".to_owned(),
            "sequential".to_owned(),
            "--no-fallback".to_owned(),
        ])
        .unwrap();
        assert_eq!(options.vertices, Some(12));
        assert_eq!(options.backend, Some(Backend::Sequential));
        assert!(options.no_fallback);
        assert!(!options.any_valid);
    }

    #[test]
    fn later_flags_override_earlier_ones() {
        let options = Options::parse_from_str("-k 3 --colors 5 -o 'my report.json'").unwrap();
        assert_eq!(options.colors, Some(5));
        assert_eq!(options.output, Some(PathBuf::from("my report.json")));
    }

    #[test]
    fn apply_only_touches_given_fields() {
        let mut config = RunConfig::default();
        Options::parse_from_str("-p 0.5 --any -t 2")
            .unwrap()
            .apply(&mut config);
        assert_eq!(config.edge_probability, 0.5);
        assert!(config.any_valid);
        assert_eq!(config.threads, 2);
        assert_eq!(config.vertices, 35);
        assert!(config.fallback);
    }
}
