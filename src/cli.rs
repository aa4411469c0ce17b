use std::ffi::OsString;
use std::path::PathBuf;

use clap::{ArgMatches, CommandFactory, FromArgMatches, Parser};

use crate::config::{Config, RuleConfig, Syntax};
use crate::error::SetupError;

#[derive(Debug, Parser)]
#[command(name = "http-redirect", version)]
#[command(about = "Starts a very simple HTTP server that always sends back 301 redirects")]
#[command(
    after_help = "Patterns are matched against {HOST}{URI}, for example \"google.com/search\", \
                  and tested in order. If none matches, the default destination is used.\n\n\
                  Example:\n    http-redirect -p 80 http://www.google.com/"
)]
pub struct Cli {
    /// Default redirect destination
    #[arg(env = "REDIRECT_DESTINATION")]
    pub destination: Option<String>,

    /// Address to bind (all interfaces when omitted)
    #[arg(short, long, env = "REDIRECT_BIND")]
    pub bind: Option<String>,

    /// Port on which to listen [default: 80]
    #[arg(short, long, env = "REDIRECT_PORT")]
    pub port: Option<String>,

    /// Use DEST if the request matches the basic regular expression
    #[arg(short = 'r', long = "regex", num_args = 2, value_names = ["REGEX", "DEST"])]
    pub regex: Vec<String>,

    /// Same as --regex, using extended regular expressions
    #[arg(short = 'e', long = "eregex", num_args = 2, value_names = ["REGEX", "DEST"])]
    pub eregex: Vec<String>,

    /// YAML configuration file; command line values take precedence
    #[arg(short, long, env = "REDIRECT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Maximum number of simultaneous client connections [default: 16]
    #[arg(long)]
    pub max_connections: Option<usize>,

    /// Per-connection line buffer size in bytes [default: 1024]
    #[arg(long)]
    pub buffer_size: Option<usize>,

    /// Only log warnings and errors
    #[arg(short, long)]
    pub quiet: bool,

    /// `--regex` and `--eregex` pairs in command line order.
    #[arg(skip)]
    pub rules: Vec<RuleConfig>,
}

impl Cli {
    pub fn try_parse_args() -> Result<Self, clap::Error> {
        Self::try_parse_from_args(std::env::args_os())
    }

    pub fn try_parse_from_args<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let matches = Self::command().try_get_matches_from(args)?;
        let mut cli = Self::from_arg_matches(&matches)?;
        cli.rules = ordered_rules(&matches);
        Ok(cli)
    }

    /// Layers the command line over the configuration file (if any) and the
    /// built-in defaults, then validates the result.
    pub fn into_config(self) -> Result<Config, SetupError> {
        let mut cfg = match &self.config {
            Some(path) => Config::from_file(path)?,
            None => Config::default(),
        };

        if let Some(bind) = self.bind {
            cfg.bind = Some(bind);
        }
        if let Some(port) = self.port {
            cfg.port = port;
        }
        if let Some(destination) = self.destination {
            cfg.default_destination = destination;
        }
        if let Some(max) = self.max_connections {
            cfg.max_connections = max;
        }
        if let Some(size) = self.buffer_size {
            cfg.buffer_size = size;
        }
        cfg.rules.extend(self.rules);

        cfg.validate()?;
        Ok(cfg)
    }
}

/// clap keeps `-r` and `-e` values apart; their argument positions restore
/// the single ordered list.
fn ordered_rules(matches: &ArgMatches) -> Vec<RuleConfig> {
    let mut rules = Vec::new();

    for (id, syntax) in [("regex", Syntax::Basic), ("eregex", Syntax::Extended)] {
        let (Some(values), Some(indices)) =
            (matches.get_many::<String>(id), matches.indices_of(id))
        else {
            continue;
        };
        let values: Vec<&String> = values.collect();
        let indices: Vec<usize> = indices.collect();

        for (pair, position) in values.chunks_exact(2).zip(indices.chunks_exact(2)) {
            rules.push((
                position[0],
                RuleConfig {
                    pattern: pair[0].clone(),
                    syntax,
                    destination: pair[1].clone(),
                },
            ));
        }
    }

    rules.sort_by_key(|(position, _)| *position);
    rules.into_iter().map(|(_, rule)| rule).collect()
}
