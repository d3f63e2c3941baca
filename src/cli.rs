use crate::{
    build,
    fetch::{self, Fetcher},
    hansik::{DEFAULT_URL, Hansik},
};
use anyhow::{Error, Result, anyhow};
use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::log::LevelFilter;
use clap_verbosity_flag::{ErrorLevel, Verbosity};
use compact_str::CompactString;
use std::{io, path::PathBuf, time::Duration};
use tracing_subscriber::filter::LevelFilter as TFilter;
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};
use url::Url;

#[derive(Debug, Clone, Default, ValueEnum)]
pub enum LogFormat {
    Normal,
    Compact,
    Pretty,
    #[default]
    Json,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum FetcherKind {
    /// Headless Chrome/Chromium, one instance per request
    #[default]
    Browser,
    /// Plain HTTP, no javascript
    Http,
    /// Saved copy of the page
    File,
}

#[derive(Debug, Clone, Parser)]
#[command(author, version, long_version = build::CLAP_LONG_VERSION, about, long_about = None, propagate_version = true)]
pub struct Cli {
    /// Log level verbosity
    #[command(flatten)]
    pub verbosity: Verbosity<ErrorLevel>,

    /// Which log formatter to use
    // env will pick up the value if the field name is given as the key in uppercase
    #[arg(short = 'f', long, env, default_value_t, value_enum)]
    pub log_format: LogFormat,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Start the JSON API server
    Serve {
        /// Listen address
        #[arg(short, long, env = "HANSIK_LISTEN", default_value_t = CompactString::from("0.0.0.0:20666"))]
        listen: CompactString,

        #[command(flatten)]
        fetch: FetchArgs,
    },
    /// Scrape the menu once and print the response JSON
    Scrape {
        /// today, mon, tue, wed, thu or fri
        #[arg(short, long)]
        day: Option<String>,

        #[command(flatten)]
        fetch: FetchArgs,
    },
}

#[derive(Debug, Clone, Args)]
pub struct FetchArgs {
    /// Menu page to scrape
    #[arg(short, long, env = "HANSIK_URL", default_value = DEFAULT_URL)]
    pub url: Url,

    /// How to load the menu page
    #[arg(long, env = "HANSIK_FETCHER", default_value_t, value_enum)]
    pub fetcher: FetcherKind,

    /// Saved menu page, for the file fetcher
    #[arg(long, env = "HANSIK_PAGE_FILE", required_if_eq("fetcher", "file"))]
    pub page_file: Option<PathBuf>,

    /// Browser startup and page load timeout
    #[arg(long, env = "HANSIK_TIMEOUT", default_value = "30s", value_parser = humantime::parse_duration)]
    pub timeout: Duration,

    /// Upper bound for a whole menu lookup, answered with a placeholder menu when exceeded
    #[arg(long, env = "HANSIK_LOOKUP_TIMEOUT", default_value = "90s", value_parser = humantime::parse_duration)]
    pub lookup_timeout: Duration,

    /// Chrome/Chromium binary to use instead of the one found on PATH
    #[arg(long, env = "HANSIK_CHROME_PATH")]
    pub chrome_path: Option<PathBuf>,

    /// How long the http fetcher keeps pages around, 0s disables caching
    #[arg(long, env = "HANSIK_CACHE_TTL", default_value = "0s", value_parser = humantime::parse_duration)]
    pub cache_ttl: Duration,

    /// Max number of pages in the http fetcher's cache
    #[arg(long, env = "HANSIK_CACHE_CAPACITY", default_value_t = 64)]
    pub cache_capacity: usize,
}

impl FetchArgs {
    fn opts(&self) -> fetch::Opts {
        fetch::Opts {
            timeout: self.timeout,
            chrome_path: self.chrome_path.clone(),
            cache_ttl: self.cache_ttl,
            cache_capacity: self.cache_capacity,
        }
    }

    pub fn fetcher(&self) -> Result<Fetcher> {
        Ok(match self.fetcher {
            FetcherKind::Browser => Fetcher::Browser(fetch::browser::Launcher::new(&self.opts())),
            FetcherKind::Http => Fetcher::Http(fetch::http::Client::build(&self.opts())?),
            FetcherKind::File => Fetcher::File(
                self.page_file
                    .clone()
                    .ok_or_else(|| anyhow!("the file fetcher needs --page-file"))?,
            ),
        })
    }

    /// Set up the lookup service from these options
    pub fn hansik(&self) -> Result<Hansik> {
        Ok(Hansik::new(
            self.fetcher()?,
            self.url.clone(),
            self.lookup_timeout,
        ))
    }
}

impl Cli {
    /// Wrapper for clap::Parser::try_parse_from
    pub fn try_parse_opts<I, T>(itr: I) -> Result<Self>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Self::try_parse_from(itr).map_err(Error::from)
    }

    // this thin wrapper makes it possible to do the parsing without importing clap::Parser at the
    // call site
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Maps clap_verbosity_flag::LevelFilter values to tracing_subscriber::filter::LevelFilter
    /// values
    fn tracing_level_filter(&self) -> TFilter {
        match self.verbosity.log_level_filter() {
            LevelFilter::Off => TFilter::OFF,
            LevelFilter::Error => TFilter::ERROR,
            LevelFilter::Warn => TFilter::WARN,
            LevelFilter::Info => TFilter::INFO,
            LevelFilter::Debug => TFilter::DEBUG,
            LevelFilter::Trace => TFilter::TRACE,
        }
    }

    pub fn init_logger(&self) -> Result<()> {
        let layer = match self.log_format {
            LogFormat::Json => fmt::layer().json().with_writer(io::stderr).boxed(),
            LogFormat::Pretty => fmt::layer().pretty().with_writer(io::stderr).boxed(),
            LogFormat::Compact => fmt::layer()
                .without_time()
                .compact()
                .with_writer(io::stderr)
                .boxed(),
            LogFormat::Normal => fmt::layer().with_writer(io::stderr).boxed(),
        };
        tracing_subscriber::registry()
            .with(
                EnvFilter::builder()
                    .with_default_directive(self.tracing_level_filter().into())
                    .from_env()?,
            )
            .with(layer)
            .init();
        Ok(())
    }
}
