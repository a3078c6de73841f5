use clap::Parser;
use std::io::{self, BufWriter};
use std::process::ExitCode;
use yum_dump::{Config, dump};

/// yum-dump - list installed and available yum packages
///
/// Prints one line per package: name, epoch, version, release, arch and
/// `i` (installed) or `a` (available).
///
/// Without root the cached repository data is always used and yum's lock is
/// not taken.
#[derive(Parser, Debug)]
#[command(author, version = env!("YUM_DUMP_VERSION"), about)]
struct Cli {
    /// Only use cached data, do not refresh repository metadata
    #[arg(short = 'C', long = "cache")]
    cache: bool,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();
    let runtime = yum_dump::runtime::RealRuntime;
    let config = Config::new(&runtime, cli.cache);

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    match dump(&runtime, &config, &mut out) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("yum-dump {}", e);
            ExitCode::from(e.exit_code())
        }
    }
}
