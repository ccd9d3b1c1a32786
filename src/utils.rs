use time::macros::format_description;
use tracing_subscriber::fmt::time::LocalTime;
use tracing_subscriber::EnvFilter;

/// Installs the stderr subscriber. `--verbose` forces `info`; otherwise
/// `RUST_LOG` is honoured and defaults to `warn`.
pub fn setup_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    let timer = LocalTime::new(format_description!(
        "[hour]:[minute]:[second].[subsecond digits:3]"
    ));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_timer(timer)
        .with_writer(std::io::stderr)
        .init();
}

pub fn validate_args(args: &crate::args::Args) -> anyhow::Result<()> {
    if let Some(workers) = args.workers {
        if workers == 0 {
            anyhow::bail!("--workers must be greater than 0");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args::Args;

    #[test]
    fn rejects_zero_workers() {
        let args = Args {
            workers: Some(0),
            ..Args::default()
        };
        assert!(validate_args(&args).is_err());
    }

    #[test]
    fn accepts_defaults() {
        assert!(validate_args(&Args::default()).is_ok());
        let args = Args {
            workers: Some(4),
            ..Args::default()
        };
        assert!(validate_args(&args).is_ok());
    }
}
