use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install the global subscriber. Logs go to stderr; stdout carries JSON.
///
/// `RUBRICATE_LOG` (or `RUST_LOG`) overrides the flags.
pub fn init_tracing(verbose: bool, log_level: Option<&str>, log_json: bool) -> anyhow::Result<()> {
    let level = match (verbose, log_level) {
        (_, Some(level)) => level,
        (true, None) => "debug",
        (false, None) => "warn",
    };

    let filter = EnvFilter::try_from_env("RUBRICATE_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(directive(level)));

    let registry = tracing_subscriber::registry().with(filter);

    if log_json {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_ansi(false),
            )
            .try_init()?;
    } else {
        registry
            .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
            .try_init()?;
    }

    Ok(())
}

/// A bare level applies to our crates only; anything with `=` is passed through.
fn directive(level: &str) -> String {
    if level.contains('=') {
        level.to_string()
    } else {
        format!("rubricate={level},rubricate_runtime={level},rubricate_core={level}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_level_scoped_to_our_crates() {
        assert_eq!(
            directive("info"),
            "rubricate=info,rubricate_runtime=info,rubricate_core=info"
        );
    }

    #[test]
    fn test_full_directive_passed_through() {
        assert_eq!(directive("rubricate_runtime=trace"), "rubricate_runtime=trace");
    }
}
