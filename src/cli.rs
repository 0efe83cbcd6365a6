//! Command-line interface

use clap::Parser;

/// Speedprobe - measure effective latency, download and upload speed
#[derive(Parser, Debug, Clone)]
#[command(name = "speedprobe")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Number of measurement rounds (results are averaged across rounds)
    #[arg(short, long)]
    pub count: Option<u32>,

    /// Output the result as JSON
    #[arg(long)]
    pub json: bool,

    /// Base URL of the probe catalog service
    #[arg(long, env = "SPEEDPROBE_BASE_URL")]
    pub base_url: Option<String>,

    /// Latency attempts per probe and round
    #[arg(long)]
    pub latency_attempts: Option<u32>,

    /// Per-probe timeout in seconds, overriding catalog-supplied timeouts
    #[arg(short, long)]
    pub timeout: Option<f64>,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Enable verbose output
    #[arg(long)]
    pub verbose: bool,

    /// Enable debug output
    #[arg(long)]
    pub debug: bool,
}

impl Cli {
    /// Validate CLI arguments for conflicts and requirements
    pub fn validate(&self) -> Result<(), String> {
        if let Some(0) = self.count {
            return Err("--count must be at least 1".to_string());
        }
        if let Some(0) = self.latency_attempts {
            return Err("--latency-attempts must be at least 1".to_string());
        }
        if let Some(secs) = self.timeout {
            if !(secs > 0.0) {
                return Err("--timeout must be a positive number of seconds".to_string());
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::parse_from(std::iter::once("speedprobe").chain(args.iter().copied()))
    }

    #[test]
    fn test_default_flags() {
        let cli = parse(&[]);
        assert_eq!(cli.count, None);
        assert!(!cli.json);
        assert!(!cli.no_color);
        assert!(cli.validate().is_ok());
    }

    #[test]
    fn test_count_short_and_long() {
        assert_eq!(parse(&["-c", "5"]).count, Some(5));
        assert_eq!(parse(&["--count", "10"]).count, Some(10));
    }

    #[test]
    fn test_zero_count_rejected() {
        assert!(parse(&["--count", "0"]).validate().is_err());
        assert!(parse(&["--latency-attempts", "0"]).validate().is_err());
    }

    #[test]
    fn test_timeout_flag() {
        assert_eq!(parse(&["-t", "5"]).timeout, Some(5.0));
        assert_eq!(parse(&["--timeout", "2.5"]).timeout, Some(2.5));
        assert!(parse(&["--timeout", "0"]).validate().is_err());
        assert!(parse(&["--timeout=-1"]).validate().is_err());
    }

    #[test]
    fn test_json_and_base_url() {
        let cli = parse(&["--json", "--base-url", "https://example.com"]);
        assert!(cli.json);
        assert_eq!(cli.base_url.as_deref(), Some("https://example.com"));
    }
}
