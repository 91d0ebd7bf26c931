use crate::cli::args::CliArgs;
use crate::filter::FilterType;
use crate::output::OutputFormat;

pub fn validate(args: &CliArgs) -> Result<(), String> {
    if let Some(page_size) = args.page_size {
        if page_size == 0 {
            return Err("invalid page-size, expected positive integer".to_string());
        }
    }
    validate_scroll_timeout(args.scroll_timeout)?;
    validate_timeout(args.timeout)?;
    if let Some(raw) = args.filter.as_deref() {
        raw.parse::<FilterType>()
            .map_err(|e| format!("invalid --filter '{raw}': {e}"))?;
    }
    if let Some(raw) = args.output_format.as_deref() {
        if OutputFormat::parse(raw).is_none() {
            return Err(format!(
                "invalid --output-format '{raw}', expected text, json or html"
            ));
        }
    }
    validate_length("viewport-height", args.viewport_height)?;
    validate_length("row-height", args.row_height)?;
    Ok(())
}

pub const MAX_SCROLL_TIMEOUT_MS: u64 = 60_000;

pub fn validate_scroll_timeout(value: Option<u64>) -> Result<(), String> {
    match value {
        Some(ms) if ms > MAX_SCROLL_TIMEOUT_MS => Err(format!(
            "invalid scroll-timeout, expected at most {MAX_SCROLL_TIMEOUT_MS} ms"
        )),
        _ => Ok(()),
    }
}

pub fn validate_timeout(value: Option<u64>) -> Result<(), String> {
    match value {
        Some(0) => Err("invalid timeout, expected positive integer".to_string()),
        _ => Ok(()),
    }
}

pub fn validate_length(name: &str, value: Option<f64>) -> Result<(), String> {
    match value {
        Some(v) if !v.is_finite() || v <= 0.0 => {
            Err(format!("invalid {name}, expected a positive number of pixels"))
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn args(extra: &[&str]) -> CliArgs {
        let mut argv = vec!["hostlist"];
        argv.extend_from_slice(extra);
        CliArgs::parse_from(argv)
    }

    #[test]
    fn defaults_are_valid() {
        assert!(validate(&args(&[])).is_ok());
    }

    #[test]
    fn rejects_out_of_range_values() {
        assert!(validate(&args(&["--page-size", "0"])).is_err());
        assert!(validate(&args(&["--timeout", "0"])).is_err());
        assert!(validate(&args(&["--scroll-timeout", "600000"])).is_err());
        assert!(validate(&args(&["--row-height", "0"])).is_err());
        assert!(validate(&args(&["--viewport-height=-20"])).is_err());
    }

    #[test]
    fn rejects_unknown_filter_and_format() {
        let err = validate(&args(&["--filter", "filter-popular"])).unwrap_err();
        assert!(err.contains("filter-popular"));
        assert!(validate(&args(&["--output-format", "xml"])).is_err());
        assert!(validate(&args(&["--filter", "filter-top-rated", "--of", "html"])).is_ok());
    }
}
