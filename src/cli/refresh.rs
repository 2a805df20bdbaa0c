use modelcat::{RefreshReport, Registry};

use super::list::{format_output, table::Table};
use crate::{die, warn, ListingFormat, RefreshArgs};

impl From<RefreshReport> for Table {
    fn from(value: RefreshReport) -> Self {
        let mut tab = Table::new();

        tab.set_header(vec!["SOURCE", "STATUS", "ERROR"]);

        for source in value.succeeded {
            tab.add_row(vec![source.to_string(), "ok".to_string(), "-".to_string()]);
        }

        for failure in value.failed {
            tab.add_row(vec![
                failure.source.to_string(),
                "failed".to_string(),
                failure.error,
            ]);
        }

        tab
    }
}

pub(crate) async fn refresh_cmd(registry: &Registry, args: &RefreshArgs, format: ListingFormat) {
    let report = match registry.refresh().await {
        Ok(report) => report,
        Err(err) => die!("failed to refresh: {}", err),
    };

    for failure in &report.failed {
        warn!("source \"{}\" failed: {}", failure.source, failure.error);
    }

    format_output(report, format);

    if args.save {
        match registry.save().await {
            Ok(path) => eprintln!("saved snapshot to {}", path.display()),
            Err(err) => die!("failed to save snapshot: {}", err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use modelcat::providers::{Error, ErrorKind};
    use modelcat::sources::merge::FailedSource;
    use modelcat::sources::SourceId;

    #[test]
    fn test_report_table() {
        let report = RefreshReport {
            models: 12,
            succeeded: vec![SourceId::new("catalog")],
            failed: vec![FailedSource::new(
                SourceId::new("ollama"),
                &Error::from_kind(ErrorKind::ServiceUnavailable),
            )],
            elapsed_ms: 40,
        };

        let output = Table::from(report).to_string();
        let lines: Vec<&str> = output.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[1].starts_with("catalog  ok"));
        assert!(lines[2].starts_with("ollama   failed"));
    }
}
