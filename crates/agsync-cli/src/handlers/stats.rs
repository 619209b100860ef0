use crate::presentation::ConsoleRenderer;
use crate::presentation::view_models::StatsViewModel;
use crate::types::StatsGroup;
use agsync_index::SummaryFilter;
use agsync_runtime::AgSync;
use agsync_types::DateRange;
use anyhow::{Context, Result};

pub fn handle(
    app: &AgSync,
    by: StatsGroup,
    since: Option<String>,
    until: Option<String>,
    sources: Vec<String>,
    csv: bool,
    renderer: &ConsoleRenderer,
) -> Result<()> {
    // Same validation as the scope flags, then compared as day strings.
    let range = DateRange::parse(since.as_deref(), until.as_deref())?;
    let filter = SummaryFilter {
        since: range.since.map(|d| d.to_string()),
        until: range.until.map(|d| d.to_string()),
        source_keys: (!sources.is_empty()).then_some(sources),
    };

    let rows = app.stats(by.into(), &filter)?;

    if csv {
        let mut writer = csv::Writer::from_writer(std::io::stdout());
        for row in &rows {
            writer.serialize(row).context("Failed to write CSV row")?;
        }
        writer.flush()?;
        return Ok(());
    }

    renderer.render(&StatsViewModel {
        group_by: by.to_string(),
        rows,
    })
}
