use rusqlite::Connection;

use crate::{
    Result,
    records::{GroupBy, MetricsSummary, SummaryFilter},
};

pub fn summarize(
    conn: &Connection,
    group_by: GroupBy,
    filter: &SummaryFilter,
) -> Result<Vec<MetricsSummary>> {
    let mut where_clauses: Vec<String> = Vec::new();
    let mut params: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

    if let Some(since) = &filter.since {
        where_clauses.push("substr(last_ts, 1, 10) >= ?".to_string());
        params.push(Box::new(since.clone()));
    }

    if let Some(until) = &filter.until {
        where_clauses.push("substr(last_ts, 1, 10) <= ?".to_string());
        params.push(Box::new(until.clone()));
    }

    if let Some(keys) = &filter.source_keys {
        if keys.is_empty() {
            return Ok(Vec::new());
        }
        let placeholders = vec!["?"; keys.len()].join(", ");
        where_clauses.push(format!("source_key IN ({})", placeholders));
        for key in keys {
            params.push(Box::new(key.clone()));
        }
    }

    let where_clause = if where_clauses.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", where_clauses.join(" AND "))
    };
    let column = group_by.column();

    let query = format!(
        r#"
        SELECT {column},
               COUNT(*),
               SUM(message_count),
               SUM(user_messages),
               SUM(assistant_messages),
               SUM(tool_calls),
               SUM(input_tokens),
               SUM(output_tokens),
               MIN(first_ts),
               MAX(last_ts)
        FROM session_metrics
        {where_clause}
        GROUP BY {column}
        ORDER BY MAX(last_ts) DESC, {column} ASC
        "#
    );

    let mut stmt = conn.prepare(&query)?;
    let param_refs: Vec<&dyn rusqlite::ToSql> = params.iter().map(|p| p.as_ref()).collect();

    let summaries = stmt
        .query_map(param_refs.as_slice(), |row| {
            Ok(MetricsSummary {
                group: row.get(0)?,
                sessions: row.get(1)?,
                messages: row.get(2)?,
                user_messages: row.get(3)?,
                assistant_messages: row.get(4)?,
                tool_calls: row.get(5)?,
                input_tokens: row.get(6)?,
                output_tokens: row.get(7)?,
                first_activity: row.get(8)?,
                last_activity: row.get(9)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(summaries)
}
