use crate::{models::Record, value_utils::value_to_search_string};

/// Case-insensitive substring match across every field value of the record.
/// The identity is not part of the data map, so it never matches.
pub fn record_matches(record: &Record, query_lower: &str) -> bool {
    record.data.values().any(|value| {
        value_to_search_string(value)
            .map(|text| text.to_lowercase().contains(query_lower))
            .unwrap_or(false)
    })
}

/// Linear filter of a snapshot by substring match, order preserved. A blank
/// query matches everything; callers decide whether to show an unfiltered
/// table.
pub fn filter_records(records: &[Record], query: &str) -> Vec<Record> {
    let query_lower = query.trim().to_lowercase();
    if query_lower.is_empty() {
        return records.to_vec();
    }
    records
        .iter()
        .filter(|record| record_matches(record, &query_lower))
        .cloned()
        .collect()
}
