use calamine::Data;
use serde_json::Value;

/// Normalizes a spreadsheet cell to the primitive shapes the table carries:
/// string, number, or empty string. Richer cell types (dates, errors) are
/// stringified or blanked, never propagated.
pub fn cell_to_value(cell: &Data) -> Value {
    match cell {
        Data::Empty => Value::String(String::new()),
        Data::String(text) => Value::String(text.clone()),
        Data::Int(v) => Value::from(*v),
        Data::Float(v) => Value::from(*v),
        Data::Bool(v) => Value::String(v.to_string()),
        Data::DateTime(_) => Value::String(cell.to_string()),
        Data::DateTimeIso(text) | Data::DurationIso(text) => Value::String(text.clone()),
        Data::Error(_) => Value::String(String::new()),
    }
}

pub fn cell_has_value(cell: &Data) -> bool {
    !matches!(cell, Data::Empty | Data::Error(_))
}

/// A field counts as blank when it is null or an empty string; numbers are
/// never blank.
pub fn value_is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(text) => text.is_empty(),
        _ => false,
    }
}

pub fn value_to_search_string(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(boolean) => Some(boolean.to_string()),
        Value::Array(_) | Value::Object(_) => serde_json::to_string(value).ok(),
    }
}

/// Display form used by the row-details view: blank fields render as "-".
pub fn value_display(value: &Value) -> String {
    match value_to_search_string(value) {
        Some(text) if !text.is_empty() => text,
        _ => "-".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_cell_becomes_empty_string() {
        assert_eq!(cell_to_value(&Data::Empty), Value::String(String::new()));
    }

    #[test]
    fn numeric_cells_stay_numeric() {
        assert_eq!(cell_to_value(&Data::Int(30)), Value::from(30));
        assert_eq!(cell_to_value(&Data::Float(2.5)), Value::from(2.5));
    }

    #[test]
    fn blank_detection() {
        assert!(value_is_blank(&Value::Null));
        assert!(value_is_blank(&Value::String(String::new())));
        assert!(!value_is_blank(&Value::from(0)));
        assert!(!value_is_blank(&Value::String(" ".into())));
    }
}
