use serde_json::Value;

/// Result fields tried in order; the first non-null one is printed.
const PRIORITY_KEYS: [&str; 8] = [
    "monthly_payment",
    "months",
    "cheapest",
    "impact",
    "allocation",
    "summary",
    "total_balance",
    "order",
];

/// Print just the headline answer, for use in shell pipelines.
pub fn print_minimal(value: &Value) {
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    if let Value::Object(map) = result_obj {
        let hit = PRIORITY_KEYS
            .iter()
            .find_map(|key| map.get(*key).filter(|v| !v.is_null()));
        if let Some(val) = hit {
            println!("{}", format_minimal(val));
            return;
        }
        if let Some((key, val)) = map.iter().next() {
            println!("{}: {}", key, format_minimal(val));
            return;
        }
    }

    println!("{}", format_minimal(result_obj));
}

fn format_minimal(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        // Avalanche order prints as ids, one per line
        Value::Array(arr) => arr
            .iter()
            .map(|v| match v.get("id") {
                Some(id) => format_minimal(id),
                None => format_minimal(v),
            })
            .collect::<Vec<_>>()
            .join("\n"),
        // Flat objects print as `key=value` pairs on one line
        Value::Object(map) if map.values().all(|v| !v.is_object() && !v.is_array()) => map
            .iter()
            .map(|(k, v)| format!("{}={}", k, format_minimal(v)))
            .collect::<Vec<_>>()
            .join(" "),
        Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}
