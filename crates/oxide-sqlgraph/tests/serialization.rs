//! JSON shape of analysis output.

use oxide_sqlgraph::{analyze, layout, AnalysisResult, LayoutOptions};
use serde_json::Value;

#[test]
fn result_uses_camel_case_keys() {
    let result = analyze("SELECT u.name, count(*) FROM users u LEFT JOIN orders o ON u.id = o.user_id");
    let json = serde_json::to_value(&result).unwrap();

    assert!(json["diagnostics"].as_array().unwrap().is_empty());

    let users = &json["tables"][0];
    assert_eq!(users["id"], "u");
    assert_eq!(users["name"], "users");
    assert_eq!(users["alias"], "u");
    assert_eq!(users["isSubquery"], false);
    assert_eq!(users["isVirtual"], false);
    assert_eq!(users["isOrphan"], false);
    assert_eq!(users["columns"][0]["name"], "name");
    assert_eq!(users["columns"][0]["isFunction"], false);

    let bucket = &json["tables"][2];
    assert_eq!(bucket["isVirtual"], true);
    assert_eq!(bucket["columns"][0]["name"], Value::Null);
    assert_eq!(bucket["columns"][0]["isFunction"], true);

    let edge = &json["edges"][0];
    assert_eq!(edge["joinType"], "left join");
    assert_eq!(edge["sourceColumn"], "id");
    assert_eq!(edge["targetColumn"], "user_id");
    assert_eq!(edge["operator"], "=");
}

#[test]
fn positioned_table_is_flat() {
    let result = analyze("SELECT * FROM a JOIN b ON a.id = b.id");
    let placed = layout(&result.tables, &LayoutOptions::default());
    let json = serde_json::to_value(&placed).unwrap();

    assert_eq!(json[0]["id"], "a");
    assert_eq!(json[0]["columns"][0]["name"], "*");
    assert!(json[0]["x"].is_number());
    assert!(json[0]["y"].is_number());
    assert!(json[0].get("table").is_none());
}

#[test]
fn result_reads_back_from_json() {
    let result = analyze("SELECT x.y FROM a LEFT JOIN b ON a.id = b.a_id WHERE 1=1");
    let text = serde_json::to_string(&result).unwrap();
    let back: AnalysisResult = serde_json::from_str(&text).unwrap();
    assert_eq!(back, result);
}

#[test]
fn layout_options_deserialize_from_camel_case() {
    let options: LayoutOptions = serde_json::from_str(
        r#"{"centerX": 0.0, "centerY": 0.0, "minRadius": 10.0, "radiusPerTable": 5.0}"#,
    )
    .unwrap();
    assert!((options.radius_for(4) - 20.0).abs() < f64::EPSILON);
}
