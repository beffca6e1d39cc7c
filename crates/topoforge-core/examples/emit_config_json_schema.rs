use schemars::schema_for;
use topoforge_core::Configuration;

fn main() {
    let schema = schema_for!(Configuration);
    let json = serde_json::to_string_pretty(&schema).expect("serialize json schema");
    println!("{json}");
}
