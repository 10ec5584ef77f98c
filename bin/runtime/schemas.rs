use schemars::{JsonSchema, Schema, SchemaGenerator, json_schema};

pub(super) fn header_map(generator: &mut SchemaGenerator) -> Schema {
    // A header map is just a hash map of string to string with extra validation
    let string_schema = String::json_schema(generator);
    json_schema!({
        "type": "object",
        "additionalProperties": string_schema
    })
}
