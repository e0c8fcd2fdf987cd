//! Human-readable constraint failure messages, kept in one place so callers
//! see stable text.

use serde_json::Value;

pub const REQUIRED: &str = "This field is required.";
pub const NOT_A_STRING: &str = "Must be a string.";
pub const NOT_A_NUMBER: &str = "Must be a number.";
pub const NOT_AN_INTEGER: &str = "Must be an integer.";
pub const NOT_A_BOOLEAN: &str = "Must be a valid boolean.";
pub const NOT_AN_OBJECT: &str = "Must be an object.";
pub const NOT_AN_ARRAY: &str = "Must be an array.";
pub const BLANK: &str = "Must not be blank.";
pub const INVALID_CHOICE: &str = "Must be a valid choice.";
pub const NO_ADDITIONAL_PROPERTIES: &str = "Unknown properties are not permitted.";
pub const NO_ADDITIONAL_ITEMS: &str = "Additional items are not permitted.";
pub const NOT_UNIQUE: &str = "This item is not unique.";
pub const NO_UNION_MATCH: &str = "Must match one of the permitted types.";

pub fn min_length(min: usize) -> String {
    format!("Must have at least {min} characters.")
}

pub fn max_length(max: usize) -> String {
    format!("Must have no more than {max} characters.")
}

pub fn pattern(pattern: &str) -> String {
    format!("Must match the pattern /{pattern}/.")
}

pub fn minimum(bound: f64, exclusive: bool) -> String {
    if exclusive {
        format!("Must be greater than {bound}.")
    } else {
        format!("Must be greater than or equal to {bound}.")
    }
}

pub fn maximum(bound: f64, exclusive: bool) -> String {
    if exclusive {
        format!("Must be less than {bound}.")
    } else {
        format!("Must be less than or equal to {bound}.")
    }
}

pub fn multiple_of(step: f64) -> String {
    format!("Must be a multiple of {step}.")
}

pub fn exact_choice(choice: &Value) -> String {
    format!("Must be {choice}.")
}

pub fn min_items(min: usize) -> String {
    format!("Must have at least {min} items.")
}

pub fn max_items(max: usize) -> String {
    format!("Must have no more than {max} items.")
}
