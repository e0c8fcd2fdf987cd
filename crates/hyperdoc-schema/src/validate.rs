//! The validation engine: pure `validate(value) -> coerced value` functions.
//!
//! Scalar kinds report the first failing constraint as a single message.
//! Container kinds validate every sibling independently and aggregate all
//! failures into one keyed detail map, never stopping at the first error
//! within a level.

use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::error::{ErrorDetail, ValidationError};
use crate::messages;
use crate::schema::{
    Additional, ArraySchema, BooleanSchema, EnumSchema, IntegerSchema, Items, NumberSchema,
    ObjectSchema, Schema, StringSchema, UnionSchema,
};

impl Schema {
    /// Validate a JSON value, returning the coerced value on success.
    pub fn validate(&self, value: &Value) -> Result<Value, ValidationError> {
        if value.is_null() && self.base().allow_null {
            return Ok(Value::Null);
        }
        match self {
            Schema::String(schema) => validate_string(schema, value),
            Schema::Number(schema) => validate_number(schema, value),
            Schema::Integer(schema) => validate_integer(schema, value),
            Schema::Boolean(schema) => validate_boolean(schema, value),
            Schema::Enum(schema) => validate_enum(schema, value),
            Schema::Object(schema) => validate_object(schema, value),
            Schema::Array(schema) => validate_array(schema, value),
            Schema::Union(schema) => validate_union(schema, value),
            Schema::Any(_) => Ok(value.clone()),
        }
    }
}

fn fail(text: impl Into<String>) -> ValidationError {
    ValidationError::message(text)
}

// ── Scalars ───────────────────────────────────────────────────────────────

fn validate_string(schema: &StringSchema, value: &Value) -> Result<Value, ValidationError> {
    let raw = value.as_str().ok_or_else(|| fail(messages::NOT_A_STRING))?;
    let text = if schema.trim_whitespace {
        raw.trim()
    } else {
        raw
    };
    let length = text.chars().count();
    if let Some(min) = schema.min_length {
        if length < min {
            if text.is_empty() {
                return Err(fail(messages::BLANK));
            }
            return Err(fail(messages::min_length(min)));
        }
    }
    if let Some(max) = schema.max_length {
        if length > max {
            return Err(fail(messages::max_length(max)));
        }
    }
    if let Some(pattern) = &schema.pattern {
        if !pattern.is_match(text) {
            return Err(fail(messages::pattern(pattern.as_str())));
        }
    }
    Ok(Value::String(text.to_string()))
}

fn check_bounds(
    num: f64,
    minimum: Option<f64>,
    maximum: Option<f64>,
    exclusive_minimum: bool,
    exclusive_maximum: bool,
) -> Result<(), ValidationError> {
    if let Some(min) = minimum {
        let ok = if exclusive_minimum {
            num > min
        } else {
            num >= min
        };
        if !ok {
            return Err(fail(messages::minimum(min, exclusive_minimum)));
        }
    }
    if let Some(max) = maximum {
        let ok = if exclusive_maximum {
            num < max
        } else {
            num <= max
        };
        if !ok {
            return Err(fail(messages::maximum(max, exclusive_maximum)));
        }
    }
    Ok(())
}

fn validate_number(schema: &NumberSchema, value: &Value) -> Result<Value, ValidationError> {
    let num = match value {
        Value::Number(n) => n.as_f64().ok_or_else(|| fail(messages::NOT_A_NUMBER))?,
        _ => return Err(fail(messages::NOT_A_NUMBER)),
    };
    check_bounds(
        num,
        schema.minimum,
        schema.maximum,
        schema.exclusive_minimum,
        schema.exclusive_maximum,
    )?;
    if let Some(step) = schema.multiple_of {
        // Checked as value x (1/step) being integral, not via %.
        if (num * (1.0 / step)).fract() != 0.0 {
            return Err(fail(messages::multiple_of(step)));
        }
    }
    Ok(value.clone())
}

fn validate_integer(schema: &IntegerSchema, value: &Value) -> Result<Value, ValidationError> {
    let int = match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                i
            } else {
                // A float with no fractional part still counts as an integer.
                let f = n.as_f64().ok_or_else(|| fail(messages::NOT_AN_INTEGER))?;
                if f.fract() != 0.0 {
                    return Err(fail(messages::NOT_AN_INTEGER));
                }
                f as i64
            }
        }
        _ => return Err(fail(messages::NOT_AN_INTEGER)),
    };
    check_bounds(
        int as f64,
        schema.minimum,
        schema.maximum,
        schema.exclusive_minimum,
        schema.exclusive_maximum,
    )?;
    if let Some(step) = schema.multiple_of {
        if step != 0 && int % step != 0 {
            return Err(fail(messages::multiple_of(step as f64)));
        }
    }
    Ok(Value::Number(int.into()))
}

fn validate_boolean(_schema: &BooleanSchema, value: &Value) -> Result<Value, ValidationError> {
    match value {
        Value::Bool(b) => Ok(Value::Bool(*b)),
        Value::String(s) => match s.to_lowercase().as_str() {
            "true" | "1" => Ok(Value::Bool(true)),
            "false" | "0" => Ok(Value::Bool(false)),
            _ => Err(fail(messages::NOT_A_BOOLEAN)),
        },
        _ => Err(fail(messages::NOT_A_BOOLEAN)),
    }
}

fn validate_enum(schema: &EnumSchema, value: &Value) -> Result<Value, ValidationError> {
    if schema.choices.iter().any(|choice| choice == value) {
        return Ok(value.clone());
    }
    if let [only] = schema.choices.as_slice() {
        return Err(fail(messages::exact_choice(only)));
    }
    Err(fail(messages::INVALID_CHOICE))
}

// ── Containers ────────────────────────────────────────────────────────────

fn validate_object(schema: &ObjectSchema, value: &Value) -> Result<Value, ValidationError> {
    let map = value
        .as_object()
        .ok_or_else(|| fail(messages::NOT_AN_OBJECT))?;

    let mut coerced = Map::new();
    let mut errors: IndexMap<String, ErrorDetail> = IndexMap::new();

    for (key, child) in map {
        if let Some(child_schema) = schema.properties.get(key) {
            match child_schema.validate(child) {
                Ok(out) => {
                    coerced.insert(key.clone(), out);
                }
                Err(err) => {
                    errors.insert(key.clone(), err.detail);
                }
            }
            continue;
        }
        if let Some((_, pattern_schema)) = schema
            .pattern_properties
            .iter()
            .find(|(pattern, _)| pattern.is_match(key))
        {
            match pattern_schema.validate(child) {
                Ok(out) => {
                    coerced.insert(key.clone(), out);
                }
                Err(err) => {
                    errors.insert(key.clone(), err.detail);
                }
            }
            continue;
        }
        match &schema.additional_properties {
            // Unset: unmatched keys are dropped silently.
            None => {}
            Some(Additional::Allowed(true)) => {
                coerced.insert(key.clone(), child.clone());
            }
            Some(Additional::Allowed(false)) => {
                errors.insert(
                    key.clone(),
                    ErrorDetail::message(messages::NO_ADDITIONAL_PROPERTIES),
                );
            }
            Some(Additional::Schema(extra_schema)) => match extra_schema.validate(child) {
                Ok(out) => {
                    coerced.insert(key.clone(), out);
                }
                Err(err) => {
                    errors.insert(key.clone(), err.detail);
                }
            },
        }
    }

    for key in &schema.required {
        if !map.contains_key(key) {
            errors.insert(key.clone(), ErrorDetail::message(messages::REQUIRED));
        }
    }

    if !errors.is_empty() {
        return Err(ValidationError::new(ErrorDetail::Map(errors)));
    }
    Ok(Value::Object(coerced))
}

fn validate_array(schema: &ArraySchema, value: &Value) -> Result<Value, ValidationError> {
    let items = value
        .as_array()
        .ok_or_else(|| fail(messages::NOT_AN_ARRAY))?;

    if let Some(min) = schema.min_items {
        if items.len() < min {
            return Err(fail(messages::min_items(min)));
        }
    }
    if let Some(max) = schema.max_items {
        if items.len() > max {
            return Err(fail(messages::max_items(max)));
        }
    }

    let mut coerced: Vec<Option<Value>> = Vec::with_capacity(items.len());
    let mut errors: IndexMap<String, ErrorDetail> = IndexMap::new();

    for (index, item) in items.iter().enumerate() {
        let outcome = match &schema.items {
            None => Ok(item.clone()),
            Some(Items::Single(item_schema)) => item_schema.validate(item),
            Some(Items::Tuple(positional)) => match positional.get(index) {
                Some(item_schema) => item_schema.validate(item),
                None => match &schema.additional_items {
                    None | Some(Additional::Allowed(true)) => Ok(item.clone()),
                    Some(Additional::Allowed(false)) => {
                        Err(fail(messages::NO_ADDITIONAL_ITEMS))
                    }
                    Some(Additional::Schema(extra_schema)) => extra_schema.validate(item),
                },
            },
        };
        match outcome {
            Ok(out) => coerced.push(Some(out)),
            Err(err) => {
                errors.insert(index.to_string(), err.detail);
                coerced.push(None);
            }
        }
    }

    if schema.unique_items {
        let mut seen: Vec<&Value> = Vec::new();
        for (index, item) in coerced.iter().enumerate() {
            let Some(item) = item else { continue };
            if seen.contains(&item) {
                errors.insert(index.to_string(), ErrorDetail::message(messages::NOT_UNIQUE));
            } else {
                seen.push(item);
            }
        }
    }

    if !errors.is_empty() {
        return Err(ValidationError::new(ErrorDetail::Map(errors)));
    }
    Ok(Value::Array(coerced.into_iter().flatten().collect()))
}

fn validate_union(schema: &UnionSchema, value: &Value) -> Result<Value, ValidationError> {
    for member in &schema.members {
        if let Ok(out) = member.validate(value) {
            return Ok(out);
        }
    }
    Err(fail(messages::NO_UNION_MATCH))
}
