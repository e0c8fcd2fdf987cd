//! OpenAPI / Swagger reader (decode only).
//!
//! Each path + HTTP method operation becomes a [`Link`]; parameters become
//! [`Field`]s, with a single body parameter expanded into one field per
//! declared property. Links group under the operation's first tag.

use indexmap::IndexMap;
use serde_json::{Map, Value};
use tracing::trace;
use url::Url;

use hyperdoc_document::{Document, Field, FieldLocation, Link, Node, Object};

use crate::codec::{Codec, CodecError, Decoded, EncodeOptions};
use crate::jsonschema;
use crate::urlutil::resolve;

pub const MEDIA_TYPES: &[&str] = &[
    "application/vnd.oai.openapi+json",
    "application/openapi+json",
];

const METHODS: [&str; 7] = ["get", "put", "post", "delete", "options", "head", "patch"];

#[derive(Debug, Default)]
pub struct OpenApiCodec;

impl OpenApiCodec {
    pub fn new() -> Self {
        Self
    }
}

impl Codec for OpenApiCodec {
    fn media_types(&self) -> &'static [&'static str] {
        MEDIA_TYPES
    }

    fn can_decode(&self) -> bool {
        true
    }

    fn decode(&self, bytes: &[u8], base_url: Option<&str>) -> Result<Decoded, CodecError> {
        let value: Value = serde_json::from_slice(bytes)?;
        let Some(map) = value.as_object() else {
            return Err(CodecError::Parse(
                "OpenAPI payload must be a JSON object".to_string(),
            ));
        };
        let base = determine_base_url(map, base_url);
        trace!(base, "decoding OpenAPI payload");

        let title = map
            .get("info")
            .and_then(Value::as_object)
            .and_then(|info| info.get("title"))
            .and_then(Value::as_str)
            .unwrap_or("")
            .to_string();

        // Tag-grouped links nest one level deep; untagged links sit flat.
        let mut grouped: IndexMap<String, IndexMap<String, Node>> = IndexMap::new();
        let mut flat: IndexMap<String, Node> = IndexMap::new();

        if let Some(paths) = map.get("paths").and_then(Value::as_object) {
            for (path, path_item) in paths {
                let Some(path_item) = path_item.as_object() else {
                    continue;
                };
                let shared_params = path_item
                    .get("parameters")
                    .and_then(Value::as_array)
                    .cloned()
                    .unwrap_or_default();
                for method in METHODS {
                    let Some(operation) = path_item.get(method).and_then(Value::as_object)
                    else {
                        continue;
                    };
                    let link = decode_operation(&base, path, method, operation, &shared_params)?;
                    let key = operation_key(path, method, operation);
                    match first_tag(operation) {
                        Some(tag) => {
                            grouped
                                .entry(tag)
                                .or_default()
                                .insert(key, Node::Link(link));
                        }
                        None => {
                            flat.insert(key, Node::Link(link));
                        }
                    }
                }
            }
        }

        let mut content: IndexMap<String, Node> = IndexMap::new();
        for (tag, links) in grouped {
            content.insert(tag, Node::Object(Object::new(links)));
        }
        for (key, link) in flat {
            content.insert(key, link);
        }

        Ok(Decoded::Document(Document::new(base, title, content)))
    }

    fn encode(&self, _node: &Node, _options: &EncodeOptions) -> Result<Vec<u8>, CodecError> {
        Err(CodecError::EncodeUnsupported(self.name()))
    }
}

/// Base URL precedence: `servers[0]` (v3) or `host`/`basePath`/`schemes`
/// (v2) in the document, then the scheme/host of the supplied base URL. With
/// no usable host the base is just the normalized `basePath`.
fn determine_base_url(map: &Map<String, Value>, supplied: Option<&str>) -> String {
    if let Some(server) = map
        .get("servers")
        .and_then(Value::as_array)
        .and_then(|servers| servers.first())
        .and_then(Value::as_object)
        .and_then(|server| server.get("url"))
        .and_then(Value::as_str)
    {
        return resolve(supplied.unwrap_or(""), server);
    }

    let supplied_url = supplied.and_then(|value| Url::parse(value).ok());
    let base_path = map
        .get("basePath")
        .and_then(Value::as_str)
        .unwrap_or("/");
    let base_path = if base_path.starts_with('/') {
        base_path.to_string()
    } else {
        format!("/{base_path}")
    };

    let host = map
        .get("host")
        .and_then(Value::as_str)
        .map(str::to_string)
        .or_else(|| {
            supplied_url.as_ref().and_then(|url| {
                url.host_str().map(|host| match url.port() {
                    Some(port) => format!("{host}:{port}"),
                    None => host.to_string(),
                })
            })
        });
    let Some(host) = host else {
        return base_path;
    };

    let schemes: Vec<String> = map
        .get("schemes")
        .and_then(Value::as_array)
        .map(|schemes| {
            schemes
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();
    let scheme = choose_scheme(&schemes, supplied_url.as_ref().map(|url| url.scheme()));

    format!("{scheme}://{host}{base_path}")
}

/// Deterministic scheme selection: a single declared scheme wins; among
/// several, `http` then `https` are preferred, then the lexicographically
/// smallest; with none declared the supplied base's scheme is used.
fn choose_scheme(declared: &[String], fallback: Option<&str>) -> String {
    match declared {
        [] => fallback.unwrap_or("http").to_string(),
        [only] => only.clone(),
        many => {
            for preferred in ["http", "https"] {
                if many.iter().any(|scheme| scheme == preferred) {
                    return preferred.to_string();
                }
            }
            let mut sorted = many.to_vec();
            sorted.sort();
            sorted[0].clone()
        }
    }
}

fn first_tag(operation: &Map<String, Value>) -> Option<String> {
    operation
        .get("tags")
        .and_then(Value::as_array)
        .and_then(|tags| tags.first())
        .and_then(Value::as_str)
        .map(str::to_string)
}

fn operation_key(path: &str, method: &str, operation: &Map<String, Value>) -> String {
    if let Some(id) = operation.get("operationId").and_then(Value::as_str) {
        return id.to_string();
    }
    let slug = path
        .trim_matches('/')
        .replace(['{', '}'], "")
        .replace('/', "_");
    format!("{method}_{slug}")
}

fn decode_operation(
    base: &str,
    path: &str,
    method: &str,
    operation: &Map<String, Value>,
    shared_params: &[Value],
) -> Result<Link, CodecError> {
    let url = format!("{}{}", base.trim_end_matches('/'), path);
    let mut link = Link::new(url).with_action(method);
    if let Some(description) = operation.get("description").and_then(Value::as_str) {
        link = link.with_description(description);
    }

    // Path-level parameters apply to every operation; operation-level
    // declarations with the same (name, in) take precedence.
    let mut params: Vec<&Value> = shared_params.iter().collect();
    if let Some(own) = operation.get("parameters").and_then(Value::as_array) {
        for param in own {
            let ident = param_identity(param);
            params.retain(|existing| param_identity(existing) != ident);
            params.push(param);
        }
    }

    let mut fields = Vec::new();
    for param in params {
        let Some(param) = param.as_object() else {
            continue;
        };
        let location = param.get("in").and_then(Value::as_str).unwrap_or("");
        if location == "body" {
            fields.extend(expand_body_param(param)?);
            continue;
        }
        fields.push(decode_param(param, location)?);
    }
    Ok(link.with_fields(fields))
}

fn param_identity(param: &Value) -> (String, String) {
    let name = param
        .get("name")
        .and_then(Value::as_str)
        .unwrap_or("")
        .to_string();
    let location = param
        .get("in")
        .and_then(Value::as_str)
        .unwrap_or("")
        .to_string();
    (name, location)
}

fn decode_param(param: &Map<String, Value>, location: &str) -> Result<Field, CodecError> {
    let name = param.get("name").and_then(Value::as_str).unwrap_or("");
    let required = param
        .get("required")
        .and_then(Value::as_bool)
        .unwrap_or(location == "path");
    let mut field = Field::new(name).required(required);
    if let Some(location) = FieldLocation::parse(location) {
        field = field.location(location);
    }
    if let Some(description) = param.get("description").and_then(Value::as_str) {
        field = field.description(description);
    }
    // Swagger puts schema keywords (type, format, enum, ...) directly on the
    // parameter object; v3 nests them under "schema".
    if let Some(schema) = param.get("schema").filter(|value| value.is_object()) {
        field = field.schema(jsonschema::decode_schema(schema)?);
    } else if param.contains_key("type") || param.contains_key("enum") {
        field = field.schema(jsonschema::decode_schema(&Value::Object(param.clone()))?);
    }
    Ok(field)
}

/// A body parameter with an object schema expands into one form field per
/// declared property, replacing the single parameter.
fn expand_body_param(param: &Map<String, Value>) -> Result<Vec<Field>, CodecError> {
    let Some(schema) = param.get("schema").and_then(Value::as_object) else {
        let name = param.get("name").and_then(Value::as_str).unwrap_or("body");
        return Ok(vec![Field::new(name).location(FieldLocation::Body)]);
    };
    let Some(properties) = schema.get("properties").and_then(Value::as_object) else {
        let name = param.get("name").and_then(Value::as_str).unwrap_or("body");
        let mut field = Field::new(name).location(FieldLocation::Body);
        field = field.schema(jsonschema::decode_schema(&Value::Object(schema.clone()))?);
        return Ok(vec![field]);
    };

    let required: Vec<&str> = schema
        .get("required")
        .and_then(Value::as_array)
        .map(|names| names.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default();

    let mut fields = Vec::with_capacity(properties.len());
    for (name, property) in properties {
        let mut field = Field::new(name)
            .required(required.contains(&name.as_str()))
            .location(FieldLocation::Form);
        if let Some(description) = property.get("description").and_then(Value::as_str) {
            field = field.description(description);
        }
        field = field.schema(jsonschema::decode_schema(property)?);
        fields.push(field);
    }
    Ok(fields)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn decode(value: Value, base: Option<&str>) -> Document {
        let codec = OpenApiCodec::new();
        let bytes = serde_json::to_vec(&value).unwrap();
        codec
            .decode(&bytes, base)
            .unwrap()
            .as_document()
            .unwrap()
            .clone()
    }

    #[test]
    fn path_parameter_is_required_path_field() {
        let doc = decode(
            json!({
                "info": {"title": "Pet Store"},
                "host": "petstore.example.com",
                "basePath": "/api",
                "schemes": ["http"],
                "paths": {
                    "/pets/{petId}": {
                        "get": {
                            "operationId": "getPet",
                            "parameters": [
                                {"name": "petId", "in": "path", "required": true, "type": "string"}
                            ]
                        }
                    }
                }
            }),
            None,
        );
        assert_eq!(doc.title(), "Pet Store");
        assert_eq!(doc.url(), "http://petstore.example.com/api");
        let link = doc.get("getPet").unwrap().as_link().unwrap();
        assert_eq!(link.url(), "http://petstore.example.com/api/pets/{petId}");
        assert_eq!(link.action(), "get");
        let field = &link.fields()[0];
        assert_eq!(field.name, "petId");
        assert!(field.required);
        assert_eq!(field.location, Some(FieldLocation::Path));
    }

    #[test]
    fn body_parameter_expands_into_properties() {
        let doc = decode(
            json!({
                "host": "api.example.com",
                "paths": {
                    "/pets": {
                        "post": {
                            "operationId": "createPet",
                            "parameters": [{
                                "name": "pet",
                                "in": "body",
                                "schema": {
                                    "type": "object",
                                    "properties": {
                                        "name": {"type": "string"},
                                        "age": {"type": "integer"}
                                    },
                                    "required": ["name"]
                                }
                            }]
                        }
                    }
                }
            }),
            None,
        );
        let link = doc.get("createPet").unwrap().as_link().unwrap();
        let names: Vec<&str> = link.fields().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["name", "age"]);
        assert!(link.fields()[0].required);
        assert!(!link.fields()[1].required);
        assert_eq!(link.fields()[0].location, Some(FieldLocation::Form));
    }

    #[test]
    fn tags_group_operations() {
        let doc = decode(
            json!({
                "host": "api.example.com",
                "paths": {
                    "/pets": {
                        "get": {"operationId": "listPets", "tags": ["pets"]},
                        "post": {"operationId": "createPet", "tags": ["pets"]}
                    },
                    "/status": {
                        "get": {"operationId": "status"}
                    }
                }
            }),
            None,
        );
        let pets = doc.get("pets").unwrap().as_object().unwrap();
        assert!(pets.get("listPets").is_some());
        assert!(pets.get("createPet").is_some());
        assert!(doc.get("status").unwrap().as_link().is_some());
    }

    #[test]
    fn scheme_preference_order() {
        let doc = decode(
            json!({
                "host": "api.example.com",
                "schemes": ["https", "http"],
                "paths": {}
            }),
            None,
        );
        assert_eq!(doc.url(), "http://api.example.com/");
        let doc = decode(
            json!({
                "host": "api.example.com",
                "schemes": ["wss", "ftp"],
                "paths": {}
            }),
            None,
        );
        assert_eq!(doc.url(), "ftp://api.example.com/");
    }

    #[test]
    fn host_falls_back_to_supplied_base() {
        let doc = decode(
            json!({"basePath": "/v2", "paths": {}}),
            Some("https://supplied.example.com/spec.json"),
        );
        assert_eq!(doc.url(), "https://supplied.example.com/v2");
    }

    #[test]
    fn no_host_yields_base_path_only() {
        let doc = decode(json!({"basePath": "/v2", "paths": {}}), None);
        assert_eq!(doc.url(), "/v2");
    }

    #[test]
    fn servers_entry_wins() {
        let doc = decode(
            json!({
                "servers": [{"url": "https://v3.example.com/api"}],
                "host": "ignored.example.com",
                "paths": {}
            }),
            None,
        );
        assert_eq!(doc.url(), "https://v3.example.com/api");
    }

    #[test]
    fn path_level_parameters_merge() {
        let doc = decode(
            json!({
                "host": "api.example.com",
                "paths": {
                    "/pets/{petId}": {
                        "parameters": [
                            {"name": "petId", "in": "path", "type": "string"}
                        ],
                        "get": {"operationId": "getPet"},
                        "delete": {
                            "operationId": "deletePet",
                            "parameters": [
                                {"name": "petId", "in": "path", "type": "integer", "required": true}
                            ]
                        }
                    }
                }
            }),
            None,
        );
        let get = doc.get("getPet").unwrap().as_link().unwrap();
        // Path parameters default to required.
        assert!(get.fields()[0].required);
        let delete = doc.get("deletePet").unwrap().as_link().unwrap();
        assert_eq!(delete.fields().len(), 1);
    }
}
