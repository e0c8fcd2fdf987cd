//! Whole-pipeline checks: negotiate, decode, validate, transition, splice,
//! encode.

use hyperdoc::{
    activate, default_registry, path, Ancestor, Codec, Decoded, Document, EncodeOptions,
    ErrorDetail, FieldLocation, IndexMap, Link, Node, Params, Transform, Transport,
    TransportError, get_path,
};
use indexmap::indexmap;
use serde_json::json;

#[test]
fn openapi_description_drives_validated_transition() {
    let registry = default_registry();
    let spec = serde_json::to_vec(&json!({
        "info": {"title": "Pet Store"},
        "host": "petstore.example.com",
        "schemes": ["http"],
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
                                "name": {"type": "string", "minLength": 1},
                                "age": {"type": "integer", "minimum": 0.0}
                            },
                            "required": ["name"]
                        }
                    }]
                }
            }
        }
    }))
    .unwrap();

    let codec = registry
        .negotiate_decoder(Some("application/openapi+json"))
        .unwrap();
    let doc = codec
        .decode(&spec, None)
        .unwrap()
        .as_document()
        .unwrap()
        .clone();

    let link = doc.get("createPet").unwrap().as_link().unwrap();
    assert_eq!(link.action(), "post");

    // Validate candidate parameters against the link's field schemas,
    // collecting every failure.
    let params = json!({"name": "", "age": -2});
    let mut failures = IndexMap::new();
    for field in link.fields() {
        let Some(schema) = &field.schema else { continue };
        if let Some(value) = params.get(&field.name) {
            if let Err(err) = schema.validate(value) {
                failures.insert(field.name.clone(), err.detail);
            }
        }
    }
    assert_eq!(failures.len(), 2);
    assert!(matches!(failures["name"], ErrorDetail::Message(_)));
    assert!(matches!(failures["age"], ErrorDetail::Message(_)));
}

struct CannedTransport {
    response: Document,
}

impl Transport for CannedTransport {
    fn transition(
        &self,
        _link: &Link,
        _params: &Params,
        _ancestors: &[Ancestor],
    ) -> Result<Decoded, TransportError> {
        Ok(Decoded::Document(self.response.clone()))
    }
}

#[test]
fn transition_result_splices_and_reencodes() {
    let registry = default_registry();
    let codec = registry.negotiate_decoder(None).unwrap();

    let payload = serde_json::to_vec(&json!({
        "_type": "document",
        "_meta": {"url": "http://example.com/api/", "title": "Pets"},
        "pets": [
            {"name": "rex", "status": "available"}
        ],
        "refresh": {"_type": "link", "url": "pets/", "transform": "inline"}
    }))
    .unwrap();
    let root = codec.decode(&payload, None).unwrap().into_node();
    let doc = root.as_document().unwrap().clone();

    let link = doc.get("refresh").unwrap().as_link().unwrap().clone();
    assert_eq!(link.url(), "http://example.com/api/pets/");
    assert_eq!(link.transform(), Some(Transform::Inline));

    let fresh = Document::new(
        "http://example.com/api/pets/",
        "",
        indexmap! {"count".to_string() => Node::from(2)},
    );
    let transport = CannedTransport { response: fresh };
    let ancestors = vec![Ancestor::new(doc.clone(), path!["pets"])];
    let updated = activate(&transport, &link, &Params::new(), &ancestors).unwrap();

    // The transition result replaced the `pets` subtree in place.
    let spliced = get_path(&updated, &path!["pets", "count"]).unwrap();
    assert_eq!(spliced, &Node::from(2));
    // Siblings survived untouched.
    assert!(get_path(&updated, &path!["refresh"]).unwrap().as_link().is_some());

    // The updated tree still encodes through the negotiated encoder.
    let encoder = registry
        .negotiate_encoder(Some("application/vnd.hyperdoc+json"))
        .unwrap();
    let bytes = encoder.encode(&updated, &EncodeOptions::default()).unwrap();
    let round = codec.decode(&bytes, None).unwrap().into_node();
    assert_eq!(round, updated);
}

#[test]
fn hal_and_native_describe_the_same_resource() {
    let registry = default_registry();

    let hal = serde_json::to_vec(&json!({
        "_links": {
            "self": {"href": "http://example.com/orders", "title": "Orders"},
            "next": {"href": "/orders?page=2"}
        },
        "total": 2
    }))
    .unwrap();
    let hal_doc = registry
        .negotiate_decoder(Some("application/hal+json"))
        .unwrap()
        .decode(&hal, None)
        .unwrap()
        .as_document()
        .unwrap()
        .clone();

    let native = serde_json::to_vec(&json!({
        "_type": "document",
        "_meta": {"url": "http://example.com/orders", "title": "Orders"},
        "next": {"_type": "link", "url": "/orders?page=2"},
        "total": 2
    }))
    .unwrap();
    let native_doc = registry
        .negotiate_decoder(Some("application/vnd.hyperdoc+json"))
        .unwrap()
        .decode(&native, None)
        .unwrap()
        .as_document()
        .unwrap()
        .clone();

    assert_eq!(hal_doc.url(), native_doc.url());
    assert_eq!(hal_doc.title(), native_doc.title());
    assert_eq!(
        hal_doc.get("next").unwrap().as_link().unwrap().url(),
        native_doc.get("next").unwrap().as_link().unwrap().url(),
    );
    assert_eq!(hal_doc.get("total"), native_doc.get("total"));
}

#[test]
fn field_locations_follow_the_verb_when_unset() {
    let registry = default_registry();
    let schema = serde_json::to_vec(&json!({
        "title": "Notes",
        "links": [{
            "rel": "create",
            "href": "/notes",
            "method": "POST",
            "schema": {
                "type": "object",
                "properties": {"text": {"type": "string"}},
                "required": ["text"]
            }
        }]
    }))
    .unwrap();
    let doc = registry
        .negotiate_decoder(Some("application/schema+json"))
        .unwrap()
        .decode(&schema, Some("http://api.example.com/"))
        .unwrap()
        .as_document()
        .unwrap()
        .clone();
    let link = doc.get("create").unwrap().as_link().unwrap();
    let field = &link.fields()[0];
    assert_eq!(field.location, None);
    assert_eq!(field.location_for_action(link.action()), FieldLocation::Form);
}
