//! Service-wide OpenAPI document assembled from module fragments.

use serde_json::{json, Map, Value};

use folio_kernel::ModuleRegistry;

/// Merge every module's `openapi()` fragment into one document. Module
/// paths are re-rooted under `/api/{module_name}`; schemas merge into the
/// shared component section.
pub fn merged_spec(registry: &ModuleRegistry) -> Value {
    let mut paths = Map::new();
    paths.insert(
        "/healthz".to_string(),
        json!({
            "get": {
                "summary": "Health check",
                "responses": {
                    "200": {
                        "description": "OK",
                        "content": {"text/plain": {"schema": {"type": "string"}}}
                    }
                }
            }
        }),
    );

    let mut schemas = Map::new();
    schemas.insert("ErrorResponse".to_string(), error_response_schema());

    for module in registry.modules() {
        let Some(fragment) = module.openapi() else {
            continue;
        };
        if let Some(Value::Object(module_paths)) = fragment.get("paths") {
            for (path, item) in module_paths {
                let mounted = format!("/api/{}{}", module.name(), path);
                paths.insert(mounted, item.clone());
            }
        }
        if let Some(Value::Object(module_schemas)) = fragment.pointer("/components/schemas") {
            for (name, schema) in module_schemas {
                schemas.insert(name.clone(), schema.clone());
            }
        }
    }

    json!({
        "openapi": "3.0.0",
        "info": {
            "title": "Folio API",
            "version": "1.0.0",
            "description": "Catalog service for books, authors, genres, and reviews"
        },
        "paths": Value::Object(paths),
        "components": {"schemas": Value::Object(schemas)}
    })
}

fn error_response_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "error": {
                "type": "object",
                "properties": {
                    "code": {"type": "string"},
                    "message": {"type": "string"},
                    "details": {"type": "array", "items": {}},
                    "trace_id": {"type": "string"},
                    "timestamp": {"type": "string"}
                },
                "required": ["code", "message", "trace_id", "timestamp"]
            }
        },
        "required": ["error"]
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use folio_kernel::Module;

    use super::*;

    struct FragmentModule;

    #[async_trait::async_trait]
    impl Module for FragmentModule {
        fn name(&self) -> &'static str {
            "books"
        }

        fn openapi(&self) -> Option<Value> {
            Some(json!({
                "paths": {"/search": {"get": {"summary": "Search books"}}},
                "components": {"schemas": {"Book": {"type": "object"}}}
            }))
        }
    }

    #[test]
    fn module_paths_are_rerooted_under_api() {
        let mut registry = ModuleRegistry::new();
        registry.register(Arc::new(FragmentModule));

        let spec = merged_spec(&registry);
        assert!(spec.pointer("/paths/~1api~1books~1search").is_some());
        assert!(spec.pointer("/components/schemas/Book").is_some());
        assert!(spec.pointer("/paths/~1healthz").is_some());
    }
}
