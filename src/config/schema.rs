use serde_json::{json, Value};
use std::sync::LazyLock;

pub static CONFIG_SCHEMA: LazyLock<Value> = LazyLock::new(|| {
    json!({
        "$schema": "http://json-schema.org/draft-07/schema#",
        "type": "object",
        "additionalProperties": false,
        "properties": {
            "server": {
                "type": "object",
                "additionalProperties": false,
                "properties": {
                    "url": { "type": "string", "format": "uri" },
                    "token": { "type": "string" },
                    "insecure": { "type": "boolean" },
                    "timeout_secs": { "type": "integer", "minimum": 1 }
                }
            },
            "scope": {
                "type": "object",
                "additionalProperties": false,
                "properties": {
                    "project": { "type": "string" },
                    "project_group": { "type": "string" },
                    "version": { "type": "string" }
                }
            },
            "filters": {
                "type": "object",
                "additionalProperties": false,
                "properties": {
                    "phases": { "type": "array", "items": { "$ref": "#/$defs/phase" } },
                    "distributions": { "type": "array", "items": { "$ref": "#/$defs/distribution" } },
                    "since_days": { "type": "integer", "minimum": 0 }
                }
            },
            "cache": {
                "type": "object",
                "additionalProperties": false,
                "properties": {
                    "enabled": { "type": "boolean" },
                    "db_file": { "type": "string" },
                    "truncate": { "type": "boolean" }
                }
            },
            "output": {
                "type": "object",
                "additionalProperties": false,
                "properties": {
                    "directory": { "type": "string" },
                    "formats": {
                        "type": "array",
                        "items": { "type": "string", "enum": ["json", "csv", "html"] }
                    }
                }
            },
            "run": {
                "type": "object",
                "additionalProperties": false,
                "properties": {
                    "reconnect_every": { "type": "integer", "minimum": 1 }
                }
            }
        },
        "$defs": {
            "phase": {
                "type": "string",
                "enum": ["PLANNING", "DEVELOPMENT", "PRERELEASE", "RELEASED", "DEPRECATED", "ARCHIVED",
                         "planning", "development", "prerelease", "released", "deprecated", "archived"]
            },
            "distribution": {
                "type": "string",
                "enum": ["EXTERNAL", "SAAS", "INTERNAL", "OPENSOURCE",
                         "external", "saas", "internal", "opensource"]
            }
        }
    })
});
