// ============================================================
// Layer 6 — Model Store
// ============================================================
// Persists a ModelDocument as a JSON array of layer objects.
// Each object starts with a "type" discriminator, followed by
// that layer kind's fields and, once trained, its parameters:
//
//   [
//     {"type":"Convolution","input_width":28,...,"weights":[...],"biases":[...]},
//     {"type":"Pool","input_width":24,"input_height":24,"channels":6,"window":2},
//     {"type":"Dense","inputs":256,...,"weights":[...],"biases":[...],"scale":1.0}
//   ]
//
// Decoding reads the discriminator first and looks the decoder
// up in a fixed table. There is no fallback: an unknown or
// missing tag fails the whole document.
//
// Training hyperparameters are never written here; they come
// from the command line on every run.

use anyhow::{Context, Result};
use serde_json::{Map, Value};
use std::{fs, path::Path};

use crate::domain::layer::{
    ConvSpec, DenseSpec, LayerParams, LayerSpec, ModelDocument, NetworkConfig, PoolSpec, StoredLayer,
};

const TYPE_KEY: &str = "type";
const PARAM_KEYS: [&str; 3] = ["weights", "biases", "scale"];

#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("model document is malformed: {0}")]
    Malformed(String),

    #[error("layer {index} has no \"type\" field")]
    MissingDiscriminator { index: usize },

    #[error("layer {index} has unknown type '{tag}'")]
    UnknownLayerType { index: usize, tag: String },

    #[error("invalid layer fields: {0}")]
    Json(#[from] serde_json::Error),
}

// ─── Decoder table ────────────────────────────────────────────────────────────
type Decoder = fn(Value) -> Result<LayerSpec, serde_json::Error>;

const DECODERS: &[(&str, Decoder)] = &[
    ("Convolution", decode_convolution),
    ("Pool",        decode_pool),
    ("Dense",       decode_dense),
];

fn decode_convolution(fields: Value) -> Result<LayerSpec, serde_json::Error> {
    serde_json::from_value::<ConvSpec>(fields).map(LayerSpec::Convolution)
}

fn decode_pool(fields: Value) -> Result<LayerSpec, serde_json::Error> {
    serde_json::from_value::<PoolSpec>(fields).map(LayerSpec::Pool)
}

fn decode_dense(fields: Value) -> Result<LayerSpec, serde_json::Error> {
    serde_json::from_value::<DenseSpec>(fields).map(LayerSpec::Dense)
}

// ─── Encoding ─────────────────────────────────────────────────────────────────
fn spec_fields(spec: &LayerSpec) -> Result<Value, serde_json::Error> {
    match spec {
        LayerSpec::Convolution(c) => serde_json::to_value(c),
        LayerSpec::Pool(p)        => serde_json::to_value(p),
        LayerSpec::Dense(d)       => serde_json::to_value(d),
    }
}

fn layer_object(spec: &LayerSpec, params: Option<&LayerParams>) -> Result<Value, PersistError> {
    let mut object = Map::new();
    object.insert(TYPE_KEY.to_string(), Value::String(spec.kind().to_string()));

    if let Value::Object(fields) = spec_fields(spec)? {
        object.extend(fields);
    }
    if let Some(params) = params {
        if let Value::Object(fields) = serde_json::to_value(params)? {
            object.extend(fields);
        }
    }
    Ok(Value::Object(object))
}

/// Serialise a document, architecture and learned parameters.
pub fn encode(doc: &ModelDocument) -> Result<String, PersistError> {
    let layers = doc
        .layers
        .iter()
        .map(|l| layer_object(&l.spec, l.params.as_ref()))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(serde_json::to_string(&Value::Array(layers))?)
}

/// Serialise an architecture with no parameters.
pub fn encode_config(config: &NetworkConfig) -> Result<String, PersistError> {
    encode(&ModelDocument::untrained(config.clone()))
}

// ─── Decoding ─────────────────────────────────────────────────────────────────
fn decode_layer(index: usize, value: Value) -> Result<StoredLayer, PersistError> {
    let Value::Object(mut object) = value else {
        return Err(PersistError::Malformed(format!("layer {index} is not an object")));
    };

    let tag = match object.remove(TYPE_KEY) {
        Some(Value::String(tag)) => tag,
        Some(other) => {
            return Err(PersistError::Malformed(format!("layer {index} has a non-string type: {other}")))
        }
        None => return Err(PersistError::MissingDiscriminator { index }),
    };

    let mut params = Map::new();
    for key in PARAM_KEYS {
        if let Some(v) = object.remove(key) {
            params.insert(key.to_string(), v);
        }
    }

    let decoder = DECODERS
        .iter()
        .find(|(name, _)| *name == tag)
        .map(|(_, decoder)| *decoder)
        .ok_or_else(|| PersistError::UnknownLayerType { index, tag: tag.clone() })?;

    let spec = decoder(Value::Object(object))?;

    let params = if params.is_empty() {
        None
    } else if !params.contains_key("weights") {
        return Err(PersistError::Malformed(format!("layer {index} has biases or scale but no weights")));
    } else {
        Some(serde_json::from_value::<LayerParams>(Value::Object(params))?)
    };

    Ok(StoredLayer { spec, params })
}

/// Parse a document written by `encode` (or `encode_config`).
pub fn decode(json: &str) -> Result<ModelDocument, PersistError> {
    let Value::Array(items) = serde_json::from_str::<Value>(json)? else {
        return Err(PersistError::Malformed("expected a JSON array of layers".to_string()));
    };

    let layers = items
        .into_iter()
        .enumerate()
        .map(|(index, item)| decode_layer(index, item))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(ModelDocument { layers })
}

/// Parse only the architecture; stored parameters are dropped.
pub fn decode_config(json: &str) -> Result<NetworkConfig, PersistError> {
    decode(json).map(|doc| doc.config())
}

// ─── ModelStore ───────────────────────────────────────────────────────────────
/// File I/O around `encode` / `decode`.
pub struct ModelStore;

impl ModelStore {
    pub fn save(path: &Path, doc: &ModelDocument) -> Result<()> {
        let json = encode(doc)
            .with_context(|| format!("Cannot serialise model for '{}'", path.display()))?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Cannot create directory '{}'", parent.display()))?;
        }

        fs::write(path, json)
            .with_context(|| format!("Cannot write model to '{}'", path.display()))?;

        tracing::debug!("Saved {} layers to '{}'", doc.layers.len(), path.display());
        Ok(())
    }

    pub fn load(path: &Path) -> Result<ModelDocument> {
        let json = fs::read_to_string(path)
            .with_context(|| format!("Cannot read model from '{}'", path.display()))?;

        let doc = decode(&json)
            .with_context(|| format!("Cannot load model from '{}'", path.display()))?;

        tracing::debug!(
            "Loaded {} layers from '{}' (trained: {})",
            doc.layers.len(),
            path.display(),
            doc.is_trained(),
        );
        Ok(doc)
    }
}
