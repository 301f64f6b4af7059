// ============================================================
// Layer 3 — Layer Specifications
// ============================================================
// A network is described declaratively as an ordered list of
// LayerSpec values. Each variant carries only its shape and
// hyperparameters; learned weights live in LayerParams and are
// owned by whoever holds the trained state.
//
// Contract: the output of layer i must have the same flattened
// length as the input of layer i + 1. Nothing checks this when a
// config is built; an incompatible stack fails the first time
// the engine runs a forward pass.

use serde::{Deserialize, Serialize};

/// Non-linearity applied after a convolution or dense layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Activation {
    Linear,
    Sigmoid,
    Tanh,
    #[serde(rename = "ReLU")]
    Relu,
    #[default]
    #[serde(rename = "LeakyReLU")]
    LeakyRelu,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConvSpec {
    pub input_width:     usize,
    pub input_height:    usize,
    pub input_channels:  usize,
    pub kernel_width:    usize,
    pub kernel_height:   usize,
    pub output_channels: usize,
    pub padding:         usize,
    pub activation:      Activation,
    pub use_bias:        bool,
    pub stride:          usize,
}

impl ConvSpec {
    pub fn output_width(&self) -> usize {
        (self.input_width + 2 * self.padding).saturating_sub(self.kernel_width) / self.stride.max(1) + 1
    }

    pub fn output_height(&self) -> usize {
        (self.input_height + 2 * self.padding).saturating_sub(self.kernel_height) / self.stride.max(1) + 1
    }
}

/// Max pooling over non-overlapping `window × window` tiles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoolSpec {
    pub input_width:  usize,
    pub input_height: usize,
    pub channels:     usize,
    pub window:       usize,
}

impl PoolSpec {
    pub fn output_width(&self) -> usize { self.input_width / self.window.max(1) }

    pub fn output_height(&self) -> usize { self.input_height / self.window.max(1) }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DenseSpec {
    pub inputs:          usize,
    pub outputs:         usize,
    pub activation:      Activation,
    pub use_bias:        bool,
    /// Multiply the layer output by a single trainable scalar.
    pub learnable_scale: bool,
}

/// One layer of the network, tagged by kind.
#[derive(Debug, Clone, PartialEq)]
pub enum LayerSpec {
    Convolution(ConvSpec),
    Pool(PoolSpec),
    Dense(DenseSpec),
}

impl LayerSpec {
    /// Discriminator written in front of the layer's fields when persisted.
    pub fn kind(&self) -> &'static str {
        match self {
            LayerSpec::Convolution(_) => "Convolution",
            LayerSpec::Pool(_)        => "Pool",
            LayerSpec::Dense(_)       => "Dense",
        }
    }

    /// Flattened number of values this layer expects per sample.
    pub fn input_len(&self) -> usize {
        match self {
            LayerSpec::Convolution(c) => c.input_width * c.input_height * c.input_channels,
            LayerSpec::Pool(p)        => p.input_width * p.input_height * p.channels,
            LayerSpec::Dense(d)       => d.inputs,
        }
    }

    /// Flattened number of values this layer produces per sample.
    pub fn output_len(&self) -> usize {
        match self {
            LayerSpec::Convolution(c) => c.output_width() * c.output_height() * c.output_channels,
            LayerSpec::Pool(p)        => p.output_width() * p.output_height() * p.channels,
            LayerSpec::Dense(d)       => d.outputs,
        }
    }
}

/// Ordered forward-pass stack of layers.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NetworkConfig {
    pub layers: Vec<LayerSpec>,
}

impl NetworkConfig {
    pub fn new(layers: Vec<LayerSpec>) -> Self {
        Self { layers }
    }

    pub fn len(&self) -> usize { self.layers.len() }

    pub fn is_empty(&self) -> bool { self.layers.is_empty() }

    pub fn input_len(&self) -> Option<usize> {
        self.layers.first().map(LayerSpec::input_len)
    }

    pub fn output_len(&self) -> Option<usize> {
        self.layers.last().map(LayerSpec::output_len)
    }

    /// Index of the first layer whose input does not match the previous
    /// layer's output.
    #[cfg(test)]
    pub fn first_shape_break(&self) -> Option<usize> {
        self.layers
            .windows(2)
            .position(|w| w[0].output_len() != w[1].input_len())
            .map(|i| i + 1)
    }
}

/// Learned parameters of one layer, flattened in the engine's layout.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LayerParams {
    pub weights: Vec<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub biases:  Option<Vec<f32>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale:   Option<f32>,
}

/// A layer as stored on disk: its spec and, once trained, its parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredLayer {
    pub spec:   LayerSpec,
    pub params: Option<LayerParams>,
}

/// Everything persisted for a model: architecture plus learned state.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ModelDocument {
    pub layers: Vec<StoredLayer>,
}

impl ModelDocument {
    /// A document for an architecture that has never been trained.
    pub fn untrained(config: NetworkConfig) -> Self {
        Self {
            layers: config
                .layers
                .into_iter()
                .map(|spec| StoredLayer { spec, params: None })
                .collect(),
        }
    }

    pub fn config(&self) -> NetworkConfig {
        NetworkConfig::new(self.layers.iter().map(|l| l.spec.clone()).collect())
    }

    pub fn is_trained(&self) -> bool {
        self.layers.iter().any(|l| l.params.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conv() -> ConvSpec {
        ConvSpec {
            input_width: 28, input_height: 28, input_channels: 1,
            kernel_width: 5, kernel_height: 5, output_channels: 6,
            padding: 0, activation: Activation::LeakyRelu, use_bias: true, stride: 1,
        }
    }

    #[test]
    fn test_conv_output_shape() {
        let c = conv();
        assert_eq!(c.output_width(), 24);
        assert_eq!(c.output_height(), 24);
        assert_eq!(LayerSpec::Convolution(c).output_len(), 24 * 24 * 6);
    }

    #[test]
    fn test_padded_strided_conv_output_shape() {
        let c = ConvSpec { padding: 2, stride: 2, ..conv() };
        // (28 + 4 - 5) / 2 + 1
        assert_eq!(c.output_width(), 14);
    }

    #[test]
    fn test_pool_output_shape() {
        let p = PoolSpec { input_width: 24, input_height: 24, channels: 6, window: 2 };
        assert_eq!(LayerSpec::Pool(p).output_len(), 12 * 12 * 6);
    }

    #[test]
    fn test_first_shape_break() {
        let ok = NetworkConfig::new(vec![
            LayerSpec::Convolution(conv()),
            LayerSpec::Pool(PoolSpec { input_width: 24, input_height: 24, channels: 6, window: 2 }),
        ]);
        assert_eq!(ok.first_shape_break(), None);

        let broken = NetworkConfig::new(vec![
            LayerSpec::Convolution(conv()),
            LayerSpec::Dense(DenseSpec {
                inputs: 10, outputs: 10, activation: Activation::Linear,
                use_bias: true, learnable_scale: false,
            }),
        ]);
        assert_eq!(broken.first_shape_break(), Some(1));
    }

    #[test]
    fn test_untrained_document_keeps_order() {
        let cfg = NetworkConfig::new(vec![
            LayerSpec::Convolution(conv()),
            LayerSpec::Pool(PoolSpec { input_width: 24, input_height: 24, channels: 6, window: 2 }),
        ]);
        let doc = ModelDocument::untrained(cfg.clone());
        assert!(!doc.is_trained());
        assert_eq!(doc.config(), cfg);
    }
}
