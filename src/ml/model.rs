use burn::{
    module::{AutodiffModule, Param},
    nn::{
        conv::{Conv2d, Conv2dConfig},
        pool::MaxPool2dConfig,
        Linear, LinearConfig, PaddingConfig2d,
    },
    prelude::*,
    tensor::{activation, backend::AutodiffBackend},
};

use crate::domain::{
    layer::{Activation, ConvSpec, DenseSpec, LayerParams, LayerSpec, ModelDocument, NetworkConfig, StoredLayer},
    tensor::Matrix,
    traits::Classifier,
};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("layer {layer} ({kind}) expects {expected} inputs per sample but received {actual}")]
    ShapeMismatch {
        layer:    usize,
        kind:     &'static str,
        expected: usize,
        actual:   usize,
    },

    #[error("layer {layer}: stored {what} hold {actual} values, the layer needs {expected}")]
    ParamLength {
        layer:    usize,
        what:     &'static str,
        expected: usize,
        actual:   usize,
    },

    #[error("layer {layer} uses {what} but the stored parameters have none")]
    MissingParam { layer: usize, what: &'static str },

    #[error("layer {layer} ({kind}) has no trainable module")]
    MissingModule { layer: usize, kind: &'static str },

    #[error("network has {modules} layer modules for {specs} layer specs")]
    LayerCount { modules: usize, specs: usize },

    #[error("cannot read tensor values back: {0}")]
    TensorData(String),
}

/// Trainable state of one layer. Pool layers carry nothing.
#[derive(Module, Debug)]
pub struct LayerModule<B: Backend> {
    pub conv:  Option<Conv2d<B>>,
    pub dense: Option<Linear<B>>,
    pub scale: Option<Param<Tensor<B, 1>>>,
}

#[derive(Module, Debug)]
pub struct NetworkModule<B: Backend> {
    pub layers: Vec<LayerModule<B>>,
}

impl<B: Backend> NetworkModule<B> {
    /// Build one module per stored layer, loading parameters where present.
    pub fn from_document(doc: &ModelDocument, device: &B::Device) -> Result<Self, EngineError> {
        let layers = doc
            .layers
            .iter()
            .enumerate()
            .map(|(index, layer)| init_layer(index, layer, device))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { layers })
    }

    /// Run `x` (`[batch, features]`) through every layer in order.
    ///
    /// Activations travel as `[batch, features]`; convolution and pooling
    /// reshape to `[batch, channels, height, width]` and flatten back.
    pub fn forward(
        &self,
        config:      &NetworkConfig,
        x:           Tensor<B, 2>,
        leaky_slope: f64,
    ) -> Result<Tensor<B, 2>, EngineError> {
        if self.layers.len() != config.len() {
            return Err(EngineError::LayerCount { modules: self.layers.len(), specs: config.len() });
        }

        let mut x = x;
        for (index, (module, spec)) in self.layers.iter().zip(&config.layers).enumerate() {
            let [batch, width] = x.dims();
            if width != spec.input_len() {
                return Err(EngineError::ShapeMismatch {
                    layer:    index,
                    kind:     spec.kind(),
                    expected: spec.input_len(),
                    actual:   width,
                });
            }

            x = match spec {
                LayerSpec::Convolution(c) => {
                    let conv = module.conv.as_ref().ok_or(EngineError::MissingModule { layer: index, kind: spec.kind() })?;
                    let y = conv.forward(x.reshape([batch, c.input_channels, c.input_height, c.input_width]));
                    activate(y.flatten::<2>(1, 3), c.activation, leaky_slope)
                }
                LayerSpec::Pool(p) => {
                    let pool = MaxPool2dConfig::new([p.window, p.window])
                        .with_strides([p.window, p.window])
                        .init();
                    pool.forward(x.reshape([batch, p.channels, p.input_height, p.input_width]))
                        .flatten::<2>(1, 3)
                }
                LayerSpec::Dense(d) => {
                    let dense = module.dense.as_ref().ok_or(EngineError::MissingModule { layer: index, kind: spec.kind() })?;
                    let mut y = dense.forward(x);
                    if let Some(scale) = &module.scale {
                        y = y * scale.val().unsqueeze::<2>();
                    }
                    activate(y, d.activation, leaky_slope)
                }
            };
        }

        Ok(x)
    }

    /// Current parameters of every layer, aligned with `config`.
    pub fn export(&self, config: &NetworkConfig) -> Result<ModelDocument, EngineError> {
        let layers = self
            .layers
            .iter()
            .zip(&config.layers)
            .map(|(module, spec)| {
                Ok(StoredLayer { spec: spec.clone(), params: export_layer(module)? })
            })
            .collect::<Result<Vec<_>, EngineError>>()?;
        Ok(ModelDocument { layers })
    }
}

fn activate<B: Backend>(x: Tensor<B, 2>, kind: Activation, leaky_slope: f64) -> Tensor<B, 2> {
    match kind {
        Activation::Linear    => x,
        Activation::Sigmoid   => activation::sigmoid(x),
        Activation::Tanh      => activation::tanh(x),
        Activation::Relu      => activation::relu(x),
        Activation::LeakyRelu => activation::leaky_relu(x, leaky_slope),
    }
}

fn init_layer<B: Backend>(index: usize, layer: &StoredLayer, device: &B::Device) -> Result<LayerModule<B>, EngineError> {
    let params = layer.params.as_ref();
    match &layer.spec {
        LayerSpec::Convolution(c) => Ok(LayerModule {
            conv:  Some(init_conv(index, c, params, device)?),
            dense: None,
            scale: None,
        }),
        LayerSpec::Pool(_) => Ok(LayerModule { conv: None, dense: None, scale: None }),
        LayerSpec::Dense(d) => {
            let dense = init_dense(index, d, params, device)?;
            let scale = d.learnable_scale.then(|| {
                let value = params.and_then(|p| p.scale).unwrap_or(1.0);
                Param::from_tensor(Tensor::from_data(TensorData::new(vec![value], [1]), device))
            });
            Ok(LayerModule { conv: None, dense: Some(dense), scale })
        }
    }
}

fn init_conv<B: Backend>(
    index:  usize,
    spec:   &ConvSpec,
    params: Option<&LayerParams>,
    device: &B::Device,
) -> Result<Conv2d<B>, EngineError> {
    let mut conv = Conv2dConfig::new(
        [spec.input_channels, spec.output_channels],
        [spec.kernel_height, spec.kernel_width],
    )
    .with_stride([spec.stride, spec.stride])
    .with_padding(PaddingConfig2d::Explicit(spec.padding, spec.padding))
    .with_bias(spec.use_bias)
    .init(device);

    if let Some(p) = params {
        let shape = [spec.output_channels, spec.input_channels, spec.kernel_height, spec.kernel_width];
        conv.weight = Param::from_tensor(tensor_from(index, "weights", &p.weights, shape, device)?);
        if spec.use_bias {
            conv.bias = Some(Param::from_tensor(bias_from(index, p, spec.output_channels, device)?));
        }
    }
    Ok(conv)
}

fn init_dense<B: Backend>(
    index:  usize,
    spec:   &DenseSpec,
    params: Option<&LayerParams>,
    device: &B::Device,
) -> Result<Linear<B>, EngineError> {
    let mut dense = LinearConfig::new(spec.inputs, spec.outputs)
        .with_bias(spec.use_bias)
        .init(device);

    if let Some(p) = params {
        dense.weight = Param::from_tensor(tensor_from(index, "weights", &p.weights, [spec.inputs, spec.outputs], device)?);
        if spec.use_bias {
            dense.bias = Some(Param::from_tensor(bias_from(index, p, spec.outputs, device)?));
        }
    }
    Ok(dense)
}

fn bias_from<B: Backend>(index: usize, p: &LayerParams, len: usize, device: &B::Device) -> Result<Tensor<B, 1>, EngineError> {
    let biases = p.biases.as_ref().ok_or(EngineError::MissingParam { layer: index, what: "biases" })?;
    tensor_from(index, "biases", biases, [len], device)
}

fn tensor_from<B: Backend, const D: usize>(
    index:  usize,
    what:   &'static str,
    values: &[f32],
    shape:  [usize; D],
    device: &B::Device,
) -> Result<Tensor<B, D>, EngineError> {
    let expected: usize = shape.iter().product();
    if values.len() != expected {
        return Err(EngineError::ParamLength { layer: index, what, expected, actual: values.len() });
    }
    Ok(Tensor::from_data(TensorData::new(values.to_vec(), shape), device))
}

fn export_layer<B: Backend>(module: &LayerModule<B>) -> Result<Option<LayerParams>, EngineError> {
    let (weights, bias) = match (&module.conv, &module.dense) {
        (Some(conv), _)     => (conv.weight.val().into_data(), conv.bias.as_ref().map(|b| b.val().into_data())),
        (None, Some(dense)) => (dense.weight.val().into_data(), dense.bias.as_ref().map(|b| b.val().into_data())),
        (None, None)        => return Ok(None),
    };

    let scale = match &module.scale {
        Some(s) => read_values(s.val().into_data())?.first().copied(),
        None    => None,
    };

    Ok(Some(LayerParams {
        weights: read_values(weights)?,
        biases:  bias.map(read_values).transpose()?,
        scale,
    }))
}

fn read_values(data: TensorData) -> Result<Vec<f32>, EngineError> {
    data.to_vec::<f32>().map_err(|e| EngineError::TensorData(format!("{e:?}")))
}

// ─── Network ──────────────────────────────────────────────────────────────────
/// A model instance: the Burn module plus the specs that drive its forward pass.
#[derive(Debug)]
pub struct Network<B: Backend> {
    pub module:      NetworkModule<B>,
    pub config:      NetworkConfig,
    pub leaky_slope: f64,
    pub device:      B::Device,
}

impl<B: Backend> Network<B> {
    pub fn from_document(doc: &ModelDocument, leaky_slope: f64, device: B::Device) -> Result<Self, EngineError> {
        let module = NetworkModule::from_document(doc, &device)?;
        Ok(Self { module, config: doc.config(), leaky_slope, device })
    }

    pub fn forward_tensor(&self, x: Tensor<B, 2>) -> Result<Tensor<B, 2>, EngineError> {
        self.module.forward(&self.config, x, self.leaky_slope)
    }

    pub fn document(&self) -> Result<ModelDocument, EngineError> {
        self.module.export(&self.config)
    }
}

impl<B: AutodiffBackend> Network<B> {
    /// The same parameters on the inner backend, without autodiff tracking.
    pub fn valid(self) -> Network<B::InnerBackend> {
        Network {
            module:      self.module.valid(),
            config:      self.config,
            leaky_slope: self.leaky_slope,
            device:      self.device,
        }
    }
}

impl<B: Backend> Classifier for Network<B> {
    fn forward(&self, input: &Matrix) -> anyhow::Result<Matrix> {
        let x = Tensor::<B, 2>::from_data(
            TensorData::new(input.values().to_vec(), [input.rows(), input.cols()]),
            &self.device,
        );
        let y = self.forward_tensor(x)?;
        let [rows, cols] = y.dims();
        let values = read_values(y.into_data())?;
        Matrix::from_vec(rows, cols, values)
            .ok_or_else(|| anyhow::anyhow!("engine returned a malformed {rows}×{cols} output"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::architecture::ArchitectureBuilder;

    type TestBackend = burn::backend::NdArray;

    fn dense(inputs: usize, outputs: usize, activation: Activation, learnable_scale: bool) -> LayerSpec {
        LayerSpec::Dense(DenseSpec { inputs, outputs, activation, use_bias: true, learnable_scale })
    }

    fn tiny_doc() -> ModelDocument {
        ModelDocument::untrained(NetworkConfig::new(vec![
            dense(4, 3, Activation::LeakyRelu, true),
            dense(3, 2, Activation::Sigmoid, false),
        ]))
    }

    #[test]
    fn test_lenet_forward_produces_class_scores() {
        let doc = ModelDocument::untrained(ArchitectureBuilder::default().build());
        let net = Network::<TestBackend>::from_document(&doc, 0.01, Default::default()).unwrap();
        let out = net.forward(&Matrix::zeros(1, 784)).unwrap();
        assert_eq!(out.shape(), (1, 10));
    }

    #[test]
    fn test_known_weights_give_known_output() {
        let config = NetworkConfig::new(vec![dense(2, 1, Activation::Linear, true)]);
        let doc = ModelDocument {
            layers: vec![StoredLayer {
                spec:   config.layers[0].clone(),
                params: Some(LayerParams {
                    weights: vec![2.0, 3.0],
                    biases:  Some(vec![0.5]),
                    scale:   Some(2.0),
                }),
            }],
        };
        let net = Network::<TestBackend>::from_document(&doc, 0.01, Default::default()).unwrap();
        let out = net.forward(&Matrix::row(vec![1.0, 1.0])).unwrap();
        // (1*2 + 1*3 + 0.5) * 2
        assert!((out.values()[0] - 11.0).abs() < 1e-5);
    }

    #[test]
    fn test_export_then_reload_reproduces_outputs() {
        let net   = Network::<TestBackend>::from_document(&tiny_doc(), 0.01, Default::default()).unwrap();
        let saved = net.document().unwrap();
        assert!(saved.is_trained());
        assert_eq!(saved.config(), tiny_doc().config());

        let reloaded = Network::<TestBackend>::from_document(&saved, 0.01, Default::default()).unwrap();
        let input = Matrix::row(vec![0.1, -0.4, 0.7, 1.0]);
        let a = net.forward(&input).unwrap();
        let b = reloaded.forward(&input).unwrap();
        for (x, y) in a.values().iter().zip(b.values()) {
            assert!((x - y).abs() < 1e-6);
        }
    }

    #[test]
    fn test_wrong_input_width_is_a_shape_mismatch() {
        let net = Network::<TestBackend>::from_document(&tiny_doc(), 0.01, Default::default()).unwrap();
        let err = net.forward_tensor(Tensor::zeros([1, 5], &Default::default())).unwrap_err();
        assert_eq!(err, EngineError::ShapeMismatch { layer: 0, kind: "Dense", expected: 4, actual: 5 });
    }

    #[test]
    fn test_incompatible_stack_fails_at_forward() {
        let doc = ModelDocument::untrained(NetworkConfig::new(vec![
            dense(4, 3, Activation::Relu, false),
            dense(5, 2, Activation::Relu, false),
        ]));
        // Building succeeds; only the forward pass notices.
        let net = Network::<TestBackend>::from_document(&doc, 0.01, Default::default()).unwrap();
        let err = net.forward_tensor(Tensor::zeros([1, 4], &Default::default())).unwrap_err();
        assert!(matches!(err, EngineError::ShapeMismatch { layer: 1, .. }));
    }

    #[test]
    fn test_wrong_parameter_length_is_rejected() {
        let mut doc = tiny_doc();
        doc.layers[0].params = Some(LayerParams { weights: vec![0.0; 11], biases: Some(vec![0.0; 3]), scale: None });
        let err = NetworkModule::<TestBackend>::from_document(&doc, &Default::default()).unwrap_err();
        assert_eq!(err, EngineError::ParamLength { layer: 0, what: "weights", expected: 12, actual: 11 });
    }

    #[test]
    fn test_missing_biases_are_rejected() {
        let mut doc = tiny_doc();
        doc.layers[0].params = Some(LayerParams { weights: vec![0.0; 12], biases: None, scale: None });
        let err = NetworkModule::<TestBackend>::from_document(&doc, &Default::default()).unwrap_err();
        assert_eq!(err, EngineError::MissingParam { layer: 0, what: "biases" });
    }

    #[test]
    fn test_pool_layers_export_nothing() {
        let doc = ModelDocument::untrained(ArchitectureBuilder::default().build());
        let net = Network::<TestBackend>::from_document(&doc, 0.01, Default::default()).unwrap();
        let saved = net.document().unwrap();
        assert!(saved.layers[1].params.is_none());
        let conv = saved.layers[0].params.as_ref().unwrap();
        assert_eq!(conv.weights.len(), 6 * 1 * 5 * 5);
        assert_eq!(conv.biases.as_ref().unwrap().len(), 6);
        assert_eq!(saved.layers[4].params.as_ref().unwrap().scale, Some(1.0));
    }
}
