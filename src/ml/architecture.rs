// ============================================================
// Layer 5 — Architecture Builder
// ============================================================
// Declares the network that `new` starts from. This is a fixed
// template, not a search: the layers below are listed in
// forward order and their sizes follow from the input canvas.
//
// LeNet (default), for a 28×28 input and 10 classes:
//
//   Conv 28×28×1  5×5 → 6    → 24×24×6
//   Pool 24×24×6  2×2        → 12×12×6
//   Conv 12×12×6  5×5 → 16   →  8×8×16
//   Pool  8×8×16  2×2        →  4×4×16
//   Dense 256 → 120 → 84 → 10 → 10
//
// Mlp:
//
//   Dense 784 → 50 → 20 → 10 → 10
//
// Nothing is validated here; a broken stack only shows up when
// the engine runs its first forward pass.
//
// Reference: LeCun et al. (1998) Gradient-Based Learning Applied
//            to Document Recognition

use crate::domain::layer::{Activation, ConvSpec, DenseSpec, LayerSpec, NetworkConfig, PoolSpec};
use crate::infra::settings::{ArchitectureConfig, HarnessConfig, Template};

const KERNEL:      usize = 5;
const POOL_WINDOW: usize = 2;

pub struct ArchitectureBuilder {
    config:  ArchitectureConfig,
    rows:    usize,
    cols:    usize,
    classes: usize,
}

impl ArchitectureBuilder {
    pub fn new(config: ArchitectureConfig, rows: usize, cols: usize, classes: usize) -> Self {
        Self { config, rows, cols, classes }
    }

    pub fn from_settings(settings: &HarnessConfig) -> Self {
        Self::new(
            settings.architecture.clone(),
            settings.dataset.rows,
            settings.dataset.cols,
            settings.dataset.classes,
        )
    }

    pub fn build(&self) -> NetworkConfig {
        let config = match self.config.template {
            Template::LeNet => self.lenet(),
            Template::Mlp   => self.mlp(),
        };
        tracing::debug!(
            "Built {:?} architecture with {} layers ({} → {:?})",
            self.config.template,
            config.len(),
            self.rows * self.cols,
            config.output_len(),
        );
        config
    }

    fn lenet(&self) -> NetworkConfig {
        let conv1 = self.conv(self.cols, self.rows, 1, 6);
        let pool1 = pool(conv1.output_width(), conv1.output_height(), 6);
        let conv2 = self.conv(pool1.output_width(), pool1.output_height(), 6, 16);
        let pool2 = pool(conv2.output_width(), conv2.output_height(), 16);
        let flat  = pool2.output_width() * pool2.output_height() * pool2.channels;

        NetworkConfig::new(vec![
            LayerSpec::Convolution(conv1),
            LayerSpec::Pool(pool1),
            LayerSpec::Convolution(conv2),
            LayerSpec::Pool(pool2),
            self.dense(flat, 120),
            self.dense(120, 84),
            self.dense(84, self.classes),
            self.dense(self.classes, self.classes),
        ])
    }

    fn mlp(&self) -> NetworkConfig {
        NetworkConfig::new(vec![
            self.dense(self.rows * self.cols, 50),
            self.dense(50, 20),
            self.dense(20, self.classes),
            self.dense(self.classes, self.classes),
        ])
    }

    fn conv(&self, width: usize, height: usize, channels: usize, filters: usize) -> ConvSpec {
        ConvSpec {
            input_width:     width,
            input_height:    height,
            input_channels:  channels,
            kernel_width:    KERNEL,
            kernel_height:   KERNEL,
            output_channels: filters,
            padding:         0,
            activation:      self.config.activation,
            use_bias:        true,
            stride:          1,
        }
    }

    fn dense(&self, inputs: usize, outputs: usize) -> LayerSpec {
        LayerSpec::Dense(DenseSpec {
            inputs,
            outputs,
            activation:      self.config.activation,
            use_bias:        true,
            learnable_scale: self.config.learnable_scale,
        })
    }
}

fn pool(width: usize, height: usize, channels: usize) -> PoolSpec {
    PoolSpec { input_width: width, input_height: height, channels, window: POOL_WINDOW }
}

impl Default for ArchitectureBuilder {
    fn default() -> Self {
        Self::from_settings(&HarnessConfig::default())
    }
}
