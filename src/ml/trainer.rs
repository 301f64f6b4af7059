// ============================================================
// Layer 5 — Training Loop
// ============================================================
// Mini-batch training of a Network with Burn's DataLoader and
// Adam, against the one-hot targets produced by the loader.
//
// Per batch:
//   forward → MSE(output, one-hot) → backward → Adam step
//
// Per epoch:
//   average loss and arg-max accuracy over the training batches,
//   traced and (optionally) appended to metrics.csv.
//
// The optimiser state lives only for the duration of one fit;
// nothing about it is persisted.
//
// Reference: Burn Book §5, Kingma & Ba (2015) Adam

use std::time::Instant;

use anyhow::{ensure, Result};
use burn::{
    data::dataloader::DataLoaderBuilder,
    nn::loss::{MseLoss, Reduction},
    optim::{AdamConfig, GradientsParams, Optimizer},
    prelude::*,
    tensor::backend::AutodiffBackend,
};

use crate::data::{batcher::SampleBatcher, dataset::SampleDataset};
use crate::domain::{job::TrainingJob, sample::TrainingSample};
use crate::infra::{
    metrics::{EpochMetrics, MetricsLogger},
    settings::TrainingConfig,
};
use crate::ml::model::Network;

pub fn run_training<B: AutodiffBackend>(
    network:  Network<B>,
    job:      &TrainingJob,
    samples:  Vec<TrainingSample>,
    settings: &TrainingConfig,
) -> Result<Network<B>> {
    ensure!(!samples.is_empty(), "No training samples to fit on");

    let Network { module, config, leaky_slope, device } = network;
    B::seed(settings.seed);

    let metrics = settings
        .metrics_dir
        .as_ref()
        .map(MetricsLogger::new)
        .transpose()?;

    // ── Training data loader ──────────────────────────────────────────────────
    let dataset = SampleDataset::new(samples);
    tracing::info!("Training on {} samples", dataset.sample_count());

    let batcher = SampleBatcher::<B>::new(device.clone());
    let loader  = DataLoaderBuilder::new(batcher)
        .batch_size(job.batch_size)
        .shuffle(settings.seed)
        .num_workers(settings.num_workers)
        .build(dataset);

    // ── Adam optimiser ────────────────────────────────────────────────────────
    let mut optim  = AdamConfig::new().with_epsilon(1e-8).init();
    let mut module = module;
    let loss_fn    = MseLoss::new();
    let mut best   = f64::INFINITY;

    // ── Epoch loop ────────────────────────────────────────────────────────────
    for epoch in 1..=job.epochs {
        let started      = Instant::now();
        let mut loss_sum = 0.0f64;
        let mut batches  = 0usize;
        let mut correct  = 0usize;
        let mut seen     = 0usize;

        for batch in loader.iter() {
            let output = module.forward(&config, batch.inputs, leaky_slope)?;

            // argmax(1) returns [batch, 1]; flatten before comparing
            let predicted = output.clone().argmax(1).flatten::<1>(0, 1);
            let expected  = batch.targets.clone().argmax(1).flatten::<1>(0, 1);
            seen    += expected.dims()[0];
            correct += predicted.equal(expected).int().sum().into_scalar().elem::<i64>() as usize;

            let loss = loss_fn.forward(output, batch.targets, Reduction::Mean);
            loss_sum += loss.clone().into_scalar().elem::<f64>();
            batches  += 1;

            let grads = loss.backward();
            let grads = GradientsParams::from_grads(grads, &module);
            module = optim.step(job.learning_rate, module, grads);
        }

        let m = EpochMetrics::new(
            epoch,
            if batches > 0 { loss_sum / batches as f64 } else { f64::NAN },
            if seen > 0 { correct as f64 / seen as f64 } else { 0.0 },
            started.elapsed().as_secs_f64(),
        );

        tracing::info!(
            "Epoch {:>3}/{} | train_loss={:.6} | train_acc={:.2}% | {:.1}s",
            m.epoch, job.epochs, m.train_loss, m.train_acc * 100.0, m.seconds,
        );
        if m.is_improvement(best) {
            best = m.train_loss;
        } else {
            tracing::warn!("Epoch {} did not improve the loss (best {:.6})", epoch, best);
        }
        if let Some(logger) = &metrics {
            logger.log(&m)?;
        }
    }

    tracing::info!("Training complete");
    Ok(Network { module, config, leaky_slope, device })
}
