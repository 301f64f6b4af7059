// ============================================================
// Layer 2 — Evaluate Use Case
// ============================================================
// Runs every evaluation sample through a classifier and hands
// one record per sample to the reporter, then the summary.
//
// The predicted class is the index of the largest output value;
// on a tie the lowest index wins.

use anyhow::{ensure, Result};

use crate::domain::{
    sample::{Accuracy, EvaluationRecord, EvaluationSample},
    traits::{Classifier, EvaluationReporter},
};

/// Index of the first maximum. An empty slice maps to 0.
pub fn argmax(values: &[f32]) -> usize {
    let mut best = 0;
    for (i, v) in values.iter().enumerate() {
        if *v > values[best] {
            best = i;
        }
    }
    best
}

pub struct Evaluator;

impl Evaluator {
    pub fn evaluate<C, R>(classifier: &C, samples: &[EvaluationSample], reporter: &mut R) -> Result<Accuracy>
    where
        C: Classifier + ?Sized,
        R: EvaluationReporter + ?Sized,
    {
        tracing::info!("Evaluating {} samples", samples.len());
        let mut accuracy = Accuracy::default();

        for sample in samples {
            let output = classifier.forward(&sample.input)?;
            ensure!(!output.values().is_empty(), "Classifier returned an empty output");

            let record = EvaluationRecord::new(argmax(output.values()), sample.label as usize);
            reporter.record(&record)?;
            accuracy.push(&record);
        }

        reporter.summary(&accuracy)?;
        tracing::info!("Accuracy {}/{} = {}%", accuracy.correct, accuracy.total, accuracy.percent());
        Ok(accuracy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::tensor::Matrix;

    /// Echoes the input row back as class scores.
    struct Identity;

    impl Classifier for Identity {
        fn forward(&self, input: &Matrix) -> Result<Matrix> {
            Ok(input.clone())
        }
    }

    #[derive(Default)]
    struct Collect {
        records: Vec<EvaluationRecord>,
        summary: Option<Accuracy>,
    }

    impl EvaluationReporter for Collect {
        fn record(&mut self, record: &EvaluationRecord) -> Result<()> {
            self.records.push(*record);
            Ok(())
        }

        fn summary(&mut self, accuracy: &Accuracy) -> Result<()> {
            self.summary = Some(*accuracy);
            Ok(())
        }
    }

    fn sample(hot: usize, label: u8) -> EvaluationSample {
        EvaluationSample::new(Matrix::one_hot(hot, 10), label)
    }

    #[test]
    fn test_argmax_first_maximum_wins() {
        assert_eq!(argmax(&[0.5, 0.9, 0.9, 0.1]), 1);
        assert_eq!(argmax(&[3.0]), 0);
        assert_eq!(argmax(&[-2.0, -1.0, -1.5]), 1);
    }

    #[test]
    fn test_seven_of_ten_is_seventy_percent() {
        let samples: Vec<_> = (0..10u8)
            .map(|i| if i < 7 { sample(i as usize, i) } else { sample(0, i) })
            .collect();
        let mut reporter = Collect::default();

        let acc = Evaluator::evaluate(&Identity, &samples, &mut reporter).unwrap();
        assert_eq!(acc, Accuracy { correct: 7, total: 10 });
        assert_eq!(acc.percent(), 70.0);
        assert_eq!(reporter.records.len(), 10);
        assert_eq!(reporter.records[9], EvaluationRecord { predicted: 0, expected: 9, correct: false });
        assert_eq!(reporter.summary, Some(acc));
    }

    #[test]
    fn test_empty_set_reports_zero() {
        let mut reporter = Collect::default();
        let acc = Evaluator::evaluate(&Identity, &[], &mut reporter).unwrap();
        assert_eq!(acc.percent(), 0.0);
        assert!(reporter.records.is_empty());
        assert_eq!(reporter.summary, Some(Accuracy::default()));
    }
}
