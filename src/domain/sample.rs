// ============================================================
// Layer 3 — Samples and Evaluation Records
// ============================================================
// A training sample pairs an input row with a one-hot target;
// an evaluation sample keeps the raw integer label so the
// evaluator can compare it with the arg-max of the output.
//
// Samples and records are built once and never mutated, so
// loading and evaluation could be split across threads freely.

use crate::domain::tensor::Matrix;

/// Input row plus one-hot target row.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingSample {
    pub input:  Matrix,
    pub target: Matrix,
}

impl TrainingSample {
    pub fn new(input: Matrix, target: Matrix) -> Self {
        Self { input, target }
    }

    /// Index of the hot entry of the target, if there is exactly one.
    #[cfg(test)]
    pub fn label(&self) -> Option<usize> {
        let mut hot = self.target.values().iter().enumerate().filter(|(_, v)| **v == 1.0);
        match (hot.next(), hot.next()) {
            (Some((i, _)), None) => Some(i),
            _ => None,
        }
    }
}

/// Input row plus integer ground-truth label.
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationSample {
    pub input: Matrix,
    pub label: u8,
}

impl EvaluationSample {
    pub fn new(input: Matrix, label: u8) -> Self {
        Self { input, label }
    }
}

/// Outcome of classifying one evaluation sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvaluationRecord {
    pub predicted: usize,
    pub expected:  usize,
    pub correct:   bool,
}

impl EvaluationRecord {
    pub fn new(predicted: usize, expected: usize) -> Self {
        Self { predicted, expected, correct: predicted == expected }
    }
}

/// Running tally of correct predictions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Accuracy {
    pub correct: usize,
    pub total:   usize,
}

impl Accuracy {
    #[cfg(test)]
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a EvaluationRecord>) -> Self {
        let mut acc = Self::default();
        for r in records {
            acc.push(r);
        }
        acc
    }

    pub fn push(&mut self, record: &EvaluationRecord) {
        self.total += 1;
        if record.correct {
            self.correct += 1;
        }
    }

    /// `correct / total * 100`. An empty set scores 0.
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        // Multiply first so whole percentages come out exact.
        self.correct as f64 * 100.0 / self.total as f64
    }
}
