// ============================================================
// Layer 6 — Console Reporter
// ============================================================
// Prints one line per evaluated sample and the final accuracy:
//
//   Predicted: 7 | True: 7        (green)
//   Predicted: 2 | True: 3        (red)
//   ...
//   Network accuracy = 97.52%
//
// The colour is reset after every line, so an error halfway
// through an evaluation never leaves the terminal coloured.

use anyhow::Result;
use std::io::Write;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use crate::domain::{
    sample::{Accuracy, EvaluationRecord},
    traits::EvaluationReporter,
};

pub struct ConsoleReporter<W: WriteColor> {
    out: W,
}

impl ConsoleReporter<StandardStream> {
    /// Coloured output on stdout when it is a terminal.
    pub fn stdout() -> Self {
        let choice = if std::io::IsTerminal::is_terminal(&std::io::stdout()) {
            ColorChoice::Auto
        } else {
            ColorChoice::Never
        };
        Self::new(StandardStream::stdout(choice))
    }
}

impl<W: WriteColor> ConsoleReporter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: WriteColor> EvaluationReporter for ConsoleReporter<W> {
    fn record(&mut self, record: &EvaluationRecord) -> Result<()> {
        let colour = if record.correct { Color::Green } else { Color::Red };
        self.out.set_color(ColorSpec::new().set_fg(Some(colour)))?;
        write!(self.out, "Predicted: {} | True: {}", record.predicted, record.expected)?;
        self.out.reset()?;
        writeln!(self.out)?;
        Ok(())
    }

    fn summary(&mut self, accuracy: &Accuracy) -> Result<()> {
        writeln!(self.out, "Network accuracy = {}%", accuracy.percent())?;
        self.out.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use termcolor::{Ansi, NoColor};

    #[test]
    fn test_plain_lines_and_summary() {
        let mut reporter = ConsoleReporter::new(NoColor::new(Vec::new()));
        let records = [EvaluationRecord::new(7, 7), EvaluationRecord::new(2, 3)];
        for r in &records {
            reporter.record(r).unwrap();
        }
        reporter.summary(&Accuracy::from_records(&records)).unwrap();

        let text = String::from_utf8(reporter.into_inner().into_inner()).unwrap();
        assert_eq!(text, "Predicted: 7 | True: 7\nPredicted: 2 | True: 3\nNetwork accuracy = 50%\n");
    }

    #[test]
    fn test_colour_is_reset_on_every_line() {
        let mut reporter = ConsoleReporter::new(Ansi::new(Vec::new()));
        reporter.record(&EvaluationRecord::new(1, 1)).unwrap();
        reporter.record(&EvaluationRecord::new(1, 4)).unwrap();

        let text  = String::from_utf8(reporter.into_inner().into_inner()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        // green, then red, each followed by a reset
        assert!(lines[0].contains("\x1b[32mPredicted: 1 | True: 1"));
        assert!(lines[1].contains("\x1b[31mPredicted: 1 | True: 4"));
        assert!(lines.iter().all(|l| l.ends_with("\x1b[0m")));
    }
}
