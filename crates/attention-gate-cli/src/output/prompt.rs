//! Terminal calibration prompt with an indicatif bar per step.

use std::io::{self, BufRead, Write};

use anyhow::{bail, Context, Result};
use attention_gate_core::{CalibrationPrompt, CalibrationStep, PromptAction, ThresholdSet};
use indicatif::{ProgressBar, ProgressStyle};

/// Interprets one line of user input at a step prompt.
///
/// An empty line captures; `q` or `quit` aborts. Anything else is
/// unrecognised.
#[must_use]
pub fn parse_response(line: &str) -> Option<PromptAction> {
    match line.trim().to_ascii_lowercase().as_str() {
        "" => Some(PromptAction::Capture),
        "q" | "quit" => Some(PromptAction::Abort),
        _ => None,
    }
}

/// Guides the user through calibration on a terminal.
pub struct TerminalPrompt<R, W> {
    input: R,
    output: W,
    bar: Option<ProgressBar>,
    show_bar: bool,
}

impl TerminalPrompt<io::StdinLock<'static>, io::Stderr> {
    /// Prompts on stderr and reads answers from stdin.
    #[must_use]
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stderr())
    }
}

impl<R: BufRead, W: Write> TerminalPrompt<R, W> {
    /// Creates a prompt over the given input and output.
    pub const fn new(input: R, output: W) -> Self {
        Self {
            input,
            output,
            bar: None,
            show_bar: true,
        }
    }

    /// Disables the progress bar.
    #[must_use]
    pub const fn without_bar(mut self) -> Self {
        self.show_bar = false;
        self
    }

    fn ask(&mut self, step: CalibrationStep, index: usize, total: usize) -> Result<PromptAction> {
        writeln!(self.output)?;
        writeln!(
            self.output,
            "Step {}/{total} ({step}): {}",
            index + 1,
            step.instruction()
        )?;
        loop {
            write!(self.output, "Press Enter to capture, q to abort: ")?;
            self.output.flush()?;

            let mut line = String::new();
            let read = self
                .input
                .read_line(&mut line)
                .context("Failed to read from terminal")?;
            if read == 0 {
                bail!("input closed");
            }
            match parse_response(&line) {
                Some(action) => return Ok(action),
                None => writeln!(self.output, "Unrecognised answer '{}'", line.trim())?,
            }
        }
    }

    fn start_bar(&mut self, required: usize) {
        let bar = ProgressBar::new(required as u64);
        if let Ok(style) =
            ProgressStyle::default_bar().template("  [{bar:30.cyan/blue}] {pos}/{len} samples")
        {
            bar.set_style(style.progress_chars("#>-"));
        }
        self.bar = Some(bar);
    }
}

impl<R: BufRead, W: Write> CalibrationPrompt for TerminalPrompt<R, W> {
    fn begin_step(
        &mut self,
        step: CalibrationStep,
        index: usize,
        total: usize,
    ) -> Result<PromptAction> {
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
        }
        self.ask(step, index, total)
    }

    fn sample_captured(&mut self, _step: CalibrationStep, captured: usize, required: usize) {
        if !self.show_bar {
            return;
        }
        if self.bar.is_none() {
            self.start_bar(required);
        }
        if let Some(bar) = &self.bar {
            bar.set_position(captured as u64);
            if captured >= required {
                bar.finish();
            }
        }
    }

    fn finished(&mut self, thresholds: &ThresholdSet) {
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
        }
        let _ = writeln!(self.output, "\nCalibration complete:");
        let _ = writeln!(
            self.output,
            "  face horizontal  {:.2} .. {:.2}",
            thresholds.face_horizontal_left, thresholds.face_horizontal_right
        );
        let _ = writeln!(
            self.output,
            "  face vertical    {:.2} .. {:.2}",
            thresholds.face_vertical_up, thresholds.face_vertical_down
        );
        let _ = writeln!(
            self.output,
            "  eye horizontal   {:.2} .. {:.2}",
            thresholds.eye_horizontal_left, thresholds.eye_horizontal_right
        );
        let _ = writeln!(
            self.output,
            "  eye vertical     {:.2} .. {:.2}",
            thresholds.eye_vertical_up, thresholds.eye_vertical_down
        );
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::io::Cursor;

    use super::*;

    fn prompt(input: &str) -> TerminalPrompt<Cursor<Vec<u8>>, Vec<u8>> {
        TerminalPrompt::new(Cursor::new(input.as_bytes().to_vec()), Vec::new()).without_bar()
    }

    #[test]
    fn test_parse_response() {
        assert_eq!(parse_response("\n"), Some(PromptAction::Capture));
        assert_eq!(parse_response("  \r\n"), Some(PromptAction::Capture));
        assert_eq!(parse_response("q\n"), Some(PromptAction::Abort));
        assert_eq!(parse_response("QUIT"), Some(PromptAction::Abort));
        assert_eq!(parse_response("yes"), None);
    }

    #[test]
    fn test_enter_captures_and_shows_instruction() {
        let mut p = prompt("\n");
        let action = p.begin_step(CalibrationStep::EyesLeft, 0, 8).unwrap();
        assert_eq!(action, PromptAction::Capture);

        let shown = String::from_utf8(p.output).unwrap();
        assert!(shown.contains("Step 1/8 (eyes-left)"));
        assert!(shown.contains(CalibrationStep::EyesLeft.instruction()));
    }

    #[test]
    fn test_unrecognised_answer_reprompts() {
        let mut p = prompt("maybe\nq\n");
        let action = p.begin_step(CalibrationStep::HeadUp, 6, 8).unwrap();
        assert_eq!(action, PromptAction::Abort);
        assert!(String::from_utf8(p.output)
            .unwrap()
            .contains("Unrecognised answer 'maybe'"));
    }

    #[test]
    fn test_closed_input_is_an_error() {
        let mut p = prompt("");
        assert!(p.begin_step(CalibrationStep::EyesUp, 2, 8).is_err());
    }

    #[test]
    fn test_finished_prints_summary() {
        let mut p = prompt("");
        p.finished(&ThresholdSet {
            face_horizontal_left: 0.3,
            face_horizontal_right: 0.7,
            face_vertical_up: 0.25,
            face_vertical_down: 0.75,
            eye_horizontal_left: 0.2,
            eye_horizontal_right: 0.8,
            eye_vertical_up: 0.2,
            eye_vertical_down: 0.8,
        });
        let shown = String::from_utf8(p.output).unwrap();
        assert!(shown.contains("face vertical    0.25 .. 0.75"));
    }
}
