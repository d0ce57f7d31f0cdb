// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Terminal reporters: spec, dot and TAP.

use std::io;
use std::path::Path;

use termcolor::{ColorSpec, WriteColor};

use super::{FileOutcome, Reporter, ReporterConfig, Summary};
use crate::color::scheme;

fn painted<W: WriteColor>(w: &mut W, spec: &ColorSpec, text: &str) -> io::Result<()> {
    w.set_color(spec)?;
    write!(w, "{text}")?;
    w.reset()
}

/// Totals followed by the output of every failed file.
fn epilogue<W: WriteColor>(
    w: &mut W,
    config: &ReporterConfig,
    summary: &Summary,
) -> io::Result<()> {
    writeln!(w)?;
    write!(w, "  ")?;
    painted(w, &scheme::pass(), &format!("{} passing", summary.passes))?;
    writeln!(w, " ({}ms)", summary.duration_ms)?;
    if summary.failures > 0 {
        write!(w, "  ")?;
        painted(w, &scheme::fail(), &format!("{} failing", summary.failures))?;
        writeln!(w)?;
    }
    if summary.pending > 0 {
        write!(w, "  ")?;
        painted(w, &scheme::pending(), &format!("{} pending", summary.pending))?;
        writeln!(w)?;
    }

    for (index, record) in summary.failed().enumerate() {
        writeln!(w)?;
        write!(w, "  {}) ", index + 1)?;
        painted(w, &scheme::title(), &config.display_path(&record.path))?;
        if record.timed_out {
            write!(w, " (timed out)")?;
        }
        writeln!(w)?;
        if let Some(output) = record.output.as_deref().filter(|o| !o.trim().is_empty()) {
            w.set_color(&scheme::output())?;
            for line in output.lines() {
                writeln!(w, "     {line}")?;
            }
            w.reset()?;
        }
    }
    writeln!(w)?;
    w.flush()
}

/// One line per file, with durations for slow files.
pub struct SpecReporter<W: WriteColor> {
    out: W,
    config: ReporterConfig,
    failures: usize,
}

impl<W: WriteColor> SpecReporter<W> {
    pub fn new(out: W, config: ReporterConfig) -> Self {
        Self {
            out,
            config,
            failures: 0,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn duration(&mut self, outcome: &FileOutcome) -> io::Result<()> {
        let slow = self.config.slow;
        if outcome.duration > slow / 2 {
            let ms = outcome.duration.as_millis();
            let spec = if outcome.duration > slow {
                scheme::slow()
            } else {
                scheme::output()
            };
            write!(self.out, " ")?;
            painted(&mut self.out, &spec, &format!("({ms}ms)"))?;
        }
        Ok(())
    }
}

impl<W: WriteColor + Send> Reporter for SpecReporter<W> {
    fn start(&mut self, _total: usize) -> io::Result<()> {
        writeln!(self.out)
    }

    fn pass(&mut self, outcome: &FileOutcome) -> io::Result<()> {
        write!(self.out, "  ")?;
        painted(&mut self.out, &scheme::pass(), "✓")?;
        write!(self.out, " {}", self.config.display_path(&outcome.path))?;
        self.duration(outcome)?;
        writeln!(self.out)
    }

    fn fail(&mut self, outcome: &FileOutcome) -> io::Result<()> {
        self.failures += 1;
        let line = format!(
            "  {}) {}",
            self.failures,
            self.config.display_path(&outcome.path)
        );
        painted(&mut self.out, &scheme::fail(), &line)?;
        self.duration(outcome)?;
        writeln!(self.out)
    }

    fn pending(&mut self, path: &Path) -> io::Result<()> {
        let line = format!("  - {}", self.config.display_path(path));
        painted(&mut self.out, &scheme::pending(), &line)?;
        writeln!(self.out)
    }

    fn end(&mut self, summary: &Summary) -> io::Result<()> {
        self.failures = 0;
        epilogue(&mut self.out, &self.config, summary)
    }
}

/// One character per file.
pub struct DotReporter<W: WriteColor> {
    out: W,
    config: ReporterConfig,
}

impl<W: WriteColor> DotReporter<W> {
    pub fn new(out: W, config: ReporterConfig) -> Self {
        Self { out, config }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: WriteColor + Send> Reporter for DotReporter<W> {
    fn start(&mut self, _total: usize) -> io::Result<()> {
        write!(self.out, "\n  ")
    }

    fn pass(&mut self, outcome: &FileOutcome) -> io::Result<()> {
        let spec = if outcome.duration > self.config.slow {
            scheme::slow()
        } else {
            scheme::output()
        };
        painted(&mut self.out, &spec, ".")?;
        self.out.flush()
    }

    fn fail(&mut self, _outcome: &FileOutcome) -> io::Result<()> {
        painted(&mut self.out, &scheme::fail(), "!")?;
        self.out.flush()
    }

    fn pending(&mut self, _path: &Path) -> io::Result<()> {
        painted(&mut self.out, &scheme::pending(), ",")?;
        self.out.flush()
    }

    fn end(&mut self, summary: &Summary) -> io::Result<()> {
        writeln!(self.out)?;
        epilogue(&mut self.out, &self.config, summary)
    }
}

/// Test Anything Protocol, version 12 plan-first output.
pub struct TapReporter<W: WriteColor> {
    out: W,
    config: ReporterConfig,
    number: usize,
}

impl<W: WriteColor> TapReporter<W> {
    pub fn new(out: W, config: ReporterConfig) -> Self {
        Self {
            out,
            config,
            number: 0,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn next(&mut self) -> usize {
        self.number += 1;
        self.number
    }
}

impl<W: WriteColor + Send> Reporter for TapReporter<W> {
    fn start(&mut self, total: usize) -> io::Result<()> {
        self.number = 0;
        writeln!(self.out, "1..{total}")
    }

    fn pass(&mut self, outcome: &FileOutcome) -> io::Result<()> {
        let n = self.next();
        writeln!(self.out, "ok {n} {}", self.config.display_path(&outcome.path))
    }

    fn fail(&mut self, outcome: &FileOutcome) -> io::Result<()> {
        let n = self.next();
        writeln!(
            self.out,
            "not ok {n} {}",
            self.config.display_path(&outcome.path)
        )?;
        for line in outcome.output.lines() {
            writeln!(self.out, "  # {line}")?;
        }
        Ok(())
    }

    fn pending(&mut self, path: &Path) -> io::Result<()> {
        let n = self.next();
        writeln!(self.out, "ok {n} {} # SKIP -", self.config.display_path(path))
    }

    fn end(&mut self, summary: &Summary) -> io::Result<()> {
        writeln!(self.out, "# tests {}", summary.passes + summary.failures)?;
        writeln!(self.out, "# pass {}", summary.passes)?;
        writeln!(self.out, "# fail {}", summary.failures)?;
        self.out.flush()
    }
}

#[cfg(test)]
#[path = "text_tests.rs"]
mod tests;
