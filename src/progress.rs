//! Coarse stdout progress for long downloads.
//!
//! Prints a `Downloading...` banner, one dot per `stride` body chunks, and a
//! ` Done!` marker when the body ends. Every write is flushed immediately so a
//! human watching the terminal sees movement. An empty body still shows the
//! banner and the marker.

use std::io::Write;

pub struct DotProgress<W: Write> {
    out: W,
    stride: u64,
    chunks: u64,
    started: bool,
}

impl<W: Write> DotProgress<W> {
    pub fn new(out: W, stride: u64) -> Self {
        Self {
            out,
            stride: stride.max(1),
            chunks: 0,
            started: false,
        }
    }

    /// Prints the banner once. Output errors are ignored (progress is cosmetic).
    pub fn begin(&mut self) {
        if !self.started {
            self.started = true;
            let _ = write!(self.out, "Downloading...");
            let _ = self.out.flush();
        }
    }

    /// Records one body chunk and prints a dot every `stride` chunks.
    pub fn chunk(&mut self) {
        self.begin();
        self.chunks += 1;
        if self.chunks % self.stride == 0 {
            let _ = write!(self.out, ".");
            let _ = self.out.flush();
        }
    }

    /// Prints the completion marker (and the banner, if no chunk ever did).
    pub fn finish(&mut self) {
        self.begin();
        let _ = writeln!(self.out, " Done!");
        let _ = self.out.flush();
    }
}

impl DotProgress<std::io::Stdout> {
    pub fn stdout(stride: u64) -> Self {
        Self::new(std::io::stdout(), stride)
    }
}
