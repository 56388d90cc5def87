//! Output sinks for rendered lines

use crate::config::OutputFormat;
use crate::error::Result;
use crate::feed::types::RenderedLine;
use crossterm::style::{Color, Stylize};
use std::io::{self, Write};

/// 256-colour grey used for channel message text
const MESSAGE_GREY: Color = Color::AnsiValue(252);

/// Destination for accepted messages
pub trait LineSink {
    fn emit(&mut self, line: &RenderedLine) -> Result<()>;
}

impl<S: LineSink + ?Sized> LineSink for Box<S> {
    fn emit(&mut self, line: &RenderedLine) -> Result<()> {
        (**self).emit(line)
    }
}

/// Collects lines in memory
impl LineSink for Vec<RenderedLine> {
    fn emit(&mut self, line: &RenderedLine) -> Result<()> {
        self.push(line.clone());
        Ok(())
    }
}

/// Coloured `time - channel - user: text` lines.
///
/// Direct messages are printed in red, channel messages in grey.
pub struct TerminalSink<W: Write> {
    out: W,
}

impl<W: Write> TerminalSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }
}

impl<W: Write> LineSink for TerminalSink<W> {
    fn emit(&mut self, line: &RenderedLine) -> Result<()> {
        let text = if line.is_direct_message {
            line.text.as_str().red()
        } else {
            line.text.as_str().with(MESSAGE_GREY)
        };

        writeln!(
            self.out,
            "{} - {} - {}: {}",
            line.time,
            line.channel.as_str().green(),
            line.user.as_str().blue(),
            text
        )?;
        Ok(())
    }
}

/// One JSON object per line
pub struct JsonSink<W: Write> {
    out: W,
}

impl<W: Write> JsonSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }
}

impl<W: Write> LineSink for JsonSink<W> {
    fn emit(&mut self, line: &RenderedLine) -> Result<()> {
        serde_json::to_writer(&mut self.out, line)?;
        writeln!(self.out)?;
        Ok(())
    }
}

/// Stdout sink for the configured format
pub fn stdout_sink(format: OutputFormat) -> Box<dyn LineSink + Send> {
    match format {
        OutputFormat::Pretty => Box::new(TerminalSink::new(io::stdout())),
        OutputFormat::Json => Box::new(JsonSink::new(io::stdout())),
    }
}
