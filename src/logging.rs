//! Log output that plays nicely with the progress bar.

use indicatif::ProgressBar;
use std::io::Write;
use tracing::Subscriber;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::MakeWriter;

/// Formatted subscriber writing to stderr through `bar`.
///
/// INFO by default, DEBUG when `verbose`; `RUST_LOG` directives are applied
/// on top.
pub fn subscriber(verbose: bool, bar: ProgressBar) -> impl Subscriber + Send + Sync + 'static {
    let level = if verbose { LevelFilter::DEBUG } else { LevelFilter::INFO };
    let filter = EnvFilter::builder().with_default_directive(level.into()).from_env_lossy();
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(BarWriter { bar })
        .finish()
}

/// Hands out one [`Line`] per log event.
#[derive(Clone)]
struct BarWriter {
    bar: ProgressBar,
}
impl<'a> MakeWriter<'a> for BarWriter {
    type Writer = Line;

    fn make_writer(&'a self) -> Self::Writer {
        Line { bar: self.bar.clone(), buf: Vec::new() }
    }
}

/// Buffers a formatted event and writes it to stderr in one go with the bar
/// hidden.
struct Line {
    bar: ProgressBar,
    buf: Vec<u8>,
}
impl Write for Line {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.buf.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        if self.buf.is_empty() {
            return Ok(());
        }
        let buf = std::mem::take(&mut self.buf);
        self.bar.suspend(|| std::io::stderr().lock().write_all(&buf))
    }
}
impl Drop for Line {
    fn drop(&mut self) {
        // Nowhere left to report a failed log write.
        let _ = self.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_buffers_until_flushed() {
        let mut line = BarWriter { bar: ProgressBar::hidden() }.make_writer();
        line.write_all(b"hello ").unwrap();
        line.write_all(b"world\n").unwrap();
        assert_eq!(line.buf, b"hello world\n");
        line.flush().unwrap();
        assert!(line.buf.is_empty());
    }

    #[test]
    fn test_subscriber_is_scoped() {
        let subscriber = subscriber(true, ProgressBar::hidden());
        tracing::subscriber::with_default(subscriber, || {
            assert!(tracing::enabled!(tracing::Level::DEBUG));
        });
    }
}
