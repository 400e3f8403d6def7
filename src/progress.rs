use indicatif::{ProgressBar, ProgressStyle};
use restem_library::copy::CopyEvent;

const TEMPLATE: &str = "[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}";

/// Progress bar driven by [`CopyEvent`]s. Hidden automatically when stderr
/// is not a terminal.
pub struct Progress {
    bar: ProgressBar,
}
impl Progress {
    pub fn new() -> Self {
        Self::with_bar(ProgressBar::new(0))
    }

    fn with_bar(bar: ProgressBar) -> Self {
        if let Ok(style) = ProgressStyle::with_template(TEMPLATE) {
            bar.set_style(style.progress_chars("=> "));
        }
        Self { bar }
    }

    pub fn bar(&self) -> &ProgressBar {
        &self.bar
    }

    pub fn handle(&self, event: &CopyEvent) {
        match event {
            CopyEvent::Started { total } => {
                self.bar.set_length(*total);
                self.bar.reset_elapsed();
            },
            CopyEvent::Copied(copied) => {
                self.bar.set_message(copied.stem.clone());
                self.bar.inc(1);
            },
            CopyEvent::Failed(_) => self.bar.inc(1),
            CopyEvent::Complete => self.bar.finish_and_clear(),
        }
    }

    pub fn clear(&self) {
        self.bar.finish_and_clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use restem_library::copy::Copied;
    use std::path::PathBuf;

    #[test]
    fn test_events_move_the_bar() {
        let progress = Progress::with_bar(ProgressBar::hidden());
        progress.handle(&CopyEvent::Started { total: 2 });
        assert_eq!(progress.bar().length(), Some(2));
        progress.handle(&CopyEvent::Copied(Copied {
            key: "a".into(),
            stem: "renamed_a".into(),
            destination: PathBuf::from("/out/renamed_a.txt"),
            bytes: 5,
        }));
        assert_eq!(progress.bar().position(), 1);
        assert_eq!(progress.bar().message(), "renamed_a");
        progress.handle(&CopyEvent::Complete);
        assert!(progress.bar().is_finished());
    }
}
