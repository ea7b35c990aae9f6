//! Progress reporting sinks.

use std::sync::Mutex;
use tracing::info;

/// Sink for human-readable progress lines.
///
/// The executor tolerates having no notice attached; lines are then
/// silently dropped.
pub trait Notice: Send + Sync {
    /// Receive one progress line.
    fn write(&self, line: &str);
}

/// Notice that keeps lines in memory.
#[derive(Default)]
pub struct BufferNotice {
    lines: Mutex<Vec<String>>,
}

impl BufferNotice {
    /// Create an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Lines received so far, in order.
    pub fn lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .unwrap_or_else(|err| err.into_inner())
            .clone()
    }
}

impl Notice for BufferNotice {
    fn write(&self, line: &str) {
        let mut lines = self.lines.lock().unwrap_or_else(|err| err.into_inner());
        lines.push(line.to_string());
    }
}

/// Notice that forwards lines to the tracing pipeline at info level.
#[derive(Default)]
pub struct LogNotice;

impl LogNotice {
    pub fn new() -> Self {
        Self
    }
}

impl Notice for LogNotice {
    fn write(&self, line: &str) {
        info!("{line}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_collects_lines_in_order() {
        let notice = BufferNotice::new();
        notice.write("Migrated [foobar:10]: a.php");
        notice.write("Migrated [foobar:10]: b.php");

        assert_eq!(
            notice.lines(),
            vec!["Migrated [foobar:10]: a.php", "Migrated [foobar:10]: b.php"]
        );
    }
}
