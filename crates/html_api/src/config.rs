/// Limits applied by a processor instance.
///
/// The defaults bound the cost of a long-lived processor: bookmarks are
/// re-mapped on every edit, and every seek may rescan part of the buffer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProcessorConfig {
    /// Maximum number of caller bookmarks alive at once.
    pub max_bookmarks: usize,
    /// Maximum number of seeks over the processor's lifetime.
    pub max_seek_ops: usize,
    /// Pending replacements are applied once the queue grows past this.
    pub max_pending_replacements: usize,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            max_bookmarks: 10,
            max_seek_ops: 1000,
            max_pending_replacements: 1000,
        }
    }
}
