//! Transport configuration options.

use std::time::Duration;

/// Configuration for the transport core.
///
/// # Examples
///
/// ```
/// use longeron_core::options::TransportOptions;
/// use std::time::Duration;
///
/// let opts = TransportOptions::default()
///     .with_connect_retry_ivl(Duration::from_millis(10))
///     .with_io_buffer_size(4096);
/// ```
#[derive(Debug, Clone)]
pub struct TransportOptions {
    /// Re-check interval a pending connection attempt hints to the
    /// reactor.
    ///
    /// Policy, not contract: handlers may hint any interval and the
    /// reactor honors it per registration.
    /// - Default: 3ms
    pub connect_retry_ivl: Duration,

    /// Capacity of the staging buffer between a codec and its socket.
    /// - Default: 8192 (8KB) - balanced for most workloads
    pub io_buffer_size: usize,

    /// Disable Nagle's algorithm on established connections.
    /// - Default: true
    pub tcp_nodelay: bool,
}

impl Default for TransportOptions {
    fn default() -> Self {
        Self {
            connect_retry_ivl: Duration::from_millis(3),
            io_buffer_size: 8192,
            tcp_nodelay: true,
        }
    }
}

impl TransportOptions {
    #[must_use]
    pub const fn with_connect_retry_ivl(mut self, ivl: Duration) -> Self {
        self.connect_retry_ivl = ivl;
        self
    }

    #[must_use]
    pub const fn with_io_buffer_size(mut self, size: usize) -> Self {
        self.io_buffer_size = size;
        self
    }

    #[must_use]
    pub const fn with_tcp_nodelay(mut self, enabled: bool) -> Self {
        self.tcp_nodelay = enabled;
        self
    }
}
