//! Central defaults for the telemetry table and the frame broadcast demo.

/// Robot controller hosting the telemetry table.
pub const TABLE_HOST: &str = "10.7.66.2";

/// Default port of the telemetry table server.
pub const TABLE_PORT: u16 = 5810;

/// Table that dashboards display.
pub const TABLE_PATH: &str = "/SmartDashboard";

/// Array senders retry the table server this often while disconnected.
pub const SENDER_RECONNECT_EVERY_MS: u64 = 500;

/// Upper bound on a single tarpc frame for table traffic.
pub const TABLE_MAX_FRAME_LENGTH: usize = 16 * 1024 * 1024;

/// Default port for the frame broadcast server
pub const FRAMECAST_PORT: u16 = 9090;

pub const FRAMECAST_WS_PATH: &str = "/ws";

pub const FRAMECAST_ASSET_DIR: &str = "web";

pub const FRAMECAST_IMAGE_PATH: &str = "data/colorimage.jpg";

/// Broadcast period.
pub const FRAMECAST_INTERVAL_MS: u64 = 1000;

/// JPEG quality of broadcast frames, same as OpenCV's `imencode` default.
pub const FRAMECAST_JPEG_QUALITY: u8 = 95;

/// Frames queued per client. A client further behind than this misses frames.
pub const FRAMECAST_CLIENT_QUEUE: usize = 2;
