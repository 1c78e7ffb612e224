use wicket_types::DeviceId;

/// Topic on which devices report access attempts.
pub const DEFAULT_EVENT_TOPIC: &str = "access/attempt";

/// Derive the per-device outbound response topic.
///
/// Responses go to `<base>/response/<deviceId>`, so each device only sees
/// its own decisions.
pub fn response_topic(base: &str, device: &DeviceId) -> String {
    format!("{base}/response/{device}")
}
