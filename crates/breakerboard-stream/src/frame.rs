//! Event-stream frame encoding.

use bytes::Bytes;

use breakerboard_core::result::AppResult;

use crate::snapshot::CommandSnapshot;

/// Keep-alive frame sent on ticks with no running command.
pub const PING_FRAME: &str = "ping: \n\n";

/// The keep-alive frame.
pub fn ping() -> Bytes {
    Bytes::from_static(PING_FRAME.as_bytes())
}

/// One `data:` frame carrying `snapshot` as single-line JSON.
pub fn data(snapshot: &CommandSnapshot) -> AppResult<Bytes> {
    let json = serde_json::to_string(snapshot)?;

    let mut frame = String::with_capacity(json.len() + 8);
    frame.push_str("data: ");
    frame.push_str(&json);
    frame.push_str("\n\n");
    Ok(Bytes::from(frame))
}
