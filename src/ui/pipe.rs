use crate::state::Response;
use std::io::Write;
use tokio::sync::mpsc;

/// Write each response as one JSON line until the channel closes.
///
/// Lines are flushed immediately so the bar sees updates without buffering.
pub async fn display_status_pipe<W: Write>(
    mut rx: mpsc::Receiver<Response>,
    out: &mut W,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let mut last_text: Option<String> = None;
    while let Some(resp) = rx.recv().await {
        write_response(out, &resp)?;
        if last_text.as_deref() != Some(resp.full_text.as_str()) {
            tracing::debug!(text = %resp.full_text, color = %resp.color, "Status changed");
            last_text = Some(resp.full_text);
        }
    }
    Ok(())
}

/// Serialize a single response line.
pub fn write_response<W: Write>(
    out: &mut W,
    resp: &Response,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    serde_json::to_writer(&mut *out, resp)?;
    out.write_all(b"\n")?;
    out.flush()?;
    Ok(())
}
