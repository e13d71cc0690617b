use std::time::{SystemTime, UNIX_EPOCH};

pub(crate) fn boundary() -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_nanos())
        .unwrap_or_default();
    format!("imagelab-{nanos:x}")
}

pub(crate) fn content_type(boundary: &str) -> String {
    format!("multipart/form-data; boundary={boundary}")
}

/// Single-file `multipart/form-data` body.
pub(crate) fn file_body(
    boundary: &str,
    field: &str,
    file_name: &str,
    mime: &str,
    bytes: &[u8],
) -> Vec<u8> {
    let file_name = file_name.replace(['"', '\r', '\n'], "_");
    let mut body = Vec::with_capacity(bytes.len() + 256);
    body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
    body.extend_from_slice(
        format!("Content-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\n")
            .as_bytes(),
    );
    body.extend_from_slice(format!("Content-Type: {mime}\r\n\r\n").as_bytes());
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());
    body
}

pub(crate) fn mime_for(file_name: &str) -> &'static str {
    image::ImageFormat::from_path(file_name)
        .map(|format| format.to_mime_type())
        .unwrap_or("application/octet-stream")
}
