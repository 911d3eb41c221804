//! RFC 2822 message construction for `messages.send`.

use base64::Engine;
use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};

/// An attachment already read from disk.
#[derive(Debug, Clone)]
pub struct Attachment {
    pub filename: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

impl Attachment {
    /// Guess the content type from the file name.
    pub fn new(filename: impl Into<String>, data: Vec<u8>) -> Self {
        let filename = filename.into();
        let content_type = mime_guess::from_path(&filename)
            .first_or_octet_stream()
            .to_string();
        Self {
            filename,
            content_type,
            data,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Message<'a> {
    pub to: &'a str,
    pub subject: &'a str,
    pub text: &'a str,
    pub html: Option<&'a str>,
    pub attachments: &'a [Attachment],
}

/// Render the message as raw MIME text.
///
/// Plain text alone is a single part; text with HTML is
/// `multipart/alternative`; attachments wrap either in `multipart/mixed`.
/// Boundaries are derived from `boundary_seed` so output is deterministic
/// for a given seed.
pub fn render(message: &Message<'_>, boundary_seed: &str) -> String {
    let mut out = String::new();
    out.push_str(&format!("To: {}\r\n", message.to));
    out.push_str(&format!("Subject: {}\r\n", encode_header(message.subject)));
    out.push_str("MIME-Version: 1.0\r\n");

    let body = render_body(message, boundary_seed);
    if message.attachments.is_empty() {
        out.push_str(&body);
        return out;
    }

    let mixed = format!("mixed-{}", boundary_seed);
    out.push_str(&format!(
        "Content-Type: multipart/mixed; boundary=\"{}\"\r\n\r\n",
        mixed
    ));
    out.push_str(&format!("--{}\r\n", mixed));
    out.push_str(&body);
    for attachment in message.attachments {
        out.push_str(&format!("\r\n--{}\r\n", mixed));
        out.push_str(&format!(
            "Content-Type: {}; name=\"{}\"\r\n",
            attachment.content_type, attachment.filename
        ));
        out.push_str(&format!(
            "Content-Disposition: attachment; filename=\"{}\"\r\n",
            attachment.filename
        ));
        out.push_str("Content-Transfer-Encoding: base64\r\n\r\n");
        out.push_str(&wrap_base64(&attachment.data));
    }
    out.push_str(&format!("\r\n--{}--\r\n", mixed));
    out
}

/// Encode rendered MIME text the way `messages.send` expects in `raw`.
pub fn encode_raw(mime: &str) -> String {
    URL_SAFE_NO_PAD.encode(mime.as_bytes())
}

fn render_body(message: &Message<'_>, boundary_seed: &str) -> String {
    let Some(html) = message.html else {
        return text_part("text/plain", message.text);
    };

    let alt = format!("alt-{}", boundary_seed);
    let mut out = format!(
        "Content-Type: multipart/alternative; boundary=\"{}\"\r\n\r\n",
        alt
    );
    out.push_str(&format!("--{}\r\n", alt));
    out.push_str(&text_part("text/plain", message.text));
    out.push_str(&format!("\r\n--{}\r\n", alt));
    out.push_str(&text_part("text/html", html));
    out.push_str(&format!("\r\n--{}--\r\n", alt));
    out
}

fn text_part(content_type: &str, text: &str) -> String {
    format!(
        "Content-Type: {}; charset=\"UTF-8\"\r\nContent-Transfer-Encoding: base64\r\n\r\n{}",
        content_type,
        wrap_base64(text.as_bytes())
    )
}

/// Base64 split into 76-character lines.
fn wrap_base64(data: &[u8]) -> String {
    let encoded = STANDARD.encode(data);
    let mut out = String::with_capacity(encoded.len() + encoded.len() / 38);
    for chunk in encoded.as_bytes().chunks(76) {
        out.push_str(&String::from_utf8_lossy(chunk));
        out.push_str("\r\n");
    }
    out
}

/// RFC 2047 encoded-word for non-ASCII header values.
fn encode_header(value: &str) -> String {
    if value.is_ascii() {
        return value.to_string();
    }
    format!("=?UTF-8?B?{}?=", STANDARD.encode(value.as_bytes()))
}
