use colored::{Color, Colorize};

use crate::response::ResponseSnapshot;

pub fn print_snapshot(
    method: &str,
    url: &str,
    snapshot: &ResponseSnapshot,
    preview: Option<usize>,
) {
    if let Some(err) = &snapshot.error {
        eprintln!(
            "{} {} {}",
            method.to_uppercase().bold(),
            url.cyan(),
            "failed".red()
        );
        eprintln!("{} {}", "Error:".bold(), err.report().red());
        return;
    }

    let (final_method, final_url) = match &snapshot.request {
        Some(request) => (request.method.to_string(), request.url.to_string()),
        None => (method.to_uppercase(), url.to_string()),
    };

    println!("{} {}", final_method.bold(), final_url.cyan());
    println!(
        "{} {} {}",
        "Status:".bold(),
        snapshot.status.color(status_color(snapshot.status_code)),
        format!("({})", snapshot.proto).dimmed()
    );

    if let Some(request) = &snapshot.request {
        if !request.headers.is_empty() {
            println!("{}", "Request headers".bold());
            for (name, value) in &request.headers {
                println!(
                    "  {}: {}",
                    name.as_str().cyan(),
                    value.to_str().unwrap_or_default().dimmed()
                );
            }
        }
    }

    println!("{}", "Response headers".bold());
    for (name, value) in &snapshot.headers {
        println!(
            "  {}: {}",
            name.as_str().cyan(),
            value.to_str().unwrap_or_default().dimmed()
        );
    }

    println!("{} {}", "Body:".bold(), body_summary(snapshot).dimmed());

    if let Some(limit) = preview.filter(|limit| *limit > 0) {
        println!("{}", "Preview".bold());
        println!("{}", create_preview(&snapshot.body, limit).dimmed());
    }
}

fn status_color(code: u16) -> Color {
    if code >= 400 {
        Color::Red
    } else if code >= 300 {
        Color::Yellow
    } else {
        Color::Green
    }
}

fn body_summary(snapshot: &ResponseSnapshot) -> String {
    match snapshot.content_length {
        Some(declared) if declared != snapshot.body.len() as u64 => {
            format!("{} bytes (declared {})", snapshot.body.len(), declared)
        }
        _ => format!("{} bytes", snapshot.body.len()),
    }
}

fn create_preview(bytes: &[u8], limit: usize) -> String {
    let slice = if bytes.len() > limit {
        &bytes[..limit]
    } else {
        bytes
    };
    match std::str::from_utf8(slice) {
        Ok(text) => text.to_string(),
        Err(_) => hex::encode(slice),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ClientError;

    #[test]
    fn create_preview_handles_binary_data() {
        let text = create_preview("hello".as_bytes(), 10);
        assert_eq!(text, "hello");

        let truncated = create_preview("hello world".as_bytes(), 5);
        assert_eq!(truncated, "hello");

        let binary = create_preview(&[0, 159, 146, 150], 4);
        assert_eq!(binary, "009f9296");
    }

    #[test]
    fn status_color_matches_classes() {
        assert_eq!(status_color(200), Color::Green);
        assert_eq!(status_color(302), Color::Yellow);
        assert_eq!(status_color(503), Color::Red);
    }

    #[test]
    fn body_summary_mentions_mismatched_length() {
        let snapshot = ResponseSnapshot {
            body: b"abc".to_vec(),
            content_length: Some(3),
            ..ResponseSnapshot::default()
        };
        assert_eq!(body_summary(&snapshot), "3 bytes");

        let snapshot = ResponseSnapshot {
            body: b"abc".to_vec(),
            content_length: Some(10),
            ..ResponseSnapshot::default()
        };
        assert_eq!(body_summary(&snapshot), "3 bytes (declared 10)");
    }

    #[test]
    fn print_snapshot_handles_success_and_errors() {
        let snapshot = ResponseSnapshot {
            status: "200 OK".to_string(),
            status_code: 200,
            proto: "HTTP/1.1".to_string(),
            body: b"{}".to_vec(),
            ..ResponseSnapshot::default()
        };
        print_snapshot("get", "http://example.com", &snapshot, Some(16));

        let failed = ResponseSnapshot::from_error(ClientError::TooManyRedirects(10));
        print_snapshot("get", "http://example.com", &failed, None);
    }
}
