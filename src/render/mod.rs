//! Response bodies.

use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use tracing::warn;

/// Body of the root page.
pub const LOGIN_PAGE: &str = r#"<a href="/login/github/">LOGIN</a>"#;

/// Body returned whenever login could not be completed.
pub const UNAUTHORIZED: &str = "UNAUTHORIZED!";

/// Escapes text for use inside HTML attributes and element content.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Escapes element content. Quotes are left alone so embedded JSON stays
/// readable.
pub fn escape_text(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Body sent with the 301 to the provider.
pub fn redirect_body(location: &str) -> String {
    format!(
        "<a href=\"{}\">Moved Permanently</a>.\n\n",
        escape_html(location)
    )
}

/// Re-indents a JSON document with tabs.
///
/// Key order and number literals are kept as received. Text that is not
/// valid JSON comes back unchanged and a warning is
/// logged.
pub fn pretty_json(raw: &str) -> String {
    let value: serde_json::Value = match serde_json::from_str(raw) {
        Ok(value) => value,
        Err(e) => {
            warn!(error = %e, "Profile is not valid JSON, rendering it as-is");
            return raw.to_string();
        }
    };

    let mut buf = Vec::with_capacity(raw.len() * 2);
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"\t"));
    if let Err(e) = value.serialize(&mut serializer) {
        warn!(error = %e, "Failed to re-indent profile, rendering it as-is");
        return raw.to_string();
    }

    String::from_utf8(buf).unwrap_or_else(|_| raw.to_string())
}

/// Success page with the pull request link and the user's profile.
pub fn success_page(pull_request_url: &str, profile_json: &str) -> String {
    format!(
        "\n\nSuccessfully created PR available <a href=\"{}\">here</a>!!!\n\nWith below Github user:\n\n\n{}",
        escape_html(pull_request_url),
        escape_text(&pretty_json(profile_json))
    )
}

/// Plain-text body for a failed upstream step.
pub fn upstream_failure(step_description: &str) -> String {
    format!("GitHub request failed while {}.", step_description)
}
