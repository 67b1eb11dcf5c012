//! Helpers shared by the Tika and Gotenberg HTTP clients.

use reqwest::Client;

/// User agent sent with every request.
pub(crate) const USER_AGENT: &str = concat!("docrelay/", env!("CARGO_PKG_VERSION"));

/// Build a client that keeps no idle connections, so a connection lives only as long as the
/// request that opened it.
pub(crate) fn build_client() -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(USER_AGENT)
        .pool_max_idle_per_host(0)
        .build()
}

pub(crate) fn normalize_base_url(url: &str) -> Result<String, String> {
    let mut parsed = reqwest::Url::parse(url).map_err(|err| err.to_string())?;
    if parsed.cannot_be_a_base() {
        return Err(format!("{url} cannot be used as a base URL"));
    }
    let path = parsed.path().trim_end_matches('/').to_string();
    parsed.set_path(&path);
    Ok(parsed.to_string())
}

pub(crate) fn format_endpoint(base: &str, path: &str) -> String {
    let base = base.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    format!("{base}/{path}")
}

/// Render a filename as a `Content-Disposition` value, or `None` when it cannot be sent as a
/// plain ASCII header.
pub(crate) fn attachment_disposition(file_name: &str) -> Option<String> {
    let usable = !file_name.is_empty()
        && file_name
            .chars()
            .all(|ch| ch.is_ascii() && !ch.is_ascii_control() && ch != '"' && ch != '\\');
    usable.then(|| format!("attachment; filename=\"{file_name}\""))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_urls_lose_trailing_slashes() {
        let normalized = normalize_base_url("http://tika:9998/").expect("url");
        assert_eq!(format_endpoint(&normalized, "/rmeta/text"), "http://tika:9998/rmeta/text");

        let nested = normalize_base_url("http://proxy/gotenberg//").expect("url");
        assert_eq!(
            format_endpoint(&nested, "forms/libreoffice/convert"),
            "http://proxy/gotenberg/forms/libreoffice/convert"
        );
    }

    #[test]
    fn rejects_unusable_base_urls() {
        assert!(normalize_base_url("not a url").is_err());
        assert!(normalize_base_url("mailto:ops@example.com").is_err());
    }

    #[test]
    fn disposition_only_for_plain_names() {
        assert_eq!(
            attachment_disposition("report.docx").as_deref(),
            Some("attachment; filename=\"report.docx\"")
        );
        assert_eq!(attachment_disposition("résumé.odt"), None);
        assert_eq!(attachment_disposition("bad\"name.odt"), None);
        assert_eq!(attachment_disposition(""), None);
    }
}
