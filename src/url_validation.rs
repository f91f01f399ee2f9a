use anyhow::{Result, anyhow};
use url::Url;

pub fn validate_http_url(raw: &str) -> Result<Url> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(anyhow!("image url must not be empty"));
    }
    let parsed = Url::parse(trimmed).map_err(|err| anyhow!("invalid image url: {err}"))?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        scheme => Err(anyhow!(
            "unsupported image url scheme: {scheme} (only http and https are allowed)"
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_http_and_https() {
        assert!(validate_http_url("http://example.com/logo.png").is_ok());
        assert!(validate_http_url(" https://example.com/logo.png ").is_ok());
    }

    #[test]
    fn rejects_other_schemes_and_garbage() {
        let err = validate_http_url("file:///etc/passwd").unwrap_err();
        assert!(err.to_string().contains("file"));
        assert!(validate_http_url("not a url").is_err());
        assert!(validate_http_url("   ").is_err());
    }
}
