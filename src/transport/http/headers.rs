//! Header construction for API requests

use reqwest::header::{ACCEPT, CACHE_CONTROL, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};

use crate::error::{AgentError, Result};
use crate::transport::{ApiRequest, Method};

/// User agent announced on every request
pub const USER_AGENT: &str = "Finesse/1.0";

/// Headers for one request
///
/// # Errors
/// Returns `AgentError::RequestFailed` if the request id is not a valid header value
pub(super) fn request_headers(request: &ApiRequest) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    if request.method != Method::Get {
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/xml"));
    }
    headers.insert(ACCEPT, HeaderValue::from_static("*/*"));
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    let id = HeaderValue::from_str(request.id.as_str())
        .map_err(|e| AgentError::request_failed(format!("invalid request id: {e}")))?;
    headers.insert(HeaderName::from_static("requestid"), id);
    Ok(headers)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_type_only_on_writes() {
        let get = request_headers(&ApiRequest::get_user("agent01")).unwrap();
        assert!(get.get(CONTENT_TYPE).is_none());
        assert_eq!(get.get(ACCEPT).unwrap(), "*/*");
        assert!(get.get("RequestId").is_some());

        let put = request_headers(&ApiRequest::put_user("1", "<User/>")).unwrap();
        assert_eq!(put.get(CONTENT_TYPE).unwrap(), "application/xml");
        assert_eq!(put.get(CACHE_CONTROL).unwrap(), "no-cache");
    }
}
