/// Errors from either inference endpoint.
#[derive(Debug, thiserror::Error)]
pub enum InferenceError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The endpoint returned a non-2xx status code.
    #[error("Inference API error ({status}): {body}")]
    ApiError {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// The body could not be parsed into a completion.
    #[error("Malformed inference response: {0}")]
    MalformedResponse(String),

    /// The completion carried no text.
    #[error("Inference response contained no answer")]
    EmptyResponse,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_display() {
        let err = InferenceError::ApiError {
            status: 401,
            body: "bad key".into(),
        };
        assert_eq!(err.to_string(), "Inference API error (401): bad key");
    }

    #[test]
    fn request_error_display() {
        let req_err = reqwest::Client::new().get("://bad").build().unwrap_err();
        let err = InferenceError::Request(req_err);
        assert!(err.to_string().contains("HTTP request failed"));
    }
}
