use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder};
use tracing::debug;

use crate::server::{AnalysisServer, ServerError};

/// Per-request timeout for calls to the analysis server.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// HTTP client for the Ghidra plugin endpoints (`searchFunctions`, `methods`,
/// `decompile`, `renameFunction`).
#[derive(Debug, Clone)]
pub struct HttpAnalysisServer {
    base_url: String,
    client: Client,
}

impl HttpAnalysisServer {
    /// Build a client for `base_url`; a trailing slash is optional.
    pub fn new(base_url: &str) -> Result<Self, ServerError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ServerError::Transport(e.to_string()))?;
        Ok(Self { base_url: base_url.trim_end_matches('/').to_string(), client })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, name: &str) -> String {
        format!("{}/{}", self.base_url, name)
    }

    fn get_lines(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
    ) -> Result<Vec<String>, ServerError> {
        let body = send(self.client.get(self.endpoint(endpoint)).query(params))?;
        if is_listing_notice(&body) {
            return Err(ServerError::Refused(body));
        }
        Ok(split_listing(&body))
    }
}

impl AnalysisServer for HttpAnalysisServer {
    fn search_functions(
        &self,
        query: &str,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<String>, ServerError> {
        if query.is_empty() {
            return Err(ServerError::InvalidRequest("query string is required".into()));
        }
        self.get_lines(
            "searchFunctions",
            &[
                ("query", query.to_string()),
                ("offset", offset.to_string()),
                ("limit", limit.to_string()),
            ],
        )
    }

    fn list_methods(&self, offset: usize, limit: usize) -> Result<Vec<String>, ServerError> {
        self.get_lines("methods", &[("offset", offset.to_string()), ("limit", limit.to_string())])
    }

    fn decompile(&self, name: &str) -> Result<String, ServerError> {
        let body = send(self.client.post(self.endpoint("decompile")).body(name.to_string()))?;
        refuse_if_error_notice(body)
    }

    fn rename_function(&self, old_name: &str, new_name: &str) -> Result<String, ServerError> {
        let body = send(
            self.client
                .post(self.endpoint("renameFunction"))
                .form(&[("oldName", old_name), ("newName", new_name)]),
        )?;
        let body = refuse_if_error_notice(body)?;
        if body.starts_with("Rename failed") {
            return Err(ServerError::Refused(body));
        }
        Ok(body)
    }
}

fn send(request: RequestBuilder) -> Result<String, ServerError> {
    let response = request.send().map_err(|e| ServerError::Transport(e.to_string()))?;
    let status = response.status();
    let body = response.text().map_err(|e| ServerError::Transport(e.to_string()))?;
    debug!(status = status.as_u16(), bytes = body.len(), "analysis server response");
    if !status.is_success() {
        return Err(ServerError::Status { code: status.as_u16(), body: body.trim().to_string() });
    }
    Ok(body.trim().to_string())
}

/// Split a listing body into labels, dropping blank lines.
pub(crate) fn split_listing(body: &str) -> Vec<String> {
    body.lines().map(str::trim_end).filter(|l| !l.trim().is_empty()).map(String::from).collect()
}

/// The plugin answers some failures with a 2xx whose body starts with
/// `Error`. Only a leading marker counts; decompiled code that mentions
/// "Error" further in is a normal payload.
pub(crate) fn refuse_if_error_notice(body: String) -> Result<String, ServerError> {
    if body.starts_with("Error") {
        Err(ServerError::Refused(body))
    } else {
        Ok(body)
    }
}

/// A listing answered with a single `Error: ...` / `Error 404 ...` line
/// instead of labels. A function that is merely called `Error...` still
/// lists as a label: identifiers cannot contain `:` or a space, and
/// address-annotated labels carry ` @ `.
pub(crate) fn is_listing_notice(body: &str) -> bool {
    let Some(rest) = body.strip_prefix("Error") else {
        return false;
    };
    !body.contains('\n')
        && !body.contains(" @ ")
        && (rest.starts_with(':') || rest.starts_with(' '))
}
