use actix_web::http::header::AUTHORIZATION;
use actix_web::HttpRequest;

/// Accepted bearer tokens, shared with handlers as app data
#[derive(Debug, Clone, Default)]
pub struct TokenPolicy {
    tokens: Vec<String>,
}

#[derive(Debug, PartialEq, Eq)]
pub enum AuthFailure {
    /// No usable bearer token: answers 401
    Missing,
    /// Token present but not accepted: answers 403
    Rejected,
}

impl TokenPolicy {
    pub fn new(tokens: Vec<String>) -> Self {
        Self { tokens }
    }

    pub fn check(&self, req: &HttpRequest) -> Result<(), AuthFailure> {
        let token = req
            .headers()
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .and_then(|h| h.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(AuthFailure::Missing)?;

        if self.tokens.is_empty() || self.tokens.iter().any(|t| t == token) {
            Ok(())
        } else {
            Err(AuthFailure::Rejected)
        }
    }
}
