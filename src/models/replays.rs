use crate::common::error::{AppError, ServiceResult};
use serde::Serialize;

/// How much the uploader claims to be sending: just a replay for a known
/// song, or a full song registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReqType {
    ReplayOnly,
    Complete,
}

impl ReqType {
    pub fn parse(value: &str) -> ServiceResult<ReqType> {
        match value {
            "replayOnly" => Ok(ReqType::ReplayOnly),
            "complete" => Ok(ReqType::Complete),
            _ => Err(AppError::InvalidInput),
        }
    }
}

#[derive(Serialize)]
pub struct ReplayRegisterResponse {
    pub song: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn req_type_accepts_exactly_two_values() {
        assert_eq!(ReqType::parse("replayOnly").unwrap(), ReqType::ReplayOnly);
        assert_eq!(ReqType::parse("complete").unwrap(), ReqType::Complete);
        assert!(ReqType::parse("Complete").is_err());
        assert!(ReqType::parse("").is_err());
    }
}
