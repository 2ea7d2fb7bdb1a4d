use crate::common::error::ServiceResponse;
use crate::models::replies::Reply;

pub async fn status() -> ServiceResponse {
    Ok(Reply::ok(()))
}
