use crate::api::{AuthedUser, RequestContext};
use crate::common::context::Context;
use crate::common::error::{AppError, ServiceResponse, ServiceResult};
use crate::common::storage::{TempSet, UploadKind};
use crate::models::replays::{ReplayRegisterResponse, ReqType};
use crate::models::replies::{Reply, SuccessCode};
use crate::usecases::replays::{self, UploadSummary};
use axum::extract::Multipart;
use axum::extract::multipart::Field;
use std::path::Path;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;

async fn write_field(path: &Path, field: &mut Field<'_>) -> ServiceResult<()> {
    let mut file = File::create(path).await?;
    while let Some(chunk) = field
        .chunk()
        .await
        .map_err(|_| AppError::InvalidInput)?
    {
        file.write_all(&chunk).await?;
    }
    file.flush().await?;
    Ok(())
}

/// Streams the multipart request into the temp set. Every part must be one
/// of the known file fields (classified by extension) or the reqType flag.
pub async fn consume_multipart(
    temp: &TempSet,
    multipart: &mut Multipart,
) -> ServiceResult<UploadSummary> {
    let mut upload = UploadSummary::default();
    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|_| AppError::InvalidInput)?
    {
        let name = field.name().unwrap_or_default().to_owned();
        match name.as_str() {
            "replayFile" | "chartFile" | "songDataFile" => {
                let filename = field.file_name().unwrap_or_default().to_owned();
                let Some(kind) = UploadKind::from_filename(&filename) else {
                    return Err(AppError::InvalidInput);
                };
                write_field(temp.path(kind), &mut field).await?;
                match kind {
                    UploadKind::Replay => upload.has_replay = true,
                    UploadKind::Midi | UploadKind::Chart => upload.chart = Some(kind),
                    UploadKind::Ini | UploadKind::Dta => upload.songdata = Some(kind),
                }
            }
            "reqType" => {
                let value = field.text().await.map_err(|_| AppError::InvalidInput)?;
                upload.req_type = Some(ReqType::parse(&value)?);
            }
            _ => return Err(AppError::InvalidInput),
        }
    }
    Ok(upload)
}

pub async fn register(
    ctx: RequestContext,
    AuthedUser(user): AuthedUser,
    mut multipart: Multipart,
) -> ServiceResponse {
    let temp = TempSet::create(&ctx.config().storage);
    let result = async {
        let upload = consume_multipart(&temp, &mut multipart).await?;
        replays::register(&ctx, user.user_id, &temp, &upload).await
    }
    .await;
    // Whatever happened above, nothing may stay behind in the temp dir
    temp.cleanup().await;

    let song_id = result?;
    Ok(Reply::with(
        SuccessCode::ReplayRegistered,
        ReplayRegisterResponse { song: song_id },
    ))
}
