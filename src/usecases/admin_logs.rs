use crate::common::context::Context;
use crate::common::error::{AppError, ServiceResult};
use crate::models::admin::{AdminAction, AdminLogEntry, AdminLogsArgs};
use crate::models::replies::Paginated;
use crate::repositories::admin_logs;
use crate::repositories::admin_logs::AdminLogsFilter;

const DEFAULT_PAGE_SIZE: u32 = 15;

pub async fn fetch_entries<C: Context>(
    ctx: &C,
    args: &AdminLogsArgs,
) -> ServiceResult<Paginated<AdminLogEntry>> {
    let action = match args.action {
        Some(value) => {
            Some(AdminAction::try_from(value).map_err(|_| AppError::InvalidInput)? as i16)
        }
        None => None,
    };
    let filter = AdminLogsFilter {
        admin_id: args.admin,
        action,
        item_id: args.item,
        start_date: args.start_date,
        end_date: args.end_date,
    };
    let page = args.page.unwrap_or(1).max(1);
    let limit = args.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, 100);

    let entries = admin_logs::fetch_entries(ctx, &filter, page, limit).await?;
    let total = admin_logs::count_entries(ctx, &filter).await?;
    let entries = entries.into_iter().map(AdminLogEntry::from).collect();
    Ok(Paginated::new(total, page, limit, entries))
}
