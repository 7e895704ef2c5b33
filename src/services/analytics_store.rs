use crate::db::mongo::Db;
use crate::error::ApiError;
use crate::models::analytics::{EventLog, LogEntry};

pub async fn record_event(db: &Db, entry: LogEntry) -> Result<(), ApiError> {
    let event = EventLog::from(entry);
    log::debug!("Event {:?} on {}", event.event_type, event.path);
    db.event_logs().insert_one(event).await?;
    Ok(())
}
