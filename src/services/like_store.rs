use mongodb::bson::{doc, oid::ObjectId, Bson, DateTime, Document};
use mongodb::{ClientSession, Collection};

use crate::db::mongo::Db;
use crate::db::{POSTS, ROUTES};
use crate::error::ApiError;
use crate::models::like::{LikeMarker, LikeState};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LikeTarget {
    Route,
    Post,
}

impl LikeTarget {
    fn label(&self) -> &'static str {
        match self {
            LikeTarget::Route => "Route",
            LikeTarget::Post => "Post",
        }
    }

    fn targets(&self, db: &Db) -> Collection<Document> {
        match self {
            LikeTarget::Route => db.documents(ROUTES),
            LikeTarget::Post => db.documents(POSTS),
        }
    }

    fn markers(&self, db: &Db) -> Collection<LikeMarker> {
        match self {
            LikeTarget::Route => db.route_likes(),
            LikeTarget::Post => db.post_likes(),
        }
    }
}

/// New counter and state after one toggle. Unliking never goes below zero.
pub fn apply_like_toggle(likes_count: u32, currently_liked: bool) -> LikeState {
    if currently_liked {
        LikeState {
            liked: false,
            likes_count: likes_count.saturating_sub(1),
        }
    } else {
        LikeState {
            liked: true,
            likes_count: likes_count + 1,
        }
    }
}

fn read_count(document: &Document) -> u32 {
    match document.get("likes_count") {
        Some(Bson::Int32(n)) => (*n).max(0) as u32,
        Some(Bson::Int64(n)) => (*n).clamp(0, u32::MAX as i64) as u32,
        Some(Bson::Double(n)) => n.max(0.0) as u32,
        _ => 0,
    }
}

fn marker_filter(target_id: ObjectId, user_id: &str) -> Document {
    doc! { "target_id": target_id, "user_id": user_id }
}

/// Flips the user's like inside one transaction: marker and counter change
/// together or not at all.
pub async fn toggle_like(
    db: &Db,
    target: LikeTarget,
    target_id: ObjectId,
    user_id: &str,
) -> Result<LikeState, ApiError> {
    let mut session = db.client().start_session().await?;
    session.start_transaction().await?;

    match toggle_in_session(db, target, target_id, user_id, &mut session).await {
        Ok(state) => {
            session.commit_transaction().await?;
            log::debug!(
                "{} {} like by {} -> {:?}",
                target.label(),
                target_id,
                user_id,
                state
            );
            Ok(state)
        }
        Err(e) => {
            if let Err(abort_err) = session.abort_transaction().await {
                log::warn!("Failed to abort like transaction: {}", abort_err);
            }
            Err(e)
        }
    }
}

async fn toggle_in_session(
    db: &Db,
    target: LikeTarget,
    target_id: ObjectId,
    user_id: &str,
    session: &mut ClientSession,
) -> Result<LikeState, ApiError> {
    let targets = target.targets(db);
    let markers = target.markers(db);

    let document = targets
        .find_one(doc! { "_id": target_id })
        .session(&mut *session)
        .await?
        .ok_or(ApiError::NotFound(target.label()))?;

    let existing = markers
        .find_one(marker_filter(target_id, user_id))
        .session(&mut *session)
        .await?;

    let state = apply_like_toggle(read_count(&document), existing.is_some());

    if existing.is_some() {
        markers
            .delete_one(marker_filter(target_id, user_id))
            .session(&mut *session)
            .await?;
    } else {
        let marker = LikeMarker {
            id: None,
            target_id,
            user_id: user_id.to_string(),
            created_at: DateTime::now(),
        };
        markers.insert_one(marker).session(&mut *session).await?;
    }

    targets
        .update_one(
            doc! { "_id": target_id },
            doc! { "$set": { "likes_count": state.likes_count as i64 } },
        )
        .session(&mut *session)
        .await?;

    Ok(state)
}

pub async fn like_status(
    db: &Db,
    target: LikeTarget,
    target_id: ObjectId,
    user_id: &str,
) -> Result<bool, ApiError> {
    Ok(target
        .markers(db)
        .find_one(marker_filter(target_id, user_id))
        .await?
        .is_some())
}

/// Drops every marker of a deleted route or post.
pub async fn clear_likes(db: &Db, target: LikeTarget, target_id: ObjectId) -> Result<(), ApiError> {
    target
        .markers(db)
        .delete_many(doc! { "target_id": target_id })
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggling_twice_restores_count_and_state() {
        let liked = apply_like_toggle(7, false);
        assert_eq!(
            liked,
            LikeState {
                liked: true,
                likes_count: 8
            }
        );
        let unliked = apply_like_toggle(liked.likes_count, liked.liked);
        assert_eq!(
            unliked,
            LikeState {
                liked: false,
                likes_count: 7
            }
        );
    }

    #[test]
    fn unlike_at_zero_stays_at_zero() {
        assert_eq!(apply_like_toggle(0, true).likes_count, 0);
    }

    #[test]
    fn counter_is_read_from_any_numeric_type() {
        assert_eq!(read_count(&doc! { "likes_count": 3_i32 }), 3);
        assert_eq!(read_count(&doc! { "likes_count": 4_i64 }), 4);
        assert_eq!(read_count(&doc! { "likes_count": 5.0 }), 5);
        assert_eq!(read_count(&doc! { "likes_count": -2_i32 }), 0);
        assert_eq!(read_count(&doc! {}), 0);
    }
}
