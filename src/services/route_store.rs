use futures::TryStreamExt;
use mongodb::bson::{self, doc, oid::ObjectId, DateTime, Document};
use mongodb::options::ReturnDocument;

use crate::db::mongo::Db;
use crate::error::ApiError;
use crate::models::like::LikeState;
use crate::models::route::{Route, RouteStop, RouteUpdate, SaveRouteRequest};
use crate::services::like_store::{self, LikeTarget};

const PUBLIC_LIMIT: i64 = 20;

pub struct RouteAuthor {
    pub user_id: String,
    pub name: Option<String>,
    pub image: Option<String>,
}

pub async fn save_route(
    db: &Db,
    author: RouteAuthor,
    request: SaveRouteRequest,
) -> Result<ObjectId, ApiError> {
    if request.title.trim().is_empty() {
        return Err(ApiError::BadRequest("Title is required".to_string()));
    }
    let route = request.into_route(author.user_id, author.name, author.image);

    let result = db.routes().insert_one(&route).await?;
    let id = result
        .inserted_id
        .as_object_id()
        .ok_or_else(|| ApiError::Internal("Inserted route has no ObjectId".to_string()))?;

    log::info!("Saved route {} ({} stops) for {}", id, route.stops.len(), route.creator_id);
    Ok(id)
}

pub async fn get_route(db: &Db, id: ObjectId) -> Result<Route, ApiError> {
    db.routes()
        .find_one(doc! { "_id": id })
        .await?
        .ok_or(ApiError::NotFound("Route"))
}

/// Private routes are visible to their creator only.
pub fn is_visible_to(route: &Route, viewer: Option<&str>) -> bool {
    route.is_public || viewer == Some(route.creator_id.as_str())
}

/// Like `get_route`, but a private route looks missing to anyone but its
/// creator.
pub async fn get_visible_route(
    db: &Db,
    id: ObjectId,
    viewer: Option<&str>,
) -> Result<Route, ApiError> {
    let route = get_route(db, id).await?;
    if !is_visible_to(&route, viewer) {
        log::debug!("Route {} hidden from {:?}", id, viewer);
        return Err(ApiError::NotFound("Route"));
    }
    Ok(route)
}

pub async fn list_user_routes(db: &Db, user_id: &str) -> Result<Vec<Route>, ApiError> {
    Ok(db
        .routes()
        .find(doc! { "creator_id": user_id })
        .sort(doc! { "created_at": -1 })
        .await?
        .try_collect()
        .await?)
}

pub async fn list_public_routes(db: &Db) -> Result<Vec<Route>, ApiError> {
    Ok(db
        .routes()
        .find(doc! { "is_public": true })
        .sort(doc! { "created_at": -1 })
        .limit(PUBLIC_LIMIT)
        .await?
        .try_collect()
        .await?)
}

/// `$set` body of a partial edit. Stops are replaced wholesale.
pub fn route_update_document(update: RouteUpdate) -> Result<Document, ApiError> {
    let mut fields = Document::new();
    if let Some(title) = update.title {
        let title = title.trim();
        if title.is_empty() {
            return Err(ApiError::BadRequest("Title cannot be empty".to_string()));
        }
        fields.insert("title", title);
    }
    if let Some(is_public) = update.is_public {
        fields.insert("is_public", is_public);
    }
    if let Some(stops) = update.stops {
        let stops: Vec<RouteStop> = stops.into_iter().map(RouteStop::from_generated).collect();
        fields.insert("stops", bson::to_bson(&stops)?);
    }
    if let Some(style) = update.travel_style_fit {
        fields.insert("travel_style_fit", bson::to_bson(&style)?);
    }
    if let Some(budget) = update.total_budget {
        fields.insert("total_budget", budget);
    }
    if let Some(days) = update.duration_days {
        fields.insert("duration_days", days as i64);
    }
    fields.insert("updated_at", DateTime::now());
    Ok(fields)
}

/// Distinguishes a missing route from one owned by somebody else.
async fn require_owner(db: &Db, id: ObjectId, user_id: &str) -> Result<Route, ApiError> {
    let route = get_route(db, id).await?;
    if route.creator_id != user_id {
        log::warn!("User {} tried to modify route {} owned by {}", user_id, id, route.creator_id);
        return Err(ApiError::Forbidden);
    }
    Ok(route)
}

pub async fn update_route(
    db: &Db,
    id: ObjectId,
    user_id: &str,
    update: RouteUpdate,
) -> Result<Route, ApiError> {
    require_owner(db, id, user_id).await?;
    let fields = route_update_document(update)?;

    db.routes()
        .find_one_and_update(doc! { "_id": id }, doc! { "$set": fields })
        .return_document(ReturnDocument::After)
        .await?
        .ok_or(ApiError::NotFound("Route"))
}

pub async fn delete_route(db: &Db, id: ObjectId, user_id: &str) -> Result<(), ApiError> {
    require_owner(db, id, user_id).await?;
    db.routes().delete_one(doc! { "_id": id }).await?;
    like_store::clear_likes(db, LikeTarget::Route, id).await?;
    log::info!("Deleted route {}", id);
    Ok(())
}

pub async fn add_route_image(
    db: &Db,
    id: ObjectId,
    user_id: &str,
    image_url: &str,
) -> Result<Route, ApiError> {
    require_owner(db, id, user_id).await?;
    db.routes()
        .find_one_and_update(
            doc! { "_id": id },
            doc! {
                "$push": { "images": image_url },
                "$set": { "updated_at": DateTime::now() },
            },
        )
        .return_document(ReturnDocument::After)
        .await?
        .ok_or(ApiError::NotFound("Route"))
}

/// Counts one more reuse of a public route as the base of a new plan.
pub async fn increment_reuse(db: &Db, id: ObjectId) -> Result<Route, ApiError> {
    db.routes()
        .find_one_and_update(doc! { "_id": id }, doc! { "$inc": { "reused_count": 1 } })
        .return_document(ReturnDocument::After)
        .await?
        .ok_or(ApiError::NotFound("Route"))
}

pub async fn toggle_route_like(
    db: &Db,
    id: ObjectId,
    user_id: &str,
) -> Result<LikeState, ApiError> {
    like_store::toggle_like(db, LikeTarget::Route, id, user_id).await
}

pub async fn route_like_status(db: &Db, id: ObjectId, user_id: &str) -> Result<bool, ApiError> {
    like_store::like_status(db, LikeTarget::Route, id, user_id).await
}
