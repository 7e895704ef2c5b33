use mongodb::{
    bson::{doc, Document},
    options::{ClientOptions, ServerApi, ServerApiVersion},
    Client, Collection,
};
use std::sync::Arc;
use std::time::Duration;

use crate::db::{COMMENTS, EVENT_LOGS, POSTS, POST_LIKES, ROUTES, ROUTE_LIKES, SPOTS, USERS, VIDEOS};
use crate::models::{
    analytics::EventLog,
    comment::Comment,
    like::LikeMarker,
    post::Post,
    route::Route,
    spot::Spot,
    user::User,
    video::Video,
};

pub async fn create_mongo_client(uri: &str) -> Result<Arc<Client>, mongodb::error::Error> {
    log::info!("Connecting to MongoDB");

    let mut client_options = ClientOptions::parse(uri).await?;

    client_options.connect_timeout = Some(Duration::from_secs(10));
    client_options.server_selection_timeout = Some(Duration::from_secs(10));
    client_options.max_pool_size = Some(10);
    client_options.min_pool_size = Some(1);

    let server_api = ServerApi::builder().version(ServerApiVersion::V1).build();
    client_options.server_api = Some(server_api);

    let client = Client::with_options(client_options)?;

    // A failed ping is not fatal; the pool reconnects on demand.
    match client.database("admin").run_command(doc! {"ping": 1}).await {
        Ok(_) => log::info!("Successfully connected to MongoDB and verified with ping command"),
        Err(e) => {
            log::warn!("Connected to MongoDB but ping test failed: {}", e);
            log::warn!("The API may still work, but some functionality might be impaired");
        }
    }

    Ok(Arc::new(client))
}

/// Handle to the application database with typed collection accessors.
#[derive(Clone)]
pub struct Db {
    client: Arc<Client>,
    name: String,
}

impl Db {
    pub fn new(client: Arc<Client>, name: impl Into<String>) -> Self {
        Self {
            client,
            name: name.into(),
        }
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    fn collection<T: Send + Sync>(&self, name: &str) -> Collection<T> {
        self.client.database(&self.name).collection(name)
    }

    /// Untyped view of a collection, for partial reads such as counters.
    pub fn documents(&self, name: &str) -> Collection<Document> {
        self.collection(name)
    }

    pub fn users(&self) -> Collection<User> {
        self.collection(USERS)
    }

    pub fn routes(&self) -> Collection<Route> {
        self.collection(ROUTES)
    }

    pub fn route_likes(&self) -> Collection<LikeMarker> {
        self.collection(ROUTE_LIKES)
    }

    pub fn posts(&self) -> Collection<Post> {
        self.collection(POSTS)
    }

    pub fn post_likes(&self) -> Collection<LikeMarker> {
        self.collection(POST_LIKES)
    }

    pub fn comments(&self) -> Collection<Comment> {
        self.collection(COMMENTS)
    }

    pub fn spots(&self) -> Collection<Spot> {
        self.collection(SPOTS)
    }

    pub fn videos(&self) -> Collection<Video> {
        self.collection(VIDEOS)
    }

    pub fn event_logs(&self) -> Collection<EventLog> {
        self.collection(EVENT_LOGS)
    }

    pub async fn ping(&self) -> Result<(), mongodb::error::Error> {
        self.client
            .database(&self.name)
            .run_command(doc! {"ping": 1})
            .await
            .map(|_| ())
    }
}
