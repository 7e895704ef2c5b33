pub mod mongo;

pub const USERS: &str = "Users";
pub const ROUTES: &str = "Routes";
pub const ROUTE_LIKES: &str = "RouteLikes";
pub const POSTS: &str = "Posts";
pub const POST_LIKES: &str = "PostLikes";
pub const COMMENTS: &str = "Comments";
pub const SPOTS: &str = "Spots";
pub const VIDEOS: &str = "Videos";
pub const EVENT_LOGS: &str = "EventLogs";
