pub mod movie;
pub mod rating;
pub mod session;
pub mod watched;

pub use movie::{MovieDetail, SearchResultItem};
pub use rating::UserRating;
pub use session::SessionState;
pub use watched::WatchedEntry;
