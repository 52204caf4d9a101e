pub mod account;
pub mod game;
pub mod recommendation;
pub mod review;
pub mod wishlist;

pub use account::{Account, LinkedProfile};
pub use game::{GameDetails, NewsItem, ObservedGame, OwnedGame, SearchHit};
pub use recommendation::Recommendation;
pub use review::{Review, ReviewWithGame};
pub use wishlist::WishlistEntry;
