pub mod anilist;
pub mod jikan;
pub mod queue;
pub mod transport;

pub use anilist::AnilistClient;
pub use jikan::JikanClient;
pub use queue::RequestQueue;
pub use transport::{ApiRequest, HttpTransport, RawResponse, Transport};
