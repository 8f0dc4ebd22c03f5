pub mod feed;
pub mod page;
pub mod target;

pub use feed::FeedStatus;
pub use page::Page;
pub use target::FetchTarget;
