pub mod file;
pub mod identity;
pub mod listing;
pub mod requests;
pub mod resource;

pub use file::*;
pub use identity::*;
pub use listing::*;
pub use requests::*;
pub use resource::*;
