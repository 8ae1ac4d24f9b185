pub mod blog;
pub mod pagination;
pub mod users;

pub use blog::BlogService;
pub use pagination::Page;
pub use users::UserService;
