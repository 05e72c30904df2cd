//! Domain models returned by the admin API.
//!
//! Repositories decode rows into private row types and convert them into
//! these validated types. Every model serializes with `snake_case` field names,
//! matching the column names the admin UI already consumes.

pub mod blog;
pub mod brand;
pub mod category;
pub mod order;
pub mod page;
pub mod product;
pub mod user;

pub use blog::{Blog, BlogInput};
pub use brand::{Brand, BrandInput};
pub use category::{Category, CategoryInput};
pub use order::{Order, OrderDetail, OrderItem, OrderUpdate};
pub use page::{Page, PageInput};
pub use product::{Product, ProductInput};
pub use user::{NewUser, User, UserUpdate};
