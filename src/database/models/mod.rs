pub mod brand;
pub mod category;
pub mod page_visit;
pub mod product;
pub mod spec_group;
pub mod tenant;
pub mod user;

pub use brand::Brand;
pub use category::Category;
pub use page_visit::PageVisit;
pub use product::{Product, ProductSpec};
pub use spec_group::SpecGroup;
pub use tenant::Tenant;
pub use user::{User, UserRole};
