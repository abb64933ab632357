pub mod api_key;
pub mod branch;
pub mod category;
pub mod group;
pub mod sale;
pub mod settings;
pub mod supplier;
pub mod user;
pub mod user_branch;

pub use api_key::Entity as ApiKey;
pub use branch::Entity as Branch;
pub use category::Entity as Category;
pub use group::Entity as Group;
pub use sale::Entity as Sale;
pub use settings::Entity as Settings;
pub use supplier::Entity as Supplier;
pub use user::Entity as User;
pub use user_branch::Entity as UserBranch;
