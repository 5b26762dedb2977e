pub mod cart_items;
pub mod medicines;
pub mod users;

pub use cart_items::Entity as CartItems;
pub use medicines::Entity as Medicines;
pub use users::Entity as Users;
