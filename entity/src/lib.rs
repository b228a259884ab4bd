pub mod edit;
pub mod resource;

pub mod prelude {
    pub use super::edit::Entity as Edit;
    pub use super::resource::Entity as Resource;
}
