pub mod review;

pub use review::Entity as ReviewEntity;
