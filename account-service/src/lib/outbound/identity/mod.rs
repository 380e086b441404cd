pub mod google;

pub use google::GoogleIdentityProvider;
