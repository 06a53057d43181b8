pub mod products;

pub use products::product_routes;
