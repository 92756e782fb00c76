pub mod exporter;
pub mod table_store;

pub use exporter::export_products;
pub use table_store::{TableStore, PRODUCTS_SLOT};
