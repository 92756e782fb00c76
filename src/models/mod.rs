pub mod product;

pub use product::{
    LookupData, LookupEnvelope, PrintRequest, PrintResponse, PrintStatus, ProductRecord,
    RetailUnitDetail, PLACEHOLDER,
};
