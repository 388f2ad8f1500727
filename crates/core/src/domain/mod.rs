pub mod quotation;

pub use quotation::{Quotation, QuotationId, QuotationStatus};
