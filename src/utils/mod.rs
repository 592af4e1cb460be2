//! Utility modules: JSON/BSON conversion and value helpers shared by the store and the cursor.
pub mod json;
pub mod value;
