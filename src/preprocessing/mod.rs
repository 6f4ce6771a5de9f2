//! Data preprocessing module
//!
//! Turns a [`Dataset`](crate::data::Dataset) into numeric model input:
//! - Label encoding of the binary target
//! - One-hot encoding of every feature column (all treated as categorical)

mod encoder;

pub use encoder::{
    encode, fit, transform, EncodedData, FeatureCategories, FittedEncoders, LabelEncoder,
    OneHotEncoder,
};
