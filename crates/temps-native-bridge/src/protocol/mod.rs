//! In-process event model and the conversions applied before data crosses
//! the native boundary.

pub mod level;
pub mod serialize;
pub mod types;

pub use level::Level;
pub use serialize::{serialize_object, serialize_value, StringMap};
pub use types::{Breadcrumb, Event, Exception, ExceptionValues, Mechanism, SdkInfo, SdkPackage, User};
