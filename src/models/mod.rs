pub mod counts;
pub mod policy;
pub mod records;
pub mod taxonomy;
pub mod upstream;

pub use counts::*;
pub use policy::*;
pub use records::*;
pub use taxonomy::*;
