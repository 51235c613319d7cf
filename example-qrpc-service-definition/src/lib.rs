mod goods;
pub use goods::*;
