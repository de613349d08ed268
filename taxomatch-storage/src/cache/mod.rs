pub mod lookup;

pub use lookup::LookupCache;
